//! Pascalプログラムの抽象構文木（AST）定義

use serde::{Deserialize, Serialize};

mod declarations;
mod expressions;
mod statements;
mod types;

pub use declarations::*;
pub use expressions::*;
pub use statements::*;
pub use types::*;

/// ソース位置追跡用のスパン情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    /// `self`と`other`の両方を含む最小のスパン
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

/// ソースに書かれたままの識別子
///
/// Pascalの識別子は大文字小文字を区別しない。シンボルテーブルの検索には
/// [`Ident::key`]の正規化した形を使う
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn key(&self) -> String {
        crate::analyzer::normalize(&self.name)
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// ルートノード（`program name; declarations begin ... end.`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub name: Ident,
    pub declarations: Vec<Declaration>,
    pub block: Block,
    pub span: Span,
}
