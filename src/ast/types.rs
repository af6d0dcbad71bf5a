//! 解析済みの型式

use serde::{Deserialize, Serialize};

use super::{Ident, Span};

/// 解決前の、ソースに書かれたままの型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// 組み込み型または宣言済みの型の別名への参照
    Named(Ident),
    /// `string`キーワード
    String(Span),
    Array(ArrayTypeExpr),
    /// `array of T`（仮引数の型としてのみ有効）
    OpenArray(OpenArrayTypeExpr),
    Record(RecordTypeExpr),
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named(ident) => ident.span,
            TypeExpr::String(span) => *span,
            TypeExpr::Array(a) => a.span,
            TypeExpr::OpenArray(a) => a.span,
            TypeExpr::Record(r) => r.span,
        }
    }
}

/// 配列型（`array[lo..hi, ...] of T`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayTypeExpr {
    pub ranges: Vec<Subrange>,
    pub element: Box<TypeExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Subrange {
    pub low: i64,
    pub high: i64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenArrayTypeExpr {
    pub element: Box<TypeExpr>,
    pub span: Span,
}

/// レコード型（`record a, b: T; ... end`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTypeExpr {
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub span: Span,
}
