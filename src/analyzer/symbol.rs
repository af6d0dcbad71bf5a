//! シンボルとスコープごとのシンボルテーブル

use indexmap::IndexMap;
use std::fmt;

use super::types::SemType;
use crate::ast::{Block, PassingMode, Span};
use crate::error::{SemanticError, SemanticResult};

/// 識別子の検索キー（小文字に正規化）
pub fn normalize(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// 現在のスコープで予約済みだが宣言を解析中の名前。
/// 名前リストを読んでから型が決まるまでの間だけ存在する
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub name: String,
    pub span: Span,
}

/// 変数または定数
#[derive(Debug, Clone, PartialEq)]
pub struct VarSymbol {
    pub name: String,
    pub ty: SemType,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSymbol {
    pub name: String,
    pub ty: SemType,
    pub mode: PassingMode,
    pub span: Span,
}

/// 型の別名。`ty`は常に解決済み
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSymbol {
    pub name: String,
    pub ty: SemType,
    pub span: Span,
}

/// 手続きまたは関数。戻り値型を持つものが関数
///
/// `params`と`locals`はルーチン解析中のスコープを分割したもの。
/// `params`の順序が呼び出しシグネチャになる
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineSymbol {
    pub name: String,
    pub params: ScopeTable,
    pub locals: ScopeTable,
    pub return_type: Option<SemType>,
    pub body: Option<Block>,
    pub is_forward: bool,
    pub span: Span,
}

impl RoutineSymbol {
    pub fn new(name: impl Into<String>, return_type: Option<SemType>, span: Span) -> Self {
        Self {
            name: name.into(),
            params: ScopeTable::new(),
            locals: ScopeTable::new(),
            return_type,
            body: None,
            is_forward: false,
            span,
        }
    }

    pub fn is_function(&self) -> bool {
        self.return_type.is_some()
    }

    /// 宣言順の仮引数
    pub fn parameters(&self) -> impl Iterator<Item = &ParamSymbol> {
        self.params.iter().filter_map(|s| match s {
            Symbol::Parameter(p) => Some(p),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Unresolved(Placeholder),
    Var(VarSymbol),
    Constant(VarSymbol),
    Parameter(ParamSymbol),
    Type(TypeSymbol),
    Routine(RoutineSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Unresolved(p) => &p.name,
            Symbol::Var(v) | Symbol::Constant(v) => &v.name,
            Symbol::Parameter(p) => &p.name,
            Symbol::Type(t) => &t.name,
            Symbol::Routine(r) => &r.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Symbol::Unresolved(p) => p.span,
            Symbol::Var(v) | Symbol::Constant(v) => v.span,
            Symbol::Parameter(p) => p.span,
            Symbol::Type(t) => t.span,
            Symbol::Routine(r) => r.span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Symbol::Unresolved(_) => "unresolved",
            Symbol::Var(_) => "var",
            Symbol::Constant(_) => "const",
            Symbol::Parameter(_) => "param",
            Symbol::Type(_) => "type",
            Symbol::Routine(r) if r.is_function() => "function",
            Symbol::Routine(_) => "procedure",
        }
    }

    /// シンボルが値を表す場合、その型
    pub fn value_type(&self) -> Option<&SemType> {
        match self {
            Symbol::Var(v) | Symbol::Constant(v) => Some(&v.ty),
            Symbol::Parameter(p) => Some(&p.ty),
            _ => None,
        }
    }

    pub fn as_routine(&self) -> Option<&RoutineSymbol> {
        match self {
            Symbol::Routine(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Symbol::Parameter(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Unresolved(p) => write!(f, "{} <unresolved>", p.name),
            Symbol::Var(v) => write!(f, "var {}: {}", v.name, v.ty),
            Symbol::Constant(v) => write!(f, "const {}: {}", v.name, v.ty),
            Symbol::Parameter(p) if p.mode == crate::ast::PassingMode::Value => {
                write!(f, "param {}: {}", p.name, p.ty)
            }
            Symbol::Parameter(p) => write!(f, "param {} {}: {}", p.mode, p.name, p.ty),
            Symbol::Type(t) => write!(f, "type {} = {}", t.name, t.ty),
            Symbol::Routine(r) => {
                write!(f, "{} {}(", self.kind_name(), r.name)?;
                for (i, p) in r.parameters().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    if p.mode != crate::ast::PassingMode::Value {
                        write!(f, "{} ", p.mode)?;
                    }
                    write!(f, "{}: {}", p.name, p.ty)?;
                }
                write!(f, ")")?;
                if let Some(ty) = &r.return_type {
                    write!(f, ": {}", ty)?;
                }
                if r.is_forward {
                    write!(f, "; forward")?;
                }
                Ok(())
            }
        }
    }
}

/// 一つのスコープの、正規化した名前からシンボルへの挿入順マップ。
/// 正規化した名前が同じシンボルは共存しない
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeTable {
    symbols: IndexMap<String, Symbol>,
}

impl ScopeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, symbol: Symbol) -> SemanticResult<()> {
        let key = normalize(symbol.name());
        if self.symbols.contains_key(&key) {
            return Err(SemanticError::DuplicateDeclaration {
                name: symbol.name().to_string(),
                span: symbol.span(),
            });
        }
        self.symbols.insert(key, symbol);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(&normalize(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(&normalize(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(&normalize(name))
    }

    /// シンボルを削除（他の順序は保つ）
    pub fn remove(&mut self, name: &str) -> Option<Symbol> {
        self.symbols.shift_remove(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// 宣言順のシンボル名（宣言時の表記）
    pub fn names(&self) -> Vec<&str> {
        self.symbols.values().map(Symbol::name).collect()
    }
}

impl IntoIterator for ScopeTable {
    type Item = Symbol;
    type IntoIter = indexmap::map::IntoValues<String, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.into_values()
    }
}
