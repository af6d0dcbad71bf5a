//! 意味型と型式の解決

use serde::{Deserialize, Serialize};
use std::fmt;

use super::scope::ScopeStack;
use super::symbol::{normalize, Symbol};
use crate::ast::{Ident, Span, TypeExpr};
use crate::error::{SemanticError, SemanticResult};

/// 別名を含まない正規の型表現。
/// 構造が等しければ等価
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SemType {
    Integer,
    Real,
    Boolean,
    Char,
    String,
    Array {
        ranges: Vec<(i64, i64)>,
        element: Box<SemType>,
    },
    OpenArray(Box<SemType>),
    Record(Vec<RecordField>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    pub name: String,
    pub ty: SemType,
}

impl SemType {
    /// `name`という組み込み型を取得
    pub fn builtin(name: &str) -> Option<SemType> {
        match normalize(name).as_str() {
            "integer" => Some(SemType::Integer),
            "real" => Some(SemType::Real),
            "boolean" => Some(SemType::Boolean),
            "char" => Some(SemType::Char),
            "string" => Some(SemType::String),
            _ => None,
        }
    }

    pub fn is_equivalent(&self, other: &SemType) -> bool {
        self == other
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SemType::Integer | SemType::Real)
    }

    pub fn is_ordinal(&self) -> bool {
        matches!(self, SemType::Integer | SemType::Char | SemType::Boolean)
    }

    /// `value`型の値をこの型の場所に代入できるかチェック
    pub fn is_assignable_from(&self, value: &SemType) -> bool {
        if self.is_equivalent(value) {
            return true;
        }
        match (self, value) {
            (SemType::Real, SemType::Integer) => true,
            (SemType::String, SemType::Char) => true,
            (SemType::OpenArray(elem), SemType::Array { element, .. }) => {
                elem.is_equivalent(element)
            }
            _ => false,
        }
    }

    /// レコードのフィールド型を取得（大文字小文字を区別しない）
    pub fn field(&self, name: &str) -> Option<&SemType> {
        match self {
            SemType::Record(fields) => {
                let key = normalize(name);
                fields.iter().find(|f| normalize(&f.name) == key).map(|f| &f.ty)
            }
            _ => None,
        }
    }
}

/// 解決後の構造的等価性
pub fn equivalent(a: &SemType, b: &SemType) -> bool {
    a.is_equivalent(b)
}

impl fmt::Display for SemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemType::Integer => write!(f, "integer"),
            SemType::Real => write!(f, "real"),
            SemType::Boolean => write!(f, "boolean"),
            SemType::Char => write!(f, "char"),
            SemType::String => write!(f, "string"),
            SemType::Array { ranges, element } => {
                write!(f, "array[")?;
                for (i, (low, high)) in ranges.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}..{}", low, high)?;
                }
                write!(f, "] of {}", element)
            }
            SemType::OpenArray(element) => write!(f, "array of {}", element),
            SemType::Record(fields) => {
                write!(f, "record")?;
                for field in fields {
                    write!(f, " {}: {};", field.name, field.ty)?;
                }
                write!(f, " end")
            }
        }
    }
}

impl ScopeStack {
    /// 解析済みの型式を正規の意味型に変換
    ///
    /// 型名は内側から外側へ検索する。型の別名は解決済みの型を保持するため、
    /// 未解決の別名をたどることはない。組み込み型名は同名のユーザーシンボルが
    /// 見えない場合のみ有効
    pub fn resolve_type(&self, ty: &TypeExpr) -> SemanticResult<SemType> {
        match ty {
            TypeExpr::Named(ident) => self.resolve_named_type(ident),
            TypeExpr::String(_) => Ok(SemType::String),
            TypeExpr::Array(array) => {
                let mut ranges = Vec::with_capacity(array.ranges.len());
                for range in &array.ranges {
                    if range.low > range.high {
                        return Err(SemanticError::InvalidRange {
                            low: range.low,
                            high: range.high,
                            span: range.span,
                        });
                    }
                    ranges.push((range.low, range.high));
                }
                let element = self.resolve_type(&array.element)?;
                Ok(SemType::Array {
                    ranges,
                    element: Box::new(element),
                })
            }
            TypeExpr::OpenArray(array) => {
                let element = self.resolve_type(&array.element)?;
                Ok(SemType::OpenArray(Box::new(element)))
            }
            TypeExpr::Record(record) => {
                let mut fields: Vec<RecordField> = Vec::new();
                for decl in &record.fields {
                    let field_ty = self.resolve_type(&decl.ty)?;
                    for name in &decl.names {
                        if fields.iter().any(|f| normalize(&f.name) == name.key()) {
                            return Err(SemanticError::DuplicateDeclaration {
                                name: name.name.clone(),
                                span: name.span,
                            });
                        }
                        fields.push(RecordField {
                            name: name.name.clone(),
                            ty: field_ty.clone(),
                        });
                    }
                }
                Ok(SemType::Record(fields))
            }
        }
    }

    fn resolve_named_type(&self, ident: &Ident) -> SemanticResult<SemType> {
        match self.find(&ident.name, false) {
            Some(Symbol::Type(alias)) => Ok(alias.ty.clone()),
            Some(_) => Err(unknown_type(ident)),
            None => SemType::builtin(&ident.name).ok_or_else(|| unknown_type(ident)),
        }
    }

    /// `name`を解決済みの型の別名として登録
    pub fn add_alias_type(&mut self, name: &str, ty: SemType, span: Span) -> SemanticResult<()> {
        log::debug!("registered type alias {} = {}", name, ty);
        self.add(Symbol::Type(super::symbol::TypeSymbol {
            name: name.to_string(),
            ty,
            span,
        }))
    }
}

fn unknown_type(ident: &Ident) -> SemanticError {
    SemanticError::UnknownType {
        name: ident.name.clone(),
        span: ident.span,
    }
}
