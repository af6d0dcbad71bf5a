//! 宣言のノード

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Block, Expression, Ident, Span, TypeExpr};

/// 宣言部の一要素（ソース順）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declaration {
    Const(ConstSection),
    Var(VarSection),
    Type(TypeSection),
    Routine(RoutineDecl),
}

impl Declaration {
    pub fn span(&self) -> Span {
        match self {
            Declaration::Const(s) => s.span,
            Declaration::Var(s) => s.span,
            Declaration::Type(s) => s.span,
            Declaration::Routine(r) => r.span,
        }
    }
}

/// `const`と1つ以上の定数宣言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstSection {
    pub decls: Vec<ConstDecl>,
    pub span: Span,
}

/// 定数宣言（`name [: type] = expression;`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub name: Ident,
    pub ty: Option<TypeExpr>,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarSection {
    pub decls: Vec<VarDecl>,
    pub span: Span,
}

/// 変数宣言（`a, b, c: type [= expression];`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub init: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSection {
    pub decls: Vec<TypeDecl>,
    pub span: Span,
}

/// 型宣言（`name = type;`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutineKind {
    Procedure,
    Function,
}

/// 手続きまたは関数の宣言。forward宣言では`body`が`None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineDecl {
    pub kind: RoutineKind,
    pub header: RoutineHeader,
    pub body: Option<RoutineBody>,
    pub span: Span,
}

impl RoutineDecl {
    pub fn is_forward(&self) -> bool {
        self.body.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineHeader {
    pub name: Ident,
    pub params: Vec<FormalParam>,
    pub return_type: Option<TypeExpr>,
    pub span: Span,
}

/// 引数の渡し方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PassingMode {
    #[default]
    Value,
    Var,
    Const,
    Out,
}

impl fmt::Display for PassingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassingMode::Value => write!(f, "value"),
            PassingMode::Var => write!(f, "var"),
            PassingMode::Const => write!(f, "const"),
            PassingMode::Out => write!(f, "out"),
        }
    }
}

/// ルーチンヘッダー内の仮引数グループ（`[var|const|out] a, b: type`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormalParam {
    pub mode: PassingMode,
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub span: Span,
}

/// ローカル宣言とルーチンの複合文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineBody {
    pub declarations: Vec<Declaration>,
    pub block: Block,
    pub span: Span,
}
