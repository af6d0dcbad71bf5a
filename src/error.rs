//! 統一エラーハンドリング
//!
//! フロントエンドのエラーは字句エラー、構文エラー（文法検査で想定外のトークン）、
//! 意味エラー（スコープ、型、forward宣言の違反）に分かれる。
//! いずれも[`Span`]を持ち、`codespan-reporting`で表示する。

use crate::ast::Span;
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;

/// フロントエンドの最上位エラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("lexical error: {0}")]
    Lexer(#[from] LexerError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),

    #[error("i/o error: {0}")]
    Io(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexerError {
    #[error("unrecognized token '{token}'")]
    UnrecognizedToken { token: String, span: Span },
}

/// `require`系の文法検査が出すエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
}

/// スコープスタック、型解決、ルーチンの統合処理が出すエラー
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("duplicate declaration of '{name}'")]
    DuplicateDeclaration { name: String, span: Span },

    #[error("unknown type '{name}'")]
    UnknownType { name: String, span: Span },

    #[error("undeclared identifier '{name}'")]
    UndeclaredIdentifier { name: String, span: Span },

    #[error("'{name}' is not a value")]
    NotAValue { name: String, span: Span },

    #[error("'{name}' is not a procedure or function")]
    NotCallable { name: String, span: Span },

    #[error("headers doesn't match: '{name}' differs from its forward declaration")]
    HeaderMismatch { name: String, span: Span },

    #[error("only one var can be initialized")]
    MultipleInitializers { span: Span },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("operator '{op}' cannot be applied to {ty}")]
    InvalidOperand { op: String, ty: String, span: Span },

    #[error("'{name}' expects {expected} argument(s), found {found}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("cannot assign to '{name}'")]
    NotAssignable { name: String, span: Span },

    #[error("invalid range {low}..{high}")]
    InvalidRange { low: i64, high: i64, span: Span },

    #[error("forward declaration of '{name}' is never completed")]
    UnresolvedForward { name: String, span: Span },
}

impl SemanticError {
    pub fn span(&self) -> Span {
        match self {
            SemanticError::DuplicateDeclaration { span, .. }
            | SemanticError::UnknownType { span, .. }
            | SemanticError::UndeclaredIdentifier { span, .. }
            | SemanticError::NotAValue { span, .. }
            | SemanticError::NotCallable { span, .. }
            | SemanticError::HeaderMismatch { span, .. }
            | SemanticError::MultipleInitializers { span }
            | SemanticError::TypeMismatch { span, .. }
            | SemanticError::InvalidOperand { span, .. }
            | SemanticError::ArgumentCountMismatch { span, .. }
            | SemanticError::NotAssignable { span, .. }
            | SemanticError::InvalidRange { span, .. }
            | SemanticError::UnresolvedForward { span, .. } => *span,
        }
    }
}

impl CompileError {
    /// エラーの位置を取得
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Lexer(LexerError::UnrecognizedToken { span, .. }) => Some(*span),
            CompileError::Syntax(SyntaxError::UnexpectedToken { span, .. }) => Some(*span),
            CompileError::Semantic(e) => Some(e.span()),
            CompileError::Io(_) => None,
        }
    }

    /// `codespan-reporting`の診断に変換
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        let (message, note) = match self {
            CompileError::Lexer(e) => (e.to_string(), "not a valid Pascal token"),
            CompileError::Syntax(e) => (e.to_string(), "unexpected here"),
            CompileError::Semantic(e) => (
                e.to_string(),
                match e {
                    SemanticError::DuplicateDeclaration { .. } => "already declared in this scope",
                    SemanticError::HeaderMismatch { .. } => "header differs from the forward declaration",
                    SemanticError::UnresolvedForward { .. } => "declared forward here",
                    _ => "",
                },
            ),
            CompileError::Io(message) => (message.clone(), ""),
        };

        let labels = match self.span() {
            Some(span) => {
                let label = Label::primary(file_id, span.start..span.end);
                if note.is_empty() {
                    vec![label]
                } else {
                    vec![label.with_message(note)]
                }
            }
            None => vec![],
        };

        Diagnostic::error().with_message(message).with_labels(labels)
    }
}

/// 単一ソースファイルの診断を表示
pub struct ErrorReporter {
    files: SimpleFiles<String, String>,
    file_id: usize,
}

impl ErrorReporter {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let mut files = SimpleFiles::new();
        let file_id = files.add(name.into(), source.into());
        Self { files, file_id }
    }

    pub fn file_id(&self) -> usize {
        self.file_id
    }

    /// `error`の診断を標準エラーに出力
    pub fn emit(&self, error: &CompileError) -> CompileResult<()> {
        let writer = StandardStream::stderr(ColorChoice::Auto);
        let config = codespan_reporting::term::Config::default();
        let diagnostic = error.to_diagnostic(self.file_id);
        codespan_reporting::term::emit(&mut writer.lock(), &config, &self.files, &diagnostic)
            .map_err(|e| CompileError::Io(format!("failed to emit diagnostic: {}", e)))?;
        Ok(())
    }
}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        CompileError::Io(e.to_string())
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
pub type SemanticResult<T> = Result<T, SemanticError>;
