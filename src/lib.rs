//! Pascalフロントエンドライブラリ
//!
//! Pascalソースを字句解析して型付きASTに変換し、
//! 同じパスで各宣言を入れ子のスコープテーブルに対して解決する。

pub mod analyzer;
pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;

// よく使う型を再エクスポート
pub use analyzer::{ScopeStack, ScopeTable, SemType, Symbol};
pub use ast::{Declaration, Expression, Program, Statement};
pub use compiler::{check_source, CheckedProgram};
pub use error::{CompileError, CompileResult, ErrorReporter, SemanticError, SyntaxError};
pub use lexer::{tokenize, Lexeme, Lexer, Token};
pub use parser::{ParseError, ParseResult, Parser};
