//! Pascalソースの字句解析モジュール
//!
//! ソーステキストを[`Lexeme`]の列に変換する。各レキシームは[`Token`]（トークンの識別）、
//! [`TokenKind`]（種別）、バイト単位のスパンを持つ。列の末尾は必ず一つの[`Token::Eof`]。

mod lexer;
mod token;

pub use lexer::{format_tokens, tokenize, Lexeme, Lexer};
pub use token::{Number, Token, TokenKind};
