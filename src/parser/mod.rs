//! パーサーモジュール
//!
//! Pascalの再帰下降パーサー。構文解析と宣言時の意味解析を同じパスで行う。
//! パーサーは[`ScopeStack`](crate::analyzer::ScopeStack)を所有し、
//! `const`、`var`、`type`、`procedure`、`function`の各宣言を読んだ時点で登録する。
//!
//! ## ルーチン宣言
//!
//! ```pascal
//! function sq(n: integer): integer; forward;
//!
//! function sq(n: integer): integer;
//! begin
//!   sq := n * n
//! end;
//! ```
//!
//! ルーチンはヘッダーと本体用に専用のスコープを持つ。スコープをポップすると
//! エントリは仮引数とローカルに振り分けられ、外側のスコープにある
//! 対応するforward宣言は完成したルーチンで置き換えられる。

mod decl_parser;
mod expr_parser;
mod parser_impl;
mod stmt_parser;
mod type_parser;

pub use decl_parser::compare_params;
pub use parser_impl::Parser;

use crate::error::CompileError;
pub type ParseError = CompileError;
pub type ParseResult<T> = Result<T, ParseError>;
