//! フロントエンドのパイプライン（ソース → レキシーム → 検査済みプログラム）

use std::fs;
use std::path::Path;

use crate::analyzer::{ScopeStack, ScopeTable};
use crate::ast::{Declaration, Program};
use crate::error::{CompileError, CompileResult};
use crate::lexer::tokenize;
use crate::parser::Parser;

/// エラーなく解析・解決されたプログラム
#[derive(Debug, Clone)]
pub struct CheckedProgram {
    pub program: Program,
    /// プログラムレベルのシンボル。ルーチンは入れ子のテーブルを所有する
    pub globals: ScopeTable,
}

/// プログラム全体を字句解析・構文解析・名前解決する
pub fn check_source(name: &str, source: &str) -> CompileResult<CheckedProgram> {
    log::debug!("checking {}", name);

    let tokens = tokenize(source)?;
    log::debug!("{}: {} lexemes", name, tokens.len());

    let mut parser = Parser::new(tokens);
    let program = parser.parse_program()?;
    let globals = parser.into_scopes().into_global();
    log::debug!("{}: {} global symbols", name, globals.len());

    Ok(CheckedProgram { program, globals })
}

/// `path`のプログラムを読み込んで検査
pub fn check_file(path: &Path) -> CompileResult<CheckedProgram> {
    let source = fs::read_to_string(path)
        .map_err(|e| CompileError::Io(format!("failed to read {}: {}", path.display(), e)))?;
    check_source(&path.display().to_string(), &source)
}

/// 宣言部のみを新しいグローバルスコープに解析する。
/// 宣言を始めないトークンで止まり、それは入力の終端でなければならない
pub fn parse_declarations(source: &str) -> CompileResult<(Vec<Declaration>, ScopeStack)> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(tokens);
    let declarations = parser.parse_declarations()?;
    parser.expect_end()?;
    Ok((declarations, parser.into_scopes()))
}
