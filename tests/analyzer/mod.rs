//! スコープ解決テスト共通のヘルパー

use pascalc::analyzer::{ParamSymbol, ScopeStack, ScopeTable, SemType, Symbol};
use pascalc::ast::{PassingMode, Span};

pub fn param(name: &str, ty: SemType) -> Symbol {
    param_with_mode(name, ty, PassingMode::Value)
}

pub fn param_with_mode(name: &str, ty: SemType, mode: PassingMode) -> Symbol {
    Symbol::Parameter(ParamSymbol {
        name: name.to_string(),
        ty,
        mode,
        span: Span::dummy(),
    })
}

pub fn table(symbols: Vec<Symbol>) -> ScopeTable {
    let mut table = ScopeTable::new();
    for symbol in symbols {
        table.define(symbol).expect("test tables have unique names");
    }
    table
}

/// グローバルの上にスコープを一つプッシュしたスタック
pub fn nested_stack() -> ScopeStack {
    let mut scopes = ScopeStack::new();
    scopes.push();
    scopes
}
