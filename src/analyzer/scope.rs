//! レキシカルスコープのスタック

use super::symbol::{Placeholder, ParamSymbol, RoutineSymbol, ScopeTable, Symbol, VarSymbol};
use super::types::SemType;
use crate::ast::{PassingMode, Span};
use crate::error::{SemanticError, SemanticResult};

/// スコープテーブルのスタック（最も内側が末尾）
///
/// 最も外側（グローバル）のテーブルは常に存在し、ポップされない。
#[derive(Debug, Clone)]
pub struct ScopeStack {
    tables: Vec<ScopeTable>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            tables: vec![ScopeTable::new()],
        }
    }

    /// スタック上のテーブル数（グローバルのみなら1）
    pub fn depth(&self) -> usize {
        self.tables.len()
    }

    pub fn push(&mut self) {
        self.tables.push(ScopeTable::new());
        log::debug!("pushed scope (depth {})", self.tables.len());
    }

    /// 最も内側のテーブルを取り出す
    ///
    /// # Panics
    ///
    /// グローバルのテーブルしか残っていない場合。`pop`は必ず`push`と対応する
    pub fn pop(&mut self) -> ScopeTable {
        assert!(self.tables.len() > 1, "attempted to pop the global scope");
        let table = self.tables.pop().unwrap_or_default();
        log::debug!("popped scope (depth {})", self.tables.len());
        table
    }

    pub fn current(&self) -> &ScopeTable {
        &self.tables[self.tables.len() - 1]
    }

    fn current_mut(&mut self) -> &mut ScopeTable {
        let last = self.tables.len() - 1;
        &mut self.tables[last]
    }

    pub fn global(&self) -> &ScopeTable {
        &self.tables[0]
    }

    /// スタックを消費してグローバルのテーブルを返す
    pub fn into_global(mut self) -> ScopeTable {
        self.tables.swap_remove(0)
    }

    /// `name`を最も内側のテーブルのみ、または内側から外側へ検索
    pub fn find(&self, name: &str, local_only: bool) -> Option<&Symbol> {
        if local_only {
            return self.current().get(name);
        }
        self.tables.iter().rev().find_map(|table| table.get(name))
    }

    /// [`find`](Self::find)と同じだが手続きと関数のみ対象
    pub fn find_routine(&self, name: &str, local_only: bool) -> Option<&RoutineSymbol> {
        self.find(name, local_only).and_then(Symbol::as_routine)
    }

    pub fn add(&mut self, symbol: Symbol) -> SemanticResult<()> {
        self.current_mut().define(symbol)
    }

    pub fn check_duplicate(&self, name: &str, span: Span) -> SemanticResult<()> {
        if self.contains(name) {
            return Err(SemanticError::DuplicateDeclaration {
                name: name.to_string(),
                span,
            });
        }
        Ok(())
    }

    /// [`check_duplicate`](Self::check_duplicate)と同じだが、
    /// 同名のforward宣言済みルーチンは後で完成するものとしてエラーにしない
    pub fn check_routine_duplicate(&self, name: &str, span: Span) -> SemanticResult<()> {
        match self.current().get(name) {
            None => Ok(()),
            Some(Symbol::Routine(routine)) if routine.is_forward => Ok(()),
            Some(_) => Err(SemanticError::DuplicateDeclaration {
                name: name.to_string(),
                span,
            }),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Symbol> {
        self.current_mut().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.current().contains(name)
    }

    /// 最も内側のテーブルで`symbol`の名前に予約したプレースホルダーを置き換える（位置は保つ）
    pub fn resolve_placeholder(&mut self, symbol: Symbol) -> SemanticResult<()> {
        match self.current().get(symbol.name()) {
            None => return self.add(symbol),
            Some(Symbol::Unresolved(_)) => {}
            Some(_) => {
                return Err(SemanticError::DuplicateDeclaration {
                    name: symbol.name().to_string(),
                    span: symbol.span(),
                })
            }
        }
        if let Some(slot) = self.current_mut().get_mut(symbol.name()) {
            *slot = symbol;
        }
        Ok(())
    }

    pub fn add_placeholder(&mut self, name: &str, span: Span) -> SemanticResult<()> {
        self.add(Symbol::Unresolved(Placeholder {
            name: name.to_string(),
            span,
        }))
    }

    /// `name`のプレースホルダーを埋める。なければ新しく追加
    pub fn add_var(&mut self, name: &str, ty: SemType, span: Span) -> SemanticResult<()> {
        log::debug!("registered var {}: {}", name, ty);
        self.resolve_placeholder(Symbol::Var(VarSymbol {
            name: name.to_string(),
            ty,
            span,
        }))
    }

    pub fn add_const(&mut self, name: &str, ty: SemType, span: Span) -> SemanticResult<()> {
        log::debug!("registered const {}: {}", name, ty);
        self.add(Symbol::Constant(VarSymbol {
            name: name.to_string(),
            ty,
            span,
        }))
    }

    /// 仮引数版の[`ScopeStack::add_var`]
    pub fn add_parameter(
        &mut self,
        name: &str,
        ty: SemType,
        mode: PassingMode,
        span: Span,
    ) -> SemanticResult<()> {
        log::debug!("registered {} parameter {}: {}", mode, name, ty);
        self.resolve_placeholder(Symbol::Parameter(ParamSymbol {
            name: name.to_string(),
            ty,
            mode,
            span,
        }))
    }

    pub fn add_routine(&mut self, routine: RoutineSymbol) -> SemanticResult<()> {
        log::debug!(
            "registered {} {} ({} params, {} locals{})",
            if routine.is_function() { "function" } else { "procedure" },
            routine.name,
            routine.params.len(),
            routine.locals.len(),
            if routine.is_forward { ", forward" } else { "" }
        );
        self.add(Symbol::Routine(routine))
    }

    /// 最も内側のテーブルで本体待ちのルーチン
    pub fn pending_forwards(&self) -> impl Iterator<Item = &RoutineSymbol> {
        self.current()
            .iter()
            .filter_map(Symbol::as_routine)
            .filter(|r| r.is_forward)
    }
}
