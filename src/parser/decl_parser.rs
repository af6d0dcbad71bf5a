//! 宣言の解析（`const`、`var`、`type`、`procedure`、`function`）

use crate::analyzer::{equivalent, RoutineSymbol, ScopeTable, Symbol};
use crate::ast::*;
use crate::error::SemanticError;
use crate::lexer::{Token, TokenKind};

use super::{ParseResult, Parser};

/// スコープをポップする前のルーチン宣言の解析結果
struct RoutineParts {
    header: RoutineHeader,
    body: Option<RoutineBody>,
    symbol: RoutineSymbol,
}

impl Parser {
    /// 宣言部を解析。宣言を始めないトークンで止まり、そのトークンは呼び出し側に残す
    pub fn parse_declarations(&mut self) -> ParseResult<Vec<Declaration>> {
        let mut decls = Vec::new();

        loop {
            let decl = match self.current_token() {
                Token::Const => Declaration::Const(self.parse_const_section()?),
                Token::Var => Declaration::Var(self.parse_var_section()?),
                Token::Type => Declaration::Type(self.parse_type_section()?),
                Token::Function | Token::Procedure => {
                    Declaration::Routine(self.parse_routine_decl()?)
                }
                _ => return Ok(decls),
            };
            decls.push(decl);
        }
    }

    fn parse_const_section(&mut self) -> ParseResult<ConstSection> {
        let start = self.current_span().start;
        self.expect(Token::Const)?;
        self.require_kind(TokenKind::Identifier)?;

        let mut decls = Vec::new();
        while self.check_kind(TokenKind::Identifier) {
            decls.push(self.parse_const_decl()?);
        }

        Ok(ConstSection {
            decls,
            span: self.span_from(start),
        })
    }

    /// 定数宣言（`name [: type] = expression;`）
    ///
    /// 定数の型は初期化式の型になる。型注釈は検査のみ行いASTに残す
    fn parse_const_decl(&mut self) -> ParseResult<ConstDecl> {
        let start = self.current_span().start;
        let name = self.expect_identifier()?;
        self.scopes.check_duplicate(&name.name, name.span)?;

        let ty = if self.match_token(&Token::Colon) {
            let ty = self.parse_type()?;
            self.scopes.resolve_type(&ty)?;
            Some(ty)
        } else {
            None
        };

        self.expect(Token::Equal)?;
        let value = self.parse_expression()?;
        self.scopes.add_const(&name.name, value.ty.clone(), name.span)?;
        self.expect(Token::Semicolon)?;

        Ok(ConstDecl {
            name,
            ty,
            value,
            span: self.span_from(start),
        })
    }

    fn parse_var_section(&mut self) -> ParseResult<VarSection> {
        let start = self.current_span().start;
        self.expect(Token::Var)?;
        self.require_kind(TokenKind::Identifier)?;

        let mut decls = Vec::new();
        while self.check_kind(TokenKind::Identifier) {
            decls.push(self.parse_var_decl()?);
        }

        Ok(VarSection {
            decls,
            span: self.span_from(start),
        })
    }

    /// 変数宣言を解析（`a, b: type [= expression];`）
    ///
    /// 名前リストを読む間はプレースホルダーで予約し、宣言の終わりで共通の型を設定する
    fn parse_var_decl(&mut self) -> ParseResult<VarDecl> {
        let start = self.current_span().start;
        let names = self.parse_declared_names()?;

        self.expect(Token::Colon)?;
        let ty = self.parse_type()?;
        let sem_ty = self.scopes.resolve_type(&ty)?;

        let init = if self.check(&Token::Equal) {
            if names.len() > 1 {
                return Err(SemanticError::MultipleInitializers {
                    span: self.current_span(),
                }
                .into());
            }
            self.advance();
            let init = self.parse_expression()?;
            if !sem_ty.is_assignable_from(&init.ty) {
                return Err(SemanticError::TypeMismatch {
                    expected: sem_ty.to_string(),
                    found: init.ty.to_string(),
                    span: init.span,
                }
                .into());
            }
            Some(init)
        } else {
            None
        };

        self.expect(Token::Semicolon)?;

        for name in &names {
            self.scopes.add_var(&name.name, sem_ty.clone(), name.span)?;
        }

        Ok(VarDecl {
            names,
            ty,
            init,
            span: self.span_from(start),
        })
    }

    fn parse_type_section(&mut self) -> ParseResult<TypeSection> {
        let start = self.current_span().start;
        self.expect(Token::Type)?;
        self.require_kind(TokenKind::Identifier)?;

        let mut decls = Vec::new();
        while self.check_kind(TokenKind::Identifier) {
            decls.push(self.parse_type_decl()?);
        }

        Ok(TypeSection {
            decls,
            span: self.span_from(start),
        })
    }

    /// 型宣言（`name = type;`）
    fn parse_type_decl(&mut self) -> ParseResult<TypeDecl> {
        let start = self.current_span().start;
        let name = self.expect_identifier()?;
        self.scopes.check_duplicate(&name.name, name.span)?;

        self.expect(Token::Equal)?;
        let ty = self.parse_type()?;
        self.expect(Token::Semicolon)?;

        let sem_ty = self.scopes.resolve_type(&ty)?;
        self.scopes.add_alias_type(&name.name, sem_ty, name.span)?;

        Ok(TypeDecl {
            name,
            ty,
            span: self.span_from(start),
        })
    }

    /// `procedure`/`function`宣言を解析（forward宣言との照合を含む）
    fn parse_routine_decl(&mut self) -> ParseResult<RoutineDecl> {
        let start = self.current_span().start;
        let kind = match self.current_token() {
            Token::Function => RoutineKind::Function,
            _ => RoutineKind::Procedure,
        };
        self.advance();

        let name = self.expect_identifier()?;
        self.scopes.check_routine_duplicate(&name.name, name.span)?;

        self.scopes.push();
        self.routines.push(name.key());
        let parsed = self.parse_routine_in_scope(kind, &name);
        self.routines.pop();
        let table = self.scopes.pop();

        let RoutineParts {
            header,
            body,
            mut symbol,
        } = parsed?;

        for entry in table {
            match entry {
                Symbol::Parameter(_) => symbol.params.define(entry)?,
                // 再帰呼び出し用に置いたルーチン自身のエントリ
                Symbol::Routine(ref r) if r.span == name.span => {}
                _ => symbol.locals.define(entry)?,
            }
        }

        if let Some(old) = self.scopes.find_routine(&name.name, true) {
            if old.is_forward {
                let same_result = match (&old.return_type, &symbol.return_type) {
                    (None, None) => true,
                    (Some(a), Some(b)) => equivalent(a, b),
                    _ => false,
                };
                if !same_result || !compare_params(&old.params, &symbol.params) {
                    return Err(SemanticError::HeaderMismatch {
                        name: name.name.clone(),
                        span: name.span,
                    }
                    .into());
                }
                self.scopes.remove(&name.name);
                log::debug!("matched forward declaration of {}", name);
            }
        }

        self.scopes.add_routine(symbol)?;

        Ok(RoutineDecl {
            kind,
            header,
            body,
            span: self.span_from(start),
        })
    }

    /// ルーチンのヘッダーと本体を解析（ルーチンのスコープをプッシュした状態で呼ぶ）
    fn parse_routine_in_scope(&mut self, kind: RoutineKind, name: &Ident) -> ParseResult<RoutineParts> {
        let header_start = name.span.start;

        // 仮引数を読む間は関数名を予約
        if kind == RoutineKind::Function {
            self.scopes.add_placeholder(&name.name, name.span)?;
        }

        // `p`、`p()`、`p(...)`のいずれも有効なヘッダー
        let params = if self.match_token(&Token::LeftParen) {
            let params = if self.check(&Token::RightParen) {
                Vec::new()
            } else {
                self.parse_formal_params()?
            };
            self.expect(Token::RightParen)?;
            params
        } else {
            Vec::new()
        };

        let (return_type, sem_return) = match kind {
            RoutineKind::Function => {
                self.expect(Token::Colon)?;
                let ty = self.parse_simple_type()?;
                let sem_ty = self.scopes.resolve_type(&ty)?;
                self.scopes.remove(&name.name);
                (Some(ty), Some(sem_ty))
            }
            RoutineKind::Procedure => (None, None),
        };

        let header = RoutineHeader {
            name: name.clone(),
            params,
            return_type,
            span: self.span_from(header_start),
        };
        self.expect(Token::Semicolon)?;

        let mut symbol = RoutineSymbol::new(name.name.clone(), sem_return, name.span);
        // 本体から見えるコピーは再帰呼び出し用のシグネチャを持つ
        let mut visible = symbol.clone();
        visible.params = self.declared_parameters();
        if kind == RoutineKind::Function {
            self.scopes.add_routine(visible.clone())?;
        }

        let body = if self.match_token(&Token::Forward) {
            symbol.is_forward = true;
            None
        } else {
            let body_start = self.current_span().start;
            let declarations = self.parse_declarations()?;

            if kind == RoutineKind::Procedure && !self.scopes.contains(&name.name) {
                self.scopes.add_routine(visible)?;
            }
            self.check_pending_forwards()?;

            let block = self.parse_compound_block()?;
            symbol.body = Some(block.clone());
            Some(RoutineBody {
                declarations,
                block,
                span: self.span_from(body_start),
            })
        };

        self.expect(Token::Semicolon)?;

        Ok(RoutineParts {
            header,
            body,
            symbol,
        })
    }

    fn parse_formal_params(&mut self) -> ParseResult<Vec<FormalParam>> {
        let mut params = vec![self.parse_formal_param()?];
        while self.match_token(&Token::Semicolon) {
            params.push(self.parse_formal_param()?);
        }
        Ok(params)
    }

    /// 仮引数グループを解析（`[var|const|out] a, b: type`）
    fn parse_formal_param(&mut self) -> ParseResult<FormalParam> {
        let start = self.current_span().start;
        let mode = match self.current_token() {
            Token::Var => PassingMode::Var,
            Token::Const => PassingMode::Const,
            Token::Out => PassingMode::Out,
            _ => PassingMode::Value,
        };
        if mode != PassingMode::Value {
            self.advance();
        }

        let names = self.parse_declared_names()?;
        self.expect(Token::Colon)?;
        let ty = self.parse_param_type()?;
        let sem_ty = self.scopes.resolve_type(&ty)?;

        for name in &names {
            self.scopes
                .add_parameter(&name.name, sem_ty.clone(), mode, name.span)?;
        }

        Ok(FormalParam {
            mode,
            names,
            ty,
            span: self.span_from(start),
        })
    }

    /// `ident {, ident}`を解析。読んだ名前を現在のスコープで順に予約し、
    /// リスト内の重複をその場で検出する
    fn parse_declared_names(&mut self) -> ParseResult<Vec<Ident>> {
        let mut names = Vec::new();
        loop {
            let ident = self.expect_identifier()?;
            self.scopes.add_placeholder(&ident.name, ident.span)?;
            names.push(ident);

            if !self.match_token(&Token::Comma) {
                return Ok(names);
            }
        }
    }

    /// 現在のスコープに登録済みの仮引数（宣言順）
    fn declared_parameters(&self) -> ScopeTable {
        let mut params = ScopeTable::new();
        for symbol in self.scopes.current().iter().filter(|s| s.is_parameter()) {
            // 同じテーブル内の名前は一意
            let _ = params.define(symbol.clone());
        }
        params
    }

    /// 現在のスコープで`forward`宣言されたルーチンに本体がなければエラー
    pub(super) fn check_pending_forwards(&self) -> ParseResult<()> {
        if let Some(routine) = self.scopes.pending_forwards().next() {
            return Err(SemanticError::UnresolvedForward {
                name: routine.name.clone(),
                span: routine.span,
            }
            .into());
        }
        Ok(())
    }
}

/// 完成したルーチンの仮引数がforward宣言と一致するかチェック
///
/// 仮引数は名前で対応付け、型は等価でなければならない。
/// 位置と渡し方は比較しない。
pub fn compare_params(old: &ScopeTable, new: &ScopeTable) -> bool {
    if old.len() != new.len() {
        return false;
    }

    old.iter().all(|old_param| match new.get(old_param.name()) {
        Some(new_param) => match (old_param.value_type(), new_param.value_type()) {
            (Some(a), Some(b)) => equivalent(a, b),
            _ => false,
        },
        None => false,
    })
}
