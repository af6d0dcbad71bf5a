//! メインパーサー構造とユーティリティ

use crate::analyzer::ScopeStack;
use crate::ast::*;
use crate::error::SyntaxError;
use crate::lexer::{Lexeme, Token, TokenKind};

use super::{ParseError, ParseResult};

/// 再帰下降型のPascalパーサー
///
/// パーサーはスコープスタックを所有し、各宣言は解析した時点で登録・検査される。
/// 解析に成功すればASTと埋まったシンボルテーブルの両方が得られる。
pub struct Parser {
    pub(super) tokens: Vec<Lexeme>,
    pub(super) current: usize,
    pub(super) scopes: ScopeStack,
    /// 本体を解析中のルーチン名（正規化済み、最も内側が末尾）
    pub(super) routines: Vec<String>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Lexeme>) -> Self {
        if !matches!(tokens.last(), Some(Lexeme { token: Token::Eof, .. })) {
            let end = tokens.last().map(|l| l.span.end).unwrap_or(0);
            tokens.push(Lexeme {
                token: Token::Eof,
                span: Span::new(end, end),
            });
        }
        Self {
            tokens,
            current: 0,
            scopes: ScopeStack::new(),
            routines: Vec::new(),
        }
    }

    /// 完全なプログラムを解析
    /// `program name [(files)]; declarations begin ... end.`
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let start = self.current_span().start;
        self.expect(Token::Program)?;
        let name = self.expect_identifier()?;

        if self.match_token(&Token::LeftParen) {
            self.parse_name_list()?;
            self.expect(Token::RightParen)?;
        }
        self.expect(Token::Semicolon)?;

        let declarations = self.parse_declarations()?;
        self.check_pending_forwards()?;
        let block = self.parse_compound_block()?;

        self.expect(Token::Dot)?;
        self.expect(Token::Eof)?;

        Ok(Program {
            name,
            declarations,
            block,
            span: self.span_from(start),
        })
    }

    /// 入力をすべて消費していなければエラー
    pub fn expect_end(&mut self) -> ParseResult<()> {
        self.expect(Token::Eof).map(|_| ())
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn into_scopes(self) -> ScopeStack {
        self.scopes
    }

    // ==================== カーソル操作 ====================

    pub(super) fn current_token(&self) -> &Token {
        &self.tokens[self.current].token
    }

    pub(super) fn current_span(&self) -> Span {
        self.tokens[self.current].span
    }


    /// 開始位置から直前に消費したトークンの終端までのスパンを作成
    pub(super) fn span_from(&self, start: usize) -> Span {
        let end = if self.current > 0 {
            self.tokens[self.current - 1].span.end
        } else {
            self.current_span().end
        };
        Span::new(start, end.max(start))
    }

    pub(super) fn advance(&mut self) {
        if !self.is_at_end() {
            log::trace!("consumed {}", self.current_token());
            self.current += 1;
        }
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.current_token(), Token::Eof)
    }

    /// 現在のトークンが`token`かチェック（ペイロードは無視）
    pub(super) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current_token()) == std::mem::discriminant(token)
    }

    pub(super) fn check_kind(&self, kind: TokenKind) -> bool {
        self.current_token().kind() == kind
    }

    pub(super) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// `token`を消費、なければ構文エラー
    pub(super) fn expect(&mut self, token: Token) -> ParseResult<Span> {
        if self.check(&token) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.error_expected(format!("'{}'", token)))
        }
    }

    /// 現在のトークンの種別を検査（消費しない）
    pub(super) fn require_kind(&self, kind: TokenKind) -> ParseResult<()> {
        if self.check_kind(kind) {
            Ok(())
        } else {
            Err(self.error_expected(kind.to_string()))
        }
    }

    pub(super) fn expect_identifier(&mut self) -> ParseResult<Ident> {
        match self.current_token() {
            Token::Identifier(name) => {
                let ident = Ident::new(name.clone(), self.current_span());
                self.advance();
                Ok(ident)
            }
            _ => Err(self.error_expected("identifier")),
        }
    }

    /// `ident {, ident}`を解析（登録はしない）
    pub(super) fn parse_name_list(&mut self) -> ParseResult<Vec<Ident>> {
        let mut names = vec![self.expect_identifier()?];
        while self.match_token(&Token::Comma) {
            names.push(self.expect_identifier()?);
        }
        Ok(names)
    }

    pub(super) fn error_expected(&self, expected: impl Into<String>) -> ParseError {
        let found = match self.current_token() {
            Token::Eof => "end of file".to_string(),
            token => format!("'{}'", token),
        };
        SyntaxError::UnexpectedToken {
            expected: expected.into(),
            found,
            span: self.current_span(),
        }
        .into()
    }
}
