//! レキサーの実装

use logos::{Lexer as LogosLexer, Logos};

use super::token::{Token, TokenKind};
use crate::ast::Span;
use crate::error::LexerError;

/// 位置情報付きのトークン
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Span,
}

impl Lexeme {
    pub fn kind(&self) -> TokenKind {
        self.token.kind()
    }
}

/// ソース文字列を借用するPascalレキサー
pub struct Lexer<'a> {
    inner: LogosLexer<'a, Token>,
    source_len: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: Token::lexer(input),
            source_len: input.len(),
        }
    }

    /// 次のレキシームを取得（入力の終わりで`None`）
    pub fn next_lexeme(&mut self) -> Option<Result<Lexeme, LexerError>> {
        let token = self.inner.next()?;
        let span: Span = self.inner.span().into();

        Some(match token {
            Ok(token) => {
                log::trace!("lexed {:?} at {}..{}", token, span.start, span.end);
                Ok(Lexeme { token, span })
            }
            Err(()) => Err(LexerError::UnrecognizedToken {
                token: self.inner.slice().to_string(),
                span,
            }),
        })
    }

    /// すべてのレキシームを集め、末尾に`Eof`を一つ付ける
    pub fn collect_tokens(mut self) -> Result<Vec<Lexeme>, LexerError> {
        let mut tokens = Vec::new();
        while let Some(lexeme) = self.next_lexeme() {
            tokens.push(lexeme?);
        }
        tokens.push(Lexeme {
            token: Token::Eof,
            span: Span::new(self.source_len, self.source_len),
        });
        Ok(tokens)
    }
}

/// ソース全体をトークン化
pub fn tokenize(input: &str) -> Result<Vec<Lexeme>, LexerError> {
    Lexer::new(input).collect_tokens()
}

/// レキシーム列のデバッグ表示（1行に1つ）
pub fn format_tokens(tokens: &[Lexeme]) -> String {
    tokens
        .iter()
        .map(|t| format!("{:<12} {:<16} @ {}..{}", t.kind().to_string(), t.token.to_string(), t.span.start, t.span.end))
        .collect::<Vec<_>>()
        .join("\n")
}
