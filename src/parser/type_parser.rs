//! 型式の解析

use crate::ast::*;
use crate::lexer::{Number, Token};

use super::{ParseResult, Parser};

impl Parser {
    /// 型を解析（`type_ident | string | array[...] of T | record ... end`）
    pub fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        match self.current_token() {
            Token::Identifier(_) | Token::String => self.parse_simple_type(),
            Token::Array => self.parse_array_type(),
            Token::Record => self.parse_record_type(),
            _ => Err(self.error_expected("type")),
        }
    }

    /// 型名または`string`を解析
    pub fn parse_simple_type(&mut self) -> ParseResult<TypeExpr> {
        match self.current_token() {
            Token::String => {
                let span = self.current_span();
                self.advance();
                Ok(TypeExpr::String(span))
            }
            Token::Identifier(_) => Ok(TypeExpr::Named(self.expect_identifier()?)),
            _ => Err(self.error_expected("type identifier")),
        }
    }

    /// 配列型を解析（`array '[' range {',' range} ']' of type`）
    pub fn parse_array_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.current_span().start;
        self.expect(Token::Array)?;
        self.expect(Token::LeftBracket)?;

        let mut ranges = vec![self.parse_subrange()?];
        while self.match_token(&Token::Comma) {
            ranges.push(self.parse_subrange()?);
        }

        self.expect(Token::RightBracket)?;
        self.expect(Token::Of)?;
        let element = self.parse_type()?;

        Ok(TypeExpr::Array(ArrayTypeExpr {
            ranges,
            element: Box::new(element),
            span: self.span_from(start),
        }))
    }

    /// 仮引数の型を解析（単純型、またはオープン配列`array of T`）
    pub(super) fn parse_param_type(&mut self) -> ParseResult<TypeExpr> {
        match self.current_token() {
            Token::Array => {
                let start = self.current_span().start;
                self.advance();
                self.expect(Token::Of)?;
                let element = self.parse_simple_type()?;
                Ok(TypeExpr::OpenArray(OpenArrayTypeExpr {
                    element: Box::new(element),
                    span: self.span_from(start),
                }))
            }
            Token::String | Token::Identifier(_) => self.parse_simple_type(),
            _ => Err(self.error_expected("parameter type")),
        }
    }

    fn parse_record_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.current_span().start;
        self.expect(Token::Record)?;

        let mut fields = Vec::new();
        while matches!(self.current_token(), Token::Identifier(_)) {
            let field_start = self.current_span().start;
            let names = self.parse_name_list()?;
            self.expect(Token::Colon)?;
            let ty = self.parse_type()?;
            fields.push(FieldDecl {
                names,
                ty,
                span: self.span_from(field_start),
            });

            if !self.match_token(&Token::Semicolon) {
                break;
            }
        }

        self.expect(Token::End)?;
        Ok(TypeExpr::Record(RecordTypeExpr {
            fields,
            span: self.span_from(start),
        }))
    }

    fn parse_subrange(&mut self) -> ParseResult<Subrange> {
        let start = self.current_span().start;
        let low = self.parse_signed_integer()?;
        self.expect(Token::DotDot)?;
        let high = self.parse_signed_integer()?;
        Ok(Subrange {
            low,
            high,
            span: self.span_from(start),
        })
    }

    fn parse_signed_integer(&mut self) -> ParseResult<i64> {
        let negative = if self.match_token(&Token::Minus) {
            true
        } else {
            self.match_token(&Token::Plus);
            false
        };

        match self.current_token() {
            Token::Number(Number::Integer(value)) => {
                let value = *value;
                self.advance();
                Ok(if negative { -value } else { value })
            }
            _ => Err(self.error_expected("integer bound")),
        }
    }
}
