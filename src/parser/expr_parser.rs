//! 型付き式の解析
//!
//! Pascalの優先順位は4段階:
//!
//! | 段階           | 演算子                                      |
//! |----------------|---------------------------------------------|
//! | 関係           | `= <> < > <= >=`                            |
//! | 加法           | `+ - or xor`                                |
//! | 乗法           | `* / div mod and shl shr << >>`             |
//! | 単項           | `not - +`                                   |
//!
//! 各ノードは構築時に型付けされるため、型エラーは原因となった演算子の位置で報告される。

use crate::analyzer::{ParamSymbol, SemType, Symbol};
use crate::ast::*;
use crate::error::SemanticError;
use crate::lexer::{Number, Token};

use super::{ParseResult, Parser};

impl Parser {
    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        let left = self.parse_simple_expression()?;

        if let Some(op) = relational_op(self.current_token()) {
            self.advance();
            let right = self.parse_simple_expression()?;
            return binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_simple_expression(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_term()?;

        while let Some(op) = additive_op(self.current_token()) {
            self.advance();
            let right = self.parse_term()?;
            left = binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_factor()?;

        while let Some(op) = multiplicative_op(self.current_token()) {
            self.advance();
            let right = self.parse_factor()?;
            left = binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<Expression> {
        let start = self.current_span().start;

        let unary_op = match self.current_token() {
            Token::Not => Some(UnaryOp::Not),
            Token::Minus => Some(UnaryOp::Negate),
            Token::Plus => Some(UnaryOp::Plus),
            _ => None,
        };
        if let Some(op) = unary_op {
            self.advance();
            let operand = self.parse_factor()?;
            let ty = unary_type(op, &operand)?;
            return Ok(Expression::new(
                ExprKind::Unary(UnaryExpr {
                    op,
                    operand: Box::new(operand),
                }),
                ty,
                self.span_from(start),
            ));
        }

        let span = self.current_span();
        let (kind, ty) = match self.current_token() {
            Token::Number(Number::Integer(v)) => (ExprKind::Integer(*v), SemType::Integer),
            Token::Number(Number::Real(v)) => (ExprKind::Real(*v), SemType::Real),
            Token::CharLiteral(c) => (ExprKind::Char(*c), SemType::Char),
            Token::StringLiteral(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => (ExprKind::Char(c), SemType::Char),
                    _ => (ExprKind::String(s.clone()), SemType::String),
                }
            }
            Token::True => (ExprKind::Boolean(true), SemType::Boolean),
            Token::False => (ExprKind::Boolean(false), SemType::Boolean),
            Token::LeftParen => {
                self.advance();
                let mut inner = self.parse_expression()?;
                self.expect(Token::RightParen)?;
                inner.span = self.span_from(start);
                return Ok(inner);
            }
            Token::Identifier(_) => return self.parse_designator(),
            _ => return Err(self.error_expected("expression")),
        };
        self.advance();
        Ok(Expression::new(kind, ty, span))
    }

    /// 値の位置にある名前を解析（変数・定数・仮引数・関数呼び出し）
    /// 続く添字とフィールドのセレクタも含む
    fn parse_designator(&mut self) -> ParseResult<Expression> {
        let name = self.expect_identifier()?;

        let base = match self.scopes.find(&name.name, false) {
            Some(Symbol::Var(v)) | Some(Symbol::Constant(v)) => {
                Expression::new(ExprKind::Variable(name.clone()), v.ty.clone(), name.span)
            }
            Some(Symbol::Parameter(p)) => {
                Expression::new(ExprKind::Variable(name.clone()), p.ty.clone(), name.span)
            }
            Some(Symbol::Routine(r)) if r.is_function() => {
                let params: Vec<ParamSymbol> = r.parameters().cloned().collect();
                let return_type = r.return_type.clone().unwrap_or(SemType::Integer);
                let args = self.parse_call_args(&name, &params)?;
                Expression::new(
                    ExprKind::Call(CallExpr {
                        callee: name.clone(),
                        args,
                    }),
                    return_type,
                    self.span_from(name.span.start),
                )
            }
            Some(Symbol::Routine(_)) | Some(Symbol::Type(_)) => {
                return Err(SemanticError::NotAValue {
                    name: name.name,
                    span: name.span,
                }
                .into())
            }
            Some(Symbol::Unresolved(_)) | None => {
                return Err(SemanticError::UndeclaredIdentifier {
                    name: name.name,
                    span: name.span,
                }
                .into())
            }
        };

        self.parse_selectors(base)
    }

    /// `base`に続く`[i, j]`と`.field`セレクタを解析
    pub(super) fn parse_selectors(&mut self, mut base: Expression) -> ParseResult<Expression> {
        let start = base.span.start;

        loop {
            match self.current_token() {
                Token::LeftBracket => {
                    self.advance();
                    let mut indices = vec![self.parse_expression()?];
                    while self.match_token(&Token::Comma) {
                        indices.push(self.parse_expression()?);
                    }
                    self.expect(Token::RightBracket)?;

                    let span = self.span_from(start);
                    let ty = index_type(&base.ty, &indices, span)?;
                    base = Expression::new(
                        ExprKind::Index(IndexExpr {
                            base: Box::new(base),
                            indices,
                        }),
                        ty,
                        span,
                    );
                }
                Token::Dot => {
                    self.advance();
                    let field = self.expect_identifier()?;
                    let ty = match &base.ty {
                        SemType::Record(_) => base.ty.field(&field.name).cloned().ok_or_else(|| {
                            SemanticError::UndeclaredIdentifier {
                                name: field.name.clone(),
                                span: field.span,
                            }
                        })?,
                        other => {
                            return Err(SemanticError::InvalidOperand {
                                op: ".".to_string(),
                                ty: other.to_string(),
                                span: field.span,
                            }
                            .into())
                        }
                    };
                    base = Expression::new(
                        ExprKind::Field(FieldExpr {
                            base: Box::new(base),
                            field,
                        }),
                        ty,
                        self.span_from(start),
                    );
                }
                _ => return Ok(base),
            }
        }
    }

    /// 省略可能な`(args)`を解析し、`params`と宣言順に照合
    pub(super) fn parse_call_args(
        &mut self,
        callee: &Ident,
        params: &[ParamSymbol],
    ) -> ParseResult<Vec<Expression>> {
        let args = self.parse_arguments()?;

        if args.len() != params.len() {
            return Err(SemanticError::ArgumentCountMismatch {
                name: callee.name.clone(),
                expected: params.len(),
                found: args.len(),
                span: self.span_from(callee.span.start),
            }
            .into());
        }

        for (param, arg) in params.iter().zip(&args) {
            if !param.ty.is_assignable_from(&arg.ty) {
                return Err(SemanticError::TypeMismatch {
                    expected: param.ty.to_string(),
                    found: arg.ty.to_string(),
                    span: arg.span,
                }
                .into());
            }
            let by_reference = matches!(param.mode, PassingMode::Var | PassingMode::Out);
            if by_reference && !is_designator(arg) {
                return Err(SemanticError::NotAssignable {
                    name: param.name.clone(),
                    span: arg.span,
                }
                .into());
            }
        }

        Ok(args)
    }

    /// `['(' [expr {',' expr}] ')']`を解析（検査なし）
    pub(super) fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();
        if !self.match_token(&Token::LeftParen) {
            return Ok(args);
        }
        if !self.check(&Token::RightParen) {
            args.push(self.parse_expression()?);
            while self.match_token(&Token::Comma) {
                args.push(self.parse_expression()?);
            }
        }
        self.expect(Token::RightParen)?;
        Ok(args)
    }
}

fn relational_op(token: &Token) -> Option<BinaryOp> {
    Some(match token {
        Token::Equal => BinaryOp::Equal,
        Token::NotEqual => BinaryOp::NotEqual,
        Token::Less => BinaryOp::Less,
        Token::Greater => BinaryOp::Greater,
        Token::LessEqual => BinaryOp::LessEqual,
        Token::GreaterEqual => BinaryOp::GreaterEqual,
        _ => return None,
    })
}

fn additive_op(token: &Token) -> Option<BinaryOp> {
    Some(match token {
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Subtract,
        Token::Or => BinaryOp::Or,
        Token::Xor => BinaryOp::Xor,
        _ => return None,
    })
}

fn multiplicative_op(token: &Token) -> Option<BinaryOp> {
    Some(match token {
        Token::Star => BinaryOp::Multiply,
        Token::Slash => BinaryOp::Divide,
        Token::Div => BinaryOp::IntDiv,
        Token::Mod => BinaryOp::Modulo,
        Token::And => BinaryOp::And,
        Token::Shl | Token::LtLt => BinaryOp::Shl,
        Token::Shr | Token::GtGt => BinaryOp::Shr,
        _ => return None,
    })
}

/// `expr`が格納場所を表すかチェック
pub(super) fn is_designator(expr: &Expression) -> bool {
    matches!(
        expr.kind,
        ExprKind::Variable(_) | ExprKind::FunctionResult(_) | ExprKind::Index(_) | ExprKind::Field(_)
    )
}

fn binary(op: BinaryOp, left: Expression, right: Expression) -> ParseResult<Expression> {
    let span = left.span.to(right.span);
    let ty = binary_type(op, &left.ty, &right.ty).ok_or_else(|| SemanticError::InvalidOperand {
        op: op.to_string(),
        ty: format!("{} and {}", left.ty, right.ty),
        span,
    })?;

    Ok(Expression::new(
        ExprKind::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }),
        ty,
        span,
    ))
}

/// `left op right`の結果型（オペランドが合わなければ`None`）
pub(super) fn binary_type(op: BinaryOp, left: &SemType, right: &SemType) -> Option<SemType> {
    use SemType::*;

    let textual = |t: &SemType| matches!(t, String | Char);

    match op {
        BinaryOp::Add if textual(left) && textual(right) => Some(String),
        BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply => match (left, right) {
            (Integer, Integer) => Some(Integer),
            (l, r) if l.is_numeric() && r.is_numeric() => Some(Real),
            _ => None,
        },
        BinaryOp::Divide => (left.is_numeric() && right.is_numeric()).then_some(Real),
        BinaryOp::IntDiv | BinaryOp::Modulo | BinaryOp::Shl | BinaryOp::Shr => {
            matches!((left, right), (Integer, Integer)).then_some(Integer)
        }
        BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => match (left, right) {
            (Boolean, Boolean) => Some(Boolean),
            (Integer, Integer) => Some(Integer),
            _ => None,
        },
        _ => {
            let comparable = (left.is_numeric() && right.is_numeric())
                || (textual(left) && textual(right))
                || (left.is_ordinal() && left.is_equivalent(right));
            comparable.then_some(Boolean)
        }
    }
}

fn unary_type(op: UnaryOp, operand: &Expression) -> ParseResult<SemType> {
    let ok = match op {
        UnaryOp::Negate | UnaryOp::Plus => operand.ty.is_numeric(),
        UnaryOp::Not => matches!(operand.ty, SemType::Boolean | SemType::Integer),
    };
    if ok {
        Ok(operand.ty.clone())
    } else {
        Err(SemanticError::InvalidOperand {
            op: op.to_string(),
            ty: operand.ty.to_string(),
            span: operand.span,
        }
        .into())
    }
}

/// `base`型の値を添字アクセスした要素型
fn index_type(base: &SemType, indices: &[Expression], span: Span) -> ParseResult<SemType> {
    let invalid = || SemanticError::InvalidOperand {
        op: "[]".to_string(),
        ty: base.to_string(),
        span,
    };

    if let Some(index) = indices.iter().find(|i| !i.ty.is_ordinal()) {
        return Err(SemanticError::TypeMismatch {
            expected: "ordinal index".to_string(),
            found: index.ty.to_string(),
            span: index.span,
        }
        .into());
    }

    let ty = match base {
        SemType::Array { ranges, element } if indices.len() == ranges.len() => (**element).clone(),
        SemType::Array { ranges, element } if indices.len() < ranges.len() => SemType::Array {
            ranges: ranges[indices.len()..].to_vec(),
            element: element.clone(),
        },
        SemType::OpenArray(element) if indices.len() == 1 => (**element).clone(),
        SemType::String if indices.len() == 1 => SemType::Char,
        _ => return Err(invalid().into()),
    };
    Ok(ty)
}
