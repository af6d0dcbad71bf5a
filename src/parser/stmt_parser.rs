//! 文の解析

use crate::analyzer::{ParamSymbol, SemType, Symbol};
use crate::ast::*;
use crate::error::SemanticError;
use crate::lexer::Token;

use super::expr_parser::{binary_type, is_designator};
use super::{ParseResult, Parser};

/// 宣言なしで呼び出せる手続き。引数はシグネチャと照合しない
const BUILTIN_PROCEDURES: &[&str] = &["write", "writeln", "read", "readln"];

impl Parser {
    /// 複合文を解析（`begin stmt {; stmt} end`）
    pub fn parse_compound_block(&mut self) -> ParseResult<Block> {
        let start = self.current_span().start;
        self.expect(Token::Begin)?;
        let statements = self.parse_statement_sequence()?;
        self.expect(Token::End)?;

        Ok(Block {
            statements,
            span: self.span_from(start),
        })
    }

    fn parse_statement_sequence(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = vec![self.parse_statement()?];
        while self.match_token(&Token::Semicolon) {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current_token() {
            Token::Begin => Ok(Statement::Compound(self.parse_compound_block()?)),
            Token::If => Ok(Statement::If(self.parse_if_statement()?)),
            Token::While => Ok(Statement::While(self.parse_while_statement()?)),
            Token::Repeat => Ok(Statement::Repeat(self.parse_repeat_statement()?)),
            Token::For => Ok(Statement::For(self.parse_for_statement()?)),
            Token::Identifier(_) => self.parse_identifier_statement(),
            Token::Semicolon | Token::End | Token::Until | Token::Else => {
                let at = self.current_span().start;
                Ok(Statement::Empty(Span::new(at, at)))
            }
            _ => Err(self.error_expected("statement")),
        }
    }

    /// 代入または手続き呼び出しを解析（名前の解決結果で決まる）
    fn parse_identifier_statement(&mut self) -> ParseResult<Statement> {
        let name = self.expect_identifier()?;

        let target = match self.scopes.find(&name.name, false) {
            Some(Symbol::Var(v)) => {
                Expression::new(ExprKind::Variable(name.clone()), v.ty.clone(), name.span)
            }
            Some(Symbol::Parameter(p)) if p.mode != PassingMode::Const => {
                Expression::new(ExprKind::Variable(name.clone()), p.ty.clone(), name.span)
            }
            Some(Symbol::Constant(_)) | Some(Symbol::Parameter(_)) => {
                return Err(SemanticError::NotAssignable {
                    name: name.name,
                    span: name.span,
                }
                .into())
            }
            Some(Symbol::Routine(r)) if r.is_function() && self.is_result_assignment(&name) => {
                let ty = r.return_type.clone().unwrap_or(SemType::Integer);
                Expression::new(ExprKind::FunctionResult(name.clone()), ty, name.span)
            }
            Some(Symbol::Routine(r)) => {
                let params: Vec<ParamSymbol> = r.parameters().cloned().collect();
                let args = self.parse_call_args(&name, &params)?;
                return Ok(self.call_statement(name, args));
            }
            Some(Symbol::Type(_)) => {
                return Err(SemanticError::NotAValue {
                    name: name.name,
                    span: name.span,
                }
                .into())
            }
            Some(Symbol::Unresolved(_)) | None => {
                if BUILTIN_PROCEDURES.contains(&name.key().as_str()) {
                    return self.parse_builtin_call(name);
                }
                return Err(SemanticError::UndeclaredIdentifier {
                    name: name.name,
                    span: name.span,
                }
                .into());
            }
        };

        let target = self.parse_selectors(target)?;
        Ok(Statement::Assignment(self.parse_assignment(target)?))
    }

    /// 関数本体内で関数名の後に代入演算子が続く場合は、呼び出しではなく戻り値の設定
    fn is_result_assignment(&self, name: &Ident) -> bool {
        self.routines.contains(&name.key()) && assign_op(self.current_token()).is_some()
    }

    fn parse_assignment(&mut self, target: Expression) -> ParseResult<AssignStatement> {
        let start = target.span.start;
        let op = assign_op(self.current_token()).ok_or_else(|| self.error_expected("':='"))?;
        self.advance();
        let value = self.parse_expression()?;

        let stored = match op {
            AssignOp::Assign => value.ty.clone(),
            AssignOp::AddAssign => self.compound_type(BinaryOp::Add, &target, &value)?,
            AssignOp::SubAssign => self.compound_type(BinaryOp::Subtract, &target, &value)?,
            AssignOp::MulAssign => self.compound_type(BinaryOp::Multiply, &target, &value)?,
            AssignOp::DivAssign => self.compound_type(BinaryOp::Divide, &target, &value)?,
        };
        if !target.ty.is_assignable_from(&stored) {
            return Err(SemanticError::TypeMismatch {
                expected: target.ty.to_string(),
                found: stored.to_string(),
                span: value.span,
            }
            .into());
        }

        Ok(AssignStatement {
            target,
            op,
            value,
            span: self.span_from(start),
        })
    }

    fn compound_type(
        &self,
        op: BinaryOp,
        target: &Expression,
        value: &Expression,
    ) -> ParseResult<SemType> {
        binary_type(op, &target.ty, &value.ty).ok_or_else(|| {
            SemanticError::InvalidOperand {
                op: op.to_string(),
                ty: format!("{} and {}", target.ty, value.ty),
                span: target.span.to(value.span),
            }
            .into()
        })
    }

    /// `write`、`writeln`、`read`、`readln`を解析。読み込み先は格納場所でなければならない
    fn parse_builtin_call(&mut self, name: Ident) -> ParseResult<Statement> {
        let args = self.parse_arguments()?;

        if name.key().starts_with("read") {
            if let Some(arg) = args.iter().find(|a| !is_designator(a)) {
                return Err(SemanticError::NotAssignable {
                    name: name.name,
                    span: arg.span,
                }
                .into());
            }
        }

        Ok(self.call_statement(name, args))
    }

    fn call_statement(&self, callee: Ident, args: Vec<Expression>) -> Statement {
        let span = self.span_from(callee.span.start);
        Statement::Call(CallStatement { callee, args, span })
    }

    fn parse_if_statement(&mut self) -> ParseResult<IfStatement> {
        let start = self.current_span().start;
        self.expect(Token::If)?;
        let condition = self.parse_condition()?;
        self.expect(Token::Then)?;
        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.match_token(&Token::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(IfStatement {
            condition,
            then_branch,
            else_branch,
            span: self.span_from(start),
        })
    }

    fn parse_while_statement(&mut self) -> ParseResult<WhileStatement> {
        let start = self.current_span().start;
        self.expect(Token::While)?;
        let condition = self.parse_condition()?;
        self.expect(Token::Do)?;
        let body = Box::new(self.parse_statement()?);

        Ok(WhileStatement {
            condition,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_repeat_statement(&mut self) -> ParseResult<RepeatStatement> {
        let start = self.current_span().start;
        self.expect(Token::Repeat)?;
        let body = self.parse_statement_sequence()?;
        self.expect(Token::Until)?;
        let condition = self.parse_condition()?;

        Ok(RepeatStatement {
            body,
            condition,
            span: self.span_from(start),
        })
    }

    /// `for v := a (to|downto) b do stmt`を解析。`v`は代入可能な順序型
    fn parse_for_statement(&mut self) -> ParseResult<ForStatement> {
        let start = self.current_span().start;
        self.expect(Token::For)?;
        let variable = self.expect_identifier()?;

        let var_ty = match self.scopes.find(&variable.name, false) {
            Some(Symbol::Var(v)) => v.ty.clone(),
            Some(Symbol::Parameter(p)) if p.mode != PassingMode::Const => p.ty.clone(),
            Some(Symbol::Constant(_)) | Some(Symbol::Parameter(_)) => {
                return Err(SemanticError::NotAssignable {
                    name: variable.name,
                    span: variable.span,
                }
                .into())
            }
            Some(_) => {
                return Err(SemanticError::NotAValue {
                    name: variable.name,
                    span: variable.span,
                }
                .into())
            }
            None => {
                return Err(SemanticError::UndeclaredIdentifier {
                    name: variable.name,
                    span: variable.span,
                }
                .into())
            }
        };
        if !var_ty.is_ordinal() {
            return Err(SemanticError::TypeMismatch {
                expected: "ordinal".to_string(),
                found: var_ty.to_string(),
                span: variable.span,
            }
            .into());
        }

        self.expect(Token::Assign)?;
        let from = self.parse_bound(&var_ty)?;
        let direction = match self.current_token() {
            Token::To => ForDirection::To,
            Token::Downto => ForDirection::Downto,
            _ => return Err(self.error_expected("'to' or 'downto'")),
        };
        self.advance();
        let to = self.parse_bound(&var_ty)?;
        self.expect(Token::Do)?;
        let body = Box::new(self.parse_statement()?);

        Ok(ForStatement {
            variable,
            start: from,
            direction,
            end: to,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_bound(&mut self, ty: &SemType) -> ParseResult<Expression> {
        let bound = self.parse_expression()?;
        if !ty.is_equivalent(&bound.ty) {
            return Err(SemanticError::TypeMismatch {
                expected: ty.to_string(),
                found: bound.ty.to_string(),
                span: bound.span,
            }
            .into());
        }
        Ok(bound)
    }

    fn parse_condition(&mut self) -> ParseResult<Expression> {
        let condition = self.parse_expression()?;
        if condition.ty != SemType::Boolean {
            return Err(SemanticError::TypeMismatch {
                expected: SemType::Boolean.to_string(),
                found: condition.ty.to_string(),
                span: condition.span,
            }
            .into());
        }
        Ok(condition)
    }
}

fn assign_op(token: &Token) -> Option<AssignOp> {
    Some(match token {
        Token::Assign => AssignOp::Assign,
        Token::PlusAssign => AssignOp::AddAssign,
        Token::MinusAssign => AssignOp::SubAssign,
        Token::StarAssign => AssignOp::MulAssign,
        Token::SlashAssign => AssignOp::DivAssign,
        _ => return None,
    })
}
