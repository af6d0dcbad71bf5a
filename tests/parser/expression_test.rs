//! 型付き式のテスト

use super::*;
use pascalc::analyzer::SemType;
use pretty_assertions::assert_eq;
use test_case::test_case;

const DECLS: &str = "
type Point = record x, y: real end;
var i, j: integer;
    r: real;
    b: boolean;
    c: char;
    s: string;
    a: array[1..3] of integer;
    m: array[1..2, 1..2] of real;
    pt: Point;
function twice(n: integer): integer; begin twice := n * 2 end;
function seven: integer; begin seven := 7 end;
procedure bump(var n: integer); begin n := n + 1 end;
";

/// メインブロックにある唯一の代入の右辺
fn assigned_value(body: &str) -> Expression {
    let statements = main_statements(&program(DECLS, body));
    match statements.into_iter().next() {
        Some(Statement::Assignment(assign)) => assign.value,
        other => panic!("expected an assignment, got {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter() {
    let value = assigned_value("i := 1 + 2 * 3");
    match value.kind {
        ExprKind::Binary(BinaryExpr { op, left, right }) => {
            assert_eq!(op, BinaryOp::Add);
            assert!(matches!(left.kind, ExprKind::Integer(1)));
            assert!(matches!(
                right.kind,
                ExprKind::Binary(BinaryExpr { op: BinaryOp::Multiply, .. })
            ));
        }
        other => panic!("expected binary expression, got {:?}", other),
    }
    assert_eq!(value.ty, SemType::Integer);
}

#[test]
fn test_parentheses_override_precedence() {
    let value = assigned_value("i := (1 + 2) * 3");
    assert!(matches!(
        value.kind,
        ExprKind::Binary(BinaryExpr { op: BinaryOp::Multiply, .. })
    ));
}

#[test_case("r := i + 2.5", SemType::Real; "real widening")]
#[test_case("r := i / j", SemType::Real; "division is real")]
#[test_case("i := i div 2 mod 3", SemType::Integer; "integer division")]
#[test_case("i := i shl 2 + j >> 1", SemType::Integer; "shifts")]
#[test_case("b := (i > 1) and not (i = 3)", SemType::Boolean; "boolean logic")]
#[test_case("i := i xor j", SemType::Integer; "bitwise xor")]
#[test_case("s := 'ab' + 'c'", SemType::String; "string concatenation")]
#[test_case("b := r >= i", SemType::Boolean; "mixed comparison")]
#[test_case("c := s[1]", SemType::Char; "string index")]
#[test_case("c := 'x'", SemType::Char; "one character literal")]
#[test_case("c := #65", SemType::Char; "char code")]
#[test_case("i := a[2] + twice(a[1])", SemType::Integer; "index and call")]
#[test_case("r := m[1, 2] * pt.x", SemType::Real; "matrix and field")]
#[test_case("i := seven", SemType::Integer; "parameterless function")]
#[test_case("i := -i", SemType::Integer; "negation")]
fn test_expression_type(body: &str, expected: SemType) {
    assert_eq!(assigned_value(body).ty, expected);
}

#[test]
fn test_partial_index_yields_row() {
    let value = assigned_value("r := m[1][2]");
    assert_eq!(value.ty, SemType::Real);
    match value.kind {
        ExprKind::Index(IndexExpr { base, .. }) => assert_eq!(
            base.ty,
            SemType::Array {
                ranges: vec![(1, 2)],
                element: Box::new(SemType::Real),
            }
        ),
        other => panic!("expected index expression, got {:?}", other),
    }
}

#[test_case("i := i div 2.0"; "div on real")]
#[test_case("b := b + 1"; "add boolean")]
#[test_case("b := not 'x'"; "not on char")]
#[test_case("b := i = true"; "compare integer with boolean")]
#[test_case("s := s - s"; "subtract strings")]
#[test_case("i := i.x"; "field of integer")]
#[test_case("r := -b"; "negate boolean")]
fn test_invalid_operand(body: &str) {
    assert_semantic_error(&program(DECLS, body), |e| {
        matches!(e, SemanticError::InvalidOperand { .. })
    });
}

#[test]
fn test_undeclared_identifier() {
    assert_semantic_error(&program(DECLS, "i := k + 1"), |e| {
        matches!(e, SemanticError::UndeclaredIdentifier { name, .. } if name == "k")
    });
}

#[test]
fn test_unknown_record_field() {
    assert_semantic_error(&program(DECLS, "r := pt.z"), |e| {
        matches!(e, SemanticError::UndeclaredIdentifier { name, .. } if name == "z")
    });
}

#[test_case("i := Point"; "type name")]
#[test_case("i := bump"; "procedure name")]
fn test_not_a_value(body: &str) {
    assert_semantic_error(&program(DECLS, body), |e| {
        matches!(e, SemanticError::NotAValue { .. })
    });
}

#[test]
fn test_argument_count_checked() {
    assert_semantic_error(&program(DECLS, "i := twice(1, 2)"), |e| {
        matches!(
            e,
            SemanticError::ArgumentCountMismatch { expected: 1, found: 2, .. }
        )
    });
    assert_semantic_error(&program(DECLS, "i := twice"), |e| {
        matches!(
            e,
            SemanticError::ArgumentCountMismatch { expected: 1, found: 0, .. }
        )
    });
}

#[test]
fn test_argument_type_checked() {
    assert_semantic_error(&program(DECLS, "i := twice(r)"), |e| {
        matches!(e, SemanticError::TypeMismatch { .. })
    });
}

#[test]
fn test_var_argument_needs_designator() {
    assert_parse_success(&program(DECLS, "bump(i); bump(a[2])"));
    assert_semantic_error(&program(DECLS, "bump(i + 1)"), |e| {
        matches!(e, SemanticError::NotAssignable { name, .. } if name == "n")
    });
}

#[test]
fn test_non_ordinal_index() {
    assert_semantic_error(&program(DECLS, "i := a[1.5]"), |e| {
        matches!(e, SemanticError::TypeMismatch { .. })
    });
}

#[test]
fn test_too_many_indices() {
    assert_semantic_error(&program(DECLS, "i := a[1, 2]"), |e| {
        matches!(e, SemanticError::InvalidOperand { .. })
    });
}
