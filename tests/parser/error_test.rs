//! 構文エラーと意味エラーのテスト

use super::*;
use pascalc::ast::Span;
use pascalc::error::SyntaxError;
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test_case("begin end."; "missing program header")]
#[test_case("program p begin end."; "missing semicolon after header")]
#[test_case("program p; begin end"; "missing final dot")]
#[test_case("program p; begin end. x"; "tokens after final dot")]
#[test_case("program p; var x integer; begin end."; "missing colon")]
#[test_case("program p; var x: integer begin end."; "missing semicolon after var")]
#[test_case("program p; procedure q(x: integer; begin end; begin end."; "unclosed parameter list")]
#[test_case("program p; procedure q begin end; begin end."; "missing semicolon after header")]
#[test_case("program p; procedure q; begin end begin end."; "missing semicolon after body")]
#[test_case("program p; function f(x: integer); begin end; begin end."; "function without result type")]
#[test_case("program p; var x: integer; begin x := end."; "missing expression")]
fn test_syntax_error(source: &str) {
    assert_syntax_error(source);
}

#[test]
fn test_syntax_error_reports_expected_and_found() {
    let err = parse_source("program p; var x: integer begin end.").expect_err("should fail");
    match err {
        CompileError::Syntax(SyntaxError::UnexpectedToken {
            ref expected,
            ref found,
            span,
        }) => {
            assert_eq!(expected, "';'");
            assert_eq!(found, "'begin'");
            assert_eq!(span, Span::new(26, 31));
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_end_of_file_in_message() {
    let err = parse_source("program p; begin").expect_err("should fail");
    assert!(err.to_string().ends_with("found end of file"), "{}", err);
}

#[test]
fn test_lexer_error_surfaces() {
    let err = parse_source("program p; begin x := 1 ! end.").expect_err("should fail");
    assert!(matches!(err, CompileError::Lexer(_)));
    assert_eq!(err.span(), Some(Span::new(24, 25)));
}

#[test]
fn test_semantic_error_span_points_at_name() {
    let source = "program p; var x: integer; x: real; begin end.";
    let err = parse_source(source).expect_err("should fail");
    let span = err.span().expect("semantic errors carry a span");
    assert_eq!(&source[span.start..span.end], "x");
    assert_eq!(span.start, 27);
}

#[test]
fn test_diagnostic_rendering() {
    let source = "program p; var y: widget; begin end.";
    let err = parse_source(source).expect_err("should fail");
    let diagnostic = err.to_diagnostic(0);
    assert_eq!(diagnostic.message, "unknown type 'widget'");
    assert_eq!(diagnostic.labels.len(), 1);
    assert_eq!(&source[diagnostic.labels[0].range.clone()], "widget");
}

#[test]
fn test_first_error_aborts() {
    // 重複が報告され、後の未知の型は報告されない
    assert_semantic_error(
        &program("var a: integer; a: real; b: widget;", ""),
        |e| matches!(e, SemanticError::DuplicateDeclaration { .. }),
    );
}
