//! const・var・type宣言部のテスト

use super::*;
use pascalc::analyzer::{equivalent, SemType};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn decl_error(source: &str) -> CompileError {
    parse_declarations(source).expect_err("declarations should fail")
}

fn value_type(scopes: &ScopeStack, name: &str) -> SemType {
    scopes
        .global()
        .get(name)
        .and_then(Symbol::value_type)
        .cloned()
        .unwrap_or_else(|| panic!("'{}' should denote a value", name))
}

#[test]
fn test_const_takes_initializer_type() {
    let (decls, scopes) = parse_decls("const pi: real = 3; n = 10; s = 'hello'; c = 'x';");
    assert_eq!(decls.len(), 1);

    assert!(matches!(scopes.global().get("pi"), Some(Symbol::Constant(_))));
    assert_eq!(value_type(&scopes, "pi"), SemType::Integer);
    assert_eq!(value_type(&scopes, "n"), SemType::Integer);
    assert_eq!(value_type(&scopes, "s"), SemType::String);
    assert_eq!(value_type(&scopes, "c"), SemType::Char);
}

#[test]
fn test_const_annotation_kept_in_ast() {
    let (decls, _) = parse_decls("const limit: integer = 100;");
    match &decls[0] {
        Declaration::Const(section) => {
            assert_eq!(section.decls.len(), 1);
            let decl = &section.decls[0];
            assert_eq!(decl.name.name, "limit");
            assert!(matches!(decl.ty, Some(TypeExpr::Named(ref id)) if id.name == "integer"));
            assert!(matches!(decl.value.kind, ExprKind::Integer(100)));
        }
        other => panic!("expected const section, got {:?}", other),
    }
}

#[test]
fn test_var_list_shares_type() {
    let (_, scopes) = parse_decls("var x, y: integer; r: real;");
    assert_eq!(scopes.global().names(), vec!["x", "y", "r"]);
    assert!(matches!(scopes.global().get("x"), Some(Symbol::Var(_))));
    assert_eq!(value_type(&scopes, "x"), SemType::Integer);
    assert_eq!(value_type(&scopes, "y"), SemType::Integer);
    assert_eq!(value_type(&scopes, "r"), SemType::Real);
}

#[test]
fn test_single_var_may_be_initialized() {
    let (decls, scopes) = parse_decls("var a: integer = 1;");
    assert_eq!(value_type(&scopes, "a"), SemType::Integer);
    match &decls[0] {
        Declaration::Var(section) => assert!(section.decls[0].init.is_some()),
        other => panic!("expected var section, got {:?}", other),
    }
}

#[test]
fn test_initializer_with_several_names_rejected() {
    let err = decl_error("var a, b: integer = 1;");
    assert!(matches!(
        err,
        CompileError::Semantic(SemanticError::MultipleInitializers { .. })
    ));
    assert_eq!(
        err.to_string(),
        "semantic error: only one var can be initialized"
    );
}

#[test]
fn test_initializer_must_be_assignable() {
    assert!(parse_declarations("var r: real = 1;").is_ok());
    assert!(matches!(
        decl_error("var i: integer = 1.5;"),
        CompileError::Semantic(SemanticError::TypeMismatch { .. })
    ));
}

#[test]
fn test_initializer_uses_earlier_constants() {
    let (_, scopes) = parse_decls("const n = 3; var m: integer = n * 2 + 1;");
    assert_eq!(value_type(&scopes, "m"), SemType::Integer);
}

#[test]
fn test_var_cannot_initialize_from_itself() {
    assert!(matches!(
        decl_error("var a: integer = a;"),
        CompileError::Semantic(SemanticError::UndeclaredIdentifier { .. })
    ));
}

#[test]
fn test_alias_resolution_is_transitive() {
    let (_, scopes) = parse_decls("type A = integer; B = A; var v: B;");
    let b = match scopes.global().get("b") {
        Some(Symbol::Type(t)) => t.ty.clone(),
        other => panic!("expected type alias, got {:?}", other),
    };
    assert!(equivalent(&b, &SemType::Integer));
    assert_eq!(value_type(&scopes, "v"), SemType::Integer);
}

#[test]
fn test_user_type_shadows_builtin_name() {
    let (_, scopes) = parse_decls("type integer = real; var x: integer;");
    assert_eq!(value_type(&scopes, "x"), SemType::Real);
}

#[test]
fn test_self_referential_alias_is_unknown() {
    assert!(matches!(
        decl_error("type A = A;"),
        CompileError::Semantic(SemanticError::UnknownType { ref name, .. }) if name == "A"
    ));
}

#[test_case("var Count: integer; count: real;"; "case insensitive var")]
#[test_case("const k = 1; var k: integer;"; "const then var")]
#[test_case("var t: integer; type t = real;"; "var then type")]
#[test_case("var a, b, a: integer;"; "within one list")]
#[test_case("type T = integer; procedure t; begin end;"; "type then procedure")]
fn test_duplicate_rejected(source: &str) {
    assert!(matches!(
        decl_error(source),
        CompileError::Semantic(SemanticError::DuplicateDeclaration { .. })
    ));
}

#[test]
fn test_sections_kept_in_source_order() {
    let (decls, _) = parse_decls(
        "const a = 1; type t = integer; var v: t; procedure p; begin end; var w: integer;",
    );
    let kinds: Vec<&str> = decls
        .iter()
        .map(|d| match d {
            Declaration::Const(_) => "const",
            Declaration::Var(_) => "var",
            Declaration::Type(_) => "type",
            Declaration::Routine(_) => "routine",
        })
        .collect();
    assert_eq!(kinds, vec!["const", "type", "var", "routine", "var"]);
}

#[test]
fn test_section_needs_an_entry() {
    assert!(matches!(decl_error("var"), CompileError::Syntax(_)));
    assert!(matches!(decl_error("const begin"), CompileError::Syntax(_)));
}

#[test]
fn test_unknown_type() {
    assert!(matches!(
        decl_error("var x: widget;"),
        CompileError::Semantic(SemanticError::UnknownType { ref name, .. }) if name == "widget"
    ));
}

#[test]
fn test_section_span_covers_keyword_to_last_semicolon() {
    let source = "var a: integer; b: char; procedure p; begin end;";
    let (decls, _) = parse_decls(source);
    let texts: Vec<&str> = decls
        .iter()
        .map(|d| &source[d.span().start..d.span().end])
        .collect();
    assert_eq!(
        texts,
        vec!["var a: integer; b: char;", "procedure p; begin end;"]
    );
}

#[test]
fn test_block_comments_between_declarations() {
    let (decls, scopes) =
        parse_decls("(* globals *) var a: integer; (* a * b, (nested parens) *) b: char;");
    assert_eq!(decls.len(), 1);
    assert_eq!(scopes.global().names(), vec!["a", "b"]);
}
