//! 手続き・関数・forward宣言・ルーチンスコープのテスト

use super::*;
use pascalc::analyzer::SemType;
use pascalc::lexer::tokenize;
use pascalc::parser::Parser;
use pretty_assertions::assert_eq;

#[test]
fn test_params_and_locals_are_partitioned() {
    let (_, scopes) = parse_decls("function f(a: integer): integer; var b: integer; begin end;");
    let f = routine(scopes.global(), "f");

    assert_eq!(f.params.names(), vec!["a"]);
    assert_eq!(f.locals.names(), vec!["b"]);
    assert!(f.params.iter().all(|p| !f.locals.contains(p.name())));
    assert_eq!(f.return_type, Some(SemType::Integer));
    assert!(f.body.is_some());
}

#[test]
fn test_parameter_modes_in_declaration_order() {
    let (_, scopes) = parse_decls(
        "procedure p(var a, b: integer; const c: char; out d: real; e: string); begin end;",
    );
    let p = routine(scopes.global(), "p");

    let params: Vec<(String, PassingMode, SemType)> = p
        .parameters()
        .map(|param| (param.name.clone(), param.mode, param.ty.clone()))
        .collect();
    assert_eq!(
        params,
        vec![
            ("a".to_string(), PassingMode::Var, SemType::Integer),
            ("b".to_string(), PassingMode::Var, SemType::Integer),
            ("c".to_string(), PassingMode::Const, SemType::Char),
            ("d".to_string(), PassingMode::Out, SemType::Real),
            ("e".to_string(), PassingMode::Value, SemType::String),
        ]
    );
    assert!(!p.is_function());
}

#[test]
fn test_empty_parameter_list() {
    let (_, scopes) = parse_decls("function zero(): integer; begin zero := 0 end;");
    assert!(routine(scopes.global(), "zero").params.is_empty());
}

#[test]
fn test_parentheses_optional_in_headers() {
    let (_, scopes) = parse_decls(
        "procedure p; forward; procedure p(); begin end;
         function f: integer; forward; function f(): integer; begin f := 1 end;",
    );
    assert!(routine(scopes.global(), "p").params.is_empty());
    assert!(routine(scopes.global(), "f").body.is_some());
    assert_eq!(scopes.global().names(), vec!["p", "f"]);
}

#[test]
fn test_unclosed_header_parenthesis() {
    assert!(matches!(
        parse_declarations("procedure p(; begin end;"),
        Err(CompileError::Syntax(_))
    ));
}

#[test]
fn test_forward_declaration_is_merged() {
    let (decls, scopes) =
        parse_decls("procedure p(x: integer); forward; procedure p(x: integer); begin end;");
    assert_eq!(decls.len(), 2);
    assert!(matches!(&decls[0], Declaration::Routine(r) if r.is_forward()));
    assert!(matches!(&decls[1], Declaration::Routine(r) if !r.is_forward()));

    assert_eq!(scopes.global().names(), vec!["p"]);
    let p = routine(scopes.global(), "p");
    assert!(!p.is_forward);
    assert!(p.body.is_some());
    assert_eq!(p.params.names(), vec!["x"]);
}

#[test]
fn test_forward_parameter_type_mismatch() {
    let err = parse_declarations(
        "procedure p(x: integer); forward; procedure p(x: real); begin end;",
    )
    .expect_err("headers differ");
    match err {
        CompileError::Semantic(SemanticError::HeaderMismatch { ref name, .. }) => {
            assert_eq!(name, "p");
            assert!(err.to_string().contains("headers doesn't match"));
        }
        other => panic!("expected header mismatch, got {:?}", other),
    }
}

#[test]
fn test_forward_parameter_name_mismatch() {
    assert!(matches!(
        parse_declarations("procedure p(a: integer); forward; procedure p(b: integer); begin end;"),
        Err(CompileError::Semantic(SemanticError::HeaderMismatch { .. }))
    ));
}

#[test]
fn test_forward_parameter_count_mismatch() {
    assert!(matches!(
        parse_declarations("procedure p(a: integer); forward; procedure p; begin end;"),
        Err(CompileError::Semantic(SemanticError::HeaderMismatch { .. }))
    ));
}

#[test]
fn test_forward_match_ignores_passing_mode() {
    let (_, scopes) =
        parse_decls("procedure p(x: integer); forward; procedure p(var x: integer); begin end;");
    let p = routine(scopes.global(), "p");
    assert_eq!(p.parameters().next().map(|x| x.mode), Some(PassingMode::Var));
}

#[test]
fn test_forward_match_is_by_name_not_position() {
    parse_decls(
        "procedure p(a: integer; b: real); forward; procedure p(b: real; a: integer); begin end;",
    );
}

#[test]
fn test_forward_kind_and_result_mismatch() {
    assert!(matches!(
        parse_declarations("procedure p; forward; function p: integer; begin end;"),
        Err(CompileError::Semantic(SemanticError::HeaderMismatch { .. }))
    ));
    assert!(matches!(
        parse_declarations("function f: integer; forward; function f: real; begin end;"),
        Err(CompileError::Semantic(SemanticError::HeaderMismatch { .. }))
    ));
}

#[test]
fn test_duplicate_routine_without_forward() {
    assert!(matches!(
        parse_declarations("procedure p; begin end; procedure P; begin end;"),
        Err(CompileError::Semantic(SemanticError::DuplicateDeclaration { .. }))
    ));
}

#[test]
fn test_parameter_cannot_reuse_function_name() {
    assert!(matches!(
        parse_declarations("function f(f: integer): integer; begin end;"),
        Err(CompileError::Semantic(SemanticError::DuplicateDeclaration { .. }))
    ));
}

#[test]
fn test_unresolved_forward_in_program() {
    assert_semantic_error(
        &program("procedure p; forward;", ""),
        |e| matches!(e, SemanticError::UnresolvedForward { name, .. } if name == "p"),
    );
}

#[test]
fn test_unresolved_forward_in_routine() {
    assert_semantic_error(
        &program("procedure outer; procedure inner; forward; begin end;", ""),
        |e| matches!(e, SemanticError::UnresolvedForward { name, .. } if name == "inner"),
    );
}

#[test]
fn test_mutual_recursion_through_forward() {
    let source = program(
        "procedure b(n: integer); forward;
         procedure a(n: integer); begin b(n) end;
         procedure b(n: integer); begin if n > 0 then a(n - 1) end;",
        "a(3)",
    );
    let checked = assert_parse_success(&source);
    assert_eq!(checked.globals.names(), vec!["a", "b"]);
}

#[test]
fn test_recursive_function() {
    let source = program(
        "function fact(n: integer): integer;
         begin
           if n <= 1 then fact := 1 else fact := n * fact(n - 1)
         end;",
        "",
    );
    let checked = assert_parse_success(&source);
    let fact = routine(&checked.globals, "fact");
    assert_eq!(fact.params.names(), vec!["n"]);
    assert!(fact.locals.is_empty());
}

#[test]
fn test_recursive_procedure() {
    let source = program(
        "procedure countdown(n: integer); begin if n > 0 then countdown(n - 1) end;",
        "countdown(10)",
    );
    assert_parse_success(&source);
}

#[test]
fn test_nested_routines_live_in_locals() {
    let source = program(
        "procedure outer;
         var x: integer;
           procedure inner; begin x := 1 end;
         begin inner end;",
        "outer",
    );
    let checked = assert_parse_success(&source);
    assert_eq!(checked.globals.names(), vec!["outer"]);

    let outer = routine(&checked.globals, "outer");
    assert_eq!(outer.locals.names(), vec!["x", "inner"]);
    assert!(outer.params.is_empty());
    assert!(routine(&outer.locals, "inner").body.is_some());
}

#[test]
fn test_nested_procedure_may_reuse_enclosing_name() {
    let source = program(
        "procedure p;
           procedure p(n: integer); begin end;
         begin p(1) end;",
        "p",
    );
    let checked = assert_parse_success(&source);
    let outer = routine(&checked.globals, "p");
    assert_eq!(outer.locals.names(), vec!["p"]);
    assert_eq!(routine(&outer.locals, "p").params.names(), vec!["n"]);
}

#[test]
fn test_parameter_shadows_global() {
    let source = program(
        "var n: real; procedure p(n: integer); begin n := 1 end;",
        "n := 2.5",
    );
    let checked = assert_parse_success(&source);
    assert_eq!(
        checked.globals.get("n").and_then(Symbol::value_type),
        Some(&SemType::Real)
    );
}

#[test]
fn test_routine_locals_invisible_after_body() {
    assert_semantic_error(
        &program("procedure p; var hidden: integer; begin end;", "hidden := 1"),
        |e| matches!(e, SemanticError::UndeclaredIdentifier { name, .. } if name == "hidden"),
    );
}

#[test]
fn test_scope_stack_balanced_after_error() {
    let tokens = tokenize("procedure p(x: integer); var y: integer; begin z := 1 end;")
        .expect("lexing should succeed");
    let mut parser = Parser::new(tokens);

    assert!(parser.parse_declarations().is_err());
    assert_eq!(parser.scopes().depth(), 1);
    assert!(parser.scopes().global().is_empty());
}

#[test]
fn test_end_to_end_declarations() {
    let (_, scopes) = parse_decls(
        "const pi: real = 3;
         var x, y: integer;
         function sq(n: integer): integer; forward;
         function sq(n: integer): integer; begin end;",
    );
    let globals = scopes.global();
    assert_eq!(globals.names(), vec!["pi", "x", "y", "sq"]);

    assert!(matches!(globals.get("pi"), Some(Symbol::Constant(_))));
    for name in ["x", "y"] {
        assert!(matches!(
            globals.get(name),
            Some(Symbol::Var(v)) if v.ty == SemType::Integer
        ));
    }

    let sq = routine(globals, "sq");
    assert!(sq.is_function());
    assert!(!sq.is_forward);
    let params: Vec<(&str, &SemType)> = sq.parameters().map(|p| (p.name.as_str(), &p.ty)).collect();
    assert_eq!(params, vec![("n", &SemType::Integer)]);
}
