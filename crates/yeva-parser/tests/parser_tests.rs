//! Parser tests for Yeva.
//!
//! Covers: statement shapes (printed back through the debug printer),
//! expression precedence and postfix forms, context checks, compile-time
//! scope resolution, and error recovery.

use pretty_assertions::assert_eq;
use yeva_parser::{parse_source, ParseResult};
use yeva_types::ast::*;
use yeva_types::printer::{print_expr, print_program};
use yeva_types::ErrorCode;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> ParseResult {
    parse_source("test.yv", source)
}

/// Parse source and return the program, panicking if there are errors.
fn parse_ok(source: &str) -> Program {
    let result = parse(source);
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {e} ({})", e.code);
        }
        panic!("unexpected parse errors (see above)");
    }
    result.program
}

/// Parse and print back; the source must be error-free.
fn roundtrip(source: &str) -> String {
    print_program(&parse_ok(source))
}

/// Print the single expression statement in `source`.
fn expr(source: &str) -> String {
    let program = parse_ok(source);
    match &program.stmts[..] {
        [Stmt {
            kind: StmtKind::Expr(e),
            ..
        }] => print_expr(e),
        other => panic!("expected one expression statement, got {other:?}"),
    }
}

/// The first diagnostic's message.
fn first_error(source: &str) -> String {
    let result = parse(source);
    result
        .first_error()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| panic!("expected an error for {source:?}"))
}

fn first_code(source: &str) -> ErrorCode {
    parse(source)
        .first_error()
        .map(|e| e.code)
        .unwrap_or_else(|| panic!("expected an error for {source:?}"))
}

fn def_body(program: &Program, index: usize) -> &Block {
    match &program.stmts[index].kind {
        StmtKind::Def { func, .. } => &func.body,
        other => panic!("expected def, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_source() {
    assert!(parse_ok("").stmts.is_empty());
    assert!(parse_ok("\n\n// only a comment\n").stmts.is_empty());
}

#[test]
fn test_assignment_and_multi_target() {
    assert_eq!(roundtrip("x = 1"), "x = 1");
    assert_eq!(roundtrip("a, b = b, a"), "a, b = b, a");
    assert_eq!(roundtrip("p.name, q[0] = f()"), "p[\"name\"], q[0] = f()");
}

#[test]
fn test_def_with_elif_chain() {
    let source = "\
def f(a, b):
    if a:
        return a, b
    elif b:
        pass
    else:
        x = 1
";
    let expected = "\
def f(a, b):
    if a:
        return a, b
    else:
        if b:
            pass
        else:
            x = 1";
    assert_eq!(roundtrip(source), expected);
}

#[test]
fn test_if_without_else_has_empty_else_block() {
    let program = parse_ok("if x:\n    y\n");
    match &program.stmts[0].kind {
        StmtKind::If {
            then_block,
            else_block,
            ..
        } => {
            assert_eq!(then_block.stmts.len(), 1);
            assert!(else_block.is_empty());
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn test_pass_produces_no_node() {
    let program = parse_ok("while x:\n    pass\n");
    match &program.stmts[0].kind {
        StmtKind::While { body, .. } => assert!(body.is_empty()),
        other => panic!("expected while, got {other:?}"),
    }
    assert!(parse_ok("pass\npass\n").stmts.is_empty());
}

#[test]
fn test_for_loop_with_two_variables() {
    assert_eq!(
        roundtrip("for v, i in items:\n    println(v, i)\n"),
        "for v, i in items:\n    println(v, i)"
    );
}

#[test]
fn test_decorators() {
    let source = "@trace\n@memo(1)\ndef g():\n    return\n";
    assert_eq!(roundtrip(source), "@trace\n@memo(1)\ndef g():\n    return");
    match &parse_ok(source).stmts[0].kind {
        StmtKind::Def { decorators, .. } => assert_eq!(decorators.len(), 2),
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_try_except_finally() {
    let source = "\
try:
    raise \"boom\"
except as e:
    println(e)
finally:
    println(1)
";
    assert_eq!(
        roundtrip(source),
        "try:\n    raise \"boom\"\nexcept as e:\n    println(e)\nfinally:\n    println(1)"
    );
    assert_eq!(
        roundtrip("try:\n    f()\nfinally:\n    g()\n"),
        "try:\n    f()\nfinally:\n    g()"
    );
    assert_eq!(
        roundtrip("try:\n    f()\nexcept:\n    g()\n"),
        "try:\n    f()\nexcept:\n    g()"
    );
}

#[test]
fn test_nested_blocks_dedent_several_levels() {
    let source = "\
def outer():
    while True:
        if x:
            break
y = 2
";
    let program = parse_ok(source);
    assert_eq!(program.stmts.len(), 2);
    assert_eq!(
        print_program(&program),
        "def outer():\n    while True:\n        if x:\n            break\n        else:\n            pass\ny = 2"
    );
}

#[test]
fn test_continuation_and_brackets_span_lines() {
    assert_eq!(roundtrip("x = 1 +\n    2\n"), "x = 1 + 2");
    assert_eq!(roundtrip("xs = [\n  1,\n  2,\n]\n"), "xs = [1, 2]");
}

// ─────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(expr("1 + 2 * 3"), "1 + (2 * 3)");
    assert_eq!(expr("(1 + 2) * 3"), "(1 + 2) * 3");
    assert_eq!(expr("2 * 3 ** 2"), "(2 * 3) ** 2");
    assert_eq!(expr("2 ** 3 ** 2"), "(2 ** 3) ** 2");
}

#[test]
fn test_left_associativity() {
    assert_eq!(expr("1 - 2 - 3"), "(1 - 2) - 3");
    assert_eq!(expr("a / b / c"), "(a / b) / c");
}

#[test]
fn test_logical_and_comparison_levels() {
    assert_eq!(expr("a or b and c"), "a or (b and c)");
    assert_eq!(expr("a < b == c < d"), "(a < b) == (c < d)");
    assert_eq!(expr("a == b and c != d"), "(a == b) and (c != d)");
}

#[test]
fn test_unary_binds_tighter_than_binary() {
    assert_eq!(expr("-x ** 2"), "(-x) ** 2");
    assert_eq!(expr("not a == b"), "(not a) == b");
    assert_eq!(expr("- -x"), "-(-x)");
    assert_eq!(expr("-f(x)"), "-f(x)");
}

#[test]
fn test_postfix_chain() {
    assert_eq!(expr("obj.name(1)[0]"), "obj[\"name\"](1)[0]");
    assert_eq!(expr("f(1, 2,)"), "f(1, 2)");
    assert_eq!(expr("f()()"), "f()()");
}

#[test]
fn test_arrow_forms() {
    assert_eq!(expr("p->greet(2)"), "p->[\"greet\"](2)");
    assert_eq!(expr("p->[k]"), "p->[k]");
}

#[test]
fn test_dict_keys() {
    assert_eq!(
        expr("{a: 1, b + 1: 2, \"s\": 3,}"),
        "{\"a\": 1, b + 1: 2, \"s\": 3}"
    );
    assert_eq!(expr("{}"), "{}");
    assert_eq!(expr("{k[0]: 1}"), "{k[0]: 1}");
}

#[test]
fn test_prototype_dict() {
    assert_eq!(expr("base{x: 1}"), "base{\"x\": 1}");
    assert_eq!(expr("make(){}"), "make(){}");
}

#[test]
fn test_list_literal() {
    assert_eq!(expr("[1, \"two\", None, True]"), "[1, \"two\", None, True]");
    assert_eq!(expr("[]"), "[]");
}

#[test]
fn test_lambda() {
    assert_eq!(roundtrip("f = lambda a, b: a + b"), "f = lambda a, b: a + b");
    assert_eq!(roundtrip("g = lambda: 1"), "g = lambda: 1");
    let program = parse_ok("f = lambda x: x");
    match &program.stmts[0].kind {
        StmtKind::Assign { values, .. } => match &values[0].kind {
            ExprKind::Lambda(func) => {
                assert_eq!(func.name, "lambda");
                assert_eq!(func.params, vec!["x".to_string()]);
                assert!(matches!(func.body.stmts[0].kind, StmtKind::Return(_)));
            }
            other => panic!("expected lambda, got {other:?}"),
        },
        other => panic!("expected assignment, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Context checks
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_return_outside_function() {
    assert_eq!(first_error("return 1"), "'return' outside function");
    assert_eq!(first_code("return"), ErrorCode::RETURN_OUTSIDE_FUNCTION);
    assert_eq!(
        first_error("while x:\n    return\n"),
        "'return' outside function"
    );
}

#[test]
fn test_loop_control_outside_loop() {
    assert_eq!(first_error("break"), "'break' outside loop");
    assert_eq!(first_error("continue"), "'continue' outside loop");
    assert_eq!(
        first_code("def f():\n    continue\n"),
        ErrorCode::LOOP_CONTROL_OUTSIDE_LOOP
    );
}

#[test]
fn test_loop_context_does_not_leak_into_nested_def() {
    let source = "while x:\n    def f():\n        break\n";
    assert_eq!(first_error(source), "'break' outside loop");
}

#[test]
fn test_loop_inside_def_allows_break() {
    parse_ok("def f():\n    for x in xs:\n        if x:\n            break\n        continue\n");
}

#[test]
fn test_scope_declaration_outside_function() {
    assert_eq!(first_error("local x"), "'local' outside function");
    assert_eq!(first_error("global x"), "'global' outside function");
    assert_eq!(
        first_code("nonlocal x"),
        ErrorCode::DECLARATION_OUTSIDE_FUNCTION
    );
}

#[test]
fn test_invalid_assignment_target() {
    assert_eq!(first_error("1 = 2"), "invalid assignment target");
    assert_eq!(first_error("f() = 1"), "invalid assignment target");
    assert_eq!(first_code("a, b + 1 = 1, 2"), ErrorCode::INVALID_ASSIGN_TARGET);
}

#[test]
fn test_try_requires_a_handler() {
    assert_eq!(
        first_error("try:\n    x\ny = 1\n"),
        "expected 'except' or 'finally'"
    );
    assert_eq!(first_code("try:\n    x\n"), ErrorCode::MISSING_HANDLER);
}

#[test]
fn test_decorator_requires_def() {
    assert_eq!(first_error("@d\nx = 1\n"), "expected 'def' after decorator");
}

#[test]
fn test_unexpected_indent() {
    assert_eq!(first_error("x = 1\n    y = 2\n"), "unexpected indent");
}

#[test]
fn test_missing_block() {
    assert_eq!(first_error("if x:\ny\n"), "expected an indented block");
}

// ─────────────────────────────────────────────────────────────────────
// Scope resolution
// ─────────────────────────────────────────────────────────────────────

fn assigned_var(stmt: &Stmt) -> &VarRef {
    match &stmt.kind {
        StmtKind::Assign { targets, .. } => match &targets[0].kind {
            ExprKind::Var(var) => var,
            other => panic!("expected variable target, got {other:?}"),
        },
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_declared_names_are_stamped() {
    let source = "\
def f():
    global g
    local l
    nonlocal n
    g = 1
    l = 2
    n = 3
    d = 4
";
    let program = parse_ok(source);
    let body = def_body(&program, 0);
    assert_eq!(assigned_var(&body.stmts[3]).scope, ScopeKind::Global);
    assert_eq!(assigned_var(&body.stmts[4]).scope, ScopeKind::Local);
    assert_eq!(assigned_var(&body.stmts[5]).scope, ScopeKind::NonLocal);
    assert_eq!(assigned_var(&body.stmts[6]).scope, ScopeKind::Dynamic);
}

#[test]
fn test_declarations_do_not_cross_function_bodies() {
    let source = "\
def f():
    global g
    def h():
        g = 1
g = 2
";
    let program = parse_ok(source);
    let outer = def_body(&program, 0);
    let inner = match &outer.stmts[1].kind {
        StmtKind::Def { func, .. } => func.body.clone(),
        other => panic!("expected def, got {other:?}"),
    };
    assert_eq!(assigned_var(&inner.stmts[0]).scope, ScopeKind::Dynamic);
    assert_eq!(assigned_var(&program.stmts[1]).scope, ScopeKind::Dynamic);
}

#[test]
fn test_def_target_resolves_in_enclosing_body() {
    let program = parse_ok("def f():\n    local g\n    def g():\n        pass\n");
    let body = def_body(&program, 0);
    match &body.stmts[1].kind {
        StmtKind::Def { target, .. } => assert_eq!(target.scope, ScopeKind::Local),
        other => panic!("expected def, got {other:?}"),
    }
}

#[test]
fn test_declaration_after_use_is_rejected() {
    let source = "def f():\n    x = 1\n    local x\n";
    assert_eq!(first_code(source), ErrorCode::DECLARATION_AFTER_USE);
    assert_eq!(
        first_error(source),
        "'x' is used before its local declaration"
    );
}

#[test]
fn test_parameters_count_as_uses() {
    assert_eq!(
        first_code("def f(a):\n    global a\n"),
        ErrorCode::DECLARATION_AFTER_USE
    );
}

#[test]
fn test_conflicting_declaration() {
    let source = "def f():\n    local x\n    global x\n";
    assert_eq!(first_code(source), ErrorCode::CONFLICTING_DECLARATION);
    assert_eq!(first_error(source), "'x' is already declared local");
    // Repeating the same kind is harmless.
    parse_ok("def f():\n    local x\n    local x\n");
}

// ─────────────────────────────────────────────────────────────────────
// Error recovery & diagnostics
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_recovery_reports_every_bad_statement() {
    let result = parse("x = * 1\ny = 2\nz = 1 2\nw = 3\n");
    assert_eq!(result.errors.total_errors, 2);
    assert_eq!(
        print_program(&result.program),
        "<bad statement: expected expression>\ny = 2\n<bad statement: expected end of line>\nw = 3"
    );
}

#[test]
fn test_recovery_inside_block() {
    let result = parse("def f():\n    x = * 1\n    return 2\ny = 3\n");
    assert_eq!(result.errors.total_errors, 1);
    let body = def_body(&result.program, 0);
    assert!(matches!(body.stmts[0].kind, StmtKind::Bad(_)));
    assert!(matches!(body.stmts[1].kind, StmtKind::Return(_)));
    assert_eq!(result.program.stmts.len(), 2);
}

#[test]
fn test_scan_errors_become_diagnostics() {
    let result = parse("x = 1 $ 2\n");
    let first = result.first_error().map(|e| e.message.clone());
    assert_eq!(first.as_deref(), Some("unexpected character '$'"));
}

#[test]
fn test_diagnostic_display_format() {
    let result = parse("x = = 1\n");
    let first = result.first_error().map(|e| e.to_string());
    assert_eq!(first.as_deref(), Some("line 1 at '=': expected expression"));

    let result = parse("y = 1\nreturn y\n");
    let first = result.first_error().map(|e| e.to_string());
    assert_eq!(
        first.as_deref(),
        Some("line 2 at 'return': 'return' outside function")
    );
}

#[test]
fn test_into_result() {
    assert!(parse("x = 1").into_result().is_ok());
    let errors = match parse("break").into_result() {
        Err(errors) => errors,
        Ok(_) => panic!("expected errors"),
    };
    assert_eq!(errors.total_errors, 1);
}
