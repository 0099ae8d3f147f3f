//! End-to-end pipeline tests: a small helper wraps `run_pipeline`, and
//! each `#[test]` asserts on one documented scenario.

use glint::config::{Config, GeneratorChoice, Stage};
use glint::driver::{run_pipeline, PipelineError};

fn config(stage: Stage, generator: GeneratorChoice) -> Config {
    Config {
        stage,
        generator,
        ..Config::default()
    }
}

fn config_with_defines(defines: Vec<(&str, glint::config::DefineValue)>) -> Config {
    Config {
        stage: Stage::CompileCode,
        defines: defines.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        ..Config::default()
    }
}

/// Scenario 1: `--print-ast helloworld` → an AST dump whose first tag is
/// `Block`, containing `Call{ {String{"hello world", nil}}, Id{"print"} }`.
#[test]
fn scenario_print_ast() {
    let out = run_pipeline(
        r#"print "hello world""#,
        &config(Stage::Lint, GeneratorChoice::C),
    )
    .unwrap();
    assert!(out.ast_dump.starts_with("Block"));
    assert!(out.ast_dump.contains("Call{"));
    assert!(out.ast_dump.contains("String{\"hello world\""));
    assert!(out.ast_dump.contains("Id{\"print\"}"));
}

/// Scenario 2: `--print-analyzed-ast helloworld` → the same tree with an
/// added `type = "stringview"` attribute on the string literal.
#[test]
fn scenario_print_analyzed_ast() {
    let out = run_pipeline(
        r#"print "hello world""#,
        &config(Stage::Analyze, GeneratorChoice::C),
    )
    .unwrap();
    assert!(out.analyzed_ast_dump.contains("stringview"));
}

/// Scenario 3: `--generator lua --print-code helloworld` → output text
/// contains `print("hello world")`.
#[test]
fn scenario_lua_print_code() {
    let out = run_pipeline(
        r#"print "hello world""#,
        &config(Stage::CompileCode, GeneratorChoice::Lua),
    )
    .unwrap();
    assert!(out.generated.unwrap().contains("print(\"hello world\")"));
}

/// Scenario 4: `--eval "local a = 1_x"` → failure with
/// `"literal suffix '_x' is undefined"`.
#[test]
fn scenario_undefined_literal_suffix() {
    let err = run_pipeline("local a = 1_x", &config(Stage::Analyze, GeneratorChoice::C))
        .unwrap_err();
    match err {
        PipelineError::Analysis(with_source) => {
            let rendered = format!("{}", with_source);
            assert!(rendered.contains("literal suffix '_x' is undefined"));
        }
        other => panic!("expected an analysis error, got {:?}", other),
    }
}

/// Scenario 5: `-D DEF1 -DDEF2 -D DEF3=1 -DDEF4='asd'
/// --eval "## staticassert(DEF1==true and DEF2==true and DEF3==1 and DEF4=='asd')"`
/// → success.
#[test]
fn scenario_staticassert_over_defines() {
    use glint::config::DefineValue;
    let cfg = config_with_defines(vec![
        ("DEF1", DefineValue::Bool(true)),
        ("DEF2", DefineValue::Bool(true)),
        ("DEF3", DefineValue::Int(1)),
        ("DEF4", DefineValue::Str("asd".to_string())),
    ]);
    let out = run_pipeline(
        "## staticassert(DEF1==true and DEF2==true and DEF3==1 and DEF4=='asd')",
        &cfg,
    )
    .unwrap();
    assert!(out.generated.is_some());
}

/// Scenario 6: a polymorphic function whose body raises `static_error` on
/// instantiation fails, mentioning `"polymorphic function instantiation"`.
#[test]
fn scenario_polymorphic_instantiation_failure() {
    let err = run_pipeline(
        "local function f(x: auto)\n## static_error('fail')\nend\nf(1)",
        &config(Stage::Analyze, GeneratorChoice::C),
    )
    .unwrap_err();
    match err {
        PipelineError::Analysis(with_source) => {
            let rendered = format!("{}", with_source);
            assert!(rendered.contains("polymorphic function instantiation"));
        }
        other => panic!("expected an analysis error, got {:?}", other),
    }
}

/// Integer division compiles to a call into the generated `glint_idiv_*`
/// helper rather than a raw C `/`, so division-by-zero and `INT_MIN / -1`
/// stay defined behavior in the emitted program.
#[test]
fn integer_division_calls_idiv_builtin() {
    let out = run_pipeline(
        "local x = 10\nlocal y = 3\nlocal a = x / y\n",
        &config(Stage::CompileCode, GeneratorChoice::C),
    )
    .unwrap();
    let code = out.generated.unwrap();
    assert!(code.contains("glint_idiv_int32"));
    assert!(code.contains("glint_idiv_int32(x, y)"));
}

/// Indexing a string literal routes through `glint_assert_bounds` instead
/// of emitting a bare, unchecked `[]` subscript.
#[test]
fn string_indexing_calls_assert_bounds_builtin() {
    let out = run_pipeline(
        "local c = \"hello\"[0]\n",
        &config(Stage::CompileCode, GeneratorChoice::C),
    )
    .unwrap();
    let code = out.generated.unwrap();
    assert!(code.contains("glint_assert_bounds"));
}
