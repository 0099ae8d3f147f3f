//! Driver glue: orchestrating a full compile run is a concern of whatever
//! binary embeds this crate, not the core itself — only its *interface*
//! lives here. The core exposes [`run_pipeline`] as the one entry point a
//! driver needs: it supplies a parsed [`crate::config::Config`], gets back
//! diagnostics or generated text, and is responsible for everything
//! downstream (external compiler invocation, the artifact cache, process
//! exit codes).
//!
//! [`Toolchain`] is the seam where invocation of the external C compiler
//! and linker would plug in. [`NullToolchain`] is a stub that never shells
//! out — the core itself has no business spawning processes; a real
//! toolchain lives in the CLI crate.

use crate::analyzer::{analyze_unit, AnalysisCtx, AnalysisError};
use crate::ast::{Ast, NodeId};
use crate::config::Config;
use crate::emit::lua::LuaGenerator;
use crate::emit::{CGenerator, Generator};
use crate::error::{DriverError, WithSource};
use crate::parse::parse_program;
use crate::pragma::{FieldValue, PragmaError, PragmaMap};
use crate::preprocess::value::PpValue;
use crate::scope::Scopes;
use crate::types::TypeTable;
use std::collections::HashMap;

/// Everything a driver might want out of one pipeline run, short of
/// actually invoking a C compiler.
pub struct PipelineOutput {
    pub ast: Ast,
    pub root: NodeId,
    pub types: TypeTable,
    pub pragmas: PragmaMap,
    /// The AST dump for `--print-ast` (before analysis touched it).
    pub ast_dump: String,
    /// The AST dump for `--print-analyzed-ast` (after analysis).
    pub analyzed_ast_dump: String,
    /// Present once the pipeline reached `Stage::CompileCode` or beyond.
    pub generated: Option<String>,
}

#[derive(Debug)]
pub enum PipelineError {
    /// The front end rejected the source. Carries its raw message.
    Parse(String),
    Pragma(PragmaError),
    Analysis(WithSource<AnalysisError>),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Parse(msg) => write!(f, "{}", msg),
            PipelineError::Pragma(e) => write!(f, "{}", e),
            PipelineError::Analysis(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Run source text through parse → analyze → (optionally) emit, per
/// `config.stage`. This is the one function a driver needs to call; it
/// owns construction and sequencing of the `Ast`/`Scopes`/`PragmaMap`/
/// `TypeTable` the analyzer and emitter need — one of each per translation
/// unit.
pub fn run_pipeline(source: &str, config: &Config) -> Result<PipelineOutput, PipelineError> {
    log::trace!("driver: parsing {} bytes of source", source.len());
    let (mut ast, root) = parse_program(source).map_err(PipelineError::Parse)?;
    let ast_dump = ast.dump(root);

    let mut pragmas = PragmaMap::new();
    for (name, value) in &config.pragma_fields {
        let field = if !PragmaMap::is_known_field(name) {
            FieldValue::Str(value.clone())
        } else if value == "true" || value == "false" {
            FieldValue::Bool(value == "true")
        } else {
            FieldValue::Str(value.clone())
        };
        pragmas.set_field(name, field).map_err(PipelineError::Pragma)?;
    }

    let defines = config.defines_as_pp_values();
    let mut scopes = Scopes::new();
    let mut types = TypeTable::new();
    let mut ctx = AnalysisCtx::new(source);

    log::debug!("driver: running analysis (generator={:?})", config.generator);
    analyze_unit(&mut ast, &mut scopes, &mut pragmas, &mut types, &defines, &mut ctx, root);
    ctx.into_result().map_err(PipelineError::Analysis)?;

    let analyzed_ast_dump = ast.dump_typed(root, &types);

    let generated = if config.stage >= crate::config::Stage::CompileCode {
        log::trace!("driver: emitting via {:?}", config.generator);
        Some(match config.generator {
            crate::config::GeneratorChoice::C => {
                let mut gen = CGenerator::new(&types, &pragmas);
                gen.generate(&ast, root, &types)
            }
            crate::config::GeneratorChoice::Lua => {
                let mut gen = LuaGenerator::new();
                gen.generate(&ast, root, &types)
            }
        })
    } else {
        None
    };

    Ok(PipelineOutput {
        ast,
        root,
        types,
        pragmas,
        ast_dump,
        analyzed_ast_dump,
        generated,
    })
}

/// Invokes the real external C compiler/linker, which the core itself
/// never touches directly. Implemented by the CLI crate; `-Dhost`
/// callbacks and the artifact cache live on top of this.
pub trait Toolchain {
    /// `--cc <exe>`'s sanity check: `"failed to retrieve compiler
    /// information"` fires when this fails.
    fn probe(&self) -> Result<(), DriverError>;

    /// Compile a generated C translation unit to `out_path`, given the
    /// accumulated `cflags`/`ldflags`/`linklib` tokens.
    fn compile(
        &self,
        c_source: &str,
        cflags: &[String],
        ldflags: &[String],
        linklibs: &[String],
        out_path: &std::path::Path,
    ) -> Result<(), DriverError>;
}

/// A `Toolchain` that never shells out. Exists so this crate's own tests
/// can exercise driver-facing code without a real `cc` on the test runner,
/// and to document the seam: the core's job ends at emitted text.
pub struct NullToolchain;

impl Toolchain for NullToolchain {
    fn probe(&self) -> Result<(), DriverError> {
        Ok(())
    }

    fn compile(
        &self,
        _c_source: &str,
        _cflags: &[String],
        _ldflags: &[String],
        _linklibs: &[String],
        _out_path: &std::path::Path,
    ) -> Result<(), DriverError> {
        Err(DriverError::BadToolchain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, GeneratorChoice, Stage};

    fn config(stage: Stage, generator: GeneratorChoice) -> Config {
        Config {
            stage,
            generator,
            ..Config::default()
        }
    }

    #[test]
    fn print_ast_dump_has_expected_shape() {
        let out = run_pipeline(r#"print "hello world""#, &config(Stage::Lint, GeneratorChoice::C))
            .unwrap();
        assert!(out.ast_dump.starts_with("Block"));
        assert!(out.ast_dump.contains("Call{"));
        assert!(out.ast_dump.contains("String{\"hello world\""));
    }

    #[test]
    fn compile_code_stage_populates_generated() {
        let out = run_pipeline(
            r#"print "hello world""#,
            &config(Stage::CompileCode, GeneratorChoice::Lua),
        )
        .unwrap();
        assert!(out.generated.unwrap().contains("print(\"hello world\")"));
    }

    #[test]
    fn analyze_stage_leaves_generated_absent() {
        let out = run_pipeline(
            r#"print "hello world""#,
            &config(Stage::Analyze, GeneratorChoice::C),
        )
        .unwrap();
        assert!(out.generated.is_none());
    }

    #[test]
    fn null_toolchain_refuses_to_compile() {
        let toolchain = NullToolchain;
        assert!(toolchain.probe().is_ok());
        assert!(toolchain
            .compile("", &[], &[], &[], std::path::Path::new("out"))
            .is_err());
    }
}
