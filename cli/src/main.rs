//! Driver glue: CLI flag parsing, source/file loading, and wiring into
//! `glint::driver::run_pipeline`. `structopt` for flags, a thin `main`
//! that loads input and calls into the library crate. Invoking a real C
//! compiler/linker stays stubbed behind `NullToolchain`; that piece is a
//! deliberate scope boundary, not merely unimplemented.

use glint::config::{
    parse_define, parse_pragma, validate_search_path_entry, Config, GeneratorChoice, OutputMode,
    Stage,
};
use glint::driver::{run_pipeline, NullToolchain, Toolchain};
use glint::error::DriverError;
use std::path::PathBuf;
use std::process;
use structopt::clap::ErrorKind as ClapErrorKind;
use structopt::StructOpt;

/// The full CLI flag surface. Long and short forms share identical
/// semantics where both exist.
#[derive(Debug, StructOpt)]
#[structopt(name = "glint", about = "Compile Glint programs to C (or Lua)")]
struct Opt {
    /// Path to the source file. Omit when `--eval` is given.
    source: Option<PathBuf>,

    #[structopt(long, default_value = "c")]
    generator: String,

    #[structopt(long = "compile-code")]
    compile_code: bool,
    #[structopt(long = "compile-binary")]
    compile_binary: bool,
    #[structopt(long)]
    analyze: bool,
    #[structopt(long)]
    lint: bool,

    #[structopt(long)]
    eval: Option<String>,

    #[structopt(long = "no-cache")]
    no_cache: bool,
    #[structopt(long = "cache-dir")]
    cache_dir: Option<PathBuf>,

    #[structopt(long = "define", short = "D")]
    defines: Vec<String>,
    #[structopt(long = "pragma", short = "P")]
    pragmas: Vec<String>,

    #[structopt(long = "path", short = "L")]
    search_path: Vec<String>,

    #[structopt(long)]
    cc: Option<String>,
    #[structopt(long)]
    cflags: Vec<String>,
    #[structopt(long)]
    ldflags: Vec<String>,

    #[structopt(long)]
    shared: bool,
    #[structopt(long = "static")]
    static_: bool,
    #[structopt(short = "o")]
    output: Option<PathBuf>,

    #[structopt(long = "print-ast")]
    print_ast: bool,
    #[structopt(long = "print-analyzed-ast")]
    print_analyzed_ast: bool,
    #[structopt(long = "print-code")]
    print_code: bool,

    #[structopt(long = "debug-resolve")]
    debug_resolve: bool,
    #[structopt(long = "debug-scope-resolve")]
    debug_scope_resolve: bool,
    #[structopt(long)]
    verbose: bool,
    #[structopt(long)]
    timing: bool,
}

fn build_config(opt: &Opt) -> anyhow::Result<Config> {
    let generator = match opt.generator.as_str() {
        "c" => GeneratorChoice::C,
        "lua" => GeneratorChoice::Lua,
        _ => return Err(DriverError::UnknownOption.into()),
    };

    let stage = if opt.lint {
        Stage::Lint
    } else if opt.analyze {
        Stage::Analyze
    } else if opt.compile_code {
        Stage::CompileCode
    } else {
        Stage::CompileBinary
    };

    let output = if opt.shared {
        OutputMode::Shared
    } else if opt.static_ {
        OutputMode::Static
    } else {
        OutputMode::Executable
    };

    let mut defines = std::collections::HashMap::new();
    for raw in &opt.defines {
        let (name, value) = parse_define(raw)?;
        defines.insert(name, value);
    }

    let pragma_fields = opt.pragmas.iter().map(|raw| parse_pragma(raw)).collect();

    for entry in &opt.search_path {
        validate_search_path_entry(entry)?;
    }

    if let Some(source) = &opt.source {
        if opt.eval.is_none() && !source.exists() {
            return Err(DriverError::MissingFile(source.display().to_string()).into());
        }
    }

    Ok(Config {
        generator,
        stage,
        source_path: opt.source.clone(),
        eval_source: opt.eval.clone(),
        no_cache: opt.no_cache,
        cache_dir: opt.cache_dir.clone(),
        defines,
        pragma_fields,
        search_path: opt.search_path.clone(),
        cc: opt.cc.clone(),
        cflags: opt.cflags.clone(),
        ldflags: opt.ldflags.clone(),
        output,
        output_path: opt.output.clone(),
        print_ast: opt.print_ast,
        print_analyzed_ast: opt.print_analyzed_ast,
        print_code: opt.print_code,
        debug_resolve: opt.debug_resolve,
        debug_scope_resolve: opt.debug_scope_resolve,
        verbose: opt.verbose,
        timing: opt.timing,
    })
}

fn run(opt: Opt) -> anyhow::Result<()> {
    let config = build_config(&opt)?;
    let source = config.source_text()?;
    log::debug!("compiling {} byte(s) of source", source.len());

    let output = run_pipeline(&source, &config)?;

    if config.print_ast {
        println!("{}", output.ast_dump);
    }
    if config.print_analyzed_ast {
        println!("{}", output.analyzed_ast_dump);
    }
    if config.print_code {
        if let Some(code) = &output.generated {
            println!("{}", code);
        }
    }

    // Invoking a real C compiler/linker is explicitly out of scope;
    // `NullToolchain` documents the seam instead of fabricating a
    // subprocess call that was never asked for.
    if config.stage == Stage::CompileBinary {
        let toolchain = NullToolchain;
        toolchain.probe()?;
        if let Some(code) = &output.generated {
            let out_path = config
                .output_path
                .clone()
                .unwrap_or_else(|| PathBuf::from("a.out"));
            toolchain.compile(code, &config.cflags, &config.ldflags, &[], &out_path)?;
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let opt = match Opt::from_iter_safe(std::env::args_os()) {
        Ok(opt) => opt,
        Err(e)
            if e.kind == ClapErrorKind::HelpDisplayed || e.kind == ClapErrorKind::VersionDisplayed =>
        {
            print!("{}", e.message);
            process::exit(0);
        }
        Err(_) => {
            eprintln!("{}", DriverError::UnknownOption);
            process::exit(1);
        }
    };

    if let Err(e) = run(opt) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
