//! Compiler configuration: the CLI crate parses flags into a [`Config`]
//! and hands it to [`crate::driver::run_pipeline`]. Kept serde-serializable
//! since a planned artifact cache would key off a hash of (source text,
//! toolchain identity, relevant flags) — this struct is the natural
//! "relevant flags" payload.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// `--generator {lua|c}` (default `c`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorChoice {
    C,
    Lua,
}

impl Default for GeneratorChoice {
    fn default() -> Self {
        GeneratorChoice::C
    }
}

/// Which pipeline stage to stop at: `--lint` / `--analyze` / `--compile-code`
/// / `--compile-binary`, in increasing depth.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Lint,
    Analyze,
    CompileCode,
    CompileBinary,
}

impl Default for Stage {
    fn default() -> Self {
        Stage::CompileBinary
    }
}

/// A `-D`/`--define` value, pre-converted to the simplest shape that is
/// still `Serialize`: [`crate::preprocess::value::PpValue`] carries `Rc`s
/// and node handles that have no business in a config the driver caches or
/// prints, so this is the host environment's actual wire shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DefineValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// `--shared` / `--static` / (absence of either => a plain executable).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    Executable,
    Shared,
    Static,
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Executable
    }
}

/// Every CLI-settable knob, bundled so the driver and the artifact cache
/// can both take a single value instead of a dozen parameters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    pub generator: GeneratorChoice,
    pub stage: Stage,

    /// Mutually exclusive with `eval_source`; `--eval "code"` takes
    /// precedence when both are somehow set.
    pub source_path: Option<PathBuf>,
    pub eval_source: Option<String>,

    pub no_cache: bool,
    pub cache_dir: Option<PathBuf>,

    pub defines: HashMap<String, DefineValue>,
    /// Raw `NAME[=val]` pragma assignments from `-P`/`--pragma`, applied to
    /// a fresh [`crate::pragma::PragmaMap`] by the driver before analysis
    /// starts.
    pub pragma_fields: Vec<(String, String)>,

    /// `--path`/`-L`: replaces or appends to the module search path. Each
    /// entry is either a bare directory or a `?`-pattern.
    pub search_path: Vec<String>,

    pub cc: Option<String>,
    pub cflags: Vec<String>,
    pub ldflags: Vec<String>,

    pub output: OutputMode,
    pub output_path: Option<PathBuf>,

    pub print_ast: bool,
    pub print_analyzed_ast: bool,
    pub print_code: bool,

    pub debug_resolve: bool,
    pub debug_scope_resolve: bool,
    pub verbose: bool,
    pub timing: bool,
}

impl Config {
    /// Resolve the source text to compile: `--eval` wins over a source
    /// path, since it supplies source inline in lieu of a file.
    pub fn source_text(&self) -> Result<String, crate::error::DriverError> {
        if let Some(code) = &self.eval_source {
            return Ok(code.clone());
        }
        match &self.source_path {
            Some(path) => std::fs::read_to_string(path).map_err(|_| {
                crate::error::DriverError::MissingFile(path.display().to_string())
            }),
            None => Ok(String::new()),
        }
    }

    /// Convert the serializable `defines` map into the
    /// [`crate::preprocess::value::PpValue`] shape `-D` values need to be in
    /// to act as the host tier of pp identifier lookup.
    pub fn defines_as_pp_values(&self) -> HashMap<String, crate::preprocess::value::PpValue> {
        use crate::preprocess::value::PpValue;
        self.defines
            .iter()
            .map(|(k, v)| {
                let pv = match v {
                    DefineValue::Bool(b) => PpValue::Bool(*b),
                    DefineValue::Int(i) => PpValue::Int(*i),
                    DefineValue::Str(s) => PpValue::Str(s.clone()),
                };
                (k.clone(), pv)
            })
            .collect()
    }
}

/// Parse a single `-D`/`--define` argument of the form `NAME[=val]` into a
/// `(name, value)` pair, rejecting names that aren't valid identifiers
/// (e.g. `-D1` fails with `"failed parsing parameter '1'"`).
pub fn parse_define(raw: &str) -> Result<(String, DefineValue), crate::error::DriverError> {
    let (name, value) = match raw.split_once('=') {
        Some((n, v)) => (n, Some(v)),
        None => (raw, None),
    };
    if !is_identifier(name) {
        return Err(crate::error::DriverError::BadParameter(raw.to_string()));
    }
    let value = match value {
        None => DefineValue::Bool(true),
        Some(v) => {
            if v == "true" {
                DefineValue::Bool(true)
            } else if v == "false" {
                DefineValue::Bool(false)
            } else if let Ok(i) = v.parse::<i64>() {
                DefineValue::Int(i)
            } else {
                DefineValue::Str(strip_quotes(v).to_string())
            }
        }
    };
    Ok((name.to_string(), value))
}

/// Parse a single `-P`/`--pragma` argument into a raw `(name, value)` pair;
/// shape validation against known field pragmas happens in
/// [`crate::pragma::PragmaMap::set_field`], not here.
pub fn parse_pragma(raw: &str) -> (String, String) {
    match raw.split_once('=') {
        Some((n, v)) => (n.to_string(), strip_quotes(v).to_string()),
        None => (raw.to_string(), "true".to_string()),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn strip_quotes(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
        &s[1..s.len() - 1]
    } else if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Validate a `--path`/`-L` entry: a bare directory must exist (otherwise
/// `"... is not a valid directory"`); a `?`-pattern is accepted unchecked
/// since it doesn't name a single directory.
pub fn validate_search_path_entry(entry: &str) -> Result<(), crate::error::DriverError> {
    if entry.contains('?') {
        return Ok(());
    }
    if std::path::Path::new(entry).is_dir() {
        Ok(())
    } else {
        Err(crate::error::DriverError::InvalidDirectory(entry.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_define_rejects_non_identifier_name() {
        assert!(parse_define("1").is_err());
    }

    #[test]
    fn parse_define_accepts_bool_int_string() {
        assert_eq!(
            parse_define("DEF1").unwrap(),
            ("DEF1".to_string(), DefineValue::Bool(true))
        );
        assert_eq!(
            parse_define("DEF3=1").unwrap(),
            ("DEF3".to_string(), DefineValue::Int(1))
        );
        assert_eq!(
            parse_define("DEF4='asd'").unwrap(),
            ("DEF4".to_string(), DefineValue::Str("asd".to_string()))
        );
    }

    #[test]
    fn validate_search_path_accepts_pattern_unchecked() {
        assert!(validate_search_path_entry("./modules/?.glint").is_ok());
    }
}
