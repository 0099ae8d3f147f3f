//! `glint`: the frontend and portable-C/Lua backend for the Glint language.
//! This crate owns everything from source text to generated target code;
//! the CLI driver glue lives in the sibling `glint_cli` crate.

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod driver;
pub mod emit;
pub mod error;
pub mod parse;
pub mod pragma;
pub mod preprocess;
pub mod scope;
pub mod span;
pub mod types;
