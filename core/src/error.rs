//! All error-related types.
//!
//! Follows the `SourceError`/`SourceErrorWrapper`/`WithSource` shape used
//! throughout this family of compilers: an error enum carries just the
//! *kind*, a wrapper pairs it with a [`Span`] and the offending source
//! slice, and `WithSource` batches every error produced by one pipeline run
//! so they can all be reported together — type and lookup errors attach to
//! the offending node and are batched; analysis continues where possible.

use crate::span::{self, Span};
use std::fmt::{self, Debug, Display, Formatter};
use thiserror::Error;

/// A trait for any error that originates in source code. Formatting needs
/// the spanned source slice supplied by the caller, since the error itself
/// doesn't borrow the source.
pub trait SourceError: Debug {
    fn type_label(&self) -> &'static str;
    fn fmt_msg(&self, f: &mut Formatter<'_>, spanned_src: &str) -> fmt::Result;
}

/// Lookup/declaration errors: undefined identifier, duplicate symbol.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LookupError {
    #[error("undefined identifier")]
    Undefined,
    #[error("`{0}` is already declared in this scope with an incompatible type")]
    Duplicate(String),
}

impl SourceError for LookupError {
    fn type_label(&self) -> &'static str {
        "Lookup"
    }

    fn fmt_msg(&self, f: &mut Formatter<'_>, spanned_src: &str) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "Undefined identifier `{}`", spanned_src),
            Self::Duplicate(name) => write!(
                f,
                "`{}` is already declared in this scope with an incompatible type",
                name
            ),
        }
    }
}

/// Type errors: incompatible assignment, invalid operator usage, bad
/// narrowing, unprintable record.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TypeError {
    #[error("cannot assign a value of type `{src}` to a slot of type `{dst}`")]
    IncompatibleAssignment { src: String, dst: String },
    #[error("invalid operator `{op}` on operands of type `{lhs}` and `{rhs}`")]
    InvalidOperator { op: String, lhs: String, rhs: String },
    #[error("narrowing conversion from `{src}` to `{dst}` may lose information")]
    BadNarrowing { src: String, dst: String },
    #[error("cannot handle type in print")]
    CannotPrint,
    #[error("polymorphic function instantiation failed: {0}")]
    PolymorphicInstantiation(String),
    #[error("literal suffix '{0}' is undefined")]
    UndefinedLiteralSuffix(String),
}

impl SourceError for TypeError {
    fn type_label(&self) -> &'static str {
        "Type"
    }

    fn fmt_msg(&self, f: &mut Formatter<'_>, spanned_src: &str) -> fmt::Result {
        match self {
            Self::IncompatibleAssignment { src, dst } => write!(
                f,
                "Cannot assign `{}` (type `{}`) to a slot of type `{}`",
                spanned_src, src, dst
            ),
            Self::InvalidOperator { op, lhs, rhs } => write!(
                f,
                "Invalid operator `{}` on `{}` (types `{}` and `{}`)",
                op, spanned_src, lhs, rhs
            ),
            Self::BadNarrowing { src, dst } => write!(
                f,
                "Narrowing cast of `{}` from `{}` to `{}` may lose information",
                spanned_src, src, dst
            ),
            Self::CannotPrint => {
                write!(f, "cannot handle type in print `{}`", spanned_src)
            }
            Self::PolymorphicInstantiation(reason) => write!(
                f,
                "polymorphic function instantiation of `{}` failed: {}",
                spanned_src, reason
            ),
            Self::UndefinedLiteralSuffix(suffix) => {
                write!(f, "literal suffix '{}' is undefined", suffix)
            }
        }
    }
}

/// Preprocess errors: static assertion failure, invalid argument to a pp
/// helper, uncaught error inside user pp code.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PreprocessError {
    #[error("static assertion failed: {0}")]
    StaticAssertFailed(String),
    #[error("invalid argument to `{0}`: {1}")]
    InvalidArgument(String, String),
    #[error("uncaught error in preprocess code: {0}")]
    Uncaught(String),
    #[error("undefined identifier `{0}` in preprocess code")]
    UndefinedName(String),
    #[error("`{0}` is not callable")]
    NotCallable(String),
}

impl SourceError for PreprocessError {
    fn type_label(&self) -> &'static str {
        "Preprocess"
    }

    fn fmt_msg(&self, f: &mut Formatter<'_>, spanned_src: &str) -> fmt::Result {
        match self {
            Self::StaticAssertFailed(msg) => {
                write!(f, "static assertion failed!")?;
                if !msg.is_empty() {
                    write!(f, " {}", msg)?;
                }
                Ok(())
            }
            Self::InvalidArgument(helper, reason) => {
                write!(f, "invalid argument to `{}`: {}", helper, reason)
            }
            Self::Uncaught(msg) => write!(f, "{} (at `{}`)", msg, spanned_src),
            Self::UndefinedName(name) => write!(f, "undefined identifier `{}`", name),
            Self::NotCallable(name) => write!(f, "`{}` is not callable", name),
        }
    }
}

/// Driver errors: invalid flag, unreadable file, missing or broken C
/// toolchain. These never carry a [`Span`]; they're reported as a single
/// line and exit the process non-zero.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DriverError {
    #[error("unknown option")]
    UnknownOption,
    #[error("failed parsing parameter '{0}'")]
    BadParameter(String),
    #[error("{0} is not a valid directory")]
    InvalidDirectory(String),
    #[error("failed to retrieve compiler information")]
    BadToolchain,
    #[error("{0}: No such file or directory")]
    MissingFile(String),
}

/// A wrapper pairing a [`SourceError`] with the [`Span`] that caused it and
/// the literal source slice that span covers, so the pair is formattable
/// with no other context.
#[derive(Clone, Debug)]
pub struct SourceErrorWrapper<E: SourceError + Clone> {
    pub error: E,
    pub span: Span,
    spanned_source: String,
}

impl<E: SourceError + Clone> SourceErrorWrapper<E> {
    pub fn new(error: E, span: Span, src: &str) -> Self {
        Self {
            error,
            span,
            spanned_source: span.get_source_slice(src).to_string(),
        }
    }
}

impl<E: SourceError + Clone> Display for SourceErrorWrapper<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error at {}:{}: ",
            self.error.type_label(),
            self.span.start_line,
            self.span.start_col,
        )?;
        self.error.fmt_msg(f, &self.spanned_source)?;
        if f.alternate() {
            span::fmt_src_highlights(f, &self.span, &self.spanned_source)?;
        }
        Ok(())
    }
}

/// A batch of [`SourceErrorWrapper`]s plus the source code they came from,
/// so they can all be rendered together.
#[derive(Clone, Debug)]
pub struct WithSource<E: SourceError + Clone> {
    errors: Vec<SourceErrorWrapper<E>>,
    source_code: String,
}

impl<E: SourceError + Clone> WithSource<E> {
    pub fn new(errors: impl IntoIterator<Item = SourceErrorWrapper<E>>, source: String) -> Self {
        Self {
            errors: errors.into_iter().collect(),
            source_code: source,
        }
    }

    pub fn errors(&self) -> &[SourceErrorWrapper<E>] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<E: SourceError + Clone> Display for WithSource<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{} error at {}:{}: ",
                error.error.type_label(),
                error.span.start_line,
                error.span.start_col,
            )?;
            error.error.fmt_msg(f, &error.spanned_source)?;
        }
        Ok(())
    }
}

impl<E: SourceError + Clone> std::error::Error for WithSource<E> {}

/// Fixed panic messages emitted *inside generated C* by the runtime-helper
/// contracts the builtin library implements. These are not Rust errors —
/// they never surface through this crate's `Result` types — but
/// centralizing the literal strings here keeps the emitter and its tests
/// from drifting apart.
pub mod runtime_messages {
    pub const DIVIDE_BY_ZERO: &str = "attempt to perform 'n/0'";
    pub const NARROW_CAST: &str = "narrow casting from %s to %s failed";
    pub const BOUNDS: &str = "array index: position out of bounds";
    pub const NULL_DEREF: &str = "attempt to dereference a null pointer";
    pub const ASSERTION_FAILED: &str = "assertion failed!";
}
