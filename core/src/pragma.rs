//! The process-wide pragma map.
//!
//! Field pragmas are simple key/value settings validated on assignment
//! (`nochecks`, `noabort`, `cflags`, `ldflags`, `linklib`); call pragmas
//! validate their argument tuple shape (e.g. the synthetic
//! `afterinfer(f)` pragma the preprocessor schedules).

use std::collections::HashMap;
use thiserror::Error;

use crate::preprocess::value::PpValue;

#[derive(Debug, Error, PartialEq)]
pub enum PragmaError {
    #[error("pragma `{0}` expects a {1} value")]
    BadFieldValue(&'static str, &'static str),
    #[error("unrecognized pragma `{0}`")]
    Unrecognized(String),
    #[error("call pragma `{0}` expects {1} argument(s), got {2}")]
    BadArity(&'static str, usize, usize),
}

/// One field pragma's current value.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Str(String),
}

/// A queued call-form pragma, e.g. the synthetic `PragmaCall{'afterinfer', f}`
/// the preprocessor emits for `afterinfer`.
#[derive(Clone, Debug)]
pub struct CallPragma {
    pub name: String,
    pub args: Vec<PpValue>,
}

/// Recognized field pragma names.
pub const NOCHECKS: &str = "nochecks";
pub const NOABORT: &str = "noabort";
pub const CFLAGS: &str = "cflags";
pub const LDFLAGS: &str = "ldflags";
pub const LINKLIB: &str = "linklib";

fn is_known_field(name: &str) -> bool {
    matches!(name, NOCHECKS | NOABORT | CFLAGS | LDFLAGS | LINKLIB)
}

/// The pragma stack: pushed/popped around `require`d modules so a module's
/// pragmas don't leak into its requester, while still being visible for
/// the duration of that module's analysis.
#[derive(Clone, Debug, Default)]
pub struct PragmaMap {
    fields: HashMap<String, FieldValue>,
    appended: HashMap<String, Vec<String>>,
}

impl PragmaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field pragma, validating the value's shape against the
    /// recognized field's expected type.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), PragmaError> {
        if !is_known_field(name) {
            return Err(PragmaError::Unrecognized(name.to_string()));
        }
        match (name, &value) {
            (NOCHECKS, FieldValue::Bool(_)) | (NOABORT, FieldValue::Bool(_)) => {}
            (CFLAGS, FieldValue::Str(s)) | (LDFLAGS, FieldValue::Str(s)) | (LINKLIB, FieldValue::Str(s)) => {
                self.appended.entry(name.to_string()).or_default().push(s.clone());
            }
            (NOCHECKS, _) | (NOABORT, _) => {
                return Err(PragmaError::BadFieldValue(
                    leak(name.to_string()),
                    "boolean",
                ))
            }
            (CFLAGS, _) | (LDFLAGS, _) | (LINKLIB, _) => {
                return Err(PragmaError::BadFieldValue(leak(name.to_string()), "string"))
            }
            _ => unreachable!("is_known_field already filtered this"),
        }
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn is_known_field(name: &str) -> bool {
        is_known_field(name)
    }

    pub fn nochecks(&self) -> bool {
        matches!(self.fields.get(NOCHECKS), Some(FieldValue::Bool(true)))
    }

    pub fn noabort(&self) -> bool {
        matches!(self.fields.get(NOABORT), Some(FieldValue::Bool(true)))
    }

    /// Every token ever appended to `cflags`/`ldflags`/`linklib` across the
    /// lifetime of this map, in append order.
    pub fn appended_tokens(&self, name: &str) -> &[String] {
        self.appended.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Validate a call pragma's argument tuple shape. Only `afterinfer` is
    /// a recognized call pragma in this engine; arbitrary other call-form
    /// pragmas are rejected rather than silently accepted.
    pub fn validate_call(name: &str, args: &[PpValue]) -> Result<(), PragmaError> {
        match name {
            "afterinfer" => {
                if args.len() != 1 {
                    return Err(PragmaError::BadArity("afterinfer", 1, args.len()));
                }
                Ok(())
            }
            _ => Err(PragmaError::Unrecognized(name.to_string())),
        }
    }
}

// `PragmaError::BadFieldValue` wants a `&'static str`, but the field name
// arrives as a borrowed `&str` from caller-owned data in a couple of call
// sites above. Every call site here passes one of the five known constants,
// so leaking is a one-time, bounded cost (at most 5 strings, ever).
fn leak(s: String) -> &'static str {
    match s.as_str() {
        NOCHECKS => NOCHECKS,
        NOABORT => NOABORT,
        CFLAGS => CFLAGS,
        LDFLAGS => LDFLAGS,
        LINKLIB => LINKLIB,
        _ => "pragma",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_field_type() {
        let mut map = PragmaMap::new();
        assert!(map.set_field(NOCHECKS, FieldValue::Str("x".into())).is_err());
    }

    #[test]
    fn accepts_known_fields() {
        let mut map = PragmaMap::new();
        map.set_field(NOCHECKS, FieldValue::Bool(true)).unwrap();
        assert!(map.nochecks());
    }

    #[test]
    fn rejects_unknown_field() {
        let mut map = PragmaMap::new();
        assert!(map.set_field("bogus", FieldValue::Bool(true)).is_err());
    }

    #[test]
    fn validates_afterinfer_arity() {
        assert!(PragmaMap::validate_call("afterinfer", &[PpValue::Nil]).is_ok());
        assert!(PragmaMap::validate_call("afterinfer", &[]).is_err());
    }
}
