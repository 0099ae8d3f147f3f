//! The layered binding-resolution chain: a tagged variant
//! `Binding = Symbol | Pragma | Host | Type` with a single
//! `lookup(name) -> Option<Binding>` walking the chain in a fixed order.
//! Assignment routes through the same layered map.

use crate::pragma::FieldValue;
use crate::preprocess::value::{Host, PpValue};
use crate::scope::Symbol;
use std::collections::HashMap;

/// One binding an identifier inside pp code can resolve to. Order of the
/// variants here is purely descriptive; resolution order is enforced by
/// [`PpEnv::lookup`], not by enum declaration order.
#[derive(Clone, Debug)]
pub enum Binding {
    Symbol(Symbol),
    Pragma(FieldValue),
    Host(PpValue),
}

/// The pp program's own local variable table — plain `Host`-falling-through
/// variables that aren't symbols or pragmas, e.g. a loop counter a user pp
/// script declares with `x = 1`.
#[derive(Default)]
pub struct PpEnv {
    vars: HashMap<String, PpValue>,
}

impl PpEnv {
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        vars.insert("primtypes".to_string(), PpValue::Host(Host::PrimTypes));
        vars.insert("ast".to_string(), PpValue::Host(Host::Ast));
        vars.insert("aster".to_string(), PpValue::Host(Host::Aster));
        vars.insert("context".to_string(), PpValue::Host(Host::Context));
        vars.insert("config".to_string(), PpValue::Host(Host::Config));
        Self { vars }
    }

    pub fn get_var(&self, name: &str) -> Option<&PpValue> {
        self.vars.get(name)
    }

    pub fn set_var(&mut self, name: &str, value: PpValue) {
        self.vars.insert(name.to_string(), value);
    }
}
