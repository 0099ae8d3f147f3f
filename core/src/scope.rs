//! Symbol & scope graph.
//!
//! Checkpointing is implemented as a per-scope shadow stack of symbol-table
//! revisions: a checkpoint is just the current length of the revision log,
//! and restoring truncates it. This gives `hygienize` a way to undo
//! everything a replayed helper declared, without tearing down the scope
//! itself.

use crate::ast::NodeId;
use crate::types::TypeId;
use std::collections::HashMap;
use std::fmt;

pub type ScopeId = usize;

/// A declared symbol: name, declared type (possibly still unresolved),
/// optional constant value, lvalue-ness, and the node it was declared at.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub ty: Option<TypeId>,
    pub const_value: Option<crate::types::ConstValue>,
    pub lvalue: bool,
    pub decl_node: NodeId,
}

/// An opaque marker produced by [`Scopes::make_checkpoint`]. Restoring one
/// undoes every symbol insertion made in that scope since the checkpoint was
/// taken, without affecting scopes above or below it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    scope: ScopeId,
    revision: usize,
}

/// One entry in a scope's symbol-table revision log: either a new binding,
/// or a future slot for popping. Only insertions are logged (there's no
/// other removal path besides checkpoint restore), so restoring a
/// checkpoint is just "forget every name inserted after revision N".
struct Revision {
    name: String,
    previous: Option<Symbol>,
}

struct ScopeNode {
    parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
    log: Vec<Revision>,
}

/// Errors for the declaration/lookup operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("`{0}` is already declared in this scope with an incompatible type")]
    DuplicateDeclaration(String),
}

/// The full scope stack for one translation unit. The root scope (index 0)
/// is created once and reused for the whole unit.
pub struct Scopes {
    scopes: Vec<ScopeNode>,
    stack: Vec<ScopeId>,
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

impl Scopes {
    pub fn new() -> Self {
        let root = ScopeNode {
            parent: None,
            symbols: HashMap::new(),
            log: Vec::new(),
        };
        Self {
            scopes: vec![root],
            stack: vec![0],
        }
    }

    pub fn root(&self) -> ScopeId {
        0
    }

    pub fn current(&self) -> ScopeId {
        *self.stack.last().expect("scope stack is never empty")
    }

    /// Push a new child scope governed by the current top of stack, and
    /// make it current.
    pub fn push_scope(&mut self) -> ScopeId {
        let parent = self.current();
        let id = self.scopes.len();
        self.scopes.push(ScopeNode {
            parent: Some(parent),
            symbols: HashMap::new(),
            log: Vec::new(),
        });
        self.stack.push(id);
        id
    }

    /// Pop the current scope. Every `push_scope` must be matched with a
    /// `pop_scope` on all exit paths, including diagnostic-raising ones.
    pub fn pop_scope(&mut self) {
        assert!(self.stack.len() > 1, "cannot pop the root scope");
        self.stack.pop();
    }

    /// Declare `name` in the current scope. Fails if the name already
    /// exists *at this level* with an incompatible type; redeclaring with
    /// the same type is allowed (idempotent re-analysis).
    pub fn declare(&mut self, name: &str, symbol: Symbol) -> Result<(), ScopeError> {
        self.declare_in(self.current(), name, symbol)
    }

    pub fn declare_in(
        &mut self,
        scope: ScopeId,
        name: &str,
        symbol: Symbol,
    ) -> Result<(), ScopeError> {
        let node = &mut self.scopes[scope];
        if let Some(existing) = node.symbols.get(name) {
            let compatible = match (existing.ty, symbol.ty) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            };
            if !compatible {
                return Err(ScopeError::DuplicateDeclaration(name.to_string()));
            }
        }
        let previous = node.symbols.insert(name.to_string(), symbol);
        node.log.push(Revision {
            name: name.to_string(),
            previous,
        });
        Ok(())
    }

    /// Walk the parent chain starting at `scope`, returning the first match.
    pub fn lookup_from(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut cur = Some(scope);
        while let Some(s) = cur {
            let node = &self.scopes[s];
            if let Some(sym) = node.symbols.get(name) {
                return Some(sym);
            }
            cur = node.parent;
        }
        None
    }

    /// Look up `name` starting at the current scope.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.lookup_from(self.current(), name)
    }

    /// Capture a checkpoint for `scope` that can later be restored via
    /// [`Self::pop_checkpoint`].
    pub fn make_checkpoint(&self, scope: ScopeId) -> Checkpoint {
        Checkpoint {
            scope,
            revision: self.scopes[scope].log.len(),
        }
    }

    /// Synonym kept for symmetry with `pop_checkpoint` (`push_checkpoint` /
    /// `pop_checkpoint`): taking a checkpoint doesn't mutate state, so this
    /// just delegates to `make_checkpoint`.
    pub fn push_checkpoint(&self, scope: ScopeId) -> Checkpoint {
        self.make_checkpoint(scope)
    }

    /// Restore `scope` to the state it was in when `checkpoint` was
    /// captured, discarding any symbols declared since.
    pub fn pop_checkpoint(&mut self, checkpoint: Checkpoint) {
        let node = &mut self.scopes[checkpoint.scope];
        while node.log.len() > checkpoint.revision {
            let rev = node.log.pop().expect("checked len above");
            match rev.previous {
                Some(prev) => {
                    node.symbols.insert(rev.name, prev);
                }
                None => {
                    node.symbols.remove(&rev.name);
                }
            }
        }
    }
}

impl fmt::Debug for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scopes")
            .field("depth", &self.stack.len())
            .field("scope_count", &self.scopes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Symbol {
        Symbol {
            name: name.to_string(),
            ty: None,
            const_value: None,
            lvalue: true,
            decl_node: NodeId(0),
        }
    }

    #[test]
    fn lookup_walks_parents() {
        let mut scopes = Scopes::new();
        scopes.declare("x", sym("x")).unwrap();
        scopes.push_scope();
        assert!(scopes.lookup("x").is_some());
        scopes.pop_scope();
    }

    #[test]
    fn checkpoint_undoes_insertions() {
        let mut scopes = Scopes::new();
        scopes.declare("a", sym("a")).unwrap();
        let cp = scopes.make_checkpoint(scopes.root());
        scopes.declare("b", sym("b")).unwrap();
        assert!(scopes.lookup("b").is_some());
        scopes.pop_checkpoint(cp);
        assert!(scopes.lookup("b").is_none());
        assert!(scopes.lookup("a").is_some());
    }

    #[test]
    fn checkpoint_restores_shadowed_symbol() {
        let mut scopes = Scopes::new();
        scopes.declare("a", sym("a")).unwrap();
        let cp = scopes.make_checkpoint(scopes.root());
        let mut shadow = sym("a");
        shadow.lvalue = false;
        scopes.declare("a", shadow).unwrap();
        assert!(!scopes.lookup("a").unwrap().lvalue);
        scopes.pop_checkpoint(cp);
        assert!(scopes.lookup("a").unwrap().lvalue);
    }

    #[test]
    fn duplicate_incompatible_declaration_errors() {
        let mut scopes = Scopes::new();
        let mut a = sym("a");
        a.ty = Some(TypeId(1));
        scopes.declare("a", a).unwrap();
        let mut b = sym("a");
        b.ty = Some(TypeId(2));
        assert!(scopes.declare("a", b).is_err());
    }
}
