//! The preprocessor engine: a tree-walking interpreter that executes
//! `Preprocess`/`PreprocessExpr` fragments against the live AST, scope
//! graph, pragma map, and type table, rather than emitting a separate
//! scripting-language program for an external VM to run. This keeps every
//! externally observable guarantee (ordering, hygiene, `afterinfer`
//! deferral) intact without inventing a textual-codegen-to-pp-VM
//! indirection.

pub mod env;
pub mod interp;
pub mod value;

use crate::ast::{Ast, NodeId, Tag};
use crate::error::PreprocessError;
use crate::pragma::PragmaMap;
use crate::preprocess::interp::Interpreter;
use crate::preprocess::value::PpValue;
use crate::scope::Scopes;
use crate::types::TypeTable;
use std::collections::HashMap;

// `run_statement`/`run_expr`/`run_afterinfer_callback` below each spin up a
// fresh `Interpreter`, so pp-local variables don't survive between calls.
// For a block with more than one directive that needs to share state, the
// analyzer constructs and reuses a single `Interpreter` across every
// directive in that block instead of going through these wrappers.

/// Everything a preprocess fragment produced as a side effect: nodes it
/// asked to be injected (in call order) and callbacks it scheduled via
/// `afterinfer`, each paired with the synthetic `PragmaCall` node standing
/// in for it in the tree.
#[derive(Default)]
pub struct PreprocessOutcome {
    pub injected: Vec<NodeId>,
    pub afterinfer: Vec<(NodeId, PpValue)>,
}

/// Run a `Tag::Preprocess` statement fragment (the `##` form) for side
/// effects only. `defines` is the CLI `-D` host environment, the last tier
/// of the identifier lookup chain.
pub fn run_statement(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    node: NodeId,
) -> Result<PreprocessOutcome, PreprocessError> {
    assert_eq!(ast.get(node).tag, Tag::Preprocess, "run_statement expects a Preprocess node");
    let body = ast.get(node).children[0];
    let mut interp = Interpreter::new(ast, scopes, pragmas, types, defines);
    interp.exec_block(body)?;
    Ok(PreprocessOutcome {
        injected: interp.injected,
        afterinfer: interp
            .afterinfer_queue
            .into_iter()
            .map(|(id, f, _)| (id, f))
            .collect(),
    })
}

/// Run a `Tag::PreprocessExpr` expression fragment (the `#[ ... ]#` form),
/// returning the value the surrounding slot should be replaced with.
pub fn run_expr(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    node: NodeId,
) -> Result<(PpValue, PreprocessOutcome), PreprocessError> {
    assert_eq!(ast.get(node).tag, Tag::PreprocessExpr, "run_expr expects a PreprocessExpr node");
    let body = ast.get(node).children[0];
    let mut interp = Interpreter::new(ast, scopes, pragmas, types, defines);
    let value = interp.eval_expr_fragment(body)?;
    let outcome = PreprocessOutcome {
        injected: interp.injected,
        afterinfer: interp
            .afterinfer_queue
            .into_iter()
            .map(|(id, f, _)| (id, f))
            .collect(),
    };
    Ok((value, outcome))
}

/// Invoke one queued `afterinfer` callback, once the analyzer has finished
/// typing the block that scheduled it.
pub fn run_afterinfer_callback(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    callback: &PpValue,
) -> Result<PreprocessOutcome, PreprocessError> {
    let mut interp = Interpreter::new(ast, scopes, pragmas, types, defines);
    let func = match callback {
        PpValue::Function(f) => f.clone(),
        PpValue::Hygienic(h) => h.inner.clone(),
        other => {
            return Err(PreprocessError::NotCallable(other.to_string()));
        }
    };
    interp.call_afterinfer(&func)?;
    Ok(PreprocessOutcome {
        injected: interp.injected,
        afterinfer: interp
            .afterinfer_queue
            .into_iter()
            .map(|(id, f, _)| (id, f))
            .collect(),
    })
}
