//! The AST node representation.
//!
//! Nodes live in an append-only arena ([`Ast`]) and are referred to by the
//! stable [`NodeId`] registry index: generated preprocessor code never holds
//! a pointer to a node, only an index, so rewriting a block during
//! reconstruction can't invalidate anything still holding an id.

use crate::span::Span;
use crate::types::{ConstValue, TypeId, TypeTable};
use std::collections::HashMap;

/// The tag of an AST node. This list covers both "real" program syntax and
/// the preprocessor's own statement/expression forms: since the
/// preprocessor operates on the same AST it analyzes, pp code is represented
/// with the same node types rather than a separate mini-language.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    // -- literals / atoms --
    Nil,
    Boolean,
    Number,
    String,
    Id,
    /// A name that's only known once a `PreprocessName` fragment evaluates;
    /// after preprocessing this is transparently replaced with `Id`.
    PreprocessName,

    // -- expressions --
    Call,
    MethodCall,
    BinOp,
    UnOp,
    Paren,
    DotIndex,
    ArrayIndex,
    /// Expression-position preprocess directive (`#[ ... ]#`); evaluated
    /// during analysis and the surrounding slot is replaced by the result.
    PreprocessExpr,

    // -- statements --
    Block,
    VarDecl,
    Assign,
    Return,
    If,
    IfClause,
    While,
    For,
    FunctionDef,
    ExprStat,
    /// Statement-position preprocess directive (`##`), executed for side
    /// effects only.
    Preprocess,
    /// A call to a pragma, either synthesized by the preprocessor (e.g.
    /// `afterinfer`) or written directly in source.
    PragmaCall,
    Require,

    // -- misc containers --
    /// An ordered list of child nodes with no other semantics of its own,
    /// e.g. a call's argument list or a function's parameter list.
    List,
    /// A typed parameter/field declaration, e.g. `x: int32`.
    TypedDecl,
}

/// Known, statically-meaningful attributes tracked on a node: resolved
/// `type`, constant `value`, `lvalue`, `comptime`, `builtintype`,
/// `loadedast`, and free-form flags.
#[derive(Clone, Debug, Default)]
pub struct Attrs {
    pub ty: Option<TypeId>,
    pub value: Option<ConstValue>,
    pub lvalue: bool,
    pub comptime: bool,
    pub builtintype: Option<String>,
    pub loadedast: Option<NodeId>,
    /// Free-form boolean flags, e.g. `needprocess`, `alreadyrequired`.
    flags: HashMap<&'static str, bool>,
}

impl Attrs {
    pub fn flag(&self, name: &'static str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set_flag(&mut self, name: &'static str, value: bool) {
        self.flags.insert(name, value);
    }
}

/// A stable index into an [`Ast`] arena. Generated preprocessor code
/// addresses nodes exclusively through this handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Leaf payload that doesn't fit naturally as a child node: identifier
/// text, literal text, etc.
#[derive(Clone, Debug, PartialEq)]
pub enum Lit {
    None,
    Ident(String),
    Str(String),
    /// Raw literal text plus an optional suffix, e.g. `1_x` parses to
    /// `Num { text: "1", suffix: Some("x") }`.
    Num { text: String, suffix: Option<String> },
    Bool(bool),
    /// Operator token for `BinOp`/`UnOp` nodes.
    Op(&'static str),
}

/// A single AST node: tag, ordered children, leaf payload, source span, and
/// the analyzer-populated attribute bag.
#[derive(Clone, Debug)]
pub struct AstNode {
    pub tag: Tag,
    pub children: Vec<NodeId>,
    pub lit: Lit,
    pub span: Span,
    pub attrs: Attrs,
}

/// The append-only arena owning every node in a translation unit.
#[derive(Default)]
pub struct Ast {
    nodes: Vec<AstNode>,
}

impl Ast {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Allocate a fresh node, assigning it the next registry index.
    pub fn push(&mut self, tag: Tag, children: Vec<NodeId>, lit: Lit, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(AstNode {
            tag,
            children,
            lit,
            span,
            attrs: Attrs::default(),
        });
        id
    }

    pub fn get(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deep-clone a subtree, assigning brand-new `NodeId`s to every node in
    /// the copy while leaving the original untouched. Used by the
    /// preprocessor when injecting a pre-analyzed template into a block
    /// being reconstructed.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let node = self.get(id).clone();
        let new_children: Vec<NodeId> =
            node.children.iter().map(|&c| self.clone_subtree(c)).collect();
        let new_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(AstNode {
            tag: node.tag,
            children: new_children,
            lit: node.lit,
            span: node.span,
            attrs: node.attrs,
        });
        new_id
    }

    /// Replace the node at `id` in place, preserving its `NodeId` so that
    /// any outstanding references (e.g. a parent's child slot, or a pp
    /// registry entry) keep pointing at the right thing. This is how a
    /// `PreprocessExpr` node's surrounding slot gets replaced without
    /// having to rewrite the parent's child list.
    pub fn replace(&mut self, id: NodeId, tag: Tag, children: Vec<NodeId>, lit: Lit) {
        let node = self.get_mut(id);
        node.tag = tag;
        node.children = children;
        node.lit = lit;
    }

    /// Render the tree rooted at `id` for `--print-ast`:
    /// `Tag{child, child, ...}`, with list children rendered as
    /// `{item, item}` and the handful of leaf tags rendered with their
    /// literal plus a trailing attr slot (`nil`, since this is always
    /// called before analysis runs).
    pub fn dump(&self, id: NodeId) -> String {
        self.dump_inner(id, None)
    }

    /// Render the tree for `--print-analyzed-ast`: identical shape to
    /// [`Self::dump`], but with each leaf's attr slot showing
    /// `type = "<codename>"` once the analyzer has set it, e.g.
    /// `String{"hello world", type = "stringview"}`.
    pub fn dump_typed(&self, id: NodeId, types: &TypeTable) -> String {
        self.dump_inner(id, Some(types))
    }

    fn dump_inner(&self, id: NodeId, types: Option<&TypeTable>) -> String {
        let node = self.get(id);
        match node.tag {
            Tag::Id => format!("Id{{\"{}\"}}", ident_of(&node.lit)),
            Tag::String => format!(
                "String{{\"{}\", {}}}",
                str_of(&node.lit),
                self.attr_or_nil(id, types)
            ),
            Tag::Number => format!(
                "Number{{\"{}\", {}}}",
                num_of(&node.lit),
                self.attr_or_nil(id, types)
            ),
            Tag::Boolean => format!("Boolean{{{}}}", bool_of(&node.lit)),
            Tag::Nil => "Nil{}".to_string(),
            Tag::List => {
                let items: Vec<_> = node.children.iter().map(|&c| self.dump_inner(c, types)).collect();
                format!("{{{}}}", items.join(", "))
            }
            Tag::Call => {
                // children[0] = callee, children[1] = args list
                let callee = self.dump_inner(node.children[0], types);
                let args = self.dump_inner(node.children[1], types);
                format!("Call{{ {}, {} }}", args, callee)
            }
            Tag::Block => {
                let items: Vec<_> = node.children.iter().map(|&c| self.dump_inner(c, types)).collect();
                format!("Block{{ {{{}}} }}", items.join(", "))
            }
            // A statement-position expression dumps as the expression
            // itself; `ExprStat` is a pure wrapper with no syntax of its own
            // (`print "hello world"` dumps as a bare `Call`, not
            // `ExprStat{Call{...}}`).
            Tag::ExprStat => self.dump_inner(node.children[0], types),
            _ => {
                let items: Vec<_> = node.children.iter().map(|&c| self.dump_inner(c, types)).collect();
                format!("{:?}{{{}}}", node.tag, items.join(", "))
            }
        }
    }

    fn attr_or_nil(&self, id: NodeId, types: Option<&TypeTable>) -> String {
        match (&self.get(id).attrs.ty, types) {
            (Some(ty), Some(types)) => format!("type = \"{}\"", types.codename(*ty)),
            (Some(ty), None) => format!("type={}", ty),
            (None, _) => "nil".to_string(),
        }
    }
}

fn ident_of(lit: &Lit) -> &str {
    match lit {
        Lit::Ident(s) => s,
        _ => "",
    }
}

fn str_of(lit: &Lit) -> &str {
    match lit {
        Lit::Str(s) => s,
        _ => "",
    }
}

fn num_of(lit: &Lit) -> &str {
    match lit {
        Lit::Num { text, .. } => text,
        _ => "",
    }
}

fn bool_of(lit: &Lit) -> &'static str {
    match lit {
        Lit::Bool(true) => "true",
        _ => "false",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_subtree_gets_fresh_ids() {
        let mut ast = Ast::new();
        let leaf = ast.push(Tag::Id, vec![], Lit::Ident("x".into()), Span::synthetic());
        let root = ast.push(Tag::ExprStat, vec![leaf], Lit::None, Span::synthetic());
        let clone = ast.clone_subtree(root);
        assert_ne!(clone, root);
        let clone_leaf = ast.get(clone).children[0];
        assert_ne!(clone_leaf, leaf);
        assert_eq!(ast.get(clone_leaf).lit, Lit::Ident("x".into()));
    }

    #[test]
    fn replace_preserves_node_id() {
        let mut ast = Ast::new();
        let id = ast.push(Tag::PreprocessExpr, vec![], Lit::None, Span::synthetic());
        ast.replace(id, Tag::Number, vec![], Lit::Num { text: "1".into(), suffix: None });
        assert_eq!(ast.get(id).tag, Tag::Number);
    }
}
