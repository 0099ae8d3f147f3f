//! Runtime values inside the preprocessor's tree-walking interpreter.

use crate::ast::NodeId;
use crate::scope::Checkpoint;
use crate::types::TypeId;
use std::fmt;
use std::rc::Rc;

/// A user-defined pp function: parameter names plus the `Block` node that is
/// its body, captured together with the scope it closes over.
#[derive(Clone, Debug)]
pub struct PpFunction {
    pub params: Vec<String>,
    pub body: NodeId,
    pub closure_scope: crate::scope::ScopeId,
}

/// A pp function wrapped by `hygienize(f)`: reapplying it
/// restores the scope to the checkpoint captured *at the `hygienize` call
/// site*, runs the function, then restores again so nothing it declared
/// leaks to the next invocation.
#[derive(Clone, Debug)]
pub struct HygienicFn {
    pub inner: Rc<PpFunction>,
    pub checkpoint: Checkpoint,
}

/// One of the five introspection globals the preprocessor exposes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Host {
    PrimTypes,
    Ast,
    Aster,
    Context,
    Config,
}

/// Every value the pp interpreter can produce or consume.
#[derive(Clone, Debug)]
pub enum PpValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Node(NodeId),
    Type(TypeId),
    List(Vec<PpValue>),
    Function(Rc<PpFunction>),
    Hygienic(Rc<HygienicFn>),
    Host(Host),
    /// An AST node constructor obtained via `ast.<Tag>`, e.g. `ast.Id`.
    /// Calling it builds a node with that tag.
    Ctor(crate::ast::Tag),
}

impl PpValue {
    pub fn truthy(&self) -> bool {
        !matches!(self, PpValue::Nil | PpValue::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PpValue::Nil => "nil",
            PpValue::Bool(_) => "boolean",
            PpValue::Int(_) => "integer",
            PpValue::Float(_) => "float",
            PpValue::Str(_) => "string",
            PpValue::Node(_) => "node",
            PpValue::Type(_) => "type",
            PpValue::List(_) => "list",
            PpValue::Function(_) | PpValue::Hygienic(_) => "function",
            PpValue::Host(_) => "host",
            PpValue::Ctor(_) => "node-constructor",
        }
    }
}

impl fmt::Display for PpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PpValue::Nil => write!(f, "nil"),
            PpValue::Bool(b) => write!(f, "{}", b),
            PpValue::Int(i) => write!(f, "{}", i),
            PpValue::Float(x) => write!(f, "{}", x),
            PpValue::Str(s) => write!(f, "{}", s),
            PpValue::Node(id) => write!(f, "node#{}", id.0),
            PpValue::Type(ty) => write!(f, "{}", ty),
            PpValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            PpValue::Function(_) | PpValue::Hygienic(_) => write!(f, "<function>"),
            PpValue::Host(h) => write!(f, "<{:?}>", h),
            PpValue::Ctor(tag) => write!(f, "<ctor {:?}>", tag),
        }
    }
}
