//! The preprocessor's execution engine.
//!
//! Preprocess fragments are themselves represented in the same [`Ast`]
//! arena as the program they run inside of, so this is a small
//! tree-walking interpreter over `Tag::*` nodes rather than a
//! textual-codegen step feeding a separate VM. It reads and mutates the
//! *same* [`Scopes`] and [`PragmaMap`] the analyzer uses, which is what
//! lets a pp fragment observe types the analyzer already inferred for
//! earlier siblings.

use crate::ast::{Ast, Lit, NodeId, Tag};
use crate::error::PreprocessError;
use crate::pragma::{FieldValue, PragmaMap};
use crate::preprocess::env::PpEnv;
use crate::preprocess::value::{Host, HygienicFn, PpFunction, PpValue};
use crate::scope::{Checkpoint, Scopes, Symbol};
use crate::span::Span;
use crate::types::{ConstValue, TypeTable};
use std::rc::Rc;

/// Everything a pp fragment can read or mutate while it runs: the AST arena
/// it can inject nodes into and query, the scope graph, the pragma map, the
/// type table (for `primtypes`), its own local variable environment, and
/// the side channels for `injectnode`/`afterinfer`.
pub struct Interpreter<'a> {
    pub ast: &'a mut Ast,
    pub scopes: &'a mut Scopes,
    pub pragmas: &'a mut PragmaMap,
    pub types: &'a mut TypeTable,
    pub env: PpEnv,
    /// Nodes appended via `injectnode`, in call order.
    pub injected: Vec<NodeId>,
    /// Callbacks scheduled via `afterinfer`, in registration order, each
    /// paired with the synthetic `PragmaCall` node injected to represent it.
    pub afterinfer_queue: Vec<(NodeId, PpValue, Vec<PpValue>)>,
    /// Read-only host environment: CLI `-D` defines plus their values,
    /// consulted last in the lookup chain.
    pub defines: &'a std::collections::HashMap<String, PpValue>,
}

type PpResult<T> = Result<T, PreprocessError>;

impl<'a> Interpreter<'a> {
    pub fn new(
        ast: &'a mut Ast,
        scopes: &'a mut Scopes,
        pragmas: &'a mut PragmaMap,
        types: &'a mut TypeTable,
        defines: &'a std::collections::HashMap<String, PpValue>,
    ) -> Self {
        Self {
            ast,
            scopes,
            pragmas,
            types,
            env: PpEnv::new(),
            injected: Vec::new(),
            afterinfer_queue: Vec::new(),
            defines,
        }
    }

    /// Execute a `Preprocess` fragment's body for side effects.
    pub fn exec_block(&mut self, body: NodeId) -> PpResult<()> {
        let stmts = self.ast.get(body).children.clone();
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    /// Evaluate a `PreprocessExpr` fragment's body to a value.
    pub fn eval_expr_fragment(&mut self, body: NodeId) -> PpResult<PpValue> {
        self.eval(body)
    }

    fn exec_stmt(&mut self, id: NodeId) -> PpResult<Option<PpValue>> {
        let tag = self.ast.get(id).tag;
        match tag {
            Tag::ExprStat => {
                let inner = self.ast.get(id).children[0];
                self.eval(inner)?;
                Ok(None)
            }
            Tag::VarDecl => {
                let node = self.ast.get(id).clone();
                let name = match &node.lit {
                    Lit::Ident(s) => s.clone(),
                    _ => return Ok(None),
                };
                let value = match node.children.get(0) {
                    Some(&init) => self.eval(init)?,
                    None => PpValue::Nil,
                };
                self.assign(&name, value)?;
                Ok(None)
            }
            Tag::Assign => {
                let node = self.ast.get(id).clone();
                let target = node.children[0];
                let value = self.eval(node.children[1])?;
                let name = match &self.ast.get(target).lit {
                    Lit::Ident(s) => s.clone(),
                    _ => return Err(PreprocessError::Uncaught(
                        "assignment target must be an identifier".into(),
                    )),
                };
                self.assign(&name, value)?;
                Ok(None)
            }
            Tag::Block => {
                for stmt in self.ast.get(id).children.clone() {
                    if let Some(v) = self.exec_stmt(stmt)? {
                        return Ok(Some(v));
                    }
                }
                Ok(None)
            }
            Tag::If => {
                for clause in self.ast.get(id).children.clone() {
                    let clause_node = self.ast.get(clause).clone();
                    match clause_node.children.len() {
                        // IfClause{cond, body}
                        2 => {
                            let cond = self.eval(clause_node.children[0])?;
                            if cond.truthy() {
                                return self.exec_stmt(clause_node.children[1]);
                            }
                        }
                        // else body (no condition)
                        1 => {
                            return self.exec_stmt(clause_node.children[0]);
                        }
                        _ => {}
                    }
                }
                Ok(None)
            }
            Tag::Return => {
                let node = self.ast.get(id).clone();
                let value = match node.children.get(0) {
                    Some(&e) => self.eval(e)?,
                    None => PpValue::Nil,
                };
                Ok(Some(value))
            }
            Tag::FunctionDef => {
                let node = self.ast.get(id).clone();
                let name = match &node.lit {
                    Lit::Ident(s) => Some(s.clone()),
                    _ => None,
                };
                let params_list = node.children[0];
                let body = node.children[1];
                let params = self
                    .ast
                    .get(params_list)
                    .children
                    .iter()
                    .filter_map(|&p| match &self.ast.get(p).lit {
                        Lit::Ident(s) => Some(s.clone()),
                        _ => None,
                    })
                    .collect();
                let func = Rc::new(PpFunction {
                    params,
                    body,
                    closure_scope: self.scopes.current(),
                });
                if let Some(name) = name {
                    self.assign(&name, PpValue::Function(func))?;
                }
                Ok(None)
            }
            Tag::Preprocess => {
                let body = self.ast.get(id).children[0];
                self.exec_block(body)?;
                Ok(None)
            }
            _ => {
                // Any other statement kind (program statements interleaved
                // with pp code) is outside the interpreter's remit; the
                // analyzer handles those directly.
                Ok(None)
            }
        }
    }

    fn eval(&mut self, id: NodeId) -> PpResult<PpValue> {
        let node = self.ast.get(id).clone();
        match node.tag {
            Tag::Nil => Ok(PpValue::Nil),
            Tag::Boolean => Ok(match node.lit {
                Lit::Bool(b) => PpValue::Bool(b),
                _ => PpValue::Nil,
            }),
            Tag::Number => match node.lit {
                Lit::Num { text, .. } => {
                    if let Ok(i) = text.parse::<i64>() {
                        Ok(PpValue::Int(i))
                    } else {
                        text.parse::<f64>()
                            .map(PpValue::Float)
                            .map_err(|_| PreprocessError::Uncaught(format!("bad number `{}`", text)))
                    }
                }
                _ => Ok(PpValue::Nil),
            },
            Tag::String => match node.lit {
                Lit::Str(s) => Ok(PpValue::Str(s)),
                _ => Ok(PpValue::Nil),
            },
            Tag::Id => {
                let name = match node.lit {
                    Lit::Ident(s) => s,
                    _ => return Ok(PpValue::Nil),
                };
                self.lookup(&name)
            }
            Tag::Paren => self.eval(node.children[0]),
            Tag::List => {
                let mut items = Vec::new();
                for c in &node.children {
                    items.push(self.eval(*c)?);
                }
                Ok(PpValue::List(items))
            }
            Tag::UnOp => {
                let op = op_str(&node.lit);
                let v = self.eval(node.children[0])?;
                eval_unop(op, v)
            }
            Tag::BinOp => {
                let op = op_str(&node.lit);
                // `and`/`or` short-circuit.
                if op == "and" {
                    let lhs = self.eval(node.children[0])?;
                    return if lhs.truthy() { self.eval(node.children[1]) } else { Ok(lhs) };
                }
                if op == "or" {
                    let lhs = self.eval(node.children[0])?;
                    return if lhs.truthy() { Ok(lhs) } else { self.eval(node.children[1]) };
                }
                let lhs = self.eval(node.children[0])?;
                let rhs = self.eval(node.children[1])?;
                eval_binop(op, lhs, rhs)
            }
            Tag::DotIndex => {
                let obj = self.eval(node.children[0])?;
                let field = match &self.ast.get(node.children[1]).lit {
                    Lit::Ident(s) => s.clone(),
                    _ => String::new(),
                };
                self.dot_index(obj, &field, node.span)
            }
            Tag::Call => self.eval_call(id),
            _ => Err(PreprocessError::Uncaught(format!(
                "cannot evaluate node of tag {:?} in preprocess code",
                node.tag
            ))),
        }
    }

    fn lookup(&self, name: &str) -> PpResult<PpValue> {
        if let Some(v) = self.env.get_var(name) {
            return Ok(v.clone());
        }
        if let Some(sym) = self.scopes.lookup(name) {
            return Ok(symbol_to_value(sym));
        }
        if PragmaMap::is_known_field(name) {
            if let Some(v) = self.pragmas.get_field(name) {
                return Ok(field_to_value(v));
            }
        }
        if let Some(v) = self.defines.get(name) {
            return Ok(v.clone());
        }
        Err(PreprocessError::UndefinedName(name.to_string()))
    }

    fn assign(&mut self, name: &str, value: PpValue) -> PpResult<()> {
        if PragmaMap::is_known_field(name) {
            let field = value_to_field(name, &value)?;
            self.pragmas
                .set_field(name, field)
                .map_err(|e| PreprocessError::InvalidArgument(name.to_string(), e.to_string()))?;
            return Ok(());
        }
        self.env.set_var(name, value);
        Ok(())
    }

    fn dot_index(&mut self, obj: PpValue, field: &str, span: Span) -> PpResult<PpValue> {
        let _ = span;
        match obj {
            PpValue::Host(Host::PrimTypes) => primtype_by_name(self.types, field)
                .map(PpValue::Type)
                .ok_or_else(|| PreprocessError::InvalidArgument("primtypes".into(), field.to_string())),
            PpValue::Host(Host::Ast) => Ok(PpValue::Ctor(tag_by_name(field).ok_or_else(|| {
                PreprocessError::InvalidArgument("ast".into(), field.to_string())
            })?)),
            PpValue::Host(Host::Context) => match field {
                "scope" => Ok(PpValue::Int(self.scopes.current() as i64)),
                "rootscope" => Ok(PpValue::Int(self.scopes.root() as i64)),
                _ => Err(PreprocessError::InvalidArgument("context".into(), field.to_string())),
            },
            PpValue::Host(Host::Config) => {
                if PragmaMap::is_known_field(field) {
                    Ok(self
                        .pragmas
                        .get_field(field)
                        .map(field_to_value)
                        .unwrap_or(PpValue::Nil))
                } else {
                    Ok(self.defines.get(field).cloned().unwrap_or(PpValue::Nil))
                }
            }
            PpValue::Node(id) => Ok(node_attr(self.ast, id, field)),
            other => Err(PreprocessError::InvalidArgument(
                format!(".{}", field),
                format!("cannot index a {} value", other.type_name()),
            )),
        }
    }

    fn eval_call(&mut self, call_id: NodeId) -> PpResult<PpValue> {
        let node = self.ast.get(call_id).clone();
        let callee = node.children[0];
        let args_list = node.children[1];

        // Recognize the fixed set of engine natives by name before doing a
        // normal callee evaluation, since they're not ordinary bindings.
        if let Lit::Ident(name) = &self.ast.get(callee).lit {
            match name.as_str() {
                "injectnode" => return self.native_injectnode(args_list),
                "hygienize" => return self.native_hygienize(args_list),
                "afterinfer" => return self.native_afterinfer(args_list),
                "staticassert" => return self.native_staticassert(args_list, node.span),
                "aster" => return self.native_aster(args_list, node.span),
                _ => {}
            }
        }

        let callee_value = self.eval(callee)?;
        let args = self
            .ast
            .get(args_list)
            .children
            .clone()
            .into_iter()
            .map(|a| self.eval(a))
            .collect::<PpResult<Vec<_>>>()?;

        match callee_value {
            PpValue::Function(f) => self.call_function(&f, args),
            PpValue::Hygienic(h) => self.call_hygienic(&h, args),
            PpValue::Ctor(tag) => self.construct_node(tag, args, node.span),
            other => Err(PreprocessError::NotCallable(other.to_string())),
        }
    }

    /// Invoke a scheduled `afterinfer` callback, which always takes zero
    /// arguments.
    pub fn call_afterinfer(&mut self, f: &PpFunction) -> PpResult<PpValue> {
        self.call_function(f, vec![])
    }

    fn call_function(&mut self, f: &PpFunction, args: Vec<PpValue>) -> PpResult<PpValue> {
        let scope = self.scopes.push_scope();
        // Bind parameters as plain pp-local variables for the duration of
        // the call; they don't need to be program symbols.
        let saved_vars: Vec<(String, Option<PpValue>)> = f
            .params
            .iter()
            .map(|p| (p.clone(), self.env.get_var(p).cloned()))
            .collect();
        for (i, param) in f.params.iter().enumerate() {
            self.env.set_var(param, args.get(i).cloned().unwrap_or(PpValue::Nil));
        }
        let _ = scope; // body runs under a nested lexical scope for decls
        let result = self.exec_stmt(f.body)?.unwrap_or(PpValue::Nil);
        for (name, old) in saved_vars {
            match old {
                Some(v) => self.env.set_var(&name, v),
                None => {
                    self.env.set_var(&name, PpValue::Nil);
                }
            }
        }
        self.scopes.pop_scope();
        Ok(result)
    }

    /// `hygienize(f)`: restore to the captured checkpoint before and after
    /// each invocation, so repeat calls never leak symbols from a previous
    /// one.
    fn call_hygienic(&mut self, h: &HygienicFn, args: Vec<PpValue>) -> PpResult<PpValue> {
        self.scopes.pop_checkpoint(h.checkpoint);
        let result = self.call_function(&h.inner, args);
        self.scopes.pop_checkpoint(h.checkpoint);
        result
    }

    fn native_injectnode(&mut self, args_list: NodeId) -> PpResult<PpValue> {
        let args = self.ast.get(args_list).children.clone();
        if args.len() != 1 {
            return Err(PreprocessError::InvalidArgument(
                "injectnode".into(),
                format!("expected 1 argument, got {}", args.len()),
            ));
        }
        let value = self.eval(args[0])?;
        let span = self.ast.get(args_list).span;
        let node_id = self.value_to_node(value, span)?;
        self.injected.push(node_id);
        Ok(PpValue::Nil)
    }

    /// `hygienize(f)`.
    fn native_hygienize(&mut self, args_list: NodeId) -> PpResult<PpValue> {
        let args = self.ast.get(args_list).children.clone();
        if args.len() != 1 {
            return Err(PreprocessError::InvalidArgument(
                "hygienize".into(),
                format!("expected 1 argument, got {}", args.len()),
            ));
        }
        let v = self.eval(args[0])?;
        let checkpoint: Checkpoint = self.scopes.make_checkpoint(self.scopes.current());
        match v {
            PpValue::Function(f) => Ok(PpValue::Hygienic(Rc::new(HygienicFn { inner: f, checkpoint }))),
            other => Err(PreprocessError::InvalidArgument(
                "hygienize".into(),
                format!("expected a function, got {}", other.type_name()),
            )),
        }
    }

    /// `afterinfer(f)`: schedule `f` via a synthetic
    /// `PragmaCall{'afterinfer', f}` statement.
    fn native_afterinfer(&mut self, args_list: NodeId) -> PpResult<PpValue> {
        let args = self.ast.get(args_list).children.clone();
        if args.len() != 1 {
            return Err(PreprocessError::InvalidArgument(
                "afterinfer".into(),
                format!("expected 1 argument, got {}", args.len()),
            ));
        }
        let f = self.eval(args[0])?;
        let span = self.ast.get(args_list).span;
        let pragma_node = self.ast.push(Tag::PragmaCall, vec![], Lit::Ident("afterinfer".into()), span);
        self.injected.push(pragma_node);
        self.afterinfer_queue.push((pragma_node, f, vec![]));
        Ok(PpValue::Nil)
    }

    fn native_staticassert(&mut self, args_list: NodeId, call_span: Span) -> PpResult<PpValue> {
        let args = self.ast.get(args_list).children.clone();
        if args.is_empty() {
            return Err(PreprocessError::InvalidArgument(
                "staticassert".into(),
                "expected at least 1 argument".into(),
            ));
        }
        let cond = self.eval(args[0])?;
        if cond.truthy() {
            return Ok(PpValue::Nil);
        }
        let mut msg = String::new();
        for extra in &args[1..] {
            let v = self.eval(*extra)?;
            msg.push_str(&v.to_string());
        }
        let _ = call_span;
        Err(PreprocessError::StaticAssertFailed(msg))
    }

    /// Turn an arbitrary pp runtime value into an AST literal node, for use
    /// with `injectnode`. Values that are already nodes pass through
    /// unchanged.
    fn native_aster(&mut self, args_list: NodeId, call_span: Span) -> PpResult<PpValue> {
        let args = self.ast.get(args_list).children.clone();
        if args.len() != 1 {
            return Err(PreprocessError::InvalidArgument(
                "aster".into(),
                format!("expected 1 argument, got {}", args.len()),
            ));
        }
        let v = self.eval(args[0])?;
        let node = self.value_to_node(v, call_span)?;
        Ok(PpValue::Node(node))
    }

    /// Convert a runtime pp value into an AST node, materializing literal
    /// nodes for scalars and passing `Node` values through untouched.
    fn value_to_node(&mut self, value: PpValue, span: Span) -> PpResult<NodeId> {
        value_to_node(self.ast, value, span)
    }

    fn construct_node(&mut self, tag: Tag, args: Vec<PpValue>, span: Span) -> PpResult<PpValue> {
        let lit = match tag {
            Tag::Id | Tag::PreprocessName => match args.first() {
                Some(PpValue::Str(s)) => Lit::Ident(s.clone()),
                _ => {
                    return Err(PreprocessError::InvalidArgument(
                        "ast".into(),
                        "expected a string name".into(),
                    ))
                }
            },
            Tag::String => match args.first() {
                Some(PpValue::Str(s)) => Lit::Str(s.clone()),
                _ => {
                    return Err(PreprocessError::InvalidArgument(
                        "ast".into(),
                        "expected a string value".into(),
                    ))
                }
            },
            Tag::Number => match args.first() {
                Some(PpValue::Int(i)) => Lit::Num { text: i.to_string(), suffix: None },
                Some(PpValue::Float(x)) => Lit::Num { text: x.to_string(), suffix: None },
                _ => {
                    return Err(PreprocessError::InvalidArgument(
                        "ast".into(),
                        "expected a numeric value".into(),
                    ))
                }
            },
            Tag::Boolean => match args.first() {
                Some(PpValue::Bool(b)) => Lit::Bool(*b),
                _ => {
                    return Err(PreprocessError::InvalidArgument(
                        "ast".into(),
                        "expected a boolean value".into(),
                    ))
                }
            },
            _ => Lit::None,
        };
        let children = match tag {
            Tag::Id | Tag::String | Tag::Number | Tag::Boolean | Tag::PreprocessName => vec![],
            _ => {
                let mut children = Vec::with_capacity(args.len());
                for a in args {
                    children.push(self.value_to_node(a, span)?);
                }
                children
            }
        };
        Ok(PpValue::Node(self.ast.push(tag, children, lit, span)))
    }
}

/// Convert a runtime pp value into an AST node, materializing literal nodes
/// for scalars and passing `Node` values through untouched. Used both by
/// `aster`/`injectnode` and by the analyzer when splicing a
/// `PreprocessExpr`'s result into the tree it came from.
pub fn value_to_node(ast: &mut Ast, value: PpValue, span: Span) -> PpResult<NodeId> {
    Ok(match value {
        PpValue::Node(id) => id,
        PpValue::Nil => ast.push(Tag::Nil, vec![], Lit::None, span),
        PpValue::Bool(b) => ast.push(Tag::Boolean, vec![], Lit::Bool(b), span),
        PpValue::Int(i) => ast.push(
            Tag::Number,
            vec![],
            Lit::Num { text: i.to_string(), suffix: None },
            span,
        ),
        PpValue::Float(x) => ast.push(
            Tag::Number,
            vec![],
            Lit::Num { text: x.to_string(), suffix: None },
            span,
        ),
        PpValue::Str(s) => ast.push(Tag::String, vec![], Lit::Str(s), span),
        other => {
            return Err(PreprocessError::InvalidArgument(
                "aster".into(),
                format!("cannot convert a {} value into a node", other.type_name()),
            ))
        }
    })
}

fn op_str(lit: &Lit) -> &'static str {
    match lit {
        Lit::Op(s) => *s,
        _ => "",
    }
}

fn eval_unop(op: &str, v: PpValue) -> PpResult<PpValue> {
    match (op, v) {
        ("not", v) => Ok(PpValue::Bool(!v.truthy())),
        ("-", PpValue::Int(i)) => Ok(PpValue::Int(-i)),
        ("-", PpValue::Float(x)) => Ok(PpValue::Float(-x)),
        (op, v) => Err(PreprocessError::Uncaught(format!(
            "cannot apply unary `{}` to a {} value",
            op,
            v.type_name()
        ))),
    }
}

fn eval_binop(op: &str, lhs: PpValue, rhs: PpValue) -> PpResult<PpValue> {
    use PpValue::*;
    match (op, lhs, rhs) {
        ("==", a, b) => Ok(Bool(pp_eq(&a, &b))),
        ("~=", a, b) => Ok(Bool(!pp_eq(&a, &b))),
        ("+", Int(a), Int(b)) => Ok(Int(a + b)),
        ("-", Int(a), Int(b)) => Ok(Int(a - b)),
        ("*", Int(a), Int(b)) => Ok(Int(a * b)),
        ("/", Int(a), Int(b)) => Ok(Float(a as f64 / b as f64)),
        ("+", Float(a), Float(b)) => Ok(Float(a + b)),
        ("-", Float(a), Float(b)) => Ok(Float(a - b)),
        ("*", Float(a), Float(b)) => Ok(Float(a * b)),
        ("/", Float(a), Float(b)) => Ok(Float(a / b)),
        ("+", Int(a), Float(b)) | ("+", Float(b), Int(a)) => Ok(Float(a as f64 + b)),
        ("..", Str(a), Str(b)) => Ok(Str(a + &b)),
        ("..", a, Str(b)) => Ok(Str(format!("{}{}", a, b))),
        ("..", Str(a), b) => Ok(Str(format!("{}{}", a, b))),
        ("<", Int(a), Int(b)) => Ok(Bool(a < b)),
        ("<=", Int(a), Int(b)) => Ok(Bool(a <= b)),
        (">", Int(a), Int(b)) => Ok(Bool(a > b)),
        (">=", Int(a), Int(b)) => Ok(Bool(a >= b)),
        (op, a, b) => Err(PreprocessError::Uncaught(format!(
            "cannot apply `{}` to {} and {} values",
            op,
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn pp_eq(a: &PpValue, b: &PpValue) -> bool {
    use PpValue::*;
    match (a, b) {
        (Nil, Nil) => true,
        (Bool(a), Bool(b)) => a == b,
        (Int(a), Int(b)) => a == b,
        (Float(a), Float(b)) => a == b,
        (Str(a), Str(b)) => a == b,
        (Node(a), Node(b)) => a == b,
        (Type(a), Type(b)) => a == b,
        _ => false,
    }
}

fn symbol_to_value(sym: &Symbol) -> PpValue {
    match &sym.const_value {
        Some(ConstValue::Int(i)) => PpValue::Int(*i),
        Some(ConstValue::UInt(u)) => PpValue::Int(*u as i64),
        Some(ConstValue::Float(f)) => PpValue::Float(*f),
        Some(ConstValue::Bool(b)) => PpValue::Bool(*b),
        Some(ConstValue::Str(s)) => PpValue::Str(s.clone()),
        Some(ConstValue::Type(t)) => PpValue::Type(*t),
        Some(ConstValue::Nil) | None => PpValue::Node(sym.decl_node),
    }
}

fn field_to_value(field: &FieldValue) -> PpValue {
    match field {
        FieldValue::Bool(b) => PpValue::Bool(*b),
        FieldValue::Str(s) => PpValue::Str(s.clone()),
    }
}

fn value_to_field(name: &str, value: &PpValue) -> PpResult<FieldValue> {
    match value {
        PpValue::Bool(b) => Ok(FieldValue::Bool(*b)),
        PpValue::Str(s) => Ok(FieldValue::Str(s.clone())),
        other => Err(PreprocessError::InvalidArgument(
            name.to_string(),
            format!("cannot use a {} value as a pragma value", other.type_name()),
        )),
    }
}

fn node_attr(ast: &Ast, id: NodeId, field: &str) -> PpValue {
    let attrs = &ast.get(id).attrs;
    match field {
        "type" => attrs.ty.map(PpValue::Type).unwrap_or(PpValue::Nil),
        "value" => attrs
            .value
            .as_ref()
            .map(|v| match v {
                ConstValue::Int(i) => PpValue::Int(*i),
                ConstValue::UInt(u) => PpValue::Int(*u as i64),
                ConstValue::Float(f) => PpValue::Float(*f),
                ConstValue::Bool(b) => PpValue::Bool(*b),
                ConstValue::Str(s) => PpValue::Str(s.clone()),
                ConstValue::Type(t) => PpValue::Type(*t),
                ConstValue::Nil => PpValue::Nil,
            })
            .unwrap_or(PpValue::Nil),
        "lvalue" => PpValue::Bool(attrs.lvalue),
        "comptime" => PpValue::Bool(attrs.comptime),
        _ => PpValue::Nil,
    }
}

fn primtype_by_name(types: &mut TypeTable, name: &str) -> Option<crate::types::TypeId> {
    Some(match name {
        "int32" => types.t_int32,
        "int64" => types.t_int64,
        "uint32" => types.t_uint32,
        "uint64" => types.t_uint64,
        "float32" => types.t_float32,
        "float64" => types.t_float64,
        "boolean" => types.t_boolean,
        "string" => types.t_stringview,
        "cstring" => types.t_cstring,
        "void" => types.t_void,
        "usize" => types.t_usize,
        "isize" => types.t_isize,
        "niltype" => types.t_niltype,
        "nilptr" => types.t_nilptr,
        _ => return None,
    })
}

fn tag_by_name(name: &str) -> Option<Tag> {
    Some(match name {
        "Nil" => Tag::Nil,
        "Boolean" => Tag::Boolean,
        "Number" => Tag::Number,
        "String" => Tag::String,
        "Id" => Tag::Id,
        "Call" => Tag::Call,
        "BinOp" => Tag::BinOp,
        "UnOp" => Tag::UnOp,
        "Block" => Tag::Block,
        "VarDecl" => Tag::VarDecl,
        "Assign" => Tag::Assign,
        "Return" => Tag::Return,
        "If" => Tag::If,
        "List" => Tag::List,
        _ => return None,
    })
}
