//! The analyzer: single-pass top-down traversal with the marker/reconstruct
//! protocol that lets the preprocessor observe and rewrite a block's
//! statement list before it is typed.

use crate::ast::{Ast, Lit, NodeId, Tag};
use crate::error::{LookupError, PreprocessError, SourceError, SourceErrorWrapper, TypeError, WithSource};
use crate::pragma::PragmaMap;
use crate::preprocess::interp::{value_to_node, Interpreter};
use crate::preprocess::value::PpValue;
use crate::scope::{Scopes, Symbol};
use crate::span::Span;
use crate::types::{ConstValue, Type, TypeId, TypeTable};
use std::collections::HashMap;
use std::fmt::{self, Formatter};

/// The three error kinds the analyzer itself can raise, unified so a
/// single pass can batch all of them together.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisError {
    Lookup(LookupError),
    Type(TypeError),
    Preprocess(PreprocessError),
}

impl From<LookupError> for AnalysisError {
    fn from(e: LookupError) -> Self {
        AnalysisError::Lookup(e)
    }
}

impl From<TypeError> for AnalysisError {
    fn from(e: TypeError) -> Self {
        AnalysisError::Type(e)
    }
}

impl From<PreprocessError> for AnalysisError {
    fn from(e: PreprocessError) -> Self {
        AnalysisError::Preprocess(e)
    }
}

impl SourceError for AnalysisError {
    fn type_label(&self) -> &'static str {
        match self {
            AnalysisError::Lookup(e) => e.type_label(),
            AnalysisError::Type(e) => e.type_label(),
            AnalysisError::Preprocess(e) => e.type_label(),
        }
    }

    fn fmt_msg(&self, f: &mut Formatter<'_>, spanned_src: &str) -> fmt::Result {
        match self {
            AnalysisError::Lookup(e) => e.fmt_msg(f, spanned_src),
            AnalysisError::Type(e) => e.fmt_msg(f, spanned_src),
            AnalysisError::Preprocess(e) => e.fmt_msg(f, spanned_src),
        }
    }
}

/// A declared function's shape, enough to check call sites and, for
/// polymorphic (`auto`-parameter) functions, to monomorphize a fresh copy
/// per call site.
#[derive(Clone, Debug)]
struct FunctionInfo {
    params: Vec<(String, Option<TypeId>)>,
    body: NodeId,
    polymorphic: bool,
}

/// State threaded through one analysis run, besides the `&mut Ast`/`Scopes`/
/// `PragmaMap`/`TypeTable` that every function below takes explicitly. The
/// CLI `-D` host environment (`defines`) is deliberately NOT a field here:
/// it needs to be borrowed immutably for the lifetime of a constructed
/// [`Interpreter`] while `errors` is mutated alongside it, so it stays a
/// plain parameter throughout, mirroring `preprocess::interp`'s own style.
pub struct AnalysisCtx<'a> {
    pub errors: Vec<SourceErrorWrapper<AnalysisError>>,
    pub source: &'a str,
    functions: HashMap<String, FunctionInfo>,
}

impl<'a> AnalysisCtx<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            errors: Vec::new(),
            source,
            functions: HashMap::new(),
        }
    }

    fn push_error(&mut self, span: Span, err: AnalysisError) {
        self.errors
            .push(SourceErrorWrapper::new(err, span, self.source));
    }

    pub fn into_result(self) -> Result<(), WithSource<AnalysisError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(WithSource::new(self.errors, self.source.to_string()))
        }
    }
}

/// Analyze a full translation unit rooted at `root` (a `Block`), starting at
/// the already-current root scope.
pub fn analyze_unit(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    ctx: &mut AnalysisCtx,
    root: NodeId,
) {
    mark_needprocess(ast, root);
    analyze_block(ast, scopes, pragmas, types, defines, ctx, root, true);
}

/// First pass: mark every block that transitively contains a preprocess
/// directive as `needprocess`, including every `Block` ancestor between
/// the directive and the outermost block holding it.
fn mark_needprocess(ast: &mut Ast, id: NodeId) -> bool {
    let tag = ast.get(id).tag;
    let is_directive = matches!(
        tag,
        Tag::Preprocess | Tag::PreprocessExpr | Tag::PreprocessName
    );
    let children = ast.get(id).children.clone();
    let mut contains = is_directive;
    for child in children {
        if mark_needprocess(ast, child) {
            contains = true;
        }
    }
    if tag == Tag::Block && contains {
        ast.get_mut(id).attrs.set_flag("needprocess", true);
    }
    contains
}

/// Per-block analysis protocol. `is_root` means this block reuses the
/// already-current root scope rather than pushing/popping its own.
fn analyze_block(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    ctx: &mut AnalysisCtx,
    id: NodeId,
    is_root: bool,
) {
    if !is_root {
        scopes.push_scope();
    }

    if !ast.get(id).attrs.flag("needprocess") {
        let stmts = ast.get(id).children.clone();
        for stmt in stmts {
            analyze_stmt(ast, scopes, pragmas, types, defines, ctx, stmt);
        }
        if !is_root {
            scopes.pop_scope();
        }
        return;
    }

    // Marked: reconstruct the statement list by replaying it through the
    // preprocessor, then analyze each surviving/injected statement in
    // order: earlier siblings are fully analyzed before later ones are
    // generated.
    let original = ast.get(id).children.clone();
    let mut rebuilt = Vec::with_capacity(original.len());
    let (injected, afterinfer_queue) = {
        let mut interp = Interpreter::new(ast, scopes, pragmas, types, defines);
        for stmt in &original {
            if interp.ast.get(*stmt).tag == Tag::Preprocess {
                let body = interp.ast.get(*stmt).children[0];
                let span = interp.ast.get(*stmt).span;
                if let Err(e) = interp.exec_block(body) {
                    ctx.push_error(span, e.into());
                }
            } else {
                rebuilt.push(*stmt);
            }
        }
        (
            std::mem::take(&mut interp.injected),
            std::mem::take(&mut interp.afterinfer_queue),
        )
    };
    rebuilt.extend(injected);
    ast.get_mut(id).children = rebuilt;

    let stmts = ast.get(id).children.clone();
    for stmt in stmts {
        analyze_stmt(ast, scopes, pragmas, types, defines, ctx, stmt);
    }

    // `afterinfer` callbacks run once this block's statements are typed.
    for (pragma_node, callback, _) in afterinfer_queue {
        let func = match &callback {
            PpValue::Function(f) => Some(f.clone()),
            PpValue::Hygienic(h) => Some(h.inner.clone()),
            _ => None,
        };
        let more = {
            let mut interp = Interpreter::new(ast, scopes, pragmas, types, defines);
            if let Some(f) = func {
                let span = interp.ast.get(pragma_node).span;
                if let Err(e) = interp.call_afterinfer(&f) {
                    ctx.push_error(span, e.into());
                }
            }
            std::mem::take(&mut interp.injected)
        };
        for n in &more {
            analyze_stmt(ast, scopes, pragmas, types, defines, ctx, *n);
        }
        ast.get_mut(id).children.extend(more);
    }

    if !is_root {
        scopes.pop_scope();
    }
}

fn analyze_stmt(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    ctx: &mut AnalysisCtx,
    id: NodeId,
) {
    match ast.get(id).tag {
        Tag::Block => analyze_block(ast, scopes, pragmas, types, defines, ctx, id, false),
        Tag::ExprStat => {
            let inner = ast.get(id).children[0];
            let _ = analyze_expr(ast, scopes, pragmas, types, defines, ctx, inner);
        }
        Tag::VarDecl => analyze_var_decl(ast, scopes, pragmas, types, defines, ctx, id),
        Tag::Assign => analyze_assign(ast, scopes, pragmas, types, defines, ctx, id),
        Tag::Return => {
            if let Some(&e) = ast.get(id).children.get(0) {
                let _ = analyze_expr(ast, scopes, pragmas, types, defines, ctx, e);
            }
        }
        Tag::If => {
            let clauses = ast.get(id).children.clone();
            for clause in clauses {
                let clause_children = ast.get(clause).children.clone();
                match clause_children.len() {
                    2 => {
                        let cond_ty =
                            analyze_expr(ast, scopes, pragmas, types, defines, ctx, clause_children[0]);
                        if let Ok(ty) = cond_ty {
                            if ty != types.t_boolean {
                                let span = ast.get(clause_children[0]).span;
                                ctx.push_error(
                                    span,
                                    TypeError::IncompatibleAssignment {
                                        src: types.codename(ty),
                                        dst: "boolean".into(),
                                    }
                                    .into(),
                                );
                            }
                        }
                        analyze_stmt(ast, scopes, pragmas, types, defines, ctx, clause_children[1]);
                    }
                    1 => analyze_stmt(ast, scopes, pragmas, types, defines, ctx, clause_children[0]),
                    _ => {}
                }
            }
        }
        Tag::While => {
            let children = ast.get(id).children.clone();
            if children.len() == 2 {
                let _ = analyze_expr(ast, scopes, pragmas, types, defines, ctx, children[0]);
                analyze_stmt(ast, scopes, pragmas, types, defines, ctx, children[1]);
            }
        }
        Tag::FunctionDef => analyze_function_def(ast, types, ctx, id),
        Tag::Preprocess => {
            // Reached only for a directive that survived outside a marked
            // block's reconstruction (shouldn't normally happen, but run it
            // directly for side effects rather than silently dropping it).
            let body = ast.get(id).children[0];
            let span = ast.get(id).span;
            let mut interp = Interpreter::new(ast, scopes, pragmas, types, defines);
            if let Err(e) = interp.exec_block(body) {
                ctx.push_error(span, e.into());
            }
        }
        // The only `PragmaCall` nodes this engine ever produces are the
        // synthetic `afterinfer` markers `native_afterinfer` injects; their
        // callback has already run by the time `analyze_block` reaches this
        // statement, so there's nothing left to check here.
        Tag::PragmaCall => {}
        _ => {}
    }
}

fn analyze_var_decl(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    ctx: &mut AnalysisCtx,
    id: NodeId,
) {
    let node = ast.get(id).clone();
    let name = match &node.lit {
        Lit::Ident(s) => s.clone(),
        _ => return,
    };

    // A `VarDecl` carries 0, 1, or 2 children in no fixed order: the init
    // expression and/or the type annotation, the latter wrapped in a
    // `TypedDecl` marker so an init that happens to be a bare identifier
    // (e.g. `local a = b`) is never mistaken for a type name.
    let (init_node, type_node) = split_optional_children(ast, &node.children);

    let declared_ty = type_node.and_then(|t| resolve_type_annotation(ast, types, t));

    let init_ty = match init_node {
        Some(init) => analyze_expr(ast, scopes, pragmas, types, defines, ctx, init).ok(),
        None => None,
    };

    let final_ty = match (declared_ty, init_ty) {
        (Some(d), Some(s)) => {
            if s != d && !types.is_assignable(s, d) {
                ctx.push_error(
                    node.span,
                    TypeError::IncompatibleAssignment {
                        src: types.codename(s),
                        dst: types.codename(d),
                    }
                    .into(),
                );
            }
            d
        }
        (Some(d), None) => d,
        (None, Some(s)) => s,
        (None, None) => types.t_unknown,
    };

    let const_value = init_node.and_then(|init| ast.get(init).attrs.value.clone());

    let sym = Symbol {
        name: name.clone(),
        ty: Some(final_ty),
        const_value,
        lvalue: true,
        decl_node: id,
    };
    if let Err(e) = scopes.declare(&name, sym) {
        ctx.push_error(node.span, LookupError::Duplicate(e.to_string()).into());
    }
    ast.get_mut(id).attrs.ty = Some(final_ty);
}

fn analyze_assign(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    ctx: &mut AnalysisCtx,
    id: NodeId,
) {
    let node = ast.get(id).clone();
    let target = node.children[0];
    let value = node.children[1];
    let value_ty = analyze_expr(ast, scopes, pragmas, types, defines, ctx, value).ok();

    if let Lit::Ident(name) = ast.get(target).lit.clone() {
        match scopes.lookup(&name).cloned() {
            Some(sym) => {
                if let (Some(dst), Some(src)) = (sym.ty, value_ty) {
                    if dst != src && !types.is_assignable(src, dst) {
                        ctx.push_error(
                            node.span,
                            TypeError::IncompatibleAssignment {
                                src: types.codename(src),
                                dst: types.codename(dst),
                            }
                            .into(),
                        );
                    }
                }
            }
            None => ctx.push_error(ast.get(target).span, LookupError::Undefined.into()),
        }
    }
}

fn analyze_function_def(ast: &mut Ast, types: &TypeTable, ctx: &mut AnalysisCtx, id: NodeId) {
    let node = ast.get(id).clone();
    let name = match &node.lit {
        Lit::Ident(s) => s.clone(),
        _ => return,
    };
    let params_list = node.children[0];
    let body = node.children[1];

    let mut params = Vec::new();
    let mut polymorphic = false;
    for &p in &ast.get(params_list).children.clone() {
        let pnode = ast.get(p).clone();
        let pname = match &pnode.lit {
            Lit::Ident(s) => s.clone(),
            _ => continue,
        };
        let type_annotation = pnode.children.get(0).copied();
        let is_auto = type_annotation
            .map(|t| matches!(&ast.get(t).lit, Lit::Ident(s) if s == "auto"))
            .unwrap_or(false);
        if is_auto {
            polymorphic = true;
            params.push((pname, None));
        } else {
            let ty = type_annotation.and_then(|t| resolve_type_annotation(ast, types, t));
            params.push((pname, ty));
        }
    }

    ctx.functions.insert(
        name,
        FunctionInfo {
            params,
            body,
            polymorphic,
        },
    );
    // Non-polymorphic bodies are analyzed lazily, at each call site via
    // `analyze_call`, rather than eagerly here; a function that's never
    // called is simply never type-checked. Functions are recorded at
    // `FunctionDef`, not descended into.
}

/// Split a `VarDecl`'s children into `(init_expr, type_name_id)`. The type
/// annotation, if present, is wrapped in a `TypedDecl{ty}` marker so it's
/// never confused with an init expression that happens to be a bare
/// identifier; everything else is the init expression.
fn split_optional_children(ast: &Ast, children: &[NodeId]) -> (Option<NodeId>, Option<NodeId>) {
    let mut init = None;
    let mut ty = None;
    for &c in children {
        if ast.get(c).tag == Tag::TypedDecl {
            ty = ast.get(c).children.get(0).copied();
        } else {
            init = Some(c);
        }
    }
    (init, ty)
}

fn resolve_type_annotation(ast: &Ast, types: &TypeTable, id: NodeId) -> Option<TypeId> {
    let name = match &ast.get(id).lit {
        Lit::Ident(s) => s.clone(),
        _ => return None,
    };
    primtype_id(types, &name)
}

fn primtype_id(types: &TypeTable, name: &str) -> Option<TypeId> {
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
        _ => return None,
    })
}

fn analyze_expr(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    ctx: &mut AnalysisCtx,
    id: NodeId,
) -> Result<TypeId, AnalysisError> {
    let tag = ast.get(id).tag;
    let span = ast.get(id).span;
    let ty = match tag {
        Tag::Nil => types.t_niltype,
        Tag::Boolean => {
            if let Lit::Bool(b) = ast.get(id).lit {
                ast.get_mut(id).attrs.value = Some(ConstValue::Bool(b));
            }
            types.t_boolean
        }
        Tag::Number => {
            let (text, suffix) = match &ast.get(id).lit {
                Lit::Num { text, suffix } => (text.clone(), suffix.clone()),
                _ => unreachable!(),
            };
            if let Some(suffix) = suffix {
                let err = AnalysisError::Type(TypeError::UndefinedLiteralSuffix(suffix));
                ctx.push_error(span, err.clone());
                return Err(err);
            }
            if let Ok(i) = text.parse::<i128>() {
                ast.get_mut(id).attrs.value = Some(ConstValue::Int(i as i64));
                types.infer_literal_width(i)
            } else {
                let f: f64 = text.parse().unwrap_or(0.0);
                ast.get_mut(id).attrs.value = Some(ConstValue::Float(f));
                types.t_float64
            }
        }
        Tag::String => {
            if let Lit::Str(s) = ast.get(id).lit.clone() {
                ast.get_mut(id).attrs.value = Some(ConstValue::Str(s));
            }
            types.t_stringview
        }
        Tag::Id => {
            let name = match &ast.get(id).lit {
                Lit::Ident(s) => s.clone(),
                _ => String::new(),
            };
            match scopes.lookup(&name).cloned() {
                Some(sym) => {
                    ast.get_mut(id).attrs.lvalue = sym.lvalue;
                    if let Some(v) = &sym.const_value {
                        ast.get_mut(id).attrs.value = Some(v.clone());
                    }
                    sym.ty.unwrap_or(types.t_unknown)
                }
                None => {
                    let err = AnalysisError::Lookup(LookupError::Undefined);
                    ctx.push_error(span, err.clone());
                    return Err(err);
                }
            }
        }
        Tag::Paren => {
            let inner = ast.get(id).children[0];
            analyze_expr(ast, scopes, pragmas, types, defines, ctx, inner)?
        }
        Tag::List => {
            let children = ast.get(id).children.clone();
            for c in children {
                let _ = analyze_expr(ast, scopes, pragmas, types, defines, ctx, c);
            }
            types.t_void
        }
        Tag::UnOp => {
            let children = ast.get(id).children.clone();
            let operand_ty = analyze_expr(ast, scopes, pragmas, types, defines, ctx, children[0])?;
            let op = op_text(ast, id);
            if op == "not" {
                types.t_boolean
            } else {
                operand_ty
            }
        }
        Tag::BinOp => {
            let children = ast.get(id).children.clone();
            let lhs_ty = analyze_expr(ast, scopes, pragmas, types, defines, ctx, children[0])?;
            let rhs_ty = analyze_expr(ast, scopes, pragmas, types, defines, ctx, children[1])?;
            let op = op_text(ast, id);
            match op.as_str() {
                "==" | "~=" | "<" | "<=" | ">" | ">=" => types.t_boolean,
                "and" | "or" => types.t_boolean,
                _ => match types.promote(lhs_ty, rhs_ty) {
                    Some(t) => t,
                    None => {
                        let err = AnalysisError::Type(TypeError::InvalidOperator {
                            op,
                            lhs: types.codename(lhs_ty),
                            rhs: types.codename(rhs_ty),
                        });
                        ctx.push_error(span, err.clone());
                        return Err(err);
                    }
                },
            }
        }
        Tag::DotIndex => {
            let children = ast.get(id).children.clone();
            let obj_ty = analyze_expr(ast, scopes, pragmas, types, defines, ctx, children[0])?;
            let field = match &ast.get(children[1]).lit {
                Lit::Ident(s) => s.clone(),
                _ => String::new(),
            };
            record_field_type(types, obj_ty, &field).unwrap_or(types.t_unknown)
        }
        Tag::ArrayIndex => {
            let children = ast.get(id).children.clone();
            let base_ty = analyze_expr(ast, scopes, pragmas, types, defines, ctx, children[0])?;
            let _ = analyze_expr(ast, scopes, pragmas, types, defines, ctx, children[1])?;
            match types.get(base_ty) {
                Type::Array(elem, _) => *elem,
                Type::Pointer(elem) => *elem,
                _ => types.t_unknown,
            }
        }
        Tag::Call => return analyze_call(ast, scopes, pragmas, types, defines, ctx, id),
        Tag::PreprocessExpr | Tag::PreprocessName => {
            return analyze_pp_fragment(
                ast,
                scopes,
                pragmas,
                types,
                defines,
                ctx,
                id,
                tag == Tag::PreprocessName,
            )
        }
        _ => types.t_unknown,
    };
    ast.get_mut(id).attrs.ty = Some(ty);
    Ok(ty)
}

fn op_text(ast: &Ast, id: NodeId) -> String {
    match &ast.get(id).lit {
        Lit::Op(s) => s.to_string(),
        _ => String::new(),
    }
}

fn record_field_type(types: &TypeTable, obj_ty: TypeId, field: &str) -> Option<TypeId> {
    if let Type::Record(rid) = types.get(obj_ty) {
        types
            .record_fields(*rid)
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.ty)
    } else {
        None
    }
}

/// Evaluate a `PreprocessExpr`/`PreprocessName` fragment, splice its result
/// into the tree in place of the directive node, then analyze whatever
/// took its place.
fn analyze_pp_fragment(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    ctx: &mut AnalysisCtx,
    id: NodeId,
    expect_name: bool,
) -> Result<TypeId, AnalysisError> {
    let body = ast.get(id).children[0];
    let span = ast.get(id).span;
    let value = {
        let mut interp = Interpreter::new(ast, scopes, pragmas, types, defines);
        interp.eval_expr_fragment(body).map_err(AnalysisError::from)
    };
    let value = match value {
        Ok(v) => v,
        Err(e) => {
            ctx.push_error(span, e.clone());
            return Err(e);
        }
    };

    if expect_name {
        let name = match value {
            PpValue::Str(s) => s,
            other => other.to_string(),
        };
        ast.replace(id, Tag::Id, vec![], Lit::Ident(name));
    } else {
        let new_node = value_to_node(ast, value, span).map_err(AnalysisError::from)?;
        let replacement = ast.get(new_node).clone();
        ast.replace(id, replacement.tag, replacement.children, replacement.lit);
    }
    analyze_expr(ast, scopes, pragmas, types, defines, ctx, id)
}

fn analyze_call(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    ctx: &mut AnalysisCtx,
    id: NodeId,
) -> Result<TypeId, AnalysisError> {
    let node = ast.get(id).clone();
    let callee = node.children[0];
    let args_list = node.children[1];
    let args = ast.get(args_list).children.clone();

    if let Lit::Ident(name) = ast.get(callee).lit.clone() {
        if name == "print" {
            for a in &args {
                let _ = analyze_expr(ast, scopes, pragmas, types, defines, ctx, *a);
            }
            ast.get_mut(id).attrs.builtintype = Some("print".to_string());
            let ty = types.t_void;
            ast.get_mut(id).attrs.ty = Some(ty);
            return Ok(ty);
        }

        if let Some(info) = ctx.functions.get(&name).cloned() {
            if info.polymorphic {
                return instantiate_polymorphic(
                    ast, scopes, pragmas, types, defines, ctx, id, &info, &args,
                );
            }
            for (i, (_, param_ty)) in info.params.iter().enumerate() {
                if let Some(&arg) = args.get(i) {
                    let arg_ty = analyze_expr(ast, scopes, pragmas, types, defines, ctx, arg)?;
                    if let Some(p) = param_ty {
                        if *p != arg_ty && !types.is_assignable(arg_ty, *p) {
                            let arg_span = ast.get(arg).span;
                            ctx.push_error(
                                arg_span,
                                TypeError::IncompatibleAssignment {
                                    src: types.codename(arg_ty),
                                    dst: types.codename(*p),
                                }
                                .into(),
                            );
                        }
                    }
                }
            }
            let ty = types.t_void;
            ast.get_mut(id).attrs.ty = Some(ty);
            return Ok(ty);
        }
    }

    for a in &args {
        let _ = analyze_expr(ast, scopes, pragmas, types, defines, ctx, *a);
    }
    let ty = types.t_unknown;
    ast.get_mut(id).attrs.ty = Some(ty);
    Ok(ty)
}

/// Monomorphize a polymorphic (`auto`-parameter) function for one call
/// site: clone its body fresh, bind each `auto` parameter to the concrete
/// type its argument evaluated to, then analyze the clone in a new scope.
/// Any failure during that nested analysis is reported as a single
/// `TypeError::PolymorphicInstantiation` at the call site, not as the raw
/// underlying error.
fn instantiate_polymorphic(
    ast: &mut Ast,
    scopes: &mut Scopes,
    pragmas: &mut PragmaMap,
    types: &mut TypeTable,
    defines: &HashMap<String, PpValue>,
    ctx: &mut AnalysisCtx,
    call_id: NodeId,
    info: &FunctionInfo,
    args: &[NodeId],
) -> Result<TypeId, AnalysisError> {
    let mut arg_types = Vec::with_capacity(args.len());
    for &a in args {
        arg_types.push(
            analyze_expr(ast, scopes, pragmas, types, defines, ctx, a).unwrap_or(types.t_unknown),
        );
    }

    let errors_before = ctx.errors.len();
    let body_clone = ast.clone_subtree(info.body);
    scopes.push_scope();
    for (i, (pname, declared)) in info.params.iter().enumerate() {
        let ty = declared
            .or_else(|| arg_types.get(i).copied())
            .unwrap_or(types.t_unknown);
        let _ = scopes.declare(
            pname,
            Symbol {
                name: pname.clone(),
                ty: Some(ty),
                const_value: None,
                lvalue: true,
                decl_node: body_clone,
            },
        );
    }
    mark_needprocess(ast, body_clone);
    analyze_block(ast, scopes, pragmas, types, defines, ctx, body_clone, true);
    scopes.pop_scope();

    if ctx.errors.len() > errors_before {
        let failure = ctx.errors.split_off(errors_before);
        let reason = failure
            .into_iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        let call_span = ast.get(call_id).span;
        let err = AnalysisError::Type(TypeError::PolymorphicInstantiation(reason));
        ctx.push_error(call_span, err.clone());
        return Err(err);
    }

    let ty = types.t_void;
    ast.get_mut(call_id).attrs.ty = Some(ty);
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_id(ast: &mut Ast, name: &str) -> NodeId {
        ast.push(Tag::Id, vec![], Lit::Ident(name.to_string()), Span::synthetic())
    }

    #[test]
    fn literal_suffix_is_rejected() {
        let mut ast = Ast::new();
        let mut scopes = Scopes::new();
        let mut pragmas = PragmaMap::new();
        let mut types = TypeTable::new();
        let defines = HashMap::new();
        let mut ctx = AnalysisCtx::new("1_x");

        let num = ast.push(
            Tag::Number,
            vec![],
            Lit::Num { text: "1".into(), suffix: Some("x".into()) },
            Span::synthetic(),
        );
        let result =
            analyze_expr(&mut ast, &mut scopes, &mut pragmas, &mut types, &defines, &mut ctx, num);
        assert!(result.is_err());
        assert_eq!(ctx.errors.len(), 1);
    }

    #[test]
    fn undeclared_identifier_is_a_lookup_error() {
        let mut ast = Ast::new();
        let mut scopes = Scopes::new();
        let mut pragmas = PragmaMap::new();
        let mut types = TypeTable::new();
        let defines = HashMap::new();
        let mut ctx = AnalysisCtx::new("x");

        let id = push_id(&mut ast, "x");
        let result =
            analyze_expr(&mut ast, &mut scopes, &mut pragmas, &mut types, &defines, &mut ctx, id);
        assert!(matches!(result, Err(AnalysisError::Lookup(LookupError::Undefined))));
    }

    #[test]
    fn var_decl_infers_type_from_initializer() {
        let mut ast = Ast::new();
        let mut scopes = Scopes::new();
        let mut pragmas = PragmaMap::new();
        let mut types = TypeTable::new();
        let defines = HashMap::new();
        let mut ctx = AnalysisCtx::new("local a = 1");

        let lit = ast.push(
            Tag::Number,
            vec![],
            Lit::Num { text: "1".into(), suffix: None },
            Span::synthetic(),
        );
        let decl = ast.push(Tag::VarDecl, vec![lit], Lit::Ident("a".into()), Span::synthetic());
        analyze_var_decl(&mut ast, &mut scopes, &mut pragmas, &mut types, &defines, &mut ctx, decl);
        assert!(ctx.errors.is_empty());
        assert_eq!(scopes.lookup("a").unwrap().ty, Some(types.t_int32));
    }

    #[test]
    fn primtype_id_resolves_known_names() {
        let types = TypeTable::new();
        assert_eq!(primtype_id(&types, "int32"), Some(types.t_int32));
        assert_eq!(primtype_id(&types, "bogus"), None);
    }
}
