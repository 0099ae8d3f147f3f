//! The C emitter core: an `Emitter` maintains three output
//! regions per translation unit — directives, declarations, definitions —
//! plus deduplicating sets of included headers and emitted builtins, so a
//! helper referenced by many call sites is only ever generated once.
//!
//! [`Generator`] is the trait this module and [`crate::emit::lua`] both
//! implement, so the analyzer/preprocessor pipeline in
//! [`crate::driver`] can drive either backend without caring which one it
//! got.

pub mod builtins;
pub mod lua;

use crate::ast::{Ast, Lit, NodeId, Tag};
use crate::pragma::PragmaMap;
use crate::types::{TypeId, TypeTable};
use std::collections::HashSet;

/// Which of the three output regions a piece of generated text belongs in.
/// Emission order is fixed: directives, then forward declarations, then
/// definitions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Region {
    Directive,
    Declaration,
    Definition,
}

/// An argument to a builtin generator: most builtins are keyed by the
/// operand type(s) they specialize for, but a few (`aligned(N)`, `shl` with
/// a constant shift count) also need a plain integer or name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinArg {
    Type(TypeId),
    Int(i64),
    Name(String),
}

impl BuiltinArg {
    fn key_part(&self, types: &TypeTable) -> String {
        match self {
            BuiltinArg::Type(t) => types.codename(*t),
            BuiltinArg::Int(n) => n.to_string(),
            BuiltinArg::Name(s) => s.clone(),
        }
    }
}

/// A generator that can turn an analyzed [`Ast`] into source text for some
/// target language. Implemented by [`CGenerator`] (this module) and
/// [`lua::LuaGenerator`].
pub trait Generator {
    fn generate(&mut self, ast: &Ast, root: NodeId, types: &TypeTable) -> String;
}

/// Shared emission state for one translation unit: three append-only output
/// regions, each with its own key-based dedup set, plus a memoization cache
/// so `ensure_builtin` only ever invokes a given generator once per key.
pub struct Emitter<'t> {
    pub types: &'t TypeTable,
    pub pragmas: &'t PragmaMap,

    directives: Vec<String>,
    directive_keys: HashSet<String>,
    declarations: Vec<String>,
    declaration_keys: HashSet<String>,
    definitions: Vec<String>,
    definition_keys: HashSet<String>,

    /// Maps a builtin's dedup key (name + rendered args) to the C symbol
    /// name already emitted for it, so repeat `ensure_builtin` calls for the
    /// same (name, args) pair are a cheap lookup instead of re-running the
    /// generator.
    builtin_cache: std::collections::HashMap<String, String>,
}

impl<'t> Emitter<'t> {
    pub fn new(types: &'t TypeTable, pragmas: &'t PragmaMap) -> Self {
        Self {
            types,
            pragmas,
            directives: Vec::new(),
            directive_keys: HashSet::new(),
            declarations: Vec::new(),
            declaration_keys: HashSet::new(),
            definitions: Vec::new(),
            definition_keys: HashSet::new(),
            builtin_cache: std::collections::HashMap::new(),
        }
    }

    /// Idempotent `#include` insertion into the directives region.
    pub fn ensure_include(&mut self, header: &str) {
        if self.directive_keys.insert(header.to_string()) {
            log::trace!("emitter: including <{}>", header);
            self.directives.push(format!("#include <{}>", header));
        }
    }

    /// Emit `text` into `region`, deduplicated by `key`: a second call with
    /// the same key is a no-op.
    fn emit_to(&mut self, region: Region, key: &str, text: String) {
        let (keys, bucket) = match region {
            Region::Directive => (&mut self.directive_keys, &mut self.directives),
            Region::Declaration => (&mut self.declaration_keys, &mut self.declarations),
            Region::Definition => (&mut self.definition_keys, &mut self.definitions),
        };
        if keys.insert(key.to_string()) {
            bucket.push(text);
        }
    }

    pub fn add_declaration(&mut self, key: &str, text: impl Into<String>) {
        self.emit_to(Region::Declaration, key, text.into());
    }

    pub fn add_definition(&mut self, key: &str, text: impl Into<String>) {
        self.emit_to(Region::Definition, key, text.into());
    }

    /// A `#define NAME body` macro, placed in whichever region the caller
    /// asks for (most belong in directives, but a few — e.g. platform
    /// attribute macros that wrap a declaration — read more naturally next
    /// to the declarations they modify).
    pub fn define_builtin_macro(&mut self, name: &str, body: &str, region: Region) {
        self.emit_to(region, name, format!("#define {} {}", name, body));
    }

    pub fn define_builtin_decl(&mut self, name: &str, body: &str) {
        self.add_declaration(name, body.to_string());
    }

    /// A builtin function: a forward declaration (so call sites can appear
    /// before the definition) plus the definition itself.
    pub fn define_function_builtin(
        &mut self,
        name: &str,
        qualifiers: &str,
        ret: &str,
        params: &[(String, String)],
    ) -> FunctionBuiltinBuilder<'_, 't> {
        let param_list = if params.is_empty() {
            "void".to_string()
        } else {
            params
                .iter()
                .map(|(ty, pname)| format!("{} {}", ty, pname))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let qualifiers = if qualifiers.is_empty() {
            String::new()
        } else {
            format!("{} ", qualifiers)
        };
        let signature = format!("{}{} {}({})", qualifiers, ret, name, param_list);
        self.add_declaration(name, format!("{};", signature));
        FunctionBuiltinBuilder { emitter: self, name: name.to_string(), signature }
    }

    /// Look up the generator registered for `name` in [`builtins`], run it
    /// (if this exact `(name, args)` pair hasn't been emitted yet), and
    /// return the C symbol it produced. Helpers referenced by later helpers
    /// are guaranteed to be emitted first, since a generator calls
    /// `ensure_builtin` itself for anything it depends on before emitting
    /// its own declaration/definition.
    pub fn ensure_builtin(&mut self, name: &str, args: &[BuiltinArg]) -> String {
        let key = builtin_key(name, args, self.types);
        if let Some(symbol) = self.builtin_cache.get(&key) {
            return symbol.clone();
        }
        log::debug!("emitter: generating builtin `{}` ({})", name, key);
        let symbol = builtins::generate(self, name, args);
        self.builtin_cache.insert(key, symbol.clone());
        symbol
    }

    /// Assemble the three regions in emission order. A `main` stub is the
    /// caller's responsibility (`crate::driver`), since whether one is
    /// needed depends on whether this unit is a library build.
    pub fn finish(&self) -> String {
        let mut out = String::new();
        for d in &self.directives {
            out.push_str(d);
            out.push('\n');
        }
        if !self.directives.is_empty() {
            out.push('\n');
        }
        for d in &self.declarations {
            out.push_str(d);
            out.push('\n');
        }
        if !self.declarations.is_empty() {
            out.push('\n');
        }
        for d in &self.definitions {
            out.push_str(d);
            out.push('\n');
        }
        out
    }
}

fn builtin_key(name: &str, args: &[BuiltinArg], types: &TypeTable) -> String {
    let parts: Vec<_> = args.iter().map(|a| a.key_part(types)).collect();
    if parts.is_empty() {
        name.to_string()
    } else {
        format!("{}[{}]", name, parts.join(","))
    }
}

/// Builder returned by [`Emitter::define_function_builtin`]: call `.body()`
/// to supply the function body and emit the definition.
#[must_use = "call `.body(...)` or the definition is never emitted"]
pub struct FunctionBuiltinBuilder<'e, 't> {
    emitter: &'e mut Emitter<'t>,
    name: String,
    signature: String,
}

impl<'e, 't> FunctionBuiltinBuilder<'e, 't> {
    pub fn body(self, body: &str) -> String {
        self.emitter
            .add_definition(&self.name, format!("{} {{\n{}\n}}", self.signature, body));
        self.name
    }
}

/// The primary C generator. Kept as a small statement/
/// expression walker over the analyzed tree: the bulk of the per-type
/// complexity lives in [`builtins`], which this walker calls into for
/// anything that isn't a single C operator.
pub struct CGenerator<'t> {
    emitter: Emitter<'t>,
    body: String,
}

impl<'t> CGenerator<'t> {
    pub fn new(types: &'t TypeTable, pragmas: &'t PragmaMap) -> Self {
        Self { emitter: Emitter::new(types, pragmas), body: String::new() }
    }

    fn gen_stmt(&mut self, ast: &Ast, id: NodeId) {
        let node = ast.get(id);
        match node.tag {
            Tag::Block => {
                for &c in &node.children.clone() {
                    self.gen_stmt(ast, c);
                }
            }
            Tag::ExprStat => {
                let expr = self.gen_expr(ast, node.children[0]);
                self.body.push_str(&format!("  {};\n", expr));
            }
            Tag::VarDecl => {
                let dst_ty = node.attrs.ty;
                let cty = dst_ty
                    .map(|t| c_type_name(self.emitter.types, t))
                    .unwrap_or_else(|| "int32_t".to_string());
                let name = ident_of(&node.lit).to_string();
                let init_node = node
                    .children
                    .iter()
                    .find(|&&c| ast.get(c).tag != Tag::TypedDecl)
                    .copied();
                match init_node {
                    Some(c) => {
                        let src_ty = ast.get(c).attrs.ty;
                        let expr = self.gen_expr(ast, c);
                        let expr = match (dst_ty, src_ty) {
                            (Some(dst), Some(src)) => self.narrow_if_needed(dst, src, expr),
                            _ => expr,
                        };
                        self.body.push_str(&format!("  {} {} = {};\n", cty, name, expr));
                    }
                    None => self.body.push_str(&format!("  {} {};\n", cty, name)),
                }
            }
            Tag::Assign => {
                let target = self.gen_expr(ast, node.children[0]);
                let value = self.gen_expr(ast, node.children[1]);
                self.body.push_str(&format!("  {} = {};\n", target, value));
            }
            Tag::Return => {
                match node.children.get(0) {
                    Some(&v) => {
                        let expr = self.gen_expr(ast, v);
                        self.body.push_str(&format!("  return {};\n", expr));
                    }
                    None => self.body.push_str("  return;\n"),
                }
            }
            Tag::While => {
                let cond = self.gen_expr(ast, node.children[0]);
                self.body.push_str(&format!("  while ({}) {{\n", cond));
                self.gen_stmt(ast, node.children[1]);
                self.body.push_str("  }\n");
            }
            Tag::If => {
                for (i, &clause) in node.children.clone().iter().enumerate() {
                    let cnode = ast.get(clause);
                    if cnode.children.len() == 2 {
                        let keyword = if i == 0 { "if" } else { "} else if" };
                        let cond = self.gen_expr(ast, cnode.children[0]);
                        self.body.push_str(&format!("  {} ({}) {{\n", keyword, cond));
                        self.gen_stmt(ast, cnode.children[1]);
                    } else {
                        self.body.push_str("  } else {\n");
                        self.gen_stmt(ast, cnode.children[0]);
                    }
                }
                self.body.push_str("  }\n");
            }
            // Preprocess directives never survive to code generation; a
            // fully analyzed tree has already replaced/stripped them.
            Tag::Preprocess | Tag::PragmaCall => {}
            _ => {}
        }
    }

    fn gen_expr(&mut self, ast: &Ast, id: NodeId) -> String {
        let node = ast.get(id);
        match node.tag {
            Tag::Nil => "0".to_string(),
            Tag::Boolean => match &node.lit {
                Lit::Bool(true) => "true".to_string(),
                _ => "false".to_string(),
            },
            Tag::Number => match &node.lit {
                Lit::Num { text, .. } => text.clone(),
                _ => "0".to_string(),
            },
            Tag::String => {
                self.emitter.ensure_include("string.h");
                match &node.lit {
                    Lit::Str(s) => format!("\"{}\"", escape_c_string(s)),
                    _ => "\"\"".to_string(),
                }
            }
            Tag::Id => ident_of(&node.lit).to_string(),
            Tag::Paren => format!("({})", self.gen_expr(ast, node.children[0])),
            Tag::UnOp => {
                let operand = self.gen_expr(ast, node.children[0]);
                match &node.lit {
                    Lit::Op("not") => format!("(!{})", operand),
                    Lit::Op(op) => format!("({}{})", op, operand),
                    _ => operand,
                }
            }
            Tag::BinOp => {
                let lhs_ty = ast.get(node.children[0]).attrs.ty.unwrap_or(self.emitter.types.t_unknown);
                let rhs_ty = ast.get(node.children[1]).attrs.ty.unwrap_or(self.emitter.types.t_unknown);
                let result_ty = node.attrs.ty.unwrap_or(lhs_ty);
                let lhs = self.gen_expr(ast, node.children[0]);
                let rhs = self.gen_expr(ast, node.children[1]);
                match &node.lit {
                    Lit::Op("and") => format!("({} && {})", lhs, rhs),
                    Lit::Op("or") => format!("({} || {})", lhs, rhs),
                    Lit::Op("/") => self.gen_div(result_ty, lhs, rhs),
                    Lit::Op("%") => self.gen_mod(result_ty, lhs, rhs),
                    Lit::Op("<") => self.gen_compare("<", lhs_ty, rhs_ty, lhs, rhs),
                    Lit::Op("<=") => self.gen_compare("<=", lhs_ty, rhs_ty, lhs, rhs),
                    Lit::Op(">") => self.gen_compare(">", lhs_ty, rhs_ty, lhs, rhs),
                    Lit::Op(">=") => self.gen_compare(">=", lhs_ty, rhs_ty, lhs, rhs),
                    Lit::Op("==") => self.gen_eq(lhs_ty, lhs, rhs, false),
                    Lit::Op("~=") => self.gen_eq(lhs_ty, lhs, rhs, true),
                    Lit::Op(op) => format!("({} {} {})", lhs, op, rhs),
                    _ => lhs,
                }
            }
            Tag::DotIndex => {
                let base = self.gen_expr(ast, node.children[0]);
                let field = ident_of(&ast.get(node.children[1]).lit);
                format!("{}.{}", base, field)
            }
            Tag::ArrayIndex => {
                let base_ty = ast.get(node.children[0]).attrs.ty.unwrap_or(self.emitter.types.t_unknown);
                let base = self.gen_expr(ast, node.children[0]);
                let idx = self.gen_expr(ast, node.children[1]);
                self.bounds_checked_index(base_ty, base, idx)
            }
            Tag::Call => self.gen_call(ast, node.children[0], node.children[1]),
            _ => "0".to_string(),
        }
    }

    fn gen_call(&mut self, ast: &Ast, callee: NodeId, args_list: NodeId) -> String {
        let args: Vec<NodeId> = ast.get(args_list).children.clone();
        if let Lit::Ident(name) = &ast.get(callee).lit {
            if name == "print" {
                let arg_types: Vec<BuiltinArg> = args
                    .iter()
                    .map(|&a| BuiltinArg::Type(ast.get(a).attrs.ty.unwrap_or(self.emitter.types.t_unknown)))
                    .collect();
                let symbol = self.emitter.ensure_builtin("print", &arg_types);
                let rendered: Vec<String> = args.iter().map(|&a| self.gen_expr(ast, a)).collect();
                return format!("{}({})", symbol, rendered.join(", "));
            }
        }
        let rendered: Vec<String> = args.iter().map(|&a| self.gen_expr(ast, a)).collect();
        let callee_text = self.gen_expr(ast, callee);
        format!("{}({})", callee_text, rendered.join(", "))
    }

    /// `/` on integers panics/floors through `builtins::idiv`; float division
    /// is a single C operator.
    fn gen_div(&mut self, ty: TypeId, lhs: String, rhs: String) -> String {
        use crate::types::Type;
        match self.emitter.types.get(ty) {
            Type::Float(_) => format!("({} / {})", lhs, rhs),
            _ => {
                let symbol = self.emitter.ensure_builtin("idiv", &[BuiltinArg::Type(ty)]);
                format!("{}({}, {})", symbol, lhs, rhs)
            }
        }
    }

    /// `%` routes to `builtins::imod` for integers, `builtins::fmod` for
    /// floats — neither is a single C operator once floor semantics and
    /// divide-by-zero panics are accounted for.
    fn gen_mod(&mut self, ty: TypeId, lhs: String, rhs: String) -> String {
        use crate::types::Type;
        match self.emitter.types.get(ty) {
            Type::Float(_) => {
                let symbol = self.emitter.ensure_builtin("fmod", &[BuiltinArg::Type(ty)]);
                format!("{}({}, {})", symbol, lhs, rhs)
            }
            _ => {
                let symbol = self.emitter.ensure_builtin("imod", &[BuiltinArg::Type(ty)]);
                format!("{}({}, {})", symbol, lhs, rhs)
            }
        }
    }

    /// `<`/`<=`/`>`/`>=`: a plain C operator unless the operands are signed
    /// vs. unsigned integers, in which case `builtins::lt` resolves the
    /// cross-sign comparison and the other three orderings are derived from
    /// it.
    fn gen_compare(
        &mut self,
        op: &str,
        lhs_ty: TypeId,
        rhs_ty: TypeId,
        lhs: String,
        rhs: String,
    ) -> String {
        let cross_sign = match (self.emitter.types.is_signed_int(lhs_ty), self.emitter.types.is_signed_int(rhs_ty)) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        };
        if !cross_sign {
            return format!("({} {} {})", lhs, op, rhs);
        }
        let symbol = self.emitter.ensure_builtin("lt", &[BuiltinArg::Type(lhs_ty), BuiltinArg::Type(rhs_ty)]);
        match op {
            "<" => format!("{}({}, {})", symbol, lhs, rhs),
            ">" => format!("{}({}, {})", symbol, rhs, lhs),
            "<=" => format!("(!{}({}, {}))", symbol, rhs, lhs),
            _ => format!("(!{}({}, {}))", symbol, lhs, rhs),
        }
    }

    /// `==`/`~=`: string views compare through `builtins::streq`, records
    /// through `builtins::eq`; every other type is a plain C `==`/`!=`.
    fn gen_eq(&mut self, ty: TypeId, lhs: String, rhs: String, negate: bool) -> String {
        use crate::types::Type;
        let symbol = match self.emitter.types.get(ty) {
            Type::Record(_) => Some(self.emitter.ensure_builtin("eq", &[BuiltinArg::Type(ty)])),
            Type::StringView => Some(self.emitter.ensure_builtin("streq", &[])),
            _ => None,
        };
        match symbol {
            Some(sym) => {
                let call = format!("{}({}, {})", sym, lhs, rhs);
                if negate { format!("(!{})", call) } else { call }
            }
            None => format!("({} {} {})", lhs, if negate { "!=" } else { "==" }, rhs),
        }
    }

    /// Wraps `expr` with `builtins::assert_narrow` when converting `src` to
    /// `dst` could lose information; a no-op for same-type or widening
    /// conversions.
    fn narrow_if_needed(&mut self, dst: TypeId, src: TypeId, expr: String) -> String {
        if dst == src
            || !self.emitter.types.is_arithmetic(dst)
            || !self.emitter.types.is_arithmetic(src)
            || self.emitter.types.is_assignable(src, dst)
        {
            return expr;
        }
        let symbol = self.emitter.ensure_builtin("assert_narrow", &[BuiltinArg::Type(dst), BuiltinArg::Type(src)]);
        let dst_c = c_type_name(self.emitter.types, dst);
        format!("({}({}), ({})({}))", symbol, expr, dst_c, expr)
    }

    /// Indexing into a fixed-size array or a string view is checked through
    /// `builtins::assert_bounds`; a pointer carries no length at runtime, so
    /// it's indexed with a plain `[]` instead.
    fn bounds_checked_index(&mut self, base_ty: TypeId, base: String, idx: String) -> String {
        use crate::types::Type;
        let len_expr = match self.emitter.types.get(base_ty) {
            Type::Array(_, n) => Some(n.to_string()),
            Type::StringView => Some(format!("{}.len", base)),
            _ => None,
        };
        match len_expr {
            Some(len) => {
                let symbol = self.emitter.ensure_builtin("assert_bounds", &[]);
                format!("({}((ptrdiff_t)({}), (size_t)({})), {}[{}])", symbol, idx, len, base, idx)
            }
            None => format!("{}[{}]", base, idx),
        }
    }
}

impl<'t> Generator for CGenerator<'t> {
    fn generate(&mut self, ast: &Ast, root: NodeId, _types: &TypeTable) -> String {
        self.emitter.ensure_include("stdint.h");
        self.emitter.ensure_include("stdio.h");
        self.body.clear();
        self.gen_stmt(ast, root);
        let decls_and_defs = self.emitter.finish();
        format!("{}int main(void) {{\n{}  return 0;\n}}\n", decls_and_defs, self.body)
    }
}

fn ident_of(lit: &Lit) -> &str {
    match lit {
        Lit::Ident(s) => s,
        _ => "",
    }
}

fn escape_c_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// The C type spelling for a [`TypeId`], used for declarations the walker
/// emits directly (locals, parameters); composites go through
/// `types.codename()` for a stable identifier instead.
pub fn c_type_name(types: &TypeTable, id: TypeId) -> String {
    use crate::types::{FloatWidth, IntWidth, Type};
    match types.get(id) {
        Type::Int { signed: true, width: IntWidth::W8 } => "int8_t".to_string(),
        Type::Int { signed: true, width: IntWidth::W16 } => "int16_t".to_string(),
        Type::Int { signed: true, width: IntWidth::W32 } => "int32_t".to_string(),
        Type::Int { signed: true, width: IntWidth::W64 } => "int64_t".to_string(),
        Type::Int { signed: false, width: IntWidth::W8 } => "uint8_t".to_string(),
        Type::Int { signed: false, width: IntWidth::W16 } => "uint16_t".to_string(),
        Type::Int { signed: false, width: IntWidth::W32 } => "uint32_t".to_string(),
        Type::Int { signed: false, width: IntWidth::W64 } => "uint64_t".to_string(),
        Type::Float(FloatWidth::W32) => "float".to_string(),
        Type::Float(_) => "double".to_string(),
        Type::Boolean => "bool".to_string(),
        Type::StringView => "glint_string_t".to_string(),
        Type::CString => "const char *".to_string(),
        Type::Void => "void".to_string(),
        Type::Usize => "size_t".to_string(),
        Type::Isize => "ptrdiff_t".to_string(),
        Type::Pointer(inner) => format!("{} *", c_type_name(types, *inner)),
        Type::Record(rid) => format!("struct {}", types.record_name(*rid)),
        _ => format!("/* {} */ void *", types.codename(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pragma::PragmaMap;
    use crate::types::TypeTable;

    #[test]
    fn ensure_include_dedups() {
        let types = TypeTable::new();
        let pragmas = PragmaMap::new();
        let mut e = Emitter::new(&types, &pragmas);
        e.ensure_include("stdio.h");
        e.ensure_include("stdio.h");
        let out = e.finish();
        assert_eq!(out.matches("#include <stdio.h>").count(), 1);
    }

    #[test]
    fn add_declaration_dedups_by_key() {
        let types = TypeTable::new();
        let pragmas = PragmaMap::new();
        let mut e = Emitter::new(&types, &pragmas);
        e.add_declaration("foo", "void foo(void);".to_string());
        e.add_declaration("foo", "void foo(void); /* different text, same key */".to_string());
        let out = e.finish();
        assert_eq!(out.matches("void foo(void)").count(), 1);
    }

    #[test]
    fn ensure_builtin_memoizes() {
        let types = TypeTable::new();
        let pragmas = PragmaMap::new();
        let mut e = Emitter::new(&types, &pragmas);
        let a = e.ensure_builtin("abort", &[]);
        let b = e.ensure_builtin("abort", &[]);
        assert_eq!(a, b);
        let out = e.finish();
        assert_eq!(out.matches("glint_abort").count(), 1);
    }
}
