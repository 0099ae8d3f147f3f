//! The C builtin library: per-type generators for every
//! operation whose correct semantics can't be expressed by a single C
//! operator. Each is reached through [`Emitter::ensure_builtin`], keyed by
//! name plus operand types, and emits whatever declarations/definitions it
//! needs — including, recursively, any other builtin it depends on.

use super::{c_type_name, BuiltinArg, Emitter, Region};
use crate::error::runtime_messages as msg;
use crate::types::TypeId;

/// Dispatch table entry point: `Emitter::ensure_builtin` has already
/// checked the memoization cache, so this always actually generates.
pub(super) fn generate(e: &mut Emitter, name: &str, args: &[BuiltinArg]) -> String {
    match name {
        "likely" | "unlikely" => branch_hint(e, name),
        "abort" => abort(e),
        "panic_cstring" => panic_cstring(e),
        "panic_string" => panic_string(e),
        "warn" => warn(e),
        "assert_narrow" => assert_narrow(e, type_arg(args, 0), type_arg(args, 1)),
        "assert_bounds" => assert_bounds(e),
        "assert_deref" => assert_deref(e),
        "string2cstring" => string2cstring(e, false),
        "string2cstring_checked" => string2cstring(e, true),
        "cstring2string" => cstring2string(e),
        "lt" => cross_sign_lt(e, type_arg(args, 0), type_arg(args, 1)),
        "eq" => composite_eq(e, type_arg(args, 0)),
        "streq" => string_eq(e),
        "idiv" => idiv(e, type_arg(args, 0)),
        "imod" => imod(e, type_arg(args, 0)),
        "fmod" => fmod(e, type_arg(args, 0)),
        "shl" => shift(e, type_arg(args, 0), ShiftKind::Left),
        "shr" => shift(e, type_arg(args, 0), ShiftKind::LogicalRight),
        "asr" => shift(e, type_arg(args, 0), ShiftKind::ArithmeticRight),
        "print" => print(e, args),
        "assert" => assert_helper(e, args.len()),
        other => panic!("no builtin generator registered for `{}`", other),
    }
}

fn type_arg(args: &[BuiltinArg], i: usize) -> TypeId {
    match args.get(i) {
        Some(BuiltinArg::Type(t)) => *t,
        _ => panic!("builtin called with wrong argument shape at index {}", i),
    }
}

/// `likely(x)`/`unlikely(x)` branch-prediction macros: `__builtin_expect` on
/// compilers that support it, identity otherwise. Guarded by a feature test
/// rather than assumed, since this helper may run under MSVC.
fn branch_hint(e: &mut Emitter, name: &str) -> String {
    e.ensure_include("stdint.h");
    let hint = if name == "likely" { 1 } else { 0 };
    let body = format!(
        "#if defined(__GNUC__) || defined(__clang__)\n\
         #define {name}(x) __builtin_expect(!!(x), {hint})\n\
         #else\n\
         #define {name}(x) (x)\n\
         #endif",
        name = name,
        hint = hint,
    );
    e.define_builtin_macro(name, &body, Region::Directive);
    name.to_string()
}

/// `abort()`: prints, flushes stderr, then either calls `abort()` or
/// `exit(-1)` depending on the `noabort` pragma, and never returns.
fn abort(e: &mut Emitter) -> String {
    e.ensure_include("stdio.h");
    e.ensure_include("stdlib.h");
    let symbol = "glint_abort".to_string();
    let terminate = if e.pragmas.noabort() { "exit(-1)" } else { "abort()" };
    e.define_function_builtin(&symbol, "static", "void", &[])
        .body(&format!(
            "  fflush(stderr);\n  {};\n",
            terminate
        ));
    // Marked non-returning via the platform attribute macro so callers that
    // fall through a `panic_*` call don't trip a missing-return warning.
    e.define_builtin_macro("noreturn", noreturn_body(), Region::Directive);
    symbol
}

fn noreturn_body() -> &'static str {
    "\n#if defined(__GNUC__) || defined(__clang__)\n\
     #define noreturn __attribute__((noreturn))\n\
     #elif defined(_MSC_VER)\n\
     #define noreturn __declspec(noreturn)\n\
     #else\n\
     #define noreturn\n\
     #endif"
}

/// `panic_cstring(s)`: print `s` + newline to stderr, flush, abort.
fn panic_cstring(e: &mut Emitter) -> String {
    e.ensure_include("stdio.h");
    let abort_fn = e.ensure_builtin("abort", &[]);
    let symbol = "glint_panic_cstring".to_string();
    e.define_function_builtin(&symbol, "static noreturn", "void", &[("const char *".into(), "msg".into())])
        .body(&format!(
            "  fprintf(stderr, \"%s\\n\", msg);\n  fflush(stderr);\n  {}();\n",
            abort_fn
        ));
    symbol
}

/// `panic_string(s)`: same contract, but `s` is a length-prefixed
/// `glint_string_t` rather than a NUL-terminated `char *`.
fn panic_string(e: &mut Emitter) -> String {
    e.ensure_include("stdio.h");
    let abort_fn = e.ensure_builtin("abort", &[]);
    let symbol = "glint_panic_string".to_string();
    e.define_function_builtin(
        &symbol,
        "static noreturn",
        "void",
        &[("glint_string_t".into(), "msg".into())],
    )
    .body(&format!(
        "  fwrite(msg.data, 1, msg.len, stderr);\n  fputc('\\n', stderr);\n  fflush(stderr);\n  {}();\n",
        abort_fn
    ));
    symbol
}

/// `warn(s)`: print `"warning: " + s + "\n"` to stderr and flush; returns.
fn warn(e: &mut Emitter) -> String {
    e.ensure_include("stdio.h");
    let symbol = "glint_warn".to_string();
    e.define_function_builtin(&symbol, "static", "void", &[("const char *".into(), "msg".into())])
        .body("  fprintf(stderr, \"warning: %s\\n\", msg);\n  fflush(stderr);\n");
    symbol
}

/// `assert_narrow(dst, src)`: panics with [`msg::NARROW_CAST`] (formatted
/// with the two type names) when converting `src` to `dst` would lose
/// information. Float→int narrowing is checked by a round-trip comparison
/// rather than a range test.
fn assert_narrow(e: &mut Emitter, dst: TypeId, src: TypeId) -> String {
    let dst_name = e.types.codename(dst);
    let src_name = e.types.codename(src);
    let dst_c = c_type_name(e.types, dst);
    let src_c = c_type_name(e.types, src);
    let panic_fn = e.ensure_builtin("panic_cstring", &[]);
    let symbol = format!("glint_assert_narrow_{}_from_{}", dst_name, src_name);

    let check = if let (Some((dmin, dmax, _)), Some((_, _, _))) =
        (e.types.int_range(dst), e.types.int_range(src))
    {
        format!("(v < ({dst})({dmin}) || v > ({dst})({dmax}))", dst = dst_c, dmin = dmin, dmax = dmax)
    } else {
        // Float <-> int or float <-> float: check the conversion round-trips.
        format!("(({src})({dst})v != v)", src = src_c, dst = dst_c)
    };

    e.define_function_builtin(
        &symbol,
        "static inline",
        "void",
        &[(src_c, "v".into())],
    )
    .body(&format!(
        "  if ({check}) {{\n    char buf[256];\n    snprintf(buf, sizeof buf, \"{fmt}\", \"{src_name}\", \"{dst_name}\");\n    {panic}(buf);\n  }}\n",
        check = check,
        fmt = msg::NARROW_CAST,
        src_name = src_name,
        dst_name = dst_name,
        panic = panic_fn,
    ));
    symbol
}

/// `assert_bounds(i, len)`: panics [`msg::BOUNDS`] on out-of-range index.
fn assert_bounds(e: &mut Emitter) -> String {
    let panic_fn = e.ensure_builtin("panic_cstring", &[]);
    let symbol = "glint_assert_bounds".to_string();
    e.define_function_builtin(
        &symbol,
        "static inline",
        "void",
        &[("ptrdiff_t".into(), "i".into()), ("size_t".into(), "len".into())],
    )
    .body(&format!(
        "  if (i < 0 || (size_t)i >= len) {{\n    {}(\"{}\");\n  }}\n",
        panic_fn, msg::BOUNDS
    ));
    symbol
}

/// `assert_deref(p)`: panics [`msg::NULL_DEREF`] on a null pointer.
fn assert_deref(e: &mut Emitter) -> String {
    let panic_fn = e.ensure_builtin("panic_cstring", &[]);
    let symbol = "glint_assert_deref".to_string();
    e.define_function_builtin(&symbol, "static inline", "void", &[("const void *".into(), "p".into())])
        .body(&format!("  if (p == NULL) {{\n    {}(\"{}\");\n  }}\n", panic_fn, msg::NULL_DEREF));
    symbol
}

/// `string2cstring`/`string2cstring_checked`: zero-copy when the string's
/// backing buffer is either empty or already NUL-terminated; the checked
/// variant panics instead of silently returning a non-terminated pointer.
fn string2cstring(e: &mut Emitter, checked: bool) -> String {
    e.ensure_include("string.h");
    let symbol = if checked { "glint_string2cstring_checked" } else { "glint_string2cstring" }.to_string();
    let panic_fn = if checked { Some(e.ensure_builtin("panic_cstring", &[])) } else { None };
    let fallback = match &panic_fn {
        Some(p) => format!("{}(\"string is not null-terminated\");\n    return NULL;", p),
        None => "return NULL;".to_string(),
    };
    e.define_function_builtin(
        &symbol,
        "static inline",
        "const char *",
        &[("glint_string_t".into(), "s".into())],
    )
    .body(&format!(
        "  if (s.len == 0) {{\n    return \"\";\n  }}\n  if (s.data[s.len - 1] == '\\0') {{\n    return s.data;\n  }}\n  {}\n",
        fallback
    ));
    symbol
}

/// `cstring2string`: length via `strlen`, empty `glint_string_t` for `NULL`.
fn cstring2string(e: &mut Emitter) -> String {
    e.ensure_include("string.h");
    let symbol = "glint_cstring2string".to_string();
    e.define_function_builtin(
        &symbol,
        "static inline",
        "glint_string_t",
        &[("const char *".into(), "s".into())],
    )
    .body("  if (s == NULL) {\n    glint_string_t empty = { 0, NULL };\n    return empty;\n  }\n  glint_string_t out = { strlen(s), s };\n  return out;\n");
    symbol
}

/// `lt(a, b)`: cross-sign comparison of potentially different widths. False
/// if the signed side is negative; otherwise compared as the wider unsigned
/// type.
fn cross_sign_lt(e: &mut Emitter, a: TypeId, b: TypeId) -> String {
    let a_c = c_type_name(e.types, a);
    let b_c = c_type_name(e.types, b);
    let a_signed = e.types.is_signed_int(a).unwrap_or(true);
    let b_signed = e.types.is_signed_int(b).unwrap_or(true);
    let symbol = format!("glint_lt_{}_{}", e.types.codename(a), e.types.codename(b));

    let body = match (a_signed, b_signed) {
        (true, true) | (false, false) => "  return a < b;\n".to_string(),
        (true, false) => "  if (a < 0) {\n    return 1;\n  }\n  return (uint64_t)a < (uint64_t)b;\n".to_string(),
        (false, true) => "  if (b < 0) {\n    return 0;\n  }\n  return (uint64_t)a < (uint64_t)b;\n".to_string(),
    };
    e.define_function_builtin(&symbol, "static inline", "bool", &[(a_c, "a".into()), (b_c, "b".into())])
        .body(&body);
    symbol
}

/// `eq(a, b)`: field-wise for records (recursing, `memcmp` for array/union
/// fields), cross-sign-aware primitive `==` otherwise.
fn composite_eq(e: &mut Emitter, ty: TypeId) -> String {
    use crate::types::Type;
    let c_ty = c_type_name(e.types, ty);
    let symbol = format!("glint_eq_{}", e.types.codename(ty));

    let body = match e.types.get(ty).clone() {
        Type::Record(rid) => {
            e.ensure_include("string.h");
            let fields = e.types.record_fields(rid).to_vec();
            let mut lines = String::from("  return ");
            if fields.is_empty() {
                lines.push_str("true");
            } else {
                let mut parts = Vec::new();
                for f in &fields {
                    match e.types.get(f.ty) {
                        Type::Array(_, _) | Type::Union(_) => {
                            parts.push(format!(
                                "memcmp(&a.{f}, &b.{f}, sizeof(a.{f})) == 0",
                                f = f.name
                            ));
                        }
                        Type::Record(_) => {
                            let inner = e.ensure_builtin("eq", &[BuiltinArg::Type(f.ty)]);
                            parts.push(format!("{}(a.{}, b.{})", inner, f.name, f.name));
                        }
                        _ => parts.push(format!("a.{f} == b.{f}", f = f.name)),
                    }
                }
                lines.push_str(&parts.join(" && "));
            }
            lines.push_str(";\n");
            lines
        }
        _ => "  return a == b;\n".to_string(),
    };
    e.define_function_builtin(&symbol, "static inline", "bool", &[(c_ty.clone(), "a".into()), (c_ty, "b".into())])
        .body(&body);
    symbol
}

/// String equality: same length AND (same data pointer OR length zero OR
/// `memcmp` equal).
fn string_eq(e: &mut Emitter) -> String {
    e.ensure_include("string.h");
    let symbol = "glint_streq".to_string();
    e.define_function_builtin(
        &symbol,
        "static inline",
        "bool",
        &[("glint_string_t".into(), "a".into()), ("glint_string_t".into(), "b".into())],
    )
    .body("  if (a.len != b.len) {\n    return false;\n  }\n  if (a.data == b.data || a.len == 0) {\n    return true;\n  }\n  return memcmp(a.data, b.data, a.len) == 0;\n");
    symbol
}

/// `idiv(a, b)`: floor division, panicking on `b == 0` unless `nochecks`.
/// `b == -1` is special-cased to avoid `INT_MIN / -1` overflow.
fn idiv(e: &mut Emitter, ty: TypeId) -> String {
    let c_ty = c_type_name(e.types, ty);
    let bits = e.types.int_range(ty).map(|(_, _, b)| b).unwrap_or(32);
    let unsigned_ty = unsigned_c_name(bits);
    let symbol = format!("glint_idiv_{}", e.types.codename(ty));
    let check = divide_by_zero_check(e);
    e.define_function_builtin(&symbol, "static inline", &c_ty, &[(c_ty.clone(), "a".into()), (c_ty.clone(), "b".into())])
        .body(&format!(
            "{check}  if (b == -1) {{\n    return -({uty})a;\n  }}\n  {ty} q = a / b;\n  if ((a % b != 0) && ((a < 0) != (b < 0))) {{\n    q -= 1;\n  }}\n  return q;\n",
            check = check,
            ty = c_ty,
            uty = unsigned_ty,
        ));
    symbol
}

/// The `uintN_t` spelling for a given bit width, used where a builtin needs
/// the unsigned counterpart of a signed C type without mutating the
/// `TypeTable` to intern it.
fn unsigned_c_name(bits: u32) -> &'static str {
    match bits {
        8 => "uint8_t",
        16 => "uint16_t",
        32 => "uint32_t",
        _ => "uint64_t",
    }
}

/// `imod(a, b)`: matching floor-division residue, corrected toward a
/// positive remainder when the operand signs differ.
fn imod(e: &mut Emitter, ty: TypeId) -> String {
    let c_ty = c_type_name(e.types, ty);
    let symbol = format!("glint_imod_{}", e.types.codename(ty));
    let check = divide_by_zero_check(e);
    e.define_function_builtin(&symbol, "static inline", &c_ty, &[(c_ty.clone(), "a".into()), (c_ty.clone(), "b".into())])
        .body(&format!(
            "{check}  {ty} r = a % b;\n  if (r != 0 && ((r < 0) != (b < 0))) {{\n    r += b;\n  }}\n  return r;\n",
            check = check,
            ty = c_ty,
        ));
    symbol
}

fn divide_by_zero_check(e: &mut Emitter) -> String {
    if e.pragmas.nochecks() {
        return String::new();
    }
    let panic_fn = e.ensure_builtin("panic_cstring", &[]);
    format!("  if (b == 0) {{\n    {}(\"{}\");\n  }}\n", panic_fn, msg::DIVIDE_BY_ZERO)
}

/// `fmod(a, b)`: wraps C `fmod`/`fmodf`, adjusting the sign to match the
/// divisor (floor-modulo, not C's truncate-modulo).
fn fmod(e: &mut Emitter, ty: TypeId) -> String {
    use crate::types::{FloatWidth, Type};
    e.ensure_include("math.h");
    let c_ty = c_type_name(e.types, ty);
    let cfn = match e.types.get(ty) {
        Type::Float(FloatWidth::W32) => "fmodf",
        _ => "fmod",
    };
    let symbol = format!("glint_fmod_{}", e.types.codename(ty));
    e.define_function_builtin(&symbol, "static inline", &c_ty, &[(c_ty.clone(), "a".into()), (c_ty.clone(), "b".into())])
        .body(&format!(
            "  {ty} r = {cfn}(a, b);\n  if (r != 0 && ((r < 0) != (b < 0))) {{\n    r += b;\n  }}\n  return r;\n",
            ty = c_ty,
            cfn = cfn,
        ));
    symbol
}

enum ShiftKind {
    Left,
    LogicalRight,
    ArithmeticRight,
}

/// `shl`/`shr`/`asr`: deterministic behavior for out-of-range shift counts,
/// including negative counts (which shift the other direction).
fn shift(e: &mut Emitter, ty: TypeId, kind: ShiftKind) -> String {
    let c_ty = c_type_name(e.types, ty);
    let bits = e.types.int_range(ty).map(|(_, _, b)| b).unwrap_or(32);
    let (name, op, opposite_op) = match kind {
        ShiftKind::Left => ("shl", "<<", ">>"),
        ShiftKind::LogicalRight => ("shr", ">>", "<<"),
        ShiftKind::ArithmeticRight => ("asr", ">>", "<<"),
    };
    let symbol = format!("glint_{}_{}", name, e.types.codename(ty));
    let zero_fill = match kind {
        ShiftKind::ArithmeticRight => "(a < 0 ? -1 : 0)",
        _ => "0",
    };
    e.define_function_builtin(&symbol, "static inline", &c_ty, &[(c_ty.clone(), "a".into()), ("int32_t".into(), "b".into())])
        .body(&format!(
            "  if (b >= {bits} || b <= -{bits}) {{\n    return {zero};\n  }}\n  if (b < 0) {{\n    return a {opp} (-b);\n  }}\n  return a {op} b;\n",
            bits = bits,
            zero = zero_fill,
            opp = opposite_op,
            op = op,
        ));
    symbol
}

/// The polymorphic `print`: one named function per distinct argument-type
/// tuple, writing tab-separated values terminated by a newline.
fn print(e: &mut Emitter, args: &[BuiltinArg]) -> String {
    use crate::types::Type;
    e.ensure_include("stdio.h");
    e.ensure_include("inttypes.h");

    let type_ids: Vec<TypeId> = args.iter().map(|a| match a {
        BuiltinArg::Type(t) => *t,
        _ => panic!("print() builtin called with a non-type argument"),
    }).collect();
    let suffix: Vec<String> = type_ids.iter().map(|&t| e.types.codename(t)).collect();
    let symbol = format!("glint_print_{}", suffix.join("_"));

    let params: Vec<(String, String)> = type_ids
        .iter()
        .enumerate()
        .map(|(i, &t)| (c_type_name(e.types, t), format!("arg{}", i)))
        .collect();

    let mut body = String::new();
    for (i, &t) in type_ids.iter().enumerate() {
        if i > 0 {
            body.push_str("  fputc('\\t', stdout);\n");
        }
        let name = format!("arg{}", i);
        match e.types.get(t) {
            Type::StringView => {
                body.push_str(&format!("  fwrite({n}.data, 1, {n}.len, stdout);\n", n = name));
            }
            Type::CString => {
                body.push_str(&format!("  fputs({}, stdout);\n", name));
            }
            Type::Boolean => {
                body.push_str(&format!("  fputs({} ? \"true\" : \"false\", stdout);\n", name));
            }
            Type::NilType => {
                body.push_str("  fputs(\"nil\", stdout);\n");
            }
            Type::NilPtr => {
                body.push_str("  fputs(\"(null)\", stdout);\n");
            }
            Type::Pointer(_) => {
                body.push_str(&format!("  fprintf(stdout, \"0x%\" PRIxPTR, (uintptr_t){});\n", name));
            }
            Type::Function { .. } => {
                body.push_str(&format!(
                    "  fprintf(stdout, \"function: 0x%\" PRIxPTR, (uintptr_t){});\n",
                    name
                ));
            }
            Type::Int { signed: true, .. } => {
                body.push_str(&format!("  fprintf(stdout, \"%\" PRIi64, (int64_t){});\n", name));
            }
            Type::Int { signed: false, .. } => {
                body.push_str(&format!("  fprintf(stdout, \"%\" PRIu64, (uint64_t){});\n", name));
            }
            Type::Float(_) => {
                body.push_str(&format!(
                    "  {{\n    char fbuf[48];\n    snprintf(fbuf, sizeof fbuf, \"%g\", (double){name});\n    if (strchr(fbuf, '.') == NULL && strchr(fbuf, 'e') == NULL && strchr(fbuf, 'n') == NULL) {{\n      snprintf(fbuf, sizeof fbuf, \"%.1f\", (double){name});\n    }}\n    fputs(fbuf, stdout);\n  }}\n",
                    name = name
                ));
                e.ensure_include("string.h");
            }
            _ => {
                body.push_str("  fputs(\"<unprintable>\", stdout);\n");
            }
        }
    }
    body.push_str("  fputc('\\n', stdout);\n");

    e.define_function_builtin(&symbol, "static", "void", &params).body(&body);
    symbol
}

/// The `assert` helper's zero/one/two-argument forms. `arity` selects which
/// shape this call site needs; the generated function is named per arity so
/// each shape is only ever emitted once.
fn assert_helper(e: &mut Emitter, arity: usize) -> String {
    let panic_fn = e.ensure_builtin("panic_cstring", &[]);
    let symbol = format!("glint_assert{}", arity);
    match arity {
        0 => {
            e.define_function_builtin(&symbol, "static noreturn", "void", &[("const char *".into(), "loc".into())])
                .body(&format!(
                    "  char buf[256];\n  snprintf(buf, sizeof buf, \"%s: {}\", loc);\n  {}(buf);\n",
                    msg::ASSERTION_FAILED, panic_fn
                ));
        }
        1 => {
            e.define_function_builtin(
                &symbol,
                "static",
                "void",
                &[("const char *".into(), "loc".into()), ("bool".into(), "cond".into())],
            )
            .body(&format!(
                "  if (!cond) {{\n    char buf[256];\n    snprintf(buf, sizeof buf, \"%s: {}\", loc);\n    {}(buf);\n  }}\n",
                msg::ASSERTION_FAILED, panic_fn
            ));
        }
        _ => {
            e.define_function_builtin(
                &symbol,
                "static",
                "void",
                &[
                    ("const char *".into(), "loc".into()),
                    ("bool".into(), "cond".into()),
                    ("const char *".into(), "message".into()),
                ],
            )
            .body(&format!(
                "  if (!cond) {{\n    char buf[256];\n    snprintf(buf, sizeof buf, \"%s: {} %s\", loc, message);\n    {}(buf);\n  }}\n",
                msg::ASSERTION_FAILED, panic_fn
            ));
        }
    }
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::Emitter;
    use crate::pragma::PragmaMap;
    use crate::types::TypeTable;

    #[test]
    fn idiv_avoids_int_min_overflow() {
        let types = TypeTable::new();
        let pragmas = PragmaMap::new();
        let mut e = Emitter::new(&types, &pragmas);
        let symbol = e.ensure_builtin("idiv", &[BuiltinArg::Type(types.t_int32)]);
        let out = e.finish();
        assert!(out.contains(&symbol));
        assert!(out.contains("b == -1"));
    }

    #[test]
    fn shift_handles_out_of_range_count() {
        let types = TypeTable::new();
        let pragmas = PragmaMap::new();
        let mut e = Emitter::new(&types, &pragmas);
        e.ensure_builtin("shl", &[BuiltinArg::Type(types.t_int32)]);
        let out = e.finish();
        assert!(out.contains("b >= 32"));
    }

    #[test]
    fn print_distinguishes_argument_tuples() {
        let types = TypeTable::new();
        let pragmas = PragmaMap::new();
        let mut e = Emitter::new(&types, &pragmas);
        let a = e.ensure_builtin("print", &[BuiltinArg::Type(types.t_stringview)]);
        let b = e.ensure_builtin("print", &[BuiltinArg::Type(types.t_int32)]);
        assert_ne!(a, b);
    }

    #[test]
    fn nochecks_pragma_elides_divide_by_zero_panic() {
        let types = TypeTable::new();
        let mut pragmas = PragmaMap::new();
        pragmas.set_field(crate::pragma::NOCHECKS, crate::pragma::FieldValue::Bool(true)).unwrap();
        let mut e = Emitter::new(&types, &pragmas);
        e.ensure_builtin("idiv", &[BuiltinArg::Type(types.t_int32)]);
        let out = e.finish();
        assert!(!out.contains(msg::DIVIDE_BY_ZERO));
    }
}
