//! The type system.
//!
//! Types are interned into a [`TypeTable`] so that structural equality of
//! primitives/arrays reduces to a [`TypeId`] comparison, while record types
//! get nominal identity (two records with the same fields are still distinct
//! types unless they're literally the same declaration).

use std::collections::HashMap;
use std::fmt;

/// A handle into a [`TypeTable`]. Cheap to copy, compare, and hash.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TypeId(pub u32);

/// Integer bit widths the emitter and type system both care about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FloatWidth {
    W32,
    W64,
    W128,
}

impl FloatWidth {
    pub fn bits(self) -> u32 {
        match self {
            FloatWidth::W32 => 32,
            FloatWidth::W64 => 64,
            FloatWidth::W128 => 128,
        }
    }
}

/// One field of a record type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
}

/// The full variant set: primitives, composites, pointers, arrays,
/// functions, and type-of-type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    // -- primitives --
    Int { signed: bool, width: IntWidth },
    Float(FloatWidth),
    Boolean,
    /// Length + non-owning pointer string literal type (glossary
    /// "Stringview").
    StringView,
    CString,
    NilType,
    NilPtr,
    Void,
    Usize,
    Isize,

    // -- composites --
    Pointer(TypeId),
    Array(TypeId, usize),
    Record(RecordId),
    Union(Vec<TypeId>),
    Enum { subtype: TypeId, name: String },

    // -- function --
    Function {
        params: Vec<TypeId>,
        returns: Vec<TypeId>,
        varargs: bool,
    },

    /// `type(T)`, the type of a type value used during preprocessing.
    TypeOfType(TypeId),

    /// A not-yet-resolved type, e.g. a symbol whose declared type depends on
    /// an inference pass that hasn't converged yet.
    Unknown,
}

/// Nominal identity for record types: two structurally identical records are
/// still different types unless they share a `RecordId`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(pub u32);

#[derive(Debug, Default)]
struct RecordDef {
    name: String,
    fields: Vec<Field>,
}

/// Compile-time constant value attached to a fully-evaluated expression
/// node's `value` attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    /// A type value, e.g. the result of evaluating `#[int32]#` or a `primtypes`
    /// lookup during preprocessing.
    Type(TypeId),
}

/// The deduplicating interner for every [`Type`] that exists in a
/// translation unit: the set of types stays deduplicated across the run.
pub struct TypeTable {
    types: Vec<Type>,
    by_structural: HashMap<Type, TypeId>,
    records: Vec<RecordDef>,

    pub t_void: TypeId,
    pub t_boolean: TypeId,
    pub t_stringview: TypeId,
    pub t_cstring: TypeId,
    pub t_niltype: TypeId,
    pub t_nilptr: TypeId,
    pub t_usize: TypeId,
    pub t_isize: TypeId,
    pub t_unknown: TypeId,
    pub t_int32: TypeId,
    pub t_int64: TypeId,
    pub t_uint32: TypeId,
    pub t_uint64: TypeId,
    pub t_float32: TypeId,
    pub t_float64: TypeId,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = Self {
            types: Vec::new(),
            by_structural: HashMap::new(),
            records: Vec::new(),
            t_void: TypeId(0),
            t_boolean: TypeId(0),
            t_stringview: TypeId(0),
            t_cstring: TypeId(0),
            t_niltype: TypeId(0),
            t_nilptr: TypeId(0),
            t_usize: TypeId(0),
            t_isize: TypeId(0),
            t_unknown: TypeId(0),
            t_int32: TypeId(0),
            t_int64: TypeId(0),
            t_uint32: TypeId(0),
            t_uint64: TypeId(0),
            t_float32: TypeId(0),
            t_float64: TypeId(0),
        };
        table.t_void = table.intern(Type::Void);
        table.t_boolean = table.intern(Type::Boolean);
        table.t_stringview = table.intern(Type::StringView);
        table.t_cstring = table.intern(Type::CString);
        table.t_niltype = table.intern(Type::NilType);
        table.t_nilptr = table.intern(Type::NilPtr);
        table.t_usize = table.intern(Type::Usize);
        table.t_isize = table.intern(Type::Isize);
        table.t_unknown = table.intern(Type::Unknown);
        table.t_int32 = table.intern(Type::Int { signed: true, width: IntWidth::W32 });
        table.t_int64 = table.intern(Type::Int { signed: true, width: IntWidth::W64 });
        table.t_uint32 = table.intern(Type::Int { signed: false, width: IntWidth::W32 });
        table.t_uint64 = table.intern(Type::Int { signed: false, width: IntWidth::W64 });
        table.t_float32 = table.intern(Type::Float(FloatWidth::W32));
        table.t_float64 = table.intern(Type::Float(FloatWidth::W64));
        table
    }

    /// Intern a structural (primitive/composite, non-record) type. Records
    /// must go through [`Self::declare_record`] since they're nominal.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Type::Record(_) = &ty {
            // Nominal: never dedup by structure.
            let id = TypeId(self.types.len() as u32);
            self.types.push(ty);
            return id;
        }
        if let Some(id) = self.by_structural.get(&ty) {
            return *id;
        }
        let id = TypeId(self.types.len() as u32);
        self.by_structural.insert(ty.clone(), id);
        self.types.push(ty);
        id
    }

    /// Declare a brand-new nominal record type with the given name and
    /// fields, returning its `TypeId`.
    pub fn declare_record(&mut self, name: String, fields: Vec<Field>) -> TypeId {
        let record_id = RecordId(self.records.len() as u32);
        self.records.push(RecordDef { name, fields });
        self.intern(Type::Record(record_id))
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn record_fields(&self, record_id: RecordId) -> &[Field] {
        &self.records[record_id.0 as usize].fields
    }

    pub fn record_name(&self, record_id: RecordId) -> &str {
        &self.records[record_id.0 as usize].name
    }

    /// Derive the stable C-identifier-safe name used by the emitter to key
    /// builtins and mangle composite type names.
    pub fn codename(&self, id: TypeId) -> String {
        match self.get(id) {
            Type::Int { signed: true, width } => format!("int{}", width.bits()),
            Type::Int { signed: false, width } => format!("uint{}", width.bits()),
            Type::Float(w) => format!("float{}", w.bits()),
            Type::Boolean => "boolean".into(),
            Type::StringView => "stringview".into(),
            Type::CString => "cstring".into(),
            Type::NilType => "niltype".into(),
            Type::NilPtr => "nilptr".into(),
            Type::Void => "void".into(),
            Type::Usize => "usize".into(),
            Type::Isize => "isize".into(),
            Type::Pointer(inner) => format!("pointer_{}", self.codename(*inner)),
            Type::Array(inner, n) => format!("array_{}_{}", self.codename(*inner), n),
            Type::Record(rid) => mangle(self.record_name(*rid)),
            Type::Union(members) => {
                let parts: Vec<_> = members.iter().map(|m| self.codename(*m)).collect();
                format!("union_{}", parts.join("_"))
            }
            Type::Enum { name, .. } => format!("enum_{}", mangle(name)),
            Type::Function { .. } => format!("function_{}", id.0),
            Type::TypeOfType(inner) => format!("type_{}", self.codename(*inner)),
            Type::Unknown => "unknown".into(),
        }
    }

    /// `min`/`max`/`bitsize` range metadata, for integer types only.
    pub fn int_range(&self, id: TypeId) -> Option<(i128, i128, u32)> {
        match self.get(id) {
            Type::Int { signed: true, width } => {
                let bits = width.bits();
                let max = (1i128 << (bits - 1)) - 1;
                let min = -(1i128 << (bits - 1));
                Some((min, max, bits))
            }
            Type::Int { signed: false, width } => {
                let bits = width.bits();
                let max = (1i128 << bits) - 1;
                Some((0, max, bits))
            }
            _ => None,
        }
    }

    pub fn is_signed_int(&self, id: TypeId) -> Option<bool> {
        match self.get(id) {
            Type::Int { signed, .. } => Some(*signed),
            _ => None,
        }
    }

    /// `signed_type(T)`/`unsigned_type(T)`: swap the signedness of an
    /// integer type at the same bit width.
    pub fn signed_type(&mut self, id: TypeId) -> Option<TypeId> {
        match self.get(id).clone() {
            Type::Int { width, .. } => Some(self.intern(Type::Int { signed: true, width })),
            _ => None,
        }
    }

    pub fn unsigned_type(&mut self, id: TypeId) -> Option<TypeId> {
        match self.get(id).clone() {
            Type::Int { width, .. } => Some(self.intern(Type::Int { signed: false, width })),
            _ => None,
        }
    }

    pub fn is_arithmetic(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Int { .. } | Type::Float(_))
    }

    /// Structural equality: two `TypeId`s refer to the same type iff they
    /// are the same handle (records are nominal, everything else interned).
    pub fn type_eq(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    /// Assignability: can a value of type `src` be assigned to a slot
    /// declared `dst`, allowing implicit widening but never narrowing.
    pub fn is_assignable(&self, src: TypeId, dst: TypeId) -> bool {
        if src == dst {
            return true;
        }
        match (self.get(src), self.get(dst)) {
            (Type::NilType, Type::Pointer(_)) | (Type::NilPtr, Type::Pointer(_)) => true,
            (Type::Int { signed: s1, width: w1 }, Type::Int { signed: s2, width: w2 }) => {
                // Implicit widening only: same signedness and non-narrowing
                // width, or unsigned source widening into a wider signed dst.
                (s1 == s2 && w1.bits() <= w2.bits())
                    || (!s1 && *s2 && w1.bits() < w2.bits())
            }
            (Type::Int { .. }, Type::Float(_)) => true,
            (Type::Float(w1), Type::Float(w2)) => w1.bits() <= w2.bits(),
            (Type::CString, Type::Pointer(_)) => true,
            _ => false,
        }
    }

    /// Arithmetic promotion: the result type of `T op U` for
    /// arithmetic operators. Wider type wins; on a signed/unsigned tie at
    /// equal width, promote to unsigned (matches the C emitter's `lt`/`eq`
    /// helpers, which already handle the cross-sign comparison case).
    pub fn promote(&mut self, a: TypeId, b: TypeId) -> Option<TypeId> {
        if a == b {
            return Some(a);
        }
        match (self.get(a).clone(), self.get(b).clone()) {
            (Type::Float(w1), Type::Float(w2)) => {
                let w = if w1.bits() >= w2.bits() { w1 } else { w2 };
                Some(self.intern(Type::Float(w)))
            }
            (Type::Float(w), Type::Int { .. }) | (Type::Int { .. }, Type::Float(w)) => {
                Some(self.intern(Type::Float(w)))
            }
            (Type::Int { signed: s1, width: w1 }, Type::Int { signed: s2, width: w2 }) => {
                let width = if w1.bits() >= w2.bits() { w1 } else { w2 };
                let signed = s1 && s2;
                Some(self.intern(Type::Int { signed, width }))
            }
            _ => None,
        }
    }

    /// Minimum-width inference for an integer literal: the narrowest signed
    /// width that can hold the value, defaulting to `int64` for anything
    /// that doesn't fit in 32 bits and to `int32` otherwise (this engine's
    /// default integer width, mirroring the common "int" default of
    /// C-like languages).
    pub fn infer_literal_width(&mut self, value: i128) -> TypeId {
        if value >= i32::MIN as i128 && value <= i32::MAX as i128 {
            self.t_int32
        } else {
            self.t_int64
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

fn mangle(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedups_primitives() {
        let mut table = TypeTable::new();
        let a = table.intern(Type::Int { signed: true, width: IntWidth::W32 });
        let b = table.intern(Type::Int { signed: true, width: IntWidth::W32 });
        assert_eq!(a, b);
        assert_eq!(a, table.t_int32);
    }

    #[test]
    fn records_are_nominal() {
        let mut table = TypeTable::new();
        let a = table.declare_record("Point".into(), vec![]);
        let b = table.declare_record("Point".into(), vec![]);
        assert_ne!(a, b);
    }

    #[test]
    fn promotion_widens() {
        let mut table = TypeTable::new();
        let r = table.promote(table.t_int32, table.t_int64).unwrap();
        assert_eq!(r, table.t_int64);
    }

    #[test]
    fn signed_unsigned_round_trip() {
        let mut table = TypeTable::new();
        let u = table.unsigned_type(table.t_int32).unwrap();
        let s = table.signed_type(u).unwrap();
        assert_eq!(s, table.t_int32);
    }
}
