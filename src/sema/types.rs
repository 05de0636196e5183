// src/sema/types.rs

use std::fmt;
use std::rc::Rc;

/// Interned qualified class name (`a/b/G`). Class field and signature data
/// lives in the registry and is resolved lazily through this key, which
/// breaks the cycle between a class and field types naming sibling classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassKey(Rc<str>);

impl ClassKey {
    pub fn new(qualified: impl AsRef<str>) -> Self {
        Self(Rc::from(qualified.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The simple (last) name of the qualified path.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved semantic types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Str,
    /// The type of the `null` literal.
    Null,
    /// No value; the return type of functions without a declared return.
    Unit,
    Array(Box<Type>),
    Class(ClassKey),
    /// Recovery type: unifies with everything so one mistake does not
    /// cascade into follow-on diagnostics.
    Error,
}

impl Type {
    pub fn array(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    /// Rank in the numeric promotion order `i8 < i16 < i32 < i64 < f32 < f64`.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Type::I8 => Some(0),
            Type::I16 => Some(1),
            Type::I32 => Some(2),
            Type::I64 => Some(3),
            Type::F32 => Some(4),
            Type::F64 => Some(5),
            _ => None,
        }
    }

    fn from_rank(rank: u8) -> Type {
        match rank {
            0 => Type::I8,
            1 => Type::I16,
            2 => Type::I32,
            3 => Type::I64,
            4 => Type::F32,
            _ => Type::F64,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.rank().is_some()
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::I8 | Type::I16 | Type::I32 | Type::I64)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::F32 | Type::F64)
    }

    /// Reference types can hold `null`.
    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Str | Type::Null | Type::Array(_) | Type::Class(_))
    }

    /// Runtime slots a value of this type occupies; 64-bit primitives take
    /// two.
    pub fn slot_width(&self) -> u16 {
        match self {
            Type::I64 | Type::F64 => 2,
            _ => 1,
        }
    }

    /// The wider of two numeric types. Callers check `is_numeric` first.
    pub fn promote(a: &Type, b: &Type) -> Type {
        match (a.rank(), b.rank()) {
            (Some(ra), Some(rb)) => Type::from_rank(ra.max(rb)),
            _ => Type::Error,
        }
    }

    /// Promotion for binary operators: the managed runtime computes on at
    /// least 32-bit words, so sub-int operands are floored at `i32`.
    pub fn arith_promote(a: &Type, b: &Type) -> Type {
        match (a.rank(), b.rank()) {
            (Some(ra), Some(rb)) => Type::from_rank(ra.max(rb).max(2)),
            _ => Type::Error,
        }
    }

    /// Whether a value of `self` coerces implicitly to `target`: identity,
    /// numeric widening, or `null` into a reference type. `Error` unifies
    /// with everything.
    pub fn can_cast(&self, target: &Type) -> bool {
        if self == target || matches!(self, Type::Error) || matches!(target, Type::Error) {
            return true;
        }
        if let (Some(from), Some(to)) = (self.rank(), target.rank()) {
            return from <= to;
        }
        matches!(self, Type::Null) && target.is_reference()
    }

    /// Nesting depth of an array type: `i32` is 0, `i32[][]` is 2.
    pub fn array_depth(&self) -> usize {
        match self {
            Type::Array(elem) => 1 + elem.array_depth(),
            _ => 0,
        }
    }

    /// The scalar type at the bottom of an array nesting.
    pub fn foundation(&self) -> &Type {
        match self {
            Type::Array(elem) => elem.foundation(),
            other => other,
        }
    }

    /// Rebuild `self`'s array nesting over a new foundation type.
    pub fn with_foundation(&self, foundation: Type) -> Type {
        match self {
            Type::Array(elem) => Type::array(elem.with_foundation(foundation)),
            _ => foundation,
        }
    }

    /// Try to resolve a primitive type by its source-level name.
    pub fn primitive_named(name: &str) -> Option<Type> {
        Some(match name {
            "bool" => Type::Bool,
            "char" => Type::Char,
            "i8" => Type::I8,
            "i16" => Type::I16,
            "i32" => Type::I32,
            "i64" => Type::I64,
            "f32" => Type::F32,
            "f64" => Type::F64,
            "str" => Type::Str,
            _ => return None,
        })
    }

    /// The smallest signed integer type whose range contains `value`.
    pub fn fit_integer(value: i64) -> Type {
        if i8::try_from(value).is_ok() {
            Type::I8
        } else if i16::try_from(value).is_ok() {
            Type::I16
        } else if i32::try_from(value).is_ok() {
            Type::I32
        } else {
            Type::I64
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Char => write!(f, "char"),
            Type::I8 => write!(f, "i8"),
            Type::I16 => write!(f, "i16"),
            Type::I32 => write!(f, "i32"),
            Type::I64 => write!(f, "i64"),
            Type::F32 => write!(f, "f32"),
            Type::F64 => write!(f, "f64"),
            Type::Str => write!(f, "str"),
            Type::Null => write!(f, "null"),
            Type::Unit => write!(f, "unit"),
            Type::Array(elem) => write!(f, "{}[]", elem),
            Type::Class(key) => write!(f, "{}", key),
            Type::Error => write!(f, "<error>"),
        }
    }
}
