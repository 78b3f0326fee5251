//! Raw values and opaque handles exchanged with the collaborators
//!
//! These types carry no ownership. The host runtime hands out [`RawRef`]s and
//! the bridge core wraps them in scope-bound guards before using them.

use std::fmt;
use std::num::NonZeroU64;

/// Opaque host object reference (a local, global or weak reference).
///
/// Two distinct `RawRef`s may denote the same host object; identity must be
/// compared with [`crate::HostRuntime::is_same_object`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawRef(NonZeroU64);

impl RawRef {
    /// Create from raw reference bits. Returns `None` for the null reference.
    #[inline]
    pub const fn from_bits(bits: u64) -> Option<Self> {
        match NonZeroU64::new(bits) {
            Some(bits) => Some(Self(bits)),
            None => None,
        }
    }

    /// Get the raw reference bits
    #[inline]
    pub const fn to_bits(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for RawRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawRef({:#x})", self.0)
    }
}

/// Identifier of a script-side wrapper around a host object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WrapperId(pub u64);

/// Identifier of a pinned script function (kept alive outside any stack or
/// handle scope so the host can call it back later)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub u64);

// ============================================================================
// Primitive kinds
// ============================================================================

/// Host primitive kinds, in host reflection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `byte` (signed 8-bit)
    Byte,
    /// `char` (UTF-16 code unit)
    Char,
    /// `short` (signed 16-bit)
    Short,
    /// `int` (signed 32-bit)
    Int,
    /// `long` (signed 64-bit)
    Long,
    /// `float` (IEEE 754 single)
    Float,
    /// `double` (IEEE 754 double)
    Double,
}

impl PrimitiveKind {
    /// All primitive kinds
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Host-side type name (`byte`, `int`, ...)
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Single-character descriptor (`B`, `I`, ...)
    pub const fn descriptor(self) -> char {
        match self {
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Double => 'D',
        }
    }

    /// Parse a single-character descriptor
    pub const fn from_descriptor(c: char) -> Option<Self> {
        match c {
            'Z' => Some(PrimitiveKind::Boolean),
            'B' => Some(PrimitiveKind::Byte),
            'C' => Some(PrimitiveKind::Char),
            'S' => Some(PrimitiveKind::Short),
            'I' => Some(PrimitiveKind::Int),
            'J' => Some(PrimitiveKind::Long),
            'F' => Some(PrimitiveKind::Float),
            'D' => Some(PrimitiveKind::Double),
            _ => None,
        }
    }

    /// Binary name of the boxed wrapper class
    pub const fn boxed_class(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java/lang/Boolean",
            PrimitiveKind::Byte => "java/lang/Byte",
            PrimitiveKind::Char => "java/lang/Character",
            PrimitiveKind::Short => "java/lang/Short",
            PrimitiveKind::Int => "java/lang/Integer",
            PrimitiveKind::Long => "java/lang/Long",
            PrimitiveKind::Float => "java/lang/Float",
            PrimitiveKind::Double => "java/lang/Double",
        }
    }

    /// Parse a boxed wrapper class binary name
    pub fn from_boxed_class(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.boxed_class() == class)
    }

    /// Name of the boxed class accessor returning the primitive (`byteValue`)
    pub const fn unbox_method(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "booleanValue",
            PrimitiveKind::Byte => "byteValue",
            PrimitiveKind::Char => "charValue",
            PrimitiveKind::Short => "shortValue",
            PrimitiveKind::Int => "intValue",
            PrimitiveKind::Long => "longValue",
            PrimitiveKind::Float => "floatValue",
            PrimitiveKind::Double => "doubleValue",
        }
    }

    /// Descriptor of the static `valueOf` factory, e.g. `(B)Ljava/lang/Byte;`
    pub fn box_signature(self) -> String {
        format!("({})L{};", self.descriptor(), self.boxed_class())
    }

    /// Descriptor of the unboxing accessor, e.g. `()B`
    pub fn unbox_signature(self) -> String {
        format!("(){}", self.descriptor())
    }

    /// Binary name of the primitive array class, e.g. `[B`
    pub fn array_class(self) -> String {
        format!("[{}", self.descriptor())
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Raw values
// ============================================================================

/// Untyped host value as passed to and returned from invocation entry points.
///
/// The object variant borrows a reference; it never owns one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char`
    Char(u16),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// Object reference, `None` is the null reference
    Object(Option<RawRef>),
}

impl RawValue {
    /// The null object reference
    pub const NULL: RawValue = RawValue::Object(None);

    /// Primitive kind of this value, `None` for objects
    pub const fn kind(&self) -> Option<PrimitiveKind> {
        match self {
            RawValue::Boolean(_) => Some(PrimitiveKind::Boolean),
            RawValue::Byte(_) => Some(PrimitiveKind::Byte),
            RawValue::Char(_) => Some(PrimitiveKind::Char),
            RawValue::Short(_) => Some(PrimitiveKind::Short),
            RawValue::Int(_) => Some(PrimitiveKind::Int),
            RawValue::Long(_) => Some(PrimitiveKind::Long),
            RawValue::Float(_) => Some(PrimitiveKind::Float),
            RawValue::Double(_) => Some(PrimitiveKind::Double),
            RawValue::Object(_) => None,
        }
    }

    /// Extract boolean value
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract byte value
    pub const fn as_i8(&self) -> Option<i8> {
        match self {
            RawValue::Byte(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract char value
    pub const fn as_u16(&self) -> Option<u16> {
        match self {
            RawValue::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Extract short value
    pub const fn as_i16(&self) -> Option<i16> {
        match self {
            RawValue::Short(s) => Some(*s),
            _ => None,
        }
    }

    /// Extract int value
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            RawValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract long value
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            RawValue::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Extract float value
    pub const fn as_f32(&self) -> Option<f32> {
        match self {
            RawValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract double value
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Extract object reference (`Some(None)` is the null reference)
    pub const fn as_object(&self) -> Option<Option<RawRef>> {
        match self {
            RawValue::Object(r) => Some(*r),
            _ => None,
        }
    }

    /// Get type name for debugging
    pub const fn type_name(&self) -> &'static str {
        match self {
            RawValue::Object(_) => "object",
            other => match other.kind() {
                Some(kind) => kind.name(),
                None => "unknown",
            },
        }
    }
}
