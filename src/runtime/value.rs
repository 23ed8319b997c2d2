//! Typed values and the physical slots they occupy.

use crate::types::field_type::{FieldType, PrimitiveType};

use super::ExecutionError;

/// A reference to an object, or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Reference {
    /// The `null` reference.
    #[display("null")]
    Null,
    /// A handle to an object on the heap.
    #[display("@{_0:#x}")]
    Object(u32),
}

/// The computational category of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Takes one slot.
    One,
    /// Takes two slots (`long` and `double`).
    Two,
}

impl Category {
    /// Returns the number of slots a value of this category occupies.
    #[must_use]
    pub const fn slots(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// A typed value held in a local variable or on an operand stack.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display)]
pub enum Value {
    /// A `boolean`.
    #[display("boolean({_0})")]
    Boolean(bool),
    /// A `byte`.
    #[display("byte({_0})")]
    Byte(i8),
    /// A `char`, as a UTF-16 code unit.
    #[display("char({_0:#06x})")]
    Char(u16),
    /// A `short`.
    #[display("short({_0})")]
    Short(i16),
    /// An `int`.
    #[display("int({_0})")]
    Int(i32),
    /// A `float`.
    #[display("float({_0})")]
    Float(f32),
    /// A reference.
    #[display("ref({_0})")]
    Reference(Reference),
    /// A `long`.
    #[display("long({_0})")]
    Long(i64),
    /// A `double`.
    #[display("double({_0})")]
    Double(f64),
}

impl Value {
    /// Gets the computational category of the value.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Long(_) | Self::Double(_) => Category::Two,
            _ => Category::One,
        }
    }

    /// Checks whether the value can be passed where `field_type` is declared.
    /// `boolean`, `byte`, `char`, `short`, and `int` values are interchangeable since they all
    /// compute as `int`.
    #[must_use]
    pub fn conforms_to(&self, field_type: &FieldType) -> bool {
        use PrimitiveType::{Boolean, Byte, Char, Double, Float, Int, Long, Short};
        match (self, field_type) {
            (
                Self::Boolean(_) | Self::Byte(_) | Self::Char(_) | Self::Short(_) | Self::Int(_),
                FieldType::Base(Boolean | Byte | Char | Short | Int),
            )
            | (Self::Float(_), FieldType::Base(Float))
            | (Self::Long(_), FieldType::Base(Long))
            | (Self::Double(_), FieldType::Base(Double))
            | (Self::Reference(_), FieldType::Object(_) | FieldType::Array(_)) => true,
            _ => false,
        }
    }

    /// Gets the zero value of a type, e.g., `0` for `int` and `null` for references.
    #[must_use]
    pub const fn zero_of(field_type: &FieldType) -> Self {
        match field_type {
            FieldType::Base(PrimitiveType::Boolean) => Self::Boolean(false),
            FieldType::Base(PrimitiveType::Byte) => Self::Byte(0),
            FieldType::Base(PrimitiveType::Char) => Self::Char(0),
            FieldType::Base(PrimitiveType::Short) => Self::Short(0),
            FieldType::Base(PrimitiveType::Int) => Self::Int(0),
            FieldType::Base(PrimitiveType::Float) => Self::Float(0.0),
            FieldType::Base(PrimitiveType::Long) => Self::Long(0),
            FieldType::Base(PrimitiveType::Double) => Self::Double(0.0),
            FieldType::Object(_) | FieldType::Array(_) => Self::Reference(Reference::Null),
        }
    }

    /// Splits the value into the slots it occupies, in the order they are written.
    /// A category 2 value is written low word first.
    #[must_use]
    pub fn into_slots(self) -> (Slot, Option<Slot>) {
        let (kind, bits) = match self {
            #[allow(clippy::cast_sign_loss, reason = "Only the bit pattern matters.")]
            Self::Long(it) => (WideKind::Long, it as u64),
            Self::Double(it) => (WideKind::Double, it.to_bits()),
            single => return (Slot::Single(single), None),
        };
        #[allow(clippy::cast_possible_truncation, reason = "Splitting into 32-bit words.")]
        let (low, high) = (bits as u32, (bits >> 32) as u32);
        (Slot::Low(kind, low), Some(Slot::High(kind, high)))
    }

    /// Rebuilds a category 2 value from its two slots.
    /// # Errors
    /// - [`ExecutionError::ValueMismatch`] if the slots are not the low and high words of the same
    ///   kind of value.
    pub fn from_wide_slots(low: Slot, high: Slot) -> Result<Self, ExecutionError> {
        let (Slot::Low(low_kind, low), Slot::High(high_kind, high)) = (low, high) else {
            return Err(ExecutionError::ValueMismatch);
        };
        if low_kind != high_kind {
            return Err(ExecutionError::ValueMismatch);
        }
        let bits = (u64::from(high) << 32) | u64::from(low);
        let value = match low_kind {
            #[allow(clippy::cast_possible_wrap, reason = "Only the bit pattern matters.")]
            WideKind::Long => Self::Long(bits as i64),
            WideKind::Double => Self::Double(f64::from_bits(bits)),
        };
        Ok(value)
    }
}

/// The kind of a category 2 value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WideKind {
    /// A `long`.
    Long,
    /// A `double`.
    Double,
}

/// A physical slot in a local variable table or on an operand stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    /// A whole category 1 value.
    Single(Value),
    /// The low 32 bits of a category 2 value.
    Low(WideKind, u32),
    /// The high 32 bits of a category 2 value.
    High(WideKind, u32),
}
