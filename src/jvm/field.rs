//! JVM fields and compile-time constants.

use std::fmt::Display;

use bitflags::bitflags;
use itertools::Itertools;

use super::{
    attribute::AttributeMap,
    class::{ConstantPool, MethodHandle},
    parsing::Error,
    references::{ClassRef, FieldRef},
};
use crate::{
    macros::see_jvm_spec,
    types::{Descriptor, field_type::FieldType, method_descriptor::MethodDescriptor},
};

/// A field declared in a class.
#[doc = see_jvm_spec!(4, 5)]
#[derive(Debug, Clone)]
pub struct Field {
    /// The access flags.
    pub access_flags: AccessFlags,
    /// The index in the constant pool of the name.
    pub name_index: u16,
    /// The index in the constant pool of the descriptor.
    pub descriptor_index: u16,
    /// The name, resolved when the class is parsed.
    pub name: String,
    /// The type, parsed from the descriptor when the class is parsed.
    pub field_type: FieldType,
    /// The class declaring the field.
    pub owner: ClassRef,
    /// The attributes of the field.
    pub attributes: AttributeMap,
}

impl Field {
    /// Creates a [`FieldRef`] referring to the field.
    #[must_use]
    pub fn make_ref(&self) -> FieldRef {
        FieldRef {
            owner: self.owner.clone(),
            name: self.name.clone(),
            field_type: self.field_type.clone(),
        }
    }

    /// Checks if the field is `static`.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.access_flags.contains(AccessFlags::STATIC)
    }

    /// Resolves the initial value in the `ConstantValue` attribute, if any.
    /// # Errors
    /// See [`ConstantPool::get_constant_value`].
    pub fn constant_value(&self, constant_pool: &ConstantPool) -> Result<Option<ConstantValue>, Error> {
        self.attributes
            .constant_value_index()
            .map(|idx| constant_pool.get_constant_value(idx))
            .transpose()
    }
}

/// A string in the JVM bytecode.
#[derive(PartialEq, Eq, Debug, Clone)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum JavaString {
    /// A valid UTF-8 string.
    ValidUtf8(String),
    /// A string that is not valid modified UTF-8.
    InvalidUtf8(Vec<u8>),
}

impl Display for JavaString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JavaString::ValidUtf8(value) => write!(f, "String(\"{value}\")"),
            JavaString::InvalidUtf8(value) => write!(
                f,
                "String({}) // Invalid UTF-8",
                value.iter().map(|it| format!("0x{it:02X}")).join(" ")
            ),
        }
    }
}

/// A value that can be loaded from the constant pool.
#[derive(Debug, PartialEq, Clone)]
pub enum ConstantValue {
    /// An `int`.
    Integer(i32),
    /// A `float`.
    Float(f32),
    /// A `long`.
    Long(i64),
    /// A `double`.
    Double(f64),
    /// A `java.lang.String` literal.
    String(JavaString),
    /// A `java.lang.Class` literal.
    Class(ClassRef),
    /// A method handle.
    Handle(MethodHandle),
    /// A method type.
    MethodType(MethodDescriptor),
    /// A dynamically computed constant with its bootstrap method index, name, and type.
    Dynamic(u16, String, FieldType),
}

impl Display for ConstantValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstantValue::Integer(value) => write!(f, "int({value})"),
            ConstantValue::Float(value) => write!(f, "float({value})"),
            ConstantValue::Long(value) => write!(f, "long({value})"),
            ConstantValue::Double(value) => write!(f, "double({value})"),
            ConstantValue::String(value) => value.fmt(f),
            ConstantValue::Class(value) => write!(f, "{value}.class"),
            ConstantValue::Handle(value) => write!(f, "{value:?}"),
            ConstantValue::MethodType(value) => write!(f, "MethodType({value})"),
            ConstantValue::Dynamic(bootstrap_method_attr_index, name, field_type) => write!(
                f,
                "Dynamic({bootstrap_method_attr_index}, {name}, {})",
                field_type.descriptor()
            ),
        }
    }
}

bitflags! {
    /// The access flags of a [`Field`].
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct AccessFlags: u16 {
        /// Declared `public`; may be accessed from outside its package.
        const PUBLIC = 0x0001;
        /// Declared `private`; accessible only within the defining class and other classes belonging to the same nest.
        const PRIVATE = 0x0002;
        /// Declared `protected`; may be accessed within subclasses.
        const PROTECTED = 0x0004;
        /// Declared `static`.
        const STATIC = 0x0008;
        /// Declared `final`; never directly assigned to after object construction.
        const FINAL = 0x0010;
        /// Declared `volatile`; cannot be cached.
        const VOLATILE = 0x0040;
        /// Declared `transient`; not written or read by a persistent object manager.
        const TRANSIENT = 0x0080;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC = 0x1000;
        /// Declared as an element of an `enum` class.
        const ENUM = 0x4000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_constant_values() {
        assert_eq!(ConstantValue::Integer(-3).to_string(), "int(-3)");
        assert_eq!(
            ConstantValue::String(JavaString::ValidUtf8("hi".to_owned())).to_string(),
            "String(\"hi\")"
        );
        assert_eq!(
            ConstantValue::String(JavaString::InvalidUtf8(vec![0xC0, 0x01])).to_string(),
            "String(0xC0 0x01) // Invalid UTF-8"
        );
        assert_eq!(
            ConstantValue::Class(ClassRef::new("java/lang/Object")).to_string(),
            "java/lang/Object.class"
        );
    }
}
