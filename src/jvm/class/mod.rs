//! JVM classes and interfaces

pub mod constant_pool;

use std::borrow::Borrow;

use bitflags::bitflags;

use super::{
    Field, Method,
    attribute::{AttributeMap, BootstrapMethod, InnerClass},
    parsing::Error,
    references::{ClassRef, FieldRef, MethodRef},
};
use crate::{macros::see_jvm_spec, types::method_descriptor::MethodDescriptor};

pub use constant_pool::ConstantPool;

/// A JVM class or interface decoded from a class file.
/// It owns its constant pool, fields, methods, and attributes.
#[doc = see_jvm_spec!(4, 1)]
#[derive(Debug, Clone)]
pub struct Class {
    /// The magic number at the start of the class file.
    pub magic: u32,
    /// The version of the class file.
    pub version: Version,
    /// The constant pool.
    pub constant_pool: ConstantPool,
    /// The access flags.
    pub access_flags: AccessFlags,
    /// The index in the constant pool of the `CONSTANT_Class` naming this class.
    pub this_class: u16,
    /// The index in the constant pool of the `CONSTANT_Class` naming the super class, or `0`.
    pub super_class: u16,
    /// The indices in the constant pool of the implemented interfaces, in declaration order.
    pub interfaces: Vec<u16>,
    /// The fields, in declaration order.
    pub fields: Vec<Field>,
    /// The methods, in declaration order.
    pub methods: Vec<Method>,
    /// The attributes of the class.
    pub attributes: AttributeMap,
}

/// The magic number of a Java class file.
pub const JAVA_CLASS_MAGIC: u32 = 0xCAFE_BABE;

impl Class {
    /// Gets the binary name of the class, e.g., `java/lang/String`.
    /// # Errors
    /// See [`ConstantPool::get_class_ref`].
    pub fn binary_name(&self) -> Result<&str, Error> {
        match self.constant_pool.get_entry(self.this_class)? {
            &constant_pool::Entry::Class { name_index } => self.constant_pool.get_str(name_index),
            it => Err(Error::MismatchedConstantPoolEntryType {
                expected: "CONSTANT_Class",
                found: it.constant_kind(),
            }),
        }
    }

    /// Creates a [`ClassRef`] referring to the class.
    /// # Errors
    /// See [`ConstantPool::get_class_ref`].
    pub fn make_ref(&self) -> Result<ClassRef, Error> {
        self.constant_pool.get_class_ref(self.this_class)
    }

    /// Gets the super class, or [`None`] for `java/lang/Object` and modules.
    /// # Errors
    /// See [`ConstantPool::get_class_ref`].
    pub fn super_class(&self) -> Result<Option<ClassRef>, Error> {
        match self.super_class {
            0 => Ok(None),
            idx => self.constant_pool.get_class_ref(idx).map(Some),
        }
    }

    /// Gets the implemented interfaces, in declaration order.
    /// # Errors
    /// See [`ConstantPool::get_class_ref`].
    pub fn interfaces(&self) -> Result<Vec<ClassRef>, Error> {
        self.interfaces
            .iter()
            .map(|&idx| self.constant_pool.get_class_ref(idx))
            .collect()
    }

    /// Gets the name of the source file the class is compiled from.
    /// # Errors
    /// See [`ConstantPool::get_str`].
    pub fn source_file(&self) -> Result<Option<&str>, Error> {
        self.attributes
            .source_file_index()
            .map(|idx| self.constant_pool.get_str(idx))
            .transpose()
    }

    /// Gets the bootstrap methods used by `invokedynamic` call sites and dynamic constants.
    #[must_use]
    pub fn bootstrap_methods(&self) -> &[BootstrapMethod] {
        self.attributes.bootstrap_methods().unwrap_or_default()
    }

    /// Gets the inner classes recorded in the class.
    #[must_use]
    pub fn inner_classes(&self) -> &[InnerClass] {
        self.attributes.inner_classes().unwrap_or_default()
    }

    /// Gets a method of the class by its name and descriptor.
    #[must_use]
    pub fn get_method<D>(&self, name: &str, descriptor: D) -> Option<&Method>
    where
        D: Borrow<MethodDescriptor>,
    {
        self.methods
            .iter()
            .find(|m| m.name == name && &m.descriptor == descriptor.borrow())
    }

    /// Gets the methods of the class with the given name.
    pub fn methods_named<'c>(&'c self, name: &'c str) -> impl Iterator<Item = &'c Method> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// Gets a field of the class by its name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Resolves a `CONSTANT_Fieldref` of this class's constant pool.
    /// # Errors
    /// See [`ConstantPool::get_field_ref`].
    pub fn field_ref(&self, index: u16) -> Result<FieldRef, Error> {
        self.constant_pool.get_field_ref(index)
    }

    /// Resolves a `CONSTANT_Methodref` or `CONSTANT_InterfaceMethodref` of this class's
    /// constant pool.
    /// # Errors
    /// See [`ConstantPool::get_method_ref`].
    pub fn method_ref(&self, index: u16) -> Result<MethodRef, Error> {
        self.constant_pool.get_method_ref(index)
    }

    /// Checks if the class is an interface.
    #[must_use]
    pub const fn is_interface(&self) -> bool {
        self.access_flags.contains(AccessFlags::INTERFACE)
    }

    /// Checks if the class is an abstract class.
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.access_flags.contains(AccessFlags::ABSTRACT)
    }

    /// Checks if the buffer started with the class file magic number.
    #[must_use]
    pub const fn has_valid_magic(&self) -> bool {
        self.magic == JAVA_CLASS_MAGIC
    }
}

/// The version of a class file.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, derive_more::Display)]
#[display("{major}.{minor}")]
pub struct Version {
    /// The major version, e.g., `65` for Java 21.
    pub major: u16,
    /// The minor version.
    pub minor: u16,
}

impl Version {
    /// The major version of class files produced by Java 1.1.
    pub const JDK_1_1: u16 = 45;

    /// Returns `true` if this class file is compiled with `--enable-preview`.
    #[must_use]
    pub const fn is_preview_enabled(&self) -> bool {
        self.major >= 56 && self.minor == u16::MAX
    }

    /// Returns the Java SE release that introduced the major version, if it is one.
    /// Releases before Java 5 are reported as `1`.
    #[must_use]
    pub const fn java_release(&self) -> Option<u16> {
        match self.major {
            Self::JDK_1_1..=48 => Some(1),
            major @ 49.. => Some(major - 44),
            _ => None,
        }
    }
}

/// A method handle.
#[doc = see_jvm_spec!(4, 4, 8)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodHandle {
    /// Get an instance field.
    RefGetField(FieldRef),
    /// Get a static field.
    RefGetStatic(FieldRef),
    /// Writes to an instance field.
    RefPutField(FieldRef),
    /// Writes to a static field.
    RefPutStatic(FieldRef),
    /// Invoke an instance method.
    RefInvokeVirtual(MethodRef),
    /// Invoke a static method.
    RefInvokeStatic(MethodRef),
    /// Invoke a special method (e.g., a private method).
    RefInvokeSpecial(MethodRef),
    /// Create an instance and invoke its constructor.
    RefNewInvokeSpecial(MethodRef),
    /// Invoke an interface method.
    RefInvokeInterface(MethodRef),
}

impl MethodHandle {
    /// Gets the reference kind of this method handle.
    #[must_use]
    pub const fn reference_kind(&self) -> u8 {
        match self {
            Self::RefGetField(_) => 1,
            Self::RefGetStatic(_) => 2,
            Self::RefPutField(_) => 3,
            Self::RefPutStatic(_) => 4,
            Self::RefInvokeVirtual(_) => 5,
            Self::RefInvokeStatic(_) => 6,
            Self::RefInvokeSpecial(_) => 7,
            Self::RefNewInvokeSpecial(_) => 8,
            Self::RefInvokeInterface(_) => 9,
        }
    }
}

/// A resolved `invokedynamic` call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeDynamic {
    /// The index into the bootstrap method table of the class.
    pub bootstrap_method_attr_index: u16,
    /// The name of the call site.
    pub name: String,
    /// The descriptor of the call site.
    pub descriptor: MethodDescriptor,
}

bitflags! {
    /// The access flags of a [`Class`].
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct AccessFlags: u16 {
        /// Declared `public`; may be accessed from outside its package.
        const PUBLIC = 0x0001;
        /// Marked `private` in source.
        /// NOTE: This is not mentioned in the JVM Specification, but some class files set it.
        const PRIVATE = 0x0002;
        /// Declared `final`; no subclasses allowed.
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by the invokespecial instruction.
        const SUPER = 0x0020;
        /// Is an interface, not a class.
        const INTERFACE = 0x0200;
        /// Declared `abstract`; must not be instantiated.
        const ABSTRACT = 0x0400;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface.
        const ANNOTATION = 0x2000;
        /// Declared as an enum class.
        const ENUM = 0x4000;
        /// Is a module, not a class or interface.
        const MODULE = 0x8000;
    }
}

bitflags! {
    /// The access flags of a nested class.
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct NestedClassAccessFlags: u16 {
        /// Marked or implicitly `public` in source.
        const PUBLIC = 0x0001;
        /// Marked `private` in source.
        const PRIVATE = 0x0002;
        /// Marked `protected` in source.
        const PROTECTED = 0x0004;
        /// Marked or implicitly `static` in source.
        const STATIC = 0x0008;
        /// Marked `final` in source.
        const FINAL = 0x0010;
        /// NOTE: This was not mentioned in the JVM Specification,
        /// but it appears in some class files.
        const SUPER = 0x0020;
        /// Was an `interface` in source.
        const INTERFACE = 0x0200;
        /// Marked or implicitly `abstract` in source.
        const ABSTRACT = 0x0400;
        /// Declared `synthetic`; not present in the source code.
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface.
        const ANNOTATION = 0x2000;
        /// Declared as an enum class.
        const ENUM = 0x4000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_version() {
        let version = Version {
            major: 65,
            minor: u16::MAX,
        };
        assert!(version.is_preview_enabled());
        assert_eq!(version.java_release(), Some(21));
        let version = Version { major: 52, minor: 0 };
        assert!(!version.is_preview_enabled());
        assert_eq!(version.java_release(), Some(8));
        assert_eq!(version.to_string(), "52.0");
    }

    #[test]
    fn ancient_versions() {
        assert_eq!(Version { major: 45, minor: 3 }.java_release(), Some(1));
        assert_eq!(Version { major: 44, minor: 0 }.java_release(), None);
    }
}
