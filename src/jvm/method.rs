//! JVM methods.

use bitflags::bitflags;

use super::{
    attribute::{AttributeMap, MethodParameter},
    class::ConstantPool,
    code::Code,
    parsing::Error,
    references::{ClassRef, MethodRef},
};
use crate::{macros::see_jvm_spec, types::method_descriptor::MethodDescriptor};

/// A method declared in a class.
/// The owning [`Class`](super::Class) owns its methods; a method only records the
/// [`ClassRef`] of its owner and resolves constant pool indices through the owner's pool.
#[doc = see_jvm_spec!(4, 6)]
#[derive(Debug, Clone)]
pub struct Method {
    /// The access flags.
    pub access_flags: AccessFlags,
    /// The index in the constant pool of the name.
    pub name_index: u16,
    /// The index in the constant pool of the descriptor.
    pub descriptor_index: u16,
    /// The name, resolved when the class is parsed.
    pub name: String,
    /// The descriptor, parsed when the class is parsed.
    pub descriptor: MethodDescriptor,
    /// The class declaring the method.
    pub owner: ClassRef,
    /// The attributes of the method.
    pub attributes: AttributeMap,
}

impl Method {
    /// The name of the constructor of a class.
    pub const CONSTRUCTOR_NAME: &'static str = "<init>";
    /// The name of the class initializer of a class.
    pub const CLASS_INITIALIZER_NAME: &'static str = "<clinit>";

    /// Gets the body of the method, or [`None`] for `abstract` and `native` methods.
    #[must_use]
    pub fn code(&self) -> Option<&Code> {
        self.attributes.code()
    }

    /// Checks if the method is `static`.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.access_flags.contains(AccessFlags::STATIC)
    }

    /// Checks if the method is a constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == Self::CONSTRUCTOR_NAME
    }

    /// Checks if the method is the class initializer.
    #[must_use]
    pub fn is_static_initializer_block(&self) -> bool {
        self.name == Self::CLASS_INITIALIZER_NAME
    }

    /// Returns the number of local variable slots the arguments take when the method is invoked,
    /// including the receiver of an instance method.
    #[must_use]
    pub fn argument_slots(&self) -> usize {
        let receiver = usize::from(!self.is_static());
        self.descriptor.argument_slots() + receiver
    }

    /// Creates a [`MethodRef`] referring to the method.
    #[must_use]
    pub fn make_ref(&self) -> MethodRef {
        MethodRef {
            owner: self.owner.clone(),
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
        }
    }

    /// Resolves the checked exceptions the method declares to throw.
    /// # Errors
    /// See [`ConstantPool::get_class_ref`].
    pub fn exceptions(&self, constant_pool: &ConstantPool) -> Result<Vec<ClassRef>, Error> {
        self.attributes
            .exceptions()
            .unwrap_or_default()
            .iter()
            .map(|&idx| constant_pool.get_class_ref(idx))
            .collect()
    }

    /// Gets the formal parameters recorded in the `MethodParameters` attribute.
    #[must_use]
    pub fn parameters(&self) -> &[MethodParameter] {
        self.attributes.method_parameters().unwrap_or_default()
    }
}

bitflags! {
    /// The access flags of a [`Method`].
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
        /// Declared `final`; must not be overridden.
        const FINAL = 0x0010;
        /// Declared `synchronized`; invocation is wrapped by a monitor use.
        const SYNCHRONIZED = 0x0020;
        /// A bridge method, generated by the compiler.
        const BRIDGE = 0x0040;
        /// Declared with variable number of arguments.
        const VARARGS = 0x0080;
        /// Declared `native`; implemented in a language other than Java.
        const NATIVE = 0x0100;
        /// Declared `abstract`; no implementation is provided.
        const ABSTRACT = 0x0400;
        /// In a class file whose major version number is at least 46 and at most 60; Declared `strictfp`.
        const STRICT = 0x0800;
        /// Declared synthetic; not present in the source code.
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    /// The access flags of a method parameter.
    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub struct ParameterAccessFlags: u16 {
        /// Declared `final`.
        const FINAL = 0x0010;
        /// Not explicitly or implicitly declared in source code.
        const SYNTHETIC = 0x1000;
        /// Implicitly declared in source code.
        const MANDATED = 0x8000;
    }
}
