//! Attributes attached to classes, fields, methods, and method bodies.

use super::{
    class::{ConstantPool, MethodHandle, NestedClassAccessFlags},
    code::Code,
    method::ParameterAccessFlags,
    parsing::Error,
    references::ClassRef,
};
use crate::macros::see_jvm_spec;

/// An attribute recognized by the decoder.
/// Cross references are kept as constant pool indices and resolved on demand.
#[doc = see_jvm_spec!(4, 7)]
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Attribute {
    /// The index of the initial value of a field.
    ConstantValue(u16),
    /// The body of a method.
    Code(Code),
    /// A stack map table. Its frames are skipped, only the length of the body is kept.
    StackMapTable {
        /// The number of bytes in the attribute body.
        length: u32,
    },
    /// The indices of the `CONSTANT_Class` entries of the declared checked exceptions.
    Exceptions(Vec<u16>),
    /// Maps code offsets to source lines.
    LineNumberTable(Vec<LineNumberTableEntry>),
    /// Describes local variables with their descriptors.
    LocalVariableTable(Vec<LocalVariableTableEntry>),
    /// Describes local variables with their generic signatures.
    LocalVariableTypeTable(Vec<LocalVariableTableEntry>),
    /// The index of the name of the source file.
    SourceFile(u16),
    /// The bootstrap methods of `invokedynamic` call sites and dynamic constants.
    BootstrapMethods(Vec<BootstrapMethod>),
    /// The nested classes.
    InnerClasses(Vec<InnerClass>),
    /// The element is not present in the source code.
    Synthetic,
    /// The element is deprecated.
    Deprecated,
    /// The index of the generic signature.
    Signature(u16),
    /// The enclosing method of a local or anonymous class.
    EnclosingMethod(EnclosingMethod),
    /// Extended debugging information, kept as raw bytes.
    SourceDebugExtension(Vec<u8>),
    /// The formal parameters of a method.
    MethodParameters(Vec<MethodParameter>),
    /// The index of the `CONSTANT_Class` of the nest host.
    NestHost(u16),
    /// The indices of the `CONSTANT_Class` entries of the nest members.
    NestMembers(Vec<u16>),
    /// The indices of the `CONSTANT_Class` entries of the permitted subclasses.
    PermittedSubclasses(Vec<u16>),
    /// An attribute with an unrecognized name, kept when the parser is configured to preserve them.
    Unrecognized(String, Vec<u8>),
}

impl Attribute {
    /// Gets the name of the attribute.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ConstantValue(_) => "ConstantValue",
            Self::Code(_) => "Code",
            Self::StackMapTable { .. } => "StackMapTable",
            Self::Exceptions(_) => "Exceptions",
            Self::LineNumberTable(_) => "LineNumberTable",
            Self::LocalVariableTable(_) => "LocalVariableTable",
            Self::LocalVariableTypeTable(_) => "LocalVariableTypeTable",
            Self::SourceFile(_) => "SourceFile",
            Self::BootstrapMethods(_) => "BootstrapMethods",
            Self::InnerClasses(_) => "InnerClasses",
            Self::Synthetic => "Synthetic",
            Self::Deprecated => "Deprecated",
            Self::Signature(_) => "Signature",
            Self::EnclosingMethod(_) => "EnclosingMethod",
            Self::SourceDebugExtension(_) => "SourceDebugExtension",
            Self::MethodParameters(_) => "MethodParameters",
            Self::NestHost(_) => "NestHost",
            Self::NestMembers(_) => "NestMembers",
            Self::PermittedSubclasses(_) => "PermittedSubclasses",
            Self::Unrecognized(name, _) => name,
        }
    }
}

/// The attributes of a class, a field, a method, or a method body, keyed by name.
/// Each name appears at most once; iteration follows the order in the class file.
/// Repeated `LineNumberTable`, `LocalVariableTable`, and `LocalVariableTypeTable` attributes are
/// merged into the first one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    attributes: Vec<Attribute>,
}

impl AttributeMap {
    /// Adds an attribute.
    /// # Errors
    /// - [`Error::DuplicateAttribute`] if an attribute with the same name is already present and
    ///   the attribute is not a table that may be split.
    pub(crate) fn insert(&mut self, attribute: Attribute) -> Result<(), Error> {
        let Some(existing) = self
            .attributes
            .iter_mut()
            .find(|it| it.name() == attribute.name())
        else {
            self.attributes.push(attribute);
            return Ok(());
        };
        match (existing, attribute) {
            (Attribute::LineNumberTable(entries), Attribute::LineNumberTable(more)) => {
                entries.extend(more);
            }
            (Attribute::LocalVariableTable(entries), Attribute::LocalVariableTable(more))
            | (
                Attribute::LocalVariableTypeTable(entries),
                Attribute::LocalVariableTypeTable(more),
            ) => entries.extend(more),
            (_, duplicate) => return Err(Error::DuplicateAttribute(duplicate.name().to_owned())),
        }
        Ok(())
    }

    /// Gets the attribute with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|it| it.name() == name)
    }

    /// Checks if an attribute with the given name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over the attributes.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Iterates over the names of the attributes.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(Attribute::name)
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Checks if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Gets the `Code` attribute.
    #[must_use]
    pub fn code(&self) -> Option<&Code> {
        self.iter().find_map(|it| match it {
            Attribute::Code(code) => Some(code),
            _ => None,
        })
    }

    /// Gets the index in the `ConstantValue` attribute.
    #[must_use]
    pub fn constant_value_index(&self) -> Option<u16> {
        self.iter().find_map(|it| match it {
            &Attribute::ConstantValue(idx) => Some(idx),
            _ => None,
        })
    }

    /// Gets the index in the `SourceFile` attribute.
    #[must_use]
    pub fn source_file_index(&self) -> Option<u16> {
        self.iter().find_map(|it| match it {
            &Attribute::SourceFile(idx) => Some(idx),
            _ => None,
        })
    }

    /// Gets the index in the `Signature` attribute.
    #[must_use]
    pub fn signature_index(&self) -> Option<u16> {
        self.iter().find_map(|it| match it {
            &Attribute::Signature(idx) => Some(idx),
            _ => None,
        })
    }

    /// Gets the class indices in the `Exceptions` attribute.
    #[must_use]
    pub fn exceptions(&self) -> Option<&[u16]> {
        self.iter().find_map(|it| match it {
            Attribute::Exceptions(indices) => Some(indices.as_slice()),
            _ => None,
        })
    }

    /// Gets the entries of the `LineNumberTable` attribute.
    #[must_use]
    pub fn line_number_table(&self) -> Option<&[LineNumberTableEntry]> {
        self.iter().find_map(|it| match it {
            Attribute::LineNumberTable(entries) => Some(entries.as_slice()),
            _ => None,
        })
    }

    /// Gets the entries of the `LocalVariableTable` attribute.
    #[must_use]
    pub fn local_variable_table(&self) -> Option<&[LocalVariableTableEntry]> {
        self.iter().find_map(|it| match it {
            Attribute::LocalVariableTable(entries) => Some(entries.as_slice()),
            _ => None,
        })
    }

    /// Gets the entries of the `BootstrapMethods` attribute.
    #[must_use]
    pub fn bootstrap_methods(&self) -> Option<&[BootstrapMethod]> {
        self.iter().find_map(|it| match it {
            Attribute::BootstrapMethods(entries) => Some(entries.as_slice()),
            _ => None,
        })
    }

    /// Gets the entries of the `InnerClasses` attribute.
    #[must_use]
    pub fn inner_classes(&self) -> Option<&[InnerClass]> {
        self.iter().find_map(|it| match it {
            Attribute::InnerClasses(entries) => Some(entries.as_slice()),
            _ => None,
        })
    }

    /// Gets the entries of the `MethodParameters` attribute.
    #[must_use]
    pub fn method_parameters(&self) -> Option<&[MethodParameter]> {
        self.iter().find_map(|it| match it {
            Attribute::MethodParameters(entries) => Some(entries.as_slice()),
            _ => None,
        })
    }

    /// Checks if the `Synthetic` attribute is present.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.contains("Synthetic")
    }

    /// Checks if the `Deprecated` attribute is present.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.contains("Deprecated")
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

/// An entry in the `LineNumberTable` attribute.
#[doc = see_jvm_spec!(4, 7, 12)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumberTableEntry {
    /// The offset in the code where the line starts.
    pub start_pc: u16,
    /// The line number in the source file.
    pub line_number: u16,
}

/// An entry in the `LocalVariableTable` or the `LocalVariableTypeTable` attribute.
#[doc = see_jvm_spec!(4, 7, 13)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVariableTableEntry {
    /// The offset where the variable becomes live.
    pub start_pc: u16,
    /// The number of bytes the variable stays live for.
    pub length: u16,
    /// The index in the constant pool of the name.
    pub name_index: u16,
    /// The index in the constant pool of the descriptor, or of the signature for a
    /// `LocalVariableTypeTable`.
    pub descriptor_index: u16,
    /// The local variable slot.
    pub index: u16,
}

impl LocalVariableTableEntry {
    /// Checks if the variable is live at `pc`.
    #[must_use]
    pub fn is_live_at(&self, pc: u16) -> bool {
        (u32::from(self.start_pc)..u32::from(self.start_pc) + u32::from(self.length))
            .contains(&u32::from(pc))
    }
}

/// A bootstrap method.
#[doc = see_jvm_spec!(4, 7, 23)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapMethod {
    /// The index in the constant pool of the `CONSTANT_MethodHandle`.
    pub method_ref_index: u16,
    /// The indices in the constant pool of the static arguments.
    pub arguments: Vec<u16>,
}

impl BootstrapMethod {
    /// Resolves the method handle of the bootstrap method.
    /// # Errors
    /// See [`ConstantPool::get_method_handle`].
    pub fn method_handle(&self, constant_pool: &ConstantPool) -> Result<MethodHandle, Error> {
        constant_pool.get_method_handle(self.method_ref_index)
    }
}

/// An entry in the `InnerClasses` attribute.
#[doc = see_jvm_spec!(4, 7, 6)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InnerClass {
    /// The index in the constant pool of the inner class.
    pub inner_class_info_index: u16,
    /// The index in the constant pool of the outer class, or `0`.
    pub outer_class_info_index: u16,
    /// The index in the constant pool of the simple name, or `0` for anonymous classes.
    pub inner_name_index: u16,
    /// The access flags of the inner class.
    pub access_flags: NestedClassAccessFlags,
}

impl InnerClass {
    /// Resolves the inner class.
    /// # Errors
    /// See [`ConstantPool::get_class_ref`].
    pub fn inner_class(&self, constant_pool: &ConstantPool) -> Result<ClassRef, Error> {
        constant_pool.get_class_ref(self.inner_class_info_index)
    }

    /// Resolves the outer class, if any.
    /// # Errors
    /// See [`ConstantPool::get_class_ref`].
    pub fn outer_class(&self, constant_pool: &ConstantPool) -> Result<Option<ClassRef>, Error> {
        match self.outer_class_info_index {
            0 => Ok(None),
            idx => constant_pool.get_class_ref(idx).map(Some),
        }
    }
}

/// The `EnclosingMethod` attribute.
#[doc = see_jvm_spec!(4, 7, 7)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnclosingMethod {
    /// The index in the constant pool of the enclosing class.
    pub class_index: u16,
    /// The index in the constant pool of the `CONSTANT_NameAndType` of the enclosing method,
    /// or `0` if the class is not enclosed by a method.
    pub method_index: u16,
}

/// An entry in the `MethodParameters` attribute.
#[doc = see_jvm_spec!(4, 7, 24)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodParameter {
    /// The index in the constant pool of the name, or `0` for a parameter without a name.
    pub name_index: u16,
    /// The access flags.
    pub access_flags: ParameterAccessFlags,
}
