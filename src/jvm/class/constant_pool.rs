//! Constant pool in a JVM class file.

use std::str::FromStr;

use crate::{
    jvm::{
        ConstantValue, JavaString,
        class::{InvokeDynamic, MethodHandle},
        parsing::Error,
        references::{ClassRef, FieldRef, MethodRef, ModuleRef, PackageRef},
    },
    macros::see_jvm_spec,
    types::{field_type::FieldType, method_descriptor::MethodDescriptor},
};

/// A JVM constant pool.
/// Indices are 1-based. A [`Entry::Long`] or [`Entry::Double`] at index `i` also occupies
/// index `i + 1` with a copy of the same value, which [`ConstantPool::iter`] skips.
#[doc = see_jvm_spec!(4, 4)]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool {
    pub(crate) inner: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    /// Index `0`, which never holds an entry.
    Unused,
    Entry(Entry),
    /// The second index taken by a `Long` or a `Double`.
    Phantom(Entry),
}

/// An error when getting an entry from the constant pool with an invalid index.
#[derive(Debug, PartialEq, Eq, Clone, Copy, thiserror::Error)]
#[error("Bad constant pool index: {0}")]
pub struct BadConstantPoolIndex(pub u16);

impl ConstantPool {
    /// Gets the count of the constant pool, i.e., the largest valid index plus one.
    /// Note that this is NOT the number of entries.
    #[doc = see_jvm_spec!(4, 1)]
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "The pool is decoded from a u16 count, so its length fits in u16."
    )]
    pub fn count(&self) -> u16 {
        self.inner.len() as u16
    }

    /// Gets the constant pool entry at the given index.
    /// The second index of a `Long` or `Double` resolves to the same value as the first one.
    /// # Errors
    /// - [`BadConstantPoolIndex`] if `index` is `0` or not below [`ConstantPool::count`].
    pub fn get_entry(&self, index: u16) -> Result<&Entry, BadConstantPoolIndex> {
        match self.inner.get(usize::from(index)) {
            Some(Slot::Entry(entry) | Slot::Phantom(entry)) => Ok(entry),
            Some(Slot::Unused) | None => Err(BadConstantPoolIndex(index)),
        }
    }

    /// Checks whether `index` is the reserved second index of a `Long` or `Double`.
    #[must_use]
    pub fn is_phantom(&self, index: u16) -> bool {
        matches!(self.inner.get(usize::from(index)), Some(Slot::Phantom(_)))
    }

    /// Iterates over the entries with their indices, skipping the reserved second indices of
    /// `Long` and `Double` entries.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Entry)> {
        self.inner
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| match slot {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "The pool is decoded from a u16 count, so its length fits in u16."
                )]
                Slot::Entry(entry) => Some((idx as u16, entry)),
                Slot::Unused | Slot::Phantom(_) => None,
            })
    }

    /// Gets the string of a `CONSTANT_Utf8` entry.
    /// # Errors
    /// - [`Error::InvalidIndex`] if `index` is out of range.
    /// - [`Error::MismatchedConstantPoolEntryType`] if the entry is not a `CONSTANT_Utf8`.
    /// - [`Error::BrokenUtf8`] if the entry is not valid modified UTF-8.
    pub fn get_str(&self, index: u16) -> Result<&str, Error> {
        match self.get_java_string(index)? {
            JavaString::ValidUtf8(string) => Ok(string),
            JavaString::InvalidUtf8(_) => Err(Error::BrokenUtf8),
        }
    }

    /// Gets the raw content of a `CONSTANT_Utf8` entry.
    /// # Errors
    /// See [`ConstantPool::get_str`].
    pub fn get_java_string(&self, index: u16) -> Result<&JavaString, Error> {
        let entry = self.get_entry(index)?;
        match entry {
            Entry::Utf8(java_string) => Ok(java_string),
            it => Err(mismatch("CONSTANT_Utf8", it)),
        }
    }

    /// Gets the class referred by a `CONSTANT_Class` entry.
    /// # Errors
    /// See [`ConstantPool::get_str`].
    pub fn get_class_ref(&self, index: u16) -> Result<ClassRef, Error> {
        let entry = self.get_entry(index)?;
        let &Entry::Class { name_index } = entry else {
            return Err(mismatch("CONSTANT_Class", entry));
        };
        let name = self.get_str(name_index)?;
        Ok(ClassRef::new(name))
    }

    /// Gets the name and the descriptor of a `CONSTANT_NameAndType` entry.
    /// # Errors
    /// See [`ConstantPool::get_str`].
    pub fn get_name_and_type(&self, index: u16) -> Result<(&str, &str), Error> {
        let entry = self.get_entry(index)?;
        let &Entry::NameAndType {
            name_index,
            descriptor_index,
        } = entry
        else {
            return Err(mismatch("CONSTANT_NameAndType", entry));
        };
        let name = self.get_str(name_index)?;
        let descriptor = self.get_str(descriptor_index)?;
        Ok((name, descriptor))
    }

    /// Gets the field referred by a `CONSTANT_Fieldref` entry.
    /// # Errors
    /// - See [`ConstantPool::get_str`].
    /// - [`Error::InvalidDescriptor`] if the descriptor is not a field type.
    pub fn get_field_ref(&self, index: u16) -> Result<FieldRef, Error> {
        let entry = self.get_entry(index)?;
        let &Entry::FieldRef {
            class_index,
            name_and_type_index,
        } = entry
        else {
            return Err(mismatch("CONSTANT_Fieldref", entry));
        };
        let owner = self.get_class_ref(class_index)?;
        let (name, descriptor) = self.get_name_and_type(name_and_type_index)?;
        let field_type = FieldType::from_str(descriptor)?;
        Ok(FieldRef {
            owner,
            name: name.to_owned(),
            field_type,
        })
    }

    /// Gets the owner, name, and signature of the method referred by a `CONSTANT_Methodref` or
    /// a `CONSTANT_InterfaceMethodref` entry.
    /// # Errors
    /// - See [`ConstantPool::get_str`].
    /// - [`Error::InvalidDescriptor`] if the descriptor is not a method descriptor.
    pub fn get_method_ref(&self, index: u16) -> Result<MethodRef, Error> {
        let entry = self.get_entry(index)?;
        let (&Entry::MethodRef {
            class_index,
            name_and_type_index,
        }
        | &Entry::InterfaceMethodRef {
            class_index,
            name_and_type_index,
        }) = entry
        else {
            return Err(mismatch(
                "CONSTANT_Methodref | CONSTANT_InterfaceMethodref",
                entry,
            ));
        };
        let owner = self.get_class_ref(class_index)?;
        let (name, descriptor) = self.get_name_and_type(name_and_type_index)?;
        let descriptor = MethodDescriptor::from_str(descriptor)?;
        Ok(MethodRef {
            owner,
            name: name.to_owned(),
            descriptor,
        })
    }

    /// Gets the method handle of a `CONSTANT_MethodHandle` entry.
    /// # Errors
    /// - See [`ConstantPool::get_field_ref`] and [`ConstantPool::get_method_ref`].
    /// - [`Error::MalformedClassFile`] if the reference kind is not in `1..=9`.
    pub fn get_method_handle(&self, index: u16) -> Result<MethodHandle, Error> {
        #[allow(clippy::enum_glob_use)]
        use MethodHandle::*;

        let entry = self.get_entry(index)?;
        let &Entry::MethodHandle {
            reference_kind,
            reference_index: idx,
        } = entry
        else {
            return Err(mismatch("CONSTANT_MethodHandle", entry));
        };
        let handle = match reference_kind {
            1 => RefGetField(self.get_field_ref(idx)?),
            2 => RefGetStatic(self.get_field_ref(idx)?),
            3 => RefPutField(self.get_field_ref(idx)?),
            4 => RefPutStatic(self.get_field_ref(idx)?),
            5 => RefInvokeVirtual(self.get_method_ref(idx)?),
            6 => RefInvokeStatic(self.get_method_ref(idx)?),
            7 => RefInvokeSpecial(self.get_method_ref(idx)?),
            8 => RefNewInvokeSpecial(self.get_method_ref(idx)?),
            9 => RefInvokeInterface(self.get_method_ref(idx)?),
            _ => return Err(Error::MalformedClassFile("Invalid reference kind in method handle")),
        };
        Ok(handle)
    }

    /// Gets the call site described by a `CONSTANT_InvokeDynamic` entry.
    /// # Errors
    /// - See [`ConstantPool::get_name_and_type`].
    /// - [`Error::InvalidDescriptor`] if the descriptor is not a method descriptor.
    pub fn get_invoke_dynamic(&self, index: u16) -> Result<InvokeDynamic, Error> {
        let entry = self.get_entry(index)?;
        let &Entry::InvokeDynamic {
            bootstrap_method_attr_index,
            name_and_type_index,
        } = entry
        else {
            return Err(mismatch("CONSTANT_InvokeDynamic", entry));
        };
        let (name, descriptor) = self.get_name_and_type(name_and_type_index)?;
        let descriptor = MethodDescriptor::from_str(descriptor)?;
        Ok(InvokeDynamic {
            bootstrap_method_attr_index,
            name: name.to_owned(),
            descriptor,
        })
    }

    /// Gets the module referred by a `CONSTANT_Module` entry.
    /// # Errors
    /// See [`ConstantPool::get_str`].
    pub fn get_module_ref(&self, index: u16) -> Result<ModuleRef, Error> {
        let entry = self.get_entry(index)?;
        let &Entry::Module { name_index } = entry else {
            return Err(mismatch("CONSTANT_Module", entry));
        };
        let name = self.get_str(name_index)?.to_owned();
        Ok(ModuleRef(name))
    }

    /// Gets the package referred by a `CONSTANT_Package` entry.
    /// # Errors
    /// See [`ConstantPool::get_str`].
    pub fn get_package_ref(&self, index: u16) -> Result<PackageRef, Error> {
        let entry = self.get_entry(index)?;
        let &Entry::Package { name_index } = entry else {
            return Err(mismatch("CONSTANT_Package", entry));
        };
        let binary_name = self.get_str(name_index)?.to_owned();
        Ok(PackageRef(binary_name))
    }

    /// Gets a loadable constant, e.g., the value of a `ConstantValue` attribute or an argument
    /// of a bootstrap method.
    /// # Errors
    /// - See [`ConstantPool::get_str`] and [`ConstantPool::get_method_handle`].
    /// - [`Error::MismatchedConstantPoolEntryType`] if the entry is not loadable.
    pub fn get_constant_value(&self, index: u16) -> Result<ConstantValue, Error> {
        let entry = self.get_entry(index)?;
        match entry {
            &Entry::Integer(it) => Ok(ConstantValue::Integer(it)),
            &Entry::Long(it) => Ok(ConstantValue::Long(it)),
            &Entry::Float(it) => Ok(ConstantValue::Float(it)),
            &Entry::Double(it) => Ok(ConstantValue::Double(it)),
            &Entry::String { string_index } => self
                .get_java_string(string_index)
                .cloned()
                .map(ConstantValue::String),
            &Entry::MethodType { descriptor_index } => {
                let descriptor = self.get_str(descriptor_index)?;
                let descriptor = MethodDescriptor::from_str(descriptor)?;
                Ok(ConstantValue::MethodType(descriptor))
            }
            Entry::Class { .. } => self.get_class_ref(index).map(ConstantValue::Class),
            Entry::MethodHandle { .. } => self.get_method_handle(index).map(ConstantValue::Handle),
            &Entry::Dynamic {
                bootstrap_method_attr_index,
                name_and_type_index,
            } => {
                let (name, descriptor) = self.get_name_and_type(name_and_type_index)?;
                let field_type = FieldType::from_str(descriptor)?;
                Ok(ConstantValue::Dynamic(
                    bootstrap_method_attr_index,
                    name.to_owned(),
                    field_type,
                ))
            }
            unexpected => Err(mismatch(
                "Integer | Long | Float | Double | String | MethodType | Class | MethodHandle | Dynamic",
                unexpected,
            )),
        }
    }
}

fn mismatch(expected: &'static str, found: &Entry) -> Error {
    Error::MismatchedConstantPoolEntryType {
        expected,
        found: found.constant_kind(),
    }
}

/// An entry in the [`ConstantPool`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Entry {
    /// A UTF-8 string.
    #[doc = see_jvm_spec!(4, 4, 7)]
    Utf8(JavaString),
    /// An integer.
    #[doc = see_jvm_spec!(4, 4, 4)]
    Integer(i32),
    /// A float.
    #[doc = see_jvm_spec!(4, 4, 4)]
    Float(f32),
    /// A long.
    #[doc = see_jvm_spec!(4, 4, 5)]
    Long(i64),
    /// A double.
    #[doc = see_jvm_spec!(4, 4, 5)]
    Double(f64),
    /// A class.
    #[doc = see_jvm_spec!(4, 4, 1)]
    Class {
        /// The index in the constant pool of its binary name.
        name_index: u16,
    },
    /// A string.
    #[doc = see_jvm_spec!(4, 4, 3)]
    String {
        /// The index in the constant pool of its UTF-8 value.
        /// The entry at that index must be a [`Entry::Utf8`].
        string_index: u16,
    },
    /// A field reference.
    #[doc = see_jvm_spec!(4, 4, 2)]
    FieldRef {
        /// The index in the constant pool of the class containing the field.
        /// The entry at that index must be a [`Entry::Class`].
        class_index: u16,
        /// The index in the constant pool of the name and type of the field.
        /// The entry at that index must be a [`Entry::NameAndType`].
        name_and_type_index: u16,
    },
    /// A method reference.
    #[doc = see_jvm_spec!(4, 4, 2)]
    MethodRef {
        /// The index in the constant pool of the class containing the method.
        /// The entry at that index must be a [`Entry::Class`].
        class_index: u16,
        /// The index in the constant pool of the name and type of the method.
        /// The entry at that index must be a [`Entry::NameAndType`].
        name_and_type_index: u16,
    },
    /// An interface method reference.
    #[doc = see_jvm_spec!(4, 4, 2)]
    InterfaceMethodRef {
        /// The index in the constant pool of the interface containing the method.
        /// The entry at that index must be a [`Entry::Class`].
        class_index: u16,
        /// The index in the constant pool of the name and type of the method.
        /// The entry at that index must be a [`Entry::NameAndType`].
        name_and_type_index: u16,
    },
    /// A name and type.
    #[doc = see_jvm_spec!(4, 4, 6)]
    NameAndType {
        /// The index in the constant pool of the UTF-8 string containing the name.
        name_index: u16,
        /// The index in the constant pool of the UTF-8 string containing the descriptor.
        descriptor_index: u16,
    },
    /// A method handle.
    #[doc = see_jvm_spec!(4, 4, 8)]
    MethodHandle {
        /// The kind of method handle.
        reference_kind: u8,
        /// The index in the constant pool of the field or method being handled.
        reference_index: u16,
    },
    /// A method type.
    #[doc = see_jvm_spec!(4, 4, 9)]
    MethodType {
        /// The index in the constant pool of the UTF-8 string containing the descriptor.
        descriptor_index: u16,
    },
    /// A dynamically computed constant.
    #[doc = see_jvm_spec!(4, 4, 10)]
    Dynamic {
        /// The index of the bootstrap method in the bootstrap method table.
        bootstrap_method_attr_index: u16,
        /// The index in the constant pool of the name and type of the constant.
        name_and_type_index: u16,
    },
    /// A call site of an `invokedynamic` instruction.
    #[doc = see_jvm_spec!(4, 4, 10)]
    InvokeDynamic {
        /// The index of the bootstrap method in the bootstrap method table.
        bootstrap_method_attr_index: u16,
        /// The index in the constant pool of the name and type of the call site.
        name_and_type_index: u16,
    },
    /// A module.
    #[doc = see_jvm_spec!(4, 4, 11)]
    Module {
        /// The index in the constant pool of the UTF-8 string containing the name.
        name_index: u16,
    },
    /// A package.
    #[doc = see_jvm_spec!(4, 4, 12)]
    Package {
        /// The index in the constant pool of the UTF-8 string containing the name.
        name_index: u16,
    },
}

impl Entry {
    /// Returns the tag of this constant pool entry.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Utf8(_) => 1,
            Self::Integer(_) => 3,
            Self::Float(_) => 4,
            Self::Long(_) => 5,
            Self::Double(_) => 6,
            Self::Class { .. } => 7,
            Self::String { .. } => 8,
            Self::FieldRef { .. } => 9,
            Self::MethodRef { .. } => 10,
            Self::InterfaceMethodRef { .. } => 11,
            Self::NameAndType { .. } => 12,
            Self::MethodHandle { .. } => 15,
            Self::MethodType { .. } => 16,
            Self::Dynamic { .. } => 17,
            Self::InvokeDynamic { .. } => 18,
            Self::Module { .. } => 19,
            Self::Package { .. } => 20,
        }
    }

    /// Checks whether the entry takes two indices in the constant pool.
    #[must_use]
    pub const fn is_wide(&self) -> bool {
        matches!(self, Self::Long(_) | Self::Double(_))
    }

    /// Gets the kind of this constant pool entry.
    #[must_use]
    pub const fn constant_kind(&self) -> &'static str {
        match self {
            Self::Utf8(_) => "CONSTANT_Utf8",
            Self::Integer(_) => "CONSTANT_Integer",
            Self::Float(_) => "CONSTANT_Float",
            Self::Long(_) => "CONSTANT_Long",
            Self::Double(_) => "CONSTANT_Double",
            Self::Class { .. } => "CONSTANT_Class",
            Self::String { .. } => "CONSTANT_String",
            Self::FieldRef { .. } => "CONSTANT_Fieldref",
            Self::MethodRef { .. } => "CONSTANT_Methodref",
            Self::InterfaceMethodRef { .. } => "CONSTANT_InterfaceMethodref",
            Self::NameAndType { .. } => "CONSTANT_NameAndType",
            Self::MethodHandle { .. } => "CONSTANT_MethodHandle",
            Self::MethodType { .. } => "CONSTANT_MethodType",
            Self::Dynamic { .. } => "CONSTANT_Dynamic",
            Self::InvokeDynamic { .. } => "CONSTANT_InvokeDynamic",
            Self::Module { .. } => "CONSTANT_Module",
            Self::Package { .. } => "CONSTANT_Package",
        }
    }
}
