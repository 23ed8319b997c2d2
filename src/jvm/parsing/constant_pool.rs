use crate::jvm::{
    JavaString,
    class::constant_pool::{ConstantPool, Entry, Slot},
};

use super::{Error, reader_utils::ValueReaderExt};

impl ConstantPool {
    /// Decodes `count - 1` slots of a constant pool starting at `offset`.
    /// `count` is the `constant_pool_count` item of the class file, i.e., the largest valid index
    /// plus one. On success, `offset` points right after the last entry.
    /// # Errors
    /// - [`Error::UnknownConstantTag`] if an entry has an unrecognized tag.
    /// - [`Error::MalformedClassFile`] if `count` is `0`, or if a `Long` or `Double` occupies the
    ///   last index.
    /// - [`Error::OutOfRange`] if the buffer ends in the middle of an entry.
    pub fn from_bytes(bytes: &[u8], offset: &mut usize, count: u16) -> Result<Self, Error> {
        if count == 0 {
            crate::macros::malform!("Constant pool count must be at least 1");
        }
        let mut inner = Vec::with_capacity(usize::from(count));
        inner.push(Slot::Unused);
        while inner.len() < usize::from(count) {
            let entry = Entry::from_bytes(bytes, offset)?;
            log::trace!("Constant pool #{}: {entry:?}", inner.len());
            if entry.is_wide() {
                if inner.len() + 1 >= usize::from(count) {
                    crate::macros::malform!("Long or Double entry at the last constant pool index");
                }
                inner.push(Slot::Entry(entry.clone()));
                inner.push(Slot::Phantom(entry));
            } else {
                inner.push(Slot::Entry(entry));
            }
        }
        Ok(Self { inner })
    }
}

impl Entry {
    fn from_bytes(bytes: &[u8], offset: &mut usize) -> Result<Self, Error> {
        let tag: u8 = bytes.take_value(offset)?;
        let entry = match tag {
            1 => {
                let length: u16 = bytes.take_value(offset)?;
                let content = bytes.take_bytes(offset, usize::from(length))?;
                Self::Utf8(decode_java_string(content))
            }
            3 => Self::Integer(bytes.take_value(offset)?),
            4 => Self::Float(bytes.take_value(offset)?),
            5 => Self::Long(bytes.take_value(offset)?),
            6 => Self::Double(bytes.take_value(offset)?),
            7 => Self::Class {
                name_index: bytes.take_value(offset)?,
            },
            8 => Self::String {
                string_index: bytes.take_value(offset)?,
            },
            9 => Self::FieldRef {
                class_index: bytes.take_value(offset)?,
                name_and_type_index: bytes.take_value(offset)?,
            },
            10 => Self::MethodRef {
                class_index: bytes.take_value(offset)?,
                name_and_type_index: bytes.take_value(offset)?,
            },
            11 => Self::InterfaceMethodRef {
                class_index: bytes.take_value(offset)?,
                name_and_type_index: bytes.take_value(offset)?,
            },
            12 => Self::NameAndType {
                name_index: bytes.take_value(offset)?,
                descriptor_index: bytes.take_value(offset)?,
            },
            15 => Self::MethodHandle {
                reference_kind: bytes.take_value(offset)?,
                reference_index: bytes.take_value(offset)?,
            },
            16 => Self::MethodType {
                descriptor_index: bytes.take_value(offset)?,
            },
            17 => Self::Dynamic {
                bootstrap_method_attr_index: bytes.take_value(offset)?,
                name_and_type_index: bytes.take_value(offset)?,
            },
            18 => Self::InvokeDynamic {
                bootstrap_method_attr_index: bytes.take_value(offset)?,
                name_and_type_index: bytes.take_value(offset)?,
            },
            19 => Self::Module {
                name_index: bytes.take_value(offset)?,
            },
            20 => Self::Package {
                name_index: bytes.take_value(offset)?,
            },
            unknown => return Err(Error::UnknownConstantTag(unknown)),
        };
        Ok(entry)
    }
}

/// Decodes the modified UTF-8 used by class files, keeping the raw bytes when they are not
/// well formed so that a pool with an unused broken string still parses.
fn decode_java_string(content: &[u8]) -> JavaString {
    match cesu8::from_java_cesu8(content) {
        Ok(decoded) => JavaString::ValidUtf8(decoded.into_owned()),
        Err(_) => JavaString::InvalidUtf8(content.to_vec()),
    }
}
