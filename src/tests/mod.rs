use std::num::NonZeroU8;

use proptest::prelude::*;

use crate::{
    jvm::{
        JavaString,
        class::{
            ConstantPool,
            constant_pool::{Entry, Slot},
        },
        references::ClassRef,
    },
    types::field_type::{FieldType, PrimitiveType},
};


pub use class_bytes::ClassBytes;

pub(crate) fn arb_class_name() -> impl Strategy<Value = String> {
    let arb_ident = prop::string::string_regex(r"[a-zA-Z][\w\$_]*").expect("The regex is invalid");
    prop::collection::vec(arb_ident, 1..10).prop_map(|v| v.join("/"))
}

pub(crate) fn arb_non_array_field_type() -> impl Strategy<Value = FieldType> {
    prop_oneof![
        any::<PrimitiveType>().prop_map(FieldType::Base),
        arb_class_name()
            .prop_map(ClassRef::new)
            .prop_map(FieldType::Object),
    ]
}

prop_compose! {
    fn arb_array_field_type()(
        t in arb_non_array_field_type(),
        dim in 1..=u8::MAX
    ) -> FieldType {
        let dim = NonZeroU8::new(dim).expect("The range starts at 1");
        FieldType::array_of(t, dim).expect("A non-array element never overflows")
    }
}

pub(crate) fn arb_field_type() -> impl Strategy<Value = FieldType> {
    prop_oneof![arb_non_array_field_type(), arb_array_field_type()]
}

pub(crate) fn utf8_entry(value: &str) -> Entry {
    Entry::Utf8(JavaString::ValidUtf8(value.to_owned()))
}

/// Builds a constant pool from entries in index order; wide entries take two indices.
pub(crate) fn pool_from_entries<I>(entries: I) -> ConstantPool
where
    I: IntoIterator<Item = Entry>,
{
    let mut inner = vec![Slot::Unused];
    for entry in entries {
        if entry.is_wide() {
            inner.push(Slot::Entry(entry.clone()));
            inner.push(Slot::Phantom(entry));
        } else {
            inner.push(Slot::Entry(entry));
        }
    }
    ConstantPool { inner }
}

/// Encodes an entry the way it appears in a class file.
pub(crate) fn encode_entry(entry: &Entry) -> Vec<u8> {
    let mut bytes = vec![entry.tag()];
    match entry {
        Entry::Utf8(JavaString::ValidUtf8(value)) => {
            let encoded = cesu8::to_java_cesu8(value);
            bytes.extend(u16::try_from(encoded.len()).expect("String too long").to_be_bytes());
            bytes.extend(encoded.iter());
        }
        Entry::Utf8(JavaString::InvalidUtf8(raw)) => {
            bytes.extend(u16::try_from(raw.len()).expect("String too long").to_be_bytes());
            bytes.extend(raw);
        }
        Entry::Integer(it) => bytes.extend(it.to_be_bytes()),
        Entry::Float(it) => bytes.extend(it.to_be_bytes()),
        Entry::Long(it) => bytes.extend(it.to_be_bytes()),
        Entry::Double(it) => bytes.extend(it.to_be_bytes()),
        &Entry::Class { name_index: idx }
        | &Entry::String { string_index: idx }
        | &Entry::MethodType {
            descriptor_index: idx,
        }
        | &Entry::Module { name_index: idx }
        | &Entry::Package { name_index: idx } => bytes.extend(idx.to_be_bytes()),
        &Entry::FieldRef {
            class_index: first,
            name_and_type_index: second,
        }
        | &Entry::MethodRef {
            class_index: first,
            name_and_type_index: second,
        }
        | &Entry::InterfaceMethodRef {
            class_index: first,
            name_and_type_index: second,
        }
        | &Entry::NameAndType {
            name_index: first,
            descriptor_index: second,
        }
        | &Entry::Dynamic {
            bootstrap_method_attr_index: first,
            name_and_type_index: second,
        }
        | &Entry::InvokeDynamic {
            bootstrap_method_attr_index: first,
            name_and_type_index: second,
        } => {
            bytes.extend(first.to_be_bytes());
            bytes.extend(second.to_be_bytes());
        }
        &Entry::MethodHandle {
            reference_kind,
            reference_index,
        } => {
            bytes.push(reference_kind);
            bytes.extend(reference_index.to_be_bytes());
        }
    }
    bytes
}

/// Encodes an attribute with its header.
pub(crate) fn attribute_bytes(name_index: u16, body: &[u8]) -> Vec<u8> {
    let mut bytes = name_index.to_be_bytes().to_vec();
    bytes.extend(u32::try_from(body.len()).expect("Body too long").to_be_bytes());
    bytes.extend(body);
    bytes
}

/// Generates the count and the encoded entries of a well-formed constant pool.
pub(crate) fn arb_constant_pool_bytes() -> impl Strategy<Value = (u16, Vec<u8>)> {
    prop::collection::vec(any::<Entry>(), 0..64).prop_map(|entries| {
        let count = entries
            .iter()
            .map(|it| if it.is_wide() { 2u16 } else { 1 })
            .sum::<u16>()
            + 1;
        let bytes = entries.iter().flat_map(encode_entry).collect();
        (count, bytes)
    })
}
