//! The decoder for the JVM class file format.
//!
//! A class file is decoded in one forward pass over a buffer that is fully resident in memory.
//! Any error aborts the whole parse.

mod attribute;
mod class_file;
mod code;
mod constant_pool;
mod errors;
mod field_info;
mod jvm_element_parser;
mod method_info;
pub mod reader_utils;

pub use errors::Error;

use super::{class::ConstantPool, references::ClassRef};

/// What to do with an attribute whose name the decoder does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownAttributePolicy {
    /// Fail the parse with [`Error::UnknownAttribute`].
    #[default]
    Reject,
    /// Keep the raw body as an [`Attribute::Unrecognized`](crate::jvm::attribute::Attribute::Unrecognized).
    Preserve,
}

/// Options that control how strictly a class file is decoded.
/// The default is the strict behavior: unknown attributes are rejected and the magic number is
/// recorded but not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsingOptions {
    /// The treatment of unrecognized attributes.
    pub unknown_attributes: UnknownAttributePolicy,
    /// Whether to fail with [`Error::NotAClassFile`] when the magic number is not `0xCAFEBABE`.
    pub verify_magic: bool,
}

impl ParsingOptions {
    /// Sets the treatment of unrecognized attributes.
    #[must_use]
    pub const fn unknown_attributes(mut self, policy: UnknownAttributePolicy) -> Self {
        self.unknown_attributes = policy;
        self
    }

    /// Sets whether the magic number is checked.
    #[must_use]
    pub const fn verify_magic(mut self, verify: bool) -> Self {
        self.verify_magic = verify;
        self
    }
}

/// The state shared by the decoders of the members and attributes of one class.
#[derive(Debug)]
pub(crate) struct Context<'a> {
    pub constant_pool: &'a ConstantPool,
    pub options: &'a ParsingOptions,
    /// The class being decoded.
    pub current_class: ClassRef,
}
