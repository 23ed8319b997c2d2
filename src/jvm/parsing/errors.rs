use crate::{jvm::class::constant_pool::BadConstantPoolIndex, types::InvalidDescriptor};

/// An error that occurs when parsing a Java class file.
/// Any error aborts the whole parse; no partially built class is returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A read runs past the end of the buffer.
    #[error("Reading {length} bytes at offset {offset} exceeds the buffer of {available} bytes")]
    OutOfRange {
        /// The offset where the read starts.
        offset: usize,
        /// The number of bytes requested.
        length: usize,
        /// The length of the buffer.
        available: usize,
    },
    /// The constant pool index does not point to an entry.
    #[error("Invalid constant pool index: {0}")]
    InvalidIndex(#[from] BadConstantPoolIndex),
    /// The constant pool contains an entry whose tag cannot be recognized.
    #[error("Unknown constant pool tag {0}")]
    UnknownConstantTag(u8),
    /// The attribute table contains an attribute whose name cannot be recognized.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    /// A field or method descriptor does not follow the descriptor grammar.
    #[error("Fail to parse descriptor: {0}")]
    InvalidDescriptor(#[from] InvalidDescriptor),
    /// The constant pool index does not point to the desired kind of entry.
    #[error("Mismatched constant pool entry, expected {expected}, but found {found}")]
    MismatchedConstantPoolEntryType {
        /// The kind of the constant pool entry that was expected.
        expected: &'static str,
        /// The kind of the constant pool entry that was found.
        found: &'static str,
    },
    /// A string used to name a JVM element is not valid modified UTF-8.
    #[error("Invalid UTF-8 string")]
    BrokenUtf8,
    /// An attribute appears more than once on the same holder.
    #[error("Duplicated attribute {0}")]
    DuplicateAttribute(String),
    /// An attribute appears on a holder that cannot carry it.
    #[error("Attribute {0} is not allowed in {1}")]
    UnexpectedAttribute(String, &'static str),
    /// The buffer does not start with the class file magic number.
    #[error("The buffer does not contain a Java class file")]
    NotAClassFile,
    /// The format of the class file is invalid.
    #[error("MalformedClassFile: {0}")]
    MalformedClassFile(&'static str),
}
