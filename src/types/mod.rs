//! Module containing the APIs for the JVM type system.
pub mod field_type;
pub mod method_descriptor;

/// Trait for types that have a descriptor.
pub trait Descriptor {
    /// Returns the descriptor of the type.
    fn descriptor(&self) -> String;
}

/// An error indicating that a descriptor string does not follow the descriptor grammar.
#[derive(Debug, PartialEq, Eq, Clone, thiserror::Error)]
pub enum InvalidDescriptor {
    /// A type starts with a character that is not part of the grammar.
    #[error("Unknown signature character {0:?}")]
    UnknownSignatureChar(char),
    /// The descriptor is structurally broken, e.g., a method descriptor without `)`.
    #[error("Malformed descriptor {0:?}")]
    Malformed(String),
}
