//! The JVM class model and the decoder that builds it from class files.

pub mod attribute;
pub mod class;
pub mod class_loader;
pub mod code;
pub mod field;
pub mod method;
pub mod parsing;
pub mod references;

pub use class::Class;
pub use field::{ConstantValue, Field, JavaString};
pub use method::Method;
