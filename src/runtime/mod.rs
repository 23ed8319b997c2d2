//! The runtime value model consumed by a bytecode interpreter.
//! Values live in [`Frame`]s, either in the local variables or on the operand stack, where
//! `long` and `double` values take two [`Slot`]s.

pub mod frame;
pub mod invocation;
pub mod value;

pub use frame::{Frame, LocalVariables, OperandStack};
pub use value::{Category, Reference, Slot, Value, WideKind};

/// An error that occurs when values move in or out of a [`Frame`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExecutionError {
    /// Popping an empty operand stack.
    #[error("Trying to pop an empty stack")]
    StackUnderflow,
    /// The slots do not hold a value of the expected kind.
    #[error("Value type in the stack or local variable table mismatch")]
    ValueMismatch,
    /// The local variable index is beyond the max locals of the frame.
    #[error("The local variable index {0} is out of range")]
    LocalIndexOutOfRange(u16),
    /// Reading a local variable that has not been written.
    #[error("The local variable {0} is not initialized")]
    LocalUninitialized(u16),
    /// The max locals of a frame cannot hold the arguments of its method.
    #[error("The local variable table is too small for the arguments")]
    LocalLimitExceeded,
}
