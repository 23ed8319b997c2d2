//! Method bodies.

use super::attribute::{AttributeMap, LineNumberTableEntry, LocalVariableTableEntry};
use crate::macros::see_jvm_spec;

/// The body of a method, decoded from a `Code` attribute.
/// The instructions are kept as raw bytes.
#[doc = see_jvm_spec!(4, 7, 3)]
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    /// The maximum depth of the operand stack.
    pub max_stack: u16,
    /// The number of local variable slots, including those taken by the arguments.
    pub max_locals: u16,
    /// The bytecode.
    pub instructions: Vec<u8>,
    /// The exception handlers in declaration order.
    pub exception_table: Vec<ExceptionTableEntry>,
    /// The nested attributes, e.g., `LineNumberTable`.
    pub attributes: AttributeMap,
}

impl Code {
    /// Finds the handler for an exception thrown at `pc`.
    /// Handlers are tried in declaration order and the first one that covers `pc` and catches
    /// the exception wins. `is_caught_by` is called with the constant pool index of a handler's
    /// catch type and decides whether the thrown exception is an instance of that class.
    /// Handlers with a catch type of `0` catch everything.
    pub fn find_handler<F>(&self, pc: u16, mut is_caught_by: F) -> Option<&ExceptionTableEntry>
    where
        F: FnMut(u16) -> bool,
    {
        self.exception_table.iter().find(|entry| {
            entry.covers(pc) && (entry.catches_any() || is_caught_by(entry.catch_type))
        })
    }

    /// Gets the source line of the instruction at `pc`, if there is a `LineNumberTable`.
    #[must_use]
    pub fn line_number_at(&self, pc: u16) -> Option<u16> {
        self.attributes
            .line_number_table()?
            .iter()
            .filter(|it| it.start_pc <= pc)
            .max_by_key(|it| it.start_pc)
            .map(|it| it.line_number)
    }

    /// Gets the entries of the `LineNumberTable`.
    #[must_use]
    pub fn line_number_table(&self) -> &[LineNumberTableEntry] {
        self.attributes.line_number_table().unwrap_or_default()
    }

    /// Gets the local variables that occupy `slot` at `pc`.
    pub fn local_variables_at(
        &self,
        pc: u16,
        slot: u16,
    ) -> impl Iterator<Item = &LocalVariableTableEntry> {
        self.attributes
            .local_variable_table()
            .unwrap_or_default()
            .iter()
            .filter(move |it| it.index == slot && it.is_live_at(pc))
    }
}

/// An entry in the exception table of a [`Code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionTableEntry {
    /// The first covered offset, inclusive.
    pub start_pc: u16,
    /// The end of the covered range, exclusive.
    pub end_pc: u16,
    /// The offset of the handler.
    pub handler_pc: u16,
    /// The index in the constant pool of the caught class, or `0` for any exception.
    pub catch_type: u16,
}

impl ExceptionTableEntry {
    /// Checks whether the handler is active at `pc`.
    #[must_use]
    pub const fn covers(&self, pc: u16) -> bool {
        self.start_pc <= pc && pc < self.end_pc
    }

    /// Checks whether the handler catches every exception, as for `finally` blocks.
    #[must_use]
    pub const fn catches_any(&self) -> bool {
        self.catch_type == 0
    }
}
