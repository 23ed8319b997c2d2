//! Activation frames.

use crate::{jvm::Method, types::field_type::FieldType};

use super::{
    ExecutionError,
    value::{Reference, Slot, Value},
};

/// The operand stack of a frame.
/// A `long` or `double` is pushed as two slots, low word first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OperandStack {
    slots: Vec<Slot>,
}

impl OperandStack {
    /// Creates an empty operand stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty operand stack with room for `max_stack` slots.
    #[must_use]
    pub fn with_capacity(max_stack: u16) -> Self {
        Self {
            slots: Vec::with_capacity(max_stack.into()),
        }
    }

    /// Returns the number of slots on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Checks if the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Gets the slot on the top of the stack.
    #[must_use]
    pub fn peek(&self) -> Option<&Slot> {
        self.slots.last()
    }

    /// Pushes a value, taking one or two slots depending on its category.
    pub fn push(&mut self, value: Value) {
        let (first, second) = value.into_slots();
        self.slots.push(first);
        self.slots.extend(second);
    }

    /// Pushes a single slot.
    pub fn push_slot(&mut self, slot: Slot) {
        self.slots.push(slot);
    }

    /// Pops a single slot.
    /// # Errors
    /// - [`ExecutionError::StackUnderflow`] if the stack is empty.
    pub fn pop_slot(&mut self) -> Result<Slot, ExecutionError> {
        self.slots.pop().ok_or(ExecutionError::StackUnderflow)
    }

    /// Pops the value on the top of the stack, reassembling a category 2 value from its two
    /// slots.
    /// # Errors
    /// - [`ExecutionError::StackUnderflow`] if the stack runs out of slots.
    /// - [`ExecutionError::ValueMismatch`] if the top slot is the low word of a category 2 value.
    pub fn pop(&mut self) -> Result<Value, ExecutionError> {
        match self.pop_slot()? {
            Slot::Single(value) => Ok(value),
            high @ Slot::High(..) => {
                let low = self.pop_slot()?;
                Value::from_wide_slots(low, high)
            }
            Slot::Low(..) => Err(ExecutionError::ValueMismatch),
        }
    }

    /// Pops a value that is passed where `field_type` is declared.
    /// The stack is left untouched on error.
    /// # Errors
    /// - [`ExecutionError::StackUnderflow`] if the stack runs out of slots.
    /// - [`ExecutionError::ValueMismatch`] if the value does not conform to `field_type`.
    pub fn pop_as(&mut self, field_type: &FieldType) -> Result<Value, ExecutionError> {
        let width = if field_type.is_wide() { 2 } else { 1 };
        let split = self
            .slots
            .len()
            .checked_sub(width)
            .ok_or(ExecutionError::StackUnderflow)?;
        let value = match &self.slots[split..] {
            [Slot::Single(value)] => *value,
            [low, high] => Value::from_wide_slots(*low, *high)?,
            _ => return Err(ExecutionError::ValueMismatch),
        };
        if !value.conforms_to(field_type) {
            return Err(ExecutionError::ValueMismatch);
        }
        self.slots.truncate(split);
        Ok(value)
    }

    /// Pops a reference.
    /// The stack is left untouched on error.
    /// # Errors
    /// - [`ExecutionError::StackUnderflow`] if the stack is empty.
    /// - [`ExecutionError::ValueMismatch`] if the top slot is not a reference.
    pub fn pop_reference(&mut self) -> Result<Reference, ExecutionError> {
        match self.slots.last() {
            Some(&Slot::Single(Value::Reference(reference))) => {
                self.slots.pop();
                Ok(reference)
            }
            Some(_) => Err(ExecutionError::ValueMismatch),
            None => Err(ExecutionError::StackUnderflow),
        }
    }
}

/// The local variables of a frame.
/// A `long` or `double` at index `n` also takes index `n + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariables {
    slots: Vec<Option<Slot>>,
}

impl LocalVariables {
    /// Creates `max_locals` uninitialized local variables.
    #[must_use]
    pub fn new(max_locals: u16) -> Self {
        Self {
            slots: vec![None; max_locals.into()],
        }
    }

    /// Returns the number of local variable slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Checks if there is no local variable slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Checks if the slot at `index` has been written.
    #[must_use]
    pub fn is_initialized(&self, index: u16) -> bool {
        self.slots
            .get(usize::from(index))
            .is_some_and(Option::is_some)
    }

    fn slot(&self, index: u16) -> Result<Slot, ExecutionError> {
        self.slots
            .get(usize::from(index))
            .ok_or(ExecutionError::LocalIndexOutOfRange(index))?
            .ok_or(ExecutionError::LocalUninitialized(index))
    }

    /// Reads the value at `index`.
    /// # Errors
    /// - [`ExecutionError::LocalIndexOutOfRange`] if `index` is out of range.
    /// - [`ExecutionError::LocalUninitialized`] if the slot has not been written.
    /// - [`ExecutionError::ValueMismatch`] if `index` is the second slot of a category 2 value.
    pub fn get(&self, index: u16) -> Result<Value, ExecutionError> {
        match self.slot(index)? {
            Slot::Single(value) => Ok(value),
            low @ Slot::Low(..) => {
                let high_index = index
                    .checked_add(1)
                    .ok_or(ExecutionError::LocalIndexOutOfRange(index))?;
                Value::from_wide_slots(low, self.slot(high_index)?)
            }
            Slot::High(..) => Err(ExecutionError::ValueMismatch),
        }
    }

    /// Writes `value` at `index`.
    /// Overwriting either half of a category 2 value invalidates the other half.
    /// # Errors
    /// - [`ExecutionError::LocalIndexOutOfRange`] if the value does not fit.
    pub fn set(&mut self, index: u16, value: Value) -> Result<(), ExecutionError> {
        let start = usize::from(index);
        let end = start + value.category().slots();
        if start >= self.slots.len() {
            return Err(ExecutionError::LocalIndexOutOfRange(index));
        }
        if end > self.slots.len() {
            return Err(ExecutionError::LocalIndexOutOfRange(index.saturating_add(1)));
        }
        if let Some(Slot::High(..)) = self.slots[start] {
            if let Some(prev) = start.checked_sub(1) {
                self.slots[prev] = None;
            }
        }
        if let Some(Slot::Low(..)) = self.slots[end - 1] {
            if let Some(next) = self.slots.get_mut(end) {
                *next = None;
            }
        }
        let (first, second) = value.into_slots();
        self.slots[start] = Some(first);
        if let Some(second) = second {
            self.slots[start + 1] = Some(second);
        }
        Ok(())
    }
}

/// The activation record of a method invocation.
#[derive(Debug, Clone)]
pub struct Frame<'m> {
    method: &'m Method,
    local_variables: LocalVariables,
    operand_stack: OperandStack,
}

impl<'m> Frame<'m> {
    /// Creates a frame for `method` with `max_locals` uninitialized local variables.
    /// # Errors
    /// - [`ExecutionError::LocalLimitExceeded`] if `max_locals` cannot hold the arguments.
    pub fn new(method: &'m Method, max_locals: u16) -> Result<Self, ExecutionError> {
        if usize::from(max_locals) < method.argument_slots() {
            return Err(ExecutionError::LocalLimitExceeded);
        }
        let max_stack = method.code().map_or(0, |code| code.max_stack);
        Ok(Self {
            method,
            local_variables: LocalVariables::new(max_locals),
            operand_stack: OperandStack::with_capacity(max_stack),
        })
    }

    /// Creates a frame sized by the `Code` attribute of `method`.
    /// A method without code gets exactly enough local variables for its arguments.
    /// # Errors
    /// See [`Frame::new`].
    pub fn for_method(method: &'m Method) -> Result<Self, ExecutionError> {
        let max_locals = match method.code() {
            Some(code) => code.max_locals,
            None => u16::try_from(method.argument_slots())
                .map_err(|_| ExecutionError::LocalLimitExceeded)?,
        };
        Self::new(method, max_locals)
    }

    /// Gets the method being executed.
    #[must_use]
    pub const fn method(&self) -> &'m Method {
        self.method
    }

    /// Gets the local variables.
    #[must_use]
    pub const fn local_variables(&self) -> &LocalVariables {
        &self.local_variables
    }

    /// Gets the local variables for writing.
    pub const fn local_variables_mut(&mut self) -> &mut LocalVariables {
        &mut self.local_variables
    }

    /// Gets the operand stack.
    #[must_use]
    pub const fn operand_stack(&self) -> &OperandStack {
        &self.operand_stack
    }

    /// Gets the operand stack for pushing and popping.
    pub const fn operand_stack_mut(&mut self) -> &mut OperandStack {
        &mut self.operand_stack
    }
}
