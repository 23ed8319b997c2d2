//! Setting up the frame of an invoked method.

use crate::jvm::Method;

use super::{ExecutionError, Frame, Value};

/// Creates the frame of `callee` and moves its arguments off the operand stack of `caller`.
///
/// The last declared parameter is on the top of the stack. Parameters are written into the
/// local variables of the new frame at descending indices, a `long` or `double` taking two
/// slots. For an instance method, the receiver below the parameters is written at index `0`.
/// On error, the operand stack of `caller` is left as it was.
///
/// # Errors
/// - [`ExecutionError::LocalLimitExceeded`] if the frame of `callee` cannot hold the arguments.
/// - [`ExecutionError::StackUnderflow`] if the operand stack of `caller` runs out of values.
/// - [`ExecutionError::ValueMismatch`] if a value does not match its declared parameter type.
#[instability::unstable(feature = "invocation")]
pub fn prepare_invocation<'m>(
    callee: &'m Method,
    caller: &mut Frame<'_>,
) -> Result<Frame<'m>, ExecutionError> {
    let mut frame = Frame::for_method(callee)?;
    let mut popped = Vec::with_capacity(callee.descriptor.parameters_types.len() + 1);
    let result = marshal_arguments(callee, caller, &mut frame, &mut popped);
    if result.is_err() {
        let stack = caller.operand_stack_mut();
        popped.into_iter().rev().for_each(|it| stack.push(it));
    }
    result.map(|()| frame)
}

fn marshal_arguments(
    callee: &Method,
    caller: &mut Frame<'_>,
    frame: &mut Frame<'_>,
    popped: &mut Vec<Value>,
) -> Result<(), ExecutionError> {
    let stack = caller.operand_stack_mut();
    let mut next_index = callee.argument_slots();
    for param_type in callee.descriptor.parameters_types.iter().rev() {
        let value = stack.pop_as(param_type)?;
        popped.push(value);
        next_index -= value.category().slots();
        let local_index =
            u16::try_from(next_index).map_err(|_| ExecutionError::LocalLimitExceeded)?;
        frame.local_variables_mut().set(local_index, value)?;
    }
    if !callee.is_static() {
        let receiver = stack.pop_reference()?;
        popped.push(Value::Reference(receiver));
        frame
            .local_variables_mut()
            .set(0, Value::Reference(receiver))?;
    }
    log::trace!(
        "Marshaled {} argument slot(s) into {}",
        callee.argument_slots(),
        callee.make_ref()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        jvm::Class,
        runtime::{Reference, Slot},
        tests::ClassBytes,
    };

    const PUBLIC_STATIC: u16 = 0x0009;
    const PUBLIC: u16 = 0x0001;

    fn class_with(methods: &[(u16, &str, &str)]) -> Class {
        let bytes = methods
            .iter()
            .fold(ClassBytes::new("Callee"), |builder, &(flags, name, desc)| {
                builder.method(flags, name, desc, Some((2, 8)))
            })
            .build();
        Class::parse(&bytes).unwrap()
    }

    fn locals(frame: &Frame<'_>, indices: &[u16]) -> Vec<Value> {
        indices
            .iter()
            .map(|&it| frame.local_variables().get(it).unwrap())
            .collect()
    }

    #[test]
    fn static_call() {
        let class = class_with(&[(PUBLIC_STATIC, "add", "(II)V")]);
        let caller_method = &class.methods[0];
        let mut caller = Frame::for_method(caller_method).unwrap();
        caller.operand_stack_mut().push(Value::Int(5));
        caller.operand_stack_mut().push(Value::Int(7));

        let callee = prepare_invocation(&class.methods[0], &mut caller).unwrap();
        assert_eq!(locals(&callee, &[0, 1]), [Value::Int(5), Value::Int(7)]);
        assert!(caller.operand_stack().is_empty());
        assert!(!callee.local_variables().is_initialized(2));
    }

    #[test]
    fn instance_call_writes_receiver_first() {
        let class = class_with(&[(PUBLIC, "set", "(I)V")]);
        let mut caller = Frame::new(&class.methods[0], 8).unwrap();
        let receiver = Value::Reference(Reference::Object(0x2A));
        caller.operand_stack_mut().push(receiver);
        caller.operand_stack_mut().push(Value::Int(5));

        let callee = prepare_invocation(&class.methods[0], &mut caller).unwrap();
        assert_eq!(locals(&callee, &[0, 1]), [receiver, Value::Int(5)]);
        assert!(caller.operand_stack().is_empty());
    }

    #[test]
    fn wide_parameters_take_two_locals() {
        let class = class_with(&[(PUBLIC, "mix", "(JIDLjava/lang/String;)V")]);
        let mut caller = Frame::new(&class.methods[0], 8).unwrap();
        let stack = caller.operand_stack_mut();
        stack.push(Value::Reference(Reference::Object(1)));
        stack.push(Value::Long(-3));
        stack.push(Value::Int(4));
        stack.push(Value::Double(0.5));
        stack.push(Value::Reference(Reference::Null));

        let callee = prepare_invocation(&class.methods[0], &mut caller).unwrap();
        assert_eq!(
            locals(&callee, &[0, 1, 3, 4, 6]),
            [
                Value::Reference(Reference::Object(1)),
                Value::Long(-3),
                Value::Int(4),
                Value::Double(0.5),
                Value::Reference(Reference::Null),
            ]
        );
        assert_eq!(
            callee.local_variables().get(2),
            Err(ExecutionError::ValueMismatch)
        );
    }

    #[test]
    fn failed_marshaling_keeps_the_caller_stack() {
        let class = class_with(&[(PUBLIC, "take", "(FJ)V")]);
        let mut caller = Frame::new(&class.methods[0], 8).unwrap();
        caller.operand_stack_mut().push(Value::Int(1));
        caller.operand_stack_mut().push(Value::Long(2));
        let before = caller.operand_stack().clone();

        assert_eq!(
            prepare_invocation(&class.methods[0], &mut caller).unwrap_err(),
            ExecutionError::ValueMismatch
        );
        assert_eq!(caller.operand_stack(), &before);
        assert!(matches!(caller.operand_stack().peek(), Some(Slot::High(..))));
    }

    #[test]
    fn missing_receiver() {
        let class = class_with(&[(PUBLIC, "run", "()V")]);
        let mut caller = Frame::new(&class.methods[0], 8).unwrap();
        assert_eq!(
            prepare_invocation(&class.methods[0], &mut caller).unwrap_err(),
            ExecutionError::StackUnderflow
        );
    }
}
