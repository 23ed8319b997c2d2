use demitasse::{
    jvm::Class,
    runtime::{ExecutionError, Frame, Reference, Value, invocation::prepare_invocation},
};

mod common;

use common::ClassBytes;

fn calculator() -> Class {
    let bytes = ClassBytes::new("org/demo/Calculator")
        .super_class("java/lang/Object")
        .method(0x0009, "main", "([Ljava/lang/String;)V", Some((6, 1)))
        .method(0x0009, "add", "(II)I", Some((2, 2)))
        .method(0x0001, "scale", "(DJ)D", Some((4, 6)))
        .method(0x0109, "hash", "(Ljava/lang/Object;)I", None)
        .build();
    Class::parse(&bytes).unwrap()
}

#[test]
fn static_invocation() {
    let class = calculator();
    let mut caller = Frame::for_method(&class.methods[0]).unwrap();
    caller.operand_stack_mut().push(Value::Int(5));
    caller.operand_stack_mut().push(Value::Int(7));

    let add = class.methods_named("add").next().unwrap();
    let callee = prepare_invocation(add, &mut caller).unwrap();
    assert_eq!(callee.method().name, "add");
    assert_eq!(callee.local_variables().get(0).unwrap(), Value::Int(5));
    assert_eq!(callee.local_variables().get(1).unwrap(), Value::Int(7));
    assert!(caller.operand_stack().is_empty());
}

#[test]
fn instance_invocation_with_wide_arguments() {
    let class = calculator();
    let mut caller = Frame::for_method(&class.methods[0]).unwrap();
    let receiver = Value::Reference(Reference::Object(0x10));
    let stack = caller.operand_stack_mut();
    stack.push(Value::Int(99));
    stack.push(receiver);
    stack.push(Value::Double(f64::from_bits(0x7FF8_0000_0000_0001)));
    stack.push(Value::Long(i64::MIN));

    let scale = class.methods_named("scale").next().unwrap();
    let callee = prepare_invocation(scale, &mut caller).unwrap();
    let locals = callee.local_variables();
    assert_eq!(locals.len(), 6);
    assert_eq!(locals.get(0).unwrap(), receiver);
    let Value::Double(factor) = locals.get(1).unwrap() else {
        panic!("Expected a double");
    };
    assert_eq!(factor.to_bits(), 0x7FF8_0000_0000_0001);
    assert_eq!(locals.get(3).unwrap(), Value::Long(i64::MIN));
    assert!(!locals.is_initialized(5));
    assert_eq!(caller.operand_stack().len(), 1);
    assert_eq!(caller.operand_stack_mut().pop().unwrap(), Value::Int(99));
}

#[test]
fn native_method_frame() {
    let class = calculator();
    let mut caller = Frame::for_method(&class.methods[0]).unwrap();
    caller
        .operand_stack_mut()
        .push(Value::Reference(Reference::Null));
    let hash = class.methods_named("hash").next().unwrap();
    let callee = prepare_invocation(hash, &mut caller).unwrap();
    assert_eq!(callee.local_variables().len(), 1);
    assert_eq!(
        callee.local_variables().get(0).unwrap(),
        Value::Reference(Reference::Null)
    );
}

#[test]
fn argument_type_mismatch() {
    let class = calculator();
    let mut caller = Frame::for_method(&class.methods[0]).unwrap();
    caller.operand_stack_mut().push(Value::Int(1));
    caller.operand_stack_mut().push(Value::Float(2.0));
    let add = class.methods_named("add").next().unwrap();
    assert_eq!(
        prepare_invocation(add, &mut caller).unwrap_err(),
        ExecutionError::ValueMismatch
    );
    assert_eq!(caller.operand_stack().len(), 2);
}
