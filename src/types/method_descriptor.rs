//! Non-generic JVM method descriptors.

use std::{fmt::Display, str::FromStr};

use itertools::Itertools;

use crate::macros::see_jvm_spec;

use super::{Descriptor, InvalidDescriptor, field_type::FieldType};

/// The descriptor of a method.
/// Consists of the parameters types and the return type.
#[doc = see_jvm_spec!(4, 3, 3)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct MethodDescriptor {
    /// The type of the parameters.
    pub parameters_types: Vec<FieldType>,
    /// The return type.
    pub return_type: ReturnType,
}

/// Denotes the return type of a method.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum ReturnType {
    /// The method returns a specific type.
    Some(FieldType),
    /// The return type of the method is `void`.
    Void,
}

impl MethodDescriptor {
    /// Returns the number of local variable slots the parameters occupy, not counting the
    /// receiver of an instance method.
    #[must_use]
    pub fn argument_slots(&self) -> usize {
        self.parameters_types
            .iter()
            .map(|it| if it.is_wide() { 2 } else { 1 })
            .sum()
    }
}

impl FromStr for MethodDescriptor {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidDescriptor::Malformed(descriptor.to_owned());
        let mut chars = descriptor.chars();
        if chars.next() != Some('(') {
            return Err(malformed());
        }
        let mut parameters_types = Vec::new();
        loop {
            match chars.next() {
                Some(')') => break,
                Some(prefix) => parameters_types.push(FieldType::parse_prefixed(prefix, &mut chars)?),
                None => return Err(malformed()),
            }
        }
        let return_type = match chars.as_str() {
            "" => return Err(malformed()),
            remaining => ReturnType::from_str(remaining)?,
        };
        Ok(Self {
            parameters_types,
            return_type,
        })
    }
}

impl FromStr for ReturnType {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        if descriptor == "V" {
            Ok(ReturnType::Void)
        } else {
            FieldType::from_str(descriptor).map(ReturnType::Some)
        }
    }
}

impl Descriptor for ReturnType {
    fn descriptor(&self) -> String {
        match self {
            ReturnType::Some(it) => it.descriptor(),
            ReturnType::Void => "V".to_owned(),
        }
    }
}

impl Descriptor for MethodDescriptor {
    fn descriptor(&self) -> String {
        format!(
            "({}){}",
            self.parameters_types.iter().map(Descriptor::descriptor).join(""),
            self.return_type.descriptor()
        )
    }
}

impl Display for ReturnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnType::Some(t) => t.fmt(f),
            ReturnType::Void => write!(f, "void"),
        }
    }
}

impl Display for MethodDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    use crate::{
        jvm::references::ClassRef,
        tests::arb_field_type,
        types::field_type::PrimitiveType,
    };

    const MAX_PARAMS: usize = 10;

    fn arb_return_type() -> impl Strategy<Value = ReturnType> {
        prop_oneof![
            Just(ReturnType::Void),
            arb_field_type().prop_map(ReturnType::Some),
        ]
    }

    #[test]
    fn mixed_parameters() {
        let parsed: MethodDescriptor = "(IJLjava/lang/String;)V".parse().unwrap();
        assert_eq!(
            parsed.parameters_types,
            vec![
                FieldType::Base(PrimitiveType::Int),
                FieldType::Base(PrimitiveType::Long),
                FieldType::Object(ClassRef::new("java/lang/String")),
            ]
        );
        assert_eq!(parsed.return_type, ReturnType::Void);
        assert_eq!(parsed.argument_slots(), 4);
    }

    #[test]
    fn array_parameters_and_return() {
        let parsed: MethodDescriptor = "([[I[Ljava/lang/Object;D)[B".parse().unwrap();
        assert_eq!(parsed.parameters_types.len(), 3);
        assert_eq!(parsed.return_type, ReturnType::Some("[B".parse().unwrap()));
        assert_eq!(parsed.argument_slots(), 4);
    }

    #[test]
    fn no_parameters() {
        let parsed: MethodDescriptor = "()Ljava/lang/Object;".parse().unwrap();
        assert!(parsed.parameters_types.is_empty());
        assert_eq!(parsed.to_string(), "()Ljava/lang/Object;");
    }

    #[test]
    fn empty_desc() {
        assert!(MethodDescriptor::from_str("").is_err());
    }

    #[test]
    fn missing_open_paren() {
        assert!(MethodDescriptor::from_str("I)V").is_err());
    }

    #[test]
    fn missing_close_paren() {
        assert_eq!(
            MethodDescriptor::from_str("(II"),
            Err(InvalidDescriptor::Malformed("(II".to_owned()))
        );
    }

    #[test]
    fn incomplete_return_type() {
        assert!(MethodDescriptor::from_str("()Ljava/lang").is_err());
    }

    #[test]
    fn missing_return_type() {
        assert!(MethodDescriptor::from_str("(I)").is_err());
    }

    #[test]
    fn missing_semicolon() {
        assert!(MethodDescriptor::from_str("(I[Ljava/lang/StringJ)V").is_err());
    }

    #[test]
    fn void_parameter() {
        assert!(MethodDescriptor::from_str("(V[Ljava/lang/String;J)V").is_err());
    }

    #[test]
    fn unknown_parameter_char() {
        assert_eq!(
            MethodDescriptor::from_str("(IX)V"),
            Err(InvalidDescriptor::UnknownSignatureChar('X'))
        );
    }

    proptest! {
        #[test]
        fn method_desc_from_str(
            params in prop::collection::vec(arb_field_type(), 0..MAX_PARAMS),
            ret in arb_return_type(),
        ) {
            let descriptor = format!(
                "({}){}",
                params.iter().map(Descriptor::descriptor).join(""),
                ret.descriptor()
            );
            let parsed =
                MethodDescriptor::from_str(&descriptor).expect("Failed to parse method descriptor");
            prop_assert_eq!(parsed.descriptor(), descriptor);
            prop_assert_eq!(parsed.return_type, ret);
            prop_assert_eq!(parsed.parameters_types, params);
        }

        #[test]
        fn too_many_return_type(
            params in prop::collection::vec(arb_field_type(), 0..MAX_PARAMS),
            rets in prop::collection::vec(arb_return_type(), 2..5),
        ) {
            let descriptor = format!(
                "({}){}",
                params.iter().map(Descriptor::descriptor).join(""),
                rets.iter().map(ReturnType::descriptor).join(""),
            );
            prop_assert!(MethodDescriptor::from_str(&descriptor).is_err());
        }
    }
}
