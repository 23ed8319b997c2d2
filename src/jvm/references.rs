//! Symbolic references resolved from the constant pool.
//! They name a class, a member, a module, or a package without loading it.

use crate::types::{
    field_type::FieldType,
    method_descriptor::{MethodDescriptor, ReturnType},
};

use super::Method;

/// A class named by its binary name, e.g., `java/lang/Object`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, derive_more::Display)]
#[display("{binary_name}")]
pub struct ClassRef {
    /// The binary name, with `/` separating the package segments.
    pub binary_name: String,
}

impl ClassRef {
    /// Creates a reference to the class with the given binary name.
    pub fn new(binary_name: impl Into<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
        }
    }

    /// Gets the package the class belongs to. The unnamed package has an empty name.
    #[must_use]
    pub fn package(&self) -> PackageRef {
        let package = self
            .binary_name
            .rsplit_once('/')
            .map_or("", |(package, _)| package);
        PackageRef(package.to_owned())
    }
}

/// A field of a class, as named by a `CONSTANT_Fieldref`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, derive_more::Display)]
#[display("{owner}.{name}")]
pub struct FieldRef {
    /// The class declaring the field.
    pub owner: ClassRef,
    /// The name of the field.
    pub name: String,
    /// The declared type.
    pub field_type: FieldType,
}

/// A method of a class or an interface, as named by a `CONSTANT_Methodref` or a
/// `CONSTANT_InterfaceMethodref`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, derive_more::Display)]
#[display("{owner}::{name}{descriptor}")]
pub struct MethodRef {
    /// The class or interface declaring the method.
    pub owner: ClassRef,
    /// The name of the method.
    pub name: String,
    /// The parameter and return types.
    pub descriptor: MethodDescriptor,
}

impl MethodRef {
    /// Checks if the reference names an instance initializer, i.e., the target of
    /// `invokespecial` after `new`.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == Method::CONSTRUCTOR_NAME && self.descriptor.return_type == ReturnType::Void
    }
}

/// A module, named by a `CONSTANT_Module`.
#[derive(Debug, PartialEq, Eq, Clone, derive_more::Display)]
pub struct ModuleRef(pub String);

/// A package, named by its binary name in a `CONSTANT_Package`.
#[derive(Debug, PartialEq, Eq, Clone, derive_more::Display)]
pub struct PackageRef(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        jvm::{
            class::{ConstantPool, constant_pool::Entry},
            parsing::Error,
        },
        tests::{arb_class_name, pool_from_entries, utf8_entry},
        types::field_type::PrimitiveType,
    };
    use proptest::prelude::*;

    fn pool() -> ConstantPool {
        pool_from_entries([
            utf8_entry("org/pkg/Calc"), // 1
            Entry::Class { name_index: 1 },
            utf8_entry("total"),
            utf8_entry("J"),
            Entry::NameAndType {
                name_index: 3,
                descriptor_index: 4,
            }, // 5
            Entry::FieldRef {
                class_index: 2,
                name_and_type_index: 5,
            },
            utf8_entry("<init>"),
            utf8_entry("(I)V"),
            Entry::NameAndType {
                name_index: 7,
                descriptor_index: 8,
            },
            Entry::MethodRef {
                class_index: 2,
                name_and_type_index: 9,
            }, // 10
            utf8_entry("java.base"),
            Entry::Module { name_index: 11 },
            utf8_entry("org/pkg"),
            Entry::Package { name_index: 13 },
        ])
    }

    #[test]
    fn member_refs_from_the_pool() {
        let pool = pool();
        let field = pool.get_field_ref(6).unwrap();
        assert_eq!(field.field_type, FieldType::Base(PrimitiveType::Long));
        assert_eq!(field.to_string(), "org/pkg/Calc.total");

        let method = pool.get_method_ref(10).unwrap();
        assert!(method.is_constructor());
        assert_eq!(method.to_string(), "org/pkg/Calc::<init>(I)V");
        assert!(matches!(
            pool.get_field_ref(10),
            Err(Error::MismatchedConstantPoolEntryType { .. })
        ));
    }

    #[test]
    fn module_and_package_refs() {
        let pool = pool();
        assert_eq!(pool.get_module_ref(12).unwrap().to_string(), "java.base");
        let package = pool.get_package_ref(14).unwrap();
        assert_eq!(package, pool.get_class_ref(2).unwrap().package());
        assert!(pool.get_package_ref(12).is_err());
    }

    #[test]
    fn initializer_with_a_result_is_not_a_constructor() {
        let method = MethodRef {
            owner: ClassRef::new("Calc"),
            name: Method::CONSTRUCTOR_NAME.to_owned(),
            descriptor: "()I".parse().unwrap(),
        };
        assert!(!method.is_constructor());
        assert_eq!(method.owner.package(), PackageRef(String::new()));
    }

    proptest! {
        #[test]
        fn package_is_the_prefix_before_the_simple_name(class_name in arb_class_name()) {
            let PackageRef(package) = ClassRef::new(class_name.as_str()).package();
            let simple_name = class_name[package.len()..].trim_start_matches('/');
            prop_assert!(class_name.starts_with(&package));
            prop_assert!(!simple_name.is_empty());
            prop_assert!(!simple_name.contains('/'));
        }
    }
}
