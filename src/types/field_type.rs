//! Field types and the recursive-descent parser for field descriptors.

use std::{
    fmt::Display,
    num::NonZeroU8,
    str::{Chars, FromStr},
};

use itertools::Itertools;

use crate::{jvm::references::ClassRef, macros::see_jvm_spec};

use super::{Descriptor, InvalidDescriptor};

/// A primitive type in Java.
#[doc = see_jvm_spec!(4, 3, 2)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, derive_more::Display)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum PrimitiveType {
    /// The `boolean` type.
    #[display("boolean")]
    Boolean,
    /// The `char` type.
    #[display("char")]
    Char,
    /// The `float` type.
    #[display("float")]
    Float,
    /// The `double` type.
    #[display("double")]
    Double,
    /// The `byte` type.
    #[display("byte")]
    Byte,
    /// The `short` type.
    #[display("short")]
    Short,
    /// The `int` type.
    #[display("int")]
    Int,
    /// The `long` type.
    #[display("long")]
    Long,
}

impl PrimitiveType {
    /// Returns the character that denotes the type in descriptors.
    #[must_use]
    pub const fn descriptor_char(self) -> char {
        match self {
            Self::Boolean => 'Z',
            Self::Char => 'C',
            Self::Float => 'F',
            Self::Double => 'D',
            Self::Byte => 'B',
            Self::Short => 'S',
            Self::Int => 'I',
            Self::Long => 'J',
        }
    }

    /// Checks whether values of the type occupy two slots (`long` and `double`).
    #[must_use]
    pub const fn is_wide(self) -> bool {
        matches!(self, Self::Long | Self::Double)
    }
}

impl TryFrom<char> for PrimitiveType {
    type Error = InvalidDescriptor;

    fn try_from(descriptor: char) -> Result<Self, Self::Error> {
        match descriptor {
            'Z' => Ok(Self::Boolean),
            'C' => Ok(Self::Char),
            'F' => Ok(Self::Float),
            'D' => Ok(Self::Double),
            'B' => Ok(Self::Byte),
            'S' => Ok(Self::Short),
            'I' => Ok(Self::Int),
            'J' => Ok(Self::Long),
            it => Err(InvalidDescriptor::UnknownSignatureChar(it)),
        }
    }
}

/// The type of a field, a parameter, or a local variable.
#[doc = see_jvm_spec!(4, 3, 2)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum FieldType {
    /// A primitive type.
    Base(PrimitiveType),
    /// An instance of the referenced class.
    Object(ClassRef),
    /// An array type.
    Array(ArrayType),
}

/// An array type.
/// The dimension count and the element type are kept once for the whole array, so the element
/// type is never itself an array.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct ArrayType {
    dimensions: NonZeroU8,
    element: Box<FieldType>,
}

impl ArrayType {
    /// Returns the number of dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> NonZeroU8 {
        self.dimensions
    }

    /// Returns the innermost element type.
    #[must_use]
    pub fn element(&self) -> &FieldType {
        &self.element
    }

    /// Returns the type of the values stored in the array, i.e., with one dimension removed.
    #[must_use]
    pub fn component_type(&self) -> FieldType {
        match NonZeroU8::new(self.dimensions.get() - 1) {
            Some(dimensions) => FieldType::Array(ArrayType {
                dimensions,
                element: self.element.clone(),
            }),
            None => self.element.as_ref().clone(),
        }
    }
}

impl FieldType {
    /// Creates an array type with `dimensions` more dimensions than `element`.
    /// Returns [`None`] if the result would exceed 255 dimensions.
    #[must_use]
    pub fn array_of(element: FieldType, dimensions: NonZeroU8) -> Option<Self> {
        let (dimensions, element) = match element {
            FieldType::Array(ArrayType {
                dimensions: inner,
                element,
            }) => (inner.checked_add(dimensions.get())?, element),
            it => (dimensions, Box::new(it)),
        };
        Some(Self::Array(ArrayType {
            dimensions,
            element,
        }))
    }

    /// Creates an array type whose component type is `self`.
    /// Returns [`None`] if the result would exceed 255 dimensions.
    #[must_use]
    pub fn into_array_type(self) -> Option<Self> {
        Self::array_of(self, NonZeroU8::MIN)
    }

    /// Checks whether values of the type occupy two slots (`long` and `double`).
    #[must_use]
    pub const fn is_wide(&self) -> bool {
        matches!(self, Self::Base(it) if it.is_wide())
    }

    /// Parses one type starting with `prefix`, consuming its remaining characters from
    /// `remaining`. For an input as follows.
    /// ```text
    ///   [      [Ljava/lang/String;IJ)V
    ///   ^      ^
    ///   prefix remaining
    /// ```
    /// It returns a two-dimensional array of `java/lang/String` and leaves `remaining` at `IJ)V`.
    pub(crate) fn parse_prefixed(
        prefix: char,
        remaining: &mut Chars<'_>,
    ) -> Result<Self, InvalidDescriptor> {
        match prefix {
            'L' => {
                let binary_name: String = remaining.take_while_ref(|c| *c != ';').collect();
                match remaining.next() {
                    Some(';') if !binary_name.is_empty() => Ok(Self::Object(ClassRef::new(binary_name))),
                    _ => Err(InvalidDescriptor::Malformed(format!("L{binary_name}"))),
                }
            }
            '[' => {
                let mut dimensions = NonZeroU8::MIN;
                let element_prefix = loop {
                    match remaining.next() {
                        Some('[') => {
                            dimensions = dimensions.checked_add(1).ok_or_else(|| {
                                InvalidDescriptor::Malformed(
                                    "array type with more than 255 dimensions".to_owned(),
                                )
                            })?;
                        }
                        Some('V') => {
                            return Err(InvalidDescriptor::Malformed(
                                "array of void".to_owned(),
                            ));
                        }
                        Some(it) => break it,
                        None => {
                            return Err(InvalidDescriptor::Malformed(
                                "array without element type".to_owned(),
                            ));
                        }
                    }
                };
                let element = Self::parse_prefixed(element_prefix, remaining)?;
                Ok(Self::Array(ArrayType {
                    dimensions,
                    element: Box::new(element),
                }))
            }
            'V' => Err(InvalidDescriptor::Malformed(
                "void is not a field type".to_owned(),
            )),
            it => PrimitiveType::try_from(it).map(Self::Base),
        }
    }
}

impl FromStr for FieldType {
    type Err = InvalidDescriptor;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        let mut chars = descriptor.chars();
        let prefix = chars
            .next()
            .ok_or_else(|| InvalidDescriptor::Malformed(descriptor.to_owned()))?;
        let field_type = Self::parse_prefixed(prefix, &mut chars)?;
        if chars.as_str().is_empty() {
            Ok(field_type)
        } else {
            Err(InvalidDescriptor::Malformed(descriptor.to_owned()))
        }
    }
}

impl Descriptor for FieldType {
    fn descriptor(&self) -> String {
        match self {
            Self::Base(it) => it.descriptor_char().to_string(),
            Self::Object(ClassRef { binary_name }) => format!("L{binary_name};"),
            Self::Array(ArrayType {
                dimensions,
                element,
            }) => {
                let brackets = "[".repeat(usize::from(dimensions.get()));
                format!("{brackets}{}", element.descriptor())
            }
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base(it) => it.fmt(f),
            Self::Object(it) => write!(f, "{}", it.binary_name.replace('/', ".")),
            Self::Array(ArrayType {
                dimensions,
                element,
            }) => {
                write!(f, "{element}")?;
                (0..dimensions.get()).try_for_each(|_| write!(f, "[]"))
            }
        }
    }
}
