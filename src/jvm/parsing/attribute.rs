use crate::{
    jvm::{
        attribute::{
            Attribute, AttributeMap, BootstrapMethod, EnclosingMethod, InnerClass,
            LineNumberTableEntry, LocalVariableTableEntry, MethodParameter,
        },
        code::Code,
    },
    macros::malform,
};

use super::{
    Context, Error, UnknownAttributePolicy,
    jvm_element_parser::{JvmElement, parse_flags, parse_vec},
    reader_utils::ValueReaderExt,
};

/// The kind of element an attribute table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Holder {
    Class,
    Field,
    Method,
    Code,
}

impl Holder {
    const fn name(self) -> &'static str {
        match self {
            Self::Class => "ClassFile",
            Self::Field => "field_info",
            Self::Method => "method_info",
            Self::Code => "Code",
        }
    }
}

/// Decodes a `u2` count followed by that many attributes.
pub(super) fn parse_attributes(
    bytes: &[u8],
    offset: &mut usize,
    ctx: &Context<'_>,
    holder: Holder,
) -> Result<AttributeMap, Error> {
    let count: u16 = bytes.take_value(offset)?;
    let mut attributes = AttributeMap::default();
    for _ in 0..count {
        let attribute = parse_attribute(bytes, offset, ctx, holder)?;
        attributes.insert(attribute)?;
    }
    Ok(attributes)
}

/// Decodes one attribute. On success, `offset` has advanced by `6 + attribute_length`.
fn parse_attribute(
    bytes: &[u8],
    offset: &mut usize,
    ctx: &Context<'_>,
    holder: Holder,
) -> Result<Attribute, Error> {
    let name_index: u16 = bytes.take_value(offset)?;
    let length: u32 = bytes.take_value(offset)?;
    let Ok(length) = usize::try_from(length) else {
        malform!("Attribute length exceeds the address space");
    };
    let name = ctx.constant_pool.get_str(name_index)?;
    let body = bytes.take_bytes(offset, length)?;
    let body_offset = &mut 0;
    log::trace!("Decoding {name} ({length} bytes) in {}", holder.name());

    let attribute = match name {
        "ConstantValue" => Attribute::ConstantValue(body.take_value(body_offset)?),
        "Code" if holder == Holder::Method => Attribute::Code(Code::parse(body, body_offset, ctx)?),
        "Code" => return Err(Error::UnexpectedAttribute(name.to_owned(), holder.name())),
        "StackMapTable" => {
            *body_offset = body.len();
            Attribute::StackMapTable {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "The body length was read from a u32."
                )]
                length: body.len() as u32,
            }
        }
        "Exceptions" => Attribute::Exceptions(parse_vec(body, body_offset, ctx)?),
        "LineNumberTable" => Attribute::LineNumberTable(parse_vec(body, body_offset, ctx)?),
        "LocalVariableTable" => Attribute::LocalVariableTable(parse_vec(body, body_offset, ctx)?),
        "LocalVariableTypeTable" => {
            Attribute::LocalVariableTypeTable(parse_vec(body, body_offset, ctx)?)
        }
        "SourceFile" => Attribute::SourceFile(body.take_value(body_offset)?),
        "BootstrapMethods" => Attribute::BootstrapMethods(parse_vec(body, body_offset, ctx)?),
        "InnerClasses" => Attribute::InnerClasses(parse_vec(body, body_offset, ctx)?),
        "Synthetic" => Attribute::Synthetic,
        "Deprecated" => Attribute::Deprecated,
        "Signature" => Attribute::Signature(body.take_value(body_offset)?),
        "EnclosingMethod" => Attribute::EnclosingMethod(EnclosingMethod::parse(body, body_offset, ctx)?),
        "SourceDebugExtension" => {
            *body_offset = body.len();
            Attribute::SourceDebugExtension(body.to_vec())
        }
        "MethodParameters" => {
            let count: u8 = body.take_value(body_offset)?;
            let parameters = (0..count)
                .map(|_| MethodParameter::parse(body, body_offset, ctx))
                .collect::<Result<_, _>>()?;
            Attribute::MethodParameters(parameters)
        }
        "NestHost" => Attribute::NestHost(body.take_value(body_offset)?),
        "NestMembers" => Attribute::NestMembers(parse_vec(body, body_offset, ctx)?),
        "PermittedSubclasses" => Attribute::PermittedSubclasses(parse_vec(body, body_offset, ctx)?),
        unknown => match ctx.options.unknown_attributes {
            UnknownAttributePolicy::Reject => {
                return Err(Error::UnknownAttribute(unknown.to_owned()));
            }
            UnknownAttributePolicy::Preserve => {
                *body_offset = body.len();
                Attribute::Unrecognized(unknown.to_owned(), body.to_vec())
            }
        },
    };

    if *body_offset != body.len() {
        malform!("Attribute length does not match its content");
    }
    Ok(attribute)
}

impl JvmElement for LineNumberTableEntry {
    fn parse(bytes: &[u8], offset: &mut usize, _ctx: &Context<'_>) -> Result<Self, Error> {
        Ok(Self {
            start_pc: bytes.take_value(offset)?,
            line_number: bytes.take_value(offset)?,
        })
    }
}

impl JvmElement for LocalVariableTableEntry {
    fn parse(bytes: &[u8], offset: &mut usize, _ctx: &Context<'_>) -> Result<Self, Error> {
        Ok(Self {
            start_pc: bytes.take_value(offset)?,
            length: bytes.take_value(offset)?,
            name_index: bytes.take_value(offset)?,
            descriptor_index: bytes.take_value(offset)?,
            index: bytes.take_value(offset)?,
        })
    }
}

impl JvmElement for BootstrapMethod {
    fn parse(bytes: &[u8], offset: &mut usize, ctx: &Context<'_>) -> Result<Self, Error> {
        let method_ref_index = bytes.take_value(offset)?;
        let arguments = parse_vec(bytes, offset, ctx)?;
        Ok(Self {
            method_ref_index,
            arguments,
        })
    }
}

impl JvmElement for InnerClass {
    fn parse(bytes: &[u8], offset: &mut usize, _ctx: &Context<'_>) -> Result<Self, Error> {
        Ok(Self {
            inner_class_info_index: bytes.take_value(offset)?,
            outer_class_info_index: bytes.take_value(offset)?,
            inner_name_index: bytes.take_value(offset)?,
            access_flags: parse_flags(bytes, offset)?,
        })
    }
}

impl JvmElement for EnclosingMethod {
    fn parse(bytes: &[u8], offset: &mut usize, _ctx: &Context<'_>) -> Result<Self, Error> {
        Ok(Self {
            class_index: bytes.take_value(offset)?,
            method_index: bytes.take_value(offset)?,
        })
    }
}

impl JvmElement for MethodParameter {
    fn parse(bytes: &[u8], offset: &mut usize, _ctx: &Context<'_>) -> Result<Self, Error> {
        Ok(Self {
            name_index: bytes.take_value(offset)?,
            access_flags: parse_flags(bytes, offset)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        jvm::{
            class::constant_pool::Entry,
            parsing::ParsingOptions,
            references::ClassRef,
        },
        tests::{attribute_bytes, pool_from_entries, utf8_entry},
    };

    fn pool() -> crate::jvm::class::ConstantPool {
        pool_from_entries([
            utf8_entry("Code"),            // 1
            utf8_entry("LineNumberTable"), // 2
            utf8_entry("SourceFile"),      // 3
            utf8_entry("Custom"),          // 4
            utf8_entry("StackMapTable"),   // 5
            Entry::Integer(7),             // 6
            utf8_entry("ConstantValue"),   // 7
        ])
    }

    fn decode(
        bytes: &[u8],
        options: &ParsingOptions,
        holder: Holder,
    ) -> Result<(AttributeMap, usize), Error> {
        let constant_pool = pool();
        let ctx = Context {
            constant_pool: &constant_pool,
            options,
            current_class: ClassRef::new("org/pkg/Calc"),
        };
        let mut offset = 0;
        let attributes = parse_attributes(bytes, &mut offset, &ctx, holder)?;
        Ok((attributes, offset))
    }

    fn code_body() -> Vec<u8> {
        let mut body = Vec::new();
        body.extend(2u16.to_be_bytes()); // max_stack
        body.extend(3u16.to_be_bytes()); // max_locals
        body.extend(4u32.to_be_bytes());
        body.extend([0x03, 0x3C, 0x1B, 0xAC]);
        body.extend(2u16.to_be_bytes());
        for (start, end, handler, catch_type) in [(0u16, 2u16, 3u16, 6u16), (0, 4, 3, 0)] {
            for value in [start, end, handler, catch_type] {
                body.extend(value.to_be_bytes());
            }
        }
        let mut line_numbers = 1u16.to_be_bytes().to_vec();
        line_numbers.extend(0u16.to_be_bytes());
        line_numbers.extend(42u16.to_be_bytes());
        body.extend(1u16.to_be_bytes());
        body.extend(attribute_bytes(2, &line_numbers));
        body
    }

    #[test]
    fn code_with_nested_attributes() {
        let attribute = attribute_bytes(1, &code_body());
        let mut bytes = 1u16.to_be_bytes().to_vec();
        bytes.extend(&attribute);
        let (attributes, offset) =
            decode(&bytes, &ParsingOptions::default(), Holder::Method).unwrap();
        assert_eq!(offset, 2 + attribute.len());
        assert_eq!(attribute.len(), 6 + code_body().len());
        let code = attributes.code().unwrap();
        assert_eq!((code.max_stack, code.max_locals), (2, 3));
        assert_eq!(code.instructions, [0x03, 0x3C, 0x1B, 0xAC]);
        assert_eq!(code.exception_table.len(), 2);
        assert_eq!(code.exception_table[0].catch_type, 6);
        assert_eq!(code.exception_table[1].end_pc, 4);
        assert_eq!(code.line_number_at(3), Some(42));
    }

    #[test]
    fn code_outside_method() {
        let mut bytes = 1u16.to_be_bytes().to_vec();
        bytes.extend(attribute_bytes(1, &code_body()));
        assert!(matches!(
            decode(&bytes, &ParsingOptions::default(), Holder::Field),
            Err(Error::UnexpectedAttribute(name, "field_info")) if name == "Code"
        ));
    }

    #[test]
    fn stack_map_table_is_skipped() {
        let mut bytes = 2u16.to_be_bytes().to_vec();
        bytes.extend(attribute_bytes(5, &[0xFF, 0x00, 0x01, 0x02, 0x03]));
        bytes.extend(attribute_bytes(3, &4u16.to_be_bytes()));
        let (attributes, offset) =
            decode(&bytes, &ParsingOptions::default(), Holder::Code).unwrap();
        assert_eq!(offset, bytes.len());
        assert_eq!(
            attributes.get("StackMapTable"),
            Some(&Attribute::StackMapTable { length: 5 })
        );
        assert_eq!(attributes.source_file_index(), Some(4));
    }

    #[test]
    fn unknown_attribute_policies() {
        let mut bytes = 1u16.to_be_bytes().to_vec();
        bytes.extend(attribute_bytes(4, &[1, 2, 3]));
        assert!(matches!(
            decode(&bytes, &ParsingOptions::default(), Holder::Class),
            Err(Error::UnknownAttribute(name)) if name == "Custom"
        ));
        let options =
            ParsingOptions::default().unknown_attributes(UnknownAttributePolicy::Preserve);
        let (attributes, offset) = decode(&bytes, &options, Holder::Class).unwrap();
        assert_eq!(offset, bytes.len());
        assert_eq!(
            attributes.get("Custom"),
            Some(&Attribute::Unrecognized("Custom".to_owned(), vec![1, 2, 3]))
        );
    }

    #[test]
    fn length_mismatch() {
        let mut bytes = 1u16.to_be_bytes().to_vec();
        bytes.extend(attribute_bytes(7, &[0, 6, 0]));
        assert!(matches!(
            decode(&bytes, &ParsingOptions::default(), Holder::Field),
            Err(Error::MalformedClassFile(_))
        ));
        let mut bytes = 1u16.to_be_bytes().to_vec();
        bytes.extend(attribute_bytes(7, &[0]));
        assert!(matches!(
            decode(&bytes, &ParsingOptions::default(), Holder::Field),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn declared_length_past_the_buffer() {
        let mut bytes = 1u16.to_be_bytes().to_vec();
        bytes.extend(7u16.to_be_bytes());
        bytes.extend(100u32.to_be_bytes());
        bytes.extend([0, 6]);
        assert!(matches!(
            decode(&bytes, &ParsingOptions::default(), Holder::Field),
            Err(Error::OutOfRange { .. })
        ));
    }

    fn line_numbers(entries: &[(u16, u16)]) -> Vec<u8> {
        let count = u16::try_from(entries.len()).unwrap();
        let mut body = count.to_be_bytes().to_vec();
        for &(start_pc, line) in entries {
            body.extend(start_pc.to_be_bytes());
            body.extend(line.to_be_bytes());
        }
        attribute_bytes(2, &body)
    }

    #[test]
    fn line_numbers_split_across_tables() {
        let mut body = Vec::new();
        body.extend(1u16.to_be_bytes()); // max_stack
        body.extend(1u16.to_be_bytes()); // max_locals
        body.extend(6u32.to_be_bytes());
        body.extend([0x04, 0x3C, 0x05, 0x3D, 0x1B, 0xAC]);
        body.extend(0u16.to_be_bytes());
        body.extend(2u16.to_be_bytes());
        body.extend(line_numbers(&[(4, 12), (5, 13)]));
        body.extend(line_numbers(&[(0, 10), (2, 11)]));
        let mut bytes = 1u16.to_be_bytes().to_vec();
        bytes.extend(attribute_bytes(1, &body));

        let (attributes, offset) =
            decode(&bytes, &ParsingOptions::default(), Holder::Method).unwrap();
        assert_eq!(offset, bytes.len());
        let code = attributes.code().unwrap();
        assert_eq!(code.attributes.len(), 1);
        assert_eq!(code.line_number_table().len(), 4);
        assert_eq!(code.line_number_at(0), Some(10));
        assert_eq!(code.line_number_at(3), Some(11));
        assert_eq!(code.line_number_at(4), Some(12));
        assert_eq!(code.line_number_at(5), Some(13));
    }

    #[test]
    fn duplicate_attribute() {
        let mut bytes = 2u16.to_be_bytes().to_vec();
        bytes.extend(attribute_bytes(7, &6u16.to_be_bytes()));
        bytes.extend(attribute_bytes(7, &6u16.to_be_bytes()));
        assert!(matches!(
            decode(&bytes, &ParsingOptions::default(), Holder::Field),
            Err(Error::DuplicateAttribute(name)) if name == "ConstantValue"
        ));
    }
}
