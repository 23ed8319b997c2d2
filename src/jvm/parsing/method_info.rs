use std::str::FromStr;

use crate::{jvm::Method, types::method_descriptor::MethodDescriptor};

use super::{
    Context, Error,
    attribute::{Holder, parse_attributes},
    jvm_element_parser::{JvmElement, parse_flags},
    reader_utils::ValueReaderExt,
};

impl JvmElement for Method {
    fn parse(bytes: &[u8], offset: &mut usize, ctx: &Context<'_>) -> Result<Self, Error> {
        let access_flags = parse_flags(bytes, offset)?;
        let name_index = bytes.take_value(offset)?;
        let descriptor_index = bytes.take_value(offset)?;
        let name = ctx.constant_pool.get_str(name_index)?.to_owned();
        let descriptor = ctx.constant_pool.get_str(descriptor_index)?;
        let descriptor = MethodDescriptor::from_str(descriptor)?;
        let attributes = parse_attributes(bytes, offset, ctx, Holder::Method)?;
        Ok(Method {
            access_flags,
            name_index,
            descriptor_index,
            name,
            descriptor,
            owner: ctx.current_class.clone(),
            attributes,
        })
    }
}
