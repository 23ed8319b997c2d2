use crate::jvm::code::{Code, ExceptionTableEntry};

use super::{
    Context, Error,
    attribute::{Holder, parse_attributes},
    jvm_element_parser::{JvmElement, parse_vec},
    reader_utils::ValueReaderExt,
};

impl JvmElement for Code {
    fn parse(bytes: &[u8], offset: &mut usize, ctx: &Context<'_>) -> Result<Self, Error> {
        let max_stack = bytes.take_value(offset)?;
        let max_locals = bytes.take_value(offset)?;
        let code_length: u32 = bytes.take_value(offset)?;
        let Ok(code_length) = usize::try_from(code_length) else {
            crate::macros::malform!("Code length exceeds the address space");
        };
        let instructions = bytes.take_bytes(offset, code_length)?.to_vec();
        let exception_table = parse_vec(bytes, offset, ctx)?;
        let attributes = parse_attributes(bytes, offset, ctx, Holder::Code)?;
        Ok(Self {
            max_stack,
            max_locals,
            instructions,
            exception_table,
            attributes,
        })
    }
}

impl JvmElement for ExceptionTableEntry {
    fn parse(bytes: &[u8], offset: &mut usize, _ctx: &Context<'_>) -> Result<Self, Error> {
        Ok(Self {
            start_pc: bytes.take_value(offset)?,
            end_pc: bytes.take_value(offset)?,
            handler_pc: bytes.take_value(offset)?,
            catch_type: bytes.take_value(offset)?,
        })
    }
}
