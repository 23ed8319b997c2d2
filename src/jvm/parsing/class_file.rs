use crate::{
    jvm::{
        Class,
        class::{ConstantPool, JAVA_CLASS_MAGIC, Version},
    },
    macros::malform,
};

use super::{
    Context, Error, ParsingOptions,
    attribute::{Holder, parse_attributes},
    jvm_element_parser::{parse_flags, parse_vec},
    reader_utils::ValueReaderExt,
};

impl Class {
    /// Parses a class file with the default [`ParsingOptions`].
    /// # Errors
    /// See [`Error`] for more information.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        Self::parse_with(bytes, &ParsingOptions::default())
    }

    /// Parses a class file.
    /// The buffer must contain exactly one class file; trailing bytes are rejected.
    /// # Errors
    /// See [`Error`] for more information.
    pub fn parse_with(bytes: &[u8], options: &ParsingOptions) -> Result<Self, Error> {
        let offset = &mut 0;
        let magic: u32 = bytes.take_value(offset)?;
        if options.verify_magic && magic != JAVA_CLASS_MAGIC {
            return Err(Error::NotAClassFile);
        }
        let minor = bytes.take_value(offset)?;
        let major = bytes.take_value(offset)?;
        let constant_pool_count: u16 = bytes.take_value(offset)?;
        let constant_pool = ConstantPool::from_bytes(bytes, offset, constant_pool_count)?;
        let access_flags = parse_flags(bytes, offset)?;
        let this_class = bytes.take_value(offset)?;
        let super_class = bytes.take_value(offset)?;

        let ctx = Context {
            constant_pool: &constant_pool,
            options,
            current_class: constant_pool.get_class_ref(this_class)?,
        };
        let interfaces = parse_vec(bytes, offset, &ctx)?;
        let fields = parse_vec(bytes, offset, &ctx)?;
        let methods = parse_vec(bytes, offset, &ctx)?;
        let attributes = parse_attributes(bytes, offset, &ctx, Holder::Class)?;
        if *offset != bytes.len() {
            malform!("Extra bytes at the end of the class file");
        }
        log::debug!(
            "Parsed class {} (version {}.{}, {} fields, {} methods)",
            ctx.current_class,
            major,
            minor,
            fields.len(),
            methods.len()
        );

        Ok(Class {
            magic,
            version: Version { major, minor },
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }
}
