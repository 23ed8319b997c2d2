use bitflags::Flags;

use super::{Context, Error, reader_utils::ValueReaderExt};

/// An element of a class file that is decoded at the current offset.
pub(super) trait JvmElement: Sized {
    fn parse(bytes: &[u8], offset: &mut usize, ctx: &Context<'_>) -> Result<Self, Error>;
}

impl JvmElement for u16 {
    fn parse(bytes: &[u8], offset: &mut usize, _ctx: &Context<'_>) -> Result<Self, Error> {
        bytes.take_value(offset)
    }
}

/// Decodes a `u2` count followed by that many elements.
pub(super) fn parse_vec<T: JvmElement>(
    bytes: &[u8],
    offset: &mut usize,
    ctx: &Context<'_>,
) -> Result<Vec<T>, Error> {
    let count: u16 = bytes.take_value(offset)?;
    (0..count).map(|_| T::parse(bytes, offset, ctx)).collect()
}

/// Decodes a `u2` set of access flags. Reserved bits are kept as they are.
pub(super) fn parse_flags<F>(bytes: &[u8], offset: &mut usize) -> Result<F, Error>
where
    F: Flags<Bits = u16>,
{
    bytes.take_value(offset).map(F::from_bits_retain)
}
