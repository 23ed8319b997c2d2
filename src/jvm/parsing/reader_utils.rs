//! Offset-addressed reads over a byte buffer that is fully resident in memory.
//!
//! The functions here are pure functions of `(buffer, offset)`. Callers keep track of the
//! offset themselves and advance it by the number of bytes each read reports.

use trait_gen::trait_gen;

use super::Error;

/// A fixed-width value stored big-endian in a class file.
pub trait Readable: Sized {
    /// The number of bytes the value occupies.
    const WIDTH: usize;

    /// Decodes the value from exactly [`Self::WIDTH`] bytes.
    fn from_be_slice(bytes: &[u8]) -> Self;
}

#[trait_gen(T -> u8, u16, u32, u64, i8, i16, i32, i64, f32, f64)]
impl Readable for T {
    const WIDTH: usize = size_of::<T>();

    fn from_be_slice(bytes: &[u8]) -> Self {
        let mut buf = [0u8; size_of::<T>()];
        buf.copy_from_slice(bytes);
        T::from_be_bytes(buf)
    }
}

/// Reads a value starting at `from`.
/// Returns the value and the number of bytes consumed.
/// # Errors
/// - [`Error::OutOfRange`] if the buffer ends before the value does.
pub fn read_value<T: Readable>(bytes: &[u8], from: usize) -> Result<(T, usize), Error> {
    let raw = read_raw(bytes, from, T::WIDTH)?;
    Ok((T::from_be_slice(raw), T::WIDTH))
}

/// Reads one unsigned byte.
/// # Errors
/// See [`read_value`].
pub fn read_u1(bytes: &[u8], from: usize) -> Result<(u8, usize), Error> {
    read_value(bytes, from)
}

/// Reads a big-endian `u16`.
/// # Errors
/// See [`read_value`].
pub fn read_u2(bytes: &[u8], from: usize) -> Result<(u16, usize), Error> {
    read_value(bytes, from)
}

/// Reads a big-endian `u32`.
/// # Errors
/// See [`read_value`].
pub fn read_u4(bytes: &[u8], from: usize) -> Result<(u32, usize), Error> {
    read_value(bytes, from)
}

/// Reads a big-endian `u64`.
/// # Errors
/// See [`read_value`].
pub fn read_u8(bytes: &[u8], from: usize) -> Result<(u64, usize), Error> {
    read_value(bytes, from)
}

/// Borrows `length` bytes starting at `from`.
/// # Errors
/// - [`Error::OutOfRange`] if `from + length` exceeds the buffer.
pub fn read_raw(bytes: &[u8], from: usize, length: usize) -> Result<&[u8], Error> {
    from.checked_add(length)
        .and_then(|end| bytes.get(from..end))
        .ok_or(Error::OutOfRange {
            offset: from,
            length,
            available: bytes.len(),
        })
}

/// Reads that advance a caller-owned offset.
pub(crate) trait ValueReaderExt {
    fn take_value<T: Readable>(&self, offset: &mut usize) -> Result<T, Error>;

    fn take_bytes(&self, offset: &mut usize, length: usize) -> Result<&[u8], Error>;
}

impl ValueReaderExt for [u8] {
    #[inline]
    fn take_value<T: Readable>(&self, offset: &mut usize) -> Result<T, Error> {
        let (value, consumed) = read_value(self, *offset)?;
        *offset += consumed;
        Ok(value)
    }

    #[inline]
    fn take_bytes(&self, offset: &mut usize, length: usize) -> Result<&[u8], Error> {
        let raw = read_raw(self, *offset, length)?;
        *offset += length;
        Ok(raw)
    }
}
