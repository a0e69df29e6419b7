//! Endian-aware data manipulation for efficient byte slice operations.
//!
//! This module contains types that wrap a byte slice and provide a convenient interface for
//! reading and writing primitive data types from it.
//! * [`DataCursorRef`] is the borrowed immutable variant, that wraps a reference to a byte slice
//!   and provides reading.
//! * [`DataCursorMut`] is the borrowed mutable variant, that wraps a reference to a byte slice and
//!   provides reading and writing.
//!
//! These cursors work similarly to the [`std::io`] module, wherein you have to include specific
//! traits for functionality.
//! * [`DataCursorTrait`] provides the basic methods for using a cursor, and allows for trait
//!   bounds.
//! * [`EndianRead`] provides reading Rust primitives using the stored endianness.
//! * [`EndianWrite`] provides writing Rust primitives using the stored endianness.

use snafu::prelude::*;

/// Error conditions for when reading/writing data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Thrown if reading/writing tries to go out of bounds.
    #[snafu(display("Unexpected End-Of-File!"))]
    EndOfFile,
}
type Result<T> = core::result::Result<T, Error>;

/// Allows specifying which endianness the cursor is currently working with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Default for Endian {
    #[cfg(target_endian = "little")]
    #[inline]
    fn default() -> Self {
        Self::Little
    }

    #[cfg(target_endian = "big")]
    #[inline]
    fn default() -> Self {
        Self::Big
    }
}

/// Shared cursor functionality, e.g. utilities
pub trait DataCursorTrait {
    /// Returns the current position of this cursor.
    fn position(&self) -> usize;

    /// Sets the position of this cursor.
    fn set_position(&mut self, pos: usize);

    /// Returns the current endianness of this cursor.
    fn endian(&self) -> Endian;

    /// Sets the endianness of this cursor.
    fn set_endian(&mut self, endian: Endian);

    /// Returns the remaining data from the current position.
    fn remaining_slice(&self) -> &[u8];

    /// Returns `true` if the remaining slice is empty.
    fn is_empty(&self) -> bool;

    /// Returns the length of the currently stored data.
    fn len(&self) -> usize;
}

macro_rules! datacursor_read {
    ($self:ident, $t:ty) => {{
        const LENGTH: usize = core::mem::size_of::<$t>();
        // Bounds check to ensure we're within the valid data range
        ensure!($self.len() >= $self.pos + LENGTH, EndOfFileSnafu);

        unsafe {
            // SAFETY: pointer::add should always be safe if we have a valid slice
            let ptr: *const $t = $self.data.as_ptr().add($self.pos).cast();
            $self.pos += LENGTH;

            // SAFETY: We can't guarantee that the pointer is aligned, so we use read_unaligned
            match $self.endian {
                Endian::Little => Ok(<$t>::from_le(ptr.read_unaligned())),
                Endian::Big => Ok(<$t>::from_be(ptr.read_unaligned())),
            }
        }
    }};
}

macro_rules! datacursor_write {
    ($self:ident, $value:expr, $t:ty) => {{
        const LENGTH: usize = core::mem::size_of::<$t>();
        // Bounds check to ensure we're within the valid data range
        ensure!($self.len() >= $self.pos + LENGTH, EndOfFileSnafu);

        unsafe {
            // SAFETY: pointer::add should always be safe if we have a valid slice
            let ptr: *mut $t = $self.data.as_mut_ptr().add($self.pos).cast();
            $self.pos += LENGTH;

            // SAFETY: We can't guarantee that the pointer is aligned, so we use write_unaligned
            match $self.endian {
                Endian::Little => ptr.write_unaligned($value.to_le()),
                Endian::Big => ptr.write_unaligned($value.to_be()),
            }
        }
        Ok(())
    }};
}

/// Endian-aware reading of Rust primitives
pub trait EndianRead {
    /// Reads one byte and returns it as a `u8`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to read out of bounds.
    fn read_u8(&mut self) -> Result<u8>;

    /// Reads two bytes and returns them as a `u16`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to read out of bounds.
    fn read_u16(&mut self) -> Result<u16>;

    /// Reads four bytes and returns them as a `u32`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to read out of bounds.
    fn read_u32(&mut self) -> Result<u32>;

    /// Reads eight bytes and returns them as a `u64`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to read out of bounds.
    fn read_u64(&mut self) -> Result<u64>;
}

/// Endian-aware writing of Rust primitives
pub trait EndianWrite {
    /// Writes one byte from a `u8`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to write out of bounds.
    fn write_u8(&mut self, value: u8) -> Result<()>;

    /// Writes two bytes from a `u16`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to write out of bounds.
    fn write_u16(&mut self, value: u16) -> Result<()>;

    /// Writes four bytes from a `u32`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to write out of bounds.
    fn write_u32(&mut self, value: u32) -> Result<()>;

    /// Writes eight bytes from a `u64`.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to write out of bounds.
    fn write_u64(&mut self, value: u64) -> Result<()>;
}

/// A borrowed, immutable in-memory file that allows endian-aware reads.
#[derive(Debug, Default)]
pub struct DataCursorRef<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> DataCursorRef<'a> {
    /// Creates a new cursor using the provided data and endianness.
    #[inline]
    pub const fn new(data: &'a [u8], endian: Endian) -> Self {
        Self { data, pos: 0, endian }
    }

    /// Reads a fixed number of bytes and returns them as an array.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to read out of bounds.
    #[inline]
    pub fn read_exact<const N: usize>(&mut self) -> Result<[u8; N]> {
        ensure!(self.len() >= self.pos + N, EndOfFileSnafu);

        let mut value = [0u8; N];
        value.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(value)
    }
}

impl DataCursorTrait for DataCursorRef<'_> {
    #[inline]
    fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[inline]
    fn endian(&self) -> Endian {
        self.endian
    }

    #[inline]
    fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    #[inline]
    fn remaining_slice(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }
}

impl EndianRead for DataCursorRef<'_> {
    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        const LENGTH: usize = core::mem::size_of::<u8>();
        ensure!(self.len() >= self.pos + LENGTH, EndOfFileSnafu);

        let value = self.data[self.pos];
        self.pos += LENGTH;
        Ok(value)
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16> {
        datacursor_read!(self, u16)
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32> {
        datacursor_read!(self, u32)
    }

    #[inline]
    fn read_u64(&mut self) -> Result<u64> {
        datacursor_read!(self, u64)
    }
}

/// A borrowed, mutable in-memory file that allows endian-aware read and write.
#[derive(Debug, Default)]
pub struct DataCursorMut<'a> {
    data: &'a mut [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> DataCursorMut<'a> {
    /// Creates a new cursor using the provided data and endianness.
    #[inline]
    pub fn new(data: &'a mut [u8], endian: Endian) -> Self {
        Self { data, pos: 0, endian }
    }

    /// Reads a fixed number of bytes and returns them as an array.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to read out of bounds.
    #[inline]
    pub fn read_exact<const N: usize>(&mut self) -> Result<[u8; N]> {
        ensure!(self.len() >= self.pos + N, EndOfFileSnafu);

        let mut value = [0u8; N];
        value.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(value)
    }

    /// Writes the entire slice at the current position.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if trying to write out of bounds.
    #[inline]
    pub fn write_exact(&mut self, value: &[u8]) -> Result<()> {
        ensure!(self.len() >= self.pos + value.len(), EndOfFileSnafu);

        self.data[self.pos..self.pos + value.len()].copy_from_slice(value);
        self.pos += value.len();
        Ok(())
    }
}

impl DataCursorTrait for DataCursorMut<'_> {
    #[inline]
    fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[inline]
    fn endian(&self) -> Endian {
        self.endian
    }

    #[inline]
    fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    #[inline]
    fn remaining_slice(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }
}

impl EndianRead for DataCursorMut<'_> {
    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        const LENGTH: usize = core::mem::size_of::<u8>();
        ensure!(self.len() >= self.pos + LENGTH, EndOfFileSnafu);

        let value = self.data[self.pos];
        self.pos += LENGTH;
        Ok(value)
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16> {
        datacursor_read!(self, u16)
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32> {
        datacursor_read!(self, u32)
    }

    #[inline]
    fn read_u64(&mut self) -> Result<u64> {
        datacursor_read!(self, u64)
    }
}

impl EndianWrite for DataCursorMut<'_> {
    #[inline]
    fn write_u8(&mut self, value: u8) -> Result<()> {
        const LENGTH: usize = core::mem::size_of::<u8>();
        ensure!(self.len() >= self.pos + LENGTH, EndOfFileSnafu);

        self.data[self.pos] = value;
        self.pos += LENGTH;
        Ok(())
    }

    #[inline]
    fn write_u16(&mut self, value: u16) -> Result<()> {
        datacursor_write!(self, value, u16)
    }

    #[inline]
    fn write_u32(&mut self, value: u32) -> Result<()> {
        datacursor_write!(self, value, u32)
    }

    #[inline]
    fn write_u64(&mut self, value: u64) -> Result<()> {
        datacursor_write!(self, value, u64)
    }
}
