//! Adds support for the Yay0 compression format used for first-party N64 and early GameCube games.
//!
//! Because the Yay0 format is so lightweight, this module is designed to not have any persistence.
//! It takes in data, and will return the de/compressed data contained inside.
//!
//! # Format
//! The Yay0 format is part of the [Lempel-Ziv family of algorithms](https://w.wiki/F6n), which use
//! a "sliding window" to allow for copying repetitive data from previously in the output buffer.
//! Unlike [Yaz0](crate::yaz0), the file is split into three sections. The first contains 32-bit
//! mask words that signal whether to copy from the input or from the output buffer, the second
//! contains all lookback+length pairs, and the third contains all copyable data.
//!
//! ## Header
//! The header is as follows, in big-endian format:
//!
//! | Offset | Field | Type | Notes |
//! |--------|-------|------|-------|
//! | 0x0 | Magic number     | u8\[4\] | Unique identifier ("Yay0") to let us know we're reading a Yay0-compressed file. |
//! | 0x4 | Output size      | u32    | The size of the decompressed data, needed for the output buffer. |
//! | 0x8 | Lookback offset  | u32    | Offset to the lookback pair section. See [format](self#format) for details. |
//! | 0xC | Copy data offset | u32    | Offset to the copyable data section. See [format](self#format) for details. |
//!
//! # Decompression
//! The decompression algorithm is as follows, ran in a loop until you write enough bytes to fill
//! the output buffer:
//!
//! * Set three cursors, one to header+0x10 for mask words, one to the lookback offset, and one to
//!   the copy data offset.
//! * Read one u32 from the mask cursor, which is 32 flag bits from high to low.
//! * For each flag bit, if it is a 1, copy one byte from the copy data section to the output.
//! * If it is a 0, copy bytes from earlier in the output buffer:
//!     * Read two bytes from the lookback section.
//!     * Get the first nibble (code >> 12). If it is 0, read one byte ***from the copy data
//!       section*** and add 18 (0x12). Otherwise, add 2 to the nibble. Use that as the number of
//!       bytes to copy.
//!     * Add 1 to the lower nibbles (code & 0xFFF) and treat that as how far back in the buffer to
//!       read, from the current position.
//!     * **Note that the count can overlap with the destination, and needs to be copied one byte at
//!       a time for correct behavior.**
//!     * Copy that amount of bytes from the lookback position to the current position.
//!
//! # Compression
//! Compression uses the same matcher as [Yaz0](crate::yaz0), filling the three sections
//! independently while mask bits accumulate in a 32-bit register, and then joins them behind the
//! header with no padding in between.
//!
//! # Usage
//! This module offers the following functionality:
//! ## Decompression
//! * [`decompress_from_path`](Yay0::decompress_from_path): Provide a path, get decompressed data back
//! * [`decompress_from`](Yay0::decompress_from): Provide the input data, get decompressed data back
//! * [`decompress`](Yay0::decompress): Provide the input data and output buffer, run the decompression
//!   algorithm
//! ## Compression
//! * [`compress_from_path`](Yay0::compress_from_path): Provide a path, get compressed data back
//! * [`compress_from`](Yay0::compress_from): Provide the input data, get compressed data back
//! * [`compress`](Yay0::compress): Provide the input data and output buffer, run the compression
//!   algorithm
//! ## Utilities
//! * [`read_header`](Yay0::read_header): Returns the header information for a given Yay0 file
//! * [`worst_possible_size`](Yay0::worst_possible_size): Calculates the worst possible compression size
//!   for a given filesize

#[cfg(feature = "std")]
use std::path::Path;

use ladon_core::prelude::*;
use snafu::prelude::*;

use crate::matching::{Matcher, MIN_MATCH};
#[cfg(not(feature = "std"))]
use crate::no_std::*;

/// Error conditions for when reading/writing Yay0 files
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Thrown if an error occurs when trying to read or write files.
    #[cfg(feature = "std")]
    #[snafu(transparent)]
    FileError { source: std::io::Error },

    /// Thrown if an error occurs when trying to read or write data.
    #[snafu(transparent)]
    DataError { source: DataError },

    /// Thrown if the compressed data is too small to contain a header.
    #[snafu(display("Compressed data is too small, must be at least 16 bytes!"))]
    InvalidHeader,

    /// Thrown if the compressed data runs out before the output buffer is filled.
    #[snafu(display("Unexpected End-Of-File!"))]
    EndOfFile,

    /// Thrown if a lookback points before the start of the decompressed data.
    #[snafu(display("Lookback copy points outside the decompressed data!"))]
    CorruptLookback,

    /// Thrown if the file is larger than u32::MAX since the header cannot store it.
    #[snafu(display("File too large to fit into u32::MAX!"))]
    FileTooBig,
}
type Result<T> = core::result::Result<T, Error>;

/// See the module [header](self#header) for more information.
pub struct Header {
    pub decompressed_size: u32,
    pub lookback_offset: u32,
    pub copy_data_offset: u32,
}

/// Utility struct for handling Yay0 compression.
///
/// Yay0 is stateless, and is merely a namespace for implementing certain traits.
///
/// See the [module documentation](self) for more information.
pub struct Yay0;

impl Yay0 {
    /// Unique identifier that tells us if we're reading a Yay0-compressed file
    pub const MAGIC: [u8; 4] = *b"Yay0";

    /// Returns the metadata from a Yay0 header.
    ///
    /// The magic number is not validated, since the consoles themselves read the output size
    /// unconditionally. Check against [`MAGIC`](Self::MAGIC) if rejecting foreign data matters.
    ///
    /// # Examples
    /// ```
    /// # use ladon_ncompress::prelude::*;
    /// let mut input = [0u8; 0x10];
    /// input[0..4].copy_from_slice(&Yay0::MAGIC);
    /// input[4..8].copy_from_slice(&u32::to_be_bytes(0x40000));
    /// input[8..12].copy_from_slice(&u32::to_be_bytes(0x274C));
    /// input[12..16].copy_from_slice(&u32::to_be_bytes(0xD0D4));
    /// let header = Yay0::read_header(&input)?;
    /// assert_eq!(header.decompressed_size, 0x40000);
    /// assert_eq!(header.lookback_offset, 0x274C);
    /// assert_eq!(header.copy_data_offset, 0xD0D4);
    /// # Ok::<(), yay0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidHeader`](Error::InvalidHeader) if the input is smaller than a Yay0 header.
    #[inline]
    pub fn read_header(data: &[u8]) -> Result<Header> {
        ensure!(data.len() >= 0x10, InvalidHeaderSnafu);

        let mut data = DataCursorRef::new(data, Endian::Big);
        data.set_position(4);

        let decompressed_size = data.read_u32()?;
        let lookback_offset = data.read_u32()?;
        let copy_data_offset = data.read_u32()?;

        Ok(Header { decompressed_size, lookback_offset, copy_data_offset })
    }

    /// Calculates the filesize for the largest possible file that can be created with Yay0
    /// compression.
    ///
    /// This consists of the 0x10 header, a mask section with one bit per block (rounded up to a
    /// whole word), and a loose bound on the lookback and copy data sections.
    #[must_use]
    #[inline]
    pub const fn worst_possible_size(input_len: usize) -> usize {
        0x10 + ((input_len + 32) >> 3) + input_len * 2
    }

    /// Loads a Yay0 file and returns the decompressed data.
    ///
    /// # Errors
    /// Returns:
    /// * [`FileError`](Error::FileError) if unable to open or read the path
    /// * [`InvalidHeader`](Error::InvalidHeader) if the input is smaller than a Yay0 header
    /// * [`EndOfFile`](Error::EndOfFile) if the compressed data is truncated
    /// * [`CorruptLookback`](Error::CorruptLookback) if a lookback points outside the output
    #[cfg(feature = "std")]
    #[inline]
    pub fn decompress_from_path<P: AsRef<Path>>(path: P) -> Result<Box<[u8]>> {
        let input = std::fs::read(path)?;
        Self::decompress_from(&input)
    }

    /// Decompresses a Yay0 file and returns the decompressed data.
    ///
    /// # Examples
    /// ```
    /// # use ladon_ncompress::prelude::*;
    /// let input = b"lorem ipsum dolor sit amet, lorem ipsum dolor sit amet";
    /// let compressed = Yay0::compress_from(input, 0x1000)?;
    /// let output = Yay0::decompress_from(&compressed)?;
    /// assert_eq!(*output, input[..]);
    /// # Ok::<(), yay0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidHeader`](Error::InvalidHeader) if the input is smaller than a Yay0 header,
    /// [`EndOfFile`](Error::EndOfFile) if the compressed data is truncated, or
    /// [`CorruptLookback`](Error::CorruptLookback) if a lookback points outside the output.
    #[inline]
    pub fn decompress_from(data: &[u8]) -> Result<Box<[u8]>> {
        let header = Self::read_header(data)?;

        //Allocate decompression buffer
        let mut output = vec![0u8; header.decompressed_size as usize].into_boxed_slice();

        //Perform the actual decompression
        Self::decompress(data, &mut output, header.lookback_offset, header.copy_data_offset)?;

        //If we've gotten this far, output contains valid decompressed data
        Ok(output)
    }

    /// Decompresses a Yay0 input file into the output buffer, which must be exactly the
    /// decompressed size from the header.
    ///
    /// `lookback` and `copy_data` are the section offsets from the header.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if any of the three sections is truncated or a
    /// lookback runs past the end of the output, or
    /// [`CorruptLookback`](Error::CorruptLookback) if a lookback points before the start of the
    /// output.
    #[inline]
    pub fn decompress(input: &[u8], output: &mut [u8], lookback: u32, copy_data: u32) -> Result<()> {
        //Setup all three cursors
        let mut mask_pos = 0x10;
        let mut lookback_pos = lookback as usize;
        let mut copy_data_pos = copy_data as usize;

        let mut output_pos = 0;
        let mut mask: u32 = 0;
        let mut bits_left = 0;

        while output_pos < output.len() {
            //Check if we need a new mask word
            if bits_left == 0 {
                ensure!(mask_pos + 4 <= input.len(), EndOfFileSnafu);
                mask = u32::from_be_bytes([
                    input[mask_pos],
                    input[mask_pos + 1],
                    input[mask_pos + 2],
                    input[mask_pos + 3],
                ]);
                mask_pos += 4;
                bits_left = 32;
            }

            //Check what kind of copy we're doing
            if (mask & 0x8000_0000) != 0 {
                //Copy one byte from the copy data section
                ensure!(copy_data_pos < input.len(), EndOfFileSnafu);
                output[output_pos] = input[copy_data_pos];
                copy_data_pos += 1;
                output_pos += 1;
            } else {
                //RLE copy from previously in the buffer
                ensure!(lookback_pos + 2 <= input.len(), EndOfFileSnafu);
                let code = u16::from_be_bytes([input[lookback_pos], input[lookback_pos + 1]]);
                lookback_pos += 2;

                //Extract RLE information from the code, read another byte for size if we need to.
                //How far back in the output buffer do we need to copy from, how many bytes do we
                //copy?
                let back = usize::from((code & 0xFFF) + 1);
                let size = match code >> 12 {
                    0 => {
                        ensure!(copy_data_pos < input.len(), EndOfFileSnafu);
                        let value = input[copy_data_pos];
                        copy_data_pos += 1;
                        usize::from(value) + 0x12
                    }
                    n => usize::from(n) + 2,
                };

                ensure!(back <= output_pos, CorruptLookbackSnafu);
                ensure!(output_pos + size <= output.len(), EndOfFileSnafu);

                //The copy can overlap with itself, which replays bytes written earlier in the same
                //run, so it has to happen a byte at a time
                if back < size {
                    for n in 0..size {
                        output[output_pos + n] = output[output_pos - back + n];
                    }
                } else {
                    output.copy_within(output_pos - back..output_pos - back + size, output_pos);
                }
                output_pos += size;
            }

            mask <<= 1;
            bits_left -= 1;
        }

        Ok(())
    }

    /// Loads a file and returns the Yay0-compressed data.
    ///
    /// # Errors
    /// Returns [`FileError`](Error::FileError) if unable to open or read the path, or
    /// [`FileTooBig`](Error::FileTooBig) if the input is too large for the filesize to be stored
    /// in the header.
    #[cfg(feature = "std")]
    #[inline]
    pub fn compress_from_path<P: AsRef<Path>>(path: P, search_depth: usize) -> Result<Box<[u8]>> {
        let input = std::fs::read(path)?;
        Self::compress_from(&input, search_depth)
    }

    /// Compresses the input data and returns the compressed data.
    ///
    /// `search_depth` is how many preceding bytes are searched for each match, capped at the
    /// 0x1000 bytes the format can address; 0x1000 matches the original tools.
    ///
    /// # Examples
    /// ```
    /// # use ladon_ncompress::prelude::*;
    /// let compressed = Yay0::compress_from(&[0xAB; 20], 0x1000)?;
    /// assert_eq!(compressed.len(), 24);
    ///
    /// let output = Yay0::decompress_from(&compressed)?;
    /// assert_eq!(*output, [0xAB; 20]);
    /// # Ok::<(), yay0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`FileTooBig`](Error::FileTooBig) if the input is too large for the filesize to be
    /// stored in the header.
    #[inline]
    pub fn compress_from(input: &[u8], search_depth: usize) -> Result<Box<[u8]>> {
        ensure!(u32::try_from(input.len()).is_ok(), FileTooBigSnafu);

        //Assume 0x10 header, every byte is a copy, and include mask words (rounded up)
        let mut output = vec![0u8; Self::worst_possible_size(input.len())];

        let output_size = Self::compress(input, &mut output, search_depth)?;

        output.truncate(output_size);

        Ok(output.into_boxed_slice())
    }

    /// Compresses the input into the output buffer, and returns the size of the compressed data.
    ///
    /// The output buffer must hold at least [`worst_possible_size`](Self::worst_possible_size)
    /// bytes for the input length. See [`compress_from`](Self::compress_from) for the parameters.
    ///
    /// # Errors
    /// Returns [`DataError`](Error::DataError) if the output buffer is too small for the
    /// compressed data.
    pub fn compress(input: &[u8], output: &mut [u8], search_depth: usize) -> Result<usize> {
        //Accumulate all three sections separately, since we don't know how big each one is until
        //the input has been fully scanned
        let mut mask_data = vec![0u8; (input.len() + 32) >> 3];
        let mut mask_size = 0;
        let mut lookback_data = vec![0u8; input.len()];
        let mut lookback_size = 0;
        let mut copy_data = vec![0u8; input.len()];
        let mut copy_size = 0;

        let mut mask: u32 = 0;
        let mut bits_done = 0;

        let mut matcher = Matcher::new(input, search_depth);
        let mut input_pos = 0;

        while input_pos < input.len() {
            //Check if the mask word is full and needs to be flushed
            if bits_done == 32 {
                mask_data[mask_size..mask_size + 4].copy_from_slice(&u32::to_be_bytes(mask));
                mask_size += 4;
                mask = 0;
                bits_done = 0;
            }

            let (length, distance) = matcher.next_match(input_pos);
            if length < MIN_MATCH {
                //The match is too small to bother compressing, it's smaller to just copy a byte
                copy_data[copy_size] = input[input_pos];
                copy_size += 1;
                input_pos += 1;

                mask |= 1 << (31 - bits_done);
            } else {
                let lookback = (distance - 1) as u16;

                //If we can't fit the size in the upper nibble, write the length into the copy
                //data section instead
                let code = if length >= 0x12 {
                    copy_data[copy_size] = (length - 0x12) as u8;
                    copy_size += 1;
                    lookback & 0x0FFF
                } else {
                    (((length - 2) as u16) << 12) | (lookback & 0x0FFF)
                };

                lookback_data[lookback_size..lookback_size + 2]
                    .copy_from_slice(&u16::to_be_bytes(code));
                lookback_size += 2;

                input_pos += length;
            }

            bits_done += 1;
        }

        //Check if there are still mask bits to flush, leaving the unused bits zero
        if bits_done > 0 {
            mask_data[mask_size..mask_size + 4].copy_from_slice(&u32::to_be_bytes(mask));
            mask_size += 4;
        }

        //Now we can write the header and join the sections
        let lookback_location = 0x10 + mask_size;
        let copy_data_location = lookback_location + lookback_size;

        let mut output = DataCursorMut::new(output, Endian::Big);
        output.write_exact(&Self::MAGIC)?;
        output.write_u32(input.len() as u32)?;
        output.write_u32(lookback_location as u32)?;
        output.write_u32(copy_data_location as u32)?;
        output.write_exact(&mask_data[..mask_size])?;
        output.write_exact(&lookback_data[..lookback_size])?;
        output.write_exact(&copy_data[..copy_size])?;

        Ok(output.position())
    }
}

#[cfg(feature = "std")]
impl FileIdentifier for Yay0 {
    fn identify(data: &[u8]) -> Option<FileInfo> {
        if !data.starts_with(&Self::MAGIC) {
            return None;
        }

        Self::read_header(data)
            .ok()
            .map(|header| FileInfo::new("Yay0", header.decompressed_size as usize))
    }

    fn identify_deep(data: &[u8]) -> Option<FileInfo> {
        Self::identify(data).map(|info| info.with_payload(Self::decompress_from(data).ok()))
    }
}
