//! Adds support for the Yaz0 compression format used for N64, GameCube, Wii, Wii U, and Switch.
//!
//! Because the Yaz0 format is so lightweight, this module is designed to not have any persistence.
//! It takes in data, and will return the de/compressed data contained inside.
//!
//! # Format
//! The Yaz0 format is part of the [Lempel-Ziv family of algorithms](https://w.wiki/F6n), which use
//! a "sliding window" to allow for copying repetitive data from previously in the output buffer.
//! The input stream consists of lookback+length pairs, unique bytes to copy, and "flag bytes" which
//! determine which of the two operations to do.
//!
//! ## Header
//! The header is as follows, in big-endian format:
//!
//! | Offset | Field | Type | Notes |
//! |--------|-------|------|-------|
//! | 0x0 | Magic number | u8\[4\] | Unique identifier ("Yaz0") to let us know we're reading a Yaz0-compressed file. |
//! | 0x4 | Output size  | u32     | The size of the decompressed data, needed for the output buffer. |
//! | 0x8 | Alignment    | u32     | Specifies the alignment needed for the output buffer. Non-zero starting with Wii U. |
//! | 0xC | Padding      | u8\[4\] | Alignment to a 0x10 byte boundary. Always 0. |
//!
//! # Decompression
//! The decompression algorithm is as follows, ran in a loop until you write enough bytes to fill
//! the output buffer:
//!
//! * Read one byte from the input, which is 8 flag bits from high to low.
//! * For each flag bit, if it is a 1, copy one byte from the input to the output.
//! * If it is a 0, copy bytes from earlier in the output buffer:
//!     * Read two bytes from the input.
//!     * Get the first nibble (code >> 12). If it is 0, read one more byte and add 18 (0x12).
//!       Otherwise, add 2 to the nibble. Use that as the number of bytes to copy.
//!     * Add 1 to the lower nibbles (code & 0xFFF) and treat that as how far back in the buffer to
//!       read, from the current position.
//!     * **Note that the count can overlap with the destination, and needs to be copied one byte at
//!       a time for correct behavior.**
//!     * Copy that amount of bytes from the lookback position to the current position.
//!
//! # Compression
//! Compression walks every offset of a bounded lookback window for the longest run, with one
//! position of lookahead that can defer a match by a byte when the next position matches better.
//! `search_depth` bounds the window, trading compression time for ratio; when the input ends on a
//! full group of 8 flag bits, `trailing_zero` appends the lone zero byte that the tools used for
//! The Wind Waker and Twilight Princess emit, so those assets round-trip byte-identical.
//!
//! # Usage
//! This module offers the following functionality:
//! ## Decompression
//! * [`decompress_from_path`](Yaz0::decompress_from_path): Provide a path, get decompressed data back
//! * [`decompress_from`](Yaz0::decompress_from): Provide the input data, get decompressed data back
//! * [`decompress`](Yaz0::decompress): Provide the input data and output buffer, run the decompression
//!   algorithm
//! ## Compression
//! * [`compress_from_path`](Yaz0::compress_from_path): Provide a path, get compressed data back
//! * [`compress_from`](Yaz0::compress_from): Provide the input data, get compressed data back
//! * [`compress`](Yaz0::compress): Provide the input data and output buffer, run the compression
//!   algorithm
//! ## Utilities
//! * [`read_header`](Yaz0::read_header): Returns the header information for a given Yaz0 file
//! * [`worst_possible_size`](Yaz0::worst_possible_size): Calculates the worst possible compression size
//!   for a given filesize

#[cfg(feature = "std")]
use std::path::Path;

use ladon_core::prelude::*;
use snafu::prelude::*;

use crate::matching::{Matcher, MIN_MATCH};
#[cfg(not(feature = "std"))]
use crate::no_std::*;

/// Error conditions for when reading/writing Yaz0 files
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
    pub alignment: u32,
}

/// Utility struct for handling Yaz0 compression.
///
/// Yaz0 is stateless, and is merely a namespace for implementing certain traits.
///
/// See the [module documentation](self) for more information.
pub struct Yaz0;

impl Yaz0 {
    /// Unique identifier that tells us if we're reading a Yaz0-compressed file
    pub const MAGIC: [u8; 4] = *b"Yaz0";

    /// Returns the metadata from a Yaz0 header.
    ///
    /// The magic number is not validated, since the consoles themselves read the output size
    /// unconditionally. Check against [`MAGIC`](Self::MAGIC) if rejecting foreign data matters.
    ///
    /// # Examples
    /// ```
    /// # use ladon_ncompress::prelude::*;
    /// let mut input = [0u8; 0x10];
    /// input[0..4].copy_from_slice(&Yaz0::MAGIC);
    /// input[4..8].copy_from_slice(&u32::to_be_bytes(0x40000));
    /// let header = Yaz0::read_header(&input)?;
    /// assert_eq!(header.decompressed_size, 0x40000);
    /// assert_eq!(header.alignment, 0);
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidHeader`](Error::InvalidHeader) if the input is smaller than a Yaz0 header.
    #[inline]
    pub fn read_header(data: &[u8]) -> Result<Header> {
        ensure!(data.len() >= 0x10, InvalidHeaderSnafu);

        let mut data = DataCursorRef::new(data, Endian::Big);
        data.set_position(4);

        let decompressed_size = data.read_u32()?;
        //0 on GC/Wii files
        let alignment = data.read_u32()?;

        Ok(Header { decompressed_size, alignment })
    }

    /// Calculates the filesize for the largest possible file that can be created with Yaz0
    /// compression.
    ///
    /// This consists of the 0x10 header, the length of the input file, all flag bytes needed
    /// (rounded up), and the trailing zero emitted when the input ends on a full group.
    #[must_use]
    #[inline]
    pub const fn worst_possible_size(input_len: usize) -> usize {
        0x10 + input_len + input_len.div_ceil(8) + 1
    }

    /// Loads a Yaz0 file and returns the decompressed data.
    ///
    /// # Errors
    /// Returns:
    /// * [`FileError`](Error::FileError) if unable to open or read the path
    /// * [`InvalidHeader`](Error::InvalidHeader) if the input is smaller than a Yaz0 header
    /// * [`EndOfFile`](Error::EndOfFile) if the compressed data is truncated
    /// * [`CorruptLookback`](Error::CorruptLookback) if a lookback points outside the output
    #[cfg(feature = "std")]
    #[inline]
    pub fn decompress_from_path<P: AsRef<Path>>(path: P) -> Result<Box<[u8]>> {
        let input = std::fs::read(path)?;
        Self::decompress_from(&input)
    }

    /// Decompresses a Yaz0 file and returns the decompressed data.
    ///
    /// # Examples
    /// ```
    /// # use ladon_ncompress::prelude::*;
    /// let input = b"lorem ipsum dolor sit amet, lorem ipsum dolor sit amet";
    /// let compressed = Yaz0::compress_from(input, 0x1000, true)?;
    /// let output = Yaz0::decompress_from(&compressed)?;
    /// assert_eq!(*output, input[..]);
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidHeader`](Error::InvalidHeader) if the input is smaller than a Yaz0 header,
    /// [`EndOfFile`](Error::EndOfFile) if the compressed data is truncated, or
    /// [`CorruptLookback`](Error::CorruptLookback) if a lookback points outside the output.
    #[inline]
    pub fn decompress_from(data: &[u8]) -> Result<Box<[u8]>> {
        let header = Self::read_header(data)?;

        //Allocate decompression buffer
        let mut output = vec![0u8; header.decompressed_size as usize].into_boxed_slice();

        //Perform the actual decompression
        Self::decompress(data, &mut output)?;

        //If we've gotten this far, output contains valid decompressed data
        Ok(output)
    }

    /// Decompresses a Yaz0 input file into the output buffer, which must be exactly the
    /// decompressed size from the header.
    ///
    /// Any data left in the input once the output buffer is full is ignored.
    ///
    /// # Errors
    /// Returns [`EndOfFile`](Error::EndOfFile) if the compressed data is truncated or a lookback
    /// runs past the end of the output, or [`CorruptLookback`](Error::CorruptLookback) if a
    /// lookback points before the start of the output.
    #[inline]
    pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<()> {
        let mut input_pos = 0x10;
        let mut output_pos = 0;
        let mut mask: u8 = 0;
        let mut flags: u8 = 0;

        while output_pos < output.len() {
            //Check if we need a new flag byte
            if mask == 0 {
                ensure!(input_pos < input.len(), EndOfFileSnafu);
                flags = input[input_pos];
                input_pos += 1;
                mask = 1 << 7;
            }

            //Check what kind of copy we're doing
            if (flags & mask) != 0 {
                //Copy one byte from the input stream
                ensure!(input_pos < input.len(), EndOfFileSnafu);
                output[output_pos] = input[input_pos];
                output_pos += 1;
                input_pos += 1;
            } else {
                //RLE copy from previously in the buffer
                ensure!(input_pos + 2 <= input.len(), EndOfFileSnafu);
                let code = u16::from_be_bytes([input[input_pos], input[input_pos + 1]]);
                input_pos += 2;

                //Extract RLE information from the code, read another byte for size if we need to.
                //How far back in the output buffer do we need to copy from, how many bytes do we
                //copy?
                let back = usize::from((code & 0xFFF) + 1);
                let size = match code >> 12 {
                    0 => {
                        ensure!(input_pos < input.len(), EndOfFileSnafu);
                        let value = input[input_pos];
                        input_pos += 1;
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

            mask >>= 1;
        }

        Ok(())
    }

    /// Loads a file and returns the Yaz0-compressed data.
    ///
    /// # Errors
    /// Returns [`FileError`](Error::FileError) if unable to open or read the path, or
    /// [`FileTooBig`](Error::FileTooBig) if the input is too large for the filesize to be stored
    /// in the header.
    #[cfg(feature = "std")]
    #[inline]
    pub fn compress_from_path<P: AsRef<Path>>(
        path: P, search_depth: usize, trailing_zero: bool,
    ) -> Result<Box<[u8]>> {
        let input = std::fs::read(path)?;
        Self::compress_from(&input, search_depth, trailing_zero)
    }

    /// Compresses the input data and returns the compressed data.
    ///
    /// `search_depth` is how many preceding bytes are searched for each match, capped at the
    /// 0x1000 bytes the format can address; 0x1000 matches the original tools. `trailing_zero`
    /// keeps byte-for-byte parity with the tools used for The Wind Waker and Twilight Princess,
    /// and should normally be `true`.
    ///
    /// # Examples
    /// ```
    /// # use ladon_ncompress::prelude::*;
    /// let compressed = Yaz0::compress_from(&[0xAB; 20], 0x1000, true)?;
    /// assert_eq!(compressed.len(), 21);
    ///
    /// let output = Yaz0::decompress_from(&compressed)?;
    /// assert_eq!(*output, [0xAB; 20]);
    /// # Ok::<(), yaz0::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns [`FileTooBig`](Error::FileTooBig) if the input is too large for the filesize to be
    /// stored in the header.
    #[inline]
    pub fn compress_from(
        input: &[u8], search_depth: usize, trailing_zero: bool,
    ) -> Result<Box<[u8]>> {
        ensure!(u32::try_from(input.len()).is_ok(), FileTooBigSnafu);

        //Assume 0x10 header, every byte is a copy, and include flag bytes (rounded up)
        let mut output = vec![0u8; Self::worst_possible_size(input.len())];

        let output_size = Self::compress(input, &mut output, search_depth, trailing_zero);

        output.truncate(output_size);

        Ok(output.into_boxed_slice())
    }

    /// Compresses the input into the output buffer, and returns the size of the compressed data.
    ///
    /// The output buffer must hold at least [`worst_possible_size`](Self::worst_possible_size)
    /// bytes for the input length, or this function panics. See
    /// [`compress_from`](Self::compress_from) for the parameters.
    pub fn compress(
        input: &[u8], output: &mut [u8], search_depth: usize, trailing_zero: bool,
    ) -> usize {
        output[0..4].copy_from_slice(&Self::MAGIC);
        output[4..8].copy_from_slice(&u32::to_be_bytes(input.len() as u32));
        //Older files do not have alignment so this just leaves it as zero
        output[8..0x10].fill(0);

        let mut matcher = Matcher::new(input, search_depth);

        let mut input_pos = 0;
        let mut output_pos = 0x10;
        let mut flag_pos = 0;
        let mut flag_shift: u8 = 0;

        while input_pos < input.len() {
            //Check if we need to start a new flag byte
            if flag_shift == 0 {
                flag_pos = output_pos;
                output[flag_pos] = 0;
                output_pos += 1;
                flag_shift = 0x80;
            }

            let (length, distance) = matcher.next_match(input_pos);
            if length < MIN_MATCH {
                //The match is too small to bother compressing, it's smaller to just copy a byte
                output[flag_pos] |= flag_shift;
                output[output_pos] = input[input_pos];
                input_pos += 1;
                output_pos += 1;
            } else {
                let lookback = distance - 1;

                //If we can't fit the size in the upper nibble, write a third byte for the length
                if length >= 0x12 {
                    output[output_pos] = (lookback >> 8) as u8;
                    output[output_pos + 1] = lookback as u8;
                    output[output_pos + 2] = (length - 0x12) as u8;
                    output_pos += 3;
                } else {
                    output[output_pos] = (((length - 2) << 4) | (lookback >> 8)) as u8;
                    output[output_pos + 1] = lookback as u8;
                    output_pos += 2;
                }
                input_pos += length;
            }

            flag_shift >>= 1;
        }

        //The original tools write a lone zero when the input ends on a full group of 8 blocks
        if trailing_zero && flag_shift == 0 && output_pos > 0x10 {
            output[output_pos] = 0;
            output_pos += 1;
        }

        output_pos
    }
}

#[cfg(feature = "std")]
impl FileIdentifier for Yaz0 {
    fn identify(data: &[u8]) -> Option<FileInfo> {
        if !data.starts_with(&Self::MAGIC) {
            return None;
        }

        Self::read_header(data)
            .ok()
            .map(|header| FileInfo::new("Yaz0", header.decompressed_size as usize))
    }

    fn identify_deep(data: &[u8]) -> Option<FileInfo> {
        Self::identify(data).map(|info| info.with_payload(Self::decompress_from(data).ok()))
    }
}
