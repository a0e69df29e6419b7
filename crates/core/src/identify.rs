//! Identification system that lets the compression modules report what a byte slice contains.
//!
//! Basic identification only reads the file's header and should return quickly. "Deep
//! identification" is allowed to decompress the data it recognizes, even when that takes multiple
//! seconds, and hands the result back for callers that want to recurse into nested formats.

use crate::util::format_size;

/// Describes a recognized compressed file, built from its header.
#[non_exhaustive]
pub struct FileInfo {
    /// Short name of the recognized format, e.g. "Yaz0".
    pub format: &'static str,
    /// Size of the data after decompression, taken from the file's header.
    pub decompressed_size: usize,
    /// The decompressed data itself, if deep identification produced it.
    pub payload: Option<Box<[u8]>>,
}

impl FileInfo {
    /// Creates the info for a recognized file, with no payload attached.
    #[must_use]
    #[inline]
    pub const fn new(format: &'static str, decompressed_size: usize) -> Self {
        Self { format, decompressed_size, payload: None }
    }

    /// Attaches the decompressed data produced by deep identification.
    #[must_use]
    #[inline]
    pub fn with_payload(mut self, payload: Option<Box<[u8]>>) -> Self {
        self.payload = payload;
        self
    }
}

impl core::fmt::Display for FileInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Nintendo {}-compressed file, decompressed size: {}",
            self.format,
            format_size(self.decompressed_size)
        )
    }
}

/// Trait that allows for identifying if a byte slice is of the same format as the type.
pub trait FileIdentifier {
    /// Attempts to recognize the format from its header, and return information about it.
    #[must_use]
    fn identify(data: &[u8]) -> Option<FileInfo>;

    /// Like [`identify`](Self::identify), but also decompresses recognized data into the
    /// [`payload`](FileInfo::payload).
    #[must_use]
    fn identify_deep(data: &[u8]) -> Option<FileInfo>;
}
