// src/repack/detect.rs

//! Container signature sniffing
//!
//! A file named `.cbr` is frequently a ZIP in disguise. The leading bytes
//! decide whether extraction is attempted at all.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// RAR 1.5 - 4.x marker
pub const RAR4_MAGIC: &[u8] = b"Rar!\x1a\x07\x00";
/// RAR 5.0+ marker
pub const RAR5_MAGIC: &[u8] = b"Rar!\x1a\x07\x01\x00";
/// ZIP local file header
pub const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// 7z signature header
pub const SEVEN_ZIP_MAGIC: &[u8] = &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

/// Container format identified from leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Rar4,
    Rar5,
    Zip,
    SevenZip,
    Unknown,
}

impl Signature {
    /// Identify a container from its first bytes
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(RAR5_MAGIC) {
            Self::Rar5
        } else if data.starts_with(RAR4_MAGIC) {
            Self::Rar4
        } else if data.starts_with(ZIP_MAGIC) {
            Self::Zip
        } else if data.starts_with(SEVEN_ZIP_MAGIC) {
            Self::SevenZip
        } else {
            Self::Unknown
        }
    }

    /// Read the leading bytes of a file and identify it
    ///
    /// Files shorter than the longest signature are handled; they simply
    /// match nothing.
    pub fn sniff_file(path: &Path) -> io::Result<Self> {
        let mut header = Vec::with_capacity(RAR5_MAGIC.len());
        File::open(path)?
            .take(RAR5_MAGIC.len() as u64)
            .read_to_end(&mut header)?;
        Ok(Self::from_magic_bytes(&header))
    }

    pub fn is_rar(&self) -> bool {
        matches!(self, Self::Rar4 | Self::Rar5)
    }

    /// Phrase completing a mismatch report for a file named as RAR
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Rar4 | Self::Rar5 => "a RAR archive.",
            Self::Zip => "actually a Zip.",
            Self::SevenZip => "actually a 7z archive.",
            Self::Unknown => "not a RAR archive.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_detect_rar_versions() {
        assert_eq!(
            Signature::from_magic_bytes(b"Rar!\x1a\x07\x00\xcf\x90"),
            Signature::Rar4
        );
        assert_eq!(
            Signature::from_magic_bytes(b"Rar!\x1a\x07\x01\x00\x33"),
            Signature::Rar5
        );
        assert!(Signature::Rar4.is_rar());
        assert!(Signature::Rar5.is_rar());
    }

    #[test]
    fn test_detect_other_containers() {
        assert_eq!(
            Signature::from_magic_bytes(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00]),
            Signature::Zip
        );
        assert_eq!(
            Signature::from_magic_bytes(&[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C, 0x00, 0x04]),
            Signature::SevenZip
        );
        assert_eq!(Signature::from_magic_bytes(b"not-a-rar"), Signature::Unknown);
        assert_eq!(Signature::from_magic_bytes(b""), Signature::Unknown);
        assert!(!Signature::Zip.is_rar());
    }

    #[test]
    fn test_truncated_rar_marker_is_unknown() {
        assert_eq!(Signature::from_magic_bytes(b"Rar!\x1a"), Signature::Unknown);
    }

    #[test]
    fn test_sniff_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), b"PK\x03\x04fake").unwrap();
        assert_eq!(Signature::sniff_file(temp_file.path()).unwrap(), Signature::Zip);

        std::fs::write(temp_file.path(), b"ab").unwrap();
        assert_eq!(
            Signature::sniff_file(temp_file.path()).unwrap(),
            Signature::Unknown
        );
    }

    #[test]
    fn test_describe_for_mismatch_report() {
        assert_eq!(Signature::Zip.describe(), "actually a Zip.");
        assert_eq!(Signature::SevenZip.describe(), "actually a 7z archive.");
        assert_eq!(Signature::Unknown.describe(), "not a RAR archive.");
    }
}
