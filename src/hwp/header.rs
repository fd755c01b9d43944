//! The fixed 256-byte `FileHeader` stream.
//!
//! # Layout
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 32   | Signature, `"HWP Document File"` + NULs |
//! | 32     | 4    | Version `0xMMnnPPrr`                    |
//! | 36     | 4    | Document properties (bit flags)         |
//! | 40     | 4    | License properties (bit flags)          |
//! | 44     | 4    | Encryption version                      |
//! | 48     | 1    | KOGL license country                    |
//! | 49     | 207  | Reserved, expected all-zero             |
//!
//! The compressed/encrypted flags tell the stream container whether the
//! other streams must be inflated or decrypted before decoding; this module
//! only reports them.

use super::consts::{FILE_HEADER_SIZE, SIGNATURE};
use crate::common::bitfield::{BitRange, BitfieldView};
use crate::common::error::{Error, Result};
use zerocopy::{FromBytes, LE, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// On-disk header layout.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawFileHeader {
    signature: [u8; 32],
    version: [u8; 4],
    properties: U32<LE>,
    license: U32<LE>,
    encrypt_version: U32<LE>,
    kogl_country: u8,
    reserved: [u8; 207],
}

pub const COMPRESSED: BitRange = BitRange::flag(0, "compressed");
pub const ENCRYPTED: BitRange = BitRange::flag(1, "encrypted");
pub const DISTRIBUTION: BitRange = BitRange::flag(2, "distribution");
pub const SCRIPT: BitRange = BitRange::flag(3, "script");
pub const DRM: BitRange = BitRange::flag(4, "drm");
pub const XML_TEMPLATE: BitRange = BitRange::flag(5, "xml_template_storage");
pub const HISTORY: BitRange = BitRange::flag(6, "document_history");
pub const SIGNATURE_INFO: BitRange = BitRange::flag(7, "digital_signature");
pub const CERT_ENCRYPTED: BitRange = BitRange::flag(8, "certificate_encrypted");
pub const SPARE_SIGNATURE: BitRange = BitRange::flag(9, "spare_digital_signature");
pub const CERT_DRM: BitRange = BitRange::flag(10, "certificate_drm");
pub const CCL: BitRange = BitRange::flag(11, "ccl");
pub const MOBILE_OPTIMIZED: BitRange = BitRange::flag(12, "mobile_optimized");
pub const PRIVACY: BitRange = BitRange::flag(13, "privacy_protected");
pub const TRACK_CHANGES: BitRange = BitRange::flag(14, "track_changes");
pub const KOGL: BitRange = BitRange::flag(15, "kogl");
pub const VIDEO_CONTROL: BitRange = BitRange::flag(16, "video_control");
pub const TOC_FIELD: BitRange = BitRange::flag(17, "toc_field_control");

/// Every documented document-property flag; bits 18..32 are reserved.
pub const PROPERTY_FLAGS: [BitRange; 18] = [
    COMPRESSED,
    ENCRYPTED,
    DISTRIBUTION,
    SCRIPT,
    DRM,
    XML_TEMPLATE,
    HISTORY,
    SIGNATURE_INFO,
    CERT_ENCRYPTED,
    SPARE_SIGNATURE,
    CERT_DRM,
    CCL,
    MOBILE_OPTIMIZED,
    PRIVACY,
    TRACK_CHANGES,
    KOGL,
    VIDEO_CONTROL,
    TOC_FIELD,
];

pub const LICENSE_INFO: BitRange = BitRange::flag(0, "license_info");
pub const COPY_RESTRICTED: BitRange = BitRange::flag(1, "copy_restricted");
pub const COPY_SAME_TERMS: BitRange = BitRange::flag(2, "copy_same_terms");

/// License-property flags; bits 3..32 are reserved.
pub const LICENSE_FLAGS: [BitRange; 3] = [LICENSE_INFO, COPY_RESTRICTED, COPY_SAME_TERMS];

/// Format version `major.minor.micro.extra`.
///
/// A different major or minor means an incompatible layout; micro and extra
/// only add fields, so readers must tolerate longer records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileVersion {
    pub major: u8,
    pub minor: u8,
    pub micro: u8,
    pub extra: u8,
}

impl FileVersion {
    pub const fn new(major: u8, minor: u8, micro: u8, extra: u8) -> Self {
        Self {
            major,
            minor,
            micro,
            extra,
        }
    }

    /// Decode the little-endian `0xMMnnPPrr` word.
    fn from_le_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[3], bytes[2], bytes[1], bytes[0])
    }

    fn to_le_bytes(self) -> [u8; 4] {
        [self.extra, self.micro, self.minor, self.major]
    }
}

impl std::fmt::Display for FileVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.micro, self.extra)
    }
}

/// Encryption scheme declared in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptVersion {
    None,
    /// Hancom 2.5 and earlier
    Legacy25,
    /// Hancom 3.0 enhanced
    Enhanced30,
    /// Hancom 3.0 old
    Old30,
    /// Hancom 7.0 and later
    Modern70,
    Unknown(u32),
}

impl From<u32> for EncryptVersion {
    fn from(value: u32) -> Self {
        match value {
            0 => EncryptVersion::None,
            1 => EncryptVersion::Legacy25,
            2 => EncryptVersion::Enhanced30,
            3 => EncryptVersion::Old30,
            4 => EncryptVersion::Modern70,
            other => EncryptVersion::Unknown(other),
        }
    }
}

/// Country of a KOGL (Korea Open Government License) document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KoglCountry {
    Korea,
    Us,
    Other(u8),
}

impl From<u8> for KoglCountry {
    fn from(value: u8) -> Self {
        match value {
            6 => KoglCountry::Korea,
            15 => KoglCountry::Us,
            other => KoglCountry::Other(other),
        }
    }
}

/// Decoded `FileHeader` stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub version: FileVersion,
    /// Raw document-property word, read through [`PROPERTY_FLAGS`]
    pub properties: u32,
    /// Raw license-property word, read through [`LICENSE_FLAGS`]
    pub license: u32,
    pub encrypt_version: EncryptVersion,
    pub kogl_country: KoglCountry,
    reserved_clean: bool,
}

impl FileHeader {
    /// Parse the header from the start of the `FileHeader` stream.
    ///
    /// A wrong signature is fatal. A non-zero reserved tail is only logged:
    /// it usually means a newer writer, not a corrupt file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < SIGNATURE.len() || &data[..SIGNATURE.len()] != SIGNATURE {
            return Err(Error::SignatureMismatch);
        }
        if data.len() < FILE_HEADER_SIZE {
            return Err(Error::TruncatedHeader {
                offset: 0,
                needed: FILE_HEADER_SIZE,
                available: data.len(),
            });
        }

        let raw = RawFileHeader::read_from_bytes(&data[..FILE_HEADER_SIZE]).map_err(|_| {
            Error::TruncatedHeader {
                offset: 0,
                needed: FILE_HEADER_SIZE,
                available: data.len(),
            }
        })?;

        if raw.signature[SIGNATURE.len()..].iter().any(|&b| b != 0) {
            return Err(Error::SignatureMismatch);
        }

        let reserved_clean = raw.reserved.iter().all(|&b| b == 0);
        if !reserved_clean {
            log::warn!(
                "FileHeader reserved area is not zero; the file is corrupt or written by a newer version"
            );
        }

        Ok(Self {
            version: FileVersion::from_le_bytes(raw.version),
            properties: raw.properties.get(),
            license: raw.license.get(),
            encrypt_version: EncryptVersion::from(raw.encrypt_version.get()),
            kogl_country: KoglCountry::from(raw.kogl_country),
            reserved_clean,
        })
    }

    #[inline]
    fn property_view(&self) -> BitfieldView {
        BitfieldView::new(self.properties)
    }

    /// Whether DocInfo and section streams are deflate-compressed.
    pub fn is_compressed(&self) -> bool {
        self.property_view().flag(COMPRESSED)
    }

    /// Whether streams are password-encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.property_view().flag(ENCRYPTED)
    }

    /// Whether this is a distribution document (sections under `ViewText`).
    pub fn is_distribution(&self) -> bool {
        self.property_view().flag(DISTRIBUTION)
    }

    /// Whether a document-property flag from [`PROPERTY_FLAGS`] is set.
    pub fn has_property(&self, flag: BitRange) -> bool {
        self.property_view().flag(flag)
    }

    /// Whether a license flag from [`LICENSE_FLAGS`] is set.
    pub fn has_license(&self, flag: BitRange) -> bool {
        BitfieldView::new(self.license).flag(flag)
    }

    /// Names of all set document-property flags.
    pub fn property_names(&self) -> Vec<&'static str> {
        self.property_view().set_flags(&PROPERTY_FLAGS)
    }

    /// Names of all set license flags.
    pub fn license_names(&self) -> Vec<&'static str> {
        BitfieldView::new(self.license).set_flags(&LICENSE_FLAGS)
    }

    /// False when the reserved tail held non-zero bytes.
    pub fn reserved_tail_clean(&self) -> bool {
        self.reserved_clean
    }

    /// Serialize back into the 256-byte layout (reserved tail zeroed).
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut out = [0u8; FILE_HEADER_SIZE];
        out[..SIGNATURE.len()].copy_from_slice(SIGNATURE);
        out[32..36].copy_from_slice(&self.version.to_le_bytes());
        out[36..40].copy_from_slice(&self.properties.to_le_bytes());
        out[40..44].copy_from_slice(&self.license.to_le_bytes());
        let encrypt = match self.encrypt_version {
            EncryptVersion::None => 0,
            EncryptVersion::Legacy25 => 1,
            EncryptVersion::Enhanced30 => 2,
            EncryptVersion::Old30 => 3,
            EncryptVersion::Modern70 => 4,
            EncryptVersion::Unknown(v) => v,
        };
        out[44..48].copy_from_slice(&encrypt.to_le_bytes());
        out[48] = match self.kogl_country {
            KoglCountry::Korea => 6,
            KoglCountry::Us => 15,
            KoglCountry::Other(v) => v,
        };
        out
    }
}
