//! Little-endian readers over record payloads.
//!
//! Every multi-byte quantity in an HWP stream is little-endian. The helpers
//! here read at an explicit offset and fail with [`BinaryError`] instead of
//! panicking when the payload is shorter than the field being read.

use zerocopy::{FromBytes, I32, LE, U16, U32};

/// Binary parsing error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryError {
    /// Not enough data to read the requested type
    InsufficientData { expected: usize, available: usize },
}

impl std::fmt::Display for BinaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryError::InsufficientData {
                expected,
                available,
            } => write!(
                f,
                "Insufficient data: expected {}, got {}",
                expected, available
            ),
        }
    }
}

impl std::error::Error for BinaryError {}

/// Result type for binary operations
pub type BinaryResult<T> = Result<T, BinaryError>;

#[inline]
fn field(data: &[u8], offset: usize, width: usize) -> BinaryResult<&[u8]> {
    let end = offset.checked_add(width).unwrap_or(usize::MAX);
    data.get(offset..end).ok_or(BinaryError::InsufficientData {
        expected: end,
        available: data.len(),
    })
}

/// Read a single byte at the given offset.
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> BinaryResult<u8> {
    field(data, offset, 1).map(|b| b[0])
}

/// Read a little-endian u16 from a byte slice at the given offset.
///
/// # Examples
///
/// ```
/// use hwp5::common::binary::read_u16_le;
/// let data = [0x34, 0x12, 0x78, 0x56];
/// assert_eq!(read_u16_le(&data, 0).unwrap(), 0x1234);
/// assert_eq!(read_u16_le(&data, 2).unwrap(), 0x5678);
/// ```
#[inline]
pub fn read_u16_le(data: &[u8], offset: usize) -> BinaryResult<u16> {
    let bytes = field(data, offset, 2)?;
    Ok(U16::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian u32 from a byte slice at the given offset.
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> BinaryResult<u32> {
    let bytes = field(data, offset, 4)?;
    Ok(U32::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Read a little-endian i32 from a byte slice at the given offset.
#[inline]
pub fn read_i32_le(data: &[u8], offset: usize) -> BinaryResult<i32> {
    let bytes = field(data, offset, 4)?;
    Ok(I32::<LE>::read_from_bytes(bytes)
        .map(|v| v.get())
        .unwrap_or_default())
}

/// Reinterpret a byte slice as UTF-16LE code units.
///
/// A trailing odd byte is ignored; callers that care check the length first.
pub fn read_code_units(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Read a length-prefixed WCHAR string and advance `offset` past it.
///
/// The prefix is a u16 count of UTF-16 code units, the layout HWP uses for
/// every name field in DocInfo records.
pub fn read_prefixed_wstring(data: &[u8], offset: &mut usize) -> BinaryResult<String> {
    let len = read_u16_le(data, *offset)? as usize;
    let bytes = field(data, *offset + 2, len * 2)?;
    *offset += 2 + len * 2;
    let units = read_code_units(bytes);
    Ok(String::from_utf16_lossy(&units))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_reads_fail() {
        let data = [0x01, 0x02, 0x03];
        assert_eq!(
            read_u32_le(&data, 0),
            Err(BinaryError::InsufficientData {
                expected: 4,
                available: 3
            })
        );
        assert!(read_u16_le(&data, 2).is_err());
        assert_eq!(read_u8(&data, 2), Ok(0x03));
    }

    #[test]
    fn test_signed_read() {
        let data = [0xFE, 0xFF, 0xFF, 0xFF];
        assert_eq!(read_i32_le(&data, 0).unwrap(), -2);
    }

    #[test]
    fn test_prefixed_wstring() {
        // len = 2, "가A", then a trailing byte that must stay unread
        let data = [0x02, 0x00, 0x00, 0xAC, 0x41, 0x00, 0x7F];
        let mut offset = 0;
        assert_eq!(read_prefixed_wstring(&data, &mut offset).unwrap(), "가A");
        assert_eq!(offset, 6);
    }

    #[test]
    fn test_prefixed_wstring_truncated() {
        let data = [0x05, 0x00, 0x41, 0x00];
        let mut offset = 0;
        assert!(read_prefixed_wstring(&data, &mut offset).is_err());
        assert_eq!(offset, 0);
    }
}
