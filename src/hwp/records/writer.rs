//! Record encoder, the inverse of [`RecordReader`](super::RecordReader).

use super::record::{EXTENDED_SIZE, MAX_LEVEL, MAX_TAG_ID, Record, RecordHeader};
use crate::common::error::{Error, Result};

/// Appends records to an in-memory stream.
#[derive(Debug, Default)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append one record.
    ///
    /// Tag ids and levels wider than 10 bits cannot be represented and are
    /// rejected instead of being silently masked.
    pub fn write(&mut self, record: &Record) -> Result<()> {
        if record.tag_id > MAX_TAG_ID || record.level > MAX_LEVEL {
            return Err(Error::Unsupported(format!(
                "record tag {} / level {} exceeds 10 bits",
                record.tag_id, record.level
            )));
        }
        let size = record.payload.len();
        let size_word = u32::try_from(size).map_err(|_| {
            Error::Unsupported(format!("record payload of {} bytes exceeds 4 GiB", size))
        })?;

        let extended = record.needs_extended_size();
        let header = RecordHeader {
            tag_id: record.tag_id,
            level: record.level,
            size_field: if extended { EXTENDED_SIZE } else { size_word },
        };
        self.buf.extend_from_slice(&header.pack().to_le_bytes());
        if extended {
            self.buf.extend_from_slice(&size_word.to_le_bytes());
        }
        self.buf.extend_from_slice(&record.payload);
        Ok(())
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Encode a flat record sequence into a stream.
pub fn encode_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Result<Vec<u8>> {
    let mut writer = RecordWriter::new();
    for record in records {
        writer.write(record)?;
    }
    Ok(writer.into_bytes())
}
