//! Lazy record tokenizer over a decoded stream.
//!
//! # Performance
//!
//! - Zero-copy: payloads are `Bytes` slices of the stream buffer
//! - Single forward pass, no backtracking
//! - One header parse per record

use super::record::{Record, RecordHeader};
use crate::common::error::{Error, Result};
use bytes::Bytes;
use zerocopy::{FromBytes, LE, U32};

/// Iterator over the records of one stream.
///
/// Yields `Err` once and then stops when the stream is truncated; a clean
/// end of stream ends the iteration with `None`.
#[derive(Debug, Clone)]
pub struct RecordReader {
    data: Bytes,
    offset: usize,
    failed: bool,
}

impl RecordReader {
    /// Create a reader over a decoded stream.
    #[inline]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            offset: 0,
            failed: false,
        }
    }

    /// Current byte offset in the stream.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn read_word(&self, at: usize) -> Result<u32> {
        self.data
            .get(at..at + 4)
            .and_then(|bytes| U32::<LE>::read_from_bytes(bytes).ok())
            .map(|v| v.get())
            .ok_or(Error::TruncatedHeader {
                offset: self.offset,
                needed: at + 4 - self.offset,
                available: self.data.len() - self.offset,
            })
    }

    /// Parse the record at the current offset.
    fn parse_next(&mut self) -> Result<Record> {
        let start = self.offset;
        let header = RecordHeader::unpack(self.read_word(start)?);

        let (size, payload_start) = if header.has_extended_size() {
            (self.read_word(start + 4)?, start + 8)
        } else {
            (header.size_field, start + 4)
        };

        let available = self.data.len() - payload_start;
        if size as usize > available {
            return Err(Error::TruncatedRecord {
                offset: start,
                tag_id: header.tag_id,
                declared: size as usize,
                available,
            });
        }

        let end = payload_start + size as usize;
        let record = Record {
            tag_id: header.tag_id,
            level: header.level,
            size,
            offset: start,
            extended: header.has_extended_size(),
            payload: self.data.slice(payload_start..end),
        };
        self.offset = end;

        log::trace!(
            "record {} (0x{:03X}) level {} size {} at {}",
            record.tag().name(),
            record.tag_id,
            record.level,
            record.size,
            record.offset
        );
        Ok(record)
    }

    /// Read every record, stopping at the first error.
    pub fn read_all(self) -> Result<Vec<Record>> {
        self.collect()
    }
}

impl Iterator for RecordReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.data.len() {
            return None;
        }
        match self.parse_next() {
            Ok(record) => Some(Ok(record)),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len().saturating_sub(self.offset);
        (0, Some(remaining / 4))
    }
}
