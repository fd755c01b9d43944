//! Bridge to the compound-file container.
//!
//! Locating streams inside the OLE compound file is not this crate's job.
//! The decoder consumes a [`StreamSource`]: named, fully materialized byte
//! streams. [`DecodedStreams::prepare`] turns the raw streams of a container
//! into decoded ones, asking a [`StreamCodec`] to decrypt and inflate the
//! record streams exactly when the [`FileHeader`] flags say so.

use super::consts::{FILE_HEADER_STREAM, is_record_stream, is_view_text_stream};
use super::header::FileHeader;
use crate::common::error::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeMap;

/// A named collection of decoded byte streams.
///
/// Names use `/` between storage and stream, e.g. `BodyText/Section0`.
pub trait StreamSource {
    /// Contents of the named stream, if present.
    fn stream(&self, name: &str) -> Option<Bytes>;

    /// All stream names, in a stable order.
    fn names(&self) -> Vec<String>;

    /// Contents of a stream that must exist.
    fn require(&self, name: &str) -> Result<Bytes> {
        self.stream(name)
            .ok_or_else(|| Error::StreamNotFound(name.to_string()))
    }
}

/// In-memory [`StreamSource`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStreams {
    streams: BTreeMap<String, Bytes>,
}

impl MemoryStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a stream.
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Bytes>) {
        self.streams.insert(name.into(), data.into());
    }

    /// Builder form of [`MemoryStreams::insert`].
    pub fn with_stream(mut self, name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl StreamSource for MemoryStreams {
    fn stream(&self, name: &str) -> Option<Bytes> {
        self.streams.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.streams.keys().cloned().collect()
    }
}

/// Inflate/decrypt primitives supplied by the container layer.
pub trait StreamCodec {
    /// Inflate a compressed stream.
    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt an encrypted stream.
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Raw-deflate [`StreamCodec`] backed by `flate2`.
///
/// HWP compresses with headerless deflate; a zlib wrapper is accepted too.
/// Decryption needs key material this codec does not have.
#[cfg(feature = "flate")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FlateCodec;

#[cfg(feature = "flate")]
impl StreamCodec for FlateCodec {
    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>> {
        use std::io::Read;

        let looks_zlib = data.len() >= 2
            && data[0] == 0x78
            && u16::from_be_bytes([data[0], data[1]]) % 31 == 0;
        if looks_zlib {
            let mut inflated = Vec::with_capacity(data.len() * 4);
            match flate2::read::ZlibDecoder::new(data).read_to_end(&mut inflated) {
                Ok(_) => return Ok(inflated),
                // a raw stored block can start with a valid zlib header
                Err(e) => log::trace!("zlib inflate failed ({}), retrying as raw deflate", e),
            }
        }

        let mut inflated = Vec::with_capacity(data.len() * 4);
        flate2::read::DeflateDecoder::new(data)
            .read_to_end(&mut inflated)
            .map_err(|e| Error::Decompress(e.to_string()))?;
        Ok(inflated)
    }

    fn decrypt(&self, _data: &[u8]) -> Result<Vec<u8>> {
        Err(Error::Unsupported(
            "encrypted HWP streams need a decrypting codec".to_string(),
        ))
    }
}

/// Decrypt then inflate the record stream `name` as the header flags
/// require.
///
/// Neither primitive is called when its flag is clear. `ViewText` streams
/// of a distribution document are always decrypted.
pub fn prepare_stream(
    header: &FileHeader,
    name: &str,
    raw: &[u8],
    codec: &dyn StreamCodec,
) -> Result<Bytes> {
    let mut data = Bytes::copy_from_slice(raw);
    if header.is_encrypted() || (header.is_distribution() && is_view_text_stream(name)) {
        data = Bytes::from(codec.decrypt(&data)?);
    }
    if header.is_compressed() {
        data = Bytes::from(codec.inflate(&data)?);
    }
    Ok(data)
}

/// Decoded view of a container, ready for the record decoder.
#[derive(Debug, Default)]
pub struct DecodedStreams {
    inner: MemoryStreams,
    failed: Vec<(String, Error)>,
}

impl DecodedStreams {
    /// Decode every record stream of `raw`.
    ///
    /// `FileHeader` is parsed first; a bad header fails the container. Only
    /// record streams go through `codec`, everything else (previews,
    /// summary, `BinData`) is passed through untouched. A record stream the
    /// codec rejects is left out and reported by [`DecodedStreams::failed`].
    pub fn prepare(raw: &dyn StreamSource, codec: &dyn StreamCodec) -> Result<(FileHeader, Self)> {
        let header_bytes = raw.require(FILE_HEADER_STREAM)?;
        let header = FileHeader::parse(&header_bytes)?;

        let mut streams = Self::default();
        for name in raw.names() {
            let Some(data) = raw.stream(&name) else {
                continue;
            };
            if !is_record_stream(&name) {
                streams.inner.insert(name, data);
                continue;
            }
            match prepare_stream(&header, &name, &data, codec) {
                Ok(decoded) => {
                    log::trace!("prepared stream {} ({} bytes)", name, decoded.len());
                    streams.inner.insert(name, decoded);
                },
                Err(err) => {
                    log::warn!("{}: stream could not be decoded: {}", name, err);
                    let err = err.in_stream(name.as_str());
                    streams.failed.push((name, err));
                },
            }
        }
        Ok((header, streams))
    }

    /// Record streams the codec could not decode, with their errors.
    pub fn failed(&self) -> &[(String, Error)] {
        &self.failed
    }

    /// Take the failed streams out, leaving the list empty.
    pub fn take_failed(&mut self) -> Vec<(String, Error)> {
        std::mem::take(&mut self.failed)
    }
}

impl StreamSource for DecodedStreams {
    fn stream(&self, name: &str) -> Option<Bytes> {
        self.inner.stream(name)
    }

    fn names(&self) -> Vec<String> {
        self.inner.names()
    }
}
