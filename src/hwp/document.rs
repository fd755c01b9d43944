//! Document-level decoding.
//!
//! [`decode_document`] reads the header, DocInfo and every section of a
//! decoded stream collection into a [`DocumentModel`]:
//!
//! - A bad `FileHeader` fails the whole document.
//! - A missing or structurally broken DocInfo or section stream fails that
//!   stream. In strict mode this fails the document, tagged with the stream
//!   name; otherwise the failure is collected and the other streams still
//!   decode, with an empty [`DocInfo`] standing in for a lost one.
//! - A record that fails to decode is collected (non-strict) or returned
//!   (strict).

use super::consts::{
    BODY_TEXT_STORAGE, DOC_INFO_STREAM, FILE_HEADER_STREAM, VIEW_TEXT_STORAGE,
};
use super::container::{DecodedStreams, StreamCodec, StreamSource};
use super::header::FileHeader;
use super::model::docinfo::{
    BinData, BorderFill, CompatibleDocument, DocumentProperties, FaceName, IdMappings,
};
use super::model::{DocumentModelAssembler, Node, NodeKind, Paragraph, SubtreeFailure, Walk};
use super::records::{RecordReader, RecordTree, encode_records};
use super::text::ControlCatalog;
use crate::common::error::Result;
use bytes::Bytes;

/// Decoder configuration.
///
/// # Examples
///
/// ```
/// use hwp5::hwp::document::DecodeOptions;
///
/// let options = DecodeOptions::new().with_strict(true);
/// assert!(options.strict());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    strict: bool,
    catalog: ControlCatalog,
}

impl DecodeOptions {
    /// Non-strict decoding with the HWP 5.0 control catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return record errors instead of collecting them.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Use `catalog` to size paragraph controls.
    pub fn with_control_catalog(mut self, catalog: ControlCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn control_catalog(&self) -> &ControlCatalog {
        &self.catalog
    }
}

/// The DocInfo stream: document-wide tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocInfo {
    pub nodes: Vec<Node>,
}

impl DocInfo {
    pub fn walk(&self) -> Walk<'_> {
        Walk::forest(&self.nodes)
    }

    fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.walk().map(|node| &node.kind)
    }

    pub fn properties(&self) -> Option<&DocumentProperties> {
        self.kinds().find_map(|kind| match kind {
            NodeKind::DocumentProperties(props) => Some(props),
            _ => None,
        })
    }

    pub fn id_mappings(&self) -> Option<&IdMappings> {
        self.kinds().find_map(|kind| match kind {
            NodeKind::IdMappings(mappings) => Some(mappings),
            _ => None,
        })
    }

    pub fn bin_data(&self) -> impl Iterator<Item = &BinData> {
        self.kinds().filter_map(|kind| match kind {
            NodeKind::BinData(bin) => Some(bin),
            _ => None,
        })
    }

    pub fn face_names(&self) -> impl Iterator<Item = &FaceName> {
        self.kinds().filter_map(|kind| match kind {
            NodeKind::FaceName(face) => Some(face),
            _ => None,
        })
    }

    pub fn border_fills(&self) -> impl Iterator<Item = &BorderFill> {
        self.kinds().filter_map(|kind| match kind {
            NodeKind::BorderFill(fill) => Some(fill),
            _ => None,
        })
    }

    pub fn compatible_document(&self) -> Option<CompatibleDocument> {
        self.kinds().find_map(|kind| match kind {
            NodeKind::CompatibleDocument(target) => Some(*target),
            _ => None,
        })
    }

    /// Re-encode the stream from its records.
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_records(self.walk().map(|node| &node.record))
    }
}

/// One body section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Section number taken from the stream name
    pub index: usize,
    /// Full stream name, e.g. `BodyText/Section0`
    pub stream: String,
    pub nodes: Vec<Node>,
}

impl Section {
    /// Top-level paragraphs in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = Paragraph<'_>> {
        self.nodes.iter().filter_map(Node::as_paragraph)
    }

    /// Plain text of the top-level paragraphs, one line each.
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(|para| para.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn walk(&self) -> Walk<'_> {
        Walk::forest(&self.nodes)
    }

    /// Re-encode the section stream.
    ///
    /// Output matches the decoded input byte for byte.
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_records(self.walk().map(|node| &node.record))
    }
}

/// A decoded document.
#[derive(Debug, Clone)]
pub struct DocumentModel {
    pub header: FileHeader,
    pub doc_info: DocInfo,
    pub sections: Vec<Section>,
}

impl DocumentModel {
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.iter().find(|s| s.index == index)
    }

    /// Plain text of every section.
    pub fn text(&self) -> String {
        self.sections
            .iter()
            .map(Section::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Re-encode the DocInfo stream.
    pub fn encode_doc_info(&self) -> Result<Vec<u8>> {
        self.doc_info.encode()
    }
}

/// A model plus the failures tolerated while building it.
#[derive(Debug)]
pub struct Decoded {
    pub model: DocumentModel,
    pub failures: Vec<SubtreeFailure>,
}

impl Decoded {
    /// Whether every record decoded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// One line per failure: stream name and root cause.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| format!("{}: {}", f.stream, f.error.root()))
            .collect()
    }
}

fn build_tree(data: Bytes) -> Result<RecordTree> {
    RecordTree::build(RecordReader::new(data))
}

/// Section streams under `storage`, ordered by section number.
fn section_streams(source: &dyn StreamSource, storage: &str) -> Vec<(usize, String)> {
    let prefix = format!("{}/Section", storage);
    let mut sections: Vec<(usize, String)> = source
        .names()
        .into_iter()
        .filter_map(|name| {
            let index = name.strip_prefix(&prefix)?.parse().ok()?;
            Some((index, name))
        })
        .collect();
    sections.sort();
    sections
}

/// Decode a document from already decoded streams.
///
/// Streams must be inflated and decrypted; see [`decode_container`] for raw
/// container streams.
pub fn decode_document(source: &dyn StreamSource, options: &DecodeOptions) -> Result<Decoded> {
    let header_bytes = source.require(FILE_HEADER_STREAM)?;
    let header = FileHeader::parse(&header_bytes).map_err(|e| e.in_stream(FILE_HEADER_STREAM))?;
    log::debug!(
        "HWP {} (compressed: {}, distribution: {})",
        header.version,
        header.is_compressed(),
        header.is_distribution()
    );

    let assembler = DocumentModelAssembler::new(options.control_catalog(), options.strict());
    let mut failures = Vec::new();

    let doc_info = match source.require(DOC_INFO_STREAM).and_then(build_tree) {
        Ok(tree) => {
            log::debug!("{}: {} records", DOC_INFO_STREAM, tree.len());
            DocInfo {
                nodes: assembler.assemble(DOC_INFO_STREAM, &tree, &mut failures)?,
            }
        },
        Err(err) if !options.strict() => {
            log::warn!("{}: skipped: {}", DOC_INFO_STREAM, err);
            failures.push(SubtreeFailure::stream(
                DOC_INFO_STREAM,
                err.in_stream(DOC_INFO_STREAM),
            ));
            DocInfo::default()
        },
        Err(err) => return Err(err.in_stream(DOC_INFO_STREAM)),
    };

    let storage = if header.is_distribution() {
        VIEW_TEXT_STORAGE
    } else {
        BODY_TEXT_STORAGE
    };
    let streams = section_streams(source, storage);
    if let Some(props) = doc_info.properties() {
        if usize::from(props.section_count) != streams.len() {
            log::warn!(
                "DocInfo declares {} sections but {} streams were found under {}",
                props.section_count,
                streams.len(),
                storage
            );
        }
    }

    let mut sections = Vec::with_capacity(streams.len());
    for (index, name) in streams {
        let tree = match source.require(&name).and_then(build_tree) {
            Ok(tree) => tree,
            Err(err) if !options.strict() => {
                log::warn!("{}: section skipped: {}", name, err);
                failures.push(SubtreeFailure::stream(&name, err.in_stream(name.as_str())));
                continue;
            },
            Err(err) => return Err(err.in_stream(name)),
        };
        let nodes = assembler.assemble(&name, &tree, &mut failures)?;
        log::debug!("{}: {} records", name, tree.len());
        sections.push(Section {
            index,
            stream: name,
            nodes,
        });
    }

    if !failures.is_empty() {
        log::warn!("{} records or streams could not be decoded", failures.len());
    }

    Ok(Decoded {
        model: DocumentModel {
            header,
            doc_info,
            sections,
        },
        failures,
    })
}

/// Decode a document from raw container streams.
///
/// Record streams are decrypted and inflated through `codec` as the header
/// requires, then handed to [`decode_document`]. A stream the codec rejects
/// fails the document in strict mode and is reported as a failure otherwise.
pub fn decode_container(
    raw: &dyn StreamSource,
    codec: &dyn StreamCodec,
    options: &DecodeOptions,
) -> Result<Decoded> {
    let (_, mut streams) = DecodedStreams::prepare(raw, codec)?;
    let failed = streams.take_failed();
    if options.strict() {
        if let Some((_, err)) = failed.into_iter().next() {
            return Err(err);
        }
        return decode_document(&streams, options);
    }

    let mut decoded = decode_document(&streams, options)?;
    // a rejected DocInfo is otherwise reported as missing
    decoded
        .failures
        .retain(|f| !failed.iter().any(|(name, _)| *name == f.stream));
    decoded.failures.extend(
        failed
            .into_iter()
            .map(|(name, err)| SubtreeFailure::stream(&name, err)),
    );
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::hwp::container::MemoryStreams;
    use crate::hwp::header::tests::header_bytes;
    use crate::hwp::model::paragraph::tests::para_header_bytes;
    use crate::hwp::records::{Record, RecordWriter};
    use crate::hwp::text::control::{ControlKind, FIELD_START, PARA_BREAK};

    fn stream(records: &[Record]) -> Vec<u8> {
        let mut writer = RecordWriter::new();
        for record in records {
            writer.write(record).unwrap();
        }
        writer.into_bytes()
    }

    fn utf16_bytes(text: &str) -> Vec<u8> {
        text.encode_utf16()
            .chain([PARA_BREAK])
            .flat_map(|u| u.to_le_bytes())
            .collect()
    }

    fn paragraph(text: &str) -> Vec<Record> {
        let count = text.encode_utf16().count() as u32 + 1;
        vec![
            Record::new(0x42, 0, para_header_bytes(count, 0, 0, 0)),
            Record::new(0x43, 1, utf16_bytes(text)),
        ]
    }

    fn doc_properties(sections: u16) -> Record {
        let mut payload = sections.to_le_bytes().to_vec();
        payload.resize(26, 0);
        Record::new(0x10, 0, payload)
    }

    fn document(sections: &[Vec<u8>]) -> MemoryStreams {
        let mut streams = MemoryStreams::new()
            .with_stream(FILE_HEADER_STREAM, header_bytes(0))
            .with_stream(
                DOC_INFO_STREAM,
                stream(&[doc_properties(sections.len() as u16)]),
            );
        for (i, data) in sections.iter().enumerate() {
            streams.insert(format!("BodyText/Section{}", i), data.clone());
        }
        streams
    }

    #[test]
    fn test_decodes_sections_in_order() {
        let first = stream(&[paragraph("안녕"), paragraph("world")].concat());
        let second = stream(&paragraph("second"));
        let decoded = decode_document(&document(&[first, second]), &DecodeOptions::new()).unwrap();

        assert!(decoded.is_clean());
        let model = &decoded.model;
        assert_eq!(model.header.version.to_string(), "5.0.3.2");
        assert_eq!(model.doc_info.properties().unwrap().section_count, 2);
        assert_eq!(model.sections.len(), 2);
        assert_eq!(model.sections[0].stream, "BodyText/Section0");
        assert_eq!(model.sections[0].text(), "안녕\nworld");
        assert_eq!(model.text(), "안녕\nworld\nsecond");
        assert_eq!(model.section(1).unwrap().paragraphs().count(), 1);
    }

    #[test]
    fn test_section_numbers_sort_numerically() {
        let sections: Vec<Vec<u8>> = (0..11).map(|i| stream(&paragraph(&i.to_string()))).collect();
        let decoded = decode_document(&document(&sections), &DecodeOptions::new()).unwrap();
        let indices: Vec<usize> = decoded.model.sections.iter().map(|s| s.index).collect();
        assert_eq!(indices, (0..11).collect::<Vec<_>>());
        assert_eq!(decoded.model.sections[10].text(), "10");
    }

    #[test]
    fn test_bad_signature_is_fatal() {
        let mut streams = document(&[]);
        let mut header = header_bytes(0);
        header[0] = b'X';
        streams.insert(FILE_HEADER_STREAM, header);
        let err = decode_document(&streams, &DecodeOptions::new()).unwrap_err();
        assert!(matches!(err.root(), Error::SignatureMismatch));
    }

    #[test]
    fn test_doc_info_structural_error_spares_sections() {
        let mut streams = document(&[stream(&paragraph("survivor"))]);
        // DOCUMENT_PROPERTIES claims 26 bytes, none follow
        streams.insert(DOC_INFO_STREAM, (0x010u32 | (26 << 20)).to_le_bytes().to_vec());

        let decoded = decode_document(&streams, &DecodeOptions::new()).unwrap();
        assert_eq!(decoded.model.text(), "survivor");
        assert!(decoded.model.doc_info.nodes.is_empty());
        assert_eq!(decoded.failures.len(), 1);
        let failure = &decoded.failures[0];
        assert_eq!(failure.stream, DOC_INFO_STREAM);
        assert_eq!(failure.tag_id, Some(0x010));
        assert_eq!(failure.offset, Some(0));
        assert!(matches!(failure.error.root(), Error::TruncatedRecord { .. }));

        let err = decode_document(&streams, &DecodeOptions::new().with_strict(true)).unwrap_err();
        match &err {
            Error::Stream { stream, source } => {
                assert_eq!(stream, DOC_INFO_STREAM);
                assert!(matches!(**source, Error::TruncatedRecord { .. }));
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_broken_section_does_not_stop_others() {
        let good = stream(&paragraph("ok"));
        // text record at level 2 under a level-0 paragraph
        let mut bad_records = paragraph("x");
        bad_records[1] = Record::new(0x43, 2, utf16_bytes("x"));
        let bad = stream(&bad_records);
        let streams = document(&[good.clone(), bad, good]);

        let decoded = decode_document(&streams, &DecodeOptions::new()).unwrap();
        assert_eq!(decoded.model.sections.len(), 2);
        assert_eq!(decoded.model.sections[1].index, 2);
        assert_eq!(decoded.failures.len(), 1);
        let failure = &decoded.failures[0];
        assert_eq!(failure.stream, "BodyText/Section1");
        assert_eq!(failure.tag_id, Some(0x43));
        assert!(failure.error.is_structural());
        assert_eq!(
            decoded.failure_messages()[0],
            "BodyText/Section1: Level skip at offset 28 (tag 67): level 2 with only 1 open ancestors"
        );

        let err = decode_document(&streams, &DecodeOptions::new().with_strict(true)).unwrap_err();
        match &err {
            Error::Stream { stream, .. } => assert_eq!(stream, "BodyText/Section1"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(err.root(), Error::LevelSkip { level: 2, depth: 1, .. }));
    }

    #[test]
    fn test_custom_catalog_changes_reservation() {
        // "AB", field start reserving two slots, then the paragraph break
        let units = [0x41u16, 0x42, FIELD_START, 0, 0, PARA_BREAK];
        let records = vec![
            Record::new(0x42, 0, para_header_bytes(6, 1 << FIELD_START, 0, 0)),
            Record::new(
                0x43,
                1,
                units.iter().flat_map(|u| u.to_le_bytes()).collect::<Vec<_>>(),
            ),
        ];
        let streams = document(&[stream(&records)]);

        let catalog = ControlCatalog::hwp5().with(FIELD_START, ControlKind::Extended, 2, "field_start");
        let options = DecodeOptions::new()
            .with_strict(true)
            .with_control_catalog(catalog);
        let decoded = decode_document(&streams, &options).unwrap();
        let section = &decoded.model.sections[0];
        let para = section.paragraphs().next().unwrap();
        assert_eq!(para.text(), "AB");
        assert_eq!(para.tokens().len(), 3);

        // the stock catalog reserves seven slots and runs off the end
        let err = decode_document(&streams, &DecodeOptions::new().with_strict(true)).unwrap_err();
        assert!(matches!(err.root(), Error::UnterminatedControl { .. }));
    }

    #[test]
    fn test_reencode_is_byte_identical() {
        let mut records = paragraph("round trip");
        records.push(Record::new(0x47, 1, b" dces".to_vec()));
        records.push(Record::new(0x3E0, 2, vec![0xAB; 5000]));
        let mut escaped = Record::new(0x45, 1, Vec::<u8>::new());
        escaped.extended = true;
        records.push(escaped);
        let section = stream(&records);

        let doc_info = stream(&[doc_properties(1), Record::new(0x1F, 0, vec![9, 9])]);
        let mut streams = document(&[section.clone()]);
        streams.insert(DOC_INFO_STREAM, doc_info.clone());

        let decoded = decode_document(&streams, &DecodeOptions::new()).unwrap();
        assert!(decoded.is_clean());
        assert_eq!(decoded.model.sections[0].encode().unwrap(), section);
        assert_eq!(decoded.model.encode_doc_info().unwrap(), doc_info);
    }

    #[test]
    fn test_unknown_only_stream_is_idempotent() {
        let records = vec![
            Record::new(0x3A0, 0, vec![1, 2, 3]),
            Record::new(0x3A1, 1, Vec::<u8>::new()),
            Record::new(0x3A2, 2, vec![0; 4095]),
            Record::new(0x3A0, 0, vec![4]),
        ];
        let once = stream(&records);
        let streams = document(&[once.clone()]);
        let decoded = decode_document(&streams, &DecodeOptions::new().with_strict(true)).unwrap();
        let section = &decoded.model.sections[0];
        assert!(section.walk().all(Node::is_opaque));
        assert_eq!(section.encode().unwrap(), once);
    }

    #[test]
    fn test_distribution_reads_view_text() {
        let distribution = 1 << 2;
        let streams = MemoryStreams::new()
            .with_stream(FILE_HEADER_STREAM, header_bytes(distribution))
            .with_stream(DOC_INFO_STREAM, stream(&[doc_properties(1)]))
            .with_stream("BodyText/Section0", stream(&paragraph("body")))
            .with_stream("ViewText/Section0", stream(&paragraph("view")));
        let decoded = decode_document(&streams, &DecodeOptions::new()).unwrap();
        assert_eq!(decoded.model.text(), "view");
    }

    #[test]
    fn test_missing_doc_info() {
        let streams = MemoryStreams::new()
            .with_stream(FILE_HEADER_STREAM, header_bytes(0))
            .with_stream("BodyText/Section0", stream(&paragraph("alone")));
        let decoded = decode_document(&streams, &DecodeOptions::new()).unwrap();
        assert_eq!(decoded.model.text(), "alone");
        assert!(matches!(
            decoded.failures[0].error.root(),
            Error::StreamNotFound(name) if name == DOC_INFO_STREAM
        ));

        let err = decode_document(&streams, &DecodeOptions::new().with_strict(true)).unwrap_err();
        assert!(matches!(err.root(), Error::StreamNotFound(name) if name == DOC_INFO_STREAM));
    }

    /// Inflates by stripping a leading marker byte, fails without it.
    struct MarkerCodec;

    impl StreamCodec for MarkerCodec {
        fn inflate(&self, data: &[u8]) -> Result<Vec<u8>> {
            match data.split_first() {
                Some((0xAA, rest)) => Ok(rest.to_vec()),
                _ => Err(Error::Decompress("missing marker".to_string())),
            }
        }

        fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.to_vec())
        }
    }

    fn marked(data: Vec<u8>) -> Vec<u8> {
        let mut out = vec![0xAA];
        out.extend(data);
        out
    }

    #[test]
    fn test_container_codec_failure_is_reported_once() {
        let raw = MemoryStreams::new()
            .with_stream(FILE_HEADER_STREAM, header_bytes(1))
            .with_stream(DOC_INFO_STREAM, stream(&[doc_properties(1)]))
            .with_stream("BodyText/Section0", marked(stream(&paragraph("kept"))));

        let decoded = decode_container(&raw, &MarkerCodec, &DecodeOptions::new()).unwrap();
        assert_eq!(decoded.model.text(), "kept");
        assert_eq!(decoded.failures.len(), 1);
        assert_eq!(decoded.failures[0].stream, DOC_INFO_STREAM);
        assert!(matches!(decoded.failures[0].error.root(), Error::Decompress(_)));

        let err = decode_container(&raw, &MarkerCodec, &DecodeOptions::new().with_strict(true))
            .unwrap_err();
        assert!(matches!(err.root(), Error::Decompress(_)));
    }

    #[cfg(feature = "flate")]
    #[test]
    fn test_decode_compressed_container() {
        use crate::hwp::container::FlateCodec;
        use flate2::Compression;
        use flate2::write::DeflateEncoder;
        use std::io::Write;

        fn deflate(data: &[u8]) -> Vec<u8> {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }

        let raw = MemoryStreams::new()
            .with_stream(FILE_HEADER_STREAM, header_bytes(1))
            .with_stream(DOC_INFO_STREAM, deflate(&stream(&[doc_properties(1)])))
            .with_stream("BodyText/Section0", deflate(&stream(&paragraph("packed"))));
        let decoded = decode_container(&raw, &FlateCodec, &DecodeOptions::new()).unwrap();
        assert!(decoded.model.header.is_compressed());
        assert_eq!(decoded.model.text(), "packed");
    }

    #[cfg(feature = "flate")]
    #[test]
    fn test_compressed_container_with_plain_preview() {
        use crate::hwp::container::FlateCodec;
        use flate2::Compression;
        use flate2::write::DeflateEncoder;
        use std::io::Write;

        fn deflate(data: &[u8]) -> Vec<u8> {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        }

        let preview: Vec<u8> = "미리보기 text".encode_utf16().flat_map(u16::to_le_bytes).collect();
        let raw = MemoryStreams::new()
            .with_stream(FILE_HEADER_STREAM, header_bytes(1))
            .with_stream(DOC_INFO_STREAM, deflate(&stream(&[doc_properties(1)])))
            .with_stream("BodyText/Section0", deflate(&stream(&paragraph("packed"))))
            .with_stream("PrvText", preview.clone());

        let decoded = decode_container(&raw, &FlateCodec, &DecodeOptions::new().with_strict(true))
            .unwrap();
        assert_eq!(decoded.model.text(), "packed");
        assert!(decoded.is_clean());

        let (_, streams) = DecodedStreams::prepare(&raw, &FlateCodec).unwrap();
        assert_eq!(streams.stream("PrvText").unwrap().as_ref(), preview.as_slice());
    }
}
