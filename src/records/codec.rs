//! Flat header records: decoding the header chunk's content into
//! [`MetadataRecord`]s and encoding them back.
//!
//! ```text
//! record+ : [tag (4)][reserved (4)][length (u64)][content][zero pad to 8]
//! ```

use tracing::{debug, trace};

use crate::general::error::{FormatError, Result};
use crate::helpers::helper::{align_up, padding_for};
use crate::records::record::MetadataRecord;
use crate::records::record_type::{RecordKind, Tag};
use crate::storage::chunk::RecordDescriptor;

/// Decodes the records in `bytes`, the header chunk's content after its
/// sub-type tag. `base_offset` is the absolute file offset of `bytes[0]`;
/// padding is computed against absolute offsets.
///
/// The walk ends at the end of `bytes`, at a leftover tail too short for a
/// descriptor, or at a nested `FOR8` group, which is never entered.
pub fn decode(bytes: &[u8], base_offset: u64) -> Result<Vec<MetadataRecord>> {
    let end = bytes.len() as u64;
    let mut cursor = 0u64;
    let mut records = Vec::new();

    while cursor + RecordDescriptor::SIZE as u64 <= end {
        let mut head = &bytes[cursor as usize..];
        let descriptor = RecordDescriptor::read_from(&mut head)?;

        if descriptor.tag == Tag::FOR8 {
            debug!(offset = base_offset + cursor, "nested group ends flat records");
            break;
        }

        let content_start = cursor + RecordDescriptor::SIZE as u64;
        let content_end = content_start
            .checked_add(descriptor.length)
            .filter(|&e| e <= end)
            .ok_or(FormatError::InvalidLength {
                tag: descriptor.tag,
                length: descriptor.length,
            })?;

        let content = bytes[content_start as usize..content_end as usize].to_vec();
        let record = MetadataRecord::from_content(
            RecordKind::from_tag(descriptor.tag),
            descriptor.flags,
            content,
        );
        trace!(tag = %descriptor.tag, key = %record.key_str(), length = descriptor.length, "record");
        records.push(record);

        cursor = align_up(base_offset + content_end) - base_offset;
    }

    debug!(count = records.len(), "header records decoded");
    Ok(records)
}

/// Encodes records in the given order. The first record carries the
/// first-record marker in its reserved bytes.
pub fn encode<'a>(records: impl IntoIterator<Item = &'a MetadataRecord>) -> Vec<u8> {
    let mut buf = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        let descriptor = RecordDescriptor {
            tag: record.kind.tag(),
            flags: record.flags.for_position(index),
            length: record.stored_length(),
        };

        buf.extend_from_slice(&descriptor.to_bytes());
        buf.extend_from_slice(record.content());
        buf.resize(buf.len() + padding_for(record.stored_length()) as usize, 0);
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::general::error::HeaderError;
    use crate::helpers::RecordFlags;

    fn raw_record(tag: &[u8; 4], content: &[u8]) -> Vec<u8> {
        let mut buf = RecordDescriptor::new(Tag(*tag), content.len() as u64)
            .to_bytes()
            .to_vec();
        buf.extend_from_slice(content);
        buf.resize(align_up(buf.len() as u64) as usize, 0);
        buf
    }

    #[test]
    fn decodes_flat_records_with_padding() {
        let mut bytes = raw_record(b"VERS", b"2022");
        bytes.extend(raw_record(b"FINF", b"Note\0hello\0"));
        bytes.extend(raw_record(b"PLUG", b"mtoa\05.1\0"));

        let records = decode(&bytes, 40).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind, RecordKind::Version);
        assert_eq!(records[0].key, b"2022");
        assert_eq!(records[1].key_str(), "Note");
        assert_eq!(records[1].value_str(), "hello");
        assert_eq!(records[2].kind, RecordKind::Plugin);
        assert_eq!(records[2].value_str(), "5.1");
    }

    #[test]
    fn stops_at_nested_group() {
        let mut bytes = raw_record(b"FINF", b"a\0b\0");
        bytes.extend(raw_record(b"FOR8", b"DAGXjunk"));
        bytes.extend(raw_record(b"FINF", b"c\0d\0"));

        let records = decode(&bytes, 40).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn tolerates_short_tail_and_unknown_tags() {
        let mut bytes = raw_record(b"ZZZZ", b"opaque\x01\x02");
        bytes.extend_from_slice(&[0u8; 8]);

        let records = decode(&bytes, 40).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RecordKind::Other(Tag(*b"ZZZZ")));
        assert_eq!(records[0].content(), b"opaque\x01\x02");
    }

    #[test]
    fn record_running_past_region_is_rejected() {
        let mut bytes = RecordDescriptor::new(Tag(*b"FINF"), 64).to_bytes().to_vec();
        bytes.extend_from_slice(b"short\0");
        let err = decode(&bytes, 40).unwrap_err();
        assert!(matches!(err, HeaderError::Format(FormatError::InvalidLength { .. })));
    }

    #[test]
    fn encode_pads_every_record_to_eight_bytes() {
        let records = vec![
            MetadataRecord::new(RecordKind::Version, b"2024", b""),
            MetadataRecord::new(RecordKind::FileInfo, b"Note", b"updated"),
            MetadataRecord::new(RecordKind::FileInfo, b"k", b"v"),
        ];
        let bytes = encode(&records);

        let mut offset = 0usize;
        for record in &records {
            let length = u64::from_be_bytes(bytes[offset + 8..offset + 16].try_into().unwrap());
            assert_eq!(length, record.stored_length());
            let next = offset + RecordDescriptor::SIZE + length as usize;
            let padded = align_up(next as u64) as usize;
            assert_eq!(padded % 8, 0);
            assert!(bytes[next..padded].iter().all(|&b| b == 0));
            offset = padded;
        }
        assert_eq!(offset, bytes.len());
    }

    #[test]
    fn encode_marks_only_the_first_record() {
        let mut second = MetadataRecord::new(RecordKind::FileInfo, b"a", b"b");
        second.flags = RecordFlags::FIRST_RECORD;
        let records = vec![MetadataRecord::new(RecordKind::Version, b"2024", b""), second];
        let bytes = encode(&records);

        assert_eq!(&bytes[0..8], b"VERSF\0\0\0");
        assert_eq!(&bytes[24..32], b"FINF\0\0\0\0");
    }

    #[test]
    fn decode_after_encode_keeps_keys_and_values() {
        let records = vec![
            MetadataRecord::new(RecordKind::FileInfo, b"Note", b"hello"),
            MetadataRecord::new(RecordKind::Plugin, b"fbxmaya", b"2020.3"),
        ];
        let decoded = decode(&encode(&records), 40).unwrap();
        assert_eq!(decoded[0].key, records[0].key);
        assert_eq!(decoded[0].value, records[0].value);
        assert_eq!(decoded[1].content(), records[1].content());
        assert_eq!(decoded[0].flags, RecordFlags::FIRST_RECORD);
    }
}
