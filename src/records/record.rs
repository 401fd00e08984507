use crate::helpers::RecordFlags;
use crate::records::record_type::RecordKind;

/// One key/value entry of the header chunk.
///
/// `content` holds the exact bytes written between the record descriptor and
/// its padding. Records decoded from disk keep their original content; records
/// built through [`MetadataRecord::new`] get `key NUL value NUL`, or just `key`
/// when the value is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub kind: RecordKind,
    pub flags: RecordFlags,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    content: Vec<u8>,
}

impl MetadataRecord {
    pub fn new(kind: RecordKind, key: &[u8], value: &[u8]) -> Self {
        let mut content = Vec::with_capacity(key.len() + value.len() + 2);
        content.extend_from_slice(key);
        if !value.is_empty() {
            content.push(0);
            content.extend_from_slice(value);
            content.push(0);
        }

        Self {
            kind,
            flags: RecordFlags::empty(),
            key: key.to_vec(),
            value: value.to_vec(),
            content,
        }
    }

    /// Splits raw record content into key and value.
    ///
    /// The first NUL-separated field is the key. With two or more fields the
    /// last one is the trailing terminator and is dropped; the fields between
    /// are joined back with NUL to form the value.
    pub fn from_content(kind: RecordKind, flags: RecordFlags, content: Vec<u8>) -> Self {
        let fields: Vec<&[u8]> = content.split(|&b| b == 0).collect();
        let key = fields[0].to_vec();
        let value = if fields.len() > 2 {
            fields[1..fields.len() - 1].join(&0u8)
        } else {
            Vec::new()
        };

        Self {
            kind,
            flags,
            key,
            value,
            content,
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Byte length of the content before padding.
    pub fn stored_length(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn key_str(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }

    pub fn value_str(&self) -> String {
        String::from_utf8_lossy(&self.value).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_with_value_is_nul_terminated() {
        let record = MetadataRecord::new(RecordKind::FileInfo, b"Note", b"hello");
        assert_eq!(record.content(), b"Note\0hello\0");
        assert_eq!(record.stored_length(), 11);
    }

    #[test]
    fn new_record_without_value_is_bare_key() {
        let record = MetadataRecord::new(RecordKind::Version, b"2022", b"");
        assert_eq!(record.content(), b"2022");
    }

    #[test]
    fn content_split_drops_terminator_and_joins_middle() {
        let record = MetadataRecord::from_content(
            RecordKind::Other(crate::records::record_type::Tag(*b"INCL")),
            RecordFlags::empty(),
            b"key\0a\0b\0".to_vec(),
        );
        assert_eq!(record.key, b"key");
        assert_eq!(record.value, b"a\0b");
        assert_eq!(record.content(), b"key\0a\0b\0");
    }

    #[test]
    fn content_without_separator_is_key_only() {
        let record =
            MetadataRecord::from_content(RecordKind::Version, RecordFlags::empty(), b"2024".to_vec());
        assert_eq!(record.key, b"2024");
        assert!(record.value.is_empty());

        let unterminated =
            MetadataRecord::from_content(RecordKind::FileInfo, RecordFlags::empty(), b"k\0v".to_vec());
        assert_eq!(unterminated.key, b"k");
        assert!(unterminated.value.is_empty());
        assert_eq!(unterminated.content(), b"k\0v");
    }
}
