use std::io::{Read, Write};

use crate::helpers::RecordFlags;
use crate::helpers::helper::{read_tag, read_u32, read_u64};
use crate::records::record_type::Tag;

/// The 16-byte prefix shared by chunks and header records.
///
/// ```text
/// [ tag (4) | reserved (4) | length (u64, big-endian) ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub tag: Tag,
    pub flags: RecordFlags,
    pub length: u64,
}

impl RecordDescriptor {
    pub const SIZE: usize = 4 + 4 + 8;

    pub fn new(tag: Tag, length: u64) -> Self {
        Self {
            tag,
            flags: RecordFlags::empty(),
            length,
        }
    }

    pub fn read_from<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let tag = Tag(read_tag(reader)?);
        let flags = RecordFlags::from_bits_retain(read_u32(reader)?);
        let length = read_u64(reader)?;
        Ok(Self { tag, flags, length })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.tag.as_bytes())?;
        writer.write_all(&self.flags.bits().to_be_bytes())?;
        writer.write_all(&self.length.to_be_bytes())?;
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(self.tag.as_bytes());
        buf[4..8].copy_from_slice(&self.flags.bits().to_be_bytes());
        buf[8..16].copy_from_slice(&self.length.to_be_bytes());
        buf
    }
}

/// Location of a chunk's content inside the file. Never owns bytes.
///
/// `data_offset` points just past the 4-byte sub-type tag, while
/// `data_length` is the declared length, which counts that tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRef {
    pub tag: Tag,
    pub data_offset: u64,
    pub data_length: u64,
}

impl ChunkRef {
    /// Offset of the sub-type tag, where the declared content begins.
    pub fn content_start(&self) -> u64 {
        self.data_offset - 4
    }

    /// First byte past the declared content.
    pub fn content_end(&self) -> u64 {
        self.content_start() + self.data_length
    }
}
