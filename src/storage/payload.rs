use std::io::{self, Read, Seek, SeekFrom, Write};

use crc32fast::Hasher;

/// Everything after the header chunk, copied unchanged on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadBlock {
    pub data_offset: u64,
    pub data_length: u64,
}

impl PayloadBlock {
    /// Reads the whole block into memory.
    pub fn read_from<R: Read + Seek>(&self, reader: &mut R) -> io::Result<CachedPayload> {
        reader.seek(SeekFrom::Start(self.data_offset))?;
        let mut bytes = Vec::new();
        reader.take(self.data_length).read_to_end(&mut bytes)?;
        if bytes.len() as u64 != self.data_length {
            return Err(short_payload(bytes.len() as u64, self.data_length));
        }
        Ok(CachedPayload::new(bytes))
    }

    /// Streams the block from `reader` to `writer` without buffering it whole.
    pub fn copy_to<R: Read + Seek, W: Write>(&self, reader: &mut R, writer: &mut W) -> io::Result<u64> {
        reader.seek(SeekFrom::Start(self.data_offset))?;
        let copied = io::copy(&mut reader.take(self.data_length), writer)?;
        if copied != self.data_length {
            return Err(short_payload(copied, self.data_length));
        }
        Ok(copied)
    }
}

fn short_payload(read: u64, expected: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("payload ended after {read} of {expected} bytes"),
    )
}

/// Payload bytes held in memory after the first save or checksum request.
#[derive(Debug, Clone)]
pub struct CachedPayload {
    bytes: Vec<u8>,
    checksum: u32,
}

impl CachedPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        let checksum = checksum(&bytes);
        Self { bytes, checksum }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }
}

/// CRC-32 of a byte span.
pub fn checksum(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}
