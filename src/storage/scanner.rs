use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, warn};

use crate::general::error::{FormatError, Result};
use crate::helpers::helper::read_tag;
use crate::records::record_type::Tag;
use crate::storage::chunk::{ChunkRef, RecordDescriptor};
use crate::storage::payload::PayloadBlock;

/// Reads the outer container chunk at the start of the stream.
///
/// Only the sub-type tag is validated; the chunk tag itself and the rest of
/// the file are taken as they are.
pub fn locate_container<R: Read + Seek>(reader: &mut R) -> Result<ChunkRef> {
    reader.seek(SeekFrom::Start(0))?;
    let chunk = read_chunk(reader)?;

    if chunk.0 != Tag::MAYA {
        warn!(found = %chunk.0, "file does not look like a scene container");
        return Err(FormatError::NotAContainer { found: chunk.0 }.into());
    }

    debug!(tag = %chunk.1.tag, offset = chunk.1.data_offset, length = chunk.1.data_length, "container located");
    Ok(chunk.1)
}

/// Reads the header chunk that opens the container's content.
pub fn locate_header<R: Read + Seek>(reader: &mut R, container: &ChunkRef) -> Result<ChunkRef> {
    reader.seek(SeekFrom::Start(container.data_offset))?;
    let chunk = read_chunk(reader)?;

    if chunk.0 != Tag::HEAD {
        warn!(found = %chunk.0, "could not find the header chunk");
        return Err(FormatError::NoHeader { found: chunk.0 }.into());
    }

    if chunk.1.content_end() > container.content_end() {
        return Err(FormatError::InvalidLength {
            tag: Tag::HEAD,
            length: chunk.1.data_length,
        }
        .into());
    }

    debug!(offset = chunk.1.data_offset, length = chunk.1.data_length, "header located");
    Ok(chunk.1)
}

/// Derives the span from the end of the header chunk to the end of the
/// stream. Bytes past the container's declared end belong to it too.
pub fn locate_payload<R: Seek>(reader: &mut R, header: &ChunkRef) -> Result<PayloadBlock> {
    let data_offset = header.content_end();
    let stream_end = reader.seek(SeekFrom::End(0))?;

    let data_length = stream_end
        .checked_sub(data_offset)
        .ok_or(FormatError::InvalidLength {
            tag: Tag::HEAD,
            length: header.data_length,
        })?;

    debug!(offset = data_offset, length = data_length, "payload located");
    Ok(PayloadBlock {
        data_offset,
        data_length,
    })
}

fn read_chunk<R: Read + Seek>(reader: &mut R) -> Result<(Tag, ChunkRef)> {
    let descriptor = RecordDescriptor::read_from(reader)?;
    let sub_type = Tag(read_tag(reader)?);
    let data_offset = reader.stream_position()?;

    // The declared content starts at the sub-type tag and must fit in u64.
    let fits = (data_offset - 4).checked_add(descriptor.length).is_some();
    if descriptor.length < 4 || !fits {
        return Err(FormatError::InvalidLength {
            tag: sub_type,
            length: descriptor.length,
        }
        .into());
    }

    Ok((
        sub_type,
        ChunkRef {
            tag: descriptor.tag,
            data_offset,
            data_length: descriptor.length,
        },
    ))
}
