use std::fs;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::general::error::{FormatError, Result};
use crate::general::header_store::HeaderStore;
use crate::records::codec;
use crate::records::record::MetadataRecord;
use crate::records::record_type::{RecordKind, Tag};
use crate::scene::{Encoding, MetaKind, SceneHeader, UnitKind, check_target};
use crate::storage::chunk::{ChunkRef, RecordDescriptor};
use crate::storage::file::{create_for_write, open_for_scan, same_file};
use crate::storage::payload::{CachedPayload, PayloadBlock};
use crate::storage::scanner;

/// Binary (`.mb`) scene header editor.
///
/// Loading reads only the two chunk headers and the header records. The
/// payload after the header is read on the first save or checksum request.
/// The chunk references always describe the file at `path`.
#[derive(Debug)]
pub struct ContainerRewriter {
    path: PathBuf,
    container: ChunkRef,
    header: ChunkRef,
    payload: PayloadBlock,
    cache: Option<CachedPayload>,
    store: HeaderStore,
}

/// Chunk layout of a binary scene as found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerLayout {
    pub container: ChunkRef,
    pub header: ChunkRef,
    pub payload: PayloadBlock,
}

impl ContainerRewriter {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = open_for_scan(&path)?;

        let layout = scan(&mut file)?;
        let store = HeaderStore::from_records(read_records(&mut file, &layout.header)?);

        debug!(path = %path.display(), records = store.len(), "binary header loaded");
        Ok(Self {
            path,
            container: layout.container,
            header: layout.header,
            payload: layout.payload,
            cache: None,
            store,
        })
    }

    pub fn layout(&self) -> ContainerLayout {
        ContainerLayout {
            container: self.container,
            header: self.header,
            payload: self.payload,
        }
    }

    pub fn store(&self) -> &HeaderStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HeaderStore {
        &mut self.store
    }

    /// Every decoded record with its 4-character code, in file order.
    pub fn records(&self) -> impl Iterator<Item = &MetadataRecord> {
        self.store.records()
    }

    /// The header region as currently stored on disk.
    pub fn raw_header(&self) -> Result<Vec<u8>> {
        let mut file = open_for_scan(&self.path)?;
        Ok(read_region(&mut file, &self.header)?)
    }

    /// CRC-32 of the payload block, reading and caching it on first use.
    pub fn payload_checksum(&mut self) -> Result<u32> {
        Ok(self.cached_payload()?.checksum())
    }

    fn cached_payload(&mut self) -> Result<&CachedPayload> {
        let cache = match self.cache.take() {
            Some(cache) => cache,
            None => {
                let mut file = open_for_scan(&self.path)?;
                self.payload.read_from(&mut file)?
            }
        };
        Ok(self.cache.insert(cache))
    }

    /// Writes the container to `target`.
    ///
    /// Output is `[container descriptor + Maya][header descriptor + HEAD]
    /// [records][payload]`. The header length is the encoded record size plus
    /// its sub-type tag; the container length moves by the same delta.
    fn write_container(&mut self, target: &Path) -> Result<()> {
        let records = codec::encode(self.store.records());
        let header_length = records.len() as u64 + 4;
        let container_length = self
            .container
            .data_length
            .checked_add(header_length)
            .and_then(|length| length.checked_sub(self.header.data_length))
            .ok_or(FormatError::InvalidLength {
                tag: Tag::MAYA,
                length: self.container.data_length,
            })?;

        let mut prefix = Vec::with_capacity(2 * (RecordDescriptor::SIZE + 4));
        prefix.extend_from_slice(&RecordDescriptor::new(self.container.tag, container_length).to_bytes());
        prefix.extend_from_slice(Tag::MAYA.as_bytes());
        prefix.extend_from_slice(&RecordDescriptor::new(self.header.tag, header_length).to_bytes());
        prefix.extend_from_slice(Tag::HEAD.as_bytes());

        let in_place = same_file(&self.path, target);
        if in_place || self.cache.is_some() {
            // Source may be the target; hold everything before truncating.
            let payload = self.cached_payload()?;
            let mut out = Vec::with_capacity(prefix.len() + records.len() + payload.bytes().len());
            out.extend_from_slice(&prefix);
            out.extend_from_slice(&records);
            out.extend_from_slice(payload.bytes());
            fs::write(target, out)?;
            debug!(checksum = payload.checksum(), "payload written from cache");
        } else {
            let mut source = open_for_scan(&self.path)?;
            let mut writer = BufWriter::new(create_for_write(target)?);
            writer.write_all(&prefix)?;
            writer.write_all(&records)?;
            self.payload.copy_to(&mut source, &mut writer)?;
            writer.flush()?;
        }

        info!(
            path = %target.display(),
            header_length,
            container_length,
            payload_length = self.payload.data_length,
            "binary scene written"
        );

        if in_place {
            // Offsets shift with the header size; rescan what was written.
            let mut file = open_for_scan(&self.path)?;
            let layout = scan(&mut file)?;
            self.container = layout.container;
            self.header = layout.header;
            self.payload = layout.payload;
        }
        Ok(())
    }
}

/// Locates the container, header and payload of an open binary scene.
pub fn scan<R: Read + Seek>(reader: &mut R) -> Result<ContainerLayout> {
    let container = scanner::locate_container(reader)?;
    let header = scanner::locate_header(reader, &container)?;
    let payload = scanner::locate_payload(reader, &header)?;
    Ok(ContainerLayout {
        container,
        header,
        payload,
    })
}

/// Decodes the flat records of the header chunk.
pub fn read_records<R: Read + Seek>(reader: &mut R, header: &ChunkRef) -> Result<Vec<MetadataRecord>> {
    let bytes = read_region(reader, header)?;
    codec::decode(&bytes, header.data_offset)
}

fn read_region<R: Read + Seek>(reader: &mut R, header: &ChunkRef) -> std::io::Result<Vec<u8>> {
    let length = header.content_end() - header.data_offset;
    reader.seek(SeekFrom::Start(header.data_offset))?;
    let mut bytes = Vec::new();
    reader.take(length).read_to_end(&mut bytes)?;
    if (bytes.len() as u64) < length {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("header ended after {} of {length} bytes", bytes.len()),
        ));
    }
    Ok(bytes)
}

fn record_kind(kind: MetaKind) -> RecordKind {
    match kind {
        MetaKind::FileInfo => RecordKind::FileInfo,
        MetaKind::Plugin => RecordKind::Plugin,
    }
}

impl SceneHeader for ContainerRewriter {
    fn path(&self) -> &Path {
        &self.path
    }

    fn encoding(&self) -> Encoding {
        Encoding::Binary
    }

    fn get(&self, kind: MetaKind, key: &str) -> Option<String> {
        self.store.get(record_kind(kind), key)
    }

    fn set(&mut self, kind: MetaKind, key: &str, value: &str) -> Result<()> {
        self.store.set(record_kind(kind), key, value)
    }

    fn remove(&mut self, kind: MetaKind, key: &str) -> Option<String> {
        self.store.remove(record_kind(kind), key)
    }

    fn list(&self, kind: MetaKind) -> Vec<(String, String)> {
        self.store.list(record_kind(kind))
    }

    fn replace_all(&mut self, kind: MetaKind, entries: &IndexMap<String, String>) -> Result<()> {
        self.store.replace_all(
            record_kind(kind),
            entries.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }

    fn maya_version(&self) -> Option<u32> {
        self.store.get_version()
    }

    fn set_maya_version(&mut self, version: u32) {
        self.store.set_version(version)
    }

    fn unit(&self, unit: UnitKind) -> Option<String> {
        let kind = match unit {
            UnitKind::Linear => RecordKind::LinearUnit,
            UnitKind::Angle => RecordKind::AngleUnit,
            UnitKind::Time => RecordKind::TimeUnit,
        };
        self.store.list(kind).into_iter().next().map(|(key, _)| key)
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        check_target(Encoding::Binary, path)?;
        self.write_container(path)
    }
}
