use indexmap::IndexMap;

use crate::general::error::{HeaderError, Result};
use crate::records::record::MetadataRecord;
use crate::records::record_type::RecordKind;

/// In-memory header metadata of a binary scene.
///
/// Records are grouped by kind; groups keep the order in which their kind was
/// first seen and records keep insertion order within a group. Nothing here
/// touches the disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderStore {
    groups: IndexMap<RecordKind, Vec<MetadataRecord>>,
}

impl HeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = MetadataRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Adds a record. For file-info and plugin kinds a record with the same
    /// key is replaced in place.
    pub fn insert(&mut self, record: MetadataRecord) {
        let kind = record.kind;
        let group = self.groups.entry(kind).or_default();

        if kind.has_unique_keys() {
            if let Some(existing) = group.iter_mut().find(|r| r.key == record.key) {
                *existing = record;
                return;
            }
        }
        group.push(record);
    }

    pub fn get(&self, kind: RecordKind, key: &str) -> Option<String> {
        self.find(kind, key).map(MetadataRecord::value_str)
    }

    pub fn set(&mut self, kind: RecordKind, key: &str, value: &str) -> Result<()> {
        validate(key, value)?;
        self.insert(MetadataRecord::new(kind, key.as_bytes(), value.as_bytes()));
        Ok(())
    }

    /// Removes the first record of `kind` with `key`, returning its value.
    pub fn remove(&mut self, kind: RecordKind, key: &str) -> Option<String> {
        let group = self.groups.get_mut(&kind)?;
        let index = group.iter().position(|r| r.key == key.as_bytes())?;
        Some(group.remove(index).value_str())
    }

    pub fn list(&self, kind: RecordKind) -> Vec<(String, String)> {
        self.groups
            .get(&kind)
            .map(|group| group.iter().map(|r| (r.key_str(), r.value_str())).collect())
            .unwrap_or_default()
    }

    /// Replaces every record of `kind` with `entries`, keeping the group's
    /// position.
    pub fn replace_all<'a>(
        &mut self,
        kind: RecordKind,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        let mut group = Vec::new();
        for (key, value) in entries {
            validate(key, value)?;
            group.push(MetadataRecord::new(kind, key.as_bytes(), value.as_bytes()));
        }
        self.groups.insert(kind, Vec::new());
        for record in group {
            self.insert(record);
        }
        Ok(())
    }

    /// Producer version: the leading digits of the version record's key.
    pub fn get_version(&self) -> Option<u32> {
        let record = self.groups.get(&RecordKind::Version)?.first()?;
        parse_version(&record.key_str())
    }

    /// Replaces the version group with a single record. A new group goes
    /// first, where reference files keep it.
    pub fn set_version(&mut self, version: u32) {
        let record = MetadataRecord::new(RecordKind::Version, version.to_string().as_bytes(), b"");
        match self.groups.get_mut(&RecordKind::Version) {
            Some(group) => *group = vec![record],
            None => {
                self.groups.shift_insert(0, RecordKind::Version, vec![record]);
            }
        }
    }

    /// Every record in encoding order.
    pub fn records(&self) -> impl Iterator<Item = &MetadataRecord> {
        self.groups.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find(&self, kind: RecordKind, key: &str) -> Option<&MetadataRecord> {
        self.groups
            .get(&kind)?
            .iter()
            .find(|r| r.key == key.as_bytes())
    }
}

/// Leading ASCII digits of a version string, e.g. `2024` from `"2024 ff01"`.
pub fn parse_version(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn validate(key: &str, value: &str) -> Result<()> {
    if key.is_empty() {
        return Err(HeaderError::invalid("key", "must not be empty"));
    }
    if key.contains('\0') {
        return Err(HeaderError::invalid("key", "must not contain NUL"));
    }
    if value.contains('\0') {
        return Err(HeaderError::invalid("value", "must not contain NUL"));
    }
    Ok(())
}
