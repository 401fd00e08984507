//! Backend selection and the operations both scene encodings share.

use std::path::Path;

use indexmap::IndexMap;

use crate::general::config::OpenConfig;
use crate::general::error::{HeaderError, Result};
use crate::storage::rewriter::ContainerRewriter;

pub mod ascii;
pub mod statement;

pub use ascii::TextScene;

/// Physical encoding of a scene file, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Chunked binary (`.mb`).
    Binary,
    /// Line-oriented text (`.ma`).
    Text,
}

impl Encoding {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("mb") {
            Some(Encoding::Binary)
        } else if ext.eq_ignore_ascii_case("ma") {
            Some(Encoding::Text)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Encoding::Binary => "mb",
            Encoding::Text => "ma",
        }
    }
}

/// The two editable key/value collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaKind {
    FileInfo,
    Plugin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Linear,
    Angle,
    Time,
}

/// Header operations offered by both encodings.
///
/// Reads never fail: an absent key is `None` and an absent collection is an
/// empty list. Mutations stay in memory until [`SceneHeader::save`] or
/// [`SceneHeader::save_as`].
pub trait SceneHeader {
    /// The file the header was loaded from.
    fn path(&self) -> &Path;

    fn encoding(&self) -> Encoding;

    fn get(&self, kind: MetaKind, key: &str) -> Option<String>;

    fn set(&mut self, kind: MetaKind, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, kind: MetaKind, key: &str) -> Option<String>;

    fn list(&self, kind: MetaKind) -> Vec<(String, String)>;

    /// Replaces a whole collection, validating every entry first.
    fn replace_all(&mut self, kind: MetaKind, entries: &IndexMap<String, String>) -> Result<()>;

    fn maya_version(&self) -> Option<u32>;

    fn set_maya_version(&mut self, version: u32);

    fn unit(&self, unit: UnitKind) -> Option<String>;

    /// Writes the header and the untouched remainder of the source to `path`,
    /// which must carry an extension of the same encoding.
    fn save_as(&mut self, path: &Path) -> Result<()>;

    fn save(&mut self) -> Result<()> {
        let path = self.path().to_path_buf();
        self.save_as(&path)
    }

    fn fileinfo(&self, key: &str) -> Option<String> {
        self.get(MetaKind::FileInfo, key)
    }

    fn set_fileinfo(&mut self, key: &str, value: &str) -> Result<()> {
        self.set(MetaKind::FileInfo, key, value)
    }

    fn remove_fileinfo(&mut self, key: &str) -> Option<String> {
        self.remove(MetaKind::FileInfo, key)
    }

    fn all_fileinfo(&self) -> Vec<(String, String)> {
        self.list(MetaKind::FileInfo)
    }

    fn plugin(&self, name: &str) -> Option<String> {
        self.get(MetaKind::Plugin, name)
    }

    fn set_plugin(&mut self, name: &str, version: &str) -> Result<()> {
        self.set(MetaKind::Plugin, name, version)
    }

    fn remove_plugin(&mut self, name: &str) -> Option<String> {
        self.remove(MetaKind::Plugin, name)
    }

    fn all_plugins(&self) -> Vec<(String, String)> {
        self.list(MetaKind::Plugin)
    }
}

/// Rejects a save target whose extension belongs to another encoding.
pub fn check_target(expected: Encoding, path: &Path) -> Result<()> {
    if Encoding::from_path(path) == Some(expected) {
        Ok(())
    } else {
        Err(HeaderError::FormatMismatch {
            expected,
            path: path.to_path_buf(),
        })
    }
}

/// A loaded scene header of either encoding.
#[derive(Debug)]
pub enum SceneFile {
    Binary(ContainerRewriter),
    Text(TextScene),
}

impl SceneFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &OpenConfig::default())
    }

    pub fn open_with(path: impl AsRef<Path>, config: &OpenConfig) -> Result<Self> {
        let path = path.as_ref();
        let mut scene = match Encoding::from_path(path) {
            Some(Encoding::Binary) => SceneFile::Binary(ContainerRewriter::load(path)?),
            Some(Encoding::Text) => SceneFile::Text(TextScene::load(path)?),
            None => {
                return Err(HeaderError::UnknownExtension {
                    path: path.to_path_buf(),
                });
            }
        };
        config.apply(&mut scene)?;
        Ok(scene)
    }

    fn inner(&self) -> &dyn SceneHeader {
        match self {
            SceneFile::Binary(scene) => scene,
            SceneFile::Text(scene) => scene,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn SceneHeader {
        match self {
            SceneFile::Binary(scene) => scene,
            SceneFile::Text(scene) => scene,
        }
    }
}

impl SceneHeader for SceneFile {
    fn path(&self) -> &Path {
        self.inner().path()
    }

    fn encoding(&self) -> Encoding {
        self.inner().encoding()
    }

    fn get(&self, kind: MetaKind, key: &str) -> Option<String> {
        self.inner().get(kind, key)
    }

    fn set(&mut self, kind: MetaKind, key: &str, value: &str) -> Result<()> {
        self.inner_mut().set(kind, key, value)
    }

    fn remove(&mut self, kind: MetaKind, key: &str) -> Option<String> {
        self.inner_mut().remove(kind, key)
    }

    fn list(&self, kind: MetaKind) -> Vec<(String, String)> {
        self.inner().list(kind)
    }

    fn replace_all(&mut self, kind: MetaKind, entries: &IndexMap<String, String>) -> Result<()> {
        self.inner_mut().replace_all(kind, entries)
    }

    fn maya_version(&self) -> Option<u32> {
        self.inner().maya_version()
    }

    fn set_maya_version(&mut self, version: u32) {
        self.inner_mut().set_maya_version(version)
    }

    fn unit(&self, unit: UnitKind) -> Option<String> {
        self.inner().unit(unit)
    }

    fn save_as(&mut self, path: &Path) -> Result<()> {
        self.inner_mut().save_as(path)
    }
}
