use indexmap::IndexMap;

use crate::general::error::Result;
use crate::scene::{MetaKind, SceneHeader};

/// Options applied right after a scene header is loaded.
#[derive(Debug, Clone, Default)]
pub struct OpenConfig {
    /// Replaces every file-info entry.
    pub fileinfo: Option<IndexMap<String, String>>,
    /// Replaces every required-plugin entry.
    pub plugins: Option<IndexMap<String, String>>,
}

impl OpenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fileinfo<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.fileinfo = Some(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn with_plugins<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.plugins = Some(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn apply<S: SceneHeader + ?Sized>(&self, scene: &mut S) -> Result<()> {
        if let Some(fileinfo) = &self.fileinfo {
            scene.replace_all(MetaKind::FileInfo, fileinfo)?;
        }
        if let Some(plugins) = &self.plugins {
            scene.replace_all(MetaKind::Plugin, plugins)?;
        }
        Ok(())
    }
}
