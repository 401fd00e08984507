//! Read and rewrite the header metadata of scene files: file-info strings,
//! required plugins and the producer version, in both the chunked binary
//! (`.mb`) and the text (`.ma`) encodings. Everything below the header is
//! carried over byte for byte.

pub mod general;
pub mod helpers;
pub mod records;
pub mod scene;
pub mod storage;

pub use general::{FormatError, HeaderError, HeaderStore, OpenConfig, Result};
pub use scene::{Encoding, MetaKind, SceneFile, SceneHeader, TextScene, UnitKind};
pub use storage::ContainerRewriter;
