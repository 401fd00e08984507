use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::records::record_type::Tag;
use crate::scene::Encoding;

pub type Result<T> = std::result::Result<T, HeaderError>;

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file bytes do not have the shape of a scene header.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A key or value cannot be stored in the loaded encoding.
    #[error("invalid {what}: {reason}")]
    InvalidValue {
        what: &'static str,
        reason: &'static str,
    },

    /// Save target extension does not belong to the loaded encoding.
    #[error("cannot save {expected:?} header to {}", path.display())]
    FormatMismatch { expected: Encoding, path: PathBuf },

    #[error("unrecognized scene file extension: {}", path.display())]
    UnknownExtension { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("not a scene container (sub-type tag {found})")]
    NotAContainer { found: Tag },

    #[error("container has no header chunk (sub-type tag {found})")]
    NoHeader { found: Tag },

    #[error("chunk {tag} declares an impossible length {length}")]
    InvalidLength { tag: Tag, length: u64 },

    #[error("header line {line} is not valid UTF-8")]
    NotUtf8 { line: usize },
}

impl HeaderError {
    pub(crate) fn invalid(what: &'static str, reason: &'static str) -> Self {
        HeaderError::InvalidValue { what, reason }
    }
}
