use std::fmt;

/// A 4-character chunk or record code as stored on disk.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// 64-bit group chunk; wraps the container and every nested form.
    pub const FOR8: Tag = Tag(*b"FOR8");
    /// Sub-type of the outer container chunk.
    pub const MAYA: Tag = Tag(*b"Maya");
    /// Sub-type of the header chunk.
    pub const HEAD: Tag = Tag(*b"HEAD");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

/// Kinds of metadata records found in the header chunk.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Version,
    UserVersion,
    Author,
    ChangeDate,
    Icon,
    SceneInfo,
    ObjectName,
    IncludedFile,
    LinearUnit,
    TimeUnit,
    AngleUnit,
    FileInfo,
    Plugin,
    /// Anything else; kept opaque and written back untouched.
    Other(Tag),
}

impl RecordKind {
    pub fn from_tag(tag: Tag) -> Self {
        match &tag.0 {
            b"VERS" => RecordKind::Version,
            b"UVER" => RecordKind::UserVersion,
            b"MADE" => RecordKind::Author,
            b"CHNG" => RecordKind::ChangeDate,
            b"ICON" => RecordKind::Icon,
            b"INFO" => RecordKind::SceneInfo,
            b"OBJN" => RecordKind::ObjectName,
            b"INCL" => RecordKind::IncludedFile,
            b"LUNI" => RecordKind::LinearUnit,
            b"TUNI" => RecordKind::TimeUnit,
            b"AUNI" => RecordKind::AngleUnit,
            b"FINF" => RecordKind::FileInfo,
            b"PLUG" => RecordKind::Plugin,
            _ => RecordKind::Other(tag),
        }
    }

    pub fn tag(self) -> Tag {
        match self {
            RecordKind::Version => Tag(*b"VERS"),
            RecordKind::UserVersion => Tag(*b"UVER"),
            RecordKind::Author => Tag(*b"MADE"),
            RecordKind::ChangeDate => Tag(*b"CHNG"),
            RecordKind::Icon => Tag(*b"ICON"),
            RecordKind::SceneInfo => Tag(*b"INFO"),
            RecordKind::ObjectName => Tag(*b"OBJN"),
            RecordKind::IncludedFile => Tag(*b"INCL"),
            RecordKind::LinearUnit => Tag(*b"LUNI"),
            RecordKind::TimeUnit => Tag(*b"TUNI"),
            RecordKind::AngleUnit => Tag(*b"AUNI"),
            RecordKind::FileInfo => Tag(*b"FINF"),
            RecordKind::Plugin => Tag(*b"PLUG"),
            RecordKind::Other(tag) => tag,
        }
    }

    /// Kinds whose keys are unique; a second record with the same key
    /// replaces the first.
    pub fn has_unique_keys(self) -> bool {
        matches!(self, RecordKind::FileInfo | RecordKind::Plugin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_map_both_ways() {
        for kind in [
            RecordKind::Version,
            RecordKind::Icon,
            RecordKind::IncludedFile,
            RecordKind::FileInfo,
            RecordKind::Plugin,
        ] {
            assert_eq!(RecordKind::from_tag(kind.tag()), kind);
        }
    }

    #[test]
    fn unknown_tag_stays_opaque() {
        let kind = RecordKind::from_tag(Tag(*b"XYZW"));
        assert_eq!(kind, RecordKind::Other(Tag(*b"XYZW")));
        assert_eq!(kind.tag().to_string(), "XYZW");
        assert!(!kind.has_unique_keys());
    }

    #[test]
    fn display_escapes_non_ascii() {
        assert_eq!(Tag([b'A', 0, b'C', 0xff]).to_string(), "A\\x00C\\xff");
    }
}
