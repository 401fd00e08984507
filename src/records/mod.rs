pub mod codec;
pub mod record;
pub mod record_type;

pub use record::MetadataRecord;
pub use record_type::{RecordKind, Tag};
