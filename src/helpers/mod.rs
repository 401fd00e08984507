pub mod helper;
pub mod record_flags;

pub use helper::hex_rows;
pub use record_flags::RecordFlags;
