use bitflags::bitflags;

bitflags! {
    /// The four reserved bytes that follow every chunk and record tag,
    /// read as one big-endian word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RecordFlags: u32 {
        /// Byte `F` in the first reserved byte. Reference files carry it on
        /// the first record of the header section and nowhere else.
        const FIRST_RECORD = 0x4600_0000;
    }
}

impl RecordFlags {
    /// Reserved bits for a record emitted at `index` within the header section.
    pub fn for_position(self, index: usize) -> Self {
        let mut flags = self.difference(Self::FIRST_RECORD);
        if index == 0 {
            flags.insert(Self::FIRST_RECORD);
        }
        flags
    }
}
