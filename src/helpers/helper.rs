use std::io::Read;

/// Records and chunk contents are padded to this boundary.
pub const ALIGNMENT: u64 = 8;

pub fn read_u32<R: Read>(r: &mut R) -> std::io::Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_be_bytes(b))
}

pub fn read_u64<R: Read>(r: &mut R) -> std::io::Result<u64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(u64::from_be_bytes(b))
}

pub fn read_tag<R: Read>(r: &mut R) -> std::io::Result<[u8; 4]> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(b)
}

/// Rounds `offset` up to the next multiple of [`ALIGNMENT`].
pub fn align_up(offset: u64) -> u64 {
    offset.div_ceil(ALIGNMENT) * ALIGNMENT
}

/// Number of zero bytes needed after `len` content bytes.
pub fn padding_for(len: u64) -> u64 {
    align_up(len) - len
}

/// Formats bytes as 16-byte rows of hex plus a printable column.
pub fn hex_rows(data: &[u8], base_offset: u64) -> Vec<String> {
    data.chunks(16)
        .enumerate()
        .map(|(i, row)| {
            let hex: Vec<String> = row.iter().map(|b| format!("{b:02x}")).collect();
            let text: String = row
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            format!(
                "{:08x}  {:<47}  {}",
                base_offset + (i as u64) * 16,
                hex.join(" "),
                text
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_eight() {
        assert_eq!(align_up(0), 0);
        assert_eq!(align_up(1), 8);
        assert_eq!(align_up(8), 8);
        assert_eq!(align_up(61), 64);
        assert_eq!(padding_for(13), 3);
        assert_eq!(padding_for(16), 0);
    }

    #[test]
    fn readers_are_big_endian() {
        let bytes = [0, 0, 1, 2, 0, 0, 0, 0, 0, 0, 0, 9];
        let mut cursor = &bytes[..];
        assert_eq!(read_u32(&mut cursor).unwrap(), 0x0102);
        assert_eq!(read_u64(&mut cursor).unwrap(), 9);
        assert!(read_u32(&mut cursor).is_err());
    }

    #[test]
    fn hex_rows_split_every_sixteen_bytes() {
        let rows = hex_rows(b"VERS\0\0\0\0\0\0\0\0\0\0\0\x042022", 40);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("00000028  56 45 52 53"));
        assert!(rows[0].ends_with("VERS............"));
        assert!(rows[1].ends_with("2022"));
    }
}
