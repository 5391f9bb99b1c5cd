use byteorder::{ByteOrder, LittleEndian};
use wv_types::{WvError, WvResult};

/// Читает little-endian i16 из среза чётной длины.
pub fn read_i16_le(data: &[u8]) -> WvResult<Vec<i16>> {
    if data.len() % 2 != 0 {
        return Err(WvError::format(format!(
            "i16 payload has odd length {}",
            data.len()
        )));
    }

    let mut out = vec![0i16; data.len() / 2];
    LittleEndian::read_i16_into(data, &mut out);

    Ok(out)
}
