use byteorder::{ByteOrder, LittleEndian};

/// Дописывает `values` в `buf` как little-endian i16.
pub fn write_i16_le(
    buf: &mut Vec<u8>,
    values: &[i16],
) {
    let start = buf.len();
    buf.resize(start + values.len() * 2, 0);
    LittleEndian::write_i16_into(values, &mut buf[start..]);
}
