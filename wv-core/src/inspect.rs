//! Разбор контейнера .wv для просмотра (CLI `info`, тесты).
//!
//! Загрузка контейнера этим модулем не пользуется: байты хранятся как есть,
//! проверяет их прибор.

use std::ops::Range;

use wv_types::{Field, MarkerChannel, WvError, WvResult};

use crate::{binary::read_i16_le, format::WAVEFORM_TAG};

/// Разобранная структура контейнера.
#[derive(Debug, Clone)]
pub struct WvInfo {
    /// Текстовые поля в порядке появления (без блока выборок)
    pub fields: Vec<Field>,
    /// Диапазон сырых байт выборок внутри контейнера
    pub payload: Range<usize>,
}

impl WvInfo {
    /// Проходит по полям `{TAG: value}` до конца контейнера.
    pub fn parse(bytes: &[u8]) -> WvResult<Self> {
        let mut fields = Vec::new();
        let mut payload = None;
        let mut off = 0;

        loop {
            while off < bytes.len() && bytes[off].is_ascii_whitespace() {
                off += 1;
            }
            if off >= bytes.len() {
                break;
            }

            if bytes[off] != b'{' {
                return Err(WvError::format(format!("Expected '{{' at offset {off}")));
            }

            let colon = find(bytes, off, b':')
                .ok_or_else(|| WvError::format(format!("Unterminated tag at offset {off}")))?;
            let tag = ascii(&bytes[off + 1..colon])?.trim().to_string();

            if let Some(len) = tag.strip_prefix(WAVEFORM_TAG).and_then(|t| t.strip_prefix('-')) {
                let len: usize = len
                    .trim()
                    .parse()
                    .map_err(|e| WvError::format(format!("Bad {tag} length: {e}")))?;

                let hash = find(bytes, colon, b'#')
                    .ok_or_else(|| WvError::format("Missing '#' in waveform block"))?;
                // Длина в теге включает сам байт '#'
                let end = hash.checked_add(len).filter(|end| *end < bytes.len());
                let Some(end) = end.filter(|end| bytes[*end] == b'}') else {
                    return Err(WvError::format(format!(
                        "Waveform block declares {len} bytes but is truncated or unterminated"
                    )));
                };

                payload = Some(hash + 1..end);
                off = end + 1;
                continue;
            }

            let close = find(bytes, colon, b'}')
                .ok_or_else(|| WvError::format(format!("Unterminated field '{tag}'")))?;
            let value = ascii(&bytes[colon + 1..close])?.trim().to_string();

            fields.push(Field { tag, value });
            off = close + 1;
        }

        let payload = payload.ok_or_else(|| WvError::format("No WAVEFORM block found"))?;

        Ok(Self { fields, payload })
    }

    /// Значение первого поля с тегом `tag`.
    pub fn get(
        &self,
        tag: &str,
    ) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.tag == tag)
            .map(|f| f.value.as_str())
    }

    pub fn samples(&self) -> Option<usize> {
        self.get("SAMPLES")?.parse().ok()
    }

    pub fn control_length(&self) -> Option<usize> {
        self.get("CONTROL LENGTH")?.parse().ok()
    }

    pub fn clock(&self) -> Option<f64> {
        self.get("CLOCK")?.parse().ok()
    }

    pub fn marker_list(
        &self,
        channel: MarkerChannel,
    ) -> Option<&str> {
        self.get(&format!("MARKER LIST {}", channel.as_u8()))
    }

    /// Сырые байты выборок.
    pub fn payload<'a>(
        &self,
        bytes: &'a [u8],
    ) -> &'a [u8] {
        &bytes[self.payload.clone()]
    }

    /// Выборки IQIQ... в виде i16.
    pub fn decode_iq(
        &self,
        bytes: &[u8],
    ) -> WvResult<Vec<i16>> {
        read_i16_le(self.payload(bytes))
    }
}

fn find(
    bytes: &[u8],
    from: usize,
    needle: u8,
) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|b| *b == needle)
        .map(|p| from + p)
}

fn ascii(bytes: &[u8]) -> WvResult<&str> {
    std::str::from_utf8(bytes)
        .ok()
        .filter(|s| s.is_ascii())
        .ok_or_else(|| WvError::format("Header field is not ASCII"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let mut raw = b"{TYPE: SMU-WV, 0}{CLOCK: 1000000.0}{SAMPLES: 1}{WAVEFORM-5: #".to_vec();
        raw.extend_from_slice(&[0xFF, 0x7F, 0x7B, 0x7D]); // содержит '{' и '}'
        raw.push(b'}');

        let info = WvInfo::parse(&raw).unwrap();
        assert_eq!(info.get("TYPE"), Some("SMU-WV, 0"));
        assert_eq!(info.samples(), Some(1));
        assert_eq!(info.clock(), Some(1e6));
        assert_eq!(info.control_length(), None);
        assert_eq!(info.decode_iq(&raw).unwrap(), vec![32_767, 0x7D7B]);
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_no_space_after_colon() {
        let raw = b"{TYPE:SMU-WV, 0}\r\n{SAMPLES:0}\n{WAVEFORM-1:#}";

        let info = WvInfo::parse(raw).unwrap();
        assert_eq!(info.samples(), Some(0));
        assert!(info.payload(raw).is_empty());
    }

    #[test]
    fn test_parse_truncated_payload() {
        let raw = b"{TYPE: SMU-WV, 0}{WAVEFORM-9: #\x00\x01}";
        assert!(WvInfo::parse(raw).is_err());
    }

    #[test]
    fn test_parse_huge_waveform_length() {
        let raw = format!("{{TYPE: SMU-WV, 0}}{{WAVEFORM-{}: #}}", usize::MAX);

        let err = WvInfo::parse(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, WvError::Format(_)));
    }

    #[test]
    fn test_parse_missing_waveform() {
        assert!(WvInfo::parse(b"{TYPE: SMU-WV, 0}").is_err());
        assert!(WvInfo::parse(b"garbage").is_err());
    }
}
