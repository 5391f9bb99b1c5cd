//! Формат .wv файлов генераторов R&S (SMU-WV).
//!
//! Контейнер состоит из текстовых полей `{TAG: value}`, записанных подряд без
//! разделителей, необязательного блока маркеров и одного бинарного блока
//! выборок:
//!
//! ```text
//! {TYPE: SMU-WV, 0}{COMMENT: ..}{COPYRIGHT: ..}{ORIGIN INFO: ..}
//! {LEVEL OFFS: <rms dB>, <peak dB>}{DATE: YYYY-MM-DD;HH:MM:SS}
//! {CLOCK: <Hz>}{SAMPLES: <N>}
//! {CONTROL LENGTH: <2N>}{MARKER LIST 1: idx:lvl;idx:lvl}...
//! {WAVEFORM-<4N+1>: #<I0 Q0 I1 Q1 ... little-endian i16>}
//! ```

use wv_types::{Field, Markers, WvHeader, WV_TYPE};

use crate::binary::write_i16_le;

/// Полная шкала ЦАП: +1.0 -> +32767, -1.0 -> -32767.
pub const WV_FULL_SCALE: f32 = 32_767.0;

/// Префикс тега бинарного блока выборок.
pub const WAVEFORM_TAG: &str = "WAVEFORM";

/// Размер одного значения i16 в байтах.
pub const WV_VALUE_SIZE: usize = 2;

/// Сериализация заголовка .wv.
pub trait WvHeaderExt {
    /// Поля заголовка в порядке записи, пустые COMMENT/COPYRIGHT опущены.
    fn fields(&self) -> Vec<Field>;

    /// ASCII-представление заголовка.
    fn serialize(&self) -> Vec<u8>;
}

impl WvHeaderExt for WvHeader {
    fn fields(&self) -> Vec<Field> {
        let optional = |tag: &str, value: &str| {
            (!value.is_empty()).then(|| Field::new(tag, value))
        };

        [
            Some(Field::new("TYPE", WV_TYPE)),
            optional("COMMENT", self.comment.as_str()),
            optional("COPYRIGHT", self.copyright.as_str()),
            Some(Field::new("ORIGIN INFO", self.origin.as_str())),
            Some(Field::new(
                "LEVEL OFFS",
                format!("{:?}, {:?}", self.rms_offset_db, self.peak_offset_db),
            )),
            Some(Field::new(
                "DATE",
                self.created.format("%Y-%m-%d;%H:%M:%S").to_string(),
            )),
            Some(Field::new("CLOCK", format!("{:?}", self.clock))),
            Some(Field::new("SAMPLES", self.samples.to_string())),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn serialize(&self) -> Vec<u8> {
        serialize_fields(&self.fields())
    }
}

/// Склеивает поля `{TAG: value}` без разделителей.
pub fn serialize_fields(fields: &[Field]) -> Vec<u8> {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<String>()
        .into_bytes()
}

/// Поля блока маркеров: CONTROL LENGTH и MARKER LIST 1..4.
///
/// Пустой набор маркеров даёт пустой список (блок не пишется).
pub fn marker_fields(
    samples: usize,
    markers: &Markers,
) -> Vec<Field> {
    if markers.is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::with_capacity(markers.len() + 1);
    fields.push(Field::new("CONTROL LENGTH", (2 * samples).to_string()));

    for (channel, list) in markers.iter() {
        fields.push(Field::new(
            format!("MARKER LIST {}", channel.as_u8()),
            list.to_marker_string(),
        ));
    }

    fields
}

/// Значение длины в теге `WAVEFORM-<n>`: байты выборок + 1 байт `#`.
pub fn waveform_length_field(values: usize) -> usize {
    values * WV_VALUE_SIZE + 1
}

/// Бинарный блок выборок `{WAVEFORM-<n>: #<raw>}`.
pub fn waveform_block(iq: &[i16]) -> Vec<u8> {
    let prefix = format!("{{{WAVEFORM_TAG}-{}: #", waveform_length_field(iq.len()));

    let mut buf = Vec::with_capacity(prefix.len() + iq.len() * WV_VALUE_SIZE + 1);
    buf.extend_from_slice(prefix.as_bytes());
    write_i16_le(&mut buf, iq);
    buf.push(b'}');

    buf
}

/// Чередует I и Q в одну последовательность IQIQIQ...
///
/// Длины должны совпадать (проверяется вызывающим кодом).
pub fn interleave(
    i_data: &[f32],
    q_data: &[f32],
) -> Vec<f32> {
    debug_assert_eq!(i_data.len(), q_data.len());

    let mut iq = Vec::with_capacity(i_data.len() * 2);
    for (i, q) in i_data.iter().zip(q_data) {
        iq.push(*i);
        iq.push(*q);
    }
    iq
}

/// Квантует выборку в i16: `floor(v * 32767 + 0.5)`.
///
/// Без насыщения: значения вне [-1, 1] оборачиваются по модулю 2^16.
pub fn quantize(v: f32) -> i16 {
    (v * WV_FULL_SCALE + 0.5).floor() as i64 as i16
}

pub fn quantize_all(iq: &[f32]) -> Vec<i16> {
    iq.iter().copied().map(quantize).collect()
}
