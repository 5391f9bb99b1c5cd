//! Кодирование IQ выборок в контейнер .wv.

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use wv_types::{Markers, WvError, WvHeader, WvResult};

use crate::{
    config::CodecConfig,
    format::{interleave, marker_fields, quantize_all, serialize_fields, waveform_block, WvHeaderExt},
};

/// Уровни сигнала для тега LEVEL OFFS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelStats {
    pub rms: f32,
    pub peak: f32,
}

/// Итог одного кодирования (для логов и тестов).
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeReport {
    /// Количество IQ выборок
    pub samples: usize,
    /// Размер контейнера в байтах
    pub bytes: usize,
    /// Уровни, записанные в LEVEL OFFS
    pub levels: LevelStats,
    /// Пик-фактор, дБ (в заголовок не пишется)
    pub crest_factor_db: f32,
}

impl LevelStats {
    /// Уровни без нормализации: rms = peak = 1.0 независимо от сигнала.
    pub const UNITY: LevelStats = LevelStats {
        rms: 1.0,
        peak: 1.0,
    };

    /// 20·log10(1/rms)
    pub fn rms_offset_db(&self) -> f32 {
        20.0 * (1.0 / self.rms).log10()
    }

    /// 20·log10(1/peak)
    pub fn peak_offset_db(&self) -> f32 {
        20.0 * (1.0 / self.peak).log10()
    }

    /// 20·log10(peak/rms)
    pub fn crest_factor_db(&self) -> f32 {
        20.0 * (self.peak / self.rms).log10()
    }
}

/// Кодирует пару I/Q в контейнер .wv.
///
/// Все проверки выполняются до построения контейнера: при ошибке ничего не
/// создаётся.
pub fn encode_waveform(
    i_data: &[f32],
    q_data: &[f32],
    clock: f64,
    markers: Option<&Markers>,
    config: &CodecConfig,
    created: NaiveDateTime,
) -> WvResult<(Vec<u8>, EncodeReport)> {
    let samples = i_data.len();

    if samples > config.max_samples {
        return Err(WvError::CapacityExceeded {
            samples,
            max: config.max_samples,
        });
    }

    if samples != q_data.len() {
        return Err(WvError::LengthMismatch {
            i_len: samples,
            q_len: q_data.len(),
        });
    }

    for (name, value) in [
        ("comment", &config.comment),
        ("copyright", &config.copyright),
        ("origin", &config.origin),
    ] {
        if !value.is_ascii() {
            return Err(WvError::format(format!("{name} must be ASCII: {value:?}")));
        }
    }

    if config.check_range && !config.normalize {
        check_range(i_data, q_data)?;
    }

    let mut iq = interleave(i_data, q_data);

    let levels = if config.normalize {
        normalize_in_place(&mut iq)
    } else {
        LevelStats::UNITY
    };
    let crest_factor_db = levels.crest_factor_db();

    let iq = quantize_all(&iq);

    let header = WvHeader {
        comment: config.comment.clone(),
        copyright: config.copyright.clone(),
        origin: config.origin.clone(),
        rms_offset_db: levels.rms_offset_db(),
        peak_offset_db: levels.peak_offset_db(),
        ..WvHeader::new(clock, samples, created)
    };

    let mut waveform = header.serialize();
    if let Some(markers) = markers {
        waveform.extend_from_slice(&serialize_fields(&marker_fields(samples, markers)));
    }
    waveform.extend_from_slice(&waveform_block(&iq));

    info!("Waveform generated: {samples} samples, {} bytes", waveform.len());

    let report = EncodeReport {
        samples,
        bytes: waveform.len(),
        levels,
        crest_factor_db,
    };

    Ok((waveform, report))
}

/// Нормализует IQIQ... к пиковой длине вектора 1.0.
///
/// Возвращает уровни нормализованного сигнала. Нулевой (или пустой) сигнал
/// не масштабируется.
pub fn normalize_in_place(iq: &mut [f32]) -> LevelStats {
    let max_mag = iq
        .chunks_exact(2)
        .map(|p| p[0].hypot(p[1]))
        .fold(0.0_f32, f32::max);

    if max_mag == 0.0 || !max_mag.is_finite() {
        warn!("Cannot normalise: peak vector length is {max_mag}, leaving samples unscaled");
        return LevelStats::UNITY;
    }

    for v in iq.iter_mut() {
        *v /= max_mag;
    }

    let peak = 1.0_f32;
    let power: f64 = iq
        .chunks_exact(2)
        .map(|p| (p[0] as f64).powi(2) + (p[1] as f64).powi(2))
        .sum();
    let rms = ((power / (iq.len() / 2) as f64).sqrt() as f32) / peak;

    if !rms.is_finite() {
        warn!("Signal contains non-finite samples: rms={rms}, LEVEL OFFS will not be valid");
    }

    let levels = LevelStats { rms, peak };
    debug!(
        "Normalised by {max_mag}: rms={rms}, peak={peak}, crest factor={:.2} dB",
        levels.crest_factor_db()
    );

    levels
}

/// Проверка диапазона при выключенной нормализации.
///
/// I и Q в [-1, 1], длина вектора не больше 1.
pub fn check_range(
    i_data: &[f32],
    q_data: &[f32],
) -> WvResult<()> {
    for (name, data) in [("I", i_data), ("Q", q_data)] {
        if let Some((k, v)) = data
            .iter()
            .enumerate()
            .find(|(_, v)| !(-1.0..=1.0).contains(*v))
        {
            return Err(WvError::out_of_range(format!(
                "{name} data must be in range -1 to +1 if auto scaling is disabled (sample {k} = {v})"
            )));
        }
    }

    if let Some((k, mag)) = i_data
        .iter()
        .zip(q_data)
        .map(|(i, q)| i.hypot(*q))
        .enumerate()
        .find(|(_, mag)| *mag > 1.0)
    {
        return Err(WvError::out_of_range(format!(
            "I/Q vector length must be <= 1 if auto scaling is disabled (sample {k} = {mag})"
        )));
    }

    Ok(())
}
