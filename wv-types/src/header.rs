use std::fmt;

use chrono::NaiveDateTime;

/// Значение тега TYPE для файлов генераторов R&S.
pub const WV_TYPE: &str = "SMU-WV, 0";

/// Значение ORIGIN INFO по умолчанию (прибор поле игнорирует).
pub const DEFAULT_ORIGIN: &str = "Rust";

/// Одно текстовое поле контейнера: `{TAG: value}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub tag: String,
    pub value: String,
}

/// Заголовок .wv файла.
///
/// Порядок полей при сериализации фиксирован: TYPE, COMMENT, COPYRIGHT,
/// ORIGIN INFO, LEVEL OFFS, DATE, CLOCK, SAMPLES. Пустые COMMENT/COPYRIGHT
/// не записываются.
#[derive(Debug, Clone, PartialEq)]
pub struct WvHeader {
    /// Комментарий (пустая строка = тег опускается)
    pub comment: String,
    /// Копирайт (пустая строка = тег опускается)
    pub copyright: String,
    /// Имя инструмента, создавшего файл
    pub origin: String,
    /// Смещение уровня RMS, дБ: 20·log10(1/rms)
    pub rms_offset_db: f32,
    /// Смещение пикового уровня, дБ: 20·log10(1/peak)
    pub peak_offset_db: f32,
    /// Время создания (локальное)
    pub created: NaiveDateTime,
    /// Тактовая частота, Гц
    pub clock: f64,
    /// Количество IQ выборок
    pub samples: usize,
}

impl Field {
    pub fn new(
        tag: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

impl WvHeader {
    /// Новый заголовок с нулевыми смещениями уровня и без комментария.
    pub fn new(
        clock: f64,
        samples: usize,
        created: NaiveDateTime,
    ) -> Self {
        Self {
            comment: String::new(),
            copyright: String::new(),
            origin: DEFAULT_ORIGIN.to_string(),
            rms_offset_db: 0.0,
            peak_offset_db: 0.0,
            created,
            clock,
            samples,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{{{}: {}}}", self.tag, self.value)
    }
}
