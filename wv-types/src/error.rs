use thiserror::Error;

/// Результат для операций кодека .wv
pub type WvResult<T> = std::result::Result<T, WvError>;

/// Типы ошибок кодека .wv.
#[derive(Debug, Error)]
pub enum WvError {
    /// Количество выборок превышает настроенный потолок
    #[error("Number of samples {samples} exceeds max_samples {max}")]
    CapacityExceeded { samples: usize, max: usize },

    /// Длины I и Q не совпадают
    #[error("I and Q data are not the same length ({i_len}, {q_len})")]
    LengthMismatch { i_len: usize, q_len: usize },

    /// Некорректный формат маркеров
    #[error("Invalid marker format: {0}")]
    InvalidMarkerFormat(String),

    /// Выборка вне диапазона [-1, 1] при выключенной нормализации
    #[error("Sample out of range: {0}")]
    SampleOutOfRange(String),

    /// Операция требует сгенерированную или загруженную волновую форму
    #[error("Waveform not generated: encode or load a waveform first")]
    NoWaveform,

    /// Не задан прибор для выгрузки
    #[error("Instrument not provided: attach an instrument before uploading")]
    NoCollaborator,

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибки разбора JSON (маркеры, конфигурация)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Нарушение структуры контейнера при инспекции
    #[error("Format violation: {0}")]
    Format(String),
}

impl WvError {
    /// Удобные конструкторы
    pub fn invalid_marker<S: Into<String>>(s: S) -> Self {
        Self::InvalidMarkerFormat(s.into())
    }

    pub fn out_of_range<S: Into<String>>(s: S) -> Self {
        Self::SampleOutOfRange(s.into())
    }

    pub fn format<S: Into<String>>(s: S) -> Self {
        Self::Format(s.into())
    }
}
