use std::path::Path;

use serde::{Deserialize, Serialize};
use wv_types::{WvResult, DEFAULT_ORIGIN};

/// Потолок количества выборок по умолчанию.
///
/// Память прибора 512 MSa, но генерация таких длинных форм на стороне ПК
/// требует слишком много памяти.
pub const DEFAULT_MAX_SAMPLES: usize = 100_000_000;

/// Каталог на приборе, куда выгружается файл.
pub const DEFAULT_REMOTE_DIR: &str = "D:\\TEMP\\";

/// Имя файла на приборе.
pub const DEFAULT_REMOTE_FILENAME: &str = "temp.wv";

/// Настройки кодека.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Тег COMMENT (пустая строка = не писать)
    pub comment: String,
    /// Тег COPYRIGHT (пустая строка = не писать)
    pub copyright: String,
    /// Тег ORIGIN INFO
    pub origin: String,
    /// Нормализовать IQ к пиковой длине вектора 1.0
    pub normalize: bool,
    /// Проверять диапазон выборок (только без нормализации, O(N))
    pub check_range: bool,
    /// Максимальное количество IQ выборок
    pub max_samples: usize,
    /// Каталог на приборе
    pub remote_dir: String,
    /// Имя файла на приборе
    pub remote_filename: String,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl CodecConfig {
    /// Полный путь файла на приборе (`remote_dir` + `remote_filename`).
    pub fn remote_path(&self) -> String {
        format!("{}{}", self.remote_dir, self.remote_filename)
    }

    /// Загружает конфигурацию из JSON файла; отсутствующие поля по умолчанию.
    pub fn from_json_file(path: impl AsRef<Path>) -> WvResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            comment: String::new(),
            copyright: String::new(),
            origin: DEFAULT_ORIGIN.to_string(),
            normalize: false,
            check_range: false,
            max_samples: DEFAULT_MAX_SAMPLES,
            remote_dir: DEFAULT_REMOTE_DIR.to_string(),
            remote_filename: DEFAULT_REMOTE_FILENAME.to_string(),
        }
    }
}

/// Парсит частоту в герцы.
///
/// Поддерживает суффиксы: `GHz`, `MHz`, `kHz`, `Hz` (регистронезависимо).
///
/// # Примеры
/// ```
/// use wv_core::config::parse_clock_hz;
/// assert_eq!(parse_clock_hz("100MHz").unwrap(), 100e6);
/// assert_eq!(parse_clock_hz("1.5kHz").unwrap(), 1500.0);
/// assert_eq!(parse_clock_hz("1e6").unwrap(), 1e6);
/// ```
pub fn parse_clock_hz(s: &str) -> Result<f64, String> {
    let s = s.trim();
    let lower = s.to_lowercase();

    let (num_str, mult) = if let Some(v) = lower.strip_suffix("ghz") {
        (v.trim(), 1e9)
    } else if let Some(v) = lower.strip_suffix("mhz") {
        (v.trim(), 1e6)
    } else if let Some(v) = lower.strip_suffix("khz") {
        (v.trim(), 1e3)
    } else if let Some(v) = lower.strip_suffix("hz") {
        (v.trim(), 1.0)
    } else {
        (lower.as_str(), 1.0)
    };

    let n: f64 = num_str
        .parse()
        .map_err(|e| format!("Invalid clock value '{s}': {e}"))?;

    if !n.is_finite() || n <= 0.0 {
        return Err(format!("Clock must be a positive frequency, got '{s}'"));
    }

    Ok(n * mult)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = CodecConfig::default();
        assert_eq!(cfg.max_samples, 100_000_000);
        assert!(!cfg.normalize);
        assert!(!cfg.check_range);
        assert_eq!(cfg.remote_path(), "D:\\TEMP\\temp.wv");
    }

    #[test]
    fn test_parse_clock_hz() {
        assert_eq!(parse_clock_hz("300MHz").unwrap(), 300e6);
        assert_eq!(parse_clock_hz("1GHz").unwrap(), 1e9);
        assert_eq!(parse_clock_hz("2000kHz").unwrap(), 2e6);
        assert_eq!(parse_clock_hz("1000Hz").unwrap(), 1000.0);
        assert_eq!(parse_clock_hz("1000000").unwrap(), 1e6);
        assert!(parse_clock_hz("abc").is_err());
        assert!(parse_clock_hz("-5MHz").is_err());
    }

    #[test]
    fn test_from_json_file_partial() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, r#"{{"normalize": true, "comment": "burst", "remote_filename": "burst.wv"}}"#)
            .unwrap();

        let cfg = CodecConfig::from_json_file(tmp.path()).unwrap();
        assert!(cfg.normalize);
        assert_eq!(cfg.comment, "burst");
        assert_eq!(cfg.remote_path(), "D:\\TEMP\\burst.wv");
        assert_eq!(cfg.max_samples, DEFAULT_MAX_SAMPLES, "не заданное поле по умолчанию");
    }

    #[test]
    fn test_from_json_file_invalid() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "normalize = true").unwrap();

        assert!(CodecConfig::from_json_file(tmp.path()).is_err());
    }
}
