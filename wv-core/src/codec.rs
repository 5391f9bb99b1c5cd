use std::path::Path;

use chrono::{Local, NaiveDateTime};
use log::info;
use wv_types::{Markers, WvError, WvResult};

use crate::{
    config::CodecConfig,
    encode::{encode_waveform, EncodeReport},
    instrument::{store_command, Instrument},
};

/// Кодек .wv с текущим контейнером в памяти.
///
/// Контейнер создаётся заново при каждом [`encode`](Self::encode) или
/// загрузке и заменяет предыдущий целиком. Без прибора кодек умеет только
/// генерировать, сохранять и читать файлы.
pub struct WaveformCodec {
    config: CodecConfig,
    waveform: Option<Vec<u8>>,
    instrument: Option<Box<dyn Instrument>>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl WaveformCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            waveform: None,
            instrument: None,
        }
    }

    /// Кодек с прибором для выгрузки.
    pub fn with_instrument<I: Instrument + 'static>(
        config: CodecConfig,
        instrument: I,
    ) -> Self {
        let mut codec = Self::new(config);
        codec.attach_instrument(instrument);
        codec
    }

    pub fn attach_instrument<I: Instrument + 'static>(
        &mut self,
        instrument: I,
    ) {
        self.instrument = Some(Box::new(instrument));
    }

    pub fn detach_instrument(&mut self) -> Option<Box<dyn Instrument>> {
        self.instrument.take()
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CodecConfig {
        &mut self.config
    }

    /// Кодирует I/Q с текущим локальным временем в теге DATE.
    pub fn encode(
        &mut self,
        i_data: &[f32],
        q_data: &[f32],
        clock: f64,
        markers: Option<&Markers>,
    ) -> WvResult<EncodeReport> {
        self.encode_at(i_data, q_data, clock, markers, Local::now().naive_local())
    }

    /// Кодирует I/Q с заданным временем создания.
    ///
    /// При ошибке предыдущий контейнер остаётся нетронутым.
    pub fn encode_at(
        &mut self,
        i_data: &[f32],
        q_data: &[f32],
        clock: f64,
        markers: Option<&Markers>,
        created: NaiveDateTime,
    ) -> WvResult<EncodeReport> {
        let (waveform, report) =
            encode_waveform(i_data, q_data, clock, markers, &self.config, created)?;

        self.waveform = Some(waveform);

        Ok(report)
    }

    /// Принимает готовые байты контейнера как есть, без проверки.
    pub fn load(
        &mut self,
        bytes: Vec<u8>,
    ) {
        self.waveform = Some(bytes);
    }

    /// Читает .wv файл в память.
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> WvResult<()> {
        let bytes = std::fs::read(path)?;
        self.load(bytes);
        Ok(())
    }

    /// Сохраняет текущий контейнер в файл.
    pub fn save_file(
        &self,
        path: impl AsRef<Path>,
    ) -> WvResult<()> {
        let waveform = self.require_waveform()?;
        std::fs::write(path, waveform)?;
        Ok(())
    }

    /// Выгружает контейнер на прибор и делает его активной формой.
    ///
    /// Возвращает путь файла на приборе.
    pub fn upload(&mut self) -> WvResult<String> {
        let waveform = self
            .waveform
            .as_deref()
            .filter(|w| !w.is_empty())
            .ok_or(WvError::NoWaveform)?;
        let instrument = self.instrument.as_mut().ok_or(WvError::NoCollaborator)?;

        let remote_path = self.config.remote_path();
        info!("Uploading {} bytes...", waveform.len());

        instrument.write_raw(&store_command(&remote_path, waveform))?;
        instrument.select_waveform(&remote_path)?;

        info!("Uploaded {} bytes to {remote_path}", waveform.len());

        Ok(remote_path)
    }

    /// Читает .wv файл и сразу выгружает его на прибор.
    pub fn upload_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> WvResult<String> {
        self.load_file(path)?;
        self.upload()
    }

    /// Текущий контейнер (если есть).
    pub fn waveform(&self) -> Option<&[u8]> {
        self.waveform.as_deref()
    }

    /// Забирает контейнер, оставляя кодек пустым.
    pub fn take_waveform(&mut self) -> Option<Vec<u8>> {
        self.waveform.take()
    }

    fn require_waveform(&self) -> WvResult<&[u8]> {
        self.waveform
            .as_deref()
            .filter(|w| !w.is_empty())
            .ok_or(WvError::NoWaveform)
    }
}

impl Default for WaveformCodec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    use super::*;

    /// Прибор, записывающий все вызовы.
    #[derive(Default, Clone)]
    struct MockInstrument {
        raw: Rc<RefCell<Vec<Vec<u8>>>>,
        selected: Rc<RefCell<Vec<String>>>,
    }

    impl Instrument for MockInstrument {
        fn write_raw(
            &mut self,
            data: &[u8],
        ) -> WvResult<()> {
            self.raw.borrow_mut().push(data.to_vec());
            Ok(())
        }

        fn select_waveform(
            &mut self,
            path: &str,
        ) -> WvResult<()> {
            self.selected.borrow_mut().push(path.to_string());
            Ok(())
        }
    }

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_no_waveform_errors() {
        let mut codec = WaveformCodec::with_instrument(CodecConfig::default(), MockInstrument::default());
        let tmp = NamedTempFile::new().unwrap();

        assert!(codec.waveform().is_none());
        assert!(matches!(codec.save_file(tmp.path()), Err(WvError::NoWaveform)));
        assert!(matches!(codec.upload(), Err(WvError::NoWaveform)));
    }

    #[test]
    fn test_no_instrument_error() {
        let mut codec = WaveformCodec::default();
        codec.encode_at(&[0.0], &[0.0], 1e6, None, created()).unwrap();

        assert!(matches!(codec.upload(), Err(WvError::NoCollaborator)));
    }

    #[test]
    fn test_failed_encode_keeps_previous_waveform() {
        let mut codec = WaveformCodec::default();
        codec.encode_at(&[0.5], &[0.5], 1e6, None, created()).unwrap();
        let before = codec.waveform().unwrap().to_vec();

        assert!(codec.encode_at(&[0.5, 0.1], &[0.5], 1e6, None, created()).is_err());
        assert_eq!(codec.waveform().unwrap(), before.as_slice());
    }

    #[test]
    fn test_encode_replaces_waveform() {
        let mut codec = WaveformCodec::default();
        codec.load(b"old".to_vec());

        let report = codec.encode_at(&[0.5], &[0.5], 1e6, None, created()).unwrap();
        assert_eq!(codec.waveform().unwrap().len(), report.bytes);
        assert!(codec.waveform().unwrap().starts_with(b"{TYPE: SMU-WV, 0}"));
    }

    #[test]
    fn test_upload_sends_store_and_select() {
        let mock = MockInstrument::default();
        let mut codec = WaveformCodec::with_instrument(
            CodecConfig {
                remote_dir: "/var/user/".to_string(),
                remote_filename: "x.wv".to_string(),
                ..CodecConfig::default()
            },
            mock.clone(),
        );
        codec.load(vec![0xAB; 12]);

        let path = codec.upload().unwrap();
        assert_eq!(path, "/var/user/x.wv");

        let raw = mock.raw.borrow();
        assert_eq!(raw.len(), 1, "одна команда на выгрузку");

        let mut expected = b"MMEM:DATA '/var/user/x.wv',#212".to_vec();
        expected.extend_from_slice(&[0xAB; 12]);
        assert_eq!(raw[0], expected);
        assert_eq!(*mock.selected.borrow(), vec!["/var/user/x.wv".to_string()]);
    }

    #[test]
    fn test_save_load_round_trip() {
        let tmp = NamedTempFile::new().unwrap();

        let mut codec = WaveformCodec::default();
        codec.encode_at(&[0.1, 0.2], &[-0.1, -0.2], 2e6, None, created()).unwrap();
        codec.save_file(tmp.path()).unwrap();
        let original = codec.take_waveform().unwrap();
        assert!(codec.waveform().is_none());

        codec.load_file(tmp.path()).unwrap();
        assert_eq!(codec.waveform().unwrap(), original.as_slice());
    }

    #[test]
    fn test_upload_file() {
        let tmp = NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), b"{TYPE: SMU-WV, 0}{WAVEFORM-1: #}").unwrap();

        let mock = MockInstrument::default();
        let mut codec = WaveformCodec::with_instrument(CodecConfig::default(), mock.clone());
        codec.upload_file(tmp.path()).unwrap();

        let raw = mock.raw.borrow();
        assert!(raw[0].starts_with(b"MMEM:DATA 'D:\\TEMP\\temp.wv',#232{TYPE"));
    }

    #[test]
    fn test_load_missing_file() {
        let mut codec = WaveformCodec::default();
        let err = codec.load_file("/definitely/not/here.wv").unwrap_err();
        assert!(matches!(err, WvError::Io(_)));
    }
}
