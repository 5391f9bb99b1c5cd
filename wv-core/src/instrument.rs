//! Выгрузка контейнера на прибор.
//!
//! Кодек знает о приборе только две вещи: как записать сырые байты команды в
//! транспорт и как выбрать загруженный файл активной волновой формой.
//! Тактовая частота, амплитуда, триггер и прочие параметры прибора
//! настраиваются снаружи.

use std::io::Write;

use wv_types::WvResult;

/// Команда записи файла в память прибора.
pub const STORE_COMMAND: &str = "MMEM:DATA";

/// Команда выбора активной волновой формы.
pub const SELECT_COMMAND: &str = ":SOUR:WAV:SEL";

/// Абстракция прибора-получателя.
pub trait Instrument {
    /// Отправляет байты как есть, без терминатора.
    fn write_raw(
        &mut self,
        data: &[u8],
    ) -> WvResult<()>;

    /// Делает файл `path` на приборе активной волновой формой.
    fn select_waveform(
        &mut self,
        path: &str,
    ) -> WvResult<()>;
}

/// Прибор за текстовым командным протоколом поверх любого байтового потока
/// (например `TcpStream` на raw-socket порт прибора).
pub struct ScpiInstrument<W: Write> {
    inner: W,
    terminator: &'static str,
}

/// Префикс бинарного блока: `#<кол-во цифр><кол-во байт>`, например `#213`.
pub fn binary_block_preamble(len: usize) -> String {
    let digits = len.to_string();
    format!("#{}{}", digits.len(), digits)
}

/// Полная команда выгрузки: `MMEM:DATA '<path>',#<d><n><raw>`.
pub fn store_command(
    remote_path: &str,
    data: &[u8],
) -> Vec<u8> {
    let prefix = format!(
        "{STORE_COMMAND} '{remote_path}',{}",
        binary_block_preamble(data.len())
    );

    let mut cmd = Vec::with_capacity(prefix.len() + data.len());
    cmd.extend_from_slice(prefix.as_bytes());
    cmd.extend_from_slice(data);
    cmd
}

impl<W: Write> ScpiInstrument<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            terminator: "\n",
        }
    }

    pub fn with_terminator(
        mut self,
        terminator: &'static str,
    ) -> Self {
        self.terminator = terminator;
        self
    }

    /// Отправляет текстовую команду с терминатором.
    pub fn write_command(
        &mut self,
        cmd: &str,
    ) -> WvResult<()> {
        self.inner.write_all(cmd.as_bytes())?;
        self.inner.write_all(self.terminator.as_bytes())?;
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Instrument for ScpiInstrument<W> {
    fn write_raw(
        &mut self,
        data: &[u8],
    ) -> WvResult<()> {
        self.inner.write_all(data)?;
        self.inner.flush()?;
        Ok(())
    }

    fn select_waveform(
        &mut self,
        path: &str,
    ) -> WvResult<()> {
        self.write_command(&format!("{SELECT_COMMAND} '{path}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_block_preamble() {
        assert_eq!(binary_block_preamble(13), "#213");
        assert_eq!(binary_block_preamble(7), "#17");
        assert_eq!(binary_block_preamble(123_456), "#6123456");
        assert_eq!(binary_block_preamble(0), "#10");
    }

    #[test]
    fn test_store_command_bytes() {
        let cmd = store_command("D:\\TEMP\\temp.wv", &[0x00, 0xFF, b'}']);

        let mut expected = b"MMEM:DATA 'D:\\TEMP\\temp.wv',#13".to_vec();
        expected.extend_from_slice(&[0x00, 0xFF, b'}']);
        assert_eq!(cmd, expected);
    }

    #[test]
    fn test_scpi_instrument_stream() {
        let mut inst = ScpiInstrument::new(Vec::new());
        inst.write_raw(b"RAW").unwrap();
        inst.select_waveform("D:\\TEMP\\a.wv").unwrap();

        assert_eq!(inst.into_inner(), b"RAW:SOUR:WAV:SEL 'D:\\TEMP\\a.wv'\n".to_vec());
    }

    #[test]
    fn test_custom_terminator() {
        let mut inst = ScpiInstrument::new(Vec::new()).with_terminator("\r\n");
        inst.write_command("*RST").unwrap();
        assert_eq!(inst.into_inner(), b"*RST\r\n".to_vec());
    }
}
