//! Чтение входных данных для `wvtool encode`.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use wv_types::Markers;

/// Пара I/Q, прочитанная из текстового файла.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IqSamples {
    pub i: Vec<f32>,
    pub q: Vec<f32>,
}

/// Разбирает текст: одна выборка на строку, `I Q` или `I,Q`.
///
/// Пустые строки и строки с `#` пропускаются.
pub fn parse_iq_text(text: &str) -> Result<IqSamples> {
    let mut samples = IqSamples::default();

    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let cols: Vec<&str> = line
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|c| !c.is_empty())
            .collect();

        let [i, q] = cols.as_slice() else {
            bail!("line {}: expected 2 columns (I Q), got {}", n + 1, cols.len());
        };

        samples
            .i
            .push(i.parse().with_context(|| format!("line {}: bad I value '{i}'", n + 1))?);
        samples
            .q
            .push(q.parse().with_context(|| format!("line {}: bad Q value '{q}'", n + 1))?);
    }

    Ok(samples)
}

pub fn read_iq_file(path: &Path) -> Result<IqSamples> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_iq_text(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Читает маркеры из JSON файла `{"marker1": [[0,0],[10,1]], ...}`.
pub fn read_markers_file(path: &Path) -> Result<Markers> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Markers::from_json_str(&text).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use wv_types::MarkerChannel;

    use super::*;

    #[test]
    fn test_parse_iq_text_formats() {
        let text = "# two samples\n0.5 0.0\n\n-0.5,0.25\n  1e-3 ; -1  \n";
        let s = parse_iq_text(text).unwrap();

        assert_eq!(s.i, vec![0.5, -0.5, 1e-3]);
        assert_eq!(s.q, vec![0.0, 0.25, -1.0]);
    }

    #[test]
    fn test_parse_iq_text_errors() {
        let err = parse_iq_text("0.5\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));

        assert!(parse_iq_text("0.5 0.1 0.2\n").is_err());
        assert!(parse_iq_text("0.5 x\n").is_err());
    }

    #[test]
    fn test_read_markers_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, r#"{{"marker1": [[0, 0], [10, 1], [50, 0]]}}"#).unwrap();

        let markers = read_markers_file(tmp.path()).unwrap();
        assert_eq!(
            markers.get(MarkerChannel::Marker1).unwrap().to_marker_string(),
            "0:0;10:1;50:0"
        );
    }
}
