//! Маркерные дорожки.
//!
//! Маркер это цифровой сигнал, кусочно-постоянный, заданный списком точек
//! переключения `(индекс выборки, уровень)`. Контейнер хранит только точки,
//! а не плотную маску: после последней точки прибор сам сбрасывает все
//! маркеры в 0.

use std::{collections::BTreeMap, fmt};

use log::warn;
use serde_json::Value;

use crate::{WvError, WvResult};

/// Максимальное количество маркерных каналов прибора.
pub const MARKER_CHANNELS: usize = 4;

/// Маркерный канал (1..=4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum MarkerChannel {
    Marker1 = 1,
    Marker2 = 2,
    Marker3 = 3,
    Marker4 = 4,
}

/// Точка переключения маркера.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    /// Индекс выборки, с которой действует уровень
    pub index: u64,
    /// Уровень: `true` = 1, `false` = 0
    pub level: bool,
}

/// Упорядоченный список точек одного канала (не пустой).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerList(Vec<Breakpoint>);

/// Набор маркерных списков по каналам.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    channels: BTreeMap<MarkerChannel, MarkerList>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl MarkerChannel {
    /// Все каналы в порядке записи в контейнер.
    pub const ALL: [MarkerChannel; MARKER_CHANNELS] = [
        MarkerChannel::Marker1,
        MarkerChannel::Marker2,
        MarkerChannel::Marker3,
        MarkerChannel::Marker4,
    ];

    pub fn from_u8(v: u8) -> WvResult<Self> {
        match v {
            1 => Ok(MarkerChannel::Marker1),
            2 => Ok(MarkerChannel::Marker2),
            3 => Ok(MarkerChannel::Marker3),
            4 => Ok(MarkerChannel::Marker4),
            _ => Err(WvError::invalid_marker(format!(
                "Unknown marker channel: {v}"
            ))),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Имя канала во входном отображении (`marker1`..`marker4`).
    pub fn key(&self) -> &'static str {
        match self {
            MarkerChannel::Marker1 => "marker1",
            MarkerChannel::Marker2 => "marker2",
            MarkerChannel::Marker3 => "marker3",
            MarkerChannel::Marker4 => "marker4",
        }
    }
}

impl Breakpoint {
    pub fn new(
        index: u64,
        level: bool,
    ) -> Self {
        Self { index, level }
    }

    /// Строит точку из пары `[index, level]`.
    ///
    /// Пара должна содержать ровно два элемента, уровень только 0 или 1.
    pub fn from_row(row: &[u64]) -> WvResult<Self> {
        match row {
            [index, 0] => Ok(Self::new(*index, false)),
            [index, 1] => Ok(Self::new(*index, true)),
            [_, level] => Err(WvError::invalid_marker(format!(
                "Marker level must be 0 or 1, got {level}"
            ))),
            _ => Err(WvError::invalid_marker(format!(
                "Marker entry must have exactly 2 components, got {}",
                row.len()
            ))),
        }
    }
}

impl MarkerList {
    pub fn new(points: Vec<Breakpoint>) -> WvResult<Self> {
        if points.is_empty() {
            return Err(WvError::invalid_marker(
                "Marker list must contain at least one entry, e.g. [[0,0]]",
            ));
        }

        Ok(Self(points))
    }

    /// Строит список из строк вида `[[0,0],[10,1],[50,0]]`.
    pub fn from_rows<R: AsRef<[u64]>>(rows: &[R]) -> WvResult<Self> {
        let points = rows
            .iter()
            .map(|r| Breakpoint::from_row(r.as_ref()))
            .collect::<WvResult<Vec<_>>>()?;

        Self::new(points)
    }

    pub fn points(&self) -> &[Breakpoint] {
        &self.0
    }

    /// Строка для тега `MARKER LIST`: `idx:level;idx:level` без хвостового `;`.
    pub fn to_marker_string(&self) -> String {
        self.to_string()
    }

    fn from_json(
        channel: MarkerChannel,
        value: &Value,
    ) -> WvResult<Self> {
        let rows = value.as_array().ok_or_else(|| {
            WvError::invalid_marker(format!(
                "{} must be a list like [[0,0],[20,1],[50,0]], even if one entry",
                channel.key()
            ))
        })?;

        let points = rows
            .iter()
            .map(|row| {
                let pair = row
                    .as_array()
                    .ok_or_else(|| {
                        WvError::invalid_marker(format!(
                            "{}: entry {row} is not a [index, level] pair",
                            channel.key()
                        ))
                    })?
                    .iter()
                    .map(|v| {
                        v.as_u64().ok_or_else(|| {
                            WvError::invalid_marker(format!(
                                "{}: {v} is not a non-negative integer",
                                channel.key()
                            ))
                        })
                    })
                    .collect::<WvResult<Vec<u64>>>()?;

                Breakpoint::from_row(&pair)
            })
            .collect::<WvResult<Vec<_>>>()?;

        Self::new(points)
    }
}

impl Markers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет (или заменяет) список канала, builder-стиль.
    pub fn with(
        mut self,
        channel: MarkerChannel,
        list: MarkerList,
    ) -> Self {
        self.set(channel, list);
        self
    }

    pub fn set(
        &mut self,
        channel: MarkerChannel,
        list: MarkerList,
    ) -> Option<MarkerList> {
        self.channels.insert(channel, list)
    }

    pub fn get(
        &self,
        channel: MarkerChannel,
    ) -> Option<&MarkerList> {
        self.channels.get(&channel)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Каналы в фиксированном порядке marker1..marker4.
    pub fn iter(&self) -> impl Iterator<Item = (MarkerChannel, &MarkerList)> {
        self.channels.iter().map(|(ch, list)| (*ch, list))
    }

    /// Разбирает отображение `{"marker1": [[0,0],[10,1]], ...}`.
    ///
    /// Неизвестные ключи пропускаются с предупреждением.
    pub fn from_json(value: &Value) -> WvResult<Self> {
        let map = value.as_object().ok_or_else(|| {
            WvError::invalid_marker(
                "Markers must be a mapping. Allowed entries are 'marker1','marker2','marker3','marker4'",
            )
        })?;

        let mut markers = Markers::new();

        for (key, rows) in map {
            let Ok(channel) = key.parse::<MarkerChannel>() else {
                warn!("Ignoring unknown marker entry '{key}'");
                continue;
            };

            markers.set(channel, MarkerList::from_json(channel, rows)?);
        }

        Ok(markers)
    }

    pub fn from_json_str(s: &str) -> WvResult<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_json(&value)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for MarkerChannel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for MarkerChannel {
    type Err = WvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "marker1" | "1" => Ok(MarkerChannel::Marker1),
            "marker2" | "2" => Ok(MarkerChannel::Marker2),
            "marker3" | "3" => Ok(MarkerChannel::Marker3),
            "marker4" | "4" => Ok(MarkerChannel::Marker4),
            _ => Err(WvError::invalid_marker(format!(
                "Unknown marker channel '{s}'. Use: marker1, marker2, marker3, marker4"
            ))),
        }
    }
}

impl fmt::Display for MarkerList {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}:{}", p.index, u8::from(p.level))?;
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
