//! Кодек волновых форм .wv
//!
//! Эталонная реализация формата SMU-WV генераторов I/Q сигналов R&S:
//! упаковка пары I/Q и маркеров в самоописывающий контейнер, сохранение,
//! чтение и выгрузка на прибор.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use wv_core::{CodecConfig, WaveformCodec};
//! use wv_types::{MarkerChannel, MarkerList, Markers};
//!
//! let mut codec = WaveformCodec::new(CodecConfig::default());
//! let markers = Markers::new().with(
//!     MarkerChannel::Marker1,
//!     MarkerList::from_rows(&[[0u64, 0], [10, 1], [50, 0]])?,
//! );
//!
//! codec.encode(&[0.5, -0.5], &[0.0, 0.0], 1e6, Some(&markers))?;
//! codec.save_file("signal.wv")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod codec;
pub mod config;
pub mod encode;
pub mod format;
pub mod inspect;
pub mod instrument;

pub use binary::*;
pub use codec::*;
pub use config::*;
pub use encode::*;
pub use format::*;
pub use inspect::*;
pub use instrument::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
