use std::{net::TcpStream, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use wv_cli::{read_iq_file, read_markers_file};
use wv_core::{parse_clock_hz, CodecConfig, ScpiInstrument, WaveformCodec, WvInfo};
use wv_types::MarkerChannel;

#[derive(Parser, Debug)]
#[command(
    name = "wvtool",
    version = env!("CARGO_PKG_VERSION"),
    about = "Encode I/Q samples to R&S .wv files and upload them to the generator",
    long_about = None,
)]
struct Cli {
    /// JSON файл с настройками кодека
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Тихий режим (только ошибки)
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Кодировать текстовый файл I/Q в .wv
    Encode {
        /// Входной файл: одна выборка на строку, `I Q` или `I,Q`
        #[arg(short, long)]
        input: PathBuf,
        /// Тактовая частота (100MHz, 1e6, 2000kHz)
        #[arg(short, long)]
        clock: String,
        /// Путь к выходному файлу
        #[arg(short, long, default_value = "waveform.wv")]
        output: PathBuf,
        /// JSON с маркерами: {"marker1": [[0,0],[10,1]]}
        #[arg(short, long)]
        markers: Option<PathBuf>,
        /// Нормализовать к пиковой длине вектора 1.0
        #[arg(long)]
        normalize: bool,
        /// Проверять диапазон выборок (без нормализации)
        #[arg(long)]
        check: bool,
        /// Тег COMMENT
        #[arg(long)]
        comment: Option<String>,
        /// Тег COPYRIGHT
        #[arg(long)]
        copyright: Option<String>,
        /// Максимальное количество выборок
        #[arg(long)]
        max_samples: Option<usize>,
    },
    /// Показать заголовок .wv файла
    Info {
        /// Файл .wv
        path: PathBuf,
    },
    /// Выгрузить .wv файл на прибор и выбрать его
    Upload {
        /// Файл .wv
        path: PathBuf,
        /// Адрес raw-socket порта прибора (host:5025)
        #[arg(short, long)]
        addr: String,
        /// Каталог на приборе
        #[arg(long)]
        remote_dir: Option<String>,
        /// Имя файла на приборе
        #[arg(long)]
        remote_file: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp_secs()
        .init();

    if let Err(e) = run(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => CodecConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CodecConfig::default(),
    };

    match cli.command {
        Command::Encode {
            input,
            clock,
            output,
            markers,
            normalize,
            check,
            comment,
            copyright,
            max_samples,
        } => {
            let clock = parse_clock_hz(&clock)
                .map_err(anyhow::Error::msg)
                .context("--clock")?;

            let mut config = config;
            config.normalize |= normalize;
            config.check_range |= check;
            if let Some(c) = comment {
                config.comment = c;
            }
            if let Some(c) = copyright {
                config.copyright = c;
            }
            if let Some(m) = max_samples {
                config.max_samples = m;
            }

            let samples = read_iq_file(&input)?;
            let markers = markers.as_deref().map(read_markers_file).transpose()?;

            info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            info!("  Input         : {:?}", input);
            info!("  Samples       : {}", samples.i.len());
            info!("  Clock         : {:.3} MHz", clock / 1e6);
            info!("  Normalize     : {}", config.normalize);
            info!("  Range check   : {}", config.check_range);
            info!("  Markers       : {}", markers.as_ref().map_or(0, |m| m.len()));
            info!("  Output        : {:?}", output);
            info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

            let mut codec = WaveformCodec::new(config);
            let report = codec.encode(&samples.i, &samples.q, clock, markers.as_ref())?;
            codec.save_file(&output)?;

            info!(
                "✓ {} samples, {} bytes, crest factor {:.2} dB -> {:?}",
                report.samples, report.bytes, report.crest_factor_db, output
            );
        }

        Command::Info { path } => {
            let bytes = std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let info = WvInfo::parse(&bytes)?;

            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            for field in info.fields.iter().filter(|f| !f.tag.starts_with("MARKER LIST")) {
                println!("  {:<14}: {}", field.tag, field.value);
            }
            for ch in MarkerChannel::ALL {
                if let Some(list) = info.marker_list(ch) {
                    println!("  {:<14}: {}", ch, list);
                }
            }
            println!("  {:<14}: {} bytes", "Payload", info.payload.len());
            println!("  {:<14}: {} bytes", "File size", bytes.len());
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        }

        Command::Upload {
            path,
            addr,
            remote_dir,
            remote_file,
        } => {
            let mut config = config;
            if let Some(d) = remote_dir {
                config.remote_dir = d;
            }
            if let Some(f) = remote_file {
                config.remote_filename = f;
            }

            let stream = TcpStream::connect(&addr).with_context(|| format!("connecting to {addr}"))?;
            let mut codec = WaveformCodec::with_instrument(config, ScpiInstrument::new(stream));
            let remote = codec.upload_file(&path)?;

            info!("✓ {:?} is now the active waveform ({remote})", path);
        }
    }

    Ok(())
}
