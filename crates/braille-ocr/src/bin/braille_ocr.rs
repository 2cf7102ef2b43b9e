//! braille-ocr CLI: transcribe a photo or scan of embossed Braille.

use std::path::PathBuf;

use braille_ocr::{
    is_supported_extension, processed_path, recognize, BrailleDecoder, BrailleSession,
    BrailleTable, OcrParams,
};
use clap::{Parser, ValueEnum};
use log::LevelFilter;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "braille-ocr")]
#[command(about = "Recognize embossed Braille in an image and print the decoded text")]
#[command(version)]
struct Cli {
    /// Input image (PNG or JPEG).
    image: PathBuf,

    /// Where to write the annotated image. Defaults to `<stem>-proc.png`
    /// next to the input.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// JSON file with pipeline parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Braille table used for decoding; overrides the config file.
    #[arg(long, value_enum)]
    table: Option<TableArg>,

    /// Print the full transcription (text, geometry, cells) as JSON.
    #[arg(long)]
    json: bool,

    #[arg(long, value_enum, default_value_t = LogLevelArg::Warn)]
    log_level: LogLevelArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TableArg {
    International,
    NorthAmericanAscii,
    Unicode,
}

impl From<TableArg> for BrailleTable {
    fn from(arg: TableArg) -> Self {
        match arg {
            TableArg::International => BrailleTable::International,
            TableArg::NorthAmericanAscii => BrailleTable::NorthAmericanAscii,
            TableArg::Unicode => BrailleTable::Unicode,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Off => LevelFilter::Off,
            LogLevelArg::Error => LevelFilter::Error,
            LogLevelArg::Warn => LevelFilter::Warn,
            LogLevelArg::Info => LevelFilter::Info,
            LogLevelArg::Debug => LevelFilter::Debug,
            LogLevelArg::Trace => LevelFilter::Trace,
        }
    }
}

fn init_logging(level: LevelFilter) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    {
        let _ = level;
        tracing_log::LogTracer::init()?;
        braille_ocr::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    braille_ocr::core::init_with_level(level)?;
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.into())?;

    if !is_supported_extension(&cli.image) {
        return Err(format!(
            "unsupported file type: {} (expected png, jpg or jpeg)",
            cli.image.display()
        )
        .into());
    }

    let mut params = match &cli.config {
        Some(path) => OcrParams::load(path)?,
        None => OcrParams::default(),
    };
    if let Some(table) = cli.table {
        params.decoder.table = table.into();
    }

    let mut decoder = BrailleDecoder::new(params.decoder.clone());
    let mut session = BrailleSession::open(&cli.image, params)?;
    let transcription = recognize(&mut session, &mut decoder)?;

    let output = cli.output.unwrap_or_else(|| processed_path(&cli.image));
    session.save_annotated(&output)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&transcription)?);
    } else {
        println!("{}", transcription.text);
    }
    Ok(())
}
