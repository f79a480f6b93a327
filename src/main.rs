// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use captionkit::app_config::{self, Config};
use captionkit::app_controller::Controller;
use captionkit::caption::{CaptionFormat, DivergencePolicy, Direction, HeaderPolicy, ParsePolicy};
use captionkit::converter::{DivergenceGate, FixedGate, TerminalGate};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for Direction to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDirection {
    SrtToWebvtt,
    WebvttToSrt,
}

impl From<CliDirection> for Direction {
    fn from(cli_direction: CliDirection) -> Self {
        match cli_direction {
            CliDirection::SrtToWebvtt => Direction::SrtToWebVtt,
            CliDirection::WebvttToSrt => Direction::WebVttToSrt,
        }
    }
}

/// CLI Wrapper for CaptionFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Srt,
    Webvtt,
}

impl From<CliFormat> for CaptionFormat {
    fn from(cli_format: CliFormat) -> Self {
        match cli_format {
            CliFormat::Srt => CaptionFormat::Srt,
            CliFormat::Webvtt => CaptionFormat::WebVtt,
        }
    }
}

/// CLI Wrapper for HeaderPolicy to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliHeaderPolicy {
    Standard,
    Padded,
}

impl From<CliHeaderPolicy> for HeaderPolicy {
    fn from(cli_policy: CliHeaderPolicy) -> Self {
        match cli_policy {
            CliHeaderPolicy::Standard => HeaderPolicy::Standard,
            CliHeaderPolicy::Padded => HeaderPolicy::Padded,
        }
    }
}

/// CLI Wrapper for DivergencePolicy to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDivergencePolicy {
    Prompt,
    Abort,
}

impl From<CliDivergencePolicy> for DivergencePolicy {
    fn from(cli_policy: CliDivergencePolicy) -> Self {
        match cli_policy {
            CliDivergencePolicy::Prompt => DivergencePolicy::Prompt,
            CliDivergencePolicy::Abort => DivergencePolicy::Abort,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert one caption file
    Convert(ConvertArgs),

    /// Check that a caption file survives a round trip, without writing anything
    Check {
        /// Caption file to check
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Conversion direction (inferred from the extension by default)
        #[arg(short, long, value_enum)]
        direction: Option<CliDirection>,
    },

    /// Convert every caption file in a directory tree
    Batch {
        /// Directory to scan
        #[arg(value_name = "DIR")]
        input_dir: PathBuf,

        /// Target format
        #[arg(long, value_enum)]
        to: CliFormat,

        /// Number of files converted concurrently
        #[arg(short, long)]
        workers: Option<usize>,

        /// Overwrite existing outputs
        #[arg(short, long)]
        force: bool,

        /// Write outputs even when the round trip diverges
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate shell completions for captionkit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Caption file to convert
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Destination file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Conversion direction (inferred from the extensions by default)
    #[arg(short, long, value_enum)]
    direction: Option<CliDirection>,

    /// WebVTT header layout
    #[arg(long, value_enum)]
    header: Option<CliHeaderPolicy>,

    /// Reject sources with missing headers or index lines
    #[arg(long)]
    strict: bool,

    /// Skip the round-trip check
    #[arg(long)]
    no_verify: bool,

    /// What to do when the round trip diverges
    #[arg(long, value_enum)]
    on_divergence: Option<CliDivergencePolicy>,

    /// Answer yes to the divergence prompt
    #[arg(short, long)]
    yes: bool,

    /// Overwrite an existing output file
    #[arg(short, long)]
    force: bool,
}

/// captionkit - lossless SRT <-> WebVTT caption conversion
#[derive(Parser, Debug)]
#[command(name = "captionkit")]
#[command(version)]
#[command(about = "SRT <-> WebVTT caption conversion with round-trip verification")]
#[command(long_about = "captionkit converts captions between SubRip (.srt) and WebVTT (.vtt).
Every conversion is converted back and compared with the input before the
output is written, so information loss is reported instead of silently
accepted.

EXAMPLES:
    captionkit convert movie.srt movie.vtt          # Direction inferred from extensions
    captionkit convert movie.vtt movie.srt --force  # Overwrite an existing output
    captionkit convert in.srt out.vtt --header padded --yes
    captionkit check movie.vtt                      # Verify only, never writes
    captionkit batch /captions --to webvtt -w 8     # Convert a whole tree
    captionkit completions bash > captionkit.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", value_name = "PATH", default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Prefix and ANSI colour for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "\x1B[1;31m"),
            Level::Warn => ("WARN ", "\x1B[1;33m"),
            Level::Info => ("INFO ", "\x1B[1;32m"),
            Level::Debug => ("DEBUG", "\x1B[1;36m"),
            Level::Trace => ("TRACE", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (prefix, colour) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, prefix, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // The logger accepts everything; the effective level is set with set_max_level
    if CustomLogger::init(LevelFilter::Trace).is_err() {
        eprintln!("Failed to initialize logger");
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "captionkit", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it before the config is read
    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)
        .with_context(|| format!("Failed to load config file: {}", cli.config_path.display()))?;

    match &cli.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    match cli.command {
        Commands::Convert(args) => run_convert(config, args),
        Commands::Check { input, direction } => {
            let controller = Controller::with_config(config)?;
            let result = controller.check(&input, direction.map(Direction::from))?;
            if result.verification.is_divergent() {
                return Err(anyhow!("{} is not lossless", input.display()));
            }
            Ok(())
        }
        Commands::Batch { input_dir, to, workers, force, yes } => {
            if let Some(workers) = workers {
                config.batch.concurrent_workers = workers;
            }
            let controller = Controller::with_config(config)?;
            let summary = controller.run_folder(input_dir, to.into(), force, yes).await?;
            if !summary.is_success() {
                return Err(anyhow!("{} of {} files failed to convert", summary.failed.len(), summary.total()));
            }
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn run_convert(mut config: Config, args: ConvertArgs) -> Result<()> {
    // Override config with CLI options if provided
    if let Some(header) = args.header {
        config.conversion.header_policy = header.into();
    }
    if args.strict {
        config.conversion = config.conversion.with_parse_policy(ParsePolicy::Strict);
    }
    if args.no_verify {
        config.conversion.verify = false;
    }
    if let Some(policy) = args.on_divergence {
        config.conversion = config.conversion.with_divergence_policy(policy.into());
    }

    let controller = Controller::with_config(config)?;

    let mut gate: Box<dyn DivergenceGate> = if args.yes {
        Box::new(FixedGate(true))
    } else {
        Box::new(TerminalGate::stdio())
    };

    let report = controller.convert(
        &args.input,
        &args.output,
        args.direction.map(Direction::from),
        args.force,
        gate.as_mut(),
    )?;
    info!("{} -> {} [{}]", report.input.display(), report.output.display(), report.verification.label());

    Ok(())
}
