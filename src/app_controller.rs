use anyhow::{Context, Result, anyhow};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::caption::model::{CaptionFormat, Direction};
use crate::caption::verifier::Verification;
use crate::converter::{ConversionReport, ConversionResult, Converter, DivergenceGate, FixedGate};
use crate::errors::CaptionError;
use crate::file_utils::FileManager;

// @module: Application controller for caption conversion

/// Outcome of a folder conversion
#[derive(Debug, Default)]
pub struct BatchSummary {
    // @field: Outputs that were written
    pub converted: Vec<PathBuf>,
    // @field: Inputs whose output already existed
    pub skipped: Vec<PathBuf>,
    // @field: Inputs that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.converted.len() + self.skipped.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} converted, {} skipped, {} failed",
            self.converted.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn converter(&self) -> Converter {
        Converter::new(self.config.conversion.clone())
    }

    /// Convert one file. Without an explicit direction it is inferred from
    /// the two extensions.
    pub fn convert(
        &self,
        input_file: &Path,
        output_file: &Path,
        direction: Option<Direction>,
        force_overwrite: bool,
        gate: &mut dyn DivergenceGate,
    ) -> Result<ConversionReport, CaptionError> {
        let direction = match direction {
            Some(direction) => direction,
            None => Direction::from_paths(input_file, output_file)?,
        };
        info!("Converting {} ({})", input_file.display(), direction);

        let report = self
            .converter()
            .convert_file(input_file, output_file, direction, force_overwrite, gate)?;

        if report.accepted_divergence {
            warn!("Written despite round-trip divergence: {}", report.output.display());
        }
        info!("Success: {} ({} cues)", report.output.display(), report.cue_count);
        Ok(report)
    }

    /// Run parse, convert and verify on `input_file` without writing anything.
    ///
    /// Verification is forced on regardless of the configuration.
    pub fn check(&self, input_file: &Path, direction: Option<Direction>) -> Result<ConversionResult, CaptionError> {
        let direction = match direction {
            Some(direction) => {
                FileManager::validate_extension(input_file, direction.source())?;
                direction
            }
            None => CaptionFormat::from_path(input_file)
                .map(Direction::from_source)
                .ok_or_else(|| CaptionError::UnknownFormat { path: input_file.to_path_buf() })?,
        };

        let input = FileManager::read_caption(input_file)?;
        let converter = Converter::new(self.config.conversion.clone().with_verify(true));
        let result = converter.convert_text(&input, direction)?;

        match &result.verification {
            Verification::Divergent(divergence) => {
                warn!("{} does not survive a round trip ({})", input_file.display(), direction);
                for line in divergence.to_string().lines() {
                    warn!("{}", line);
                }
            }
            _ => info!("{} round-trips cleanly ({}, {} cues)", input_file.display(), direction, result.cue_count),
        }

        Ok(result)
    }

    /// Convert every caption file under `input_dir` to `target`, writing each
    /// output next to its input.
    ///
    /// Soft divergences are declined unless `assume_yes` is set.
    pub async fn run_folder(&self, input_dir: PathBuf, target: CaptionFormat, force_overwrite: bool, assume_yes: bool) -> Result<BatchSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let source = target.counterpart();
        let direction = Direction::from_source(source);
        let input_files = FileManager::find_caption_files(&input_dir, source)?;
        if input_files.is_empty() {
            return Err(anyhow!("No {} files found in directory: {:?}", source, input_dir));
        }

        let mut summary = BatchSummary::default();
        let mut pending = Vec::new();
        for input_file in input_files {
            let output_file = FileManager::caption_output_path(&input_file, target);
            if output_file.exists() && !force_overwrite && self.config.batch.skip_existing {
                warn!("Skipping {}, output already exists (use --force to overwrite)", input_file.display());
                summary.skipped.push(input_file);
            } else {
                pending.push((input_file, output_file));
            }
        }

        let progress_bar = ProgressBar::new(pending.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("#>-"));
        progress_bar.set_message(format!("Converting to {}", target));

        let workers = self.config.batch.concurrent_workers.max(1);
        debug!("Converting {} files with {} workers", pending.len(), workers);

        let results = stream::iter(pending)
            .map(|(input_file, output_file)| {
                let converter = self.converter();
                let pb = progress_bar.clone();
                async move {
                    let task_input = input_file.clone();
                    let outcome = tokio::task::spawn_blocking(move || {
                        let mut gate = FixedGate(assume_yes);
                        converter.convert_file(&task_input, &output_file, direction, force_overwrite, &mut gate)
                    })
                    .await;
                    pb.inc(1);

                    let outcome = match outcome {
                        Ok(result) => result.map_err(|e| e.to_string()),
                        Err(e) => Err(format!("Conversion task failed: {}", e)),
                    };
                    (input_file, outcome)
                }
            })
            .buffer_unordered(workers)
            .collect::<Vec<_>>()
            .await;

        progress_bar.finish_and_clear();

        for (input_file, outcome) in results {
            match outcome {
                Ok(report) => summary.converted.push(report.output),
                Err(e) => {
                    error!("Error converting {}: {}", input_file.display(), e);
                    summary.failed.push((input_file, e));
                }
            }
        }
        summary.converted.sort();
        summary.failed.sort();

        info!(
            "Folder conversion completed: {} - Duration: {}",
            summary.summary(),
            Self::format_duration(start_time.elapsed())
        );

        if !summary.is_success() {
            let log_file_path = input_dir.join("captionkit.issues.log");
            let mut lines = vec![format!("Folder conversion {}: {}", input_dir.display(), summary.summary())];
            lines.extend(summary.failed.iter().map(|(path, e)| format!("  {}: {}", path.display(), e)));

            if let Err(e) = FileManager::append_to_log_file(&log_file_path, &lines.join("\n")) {
                warn!("Failed to write folder logs to file: {}", e);
            } else {
                info!("Failures written to {}", log_file_path.display());
            }
        }

        Ok(summary)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
