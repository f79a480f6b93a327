/*!
 * One-shot conversion pipeline.
 *
 * Each invocation walks `Idle -> Parsed -> Converted -> Verified|Divergent
 * -> Written|Aborted`. Verification always finishes before the output path
 * is touched, and the output is written atomically, so an aborted
 * conversion never leaves a file behind.
 */

use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::caption::model::{CaptionFormat, Direction};
use crate::caption::policy::{ConversionOptions, DivergencePolicy};
use crate::caption::verifier::{self, Divergence, Verification};
use crate::caption::{parser, transcoder};
use crate::errors::CaptionError;
use crate::file_utils::FileManager;

/// Stage of a single conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionState {
    Idle,
    Parsed,
    Converted,
    Verified,
    Divergent,
    Written,
    Aborted,
}

impl ConversionState {
    /// Whether `next` is a legal successor of `self`
    pub fn can_advance_to(&self, next: ConversionState) -> bool {
        use ConversionState::*;
        matches!(
            (self, next),
            (Idle, Parsed)
                | (Parsed, Converted)
                | (Converted, Verified | Divergent | Written)
                | (Verified, Written)
                | (Divergent, Written | Aborted)
                | (Idle | Parsed | Converted | Verified, Aborted)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Written | Self::Aborted)
    }
}

impl fmt::Display for ConversionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// @struct: State tracker that logs each transition
#[derive(Debug)]
struct Lifecycle {
    state: ConversionState,
}

impl Lifecycle {
    fn new() -> Self {
        Self { state: ConversionState::Idle }
    }

    fn advance(&mut self, next: ConversionState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal conversion transition {} -> {}",
            self.state,
            next
        );
        debug!("Conversion state: {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Text produced by a conversion and how it was checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub output: String,
    pub target: CaptionFormat,
    pub verification: Verification,
    pub cue_count: usize,
}

/// Summary of a file conversion that reached `Written`
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub direction: Direction,
    pub cue_count: usize,
    pub verification: Verification,
    /// True when the operator accepted a soft divergence
    pub accepted_divergence: bool,
}

/// Confirm-to-proceed seam for soft divergences
pub trait DivergenceGate {
    /// Return true to write the output despite `divergence`
    fn confirm_proceed(&mut self, divergence: &Divergence) -> bool;
}

/// Gate that always answers the same way
#[derive(Debug, Clone, Copy)]
pub struct FixedGate(pub bool);

impl DivergenceGate for FixedGate {
    fn confirm_proceed(&mut self, _divergence: &Divergence) -> bool {
        self.0
    }
}

/// Interactive yes/no prompt; anything but `y`/`yes` declines
pub struct TerminalGate<R, W> {
    input: R,
    output: W,
}

impl TerminalGate<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, answer on stdin
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> DivergenceGate for TerminalGate<R, W> {
    fn confirm_proceed(&mut self, _divergence: &Divergence) -> bool {
        if write!(self.output, "Do you want to proceed with the conversion? [y/N]: ")
            .and_then(|_| self.output.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        }
    }
}

/// Conversion engine bound to one set of options
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConversionOptions,
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Parse, convert and verify `input` without touching the filesystem
    pub fn convert_text(&self, input: &str, direction: Direction) -> Result<ConversionResult, CaptionError> {
        let mut lifecycle = Lifecycle::new();
        self.convert_tracked(input, direction, &mut lifecycle)
    }

    fn convert_tracked(&self, input: &str, direction: Direction, lifecycle: &mut Lifecycle) -> Result<ConversionResult, CaptionError> {
        let doc = parser::parse(input, direction.source(), self.options.parse_policy)?;
        lifecycle.advance(ConversionState::Parsed);

        let output = transcoder::transcode_document(&doc, direction.target(), self.options.header_policy);
        lifecycle.advance(ConversionState::Converted);

        let verification = verifier::verify(input, &output, direction, &self.options)?;
        match verification {
            Verification::Verified => lifecycle.advance(ConversionState::Verified),
            Verification::Divergent(_) => lifecycle.advance(ConversionState::Divergent),
            Verification::Skipped => debug!("Round-trip verification disabled"),
        }

        Ok(ConversionResult {
            output,
            target: direction.target(),
            verification,
            cue_count: doc.len(),
        })
    }

    /// Convert `input_path` into `output_path`.
    ///
    /// Extensions are validated against `direction` first. On a divergence
    /// the configured policy decides: `Abort` fails immediately, `Prompt`
    /// asks `gate`. Nothing is written unless the conversion proceeds.
    pub fn convert_file(
        &self,
        input_path: &Path,
        output_path: &Path,
        direction: Direction,
        overwrite: bool,
        gate: &mut dyn DivergenceGate,
    ) -> Result<ConversionReport, CaptionError> {
        FileManager::validate_extension(input_path, direction.source())?;
        FileManager::validate_extension(output_path, direction.target())?;
        if output_path.exists() && !overwrite {
            return Err(CaptionError::OutputExists { path: output_path.to_path_buf() });
        }

        let input = FileManager::read_caption(input_path)?;
        let mut lifecycle = Lifecycle::new();
        let result = match self.convert_tracked(&input, direction, &mut lifecycle) {
            Ok(result) => result,
            Err(e) => {
                lifecycle.advance(ConversionState::Aborted);
                return Err(e);
            }
        };

        let mut accepted_divergence = false;
        if let Verification::Divergent(divergence) = &result.verification {
            match self.options.divergence_policy(direction) {
                DivergencePolicy::Abort => {
                    // The error carries the excerpts; the caller reports it
                    lifecycle.advance(ConversionState::Aborted);
                    debug!("Aborting {}: nothing was written to {}", direction, output_path.display());
                    return Err(CaptionError::RoundTripDivergence {
                        direction,
                        divergence: divergence.clone(),
                    });
                }
                DivergencePolicy::Prompt => {
                    warn!("Conversion is not lossless. The resulting {} file may differ from the original.", direction.target());
                    for line in divergence.to_string().lines() {
                        warn!("{}", line);
                    }
                    if !gate.confirm_proceed(divergence) {
                        lifecycle.advance(ConversionState::Aborted);
                        return Err(CaptionError::Aborted(format!(
                            "round trip diverged and conversion to {} was declined",
                            output_path.display()
                        )));
                    }
                    accepted_divergence = true;
                }
            }
        }

        if let Err(e) = FileManager::write_atomic(output_path, &result.output) {
            lifecycle.advance(ConversionState::Aborted);
            return Err(e);
        }
        lifecycle.advance(ConversionState::Written);
        info!("Converted '{}' to '{}'", input_path.display(), output_path.display());

        Ok(ConversionReport {
            input: input_path.to_path_buf(),
            output: output_path.to_path_buf(),
            direction,
            cue_count: result.cue_count,
            verification: result.verification,
            accepted_divergence,
        })
    }
}
