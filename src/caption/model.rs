/*!
 * Caption document model shared by the parser, transcoder and verifier.
 *
 * A `CaptionDocument` is built once per read and never mutated afterwards;
 * every transform produces a new document.
 */

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::CaptionError;

/// Literal token that opens every WebVTT file
pub const WEBVTT_TOKEN: &str = "WEBVTT";

/// Supported caption container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionFormat {
    /// SubRip text
    Srt,
    /// Web Video Text Tracks
    WebVtt,
}

impl CaptionFormat {
    // @returns: Canonical file extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::WebVtt => "vtt",
        }
    }

    // @returns: Glyph between seconds and milliseconds
    pub fn fractional_separator(&self) -> char {
        match self {
            Self::Srt => ',',
            Self::WebVtt => '.',
        }
    }

    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "srt" => Some(Self::Srt),
            "vtt" | "webvtt" => Some(Self::WebVtt),
            _ => None,
        }
    }

    /// The other format
    pub fn counterpart(&self) -> Self {
        match self {
            Self::Srt => Self::WebVtt,
            Self::WebVtt => Self::Srt,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Srt => "SRT",
            Self::WebVtt => "WebVTT",
        }
    }
}

impl fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Conversion direction between the two formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    SrtToWebVtt,
    WebVttToSrt,
}

impl Direction {
    /// Direction that reads `source`
    pub fn from_source(source: CaptionFormat) -> Self {
        match source {
            CaptionFormat::Srt => Self::SrtToWebVtt,
            CaptionFormat::WebVtt => Self::WebVttToSrt,
        }
    }

    /// Infer the direction from input and output extensions.
    ///
    /// Both paths must carry a known caption extension and they must differ.
    pub fn from_paths<P1: AsRef<Path>, P2: AsRef<Path>>(input: P1, output: P2) -> Result<Self, CaptionError> {
        let input = input.as_ref();
        let output = output.as_ref();

        let source = CaptionFormat::from_path(input).ok_or_else(|| CaptionError::UnknownFormat {
            path: input.to_path_buf(),
        })?;
        let direction = Self::from_source(source);

        match CaptionFormat::from_path(output) {
            Some(target) if target == direction.target() => Ok(direction),
            _ => Err(CaptionError::InvalidExtension {
                path: output.to_path_buf(),
                expected: direction.target(),
            }),
        }
    }

    pub fn source(&self) -> CaptionFormat {
        match self {
            Self::SrtToWebVtt => CaptionFormat::Srt,
            Self::WebVttToSrt => CaptionFormat::WebVtt,
        }
    }

    pub fn target(&self) -> CaptionFormat {
        self.source().counterpart()
    }

    pub fn inverse(&self) -> Self {
        Self::from_source(self.target())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source(), self.target())
    }
}

/// A cue boundary: hours, minutes, seconds and milliseconds.
///
/// The value is format-agnostic; only `render` picks a separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub hours: u64,
    pub minutes: u32,
    pub seconds: u32,
    pub millis: u32,
}

impl Timestamp {
    pub fn new(hours: u64, minutes: u32, seconds: u32, millis: u32) -> Self {
        Self { hours, minutes, seconds, millis }
    }

    /// Parse `HH:MM:SS,mmm` or `HH:MM:SS.mmm`.
    ///
    /// Hours may have more than two digits. Minute and second fields are
    /// taken as written, without range checks, so that no digits are lost.
    pub fn parse(token: &str) -> Result<Self, CaptionError> {
        let malformed = || CaptionError::MalformedTimestamp(token.to_string());

        let (clock, millis) = token
            .rsplit_once([',', '.'])
            .ok_or_else(malformed)?;
        let mut parts = clock.split(':');
        let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };

        let all_digits = |field: &str, width: Option<usize>| {
            !field.is_empty()
                && field.bytes().all(|b| b.is_ascii_digit())
                && width.is_none_or(|w| field.len() == w)
        };
        if !(h.len() >= 2 && all_digits(h, None) && all_digits(m, Some(2)) && all_digits(s, Some(2)) && all_digits(millis, Some(3))) {
            return Err(malformed());
        }

        Ok(Self {
            hours: h.parse().map_err(|_| malformed())?,
            minutes: m.parse().map_err(|_| malformed())?,
            seconds: s.parse().map_err(|_| malformed())?,
            millis: millis.parse().map_err(|_| malformed())?,
        })
    }

    /// Build a normalized timestamp from a millisecond offset
    pub fn from_millis(ms: u64) -> Self {
        Self {
            hours: ms / 3_600_000,
            minutes: ((ms % 3_600_000) / 60_000) as u32,
            seconds: ((ms % 60_000) / 1_000) as u32,
            millis: (ms % 1_000) as u32,
        }
    }

    pub fn to_millis(&self) -> u64 {
        self.hours
            .saturating_mul(3_600_000)
            .saturating_add(u64::from(self.minutes) * 60_000)
            .saturating_add(u64::from(self.seconds) * 1_000)
            .saturating_add(u64::from(self.millis))
    }

    /// Render zero-padded with the separator of `format`
    pub fn render(&self, format: CaptionFormat) -> String {
        format!(
            "{:02}:{:02}:{:02}{}{:03}",
            self.hours,
            self.minutes,
            self.seconds,
            format.fractional_separator(),
            self.millis
        )
    }
}

/// Timing line of a cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueTiming {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Text after the end timestamp (cue settings, coordinates), kept verbatim
    pub settings: String,
}

impl CueTiming {
    pub fn render(&self, format: CaptionFormat) -> String {
        format!("{} --> {}{}", self.start.render(format), self.end.render(format), self.settings)
    }
}

/// One caption unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: SRT sequence index, None for WebVTT
    pub index: Option<u64>,

    // @field: Start/end line
    pub timing: CueTiming,

    // @field: Body lines joined by '\n', never containing a blank line
    pub body: String,
}

impl Cue {
    pub fn new(index: Option<u64>, timing: CueTiming, body: impl Into<String>) -> Self {
        Self { index, timing, body: body.into() }
    }

    pub fn start(&self) -> Timestamp {
        self.timing.start
    }

    pub fn end(&self) -> Timestamp {
        self.timing.end
    }
}

/// An ordered, immutable sequence of cues plus an optional header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionDocument {
    format: CaptionFormat,
    header: Option<String>,
    cues: Vec<Cue>,
}

impl CaptionDocument {
    pub fn new(format: CaptionFormat, header: Option<String>, cues: Vec<Cue>) -> Self {
        Self { format, header, cues }
    }

    pub fn format(&self) -> CaptionFormat {
        self.format
    }

    /// Header block text without its blank-line terminator
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// True when indices are exactly 1..=N in order
    pub fn has_contiguous_indices(&self) -> bool {
        self.cues
            .iter()
            .enumerate()
            .all(|(i, cue)| cue.index == Some(i as u64 + 1))
    }
}
