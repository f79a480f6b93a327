/*!
 * Round-trip verifier.
 *
 * Applies the inverse transcoder to a converted document and compares the
 * result with the original input, byte for byte after folding `\r\n` line
 * endings to `\n`. A leading BOM is not folded. Divergences carry bounded
 * head/tail excerpts of the three texts so an operator can see the drift
 * without dumping whole documents.
 *
 * Known permanent divergences (non-contiguous SRT numbering, a WebVTT
 * header layout other than the configured one) are reported like any other.
 */

use std::borrow::Cow;
use std::fmt;

use super::model::Direction;
use super::policy::ConversionOptions;
use super::transcoder;
use crate::errors::CaptionError;

/// Outcome of the round-trip check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Divergent(Box<Divergence>),
    Skipped,
}

impl Verification {
    pub fn is_divergent(&self) -> bool {
        matches!(self, Self::Divergent(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Divergent(_) => "divergent",
            Self::Skipped => "skipped",
        }
    }
}

/// Bounded view of a document: first and last characters only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    pub head: String,
    pub tail: String,
    pub total_chars: usize,
}

impl Excerpt {
    pub fn new(text: &str, head_chars: usize, tail_chars: usize) -> Self {
        let total_chars = text.chars().count();
        let head = text.chars().take(head_chars).collect();
        let tail_start = total_chars.saturating_sub(tail_chars);
        let tail = text.chars().skip(tail_start).collect();
        Self { head, tail, total_chars }
    }
}

impl fmt::Display for Excerpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}...{:?} ({} chars)", self.head, self.tail, self.total_chars)
    }
}

/// Diagnostic for a failed round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    pub direction: Direction,
    pub original: Excerpt,
    pub forward: Excerpt,
    pub reverse: Excerpt,
    /// Character offset of the first difference between original and reverse
    pub first_mismatch: usize,
}

impl Divergence {
    pub fn new(direction: Direction, original: &str, forward: &str, reverse: &str, options: &ConversionOptions) -> Self {
        let excerpt = |text: &str| Excerpt::new(text, options.excerpt_head_chars, options.excerpt_tail_chars);
        Self {
            direction,
            original: excerpt(original),
            forward: excerpt(forward),
            reverse: excerpt(reverse),
            first_mismatch: first_mismatch(original, reverse),
        }
    }
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.direction.source();
        let target = self.direction.target();
        writeln!(f, "Beginning...end of input {}:     {}", source, self.original)?;
        writeln!(f, "Beginning...end of converted {}: {}", target, self.forward)?;
        writeln!(f, "Beginning...end of reverted {}:  {}", source, self.reverse)?;
        write!(f, "First difference at character {}", self.first_mismatch)
    }
}

fn first_mismatch(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .position(|(x, y)| x != y)
        .unwrap_or_else(|| a.chars().count().min(b.chars().count()))
}

fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Check that converting `forward` back in the inverse direction yields `original`
pub fn verify(original: &str, forward: &str, direction: Direction, options: &ConversionOptions) -> Result<Verification, CaptionError> {
    if !options.verify {
        return Ok(Verification::Skipped);
    }

    let original = normalize_line_endings(original);
    let reverse = transcoder::transcode_text(forward, direction.inverse(), options)?;
    if reverse == original {
        Ok(Verification::Verified)
    } else {
        Ok(Verification::Divergent(Box::new(Divergence::new(
            direction, &original, forward, &reverse, options,
        ))))
    }
}
