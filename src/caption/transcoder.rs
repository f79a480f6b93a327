/*!
 * Format transcoder: rewrites timestamps and structural framing between
 * SRT and WebVTT.
 *
 * `transform` derives a new document in the target format (indices
 * renumbered 1..N for SRT, dropped for WebVTT) and `render` serializes it.
 * `transcode_text` is the raw-text entry point; it parses first, so both
 * paths always produce the same bytes.
 */

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{CaptionDocument, CaptionFormat, Cue, CueTiming, Direction, WEBVTT_TOKEN};
use super::parser;
use super::policy::{ConversionOptions, HeaderPolicy};
use crate::errors::CaptionError;

// @const: SRT timestamp token
static SRT_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2}:\d{2}:\d{2}),(\d{3})").unwrap());

// @const: WebVTT timestamp token
static WEBVTT_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2}:\d{2}:\d{2})\.(\d{3})").unwrap());

/// Swap the fractional separator of every `HH:MM:SS<sep>mmm` token.
///
/// Pure token substitution: digits and grouping are never touched, and
/// the text around the token is irrelevant.
pub fn rewrite_timestamps(text: &str, from: CaptionFormat, to: CaptionFormat) -> Cow<'_, str> {
    if from == to {
        return Cow::Borrowed(text);
    }
    let regex = match from {
        CaptionFormat::Srt => &SRT_TIMESTAMP_REGEX,
        CaptionFormat::WebVtt => &WEBVTT_TIMESTAMP_REGEX,
    };
    let replacement = format!("${{1}}{}${{2}}", to.fractional_separator());
    regex.replace_all(text, replacement.as_str())
}

/// Derive a document in `target` format from `doc`
pub fn transform(doc: &CaptionDocument, target: CaptionFormat) -> CaptionDocument {
    let source = doc.format();
    let cues = doc
        .cues()
        .iter()
        .enumerate()
        .map(|(i, cue)| {
            let index = match target {
                CaptionFormat::Srt => Some(i as u64 + 1),
                CaptionFormat::WebVtt => None,
            };
            let timing = CueTiming {
                start: cue.timing.start,
                end: cue.timing.end,
                settings: rewrite_timestamps(&cue.timing.settings, source, target).into_owned(),
            };
            Cue::new(index, timing, rewrite_timestamps(&cue.body, source, target))
        })
        .collect();

    let header = match target {
        CaptionFormat::Srt => None,
        CaptionFormat::WebVtt if source == CaptionFormat::WebVtt => doc.header().map(str::to_string),
        CaptionFormat::WebVtt => Some(WEBVTT_TOKEN.to_string()),
    };

    CaptionDocument::new(target, header, cues)
}

/// Serialize a document in its own format
pub fn render(doc: &CaptionDocument, header_policy: HeaderPolicy) -> String {
    let format = doc.format();
    let mut out = String::new();

    if format == CaptionFormat::WebVtt {
        out.push_str(doc.header().unwrap_or(WEBVTT_TOKEN));
        out.push_str(header_policy.terminator());
    }

    for (i, cue) in doc.cues().iter().enumerate() {
        if format == CaptionFormat::Srt {
            let index = cue.index.unwrap_or(i as u64 + 1);
            out.push_str(&index.to_string());
            out.push('\n');
        }
        out.push_str(&cue.timing.render(format));
        if !cue.body.is_empty() {
            out.push('\n');
            out.push_str(&cue.body);
        }
        out.push_str("\n\n");
    }

    out
}

/// Convert an already parsed document to text in `target` format
pub fn transcode_document(doc: &CaptionDocument, target: CaptionFormat, header_policy: HeaderPolicy) -> String {
    render(&transform(doc, target), header_policy)
}

/// Convert raw text in `direction`
pub fn transcode_text(text: &str, direction: Direction, options: &ConversionOptions) -> Result<String, CaptionError> {
    let doc = parser::parse(text, direction.source(), options.parse_policy)?;
    Ok(transcode_document(&doc, direction.target(), options.header_policy))
}
