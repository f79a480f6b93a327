/*!
 * Segment parser: raw caption text to an ordered cue sequence.
 *
 * Cues are delimited by a blank line (`\n\n`). Each block is trimmed,
 * then split into an optional preamble (SRT index or WebVTT identifier),
 * a timing line and the body. WebVTT input additionally loses its
 * leading header block, whatever the number of blank lines after it.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{CaptionDocument, CaptionFormat, Cue, CueTiming, Timestamp, WEBVTT_TOKEN};
use super::policy::ParsePolicy;
use crate::errors::CaptionError;

// @const: Timing line, either separator accepted
static TIMING_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}:\d{2}:\d{2}[,.]\d{3})[ \t]*-->[ \t]*(\d{2,}:\d{2}:\d{2}[,.]\d{3})(.*)$").unwrap()
});

/// Check whether a single line is a cue timing line
pub fn is_timing_line(line: &str) -> bool {
    TIMING_LINE_REGEX.is_match(line)
}

/// Parse `text` declared as `format` into a document.
pub fn parse(text: &str, format: CaptionFormat, policy: ParsePolicy) -> Result<CaptionDocument, CaptionError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let normalized = text.replace("\r\n", "\n");

    let (header, stream) = match format {
        CaptionFormat::Srt => (None, normalized.as_str()),
        CaptionFormat::WebVtt => split_webvtt_header(&normalized, policy)?,
    };

    let mut cues = Vec::new();
    for (block_num, block) in split_blocks(stream).enumerate() {
        if let Some(cue) = parse_block(block, block_num + 1, format, policy)? {
            cues.push(cue);
        }
    }

    debug!("Parsed {} {} cues", cues.len(), format);
    Ok(CaptionDocument::new(format, header, cues))
}

/// Split a cue stream on blank lines; blocks are trimmed and empty ones skipped
pub fn split_blocks(stream: &str) -> impl Iterator<Item = &str> {
    stream
        .trim()
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
}

/// Separate the WebVTT header block from the cue stream.
///
/// The header is the `WEBVTT` line plus any metadata lines up to the first
/// blank line. Any run of two or more newlines terminates it.
fn split_webvtt_header(text: &str, policy: ParsePolicy) -> Result<(Option<String>, &str), CaptionError> {
    let malformed = |reason: &str| CaptionError::MalformedSource {
        format: CaptionFormat::WebVtt,
        reason: reason.to_string(),
    };

    if !starts_with_header_token(text) {
        if policy == ParsePolicy::Strict {
            return Err(malformed("missing WEBVTT header"));
        }
        warn!("No WEBVTT header found, treating the whole text as a cue stream");
        return Ok((None, text));
    }

    let (candidate, rest) = match text.find("\n\n") {
        Some(pos) => (&text[..pos], &text[pos..]),
        None => (text.trim_end(), ""),
    };

    if candidate.lines().any(is_timing_line) {
        if policy == ParsePolicy::Strict {
            return Err(malformed("WEBVTT header is not followed by a blank line"));
        }
        warn!("WEBVTT header is not terminated by a blank line, dropping the header line");
        let after_token_line = text.split_once('\n').map_or("", |(_, rest)| rest);
        return Ok((None, after_token_line));
    }

    Ok((Some(candidate.to_string()), rest))
}

fn starts_with_header_token(text: &str) -> bool {
    match text.strip_prefix(WEBVTT_TOKEN) {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t', '\n']),
        None => false,
    }
}

fn parse_block(block: &str, block_num: usize, format: CaptionFormat, policy: ParsePolicy) -> Result<Option<Cue>, CaptionError> {
    let malformed = |reason: String| CaptionError::MalformedSource { format, reason };
    let lines: Vec<&str> = block.split('\n').collect();

    let Some(timing_pos) = lines.iter().position(|line| is_timing_line(line)) else {
        if policy == ParsePolicy::Strict {
            return Err(malformed(format!("block {} has no timing line", block_num)));
        }
        warn!("Skipping block {} without a timing line: {:?}", block_num, lines[0]);
        return Ok(None);
    };

    let preamble = &lines[..timing_pos];
    let index = match format {
        CaptionFormat::Srt => srt_index(preamble, block_num, policy).map_err(malformed)?,
        CaptionFormat::WebVtt => {
            if preamble.len() > 1 {
                if policy == ParsePolicy::Strict {
                    return Err(malformed(format!("block {} has {} lines before its timing line", block_num, preamble.len())));
                }
                warn!("Dropping {} unexpected lines before cue {}", preamble.len(), block_num);
            } else if let Some(identifier) = preamble.first() {
                debug!("Discarding cue identifier {:?} of cue {}", identifier, block_num);
            }
            None
        }
    };

    let timing = parse_timing_line(lines[timing_pos])?;
    let body = lines[timing_pos + 1..].join("\n");

    Ok(Some(Cue::new(index, timing, body)))
}

fn srt_index(preamble: &[&str], block_num: usize, policy: ParsePolicy) -> Result<Option<u64>, String> {
    match preamble {
        [] => {
            if policy == ParsePolicy::Strict {
                return Err(format!("cue {} has no index line", block_num));
            }
            debug!("Cue {} has no index line", block_num);
            Ok(None)
        }
        [line] => match line.trim().parse::<u64>() {
            Ok(index) => Ok(Some(index)),
            Err(_) if policy == ParsePolicy::Strict => {
                Err(format!("cue {} index line {:?} is not an integer", block_num, line))
            }
            Err(_) => {
                warn!("Dropping non-numeric index line {:?} of cue {}", line, block_num);
                Ok(None)
            }
        },
        [dropped @ .., last] => {
            if policy == ParsePolicy::Strict {
                return Err(format!("cue {} has {} lines before its timing line", block_num, preamble.len()));
            }
            warn!("Dropping {} unexpected lines before cue {}", dropped.len(), block_num);
            Ok(last.trim().parse::<u64>().ok())
        }
    }
}

/// Parse a full `start --> end[settings]` line
pub fn parse_timing_line(line: &str) -> Result<CueTiming, CaptionError> {
    let caps = TIMING_LINE_REGEX
        .captures(line)
        .ok_or_else(|| CaptionError::MalformedTimestamp(line.to_string()))?;

    Ok(CueTiming {
        start: Timestamp::parse(&caps[1])?,
        end: Timestamp::parse(&caps[2])?,
        settings: caps[3].to_string(),
    })
}
