/*!
 * Explicit conversion policies.
 *
 * Header blank-line convention, divergence severity and parse strictness
 * are all chosen here instead of per call site.
 */

use serde::{Deserialize, Serialize};

use super::model::Direction;

/// Newlines emitted after the `WEBVTT` token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPolicy {
    /// `WEBVTT\n\n`
    #[default]
    Standard,
    /// `WEBVTT\n\n\n\n`, the legacy converter's layout
    Padded,
}

impl HeaderPolicy {
    pub fn newline_count(&self) -> usize {
        match self {
            Self::Standard => 2,
            Self::Padded => 4,
        }
    }

    pub fn terminator(&self) -> &'static str {
        match self {
            Self::Standard => "\n\n",
            Self::Padded => "\n\n\n\n",
        }
    }
}

/// What to do when a round trip does not reproduce the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivergencePolicy {
    /// Warn and ask the operator; declining aborts
    Prompt,
    /// Abort before writing anything
    Abort,
}

impl DivergencePolicy {
    /// Severity historically attached to each direction
    pub fn default_for(direction: Direction) -> Self {
        match direction {
            Direction::SrtToWebVtt => Self::Prompt,
            Direction::WebVttToSrt => Self::Abort,
        }
    }
}

/// How to treat sources whose header or index markers are missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Degrade to a best-effort cue stream and log what was dropped
    #[default]
    Lenient,
    /// Reject with `MalformedSource`
    Strict,
}

/// Full set of knobs for one conversion engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// WebVTT header layout for rendered output
    #[serde(default)]
    pub header_policy: HeaderPolicy,

    /// Parse strictness
    #[serde(default)]
    pub parse_policy: ParsePolicy,

    /// Run the round-trip check before writing
    #[serde(default = "default_true")]
    pub verify: bool,

    /// Divergence handling for SRT -> WebVTT
    #[serde(default = "default_srt_to_webvtt_divergence")]
    pub srt_to_webvtt_divergence: DivergencePolicy,

    /// Divergence handling for WebVTT -> SRT
    #[serde(default = "default_webvtt_to_srt_divergence")]
    pub webvtt_to_srt_divergence: DivergencePolicy,

    /// Characters shown from the start of each document in a divergence report
    #[serde(default = "default_excerpt_head_chars")]
    pub excerpt_head_chars: usize,

    /// Characters shown from the end of each document in a divergence report
    #[serde(default = "default_excerpt_tail_chars")]
    pub excerpt_tail_chars: usize,
}

impl ConversionOptions {
    pub fn divergence_policy(&self, direction: Direction) -> DivergencePolicy {
        match direction {
            Direction::SrtToWebVtt => self.srt_to_webvtt_divergence,
            Direction::WebVttToSrt => self.webvtt_to_srt_divergence,
        }
    }

    /// Override the divergence handling for both directions
    pub fn with_divergence_policy(mut self, policy: DivergencePolicy) -> Self {
        self.srt_to_webvtt_divergence = policy;
        self.webvtt_to_srt_divergence = policy;
        self
    }

    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.header_policy = policy;
        self
    }

    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            header_policy: HeaderPolicy::default(),
            parse_policy: ParsePolicy::default(),
            verify: true,
            srt_to_webvtt_divergence: default_srt_to_webvtt_divergence(),
            webvtt_to_srt_divergence: default_webvtt_to_srt_divergence(),
            excerpt_head_chars: default_excerpt_head_chars(),
            excerpt_tail_chars: default_excerpt_tail_chars(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_srt_to_webvtt_divergence() -> DivergencePolicy {
    DivergencePolicy::default_for(Direction::SrtToWebVtt)
}

fn default_webvtt_to_srt_divergence() -> DivergencePolicy {
    DivergencePolicy::default_for(Direction::WebVttToSrt)
}

fn default_excerpt_head_chars() -> usize {
    50
}

fn default_excerpt_tail_chars() -> usize {
    10
}
