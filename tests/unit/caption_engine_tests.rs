/*!
 * Tests for the parser, transcoder and verifier through the public API
 */

use captionkit::caption::model::{CaptionFormat, Direction, Timestamp};
use captionkit::caption::parser;
use captionkit::caption::policy::{ConversionOptions, HeaderPolicy, ParsePolicy};
use captionkit::caption::transcoder::{rewrite_timestamps, transcode_document, transcode_text};
use captionkit::caption::verifier::{Verification, verify};
use captionkit::errors::CaptionError;

const SCENARIO_SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n2\n00:00:03,500 --> 00:00:04,200\nWorld\n\n";
const SCENARIO_VTT: &str = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello\n\n00:00:03.500 --> 00:00:04.200\nWorld\n\n";

/// Test the reference SRT -> WebVTT rendering
#[test]
fn test_transcode_scenarioSrt_shouldProduceReferenceWebvtt() {
    let vtt = transcode_text(SCENARIO_SRT, Direction::SrtToWebVtt, &ConversionOptions::default()).unwrap();
    assert!(vtt.starts_with(SCENARIO_VTT));
    assert_eq!(vtt, SCENARIO_VTT);
}

/// Test that the WebVTT output converts back to the exact SRT
#[test]
fn test_transcode_scenarioWebvttBack_shouldRestoreIndicesAndCommas() {
    let srt = transcode_text(SCENARIO_VTT, Direction::WebVttToSrt, &ConversionOptions::default()).unwrap();
    assert_eq!(srt, SCENARIO_SRT);

    let doc = parser::parse(&srt, CaptionFormat::Srt, ParsePolicy::Strict).unwrap();
    let indices: Vec<_> = doc.cues().iter().map(|cue| cue.index).collect();
    assert_eq!(indices, vec![Some(1), Some(2)]);
}

/// Test that a WebVTT document without a header keeps its cues
#[test]
fn test_parse_webvttWithoutHeader_shouldKeepBodiesAndTimestamps() {
    let headerless = "00:00:01.000 --> 00:00:02.000\nHello\n\n00:00:03.500 --> 00:00:04.200\nWorld\n\n";
    let doc = parser::parse(headerless, CaptionFormat::WebVtt, ParsePolicy::Lenient).unwrap();

    assert_eq!(doc.header(), None);
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.cues()[0].body, "Hello");
    assert_eq!(doc.cues()[1].body, "World");
    assert_eq!(doc.cues()[1].end(), Timestamp::new(0, 0, 4, 200));
}

/// Test that a broken header line is dropped but the cues survive
#[test]
fn test_parse_webvttWithMalformedHeader_shouldKeepCues() {
    let malformed = "WEBVTT\n00:00:01.000 --> 00:00:02.000\nHello\n\n00:00:03.500 --> 00:00:04.200\nWorld\n\n";
    let doc = parser::parse(malformed, CaptionFormat::WebVtt, ParsePolicy::Lenient).unwrap();

    let bodies: Vec<_> = doc.cues().iter().map(|cue| cue.body.as_str()).collect();
    assert_eq!(bodies, vec!["Hello", "World"]);
    assert_eq!(doc.cues()[0].start(), Timestamp::new(0, 0, 1, 0));
}

/// Test that strict parsing rejects what lenient parsing tolerates
#[test]
fn test_parse_strictPolicy_withMissingHeader_shouldFail() {
    let headerless = "00:00:01.000 --> 00:00:02.000\nHello\n\n";
    let result = parser::parse(headerless, CaptionFormat::WebVtt, ParsePolicy::Strict);
    assert!(matches!(result, Err(CaptionError::MalformedSource { format: CaptionFormat::WebVtt, .. })));
}

/// Test that 2, 3 and 4 header newlines give the same cue sequence
#[test]
fn test_parse_headerNewlineCounts_shouldYieldIdenticalCues() {
    let cues_for = |newlines: usize| {
        let text = format!("WEBVTT{}{}", "\n".repeat(newlines), SCENARIO_VTT.trim_start_matches("WEBVTT\n\n"));
        parser::parse(&text, CaptionFormat::WebVtt, ParsePolicy::Strict).unwrap().cues().to_vec()
    };

    let reference = cues_for(2);
    assert_eq!(reference.len(), 2);
    assert_eq!(cues_for(3), reference);
    assert_eq!(cues_for(4), reference);
}

/// Test that the document and raw-text paths agree
#[test]
fn test_transcode_documentAndTextPaths_shouldAgree() {
    let options = ConversionOptions::default().with_header_policy(HeaderPolicy::Padded);
    let doc = parser::parse(SCENARIO_SRT, CaptionFormat::Srt, options.parse_policy).unwrap();

    let from_doc = transcode_document(&doc, CaptionFormat::WebVtt, options.header_policy);
    let from_text = transcode_text(SCENARIO_SRT, Direction::SrtToWebVtt, &options).unwrap();
    assert_eq!(from_doc, from_text);
    assert!(from_doc.starts_with("WEBVTT\n\n\n\n"));
}

/// Test that the rewrite swaps separators only
#[test]
fn test_rewriteTimestamps_shouldOnlySwapSeparator() {
    let body = "Meet at 01:02:03,456 or 10:20:30,999, not 1,5";
    let rewritten = rewrite_timestamps(body, CaptionFormat::Srt, CaptionFormat::WebVtt);
    assert_eq!(rewritten, "Meet at 01:02:03.456 or 10:20:30.999, not 1,5");

    let restored = rewrite_timestamps(&rewritten, CaptionFormat::WebVtt, CaptionFormat::Srt);
    assert_eq!(restored, body);
}

/// Test that cue settings survive in both directions
#[test]
fn test_transcode_cueSettings_shouldBeKeptVerbatim() {
    let srt = "1\n00:00:01,000 --> 00:00:02,000 X1:40 X2:600\nHello\n\n";
    let vtt = transcode_text(srt, Direction::SrtToWebVtt, &ConversionOptions::default()).unwrap();
    assert_eq!(vtt, "WEBVTT\n\n00:00:01.000 --> 00:00:02.000 X1:40 X2:600\nHello\n\n");

    let back = transcode_text(&vtt, Direction::WebVttToSrt, &ConversionOptions::default()).unwrap();
    assert_eq!(back, srt);
}

/// Test that header metadata lost on the way to SRT is reported
#[test]
fn test_verify_webvttWithHeaderMetadata_shouldReportDivergence() {
    let options = ConversionOptions::default();
    let vtt = "WEBVTT - Episode 1\n\n00:00:01.000 --> 00:00:02.000\nHello\n\n";
    let srt = transcode_text(vtt, Direction::WebVttToSrt, &options).unwrap();
    assert_eq!(srt, "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n");

    let result = verify(vtt, &srt, Direction::WebVttToSrt, &options).unwrap();
    assert!(result.is_divergent());
}

/// Test that CRLF input converts and verifies like its LF form
#[test]
fn test_verify_crlfInput_shouldBeVerified() {
    let options = ConversionOptions::default();
    let crlf = SCENARIO_SRT.replace('\n', "\r\n");
    let vtt = transcode_text(&crlf, Direction::SrtToWebVtt, &options).unwrap();
    assert_eq!(vtt, SCENARIO_VTT);

    let result = verify(&crlf, &vtt, Direction::SrtToWebVtt, &options).unwrap();
    assert_eq!(result, Verification::Verified);
}

/// Test that a leading BOM still counts as divergence
#[test]
fn test_verify_bomInput_shouldReportDivergence() {
    let options = ConversionOptions::default();
    let with_bom = format!("\u{feff}{}", SCENARIO_SRT);
    let vtt = transcode_text(&with_bom, Direction::SrtToWebVtt, &options).unwrap();

    match verify(&with_bom, &vtt, Direction::SrtToWebVtt, &options).unwrap() {
        Verification::Divergent(divergence) => assert_eq!(divergence.first_mismatch, 0),
        other => panic!("expected divergence, got {:?}", other),
    }
}
