/*!
 * Randomized round-trip properties over generated caption documents
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use captionkit::caption::model::{CaptionFormat, Direction, Timestamp};
use captionkit::caption::parser;
use captionkit::caption::policy::{ConversionOptions, ParsePolicy};
use captionkit::caption::transcoder::{rewrite_timestamps, transcode_text};
use captionkit::caption::verifier::{Verification, verify};

const ITERATIONS: u64 = 200;
const WORDS: &[&str] = &["hello", "world", "caption", "the", "quick", "fox", "42", "ça", "va", "naïve", "--", "[music]"];

fn random_timestamp(rng: &mut StdRng) -> Timestamp {
    Timestamp::new(
        rng.random_range(0..100),
        rng.random_range(0..60),
        rng.random_range(0..60),
        rng.random_range(0..1000),
    )
}

fn random_body(rng: &mut StdRng) -> Vec<String> {
    let line_count = rng.random_range(0..4);
    (0..line_count)
        .map(|_| {
            let mut words: Vec<String> = (0..rng.random_range(1..6))
                .map(|_| WORDS[rng.random_range(0..WORDS.len())].to_string())
                .collect();
            if rng.random_bool(0.1) {
                words.push(format!("at {}", random_timestamp(rng).render(CaptionFormat::Srt)));
            }
            words.join(" ")
        })
        .collect()
}

/// Contiguous SRT in canonical layout
fn random_srt(rng: &mut StdRng) -> String {
    let cue_count = rng.random_range(0..12);
    let mut out = String::new();
    for index in 1..=cue_count {
        let start = random_timestamp(rng);
        let end = random_timestamp(rng);
        out.push_str(&format!("{}\n{} --> {}\n", index, start.render(CaptionFormat::Srt), end.render(CaptionFormat::Srt)));
        for line in random_body(rng) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Test that canonical SRT always verifies and survives a full round trip
#[test]
fn test_roundTrip_randomContiguousSrt_shouldReproduceInput() {
    let options = ConversionOptions::default();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..ITERATIONS {
        let srt = random_srt(&mut rng);
        let vtt = transcode_text(&srt, Direction::SrtToWebVtt, &options).unwrap();
        let back = transcode_text(&vtt, Direction::WebVttToSrt, &options).unwrap();
        assert_eq!(back, srt);
        assert_eq!(verify(&srt, &vtt, Direction::SrtToWebVtt, &options).unwrap(), Verification::Verified);
    }
}

/// Test that WebVTT output is stable from the second conversion onwards
#[test]
fn test_roundTrip_webvttOutput_shouldBeIdempotent() {
    let options = ConversionOptions::default();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..ITERATIONS {
        let srt = random_srt(&mut rng);
        let vtt = transcode_text(&srt, Direction::SrtToWebVtt, &options).unwrap();
        let srt_again = transcode_text(&vtt, Direction::WebVttToSrt, &options).unwrap();
        let vtt_again = transcode_text(&srt_again, Direction::SrtToWebVtt, &options).unwrap();
        assert_eq!(vtt_again, vtt);
    }
}

/// Test that separator swaps never change timestamp digits
#[test]
fn test_timestampFidelity_randomTimestamps_shouldKeepDigits() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..ITERATIONS * 5 {
        let ts = random_timestamp(&mut rng);
        let srt = ts.render(CaptionFormat::Srt);
        let vtt = rewrite_timestamps(&srt, CaptionFormat::Srt, CaptionFormat::WebVtt);
        assert_eq!(vtt, ts.render(CaptionFormat::WebVtt));
        assert_eq!(Timestamp::parse(&vtt).unwrap(), ts);

        let back = rewrite_timestamps(&vtt, CaptionFormat::WebVtt, CaptionFormat::Srt);
        assert_eq!(back, srt);
    }
}

/// Test that WebVTT -> SRT always numbers 1..N whatever came before
#[test]
fn test_renumbering_randomPriorIndices_shouldYieldOneToN() {
    let options = ConversionOptions::default();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..ITERATIONS {
        let mut srt = String::new();
        let cue_count = rng.random_range(1..10);
        let mut index = 0u64;
        for _ in 0..cue_count {
            index += rng.random_range(1..5);
            let ts = random_timestamp(&mut rng).render(CaptionFormat::Srt);
            srt.push_str(&format!("{}\n{} --> {}\nline\n\n", index, ts, ts));
        }

        let vtt = transcode_text(&srt, Direction::SrtToWebVtt, &options).unwrap();
        let back = transcode_text(&vtt, Direction::WebVttToSrt, &options).unwrap();
        let doc = parser::parse(&back, CaptionFormat::Srt, ParsePolicy::Strict).unwrap();

        assert_eq!(doc.len(), cue_count as usize);
        assert!(doc.has_contiguous_indices());
    }
}
