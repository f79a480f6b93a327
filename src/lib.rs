/*!
 * # captionkit
 *
 * A Rust library for converting captions between SubRip (SRT) and WebVTT,
 * with a round-trip check that proves a conversion is lossless before the
 * output is written.
 *
 * ## Features
 *
 * - SRT -> WebVTT and WebVTT -> SRT conversion
 * - Round-trip verification with bounded divergence excerpts
 * - Explicit header, divergence and parse policies
 * - Atomic output writes: an aborted conversion leaves nothing behind
 * - Folder conversion with a bounded worker pool
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `caption`: the pure conversion engine:
 *   - `caption::model`: documents, cues, timestamps, formats
 *   - `caption::parser`: segment parser
 *   - `caption::transcoder`: format transcoder and renderer
 *   - `caption::verifier`: round-trip verifier
 *   - `caption::policy`: conversion policies
 * - `converter`: per-file pipeline and its state machine
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod caption;
pub mod converter;
pub mod app_config;
pub mod file_utils;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use caption::{CaptionDocument, CaptionFormat, ConversionOptions, Cue, Direction, Timestamp, Verification};
pub use converter::{ConversionReport, ConversionResult, Converter, DivergenceGate, FixedGate, TerminalGate};
pub use errors::{AppError, CaptionError};
