/*!
 * Caption conversion engine.
 *
 * - `model`: documents, cues, timestamps, formats and directions
 * - `parser`: raw text to cue sequence
 * - `transcoder`: cue sequence to target-format text
 * - `verifier`: inverse transform and byte comparison
 * - `policy`: header, divergence and parse policies
 *
 * Every function here is a pure function of its inputs; nothing is kept
 * between calls.
 */

pub mod model;
pub mod parser;
pub mod policy;
pub mod transcoder;
pub mod verifier;

pub use model::{CaptionDocument, CaptionFormat, Cue, CueTiming, Direction, Timestamp};
pub use policy::{ConversionOptions, DivergencePolicy, HeaderPolicy, ParsePolicy};
pub use verifier::{Divergence, Excerpt, Verification};
