//! A fast delimited-text (CSV-like) tokenizer core.
//!
//! Given a contiguous byte buffer, [`Tokenizer`] classifies each byte into
//! fields, honoring quoting, comments, whitespace stripping, and delimiter
//! conventions, and writes the result into packed per-column byte buffers.
//! [`Tokenizer::next_field`] then replays those fields in row order without
//! re-scanning the input. The [`numeric`] module converts the resulting byte
//! slices into integers and floats.
//!
//! This crate handles the tokenizing/encoding core only: file I/O, dispatch
//! from a higher-level table reader, and type inference all live above it.

mod buffer;
mod cursor;
mod skip_lines;
mod tokenizer;

pub mod config;
pub mod errors;
pub mod numeric;

pub use config::{TokenizerConfig, TokenizerConfigBuilder};
pub use errors::{ConversionErrorKind, Error, ErrorCode, Result, TokenizeErrorKind};
pub use numeric::{to_double, to_int64, Converted};
pub use tokenizer::Tokenizer;
