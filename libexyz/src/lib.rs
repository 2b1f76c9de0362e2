//! Extended XYZ parser implementation.
//!
//! Extended XYZ is the XYZ chemistry trajectory format with a structured
//! second line. Each frame is an atom count, a comment line of `key=value`
//! pairs, and one line per atom. The comment line declares the per-atom
//! columns (`Properties=species:S:1:pos:R:3`) and carries typed metadata
//! (integers, reals, booleans, strings and small arrays).
//!
//! # Parsing Pipeline
//!
//! 1. **Frame locator**: splits the input into frames by counting lines.
//!
//! 2. **Comment line parser**: reads the `key=value` pairs, trying each
//!    value grammar in turn and backtracking on a mismatch. Arrays are read
//!    in two passes: one to infer the element type and shape, one to store
//!    the elements.
//!
//! 3. **Atom reader**: converts each atom line into the declared columns.

mod array;
mod chars;
mod comment;
mod cursor;
mod encode;
mod error;
mod frame;
mod infer;
mod properties;
mod scalar;
mod value;
mod writer;

pub use comment::{parse_comment_line, parse_comment_line_with_context};
pub use encode::{
    encode_comment_line, encode_key, encode_string, encode_value, format_real, to_json, Node,
};
pub use error::{ParseContext, ParseError, Result};
pub use frame::{
    default_properties, read_frames, read_frames_from, AtomArray, Frame, FrameLocator, RawFrame,
    Reader,
};
pub use scalar::unescape;
pub use value::{Array, ArrayData, CommentLine, DataType, Info, Property, Value};
pub use writer::{write_frame, write_frames};
