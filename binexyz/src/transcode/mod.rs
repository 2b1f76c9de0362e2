//! Document tree transcoders for output formats the library does not write
//! itself.

pub mod cbor;
pub mod toml;
pub mod yaml;
