//! CLI command implementations.

pub mod common;
pub mod parse_asset;
pub mod render;
pub mod sha256;
