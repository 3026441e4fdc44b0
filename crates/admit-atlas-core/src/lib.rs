#![forbid(unsafe_code)]

pub mod canonical;
mod error;

pub use canonical::{
    sha256_hex, stable_json_bytes, stable_json_hash_hex, stable_json_pretty_bytes,
};
pub use error::ExitCode;

pub const CRATE_NAME: &str = "admit-atlas-core";
