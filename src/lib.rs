//! Rotates a proxy load-test results CSV into a wide, per-case layout.
//!
//! The input has one row per test case (proxy, protocol, request size) with
//! `Requests/sec` and `Transfer 10K/sec` in columns 1 and 2. The output has one
//! row per proxy/protocol case with those two metrics broken out by request-size
//! bucket (Tiny/Small/Medium/Large).
//!
//! Pipeline: [`load`] -> [`pivot`] -> [`save`], or [`convert`] for all three.
//! Field values are copied as raw bytes and never parsed.
#![cfg_attr(docsrs, feature(doc_cfg))]
//
mod codec;
mod io;
pub mod layout;
mod table;

pub use crate::io::{build_source_reader, source_from_path, Compression, SourceMeta};
pub use crate::layout::{pivot, Group, GROUPS, OUTPUT_HEADER, REQUIRED_ROWS};
pub use crate::table::{
    load, load_from_reader, load_with, save, to_csv_bytes, InputTable, RotatedRow, RotatedTable,
};

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_INPUT: &str = "proxies-performance.csv";
pub const DEFAULT_OUTPUT: &str = "proxies-performance-rotated.csv";

#[derive(Debug, Error)]
pub enum RotateError {
    #[error("expected at least {required} data rows after the header, found {found}")]
    TooFewRows { found: usize, required: usize },
    #[error("data row {row} has no column {column}")]
    MissingField { row: usize, column: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv_async::Error),
}

/// Coarse classification: could not touch the file, or the file had the wrong shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Format,
}

impl RotateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RotateError::Io(_) => ErrorKind::Io,
            RotateError::Csv(e) if matches!(e.kind(), csv_async::ErrorKind::Io(_)) => ErrorKind::Io,
            RotateError::Csv(_) | RotateError::TooFewRows { .. } | RotateError::MissingField { .. } => {
                ErrorKind::Format
            }
        }
    }
}

pub type RotateResult<T> = std::result::Result<T, RotateError>;

/// Where to read from and write to.
#[derive(Debug, Clone)]
pub struct RotateConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Character encoding of the input (defaults to UTF-8)
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for RotateConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            charset: encoding_rs::UTF_8,
        }
    }
}

/// Load, pivot and save in one go. The output file is only touched once the
/// pivot has succeeded.
pub async fn convert(config: &RotateConfig) -> RotateResult<RotatedTable> {
    let meta = SourceMeta::for_path(&config.input).with_charset(config.charset);
    let input = load_with(&config.input, &meta).await?;
    let rotated = pivot(&input)?;
    save(&rotated, &config.output).await?;
    Ok(rotated)
}
