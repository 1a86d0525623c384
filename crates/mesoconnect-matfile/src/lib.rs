// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! # mesoconnect MAT-file support
//!
//! Reads MATLAB Level 5 MAT-files, the default `save` format from MATLAB 5
//! through 7.x, including zlib-compressed variables.
//!
//! ## Supported arrays
//! - numeric (double, single, all integer classes; complex and logical)
//! - char
//! - cell
//! - struct
//!
//! Sparse, object and function-handle variables are rejected with
//! [`MatFileError::UnsupportedClass`]. HDF5-based v7.3 files are rejected
//! with [`MatFileError::UnsupportedVersion`].
//!
//! ## Usage
//! ```no_run
//! use mesoconnect_matfile::load_mat_file;
//!
//! let mat = load_mat_file("allen_normalized_projs.mat")?;
//! let connections = mat.require("connections")?.expect_numeric("connections")?.to_array2()?;
//! println!("{} x {}", connections.nrows(), connections.ncols());
//! # Ok::<(), mesoconnect_matfile::MatFileError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use std::path::Path;
use thiserror::Error;
use tracing::info;

mod array;
mod data_type;
mod header;
mod reader;
mod writer;

pub use array::*;
pub use data_type::*;
pub use header::{Endianness, MatHeader};
pub use writer::MatFileWriter;

/// MAT-file errors
#[derive(Error, Debug)]
pub enum MatFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid MAT-file header: {0}")]
    InvalidHeader(String),

    #[error("Unsupported MAT-file version 0x{0:04x} (only Level 5 files are supported)")]
    UnsupportedVersion(u16),

    #[error("Truncated data element at offset {offset}: needs {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unexpected data element type {found} for {context}")]
    UnexpectedElement { context: &'static str, found: u32 },

    #[error("Unsupported array class: {0}")]
    UnsupportedClass(String),

    #[error("Decompression failed: {0}")]
    Decompression(String),

    #[error("Malformed MAT-file: {0}")]
    Malformed(String),

    #[error("Variable '{0}' not found")]
    MissingVariable(String),

    #[error("Variable '{variable}' has class {found}, expected {expected}")]
    TypeMismatch {
        variable: String,
        expected: &'static str,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, MatFileError>;

/// A named top-level variable
#[derive(Debug, Clone, PartialEq)]
pub struct MatVariable {
    pub name: String,
    pub array: MatArray,
}

/// Contents of a MAT-file, variables in file order
#[derive(Debug, Clone)]
pub struct MatFile {
    pub header: MatHeader,
    pub variables: Vec<MatVariable>,
}

impl MatFile {
    pub fn get(&self, name: &str) -> Option<&MatArray> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| &v.array)
    }

    /// Like [`MatFile::get`], but a missing variable is an error
    pub fn require(&self, name: &str) -> Result<&MatArray> {
        self.get(name)
            .ok_or_else(|| MatFileError::MissingVariable(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }
}

/// Parse a MAT-file already held in memory
pub fn read_mat_bytes(bytes: &[u8]) -> Result<MatFile> {
    reader::parse_mat_file(bytes)
}

/// Load a MAT-file from disk
pub fn load_mat_file<P: AsRef<Path>>(path: P) -> Result<MatFile> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let file = read_mat_bytes(&bytes)?;
    info!(
        "Loaded {} ({} variables: {})",
        path.display(),
        file.variables.len(),
        file.names().join(", ")
    );
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_missing_variable() {
        let mut writer = MatFileWriter::new();
        writer.add("input", MatArray::Cell(CellArray::column_of_strings(&["MOp"])));
        let file = read_mat_bytes(&writer.to_bytes().unwrap()).unwrap();

        assert!(file.get("input").is_some());
        assert!(matches!(
            file.require("outputs"),
            Err(MatFileError::MissingVariable(ref n)) if n == "outputs"
        ));
    }

    #[test]
    fn test_header_only_file_has_no_variables() {
        let bytes = MatHeader::new("MATLAB 5.0 MAT-file", Endianness::Little).encode();
        let file = read_mat_bytes(&bytes).unwrap();
        assert!(file.variables.is_empty());
        assert_eq!(file.header.text, "MATLAB 5.0 MAT-file");
    }

    #[test]
    fn test_not_a_mat_file() {
        assert!(matches!(
            read_mat_bytes(b"hello"),
            Err(MatFileError::InvalidHeader(_))
        ));
    }
}
