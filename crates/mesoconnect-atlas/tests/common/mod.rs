// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities: small atlas fixtures written as MAT-files

use std::path::Path;

use mesoconnect_config::DataConfig;
use mesoconnect_matfile::{CellArray, CharArray, MatArray, MatFileWriter, NumericArray};
use tempfile::TempDir;

pub const ABBREVS: &[&str] = &["X", "A", "B", "C", "VISp"];
pub const NAMES: &[&str] = &["Region X", "Alpha", "Beta", "Gamma", "Primary visual area"];

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// N x 2 structures table: abbreviations then names
pub fn structures_cell(abbrevs: &[&str], names: &[&str]) -> MatArray {
    let cells = abbrevs
        .iter()
        .chain(names)
        .map(|s| MatArray::Char(CharArray::from_text(s)))
        .collect();
    MatArray::Cell(CellArray {
        dims: vec![abbrevs.len(), 2],
        cells,
    })
}

/// Write the structures file and one connectivity file into `dir`
pub fn write_atlas(
    dir: &Path,
    connectivity_file: &str,
    rows: &[Vec<f64>],
    inputs: &[&str],
    outputs: &[&str],
    compressed: bool,
) {
    let config = DataConfig::default();

    let mut structures = MatFileWriter::new().compressed(compressed);
    structures.add("structures", structures_cell(ABBREVS, NAMES));
    structures
        .save(dir.join(&config.structures_file))
        .expect("Failed to write structures file");

    let mut connectivity = MatFileWriter::new().compressed(compressed);
    connectivity
        .add("connections", MatArray::Numeric(NumericArray::from_rows(rows)))
        .add("input", MatArray::Cell(CellArray::column_of_strings(inputs)))
        .add("outputs", MatArray::Cell(CellArray::row_of_strings(outputs)));
    connectivity
        .save(dir.join(connectivity_file))
        .expect("Failed to write connectivity file");
}

/// Default data config pointed at `dir`
pub fn data_config(dir: &Path) -> DataConfig {
    DataConfig {
        dir: dir.to_path_buf(),
        ..DataConfig::default()
    }
}
