// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Loading the abbreviation table and connectivity matrix from MAT-files

use mesoconnect_config::DataConfig;
use mesoconnect_matfile::{load_mat_file, MatArray, MatFile};
use tracing::info;

use crate::{AbbreviationTable, AtlasError, ConnectivityMatrix, Result};

/// Text of one cell, reduced to ASCII; an empty `[]` reads as ""
pub(crate) fn cell_text(array: &MatArray, variable: &str) -> Result<String> {
    if matches!(array, MatArray::Numeric(_)) && array.is_empty() {
        return Ok(String::new());
    }
    let text = array
        .expect_char(variable)?
        .as_string()
        .ok_or_else(|| {
            AtlasError::InvalidTable(format!(
                "'{}' holds a multi-row char array {:?}",
                variable,
                array.dims()
            ))
        })?;
    Ok(text.chars().filter(char::is_ascii).collect())
}

/// Region labels from a cell vector (either orientation), in element order
pub fn labels_from_cell(array: &MatArray, variable: &str) -> Result<Vec<String>> {
    let cell = array.expect_cell(variable)?;
    if cell.dims.iter().filter(|&&d| d > 1).count() > 1 {
        return Err(AtlasError::InvalidTable(format!(
            "'{}' must be a cell vector, found dimensions {:?}",
            variable, cell.dims
        )));
    }
    cell.iter().map(|a| cell_text(a, variable)).collect()
}

/// Abbreviation table and connectivity matrix, read-only after load
#[derive(Debug, Clone)]
pub struct AtlasDataset {
    pub abbreviations: AbbreviationTable,
    pub connectivity: ConnectivityMatrix,
}

impl AtlasDataset {
    /// Load the files named by `config`
    ///
    /// The connectivity file is `config.regional_file` when
    /// `use_regional_matrix` is set, `config.injection_file` otherwise.
    pub fn load(config: &DataConfig) -> Result<Self> {
        let structures_path = config.structures_path();
        let connectivity_path = config.connectivity_path();
        info!(
            "Loading abbreviation table from {} and {} matrix from {}",
            structures_path.display(),
            if config.use_regional_matrix { "regional" } else { "injection" },
            connectivity_path.display()
        );

        let structures = load_mat_file(&structures_path)?;
        let connectivity = load_mat_file(&connectivity_path)?;
        Self::from_mat_files(&structures, &connectivity, config)
    }

    /// Build from already-parsed files, using the variable names in `config`
    pub fn from_mat_files(structures: &MatFile, connectivity: &MatFile, config: &DataConfig) -> Result<Self> {
        let table_cell = structures
            .require(&config.structures_var)?
            .expect_cell(&config.structures_var)?;
        let abbreviations = AbbreviationTable::from_cell(table_cell, &config.structures_var)?;

        let connections = connectivity
            .require(&config.connections_var)?
            .expect_numeric(&config.connections_var)?
            .to_array2()?;
        let inputs = labels_from_cell(connectivity.require(&config.inputs_var)?, &config.inputs_var)?;
        let outputs = labels_from_cell(connectivity.require(&config.outputs_var)?, &config.outputs_var)?;
        let connectivity = ConnectivityMatrix::new(connections, inputs, outputs)?;

        info!(
            "Atlas ready: {} named regions, {} inputs x {} outputs",
            abbreviations.len(),
            connectivity.inputs().len(),
            connectivity.outputs().len()
        );

        Ok(Self {
            abbreviations,
            connectivity,
        })
    }
}
