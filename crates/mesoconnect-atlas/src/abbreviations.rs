// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Region abbreviation table

use ahash::AHashMap;
use mesoconnect_matfile::CellArray;

use crate::dataset::cell_text;
use crate::{AtlasError, Result};

/// Abbreviations and full names paired by position
///
/// When an abbreviation (or name) occurs more than once, lookups resolve to
/// its first occurrence.
#[derive(Debug, Clone)]
pub struct AbbreviationTable {
    abbrevs: Vec<String>,
    names: Vec<String>,
    by_abbrev: AHashMap<String, usize>,
    by_name: AHashMap<String, usize>,
}

impl AbbreviationTable {
    /// # Errors
    ///
    /// `InvalidTable` if the two sequences differ in length
    pub fn new(abbrevs: Vec<String>, names: Vec<String>) -> Result<Self> {
        if abbrevs.len() != names.len() {
            return Err(AtlasError::InvalidTable(format!(
                "{} abbreviations but {} names",
                abbrevs.len(),
                names.len()
            )));
        }

        let mut by_abbrev = AHashMap::with_capacity(abbrevs.len());
        let mut by_name = AHashMap::with_capacity(names.len());
        for (i, (abbrev, name)) in abbrevs.iter().zip(&names).enumerate() {
            by_abbrev.entry(abbrev.clone()).or_insert(i);
            by_name.entry(name.clone()).or_insert(i);
        }

        Ok(Self {
            abbrevs,
            names,
            by_abbrev,
            by_name,
        })
    }

    /// Build from an N×≥2 cell array: abbreviations in column 0, names in column 1
    pub fn from_cell(cell: &CellArray, variable: &str) -> Result<Self> {
        let columns = match cell.dims.as_slice() {
            [_, cols] if *cols >= 2 => cell.column(0).zip(cell.column(1)),
            dims => {
                return Err(AtlasError::InvalidTable(format!(
                    "'{}' must be an N x 2 cell array, found dimensions {:?}",
                    variable, dims
                )))
            }
        };
        let (abbrev_cells, name_cells) = columns.ok_or_else(|| {
            AtlasError::InvalidTable(format!("'{}' is missing a column", variable))
        })?;

        let abbrevs = abbrev_cells
            .into_iter()
            .map(|a| cell_text(a, variable))
            .collect::<Result<Vec<_>>>()?;
        let names = name_cells
            .into_iter()
            .map(|a| cell_text(a, variable))
            .collect::<Result<Vec<_>>>()?;

        Self::new(abbrevs, names)
    }

    pub fn len(&self) -> usize {
        self.abbrevs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abbrevs.is_empty()
    }

    /// Full name for an abbreviation
    pub fn full_name(&self, abbrev: &str) -> Result<&str> {
        self.by_abbrev
            .get(abbrev)
            .map(|&i| self.names[i].as_str())
            .ok_or_else(|| AtlasError::AbbreviationNotFound(abbrev.to_string()))
    }

    /// Abbreviation for a full name
    pub fn abbrev_for_name(&self, name: &str) -> Result<&str> {
        self.by_name
            .get(name)
            .map(|&i| self.abbrevs[i].as_str())
            .ok_or_else(|| AtlasError::NameNotFound(name.to_string()))
    }

    /// Translate a sequence of abbreviations; the first unresolved one is an error
    pub fn names_from_abbrevs<I, S>(&self, abbrevs: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        abbrevs
            .into_iter()
            .map(|a| self.full_name(a.as_ref()).map(str::to_string))
            .collect()
    }

    /// `(abbreviation, full name)` pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.abbrevs
            .iter()
            .zip(&self.names)
            .map(|(a, n)| (a.as_str(), n.as_str()))
    }
}
