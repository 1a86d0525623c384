// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Connectivity matrix and per-region projection ranking

use std::cmp::Ordering;
use std::collections::BTreeSet;

use ndarray::{Array2, ArrayView1};
use tracing::debug;

use crate::{AtlasError, Result};

/// Which side of a region the ranked projections are on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionDirection {
    /// Projections into the region (a column of the matrix)
    Inputs,
    /// Projections out of the region (a row of the matrix)
    Outputs,
}

impl ProjectionDirection {
    pub fn from_print_inputs(print_inputs: bool) -> Self {
        if print_inputs {
            ProjectionDirection::Inputs
        } else {
            ProjectionDirection::Outputs
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectionDirection::Inputs => "INPUTS:",
            ProjectionDirection::Outputs => "OUTPUTS:",
        }
    }
}

/// One ranked connection
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Abbreviation of the region at the other end
    pub region: String,
    pub strength: f64,
}

/// Projections of one injection site, strongest first
#[derive(Debug, Clone, PartialEq)]
pub struct RankedList {
    /// Row (outputs) or column (inputs) of the matrix this list came from
    pub site: usize,
    pub projections: Vec<Projection>,
}

impl RankedList {
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.projections.iter().map(|p| p.region.as_str())
    }

    pub fn strengths(&self) -> impl Iterator<Item = f64> + '_ {
        self.projections.iter().map(|p| p.strength)
    }
}

/// Ranked projections for every injection site matching a region
#[derive(Debug, Clone, PartialEq)]
pub struct RankedProjections {
    pub region: String,
    pub direction: ProjectionDirection,
    pub sites: Vec<RankedList>,
}

impl RankedProjections {
    /// Length of the longest site list
    pub fn depth(&self) -> usize {
        self.sites
            .iter()
            .map(|s| s.projections.len())
            .max()
            .unwrap_or(0)
    }
}

/// Both sides of a region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionConnections {
    pub outputs: RankedProjections,
    pub inputs: RankedProjections,
}

impl RegionConnections {
    pub fn get(&self, direction: ProjectionDirection) -> &RankedProjections {
        match direction {
            ProjectionDirection::Inputs => &self.inputs,
            ProjectionDirection::Outputs => &self.outputs,
        }
    }
}

/// Positions of every entry in `list` exactly equal to `query`
pub fn find_string_in_list<S: AsRef<str>>(query: &str, list: &[S]) -> Vec<usize> {
    list.iter()
        .enumerate()
        .filter(|(_, entry)| entry.as_ref() == query)
        .map(|(i, _)| i)
        .collect()
}

/// Descending order; NaN ranks above every number and ties keep index order
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Indices of `values` sorted by value, strongest first
pub fn rank_descending(values: ArrayView1<'_, f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| descending(values[a], values[b]));
    order
}

/// Projection strengths with labelled axes
///
/// Rows are indexed by the input-region list and columns by the
/// output-region list. Both lists may repeat a region when it has several
/// injection sites.
#[derive(Debug, Clone)]
pub struct ConnectivityMatrix {
    connections: Array2<f64>,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl ConnectivityMatrix {
    /// # Errors
    ///
    /// `ShapeMismatch` unless rows equal `inputs.len()` and columns equal
    /// `outputs.len()`
    pub fn new(connections: Array2<f64>, inputs: Vec<String>, outputs: Vec<String>) -> Result<Self> {
        let (rows, cols) = connections.dim();
        if rows != inputs.len() || cols != outputs.len() {
            return Err(AtlasError::ShapeMismatch {
                rows,
                cols,
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }
        Ok(Self {
            connections,
            inputs,
            outputs,
        })
    }

    pub fn connections(&self) -> &Array2<f64> {
        &self.connections
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Rows whose input label is `region`
    pub fn input_indices(&self, region: &str) -> Result<Vec<usize>> {
        non_empty(find_string_in_list(region, &self.inputs), region)
    }

    /// Columns whose output label is `region`
    pub fn output_indices(&self, region: &str) -> Result<Vec<usize>> {
        non_empty(find_string_in_list(region, &self.outputs), region)
    }

    /// Targets of `region`, one ranked list per matching row
    pub fn region_outputs(&self, region: &str) -> Result<RankedProjections> {
        let rows = self.input_indices(region)?;
        let sites = rows
            .into_iter()
            .map(|row| rank_site(row, self.connections.row(row), &self.outputs))
            .collect();
        debug!("Ranked outputs of {}", region);
        Ok(RankedProjections {
            region: region.to_string(),
            direction: ProjectionDirection::Outputs,
            sites,
        })
    }

    /// Sources of `region`, one ranked list per matching column
    pub fn region_inputs(&self, region: &str) -> Result<RankedProjections> {
        let cols = self.output_indices(region)?;
        let sites = cols
            .into_iter()
            .map(|col| rank_site(col, self.connections.column(col), &self.inputs))
            .collect();
        debug!("Ranked inputs of {}", region);
        Ok(RankedProjections {
            region: region.to_string(),
            direction: ProjectionDirection::Inputs,
            sites,
        })
    }

    /// One direction only; the region need not appear on the other axis
    pub fn ranked(&self, region: &str, direction: ProjectionDirection) -> Result<RankedProjections> {
        match direction {
            ProjectionDirection::Inputs => self.region_inputs(region),
            ProjectionDirection::Outputs => self.region_outputs(region),
        }
    }

    /// Outputs and inputs of `region`
    ///
    /// # Errors
    ///
    /// `RegionNotFound` unless `region` is both an input and an output label
    pub fn region_connections(&self, region: &str) -> Result<RegionConnections> {
        Ok(RegionConnections {
            outputs: self.region_outputs(region)?,
            inputs: self.region_inputs(region)?,
        })
    }

    /// Regions present on both axes, sorted and de-duplicated
    pub fn shared_regions(&self) -> Vec<&str> {
        let inputs: BTreeSet<&str> = self.inputs.iter().map(String::as_str).collect();
        let outputs: BTreeSet<&str> = self.outputs.iter().map(String::as_str).collect();
        inputs.intersection(&outputs).copied().collect()
    }
}

fn non_empty(indices: Vec<usize>, region: &str) -> Result<Vec<usize>> {
    if indices.is_empty() {
        Err(AtlasError::RegionNotFound(region.to_string()))
    } else {
        Ok(indices)
    }
}

fn rank_site(site: usize, strengths: ArrayView1<'_, f64>, labels: &[String]) -> RankedList {
    let projections = rank_descending(strengths)
        .into_iter()
        .map(|k| Projection {
            region: labels[k].clone(),
            strength: strengths[k],
        })
        .collect();
    RankedList { site, projections }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_row_ranking_example() {
        let m = ConnectivityMatrix::new(array![[0.1, 0.9, 0.4]], labels(&["X"]), labels(&["A", "B", "C"]))
            .unwrap();
        let ranked = m.region_outputs("X").unwrap();
        assert_eq!(ranked.sites.len(), 1);
        let site = &ranked.sites[0];
        assert_eq!(site.regions().collect::<Vec<_>>(), vec!["B", "C", "A"]);
        assert_eq!(site.strengths().collect::<Vec<_>>(), vec![0.9, 0.4, 0.1]);
    }

    #[test]
    fn test_column_ranking() {
        let m = ConnectivityMatrix::new(
            array![[0.2, 0.0], [0.7, 0.3], [0.5, 0.1]],
            labels(&["P", "Q", "R"]),
            labels(&["A", "B"]),
        )
        .unwrap();
        let ranked = m.region_inputs("A").unwrap();
        assert_eq!(ranked.direction, ProjectionDirection::Inputs);
        assert_eq!(ranked.sites[0].regions().collect::<Vec<_>>(), vec!["Q", "R", "P"]);
    }

    #[test]
    fn test_multiple_injection_sites() {
        let m = ConnectivityMatrix::new(
            array![[1.0, 2.0], [4.0, 3.0], [9.0, 9.0]],
            labels(&["VISp", "MOp", "VISp"]),
            labels(&["A", "B"]),
        )
        .unwrap();
        let ranked = m.region_outputs("VISp").unwrap();
        assert_eq!(ranked.sites.iter().map(|s| s.site).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(ranked.sites[0].regions().collect::<Vec<_>>(), vec!["B", "A"]);
        // Ties keep label order
        assert_eq!(ranked.sites[1].regions().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_region_not_found() {
        let m = ConnectivityMatrix::new(array![[1.0]], labels(&["A"]), labels(&["B"])).unwrap();
        assert!(matches!(m.region_outputs("B"), Err(AtlasError::RegionNotFound(ref r)) if r == "B"));
        assert!(matches!(m.region_inputs("A"), Err(AtlasError::RegionNotFound(_))));
        assert!(m.region_inputs("B").is_ok());
    }

    #[test]
    fn test_region_connections_need_both_axes() {
        let m = ConnectivityMatrix::new(array![[0.1, 0.9]], labels(&["X"]), labels(&["A", "B"])).unwrap();
        assert!(m.ranked("X", ProjectionDirection::Outputs).is_ok());
        assert!(matches!(
            m.region_connections("X"),
            Err(AtlasError::RegionNotFound(ref r)) if r == "X"
        ));

        let m = ConnectivityMatrix::new(
            array![[0.2, 0.7], [0.4, 0.1]],
            labels(&["X", "A"]),
            labels(&["A", "X"]),
        )
        .unwrap();
        let both = m.region_connections("X").unwrap();
        assert_eq!(both.get(ProjectionDirection::Outputs).sites[0].regions().collect::<Vec<_>>(), vec!["X", "A"]);
        assert_eq!(both.get(ProjectionDirection::Inputs).sites[0].regions().collect::<Vec<_>>(), vec!["X", "A"]);
    }

    #[test]
    fn test_shape_mismatch() {
        let result = ConnectivityMatrix::new(array![[1.0, 2.0]], labels(&["A"]), labels(&["B"]));
        assert!(matches!(
            result,
            Err(AtlasError::ShapeMismatch { rows: 1, cols: 2, inputs: 1, outputs: 1 })
        ));
    }

    #[test]
    fn test_nan_ranks_first() {
        let values = array![0.3, f64::NAN, 0.8, 0.0];
        assert_eq!(rank_descending(values.view()), vec![1, 2, 0, 3]);
        assert_eq!(rank_descending(array![0.3, f64::NAN, 0.8].view()), vec![1, 2, 0]);
    }

    #[test]
    fn test_exact_match_only() {
        let list = ["RSPd", "RSPv", "RSPd ", "rspd", "RSPd"];
        assert_eq!(find_string_in_list("RSPd", &list), vec![0, 4]);
        assert!(find_string_in_list("RSP", &list).is_empty());
    }

    #[test]
    fn test_shared_regions() {
        let m = ConnectivityMatrix::new(
            ndarray::Array2::zeros((3, 3)),
            labels(&["VISp", "MOp", "VISp"]),
            labels(&["SSp", "VISp", "MOp"]),
        )
        .unwrap();
        assert_eq!(m.shared_regions(), vec!["MOp", "VISp"]);
    }
}
