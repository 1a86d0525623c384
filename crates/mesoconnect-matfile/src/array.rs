// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-memory representation of MAT-file arrays
//!
//! All arrays keep MATLAB's column-major element order. Two-dimensional
//! accessors take `(row, col)`.

use ndarray::{Array2, ShapeBuilder};

use crate::{ArrayClass, MatFileError, Result};

fn element_count(dims: &[usize]) -> usize {
    dims.iter().product()
}

fn column_major_index(dims: &[usize], row: usize, col: usize) -> Option<usize> {
    let (rows, cols) = match dims {
        [rows, cols] => (*rows, *cols),
        _ => return None,
    };
    (row < rows && col < cols).then(|| row + col * rows)
}

/// Any array the reader understands
#[derive(Debug, Clone, PartialEq)]
pub enum MatArray {
    Numeric(NumericArray),
    Char(CharArray),
    Cell(CellArray),
    Struct(StructArray),
}

impl MatArray {
    /// `[]`: what MATLAB stores for an empty cell element
    pub fn empty() -> Self {
        MatArray::Numeric(NumericArray::new(ArrayClass::Double, vec![0, 0], Vec::new()))
    }

    pub fn dims(&self) -> &[usize] {
        match self {
            MatArray::Numeric(a) => &a.dims,
            MatArray::Char(a) => &a.dims,
            MatArray::Cell(a) => &a.dims,
            MatArray::Struct(a) => &a.dims,
        }
    }

    /// Number of elements (product of the dimensions)
    pub fn len(&self) -> usize {
        element_count(self.dims())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn class(&self) -> ArrayClass {
        match self {
            MatArray::Numeric(a) => a.class,
            MatArray::Char(_) => ArrayClass::Char,
            MatArray::Cell(_) => ArrayClass::Cell,
            MatArray::Struct(_) => ArrayClass::Struct,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericArray> {
        match self {
            MatArray::Numeric(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<&CharArray> {
        match self {
            MatArray::Char(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<&CellArray> {
        match self {
            MatArray::Cell(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructArray> {
        match self {
            MatArray::Struct(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow as a given kind or fail with `TypeMismatch` naming `variable`
    pub fn expect_cell(&self, variable: &str) -> Result<&CellArray> {
        self.as_cell().ok_or_else(|| self.mismatch(variable, "cell"))
    }

    pub fn expect_numeric(&self, variable: &str) -> Result<&NumericArray> {
        self.as_numeric().ok_or_else(|| self.mismatch(variable, "numeric"))
    }

    pub fn expect_char(&self, variable: &str) -> Result<&CharArray> {
        self.as_char().ok_or_else(|| self.mismatch(variable, "char"))
    }

    fn mismatch(&self, variable: &str, expected: &'static str) -> MatFileError {
        MatFileError::TypeMismatch {
            variable: variable.to_string(),
            expected,
            found: self.class().name(),
        }
    }
}

/// Numeric (or logical) array; values are widened to `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub class: ArrayClass,
    pub dims: Vec<usize>,
    pub real: Vec<f64>,
    pub imag: Option<Vec<f64>>,
    pub logical: bool,
}

impl NumericArray {
    pub fn new(class: ArrayClass, dims: Vec<usize>, real: Vec<f64>) -> Self {
        Self {
            class,
            dims,
            real,
            imag: None,
            logical: false,
        }
    }

    /// Double matrix from row-major nested rows
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut real = Vec::with_capacity(n_rows * n_cols);
        for col in 0..n_cols {
            for row in rows {
                real.push(row.get(col).copied().unwrap_or(0.0));
            }
        }
        Self::new(ArrayClass::Double, vec![n_rows, n_cols], real)
    }

    pub fn is_complex(&self) -> bool {
        self.imag.is_some()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        column_major_index(&self.dims, row, col).map(|i| self.real[i])
    }

    /// Real part as a 2-D matrix
    ///
    /// # Errors
    ///
    /// `Malformed` if the array is not two-dimensional
    pub fn to_array2(&self) -> Result<Array2<f64>> {
        let (rows, cols) = match self.dims.as_slice() {
            [rows, cols] => (*rows, *cols),
            dims => {
                return Err(MatFileError::Malformed(format!(
                    "expected a 2-D matrix, found dimensions {:?}",
                    dims
                )))
            }
        };
        Array2::from_shape_vec((rows, cols).f(), self.real.clone())
            .map_err(|e| MatFileError::Malformed(e.to_string()))
    }
}

/// Character array
#[derive(Debug, Clone, PartialEq)]
pub struct CharArray {
    pub dims: Vec<usize>,
    pub chars: Vec<char>,
}

impl CharArray {
    /// 1×N char array holding `text`
    pub fn from_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self {
            dims: vec![1, chars.len()],
            chars,
        }
    }

    /// One string per row; char matrices keep their space padding
    pub fn rows(&self) -> Vec<String> {
        let (rows, cols) = match self.dims.as_slice() {
            [rows, cols] => (*rows, *cols),
            _ => return vec![self.chars.iter().collect()],
        };
        (0..rows)
            .map(|r| (0..cols).map(|c| self.chars[r + c * rows]).collect())
            .collect()
    }

    /// The text of a single-row (or empty) char array
    pub fn as_string(&self) -> Option<String> {
        match self.dims.as_slice() {
            [rows, _] if *rows <= 1 => Some(self.chars.iter().collect()),
            _ if self.chars.is_empty() => Some(String::new()),
            _ => None,
        }
    }
}

/// Cell array
#[derive(Debug, Clone, PartialEq)]
pub struct CellArray {
    pub dims: Vec<usize>,
    pub cells: Vec<MatArray>,
}

impl CellArray {
    /// Column vector of 1×N strings, as produced by `{'a'; 'b'}`
    pub fn column_of_strings<S: AsRef<str>>(items: &[S]) -> Self {
        Self {
            dims: vec![items.len(), 1],
            cells: items
                .iter()
                .map(|s| MatArray::Char(CharArray::from_text(s.as_ref())))
                .collect(),
        }
    }

    /// Row vector of 1×N strings, as produced by `{'a', 'b'}`
    pub fn row_of_strings<S: AsRef<str>>(items: &[S]) -> Self {
        let mut cell = Self::column_of_strings(items);
        cell.dims = vec![1, items.len()];
        cell
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&MatArray> {
        column_major_index(&self.dims, row, col).map(|i| &self.cells[i])
    }

    /// All cells of column `col` of a 2-D cell array, top to bottom
    pub fn column(&self, col: usize) -> Option<Vec<&MatArray>> {
        let rows = *self.dims.first()?;
        (0..rows).map(|row| self.get(row, col)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatArray> {
        self.cells.iter()
    }
}

/// Struct array; `elements[i][j]` is field `j` of element `i`
#[derive(Debug, Clone, PartialEq)]
pub struct StructArray {
    pub dims: Vec<usize>,
    pub field_names: Vec<String>,
    pub elements: Vec<Vec<MatArray>>,
}

impl StructArray {
    pub fn field(&self, element: usize, name: &str) -> Option<&MatArray> {
        let index = self.field_names.iter().position(|f| f == name)?;
        self.elements.get(element)?.get(index)
    }
}
