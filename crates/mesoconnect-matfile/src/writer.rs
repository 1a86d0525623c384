// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Minimal Level 5 writer
//!
//! Numeric arrays are always stored as `miDOUBLE` and char arrays as
//! `miUINT16`. Struct field-name lengths and short names use the small data
//! element format, the way MATLAB itself writes them.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::array::{MatArray, NumericArray};
use crate::header::{Endianness, MatHeader};
use crate::{DataType, MatFileError, Result};

const DEFAULT_HEADER_TEXT: &str = "MATLAB 5.0 MAT-file, Platform: rust, Created by: mesoconnect";
const FIELD_NAME_LEN: usize = 32;

/// Builds a MAT-file from named arrays
///
/// # Example
/// ```
/// use mesoconnect_matfile::{CellArray, MatArray, MatFileWriter, NumericArray};
///
/// let mut writer = MatFileWriter::new().compressed(true);
/// writer.add("connections", MatArray::Numeric(NumericArray::from_rows(&[vec![0.1, 0.9]])));
/// writer.add("outputs", MatArray::Cell(CellArray::row_of_strings(&["A", "B"])));
///
/// let bytes = writer.to_bytes().unwrap();
/// let file = mesoconnect_matfile::read_mat_bytes(&bytes).unwrap();
/// assert_eq!(file.names(), vec!["connections", "outputs"]);
/// ```
#[derive(Debug, Clone)]
pub struct MatFileWriter {
    endianness: Endianness,
    compress: bool,
    header_text: String,
    variables: Vec<(String, MatArray)>,
}

impl Default for MatFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MatFileWriter {
    pub fn new() -> Self {
        Self {
            endianness: Endianness::Little,
            compress: false,
            header_text: DEFAULT_HEADER_TEXT.to_string(),
            variables: Vec::new(),
        }
    }

    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Store each variable as a zlib-compressed element
    pub fn compressed(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn header_text(mut self, text: impl Into<String>) -> Self {
        self.header_text = text.into();
        self
    }

    pub fn add(&mut self, name: impl Into<String>, array: MatArray) -> &mut Self {
        self.variables.push((name.into(), array));
        self
    }

    /// Encode the whole file
    ///
    /// # Errors
    ///
    /// `UnsupportedClass` for struct arrays with field names longer than 31
    /// bytes, `Io` if compression fails
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let e = self.endianness;
        let mut out = MatHeader::new(self.header_text.clone(), e).encode();

        for (name, array) in &self.variables {
            let mut element = Vec::new();
            encode_matrix(&mut element, e, name, array)?;

            if self.compress {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&element)?;
                let compressed = encoder.finish()?;
                e.put_u32(&mut out, DataType::Compressed.code());
                e.put_u32(&mut out, compressed.len() as u32);
                out.extend_from_slice(&compressed);
            } else {
                out.extend_from_slice(&element);
            }
        }

        Ok(out)
    }

    /// Write the file to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        let mut file = BufWriter::new(File::create(path)?);
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    }
}

fn pad8(out: &mut Vec<u8>) {
    while out.len() % 8 != 0 {
        out.push(0);
    }
}

/// Append a data element, using the small format when it fits
fn put_element(out: &mut Vec<u8>, e: Endianness, data_type: DataType, data: &[u8], allow_small: bool) {
    if allow_small && data.len() <= 4 && !data.is_empty() {
        e.put_u32(out, ((data.len() as u32) << 16) | data_type.code());
        let start = out.len();
        out.extend_from_slice(data);
        out.resize(start + 4, 0);
        return;
    }
    e.put_u32(out, data_type.code());
    e.put_u32(out, data.len() as u32);
    out.extend_from_slice(data);
    pad8(out);
}

fn encode_matrix(out: &mut Vec<u8>, e: Endianness, name: &str, array: &MatArray) -> Result<()> {
    let mut body = Vec::new();

    let mut flags_word = array.class().code() as u32;
    if let MatArray::Numeric(NumericArray { imag: Some(_), .. }) = array {
        flags_word |= 0x0800;
    }
    if let MatArray::Numeric(NumericArray { logical: true, .. }) = array {
        flags_word |= 0x0200;
    }
    let mut flags = Vec::new();
    e.put_u32(&mut flags, flags_word);
    e.put_u32(&mut flags, 0);
    put_element(&mut body, e, DataType::UInt32, &flags, false);

    let mut dims = Vec::new();
    for &d in array.dims() {
        let d = i32::try_from(d)
            .map_err(|_| MatFileError::Malformed(format!("dimension {} too large", d)))?;
        e.put_i32(&mut dims, d);
    }
    put_element(&mut body, e, DataType::Int32, &dims, false);

    put_element(&mut body, e, DataType::Int8, name.as_bytes(), true);

    match array {
        MatArray::Numeric(a) => {
            put_doubles(&mut body, e, &a.real);
            if let Some(imag) = &a.imag {
                put_doubles(&mut body, e, imag);
            }
        }
        MatArray::Char(a) => {
            let mut data = Vec::with_capacity(a.chars.len() * 2);
            for &c in &a.chars {
                let unit = u16::try_from(c as u32).map_err(|_| {
                    MatFileError::Malformed(format!("character {:?} does not fit in UTF-16 unit", c))
                })?;
                e.put_u16(&mut data, unit);
            }
            put_element(&mut body, e, DataType::UInt16, &data, true);
        }
        MatArray::Cell(a) => {
            for cell in &a.cells {
                encode_matrix(&mut body, e, "", cell)?;
            }
        }
        MatArray::Struct(a) => {
            let mut len = Vec::new();
            e.put_i32(&mut len, FIELD_NAME_LEN as i32);
            put_element(&mut body, e, DataType::Int32, &len, true);

            let mut names = Vec::with_capacity(a.field_names.len() * FIELD_NAME_LEN);
            for field in &a.field_names {
                if field.len() >= FIELD_NAME_LEN {
                    return Err(MatFileError::UnsupportedClass(format!(
                        "struct field name '{}' longer than {} bytes",
                        field,
                        FIELD_NAME_LEN - 1
                    )));
                }
                let start = names.len();
                names.extend_from_slice(field.as_bytes());
                names.resize(start + FIELD_NAME_LEN, 0);
            }
            put_element(&mut body, e, DataType::Int8, &names, false);

            for element in &a.elements {
                for value in element {
                    encode_matrix(&mut body, e, "", value)?;
                }
            }
        }
    }

    e.put_u32(out, DataType::Matrix.code());
    e.put_u32(out, body.len() as u32);
    out.extend_from_slice(&body);
    Ok(())
}

fn put_doubles(out: &mut Vec<u8>, e: Endianness, values: &[f64]) {
    let mut data = Vec::with_capacity(values.len() * 8);
    for &v in values {
        e.put_f64(&mut data, v);
    }
    put_element(out, e, DataType::Double, &data, false);
}
