// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Level 5 data element parsing
//!
//! ```text
//! [Tag]   type: u32, byte count: u32        (8 bytes, data padded to 8)
//! [Small] byte count: u16 | type: u16, data (8 bytes total, count <= 4)
//! ```
//! `miCOMPRESSED` elements hold a zlib stream that inflates to a single
//! `miMATRIX` element and are not padded.

use std::io::Read;

use flate2::read::ZlibDecoder;
use tracing::{debug, trace};

use crate::array::{CellArray, CharArray, MatArray, NumericArray, StructArray};
use crate::header::{Endianness, MatHeader, HEADER_LEN};
use crate::{ArrayClass, DataType, MatFile, MatFileError, MatVariable, Result};

const FLAG_COMPLEX: u32 = 0x0800;
const FLAG_LOGICAL: u32 = 0x0200;

/// One data element, borrowed from the buffer it was read from
struct Element<'a> {
    type_code: u32,
    data: &'a [u8],
}

impl Element<'_> {
    fn data_type(&self) -> Result<DataType> {
        DataType::require(self.type_code)
    }

    fn expect(&self, expected: DataType, what: &'static str) -> Result<()> {
        if self.type_code == expected.code() {
            Ok(())
        } else {
            Err(MatFileError::UnexpectedElement {
                context: what,
                found: self.type_code,
            })
        }
    }
}

/// Sequential reader over a run of data elements
struct ElementReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    endian: Endianness,
}

impl<'a> ElementReader<'a> {
    fn new(bytes: &'a [u8], endian: Endianness) -> Self {
        Self {
            bytes,
            pos: 0,
            endian,
        }
    }

    /// True once fewer bytes than a tag remain
    fn at_end(&self) -> bool {
        self.remaining() < 8
    }

    fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Capacity for `count` nested elements, bounded by the bytes left
    fn capacity_for(&self, count: usize) -> usize {
        count.min(self.remaining() / 8)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let available = self.bytes.len() - self.pos;
        if len > available {
            return Err(MatFileError::Truncated {
                offset: self.pos,
                needed: len,
                available,
            });
        }
        let bytes = self.bytes;
        let slice = &bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn next_element(&mut self) -> Result<Element<'a>> {
        let first = self.endian.read_u32(self.take(4)?);

        let small_count = first >> 16;
        if small_count != 0 {
            if small_count > 4 {
                return Err(MatFileError::Malformed(format!(
                    "small data element claims {} bytes",
                    small_count
                )));
            }
            let packed = self.take(4)?;
            return Ok(Element {
                type_code: first & 0xFFFF,
                data: &packed[..small_count as usize],
            });
        }

        let type_code = first;
        let count = self.endian.read_u32(self.take(4)?) as usize;
        let data = self.take(count)?;

        if type_code != DataType::Compressed.code() {
            let padding = (8 - count % 8) % 8;
            // The final element of a buffer may omit its padding
            let padding = padding.min(self.bytes.len() - self.pos);
            self.pos += padding;
        }

        Ok(Element { type_code, data })
    }
}

/// Parse a complete MAT-file held in memory
pub(crate) fn parse_mat_file(bytes: &[u8]) -> Result<MatFile> {
    let header = MatHeader::parse(bytes)?;
    let endian = header.endianness;
    debug!(
        "MAT-file header: {:?}, {} bytes, {:?}",
        header.text,
        bytes.len(),
        endian
    );

    let mut reader = ElementReader::new(&bytes[HEADER_LEN..], endian);
    let mut variables = Vec::new();

    while !reader.at_end() {
        let element = reader.next_element()?;
        match DataType::from_code(element.type_code) {
            Some(DataType::Matrix) => {
                variables.push(parse_variable(element.data, endian)?);
            }
            Some(DataType::Compressed) => {
                let inflated = inflate(element.data)?;
                let mut inner = ElementReader::new(&inflated, endian);
                let matrix = inner.next_element()?;
                matrix.expect(DataType::Matrix, "compressed variable")?;
                variables.push(parse_variable(matrix.data, endian)?);
            }
            _ => {
                debug!(
                    "Skipping top-level element of type {} ({} bytes)",
                    element.type_code,
                    element.data.len()
                );
            }
        }
    }

    Ok(MatFile { header, variables })
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| MatFileError::Decompression(e.to_string()))?;
    trace!("Inflated {} bytes to {}", data.len(), out.len());
    Ok(out)
}

fn parse_variable(data: &[u8], endian: Endianness) -> Result<MatVariable> {
    let (name, array) = parse_matrix(data, endian)?;
    debug!(
        "Variable '{}': {} {:?}",
        name,
        array.class().name(),
        array.dims()
    );
    Ok(MatVariable { name, array })
}

/// Parse the payload of an `miMATRIX` element into its name and array
fn parse_matrix(data: &[u8], endian: Endianness) -> Result<(String, MatArray)> {
    if data.is_empty() {
        return Ok((String::new(), MatArray::empty()));
    }

    let mut reader = ElementReader::new(data, endian);

    let flags_el = reader.next_element()?;
    flags_el.expect(DataType::UInt32, "array flags")?;
    if flags_el.data.len() < 4 {
        return Err(MatFileError::Malformed("array flags shorter than 4 bytes".into()));
    }
    let flags = endian.read_u32(&flags_el.data[..4]);
    let class_code = (flags & 0xFF) as u8;
    let class = ArrayClass::from_code(class_code)
        .ok_or_else(|| MatFileError::UnsupportedClass(format!("class code {}", class_code)))?;

    let dims_el = reader.next_element()?;
    dims_el.expect(DataType::Int32, "dimensions")?;
    let dims = dims_el
        .data
        .chunks_exact(4)
        .map(|c| usize::try_from(endian.read_i32(c)))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| MatFileError::Malformed("negative dimension".into()))?;
    let count = dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| MatFileError::Malformed(format!("dimensions {:?} overflow the element count", dims)))?;

    let name_el = reader.next_element()?;
    name_el.expect(DataType::Int8, "array name")?;
    let name = String::from_utf8_lossy(name_el.data).into_owned();

    let array = match class {
        ArrayClass::Cell => {
            let mut cells = Vec::with_capacity(reader.capacity_for(count));
            for _ in 0..count {
                let cell = reader.next_element()?;
                cell.expect(DataType::Matrix, "cell element")?;
                cells.push(parse_matrix(cell.data, endian)?.1);
            }
            MatArray::Cell(CellArray { dims, cells })
        }
        ArrayClass::Struct => MatArray::Struct(parse_struct(&mut reader, dims, count)?),
        ArrayClass::Char => {
            let el = reader.next_element()?;
            let chars = decode_chars(&el, endian)?;
            if chars.len() != count {
                return Err(MatFileError::Malformed(format!(
                    "char array '{}' has {} characters for dimensions {:?}",
                    name,
                    chars.len(),
                    dims
                )));
            }
            MatArray::Char(CharArray { dims, chars })
        }
        class if class.is_numeric() => {
            let real = decode_numbers(&reader.next_element()?, endian)?;
            let imag = if flags & FLAG_COMPLEX != 0 {
                Some(decode_numbers(&reader.next_element()?, endian)?)
            } else {
                None
            };
            if real.len() != count || imag.as_ref().is_some_and(|i| i.len() != count) {
                return Err(MatFileError::Malformed(format!(
                    "numeric array '{}' has {} values for dimensions {:?}",
                    name,
                    real.len(),
                    dims
                )));
            }
            MatArray::Numeric(NumericArray {
                class,
                dims,
                real,
                imag,
                logical: flags & FLAG_LOGICAL != 0,
            })
        }
        other => return Err(MatFileError::UnsupportedClass(other.name().to_string())),
    };

    Ok((name, array))
}

fn parse_struct(reader: &mut ElementReader<'_>, dims: Vec<usize>, count: usize) -> Result<StructArray> {
    let endian = reader.endian;

    let len_el = reader.next_element()?;
    len_el.expect(DataType::Int32, "field name length")?;
    if len_el.data.len() < 4 {
        return Err(MatFileError::Malformed("field name length shorter than 4 bytes".into()));
    }
    let name_len = endian.read_i32(&len_el.data[..4]);
    let name_len = usize::try_from(name_len)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| MatFileError::Malformed(format!("field name length {}", name_len)))?;

    let names_el = reader.next_element()?;
    names_el.expect(DataType::Int8, "field names")?;
    let field_names: Vec<String> = names_el
        .data
        .chunks(name_len)
        .map(|chunk| {
            let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
            String::from_utf8_lossy(&chunk[..end]).into_owned()
        })
        .collect();

    let mut elements = Vec::with_capacity(reader.capacity_for(count));
    for _ in 0..count {
        let mut values = Vec::with_capacity(field_names.len());
        for _ in &field_names {
            let el = reader.next_element()?;
            el.expect(DataType::Matrix, "struct field")?;
            values.push(parse_matrix(el.data, endian)?.1);
        }
        elements.push(values);
    }

    Ok(StructArray {
        dims,
        field_names,
        elements,
    })
}

fn decode_numbers(el: &Element<'_>, endian: Endianness) -> Result<Vec<f64>> {
    let data_type = el.data_type()?;
    let size = data_type.element_size().ok_or(MatFileError::UnexpectedElement {
        context: "numeric data",
        found: el.type_code,
    })?;
    if el.data.len() % size != 0 {
        return Err(MatFileError::Malformed(format!(
            "{} bytes is not a whole number of {:?} values",
            el.data.len(),
            data_type
        )));
    }

    let chunks = el.data.chunks_exact(size);
    let values: Vec<f64> = match data_type {
        DataType::Int8 => chunks.map(|c| c[0] as i8 as f64).collect(),
        DataType::UInt8 | DataType::Utf8 => chunks.map(|c| c[0] as f64).collect(),
        DataType::Int16 => chunks.map(|c| endian.read_i16(c) as f64).collect(),
        DataType::UInt16 | DataType::Utf16 => chunks.map(|c| endian.read_u16(c) as f64).collect(),
        DataType::Int32 => chunks.map(|c| endian.read_i32(c) as f64).collect(),
        DataType::UInt32 | DataType::Utf32 => chunks.map(|c| endian.read_u32(c) as f64).collect(),
        DataType::Single => chunks.map(|c| endian.read_f32(c) as f64).collect(),
        DataType::Double => chunks.map(|c| endian.read_f64(c)).collect(),
        DataType::Int64 => chunks.map(|c| endian.read_i64(c) as f64).collect(),
        DataType::UInt64 => chunks.map(|c| endian.read_u64(c) as f64).collect(),
        DataType::Matrix | DataType::Compressed => {
            return Err(MatFileError::UnexpectedElement {
                context: "numeric data",
                found: el.type_code,
            })
        }
    };
    Ok(values)
}

fn decode_chars(el: &Element<'_>, endian: Endianness) -> Result<Vec<char>> {
    let chars: Vec<char> = match el.data_type()? {
        DataType::Utf8 => String::from_utf8_lossy(el.data).chars().collect(),
        // Single-byte storage is Latin-1
        DataType::UInt8 | DataType::Int8 => el.data.iter().map(|&b| b as char).collect(),
        DataType::UInt16 | DataType::Utf16 => el
            .data
            .chunks_exact(2)
            .map(|c| char::from_u32(endian.read_u16(c) as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
        DataType::UInt32 | DataType::Utf32 => el
            .data
            .chunks_exact(4)
            .map(|c| char::from_u32(endian.read_u32(c)).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
        _ => {
            return Err(MatFileError::UnexpectedElement {
                context: "char data",
                found: el.type_code,
            })
        }
    };
    Ok(chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(endian: Endianness, data_type: DataType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        endian.put_u32(&mut out, data_type.code());
        endian.put_u32(&mut out, data.len() as u32);
        out.extend_from_slice(data);
        while out.len() % 8 != 0 {
            out.push(0);
        }
        out
    }

    #[test]
    fn test_small_element_little_endian() {
        // type miINT8, 3 bytes, packed "abc"
        let bytes = [0x01, 0x00, 0x03, 0x00, b'a', b'b', b'c', 0x00];
        let mut reader = ElementReader::new(&bytes, Endianness::Little);
        let el = reader.next_element().unwrap();
        assert_eq!(el.type_code, DataType::Int8.code());
        assert_eq!(el.data, b"abc");
        assert!(reader.at_end());
    }

    #[test]
    fn test_small_element_big_endian() {
        let bytes = [0x00, 0x03, 0x00, 0x01, b'a', b'b', b'c', 0x00];
        let mut reader = ElementReader::new(&bytes, Endianness::Big);
        let el = reader.next_element().unwrap();
        assert_eq!(el.type_code, DataType::Int8.code());
        assert_eq!(el.data, b"abc");
    }

    #[test]
    fn test_padding_skipped() {
        let mut bytes = tag(Endianness::Little, DataType::UInt8, &[1, 2, 3, 4, 5]);
        bytes.extend(tag(Endianness::Little, DataType::UInt8, &[9; 8]));
        let mut reader = ElementReader::new(&bytes, Endianness::Little);
        assert_eq!(reader.next_element().unwrap().data, &[1, 2, 3, 4, 5]);
        assert_eq!(reader.next_element().unwrap().data, &[9; 8]);
        assert!(reader.at_end());
    }

    #[test]
    fn test_truncated_element() {
        let mut bytes = Vec::new();
        Endianness::Little.put_u32(&mut bytes, DataType::Double.code());
        Endianness::Little.put_u32(&mut bytes, 64);
        bytes.extend_from_slice(&[0u8; 16]);
        let mut reader = ElementReader::new(&bytes, Endianness::Little);
        assert!(matches!(
            reader.next_element(),
            Err(MatFileError::Truncated { needed: 64, available: 16, .. })
        ));
    }

    #[test]
    fn test_decode_integer_storage_widens() {
        let mut data = Vec::new();
        Endianness::Big.put_u16(&mut data, 300);
        Endianness::Big.put_u16(&mut data, 7);
        let el = Element {
            type_code: DataType::UInt16.code(),
            data: &data,
        };
        assert_eq!(decode_numbers(&el, Endianness::Big).unwrap(), vec![300.0, 7.0]);

        let el = Element {
            type_code: DataType::Int8.code(),
            data: &[0xFF, 0x02],
        };
        assert_eq!(decode_numbers(&el, Endianness::Little).unwrap(), vec![-1.0, 2.0]);
    }

    #[test]
    fn test_empty_matrix_payload() {
        let (name, array) = parse_matrix(&[], Endianness::Little).unwrap();
        assert!(name.is_empty());
        assert!(array.is_empty());
    }

    fn cell_header(endian: Endianness, dims: &[i32]) -> Vec<u8> {
        let mut flags = Vec::new();
        endian.put_u32(&mut flags, ArrayClass::Cell.code() as u32);
        endian.put_u32(&mut flags, 0);
        let mut dim_bytes = Vec::new();
        for &d in dims {
            endian.put_i32(&mut dim_bytes, d);
        }

        let mut payload = tag(endian, DataType::UInt32, &flags);
        payload.extend(tag(endian, DataType::Int32, &dim_bytes));
        payload.extend(tag(endian, DataType::Int8, b"c"));
        payload
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        let endian = Endianness::Little;
        let payload = cell_header(endian, &[i32::MAX; 3]);
        assert!(matches!(
            parse_matrix(&payload, endian),
            Err(MatFileError::Malformed(_))
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_huge_cell_count_without_data_is_truncated() {
        let endian = Endianness::Little;
        let payload = cell_header(endian, &[i32::MAX, i32::MAX]);
        assert!(matches!(
            parse_matrix(&payload, endian),
            Err(MatFileError::Truncated { .. })
        ));
    }

    #[test]
    fn test_sparse_unsupported() {
        let endian = Endianness::Little;
        let mut flags = Vec::new();
        endian.put_u32(&mut flags, ArrayClass::Sparse.code() as u32);
        endian.put_u32(&mut flags, 0);
        let mut dims = Vec::new();
        endian.put_i32(&mut dims, 2);
        endian.put_i32(&mut dims, 2);

        let mut payload = tag(endian, DataType::UInt32, &flags);
        payload.extend(tag(endian, DataType::Int32, &dims));
        payload.extend(tag(endian, DataType::Int8, b"s"));

        assert!(matches!(
            parse_matrix(&payload, endian),
            Err(MatFileError::UnsupportedClass(ref c)) if c == "sparse"
        ));
    }
}
