// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Element data types and array classes of the Level 5 format

use crate::{MatFileError, Result};

/// Storage type of a data element (`miXXX` codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Single,
    Double,
    Int64,
    UInt64,
    Matrix,
    Compressed,
    Utf8,
    Utf16,
    Utf32,
}

impl DataType {
    pub fn from_code(code: u32) -> Option<Self> {
        let data_type = match code {
            1 => DataType::Int8,
            2 => DataType::UInt8,
            3 => DataType::Int16,
            4 => DataType::UInt16,
            5 => DataType::Int32,
            6 => DataType::UInt32,
            7 => DataType::Single,
            9 => DataType::Double,
            12 => DataType::Int64,
            13 => DataType::UInt64,
            14 => DataType::Matrix,
            15 => DataType::Compressed,
            16 => DataType::Utf8,
            17 => DataType::Utf16,
            18 => DataType::Utf32,
            _ => return None,
        };
        Some(data_type)
    }

    pub fn code(self) -> u32 {
        match self {
            DataType::Int8 => 1,
            DataType::UInt8 => 2,
            DataType::Int16 => 3,
            DataType::UInt16 => 4,
            DataType::Int32 => 5,
            DataType::UInt32 => 6,
            DataType::Single => 7,
            DataType::Double => 9,
            DataType::Int64 => 12,
            DataType::UInt64 => 13,
            DataType::Matrix => 14,
            DataType::Compressed => 15,
            DataType::Utf8 => 16,
            DataType::Utf16 => 17,
            DataType::Utf32 => 18,
        }
    }

    /// Size in bytes of one value, `None` for container types
    pub fn element_size(self) -> Option<usize> {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Utf8 => Some(1),
            DataType::Int16 | DataType::UInt16 | DataType::Utf16 => Some(2),
            DataType::Int32 | DataType::UInt32 | DataType::Single | DataType::Utf32 => Some(4),
            DataType::Double | DataType::Int64 | DataType::UInt64 => Some(8),
            DataType::Matrix | DataType::Compressed => None,
        }
    }

    pub(crate) fn require(code: u32) -> Result<Self> {
        Self::from_code(code)
            .ok_or_else(|| MatFileError::Malformed(format!("unknown data element type {}", code)))
    }
}

/// Class of a matrix element (`mxXXX_CLASS` codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayClass {
    Cell,
    Struct,
    Object,
    Char,
    Sparse,
    Double,
    Single,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Function,
    Opaque,
}

impl ArrayClass {
    pub fn from_code(code: u8) -> Option<Self> {
        let class = match code {
            1 => ArrayClass::Cell,
            2 => ArrayClass::Struct,
            3 => ArrayClass::Object,
            4 => ArrayClass::Char,
            5 => ArrayClass::Sparse,
            6 => ArrayClass::Double,
            7 => ArrayClass::Single,
            8 => ArrayClass::Int8,
            9 => ArrayClass::UInt8,
            10 => ArrayClass::Int16,
            11 => ArrayClass::UInt16,
            12 => ArrayClass::Int32,
            13 => ArrayClass::UInt32,
            14 => ArrayClass::Int64,
            15 => ArrayClass::UInt64,
            16 => ArrayClass::Function,
            17 => ArrayClass::Opaque,
            _ => return None,
        };
        Some(class)
    }

    pub fn code(self) -> u8 {
        match self {
            ArrayClass::Cell => 1,
            ArrayClass::Struct => 2,
            ArrayClass::Object => 3,
            ArrayClass::Char => 4,
            ArrayClass::Sparse => 5,
            ArrayClass::Double => 6,
            ArrayClass::Single => 7,
            ArrayClass::Int8 => 8,
            ArrayClass::UInt8 => 9,
            ArrayClass::Int16 => 10,
            ArrayClass::UInt16 => 11,
            ArrayClass::Int32 => 12,
            ArrayClass::UInt32 => 13,
            ArrayClass::Int64 => 14,
            ArrayClass::UInt64 => 15,
            ArrayClass::Function => 16,
            ArrayClass::Opaque => 17,
        }
    }

    pub fn is_numeric(self) -> bool {
        (6..=15).contains(&self.code())
    }

    /// MATLAB's name for the class, as shown by `class(x)`
    pub fn name(self) -> &'static str {
        match self {
            ArrayClass::Cell => "cell",
            ArrayClass::Struct => "struct",
            ArrayClass::Object => "object",
            ArrayClass::Char => "char",
            ArrayClass::Sparse => "sparse",
            ArrayClass::Double => "double",
            ArrayClass::Single => "single",
            ArrayClass::Int8 => "int8",
            ArrayClass::UInt8 => "uint8",
            ArrayClass::Int16 => "int16",
            ArrayClass::UInt16 => "uint16",
            ArrayClass::Int32 => "int32",
            ArrayClass::UInt32 => "uint32",
            ArrayClass::Int64 => "int64",
            ArrayClass::UInt64 => "uint64",
            ArrayClass::Function => "function_handle",
            ArrayClass::Opaque => "opaque",
        }
    }
}
