// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! 128-byte file header and byte order handling

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::{MatFileError, Result};

pub const HEADER_LEN: usize = 128;
const TEXT_LEN: usize = 116;
const SUBSYS_OFFSET_LEN: usize = 8;

/// Level 5 version word
pub const LEVEL5_VERSION: u16 = 0x0100;

/// Byte order of a MAT-file, fixed by the header's endian indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

macro_rules! endian_read {
    ($name:ident, $ty:ty) => {
        pub(crate) fn $name(self, buf: &[u8]) -> $ty {
            match self {
                Endianness::Little => LittleEndian::$name(buf),
                Endianness::Big => BigEndian::$name(buf),
            }
        }
    };
}

macro_rules! endian_put {
    ($name:ident, $write:ident, $ty:ty, $len:expr) => {
        pub(crate) fn $name(self, out: &mut Vec<u8>, value: $ty) {
            let mut buf = [0u8; $len];
            match self {
                Endianness::Little => LittleEndian::$write(&mut buf, value),
                Endianness::Big => BigEndian::$write(&mut buf, value),
            }
            out.extend_from_slice(&buf);
        }
    };
}

impl Endianness {
    endian_read!(read_u16, u16);
    endian_read!(read_i16, i16);
    endian_read!(read_u32, u32);
    endian_read!(read_i32, i32);
    endian_read!(read_u64, u64);
    endian_read!(read_i64, i64);
    endian_read!(read_f32, f32);
    endian_read!(read_f64, f64);

    endian_put!(put_u16, write_u16, u16, 2);
    endian_put!(put_u32, write_u32, u32, 4);
    endian_put!(put_i32, write_i32, i32, 4);
    endian_put!(put_f64, write_f64, f64, 8);

    /// Bytes of the endian indicator as they appear in a file of this order
    pub fn indicator(self) -> [u8; 2] {
        match self {
            Endianness::Little => *b"IM",
            Endianness::Big => *b"MI",
        }
    }
}

/// Parsed file header
#[derive(Debug, Clone, PartialEq)]
pub struct MatHeader {
    /// Descriptive text with trailing padding removed
    pub text: String,
    pub subsys_offset: u64,
    pub version: u16,
    pub endianness: Endianness,
}

impl MatHeader {
    pub fn new(text: impl Into<String>, endianness: Endianness) -> Self {
        Self {
            text: text.into(),
            subsys_offset: 0,
            version: LEVEL5_VERSION,
            endianness,
        }
    }

    /// Parse the first 128 bytes of a file
    ///
    /// # Errors
    ///
    /// `InvalidHeader` if the buffer is short or the endian indicator is
    /// unrecognized, `UnsupportedVersion` for anything but Level 5
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(MatFileError::InvalidHeader(format!(
                "file is {} bytes, header needs {}",
                bytes.len(),
                HEADER_LEN
            )));
        }

        let endianness = match &bytes[126..128] {
            b"IM" => Endianness::Little,
            b"MI" => Endianness::Big,
            other => {
                return Err(MatFileError::InvalidHeader(format!(
                    "unrecognized endian indicator {:?}",
                    other
                )))
            }
        };

        let version = endianness.read_u16(&bytes[124..126]);
        if version != LEVEL5_VERSION {
            return Err(MatFileError::UnsupportedVersion(version));
        }

        let text = String::from_utf8_lossy(&bytes[..TEXT_LEN])
            .trim_end_matches(|c: char| c == ' ' || c == '\0')
            .to_string();
        let subsys_offset = endianness.read_u64(&bytes[TEXT_LEN..TEXT_LEN + SUBSYS_OFFSET_LEN]);

        Ok(Self {
            text,
            subsys_offset,
            version,
            endianness,
        })
    }

    /// Encode as exactly 128 bytes; overlong text is truncated
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN);
        let text = self.text.as_bytes();
        let text_len = text.len().min(TEXT_LEN);
        out.extend_from_slice(&text[..text_len]);
        out.resize(TEXT_LEN, b' ');
        out.extend_from_slice(&[0u8; SUBSYS_OFFSET_LEN]);
        self.endianness.put_u16(&mut out, self.version);
        out.extend_from_slice(&self.endianness.indicator());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_parse_both_orders() {
        for endianness in [Endianness::Little, Endianness::Big] {
            let header = MatHeader::new("MATLAB 5.0 MAT-file, test", endianness);
            let bytes = header.encode();
            assert_eq!(bytes.len(), HEADER_LEN);
            assert_eq!(MatHeader::parse(&bytes).unwrap(), header);
        }
    }

    #[test]
    fn test_little_endian_indicator_bytes() {
        let bytes = MatHeader::new("x", Endianness::Little).encode();
        assert_eq!(&bytes[124..128], &[0x00, 0x01, b'I', b'M']);
    }

    #[test]
    fn test_short_buffer() {
        assert!(matches!(
            MatHeader::parse(&[0u8; 64]),
            Err(MatFileError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_bad_indicator() {
        let mut bytes = MatHeader::new("x", Endianness::Little).encode();
        bytes[126] = b'X';
        assert!(matches!(
            MatHeader::parse(&bytes),
            Err(MatFileError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_hdf5_version_rejected() {
        let mut header = MatHeader::new("MATLAB 7.3 MAT-file", Endianness::Little);
        header.version = 0x0200;
        assert!(matches!(
            MatHeader::parse(&header.encode()),
            Err(MatFileError::UnsupportedVersion(0x0200))
        ));
    }
}
