// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Minimal SCALE decoding for records read from raw storage.
//!
//! Storage values are decoded against fixed record layouts, without a type
//! registry, so only the primitives those layouts need are covered here.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScaleError {
    #[error("Input truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("Length prefix {0} does not fit in memory")]
    LengthOverflow(u64),
}

/// Decode a compact-encoded unsigned integer.
///
/// Returns `(value, bytes_consumed)`, or `(0, 0)` when `buf` is too short for
/// the mode announced by its first byte. Big-integer mode keeps only the low
/// 8 bytes, so magnitudes above `u64::MAX` are truncated.
pub fn decode_compact_uint(buf: &[u8]) -> (u64, usize) {
    let Some(&first) = buf.first() else {
        return (0, 0);
    };

    match first & 0b11 {
        0b00 => (u64::from(first >> 2), 1),
        0b01 => match buf.get(..2) {
            Some(b) => (u64::from(u16::from_le_bytes([b[0], b[1]]) >> 2), 2),
            None => (0, 0),
        },
        0b10 => match buf.get(..4) {
            Some(b) => (
                u64::from(u32::from_le_bytes([b[0], b[1], b[2], b[3]]) >> 2),
                4,
            ),
            None => (0, 0),
        },
        _ => {
            let len = usize::from(first >> 2) + 4;
            let Some(bytes) = buf.get(1..1 + len) else {
                return (0, 0);
            };
            let value = bytes
                .iter()
                .take(8)
                .enumerate()
                .fold(0u64, |acc, (i, b)| acc | (u64::from(*b) << (8 * i)));
            (value, 1 + len)
        }
    }
}

/// Decode a compact length prefix followed by that many raw bytes.
///
/// Returns the bytes and the total number of bytes consumed.
pub fn decode_byte_vector(buf: &[u8]) -> Result<(Vec<u8>, usize), ScaleError> {
    let (len, consumed) = decode_compact_uint(buf);
    if consumed == 0 {
        return Err(ScaleError::Truncated {
            needed: 1,
            available: buf.len(),
        });
    }

    let len = usize::try_from(len).map_err(|_| ScaleError::LengthOverflow(len))?;
    let body = &buf[consumed..];
    if body.len() < len {
        return Err(ScaleError::Truncated {
            needed: len,
            available: body.len(),
        });
    }

    Ok((body[..len].to_vec(), consumed + len))
}

/// Forward-only cursor over a SCALE-encoded record.
#[derive(Debug, Clone)]
pub struct ScaleInput<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ScaleInput<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ScaleError> {
        let available = self.remaining();
        if available < n {
            return Err(ScaleError::Truncated {
                needed: n,
                available,
            });
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ScaleError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), ScaleError> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, ScaleError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, ScaleError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u128(&mut self) -> Result<u128, ScaleError> {
        Ok(u128::from_le_bytes(self.take_array()?))
    }

    pub fn read_compact(&mut self) -> Result<u64, ScaleError> {
        let (value, consumed) = decode_compact_uint(&self.data[self.offset..]);
        if consumed == 0 {
            return Err(ScaleError::Truncated {
                needed: 1,
                available: self.remaining(),
            });
        }
        self.offset += consumed;
        Ok(value)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, ScaleError> {
        let (bytes, consumed) = decode_byte_vector(&self.data[self.offset..])?;
        self.offset += consumed;
        Ok(bytes)
    }
}
