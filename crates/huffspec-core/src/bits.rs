//! Bit containers for prefix-coded streams.
//!
//! Bits are packed MSB-first: bit offset 0 is the high bit of byte 0. The
//! stream records its exact bit length, so the trailing pad bits of the last
//! byte are never decoded.
//!
//! ## Persisted Layout
//!
//! ```text
//! +----------+----------------------------+
//! | pad_bits |  payload (ceil(len/8) B)   |
//! +----------+----------------------------+
//!    1 byte
//! ```

use crate::error::{Error, Result};

/// Immutable, byte-aligned bit sequence with an exact bit length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bitstream {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl Bitstream {
    /// Create an empty bitstream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap packed bytes holding `bit_len` meaningful bits.
    pub fn from_parts(mut bytes: Vec<u8>, bit_len: usize) -> Result<Self> {
        let needed = bit_len.div_ceil(8);
        if bytes.len() != needed {
            return Err(Error::invalid_encoding(format!(
                "{} bits need {} bytes, got {}",
                bit_len,
                needed,
                bytes.len()
            )));
        }

        // Clear pad bits so equal streams compare equal
        let tail = bit_len % 8;
        if tail != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= 0xFFu8 << (8 - tail);
            }
        }

        Ok(Self { bytes, bit_len })
    }

    /// Number of meaningful bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.bit_len
    }

    /// Check if the stream holds no bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Packed payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of zero bits padding the last byte.
    pub fn pad_bits(&self) -> u8 {
        ((8 - self.bit_len % 8) % 8) as u8
    }

    /// Read the bit at `offset`, or `None` past the end.
    #[inline]
    pub fn bit(&self, offset: usize) -> Option<bool> {
        if offset >= self.bit_len {
            return None;
        }
        let byte = self.bytes[offset >> 3];
        Some((byte >> (7 - (offset & 7))) & 1 == 1)
    }

    /// Serialize as `[pad_bits][payload...]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes.len() + 1);
        out.push(self.pad_bits());
        out.extend_from_slice(&self.bytes);
        out
    }

    /// Parse the layout written by [`Bitstream::to_bytes`].
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let (&pad, payload) = data
            .split_first()
            .ok_or_else(|| Error::invalid_encoding("missing pad-length byte"))?;

        if pad > 7 {
            return Err(Error::invalid_encoding(format!(
                "pad length {} exceeds 7 bits",
                pad
            )));
        }
        if payload.is_empty() && pad != 0 {
            return Err(Error::invalid_encoding("non-zero pad on empty payload"));
        }

        let bit_len = payload.len() * 8 - pad as usize;
        Self::from_parts(payload.to_vec(), bit_len)
    }
}

/// MSB-first bit writer producing a [`Bitstream`].
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    /// Create a new bit writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with capacity for roughly `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_len: 0,
        }
    }

    /// Write the low `count` bits of `value`, most significant first.
    #[inline]
    pub fn write_bits(&mut self, value: u64, count: u8) {
        debug_assert!(count <= 64);
        for shift in (0..count).rev() {
            self.push_bit((value >> shift) & 1 == 1);
        }
    }

    #[inline]
    fn push_bit(&mut self, bit: bool) {
        let index = self.bit_len >> 3;
        if index == self.bytes.len() {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[index] |= 0x80 >> (self.bit_len & 7);
        }
        self.bit_len += 1;
    }

    /// Bits written so far.
    pub fn len(&self) -> usize {
        self.bit_len
    }

    /// Check if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Seal the writer into an immutable stream.
    pub fn finish(self) -> Bitstream {
        Bitstream {
            bytes: self.bytes,
            bit_len: self.bit_len,
        }
    }
}
