//! Typed element buffers
//!
//! `FrameData` is a closed sum over the eight supported element kinds.
//! Code that needs the values dispatches on the variant and runs a
//! generic routine over the concrete slice.

use super::ElementType;
use crate::error::{Error, Result};

/// Element buffer of a [`Frame`](super::Frame)
#[derive(Debug, Clone, PartialEq)]
pub enum FrameData {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// Decode a native-endian byte buffer into `Vec<$ty>`.
macro_rules! decode_ne {
    ($bytes:expr, $ty:ty) => {
        $bytes
            .chunks_exact(std::mem::size_of::<$ty>())
            .map(|chunk| {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(chunk);
                <$ty>::from_ne_bytes(raw)
            })
            .collect::<Vec<$ty>>()
    };
}

impl FrameData {
    /// Decode a raw native-endian byte buffer as elements of `element_type`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MisalignedBuffer`] if `bytes.len()` is not a
    /// multiple of the element size.
    pub fn from_ne_bytes(element_type: ElementType, bytes: &[u8]) -> Result<Self> {
        let element_size = element_type.size_in_bytes();
        if bytes.len() % element_size != 0 {
            return Err(Error::MisalignedBuffer {
                len: bytes.len(),
                element_size,
            });
        }

        Ok(match element_type {
            ElementType::Int8 => FrameData::Int8(decode_ne!(bytes, i8)),
            ElementType::UInt8 => FrameData::UInt8(bytes.to_vec()),
            ElementType::Int16 => FrameData::Int16(decode_ne!(bytes, i16)),
            ElementType::UInt16 => FrameData::UInt16(decode_ne!(bytes, u16)),
            ElementType::Int32 => FrameData::Int32(decode_ne!(bytes, i32)),
            ElementType::UInt32 => FrameData::UInt32(decode_ne!(bytes, u32)),
            ElementType::Float32 => FrameData::Float32(decode_ne!(bytes, f32)),
            ElementType::Float64 => FrameData::Float64(decode_ne!(bytes, f64)),
        })
    }

    /// Element type tag of this buffer.
    pub fn element_type(&self) -> ElementType {
        match self {
            FrameData::Int8(_) => ElementType::Int8,
            FrameData::UInt8(_) => ElementType::UInt8,
            FrameData::Int16(_) => ElementType::Int16,
            FrameData::UInt16(_) => ElementType::UInt16,
            FrameData::Int32(_) => ElementType::Int32,
            FrameData::UInt32(_) => ElementType::UInt32,
            FrameData::Float32(_) => ElementType::Float32,
            FrameData::Float64(_) => ElementType::Float64,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            FrameData::Int8(v) => v.len(),
            FrameData::UInt8(v) => v.len(),
            FrameData::Int16(v) => v.len(),
            FrameData::UInt16(v) => v.len(),
            FrameData::Int32(v) => v.len(),
            FrameData::UInt32(v) => v.len(),
            FrameData::Float32(v) => v.len(),
            FrameData::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ne_bytes_each_kind() {
        let bytes: Vec<u8> = (-3i16..3).flat_map(|v| v.to_ne_bytes()).collect();
        let data = FrameData::from_ne_bytes(ElementType::Int16, &bytes).unwrap();
        assert_eq!(data, FrameData::Int16(vec![-3, -2, -1, 0, 1, 2]));

        let data = FrameData::from_ne_bytes(ElementType::UInt8, &[7, 8, 9]).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.element_type(), ElementType::UInt8);

        let bytes = 2.25f64.to_ne_bytes();
        let data = FrameData::from_ne_bytes(ElementType::Float64, &bytes).unwrap();
        assert_eq!(data, FrameData::Float64(vec![2.25]));
    }

    #[test]
    fn test_from_ne_bytes_misaligned() {
        assert!(matches!(
            FrameData::from_ne_bytes(ElementType::UInt32, &[0u8; 6]),
            Err(Error::MisalignedBuffer {
                len: 6,
                element_size: 4
            })
        ));
    }
}
