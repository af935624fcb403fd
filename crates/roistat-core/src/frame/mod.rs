//! Frame - The typed n-dimensional array delivered to the plugin
//!
//! A `Frame` is one image (or spectrum, or volume) produced upstream: a
//! buffer of a single numeric element type, a list of axis sizes and a
//! color-mode tag describing how color channels are interleaved with the
//! spatial axes.
//!
//! # Memory layout
//!
//! - Elements are stored contiguously, axis 0 varying fastest
//! - The element at `(i0, i1, i2)` lives at `i0 + i1 * n0 + i2 * n0 * n1`
//! - At most [`MAX_FRAME_DIMS`] axes are supported
//!
//! # Ownership model
//!
//! `Frame` uses `Arc` for cheap cloning (shared ownership). A clone shares
//! the buffer; [`Frame::deep_copy`] produces an independently owned buffer.

mod data;

pub use data::FrameData;

use crate::error::{Error, Result};
use std::sync::Arc;

/// Maximum number of axes a frame may have.
pub const MAX_FRAME_DIMS: usize = 3;

/// Numeric element type of a frame buffer
///
/// The discriminants are the wire codes used by upstream drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ElementType {
    /// Signed 8-bit integer
    Int8 = 0,
    /// Unsigned 8-bit integer
    UInt8 = 1,
    /// Signed 16-bit integer
    Int16 = 2,
    /// Unsigned 16-bit integer
    UInt16 = 3,
    /// Signed 32-bit integer
    Int32 = 4,
    /// Unsigned 32-bit integer
    UInt32 = 5,
    /// 32-bit IEEE float
    Float32 = 6,
    /// 64-bit IEEE float
    Float64 = 7,
}

impl ElementType {
    /// Create `ElementType` from its wire code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedElementType`] for any code outside 0..=7.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(ElementType::Int8),
            1 => Ok(ElementType::UInt8),
            2 => Ok(ElementType::Int16),
            3 => Ok(ElementType::UInt16),
            4 => Ok(ElementType::Int32),
            5 => Ok(ElementType::UInt32),
            6 => Ok(ElementType::Float32),
            7 => Ok(ElementType::Float64),
            _ => Err(Error::UnsupportedElementType(code)),
        }
    }

    /// Get the wire code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Size of one element in bytes.
    pub fn size_in_bytes(self) -> usize {
        match self {
            ElementType::Int8 | ElementType::UInt8 => 1,
            ElementType::Int16 | ElementType::UInt16 => 2,
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => 4,
            ElementType::Float64 => 8,
        }
    }
}

/// Color mode of a frame
///
/// Only the two pixel/row interleaved RGB layouts change how region axes
/// map onto storage axes; every other mode is treated as planar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ColorMode {
    /// Monochrome
    #[default]
    Mono = 0,
    /// Raw Bayer mosaic
    Bayer = 1,
    /// RGB, pixel interleaved: `[3, nx, ny]`
    Rgb1 = 2,
    /// RGB, row interleaved: `[nx, 3, ny]`
    Rgb2 = 3,
    /// RGB, plane interleaved: `[nx, ny, 3]`
    Rgb3 = 4,
    /// YUV 4:4:4
    Yuv444 = 5,
    /// YUV 4:2:2
    Yuv422 = 6,
    /// YUV 4:1:1
    Yuv411 = 7,
}

impl ColorMode {
    /// Create `ColorMode` from its wire code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColorMode`] for any code outside 0..=7.
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(ColorMode::Mono),
            1 => Ok(ColorMode::Bayer),
            2 => Ok(ColorMode::Rgb1),
            3 => Ok(ColorMode::Rgb2),
            4 => Ok(ColorMode::Rgb3),
            5 => Ok(ColorMode::Yuv444),
            6 => Ok(ColorMode::Yuv422),
            7 => Ok(ColorMode::Yuv411),
            _ => Err(Error::UnknownColorMode(code)),
        }
    }

    /// Get the wire code.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Internal frame data
#[derive(Debug, Clone)]
struct FrameInner {
    /// Size of each axis, fastest varying first
    dims: Vec<usize>,
    /// Color interleaving
    color_mode: ColorMode,
    /// Typed element buffer
    data: FrameData,
}

/// Frame - typed n-dimensional array
///
/// # Examples
///
/// ```
/// use roistat_core::{ColorMode, Frame, FrameData};
///
/// let frame = Frame::new(vec![4, 3], ColorMode::Mono, FrameData::UInt8(vec![0; 12])).unwrap();
/// assert_eq!(frame.rank(), 2);
/// assert_eq!(frame.dim(0), Some(4));
/// ```
#[derive(Debug, Clone)]
pub struct Frame {
    inner: Arc<FrameInner>,
}

impl Frame {
    /// Create a frame from axis sizes, a color mode and a typed buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimension`] if there are no axes, more than
    ///   [`MAX_FRAME_DIMS`] axes, an axis of size 0, or an element count
    ///   that overflows `usize`.
    /// - [`Error::BufferLength`] if the buffer does not hold exactly
    ///   `product(dims)` elements.
    pub fn new(dims: Vec<usize>, color_mode: ColorMode, data: FrameData) -> Result<Self> {
        if dims.is_empty() || dims.len() > MAX_FRAME_DIMS || dims.contains(&0) {
            return Err(Error::InvalidDimension(dims));
        }
        let Some(expected) = dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)) else {
            return Err(Error::InvalidDimension(dims));
        };
        if data.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: data.len(),
            });
        }

        Ok(Frame {
            inner: Arc::new(FrameInner {
                dims,
                color_mode,
                data,
            }),
        })
    }

    /// Create a frame from a raw native-endian byte buffer and a wire
    /// element type code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedElementType`] for an unknown code, plus
    /// every error of [`FrameData::from_ne_bytes`] and [`Frame::new`].
    pub fn from_raw_parts(
        dims: Vec<usize>,
        element_code: i32,
        color_mode: ColorMode,
        bytes: &[u8],
    ) -> Result<Self> {
        let element_type = ElementType::from_code(element_code)?;
        let data = FrameData::from_ne_bytes(element_type, bytes)?;
        Self::new(dims, color_mode, data)
    }

    /// Number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.inner.dims.len()
    }

    /// All axis sizes.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.inner.dims
    }

    /// Size of one axis, or `None` if the frame has fewer axes.
    #[inline]
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.inner.dims.get(axis).copied()
    }

    #[inline]
    pub fn color_mode(&self) -> ColorMode {
        self.inner.color_mode
    }

    /// Declared element type.
    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.inner.data.element_type()
    }

    /// The typed element buffer.
    #[inline]
    pub fn data(&self) -> &FrameData {
        &self.inner.data
    }

    /// Total element count.
    #[inline]
    pub fn num_elements(&self) -> usize {
        self.inner.data.len()
    }

    /// Buffer size in bytes.
    pub fn byte_len(&self) -> usize {
        self.num_elements() * self.element_type().size_in_bytes()
    }

    /// Check whether two handles share the same buffer.
    pub fn shares_buffer(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copy the frame into a freshly allocated, independently owned buffer.
    pub fn deep_copy(&self) -> Frame {
        Frame {
            inner: Arc::new(FrameInner {
                dims: self.inner.dims.clone(),
                color_mode: self.inner.color_mode,
                data: self.inner.data.clone(),
            }),
        }
    }
}
