//! Core types shared by the streaming filters.
//!
//! This module provides the pieces every filter builds on:
//! - `Rect` regions and their intersection with a buffer extent
//! - `PixelFormat` descriptors (Y, YA, RGB, RGBA interleaved u8)
//! - `Color` resolution to per-format byte patterns
//! - The `PixelSource`/`PixelSink` seams the streaming tiler reads and
//!   writes through

use ndarray::{Array3, ArrayView3};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

/// Failures surfaced by the buffer seams.
///
/// Tunable parameters are never rejected (they are clamped), and an empty
/// region is a no-op success. Errors are reserved for contract violations
/// between the engine and the buffers it was handed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("{0} channels is outside the supported 1-4 range")]
    UnsupportedChannels(usize),

    #[error("buffer carries {buffer} channels but the pixel format expects {format}")]
    ChannelMismatch { format: usize, buffer: usize },

    #[error("region {region:?} lies outside the {width}x{height} buffer extent")]
    RegionOutOfBounds {
        region: Rect,
        width: u32,
        height: u32,
    },

    #[error("scanline buffer holds {actual} bytes but the region needs {expected}")]
    ScanlineSize { expected: usize, actual: usize },

    #[error("row permutation has {actual} entries for a region of {expected} rows")]
    PermutationLength { expected: usize, actual: usize },
}

/// Integer region of interest, `x`/`y` in image coordinates.
///
/// A `Rect` produced by `intersect` is always non-empty; an empty
/// intersection is represented as `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Full extent of a `width` x `height` buffer, anchored at the origin.
    pub fn of_extent(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Intersection of two regions, `None` when they do not overlap or the
    /// overlap is degenerate (zero width or height).
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right > x && bottom > y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

/// Interleaved u8 pixel layout, fixed for the duration of one operation.
///
/// Source and destination always share the same format; anything outside
/// these four layouts is rejected before the engine runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn from_channels(channels: usize) -> Result<Self> {
        match channels {
            1 => Ok(Self::Gray),
            2 => Ok(Self::GrayAlpha),
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            other => Err(FilterError::UnsupportedChannels(other)),
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba)
    }

    pub fn is_gray(&self) -> bool {
        matches!(self, Self::Gray | Self::GrayAlpha)
    }
}

/// RGBA color, resolved once per invocation from the ambient drawing
/// context by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// BT.709 luminance, used when resolving against grayscale formats.
    pub fn luminance(&self) -> u8 {
        let y = 0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32;
        y.round().clamp(0.0, 255.0) as u8
    }

    /// Same color with alpha forced to 0 (transparent background requests).
    pub fn transparent(self) -> Self {
        Self { a: 0, ..self }
    }

    /// Resolve to the byte pattern of one pixel in `format`.
    pub fn resolve(&self, format: PixelFormat) -> ResolvedPixel {
        let bytes = match format {
            PixelFormat::Gray => [self.luminance(), 0, 0, 0],
            PixelFormat::GrayAlpha => [self.luminance(), self.a, 0, 0],
            PixelFormat::Rgb => [self.r, self.g, self.b, 0],
            PixelFormat::Rgba => [self.r, self.g, self.b, self.a],
        };

        ResolvedPixel {
            bytes,
            len: format.bytes_per_pixel(),
        }
    }
}

/// One pixel's worth of bytes in a concrete format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedPixel {
    bytes: [u8; 4],
    len: usize,
}

impl ResolvedPixel {
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Read side of the buffer seam.
///
/// The host owns the pixel data; the engine only ever asks for bounded
/// rectangular chunks, copied into scratch memory it owns itself.
pub trait PixelSource {
    /// Addressable extent of the underlying pixel grid.
    fn extent(&self) -> Rect;

    /// Copy `region` into `out` as tightly packed rows
    /// (`region.width * bytes_per_pixel` bytes each).
    fn read_region(&self, region: Rect, format: PixelFormat, out: &mut [u8]) -> Result<()>;
}

/// Write side of the buffer seam; in the host this is the shadow buffer
/// merged into the visible image only after a successful full pass.
pub trait PixelSink {
    fn extent(&self) -> Rect;

    /// Write tightly packed rows from `data` into `region`.
    fn write_region(&mut self, region: Rect, format: PixelFormat, data: &[u8]) -> Result<()>;
}

fn check_region(
    region: Rect,
    format: PixelFormat,
    dim: (usize, usize, usize),
    buf_len: usize,
) -> Result<usize> {
    let (height, width, channels) = dim;

    if channels != format.bytes_per_pixel() {
        return Err(FilterError::ChannelMismatch {
            format: format.bytes_per_pixel(),
            buffer: channels,
        });
    }

    if region.right() as usize > width || region.bottom() as usize > height {
        return Err(FilterError::RegionOutOfBounds {
            region,
            width: width as u32,
            height: height as u32,
        });
    }

    let needed = region.width as usize * region.height as usize * channels;
    if buf_len < needed {
        return Err(FilterError::ScanlineSize {
            expected: needed,
            actual: buf_len,
        });
    }

    Ok(needed)
}

impl PixelSource for ArrayView3<'_, u8> {
    fn extent(&self) -> Rect {
        let (height, width, _) = self.dim();
        Rect::of_extent(width as u32, height as u32)
    }

    fn read_region(&self, region: Rect, format: PixelFormat, out: &mut [u8]) -> Result<()> {
        let needed = check_region(region, format, self.dim(), out.len())?;
        let channels = format.bytes_per_pixel();
        let row_bytes = region.width as usize * channels;

        for (r, row_out) in out[..needed].chunks_exact_mut(row_bytes).enumerate() {
            let y = region.y as usize + r;
            for (cx, px) in row_out.chunks_exact_mut(channels).enumerate() {
                let x = region.x as usize + cx;
                for c in 0..channels {
                    px[c] = self[[y, x, c]];
                }
            }
        }

        Ok(())
    }
}

impl PixelSource for Array3<u8> {
    fn extent(&self) -> Rect {
        self.view().extent()
    }

    fn read_region(&self, region: Rect, format: PixelFormat, out: &mut [u8]) -> Result<()> {
        self.view().read_region(region, format, out)
    }
}

impl PixelSink for Array3<u8> {
    fn extent(&self) -> Rect {
        let (height, width, _) = self.dim();
        Rect::of_extent(width as u32, height as u32)
    }

    fn write_region(&mut self, region: Rect, format: PixelFormat, data: &[u8]) -> Result<()> {
        let needed = check_region(region, format, self.dim(), data.len())?;
        let channels = format.bytes_per_pixel();
        let row_bytes = region.width as usize * channels;

        for (r, row_in) in data[..needed].chunks_exact(row_bytes).enumerate() {
            let y = region.y as usize + r;
            for (cx, px) in row_in.chunks_exact(channels).enumerate() {
                let x = region.x as usize + cx;
                for c in 0..channels {
                    self[[y, x, c]] = px[c];
                }
            }
        }

        Ok(())
    }
}
