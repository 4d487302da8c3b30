//! Louver
//!
//! Streaming segmented-distortion and tiled pattern-generation engine:
//! the "blinds" slat distortion and the "checkerboard" pattern renderer,
//! implemented as bounded-memory scanline transforms over host-supplied
//! pixel buffers.
//!
//! ## Image Format
//!
//! Pixels are interleaved u8 with 1-4 channels (Gray, GrayAlpha, RGB,
//! RGBA), carried as `ndarray` arrays of shape `(height, width, channels)`
//! at the convenience entry points. The engine itself streams through the
//! [`filters::core::PixelSource`]/[`filters::core::PixelSink`] seams, so
//! any host buffer can back it.
//!
//! ## Architecture
//!
//! Each filter is a per-line (or per-pixel) transform driven by a chunked
//! region walker that keeps working memory bounded and reports progress
//! between chunks. Interactive previews run the identical transform with
//! chunking collapsed to a single pass and are byte-identical to the
//! full-resolution path at equal size.

pub mod filters;

// Host bindings (only when the python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::filters::blinds::{self, BlindsParams, Orientation};
    use crate::filters::checkerboard::{self, CheckerboardParams};
    use crate::filters::core::{Color, PixelFormat};

    fn color_from(rgba: (u8, u8, u8, u8)) -> Color {
        Color::new(rgba.0, rgba.1, rgba.2, rgba.3)
    }

    fn orientation_from(name: &str) -> Orientation {
        match name {
            "vertical" => Orientation::Vertical,
            _ => Orientation::Horizontal,
        }
    }

    /// Apply the blinds distortion to an image.
    ///
    /// # Arguments
    /// * `image` - Input image (1, 3, or 4 channels)
    /// * `displacement` - Displacement angle in degrees (0-360)
    /// * `segments` - Number of segments (1-1024)
    /// * `orientation` - "horizontal" or "vertical"
    /// * `transparent_bg` - Force the background alpha to 0
    /// * `background` - Background color as an RGBA tuple
    #[pyfunction]
    #[pyo3(signature = (image, displacement=30, segments=3, orientation="horizontal",
                        transparent_bg=false, background=(0, 0, 0, 255)))]
    pub fn blinds<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        displacement: u32,
        segments: u32,
        orientation: &str,
        transparent_bg: bool,
        background: (u8, u8, u8, u8),
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let params = BlindsParams {
            displacement,
            segments,
            orientation: orientation_from(orientation),
            transparent_bg,
        };
        let result = blinds::render(image.as_array(), &params, color_from(background))
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// Apply the blinds distortion to a thumbnail for interactive preview.
    ///
    /// Byte-identical to `blinds` at equal resolution.
    #[pyfunction]
    #[pyo3(signature = (image, displacement=30, segments=3, orientation="horizontal",
                        transparent_bg=false, background=(0, 0, 0, 255)))]
    pub fn blinds_preview<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        displacement: u32,
        segments: u32,
        orientation: &str,
        transparent_bg: bool,
        background: (u8, u8, u8, u8),
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let params = BlindsParams {
            displacement,
            segments,
            orientation: orientation_from(orientation),
            transparent_bg,
        };
        let result = blinds::render_preview(image.as_array(), &params, color_from(background))
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// Render a checkerboard pattern buffer.
    ///
    /// # Arguments
    /// * `width`, `height` - Output size in pixels
    /// * `channels` - Output channel count (1-4)
    /// * `size` - Check edge length in pixels
    /// * `psychobilly` - Use the irregular run-length pattern
    /// * `foreground`, `background` - Check colors as RGBA tuples
    #[pyfunction]
    #[pyo3(signature = (width, height, channels=3, size=10, psychobilly=false,
                        foreground=(255, 255, 255, 255), background=(0, 0, 0, 255)))]
    pub fn checkerboard<'py>(
        py: Python<'py>,
        width: u32,
        height: u32,
        channels: usize,
        size: u32,
        psychobilly: bool,
        foreground: (u8, u8, u8, u8),
        background: (u8, u8, u8, u8),
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let format =
            PixelFormat::from_channels(channels).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let params = CheckerboardParams { size, psychobilly };
        let result = checkerboard::render(
            width,
            height,
            format,
            &params,
            color_from(foreground),
            color_from(background),
        )
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// Render a checkerboard preview window anchored at `(origin_x, origin_y)`.
    #[pyfunction]
    #[pyo3(signature = (origin_x, origin_y, width, height, channels=3, size=10, psychobilly=false,
                        foreground=(255, 255, 255, 255), background=(0, 0, 0, 255)))]
    pub fn checkerboard_preview<'py>(
        py: Python<'py>,
        origin_x: u32,
        origin_y: u32,
        width: u32,
        height: u32,
        channels: usize,
        size: u32,
        psychobilly: bool,
        foreground: (u8, u8, u8, u8),
        background: (u8, u8, u8, u8),
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let format =
            PixelFormat::from_channels(channels).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let params = CheckerboardParams { size, psychobilly };
        let result = checkerboard::render_preview(
            (origin_x, origin_y),
            width,
            height,
            format,
            &params,
            color_from(foreground),
            color_from(background),
        )
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// Louver extension module
    #[pymodule]
    pub fn louver(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(blinds, m)?)?;
        m.add_function(wrap_pyfunction!(blinds_preview, m)?)?;
        m.add_function(wrap_pyfunction!(checkerboard, m)?)?;
        m.add_function(wrap_pyfunction!(checkerboard_preview, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::louver;
