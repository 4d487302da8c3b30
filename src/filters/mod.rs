//! Streaming filter engine modules.
//!
//! ## Supported Formats
//!
//! All filters work on interleaved u8 pixels with 1-4 channels:
//!
//! | Format | Channels | Description |
//! |--------|----------|-------------|
//! | Gray | 1 | Single luminance channel, 0-255 |
//! | GrayAlpha | 2 | Luminance + alpha |
//! | Rgb | 3 | Red, green, blue |
//! | Rgba | 4 | RGB + alpha |
//!
//! The format is fixed per invocation and shared by source and
//! destination. Colors resolve per format (grayscale targets collapse RGB
//! to BT.709 luminance); a transparent-background request forces the
//! resolved alpha to 0.
//!
//! ## Architecture
//!
//! - **Bounded memory** - the tiler walks the region in fixed-size row or
//!   column chunks through owned scratch buffers, so working memory is
//!   independent of image size
//! - **Clamp, don't reject** - out-of-range tunables are clamped and an
//!   empty selection is a no-op success
//! - **Shadow-buffer discipline** - only the selected region is written;
//!   the host merges the destination on success
//! - **Preview identity** - thumbnail rendering shares every line of
//!   policy logic with the full-resolution path and is byte-identical at
//!   equal size
//! - **Single-threaded** - synchronous throughout; the only yield points
//!   are the per-chunk progress callbacks

pub mod blinds;
pub mod checkerboard;
pub mod core;
pub mod segment;
pub mod tiler;
