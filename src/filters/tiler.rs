//! Bounded-chunk walkers over a rectangular region.
//!
//! The tiler keeps working memory independent of image size by gulping a
//! fixed number of rows (or columns) at a time through owned scratch
//! buffers, invoking a per-line or per-pixel callback for each, and
//! reporting a strictly increasing completion fraction after every chunk.
//! The final emission is exactly 1.0.

use log::{debug, trace};

use crate::filters::core::{FilterError, PixelFormat, PixelSink, PixelSource, Rect, Result};

/// How many rows/columns to gulp down in one go.
pub const DEFAULT_CHUNK_ROWS: usize = 40;

/// Chunked region walker.
#[derive(Clone, Copy, Debug)]
pub struct Tiler {
    chunk_rows: usize,
}

impl Default for Tiler {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_ROWS)
    }
}

impl Tiler {
    pub fn new(chunk_rows: usize) -> Self {
        Self {
            chunk_rows: chunk_rows.max(1),
        }
    }

    /// A tiler whose chunk covers any region in one pass; previews use
    /// this so the whole thumbnail goes through a single gulp.
    pub fn single_pass() -> Self {
        Self {
            chunk_rows: usize::MAX,
        }
    }

    pub fn chunk_rows(&self) -> usize {
        self.chunk_rows
    }

    /// Read `region` row chunks from `src`, run `line` on every scanline,
    /// and write the transformed chunks to `dst`.
    pub fn transform_rows<S, K, L, P>(
        &self,
        src: &S,
        dst: &mut K,
        region: Rect,
        format: PixelFormat,
        mut line: L,
        progress: &mut P,
    ) -> Result<()>
    where
        S: PixelSource + ?Sized,
        K: PixelSink + ?Sized,
        L: FnMut(&[u8], &mut [u8]),
        P: FnMut(f64),
    {
        let bpp = format.bytes_per_pixel();
        let row_bytes = region.width as usize * bpp;
        let chunk = self.chunk_rows.min(region.height as usize);
        debug!(
            "transform_rows: region={:?} chunk={} row_bytes={}",
            region, chunk, row_bytes
        );

        let mut src_rows = vec![0u8; chunk * row_bytes];
        let mut dst_rows = vec![0u8; chunk * row_bytes];

        let mut y = 0u32;
        while y < region.height {
            let step = chunk.min((region.height - y) as usize);
            let rect = Rect::new(region.x, region.y + y, region.width, step as u32);
            let bytes = step * row_bytes;

            src.read_region(rect, format, &mut src_rows[..bytes])?;

            for r in 0..step {
                line(
                    &src_rows[r * row_bytes..(r + 1) * row_bytes],
                    &mut dst_rows[r * row_bytes..(r + 1) * row_bytes],
                );
            }

            dst.write_region(rect, format, &dst_rows[..bytes])?;

            y += step as u32;
            trace!("transform_rows: {}/{} rows done", y, region.height);
            progress(f64::from(y) / f64::from(region.height));
        }

        Ok(())
    }

    /// Copy whole source rows into destination rows according to
    /// `permutation`, walking the region in bounded column chunks.
    ///
    /// `permutation[r]` selects the source row (1-based, relative to the
    /// region) that lands on destination row `r`; the 0 sentinel selects a
    /// background-filled row. `background` is one pixel in `format`.
    pub fn copy_permuted_rows<S, K, P>(
        &self,
        src: &S,
        dst: &mut K,
        region: Rect,
        format: PixelFormat,
        permutation: &[u32],
        background: &[u8],
        progress: &mut P,
    ) -> Result<()>
    where
        S: PixelSource + ?Sized,
        K: PixelSink + ?Sized,
        P: FnMut(f64),
    {
        let bpp = format.bytes_per_pixel();
        let height = region.height as usize;

        if permutation.len() != height {
            return Err(FilterError::PermutationLength {
                expected: height,
                actual: permutation.len(),
            });
        }
        if background.len() != bpp {
            return Err(FilterError::ScanlineSize {
                expected: bpp,
                actual: background.len(),
            });
        }

        let chunk = self.chunk_rows.min(region.width as usize);
        debug!("copy_permuted_rows: region={:?} chunk={}", region, chunk);

        let mut src_cols = vec![0u8; height * chunk * bpp];
        let mut dst_cols = vec![0u8; height * chunk * bpp];

        // One background-filled scratch row, reused for every 0 entry.
        let mut bg_row = vec![0u8; chunk * bpp];
        for px in bg_row.chunks_exact_mut(bpp) {
            px.copy_from_slice(background);
        }

        let mut x = 0u32;
        while x < region.width {
            let step = chunk.min((region.width - x) as usize);
            let rect = Rect::new(region.x + x, region.y, step as u32, region.height);
            let row_bytes = step * bpp;

            src.read_region(rect, format, &mut src_cols[..height * row_bytes])?;

            for (r, &source_row) in permutation.iter().enumerate() {
                let from = if source_row == 0 {
                    &bg_row[..row_bytes]
                } else {
                    let s = (source_row - 1) as usize;
                    &src_cols[s * row_bytes..(s + 1) * row_bytes]
                };
                dst_cols[r * row_bytes..(r + 1) * row_bytes].copy_from_slice(from);
            }

            dst.write_region(rect, format, &dst_cols[..height * row_bytes])?;

            x += step as u32;
            trace!("copy_permuted_rows: {}/{} columns done", x, region.width);
            progress(f64::from(x) / f64::from(region.width));
        }

        Ok(())
    }

    /// Fill `region` by evaluating `pixel` at every coordinate, with no
    /// source read. Progress is reported in covered-pixel fractions.
    pub fn fill_rows<K, F, P>(
        &self,
        dst: &mut K,
        region: Rect,
        format: PixelFormat,
        mut pixel: F,
        progress: &mut P,
    ) -> Result<()>
    where
        K: PixelSink + ?Sized,
        F: FnMut(u32, u32, &mut [u8]),
        P: FnMut(f64),
    {
        let bpp = format.bytes_per_pixel();
        let row_bytes = region.width as usize * bpp;
        let chunk = self.chunk_rows.min(region.height as usize);
        let total = region.pixel_count();
        debug!("fill_rows: region={:?} chunk={}", region, chunk);

        let mut dst_rows = vec![0u8; chunk * row_bytes];
        let mut done: u64 = 0;

        let mut y = 0u32;
        while y < region.height {
            let step = chunk.min((region.height - y) as usize);

            for r in 0..step {
                let row = &mut dst_rows[r * row_bytes..(r + 1) * row_bytes];
                let py = region.y + y + r as u32;
                for (cx, px) in row.chunks_exact_mut(bpp).enumerate() {
                    pixel(region.x + cx as u32, py, px);
                }
            }

            let rect = Rect::new(region.x, region.y + y, region.width, step as u32);
            dst.write_region(rect, format, &dst_rows[..step * row_bytes])?;

            y += step as u32;
            done += u64::from(region.width) * step as u64;
            progress(done as f64 / total as f64);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_transform_rows_identity_covers_region() {
        let mut src = Array3::<u8>::zeros((8, 5, 1));
        for y in 0..8 {
            for x in 0..5 {
                src[[y, x, 0]] = (y * 5 + x) as u8;
            }
        }
        let mut dst = Array3::<u8>::zeros((8, 5, 1));

        let tiler = Tiler::new(3); // last chunk is short
        tiler
            .transform_rows(
                &src,
                &mut dst,
                Rect::of_extent(5, 8),
                PixelFormat::Gray,
                |s, d| d.copy_from_slice(s),
                &mut |_| {},
            )
            .unwrap();

        assert_eq!(src, dst);
    }

    #[test]
    fn test_progress_is_increasing_and_ends_at_one() {
        let src = Array3::<u8>::zeros((10, 4, 1));
        let mut dst = Array3::<u8>::zeros((10, 4, 1));
        let mut seen = Vec::new();

        Tiler::new(4)
            .transform_rows(
                &src,
                &mut dst,
                Rect::of_extent(4, 10),
                PixelFormat::Gray,
                |s, d| d.copy_from_slice(s),
                &mut |f| seen.push(f),
            )
            .unwrap();

        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*seen.last().unwrap(), 1.0);
    }

    #[test]
    fn test_copy_permuted_rows_reverses() {
        let mut src = Array3::<u8>::zeros((4, 6, 1));
        for y in 0..4 {
            for x in 0..6 {
                src[[y, x, 0]] = (10 * y + x) as u8;
            }
        }
        let mut dst = Array3::<u8>::zeros((4, 6, 1));

        // Reverse rows, with row 1 replaced by background.
        let permutation = [4, 0, 2, 1];
        Tiler::new(4)
            .copy_permuted_rows(
                &src,
                &mut dst,
                Rect::of_extent(6, 4),
                PixelFormat::Gray,
                &permutation,
                &[99],
                &mut |_| {},
            )
            .unwrap();

        for x in 0..6 {
            assert_eq!(dst[[0, x, 0]], src[[3, x, 0]]);
            assert_eq!(dst[[1, x, 0]], 99);
            assert_eq!(dst[[2, x, 0]], src[[1, x, 0]]);
            assert_eq!(dst[[3, x, 0]], src[[0, x, 0]]);
        }
    }

    #[test]
    fn test_copy_permuted_rows_length_mismatch() {
        let src = Array3::<u8>::zeros((4, 4, 1));
        let mut dst = Array3::<u8>::zeros((4, 4, 1));
        let err = Tiler::default()
            .copy_permuted_rows(
                &src,
                &mut dst,
                Rect::of_extent(4, 4),
                PixelFormat::Gray,
                &[1, 2],
                &[0],
                &mut |_| {},
            )
            .unwrap_err();

        assert_eq!(
            err,
            FilterError::PermutationLength {
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn test_fill_rows_visits_every_coordinate() {
        let mut dst = Array3::<u8>::zeros((7, 3, 2));
        let mut seen = Vec::new();

        Tiler::new(2)
            .fill_rows(
                &mut dst,
                Rect::new(1, 2, 2, 4),
                PixelFormat::GrayAlpha,
                |x, y, px| {
                    px[0] = x as u8;
                    px[1] = y as u8;
                },
                &mut |f| seen.push(f),
            )
            .unwrap();

        for y in 2..6 {
            for x in 1..3 {
                assert_eq!(dst[[y, x, 0]], x as u8);
                assert_eq!(dst[[y, x, 1]], y as u8);
            }
        }
        // Outside the region stays untouched.
        assert_eq!(dst[[0, 0, 0]], 0);
        assert_eq!(dst[[6, 0, 1]], 0);
        assert_eq!(*seen.last().unwrap(), 1.0);
    }
}
