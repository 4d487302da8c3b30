//! Checkerboard pattern generation.
//!
//! Purely per-pixel: a coordinate either selects the foreground or the
//! background color, with no cross-pixel state. The regular mode is the
//! block-parity formula; "psychobilly" mode runs both axes through a
//! precomputed triangular run-length table, producing an irregular
//! interference pattern.

use log::debug;
use ndarray::Array3;

use crate::filters::core::{Color, PixelFormat, PixelSink, Rect, Result};
use crate::filters::tiler::Tiler;

/// User-tunable inputs, immutable for one invocation.
#[derive(Clone, Copy, Debug)]
pub struct CheckerboardParams {
    /// Check edge length in pixels; values below 1 clamp to 1.
    pub size: u32,
    pub psychobilly: bool,
}

impl Default for CheckerboardParams {
    fn default() -> Self {
        Self {
            size: 10,
            psychobilly: false,
        }
    }
}

/// Resolved pattern evaluator.
///
/// Built once per invocation; the psychobilly lookup table is precomputed
/// here because `color_at` runs for every pixel of the region.
pub struct CheckPattern {
    size: u32,
    table: Option<Vec<bool>>,
}

impl CheckPattern {
    pub fn new(params: &CheckerboardParams) -> Self {
        let size = params.size.max(1);
        let table = params
            .psychobilly
            .then(|| build_run_table(size.max(2) as usize));

        Self { size, table }
    }

    /// True selects the foreground color.
    pub fn color_at(&self, x: u32, y: u32) -> bool {
        match &self.table {
            Some(table) => in_block(table, x) != in_block(table, y),
            None => (x / self.size) & 1 != (y / self.size) & 1,
        }
    }
}

fn in_block(table: &[bool], pos: u32) -> bool {
    // Wraps at len - 1, not len: the table's final entry is unreachable.
    // Changing the wrap point would change the rendered pattern, so it is
    // kept as is.
    table[pos as usize % (table.len() - 1)]
}

/// Triangular run-length table: runs of length 1, 2, .. size, size - 1,
/// .. 1, alternating the fill value after each run. `size * size` entries.
fn build_run_table(size: usize) -> Vec<bool> {
    let mut table = Vec::with_capacity(size * size);
    let mut cell = true;

    for run in 1..=size {
        for _ in 0..run {
            table.push(cell);
        }
        cell = !cell;
    }
    for run in (1..size).rev() {
        for _ in 0..run {
            table.push(cell);
        }
        cell = !cell;
    }

    table
}

fn fill_pattern<K, P>(
    tiler: &Tiler,
    dst: &mut K,
    region: Rect,
    format: PixelFormat,
    offset: (u32, u32),
    pattern: &CheckPattern,
    foreground: Color,
    background: Color,
    progress: &mut P,
) -> Result<()>
where
    K: PixelSink + ?Sized,
    P: FnMut(f64),
{
    let fg = foreground.resolve(format);
    let bg = background.resolve(format);

    tiler.fill_rows(
        dst,
        region,
        format,
        |x, y, px| {
            let v = pattern.color_at(offset.0 + x, offset.1 + y);
            px.copy_from_slice(if v { fg.as_slice() } else { bg.as_slice() });
        },
        progress,
    )
}

/// Render the pattern over `selection`, writing bounded row chunks to
/// `dst`.
///
/// The selection is intersected with the destination extent; an empty
/// result is a no-op success. `progress` receives a strictly increasing
/// covered-pixel fraction after each chunk, ending at exactly 1.0.
pub fn apply<K, P>(
    dst: &mut K,
    selection: Rect,
    format: PixelFormat,
    params: &CheckerboardParams,
    foreground: Color,
    background: Color,
    progress: &mut P,
) -> Result<()>
where
    K: PixelSink + ?Sized,
    P: FnMut(f64),
{
    let Some(region) = selection.intersect(&dst.extent()) else {
        return Ok(());
    };

    debug!(
        "checkerboard: region={:?} size={} psychobilly={}",
        region, params.size, params.psychobilly
    );

    let pattern = CheckPattern::new(params);
    fill_pattern(
        &Tiler::default(),
        dst,
        region,
        format,
        (0, 0),
        &pattern,
        foreground,
        background,
        progress,
    )
}

/// Render a `width` x `height` pattern buffer from the origin.
pub fn render(
    width: u32,
    height: u32,
    format: PixelFormat,
    params: &CheckerboardParams,
    foreground: Color,
    background: Color,
) -> Result<Array3<u8>> {
    let mut out = Array3::<u8>::zeros((
        height as usize,
        width as usize,
        format.bytes_per_pixel(),
    ));

    apply(
        &mut out,
        Rect::of_extent(width, height),
        format,
        params,
        foreground,
        background,
        &mut |_| {},
    )?;

    Ok(out)
}

/// Render a thumbnail window of the pattern anchored at `origin` in image
/// coordinates.
///
/// Single-pass chunking; the output is byte-identical to the matching
/// window of a full-resolution render.
pub fn render_preview(
    origin: (u32, u32),
    width: u32,
    height: u32,
    format: PixelFormat,
    params: &CheckerboardParams,
    foreground: Color,
    background: Color,
) -> Result<Array3<u8>> {
    let mut out = Array3::<u8>::zeros((
        height as usize,
        width as usize,
        format.bytes_per_pixel(),
    ));
    let pattern = CheckPattern::new(params);

    fill_pattern(
        &Tiler::single_pass(),
        &mut out,
        Rect::of_extent(width, height),
        format,
        origin,
        &pattern,
        foreground,
        background,
        &mut |_| {},
    )?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular(size: u32) -> CheckPattern {
        CheckPattern::new(&CheckerboardParams {
            size,
            psychobilly: false,
        })
    }

    fn psycho(size: u32) -> CheckPattern {
        CheckPattern::new(&CheckerboardParams {
            size,
            psychobilly: true,
        })
    }

    #[test]
    fn test_regular_matches_analytic_formula() {
        let pattern = regular(10);

        assert!(!pattern.color_at(5, 5));
        assert!(pattern.color_at(15, 5));

        for y in 0..40 {
            for x in 0..40 {
                let expected = (x / 10) % 2 != (y / 10) % 2;
                assert_eq!(pattern.color_at(x, y), expected, "x={} y={}", x, y);
            }
        }
    }

    #[test]
    fn test_size_below_one_is_clamped() {
        let pattern = regular(0);

        // Clamped to 1: a one-pixel checkerboard.
        assert!(!pattern.color_at(0, 0));
        assert!(pattern.color_at(1, 0));
    }

    #[test]
    fn test_run_table_shape() {
        // size 3: runs 1,2,3 then 2,1 -> 9 entries.
        assert_eq!(
            build_run_table(3),
            vec![true, false, false, true, true, true, false, false, true]
        );
    }

    #[test]
    fn test_psychobilly_size_one_equals_size_two() {
        let fmt = PixelFormat::Gray;
        let one = render(
            16,
            16,
            fmt,
            &CheckerboardParams {
                size: 1,
                psychobilly: true,
            },
            Color::WHITE,
            Color::BLACK,
        )
        .unwrap();
        let two = render(
            16,
            16,
            fmt,
            &CheckerboardParams {
                size: 2,
                psychobilly: true,
            },
            Color::WHITE,
            Color::BLACK,
        )
        .unwrap();

        assert_eq!(one, two);
    }

    #[test]
    fn test_psychobilly_wraps_one_short() {
        // size 3: table has 9 entries but indexing wraps at 8, so
        // position 9 reads entry 1 (false), not entry 0 (true).
        let pattern = psycho(3);

        assert!(pattern.color_at(9, 0));
    }

    #[test]
    fn test_render_resolves_colors_per_format() {
        let out = render(
            4,
            4,
            PixelFormat::Gray,
            &CheckerboardParams {
                size: 2,
                psychobilly: false,
            },
            Color::new(255, 0, 0, 255), // luminance 54
            Color::BLACK,
        )
        .unwrap();

        assert_eq!(out[[0, 0, 0]], 0);
        assert_eq!(out[[0, 2, 0]], 54);
    }

    #[test]
    fn test_preview_matches_full_render() {
        let p = CheckerboardParams {
            size: 3,
            psychobilly: true,
        };
        let full = render(30, 30, PixelFormat::Rgb, &p, Color::WHITE, Color::BLACK).unwrap();
        let preview =
            render_preview((0, 0), 30, 30, PixelFormat::Rgb, &p, Color::WHITE, Color::BLACK)
                .unwrap();

        assert_eq!(full, preview);
    }

    #[test]
    fn test_preview_window_matches_render_slice() {
        let p = CheckerboardParams::default();
        let full = render(30, 30, PixelFormat::Rgb, &p, Color::WHITE, Color::BLACK).unwrap();
        let preview =
            render_preview((5, 7), 10, 10, PixelFormat::Rgb, &p, Color::WHITE, Color::BLACK)
                .unwrap();

        for y in 0..10 {
            for x in 0..10 {
                for c in 0..3 {
                    assert_eq!(preview[[y, x, c]], full[[y + 7, x + 5, c]]);
                }
            }
        }
    }

    #[test]
    fn test_progress_ends_at_one() {
        let mut dst = Array3::<u8>::zeros((100, 8, 3));
        let mut seen = Vec::new();

        apply(
            &mut dst,
            Rect::of_extent(8, 100),
            PixelFormat::Rgb,
            &CheckerboardParams::default(),
            Color::WHITE,
            Color::BLACK,
            &mut |f| seen.push(f),
        )
        .unwrap();

        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*seen.last().unwrap(), 1.0);
    }

    #[test]
    fn test_empty_selection_is_noop() {
        let mut dst = Array3::<u8>::zeros((10, 10, 3));
        let mut calls = 0usize;

        apply(
            &mut dst,
            Rect::new(100, 100, 5, 5),
            PixelFormat::Rgb,
            &CheckerboardParams::default(),
            Color::WHITE,
            Color::BLACK,
            &mut |_| calls += 1,
        )
        .unwrap();

        assert_eq!(calls, 0);
        assert!(dst.iter().all(|&v| v == 0));
    }
}
