//! "Blinds" distortion: each scanline shrinks around per-segment hinge
//! points, as though the image were painted on window blinds being opened.
//!
//! The line is split into variable-width segments (see
//! [`crate::filters::segment`]); within each segment the midpoint pixel
//! stays anchored and the two halves pull toward it by an amount scaled by
//! the displacement angle. The vertical orientation transforms every row
//! directly; the horizontal orientation runs the identical routine over a
//! synthetic row-index array and then copies whole rows through the
//! resulting permutation.

use log::debug;
use ndarray::{Array3, ArrayView3};

use crate::filters::core::{Color, PixelFormat, PixelSink, PixelSource, Rect, Result};
use crate::filters::segment::{SegmentPlan, Segmenter};
use crate::filters::tiler::Tiler;

/// Upper bound on the segment count, matching the host parameter range.
pub const MAX_SEGMENTS: u32 = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Slats run horizontally: rows are permuted through the segment map.
    Horizontal,
    /// Slats run vertically: each row is transformed along its length.
    Vertical,
}

/// User-tunable inputs, immutable for one invocation.
///
/// Out-of-range values are clamped, never rejected.
#[derive(Clone, Copy, Debug)]
pub struct BlindsParams {
    /// Displacement angle in degrees, 0-360.
    pub displacement: u32,
    /// Number of segments, 1-1024.
    pub segments: u32,
    pub orientation: Orientation,
    /// Resolve the background with alpha forced to 0.
    pub transparent_bg: bool,
}

impl Default for BlindsParams {
    fn default() -> Self {
        Self {
            displacement: 30,
            segments: 3,
            orientation: Orientation::Horizontal,
            transparent_bg: false,
        }
    }
}

impl BlindsParams {
    fn displacement_deg(&self) -> f64 {
        f64::from(self.displacement.min(360))
    }

    fn segment_count(&self) -> usize {
        self.segments.clamp(1, MAX_SEGMENTS) as usize
    }
}

/// Shrink one line around the plan's segment midpoints.
///
/// Generic over the element type so the same routine serves pixel rows
/// (`u8` elements, `values_per_px` = bytes per pixel) and the horizontal
/// orientation's row-index array (`u32` elements, background sentinel 0).
///
/// `src` and `dst` hold `extent` pixels of `values_per_px` values each;
/// `background` is one pixel. Every destination pixel is written: the line
/// is background-filled first, then the hinge and displaced copies land on
/// top, clipped to their segment.
pub(crate) fn shrink_line<T: Copy>(
    src: &[T],
    dst: &mut [T],
    extent: usize,
    values_per_px: usize,
    background: &[T],
    plan: &SegmentPlan,
    displacement_deg: f64,
) {
    let vpp = values_per_px;
    debug_assert_eq!(background.len(), vpp);
    debug_assert_eq!(plan.extent(), extent);

    for px in dst[..extent * vpp].chunks_exact_mut(vpp) {
        px.copy_from_slice(background);
    }

    if extent == 0 {
        return;
    }

    // Hinge pixels first: the midpoint of every segment stays anchored.
    let mut avail = 0usize;
    for &w in plan.widths() {
        let point = avail + w / 2;
        if point < extent {
            dst[point * vpp..(point + 1) * vpp].copy_from_slice(&src[point * vpp..(point + 1) * vpp]);
        }
        avail += w;
    }

    // Inward displacement ramp; zero at angle 0, growing with
    // 1 - |cos(angle)| up to a full half-segment.
    let ang = 1.0 - displacement_deg.to_radians().cos().abs();

    let mut avail = 0usize;
    for &w in plan.widths() {
        let half = w / 2;
        for i in 0..half {
            let dx = (ang * (half - i) as f64).round() as usize;

            let left_src = avail + i;
            let left_dst = (avail + i + dx).min(avail + w - 1);
            dst[left_dst * vpp..(left_dst + 1) * vpp]
                .copy_from_slice(&src[left_src * vpp..(left_src + 1) * vpp]);

            let right_src = avail + w - 1 - i;
            let right_dst = (avail + w - 1 - i).saturating_sub(dx).max(avail);
            dst[right_dst * vpp..(right_dst + 1) * vpp]
                .copy_from_slice(&src[right_src * vpp..(right_src + 1) * vpp]);
        }
        avail += w;
    }
}

/// Apply the blinds transform over `selection`, streaming bounded chunks
/// from `src` into `dst`.
///
/// The selection is intersected with the source extent; an empty result is
/// a no-op success. `progress` receives a strictly increasing fraction
/// after each chunk, ending at exactly 1.0. Pixels outside the selection
/// are never written.
pub fn apply<S, K, P>(
    src: &S,
    dst: &mut K,
    selection: Rect,
    format: PixelFormat,
    params: &BlindsParams,
    background: Color,
    progress: &mut P,
) -> Result<()>
where
    S: PixelSource + ?Sized,
    K: PixelSink + ?Sized,
    P: FnMut(f64),
{
    apply_with(&Tiler::default(), src, dst, selection, format, params, background, progress)
}

fn apply_with<S, K, P>(
    tiler: &Tiler,
    src: &S,
    dst: &mut K,
    selection: Rect,
    format: PixelFormat,
    params: &BlindsParams,
    background: Color,
    progress: &mut P,
) -> Result<()>
where
    S: PixelSource + ?Sized,
    K: PixelSink + ?Sized,
    P: FnMut(f64),
{
    let Some(region) = selection.intersect(&src.extent()) else {
        return Ok(());
    };

    let bg_color = if params.transparent_bg {
        background.transparent()
    } else {
        background
    };
    let bg = bg_color.resolve(format);
    let angle = params.displacement_deg();
    let mut segmenter = Segmenter::new();

    debug!(
        "blinds: region={:?} segments={} displacement={} orientation={:?}",
        region,
        params.segment_count(),
        params.displacement,
        params.orientation
    );

    match params.orientation {
        Orientation::Vertical => {
            let width = region.width as usize;
            let bpp = format.bytes_per_pixel();
            let plan = segmenter.plan(width, params.segment_count());

            tiler.transform_rows(
                src,
                dst,
                region,
                format,
                |s, d| shrink_line(s, d, width, bpp, bg.as_slice(), plan, angle),
                progress,
            )
        }
        Orientation::Horizontal => {
            // Run the shrink over a synthetic index line once; the result
            // maps every destination row to a source row, with 0 marking
            // background rows.
            let height = region.height as usize;
            let plan = segmenter.plan(height, params.segment_count());

            let indices: Vec<u32> = (1..=height as u32).collect();
            let mut permutation = vec![0u32; height];
            shrink_line(&indices, &mut permutation, height, 1, &[0u32], plan, angle);

            tiler.copy_permuted_rows(src, dst, region, format, &permutation, bg.as_slice(), progress)
        }
    }
}

/// Transform a whole image, returning the distorted copy.
///
/// Channel count (1-4) selects the pixel format.
pub fn render(
    src: ArrayView3<u8>,
    params: &BlindsParams,
    background: Color,
) -> Result<Array3<u8>> {
    let (height, width, channels) = src.dim();
    let format = PixelFormat::from_channels(channels)?;
    let mut out = src.to_owned();

    apply_with(
        &Tiler::default(),
        &src,
        &mut out,
        Rect::of_extent(width as u32, height as u32),
        format,
        params,
        background,
        &mut |_| {},
    )?;

    Ok(out)
}

/// Transform a thumbnail for interactive feedback.
///
/// Runs the identical per-line logic as [`render`] with chunking
/// degenerated to a single pass; at equal resolution the output is
/// byte-identical to the full path.
pub fn render_preview(
    thumb: ArrayView3<u8>,
    params: &BlindsParams,
    background: Color,
) -> Result<Array3<u8>> {
    let (height, width, channels) = thumb.dim();
    let format = PixelFormat::from_channels(channels)?;
    let mut out = thumb.to_owned();

    apply_with(
        &Tiler::single_pass(),
        &thumb,
        &mut out,
        Rect::of_extent(width as u32, height as u32),
        format,
        params,
        background,
        &mut |_| {},
    )?;

    Ok(out)
}
