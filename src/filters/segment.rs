//! Variable-width partitioning of a 1-D extent.
//!
//! A row (or column) is split into `segment_count` segments whose widths
//! differ by at most one pixel, with the trailing segments absorbing the
//! rounding remainder. The plan is a pure function of its inputs and is
//! memoized so that transforming thousands of scanlines recomputes nothing.

/// Ordered segment widths summing exactly to the partitioned extent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentPlan {
    extent: usize,
    widths: Vec<usize>,
}

impl SegmentPlan {
    /// Partition `extent` into `segment_count` widths.
    ///
    /// Each step divides the *remaining* extent by the *remaining* segment
    /// count, so the widths always sum to `extent` regardless of
    /// divisibility. A `segment_count` larger than the extent yields
    /// leading zero-width segments; a count below 1 is clamped to 1.
    pub fn compute(extent: usize, segment_count: usize) -> Self {
        let count = segment_count.max(1);
        let mut widths = Vec::with_capacity(count);
        let mut remaining = extent;

        for i in 0..count {
            let width = remaining / (count - i);
            widths.push(width);
            remaining -= width;
        }

        Self { extent, widths }
    }

    pub fn extent(&self) -> usize {
        self.extent
    }

    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    pub fn segment_count(&self) -> usize {
        self.widths.len()
    }
}

struct CacheEntry {
    extent: usize,
    count: usize,
    plan: SegmentPlan,
}

/// Plan factory memoizing the most recently computed plan.
///
/// The cache is an optimization only; recomputing a plan is always safe
/// and yields an identical result.
#[derive(Default)]
pub struct Segmenter {
    cache: Option<CacheEntry>,
}

impl Segmenter {
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// Plan for `(extent, segment_count)`, reusing the cached plan when the
    /// inputs match the previous call.
    pub fn plan(&mut self, extent: usize, segment_count: usize) -> &SegmentPlan {
        let count = segment_count.max(1);

        let hit = matches!(
            &self.cache,
            Some(entry) if entry.extent == extent && entry.count == count
        );
        if hit {
            &self.cache.as_ref().unwrap().plan
        } else {
            let entry = self.cache.insert(CacheEntry {
                extent,
                count,
                plan: SegmentPlan::compute(extent, count),
            });
            &entry.plan
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_sum_to_extent() {
        for extent in 0..64 {
            for count in 1..20 {
                let plan = SegmentPlan::compute(extent, count);
                assert_eq!(
                    plan.widths().iter().sum::<usize>(),
                    extent,
                    "extent={} count={}",
                    extent,
                    count
                );
                assert_eq!(plan.segment_count(), count);
            }
        }
    }

    #[test]
    fn test_known_partitions() {
        assert_eq!(SegmentPlan::compute(10, 4).widths(), &[2, 2, 3, 3]);
        assert_eq!(SegmentPlan::compute(7, 3).widths(), &[2, 2, 3]);
        assert_eq!(SegmentPlan::compute(100, 4).widths(), &[25, 25, 25, 25]);
    }

    #[test]
    fn test_more_segments_than_extent() {
        // Zero-width segments pad the front; not an error.
        assert_eq!(SegmentPlan::compute(3, 5).widths(), &[0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_zero_segment_count_clamped() {
        assert_eq!(SegmentPlan::compute(8, 0).widths(), &[8]);
    }

    #[test]
    fn test_deterministic() {
        let a = SegmentPlan::compute(1023, 17);
        let b = SegmentPlan::compute(1023, 17);
        assert_eq!(a, b);
    }

    #[test]
    fn test_segmenter_reuses_cached_plan() {
        let mut segmenter = Segmenter::new();
        let first = segmenter.plan(40, 3).clone();
        let again = segmenter.plan(40, 3);
        assert_eq!(&first, again);

        // Changing either input invalidates the cache.
        assert_eq!(segmenter.plan(40, 4).segment_count(), 4);
        assert_eq!(segmenter.plan(41, 4).extent(), 41);
    }
}
