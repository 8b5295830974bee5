//! Bounded history of chart segments
//!
//! Each append adds one segment one `step` to the right of the previous one
//! and evicts from the front until at most `capacity` remain. The whole line
//! strip scrolls left by a per-frame offset set from the render loop.

use crate::error::ChartError;
use crate::geometry::{Segment, SegmentId, Vec3};
use std::collections::VecDeque;
use tracing::trace;

/// Horizontal distance between consecutive samples
pub const DEFAULT_STEP: f64 = 1.0;

/// Depth of the line strip (in front of the grid)
pub const LINE_DEPTH: f64 = 0.0;

/// Text shown by the marker before the first append
const MARKER_LOADING_TEXT: &str = "loading...";

/// "Current price" marker: a horizontal line at the last target height with
/// the latest feed value as text.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMarker {
    pub y: f64,
    pub text: String,
}

impl Default for PriceMarker {
    fn default() -> Self {
        Self {
            y: 0.0,
            text: MARKER_LOADING_TEXT.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ChartModel {
    segments: VecDeque<Segment>,
    cursor_x: f64,
    last_y: f64,
    capacity: usize,
    step: f64,
    next_id: u64,
    evicted: u64,
    scroll_offset: f64,
    marker: PriceMarker,
}

impl ChartModel {
    pub fn new(capacity: usize) -> Result<Self, ChartError> {
        Self::with_step(capacity, DEFAULT_STEP)
    }

    pub fn with_step(capacity: usize, step: f64) -> Result<Self, ChartError> {
        if capacity == 0 {
            return Err(ChartError::InvalidCapacity(capacity));
        }
        Ok(Self {
            segments: VecDeque::with_capacity(capacity + 1),
            cursor_x: 0.0,
            last_y: 0.0,
            capacity,
            step,
            next_id: 0,
            evicted: 0,
            scroll_offset: 0.0,
            marker: PriceMarker::default(),
        })
    }

    /// Append one segment ending at `(cursor_x + step, target_height)`.
    ///
    /// The very first append is degenerate (`from == to`) so no line is drawn
    /// from the origin. Evicts the oldest segments once over capacity.
    pub fn append_sample(&mut self, target_height: f64) -> SegmentId {
        let id = SegmentId(self.next_id);
        let to = Vec3::new(self.cursor_x + self.step, target_height, LINE_DEPTH);
        let from = if self.next_id == 0 {
            to
        } else {
            Vec3::new(self.cursor_x, self.last_y, LINE_DEPTH)
        };

        self.segments.push_back(Segment { id, from, to });
        self.next_id += 1;
        self.cursor_x += self.step;
        self.last_y = target_height;
        self.marker.y = target_height;

        while self.segments.len() > self.capacity {
            if let Some(oldest) = self.segments.pop_front() {
                self.evicted += 1;
                trace!("[Chart] Evicted segment {}", oldest.id);
            }
        }

        id
    }

    /// Release one segment. Returns it if it was still retained.
    pub fn remove(&mut self, id: SegmentId) -> Option<Segment> {
        // Ids are handed out in order, so the deque stays sorted
        let index = self.segments.binary_search_by_key(&id, |s| s.id).ok()?;
        self.segments.remove(index)
    }

    /// Retained segments, oldest first, in unscrolled model coordinates
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.segments.iter()
    }

    /// Retained segments, oldest first, with the scroll offset applied
    pub fn scrolled_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        let dx = self.scroll_offset;
        self.segments.iter().map(move |s| s.shifted_x(dx))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn cursor_x(&self) -> f64 {
        self.cursor_x
    }

    pub fn last_y(&self) -> f64 {
        self.last_y
    }

    /// Total appends so far
    pub fn appended(&self) -> u64 {
        self.next_id
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Move the line strip left by `distance`
    pub fn update_scroll(&mut self, distance: f64) {
        self.scroll_offset = -distance;
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn marker(&self) -> &PriceMarker {
        &self.marker
    }

    pub fn set_marker_text(&mut self, text: impl Into<String>) {
        self.marker.text = text.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ends(model: &ChartModel) -> Vec<(f64, f64)> {
        model.segments().map(|s| (s.from.y, s.to.y)).collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            ChartModel::new(0),
            Err(ChartError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn test_first_append_is_degenerate() {
        let mut model = ChartModel::new(5).unwrap();
        model.append_sample(2.0);

        let first = model.segments().next().unwrap();
        assert!(first.is_degenerate());
        assert_eq!(first.to, Vec3::new(1.0, 2.0, LINE_DEPTH));
    }

    #[test]
    fn test_segments_are_contiguous() {
        let mut model = ChartModel::new(10).unwrap();
        for h in [2.0, -1.0, 0.0, 1.0, -2.0] {
            model.append_sample(h);
        }

        let segments: Vec<_> = model.segments().copied().collect();
        for pair in segments.windows(2) {
            assert_eq!(pair[1].from, pair[0].to);
            assert_eq!(pair[1].to.x - pair[1].from.x, DEFAULT_STEP);
        }
        assert_eq!(model.last_y(), -2.0);
    }

    #[test]
    fn test_length_and_cursor_after_each_append() {
        for capacity in [1usize, 2, 3, 7] {
            let mut model = ChartModel::with_step(capacity, 0.5).unwrap();
            for n in 1..=20u32 {
                model.append_sample(f64::from(n % 3));
                assert_eq!(model.len(), (n as usize).min(capacity));
                assert_eq!(model.cursor_x(), f64::from(n) * 0.5);
            }
        }
    }

    #[test]
    fn test_eviction_keeps_most_recent_in_order() {
        let mut model = ChartModel::new(3).unwrap();
        let ids: Vec<_> = (0..6).map(|h| model.append_sample(f64::from(h))).collect();

        let retained: Vec<_> = model.segments().map(|s| s.id).collect();
        assert_eq!(retained, ids[3..].to_vec());
        assert_eq!(model.evicted(), 3);
        assert_eq!(ends(&model), vec![(2.0, 3.0), (3.0, 4.0), (4.0, 5.0)]);
    }

    #[test]
    fn test_remove_by_id() {
        let mut model = ChartModel::new(4).unwrap();
        let a = model.append_sample(0.0);
        let b = model.append_sample(1.0);
        let c = model.append_sample(-1.0);

        assert_eq!(model.remove(b).map(|s| s.id), Some(b));
        assert!(model.remove(b).is_none());
        let left: Vec<_> = model.segments().map(|s| s.id).collect();
        assert_eq!(left, vec![a, c]);

        // Removal does not move the cursor
        assert_eq!(model.cursor_x(), 3.0);
    }

    #[test]
    fn test_scroll_applies_to_rendered_segments() {
        let mut model = ChartModel::new(4).unwrap();
        model.append_sample(0.0);
        model.append_sample(1.0);
        model.update_scroll(1.5);

        assert_eq!(model.scroll_offset(), -1.5);
        let scrolled: Vec<_> = model.scrolled_segments().collect();
        assert_eq!(scrolled[1].from.x, -0.5);
        assert_eq!(scrolled[1].to.x, 0.5);
        // Model coordinates are untouched
        assert_eq!(model.segments().nth(1).unwrap().to.x, 2.0);
    }

    #[test]
    fn test_marker_follows_target_height() {
        let mut model = ChartModel::new(2).unwrap();
        assert_eq!(model.marker().text, "loading...");

        model.append_sample(-2.0);
        model.set_marker_text("64321.10");
        assert_eq!(model.marker().y, -2.0);
        assert_eq!(model.marker().text, "64321.10");
    }
}
