//! Explicit chart state, passed by reference to the render loop and surfaces

use crate::config::ChartConfig;
use crate::error::ChartError;
use crate::geometry::{Segment, SegmentId, Vec3};
use crate::grid::{GridLine, GridOverlay, RulerLabel};
use crate::height::{self, HeightSource};
use crate::model::{ChartModel, PriceMarker};
use crate::viewport::{Projection, ViewportAdapter, ViewportState};
use price_feed::PriceSample;
use tracing::debug;

/// Marker line spans the same width as the horizontal grid lines
const MARKER_HALF_SPAN: f64 = 38.0;
const MARKER_DEPTH: f64 = 0.11;
const MARKER_TEXT_X: f64 = 28.0;
/// Marker text sits one unit above its line
const MARKER_TEXT_RISE: f64 = 1.0;

/// Owns everything the chart draws
pub struct ChartContext {
    model: ChartModel,
    grid: GridOverlay,
    viewport: ViewportAdapter,
    heights: Box<dyn HeightSource>,
}

impl ChartContext {
    pub fn new(config: &ChartConfig) -> Result<Self, ChartError> {
        Self::with_height_source(config, height::from_config(config))
    }

    pub fn with_height_source(
        config: &ChartConfig,
        heights: Box<dyn HeightSource>,
    ) -> Result<Self, ChartError> {
        config.validate()?;
        Ok(Self {
            model: ChartModel::new(config.line_caching)?,
            grid: GridOverlay::new(),
            viewport: ViewportAdapter::default(),
            heights,
        })
    }

    /// One append-timer tick: map a height, append (and evict), then point
    /// the marker at the latest feed value.
    pub fn append_tick(&mut self, latest: &PriceSample) -> SegmentId {
        let target = self.heights.next_height(latest);
        let id = self.model.append_sample(target);
        self.model.set_marker_text(latest.value.to_string());

        debug!(
            "[Chart] Appended segment {} at y={} (price {}, {} retained)",
            id,
            target,
            latest.value,
            self.model.len()
        );
        id
    }

    /// Scroll the line strip and the vertical grid lines together
    pub fn update_scroll(&mut self, distance: f64) {
        self.model.update_scroll(distance);
        self.grid.update_scroll(distance);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.viewport.set_pixel_ratio(pixel_ratio);
    }

    pub fn model(&self) -> &ChartModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ChartModel {
        &mut self.model
    }

    pub fn grid(&self) -> &GridOverlay {
        &self.grid
    }

    pub fn viewport(&self) -> &ViewportAdapter {
        &self.viewport
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            model: &self.model,
            grid: &self.grid,
            viewport: &self.viewport,
        }
    }
}

/// Read-only view of one frame
#[derive(Clone, Copy)]
pub struct Scene<'a> {
    model: &'a ChartModel,
    grid: &'a GridOverlay,
    viewport: &'a ViewportAdapter,
}

impl<'a> Scene<'a> {
    /// Segments with the scroll offset applied, oldest first
    pub fn segments(&self) -> impl Iterator<Item = Segment> + 'a {
        self.model.scrolled_segments()
    }

    /// Grid lines with the vertical offset applied
    pub fn grid_lines(&self) -> impl Iterator<Item = GridLine> + 'a {
        self.grid.lines()
    }

    pub fn ruler_labels(&self) -> impl Iterator<Item = &'a RulerLabel> + 'a {
        self.grid.labels()
    }

    pub fn marker(&self) -> &'a PriceMarker {
        self.model.marker()
    }

    /// Endpoints of the dashed price line
    pub fn marker_line(&self) -> (Vec3, Vec3) {
        let y = self.model.marker().y;
        (
            Vec3::new(-MARKER_HALF_SPAN, y, MARKER_DEPTH),
            Vec3::new(MARKER_HALF_SPAN, y, MARKER_DEPTH),
        )
    }

    pub fn marker_text_position(&self) -> Vec3 {
        Vec3::new(
            MARKER_TEXT_X,
            self.model.marker().y + MARKER_TEXT_RISE,
            MARKER_DEPTH,
        )
    }

    pub fn projection(&self) -> Projection {
        self.viewport.projection()
    }

    pub fn viewport(&self) -> &'a ViewportState {
        self.viewport.state()
    }

    pub fn segment_count(&self) -> usize {
        self.model.len()
    }

    pub fn capacity(&self) -> usize {
        self.model.capacity()
    }
}
