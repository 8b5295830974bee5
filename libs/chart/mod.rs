//! # Chart
//!
//! Bounded-history streaming line chart, independent of any drawing backend.
//!
//! - [`ChartModel`]: FIFO history of segments, cursor, scroll offset and the
//!   current-price marker
//! - [`GridOverlay`]: fixed reference grid whose vertical lines wrap every
//!   grid period
//! - [`ViewportAdapter`]: surface size to orthographic projection
//! - [`RenderLoop`]: frame clock plus an independent append timer
//! - [`ChartContext`]: owns all of the above; surfaces draw its [`Scene`]
//!
//! ## Example
//!
//! ```rust,ignore
//! let config = ChartConfig::default();
//! let mut ctx = ChartContext::new(&config)?;
//! let mut render_loop = RenderLoop::new(&config, ctx.model().step());
//! render_loop.run(&mut ctx, &mut surface, || feed.latest(), &keep_running)?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod height;
pub mod model;
pub mod render_loop;
pub mod viewport;

pub use config::{ChartConfig, ConfigError, HeightMode, TimeStepMode};
pub use context::{ChartContext, Scene};
pub use error::ChartError;
pub use geometry::{Segment, SegmentId, Vec3};
pub use grid::{GridLine, GridOverlay, Orientation, RulerLabel};
pub use height::{HeightSource, PriceHeight, RandomHeight};
pub use model::{ChartModel, PriceMarker};
pub use render_loop::{
    AppendTimer, FrameReport, LoopState, RenderLoop, RenderSurface, SurfaceEvent, TimeStep,
};
pub use viewport::{Projection, ViewportAdapter, ViewportState};

/// Type alias for Result with ChartError
pub type Result<T> = std::result::Result<T, ChartError>;
