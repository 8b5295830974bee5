//! Static reference grid
//!
//! Built once. Horizontal lines (with price-ruler labels) never move; the
//! vertical lines only shift by `-(distance mod period)`, which looks like an
//! endless scroll while the geometry stays fixed.

use crate::geometry::Vec3;

/// Lines per orientation
pub const GRID_LINE_COUNT: usize = 21;

/// Horizontal distance after which the vertical-line pattern repeats
pub const GRID_PERIOD: f64 = 4.0;

/// Grid sits just behind the line strip
pub const GRID_DEPTH: f64 = -0.001;

const HORIZONTAL_SPACING: f64 = 2.0;
const HORIZONTAL_HALF_SPAN: f64 = 38.0;
const VERTICAL_HALF_SPAN: f64 = 20.0;
const FIRST_ROW_Y: f64 = -20.0;
const FIRST_COLUMN_X: f64 = -40.0;

const RULER_BASE: i64 = 16_900;
const RULER_STEP: i64 = 25;
const RULER_SHIFT: i64 = -200;
const RULER_X: f64 = 36.08;
const RULER_Y_OFFSET: f64 = -17.61;
const RULER_DEPTH: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Synthetic price printed next to a horizontal line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerLabel {
    pub value: i64,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub orientation: Orientation,
    /// y for horizontal lines, x for vertical lines (before scrolling)
    pub position: f64,
    pub from: Vec3,
    pub to: Vec3,
    pub label: Option<RulerLabel>,
}

impl GridLine {
    fn horizontal(index: usize) -> Self {
        let i = index as f64;
        let y = FIRST_ROW_Y + HORIZONTAL_SPACING * i;
        let label = RulerLabel {
            value: RULER_BASE + RULER_STEP * index as i64 + RULER_SHIFT,
            position: Vec3::new(RULER_X, HORIZONTAL_SPACING * i + RULER_Y_OFFSET, RULER_DEPTH),
        };
        Self {
            orientation: Orientation::Horizontal,
            position: y,
            from: Vec3::new(-HORIZONTAL_HALF_SPAN, y, GRID_DEPTH),
            to: Vec3::new(HORIZONTAL_HALF_SPAN, y, GRID_DEPTH),
            label: Some(label),
        }
    }

    fn vertical(index: usize) -> Self {
        let x = FIRST_COLUMN_X + GRID_PERIOD * index as f64;
        Self {
            orientation: Orientation::Vertical,
            position: x,
            from: Vec3::new(x, -VERTICAL_HALF_SPAN, GRID_DEPTH),
            to: Vec3::new(x, VERTICAL_HALF_SPAN, GRID_DEPTH),
            label: None,
        }
    }

    /// Copy moved horizontally by `dx`
    pub fn shifted_x(&self, dx: f64) -> Self {
        Self {
            from: self.from.shifted_x(dx),
            to: self.to.shifted_x(dx),
            ..*self
        }
    }
}

/// Vertical-line offset for a scroll distance; periodic in `GRID_PERIOD`
pub fn scroll_offset(distance: f64, period: f64) -> f64 {
    -distance.rem_euclid(period)
}

#[derive(Debug, Clone)]
pub struct GridOverlay {
    horizontal: Vec<GridLine>,
    vertical: Vec<GridLine>,
    period: f64,
    offset: f64,
}

impl Default for GridOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl GridOverlay {
    pub fn new() -> Self {
        Self {
            horizontal: (0..GRID_LINE_COUNT).map(GridLine::horizontal).collect(),
            vertical: (0..GRID_LINE_COUNT).map(GridLine::vertical).collect(),
            period: GRID_PERIOD,
            offset: 0.0,
        }
    }

    pub fn update_scroll(&mut self, distance: f64) {
        self.offset = scroll_offset(distance, self.period);
    }

    /// Current vertical-line offset, in `(-period, 0]`
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn horizontal(&self) -> &[GridLine] {
        &self.horizontal
    }

    /// Vertical lines at their unscrolled positions
    pub fn vertical(&self) -> &[GridLine] {
        &self.vertical
    }

    /// All lines as they should be drawn this frame
    pub fn lines(&self) -> impl Iterator<Item = GridLine> + '_ {
        let dx = self.offset;
        self.horizontal
            .iter()
            .copied()
            .chain(self.vertical.iter().map(move |line| line.shifted_x(dx)))
    }

    pub fn labels(&self) -> impl Iterator<Item = &RulerLabel> + '_ {
        self.horizontal.iter().filter_map(|line| line.label.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_reference_scene() {
        let grid = GridOverlay::new();
        assert_eq!(grid.horizontal().len(), GRID_LINE_COUNT);
        assert_eq!(grid.vertical().len(), GRID_LINE_COUNT);

        assert_eq!(grid.horizontal()[0].position, -20.0);
        assert_eq!(grid.horizontal()[20].position, 20.0);
        assert_eq!(grid.horizontal()[0].from.x, -38.0);
        assert_eq!(grid.vertical()[0].position, -40.0);
        assert_eq!(grid.vertical()[20].position, 40.0);
        assert_eq!(grid.vertical()[3].from.y, -20.0);
        assert!(grid.lines().all(|l| l.from.z == GRID_DEPTH));
    }

    #[test]
    fn test_ruler_labels() {
        let grid = GridOverlay::new();
        let labels: Vec<_> = grid.labels().collect();
        assert_eq!(labels.len(), GRID_LINE_COUNT);
        assert_eq!(labels[0].value, 16_700);
        assert_eq!(labels[1].value, 16_725);
        assert_eq!(labels[20].value, 17_200);
        assert!((labels[0].position.y - -17.61).abs() < 1e-9);
        assert!((labels[10].position.y - 2.39).abs() < 1e-9);
        assert_eq!(labels[0].position.x, 36.08);
        assert!(grid.vertical().iter().all(|l| l.label.is_none()));
    }

    #[test]
    fn test_offset_is_periodic() {
        for k in 0..64 {
            let distance = f64::from(k) * 0.25;
            assert_eq!(
                scroll_offset(distance, GRID_PERIOD),
                scroll_offset(distance + GRID_PERIOD, GRID_PERIOD),
                "distance {}",
                distance
            );
        }
    }

    #[test]
    fn test_only_vertical_lines_scroll() {
        let mut grid = GridOverlay::new();
        grid.update_scroll(5.5);
        assert_eq!(grid.offset(), -1.5);

        let lines: Vec<_> = grid.lines().collect();
        let (horizontal, vertical): (Vec<&GridLine>, Vec<&GridLine>) = lines
            .iter()
            .partition(|l| l.orientation == Orientation::Horizontal);
        assert!(horizontal.iter().all(|l| l.from.x == -38.0));
        assert_eq!(vertical[0].from.x, -41.5);
        assert_eq!(vertical[0].position, -40.0);
    }

    #[test]
    fn test_offset_range() {
        let mut grid = GridOverlay::new();
        for distance in [0.0, 3.99, 4.0, 123.456] {
            grid.update_scroll(distance);
            assert!(grid.offset() <= 0.0 && grid.offset() > -GRID_PERIOD);
        }
    }
}
