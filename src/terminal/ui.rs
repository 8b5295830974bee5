//! Chart screen layout: header, canvas, footer

use chart::{Orientation, Scene};
use price_feed::{ConnectionState, FeedStatus, PriceSample};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line},
        Block, Borders, Paragraph,
    },
    Frame,
};

/// Rows taken by the header and footer blocks
pub const HEADER_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 3;

const BACKGROUND: Color = Color::Rgb(15, 15, 15);
const SEGMENT_COLOR: Color = Color::Rgb(200, 200, 200);
const HORIZONTAL_GRID_COLOR: Color = Color::Rgb(0, 0, 111);
const VERTICAL_GRID_COLOR: Color = Color::Rgb(90, 0, 0);
const RULER_COLOR: Color = Color::Rgb(50, 175, 50);
const MARKER_COLOR: Color = Color::Rgb(0, 255, 0);

/// Dash and gap length of the price marker, in world units
const MARKER_DASH: f64 = 1.5;
const MARKER_GAP: f64 = 1.0;

/// Everything the header and footer show besides the scene
pub struct Overlay<'a> {
    pub title: &'a str,
    pub latest: &'a PriceSample,
    pub status: FeedStatus,
    pub last_error: Option<&'a str>,
    pub help: &'a str,
}

/// Draw the main UI layout
pub fn draw(frame: &mut Frame, scene: &Scene<'_>, overlay: &Overlay<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(frame.area());

    draw_header(frame, overlay, chunks[0]);
    draw_chart(frame, scene, chunks[1]);
    draw_footer(frame, scene, overlay, chunks[2]);
}

fn status_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Connecting | ConnectionState::Reconnecting => Color::Yellow,
        ConnectionState::Disconnected | ConnectionState::ShuttingDown => Color::Red,
    }
}

fn draw_header(frame: &mut Frame, overlay: &Overlay<'_>, area: Rect) {
    let status = overlay.status;
    let price = if overlay.latest.is_placeholder() {
        format!("{} (waiting)", overlay.latest.value)
    } else {
        overlay.latest.value.to_string()
    };

    let mut header_text = format!(
        " Status: {} | Price: {} | Samples: {} | Dropped: {} | Reconnects: {}",
        status.connection,
        price,
        status.samples_published,
        status.messages_dropped,
        status.reconnects
    );
    if let Some(error) = overlay.last_error {
        header_text.push_str(&format!(" | Last error: {}", error));
    }

    let header = Paragraph::new(header_text)
        .style(Style::default().fg(status_color(status.connection)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", overlay.title)),
        );

    frame.render_widget(header, area);
}

fn draw_chart(frame: &mut Frame, scene: &Scene<'_>, area: Rect) {
    let projection = scene.projection();

    let grid: Vec<Line> = scene
        .grid_lines()
        .map(|line| {
            let color = match line.orientation {
                Orientation::Horizontal => HORIZONTAL_GRID_COLOR,
                Orientation::Vertical => VERTICAL_GRID_COLOR,
            };
            Line::new(line.from.x, line.from.y, line.to.x, line.to.y, color)
        })
        .collect();

    let labels: Vec<(f64, f64, String)> = scene
        .ruler_labels()
        .map(|label| (label.position.x, label.position.y, label.value.to_string()))
        .collect();

    let segments: Vec<Line> = scene
        .segments()
        .filter(|segment| !segment.is_degenerate())
        .map(|s| Line::new(s.from.x, s.from.y, s.to.x, s.to.y, SEGMENT_COLOR))
        .collect();

    let (marker_from, marker_to) = scene.marker_line();
    let dashes = dashed(marker_from.x, marker_to.x, marker_from.y);
    let marker_text = scene.marker_text_position();
    let marker_label = scene.marker().text.clone();

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL))
        .background_color(BACKGROUND)
        .marker(Marker::Braille)
        .x_bounds([projection.left, projection.right])
        .y_bounds([projection.bottom, projection.top])
        .paint(move |ctx| {
            for line in &grid {
                ctx.draw(line);
            }
            for (x, y, text) in &labels {
                ctx.print(*x, *y, ratatui::text::Line::styled(text.clone(), RULER_COLOR));
            }
            ctx.layer();

            for line in &segments {
                ctx.draw(line);
            }
            for line in &dashes {
                ctx.draw(line);
            }
            ctx.print(
                marker_text.x,
                marker_text.y,
                ratatui::text::Line::styled(marker_label.clone(), Color::White),
            );
        });

    frame.render_widget(canvas, area);
}

/// Horizontal dashed line from `x_start` to `x_end` at `y`
fn dashed(x_start: f64, x_end: f64, y: f64) -> Vec<Line> {
    let mut dashes = Vec::new();
    let mut x = x_start;
    while x < x_end {
        let end = (x + MARKER_DASH).min(x_end);
        dashes.push(Line::new(x, y, end, y, MARKER_COLOR));
        x = end + MARKER_GAP;
    }
    dashes
}

fn draw_footer(frame: &mut Frame, scene: &Scene<'_>, overlay: &Overlay<'_>, area: Rect) {
    let footer_text = format!(
        " Segments: {}/{} | {}",
        scene.segment_count(),
        scene.capacity(),
        overlay.help
    );

    let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
