//! Terminal render surface (ratatui + crossterm)
//!
//! The chart canvas uses braille cells, so one terminal cell is 2x4 dots and
//! dots are roughly square. Sizes reported to the viewport are in dots.

pub mod ui;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use chart::{ChartError, RenderSurface, Scene, SurfaceEvent};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use parking_lot::Mutex;
use price_feed::FeedHandle;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use ui::{Overlay, FOOTER_HEIGHT, HEADER_HEIGHT};

/// Braille dots per terminal cell
const DOTS_PER_COLUMN: u32 = 2;
const DOTS_PER_ROW: u32 = 4;

/// Borders around the canvas block
const CANVAS_BORDER: u16 = 2;

const HELP: &str = "q/Esc=quit";

/// Chart canvas size in braille dots for a terminal of `columns` x `rows`
pub fn canvas_dots(columns: u16, rows: u16) -> (u32, u32) {
    let width = columns.saturating_sub(CANVAS_BORDER);
    let height = rows.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT + CANVAS_BORDER);
    (
        u32::from(width) * DOTS_PER_COLUMN,
        u32::from(height) * DOTS_PER_ROW,
    )
}

/// Translate a terminal event into a surface event
pub fn map_event(event: Event) -> Option<SurfaceEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(SurfaceEvent::Quit),
            // Raw mode swallows SIGINT, so Ctrl+C arrives as a key
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(SurfaceEvent::Quit)
            }
            _ => None,
        },
        Event::Resize(columns, rows) => {
            let (width, height) = canvas_dots(columns, rows);
            Some(SurfaceEvent::Resize { width, height })
        }
        _ => None,
    }
}

/// Enter raw mode and the alternate screen
pub fn enter() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Restore the terminal to its normal state
pub fn leave(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Latest feed error shown in the header
pub type ErrorSlot = Arc<Mutex<Option<String>>>;

/// Draws chart scenes plus feed status into a ratatui terminal
pub struct TerminalSurface<B: Backend> {
    terminal: Terminal<B>,
    feed: FeedHandle,
    title: String,
    last_error: ErrorSlot,
}

impl<B: Backend> TerminalSurface<B> {
    pub fn new(terminal: Terminal<B>, feed: FeedHandle, title: impl Into<String>) -> Self {
        Self {
            terminal,
            feed,
            title: title.into(),
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Share a slot that was filled before the surface existed
    pub fn with_error_slot(mut self, slot: ErrorSlot) -> Self {
        self.last_error = slot;
        self
    }

    /// Slot the header reads the latest feed error from
    pub fn error_slot(&self) -> ErrorSlot {
        Arc::clone(&self.last_error)
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<B: Backend> RenderSurface for TerminalSurface<B> {
    fn size(&self) -> (u32, u32) {
        self.terminal
            .size()
            .map(|size| canvas_dots(size.width, size.height))
            .unwrap_or((0, 0))
    }

    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), ChartError> {
        let latest = self.feed.latest();
        let status = self.feed.status();
        let last_error = self.last_error.lock().clone();
        let overlay = Overlay {
            title: &self.title,
            latest: &latest,
            status,
            last_error: last_error.as_deref(),
            help: HELP,
        };

        self.terminal
            .draw(|frame| ui::draw(frame, scene, &overlay))?;
        Ok(())
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<Option<SurfaceEvent>, ChartError> {
        if event::poll(timeout)? {
            Ok(map_event(event::read()?))
        } else {
            Ok(None)
        }
    }
}
