//! App state and main loop: input handling, merging poll cycles, and drawing.

use std::{io, time::Duration};

use anyhow::Context;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::DataSource;
use crate::poller::Poller;
use crate::store::{CycleOutcome, FieldStatus, SnapshotStore};
use crate::ui::distribution::draw_distribution;
use crate::ui::header::{draw_header, draw_status, CaptureControl};
use crate::ui::table::{
    draw_packet_table, table_clamp, table_handle_key, table_handle_mouse, table_page_size,
};
use crate::ui::theme::Theme;
use crate::ui::timeline::draw_timeline;
use crate::view::{bind, DisplayMode};

// Input wait per loop turn; also bounds how late a finished cycle is drawn.
const INPUT_POLL: Duration = Duration::from_millis(50);

pub struct App {
    // Single writer/reader of the snapshot; lives on the UI loop only
    store: SnapshotStore,

    mode: DisplayMode,
    capture: CaptureControl,
    should_quit: bool,

    source: String,
    pub table_scroll: usize,
    last_table_area: Option<Rect>,
}

impl App {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            store: SnapshotStore::new(),
            mode,
            capture: CaptureControl::default(),
            should_quit: false,
            source: String::new(),
            table_scroll: 0,
            last_table_area: None,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn capture(&self) -> CaptureControl {
        self.capture
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn run<S: DataSource + 'static>(
        &mut self,
        source: S,
        interval: Duration,
    ) -> anyhow::Result<()> {
        self.source = source.description();
        let mut poller = Poller::new(source, interval);
        let mut rx = poller.start()?;
        info!(
            source = %self.source,
            period_ms = poller.period().as_millis() as u64,
            "polling started"
        );

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal, &mut rx).await;

        // Stop polling before anything else so no late cycle lands on screen
        poller.stop().await;
        self.store.seal();
        while let Ok(late) = rx.try_recv() {
            self.apply(late);
        }

        // Teardown
        disable_raw_mode()?;
        let backend = terminal.backend_mut();
        execute!(backend, DisableMouseCapture, LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        rx: &mut mpsc::Receiver<CycleOutcome>,
    ) -> anyhow::Result<()> {
        loop {
            // Input
            while event::poll(INPUT_POLL).context("polling terminal input")? {
                match event::read()? {
                    Event::Key(k) => self.handle_key(k),
                    Event::Mouse(m) => {
                        if let Some(area) = self.last_table_area {
                            table_handle_mouse(&mut self.table_scroll, m, area);
                            self.clamp_scroll();
                        }
                    }
                    _ => {}
                }
            }
            if self.should_quit {
                break;
            }

            // Finished cycles
            loop {
                match rx.try_recv() {
                    Ok(outcome) => self.apply(outcome),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        warn!("poll loop exited unexpectedly");
                        self.should_quit = true;
                        break;
                    }
                }
            }

            terminal.draw(|f| self.draw(f))?;

            // Yield so the poll task gets a turn on a busy runtime
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    /// Merge one cycle into the store and report per-field failures.
    pub fn apply(&mut self, outcome: CycleOutcome) {
        match self.store.merge(outcome) {
            Ok(report) => {
                for (field, status) in report.fields() {
                    if let FieldStatus::Stale(e) = status {
                        warn!(
                            cycle = report.cycle,
                            field,
                            error = %e,
                            "fetch failed, keeping previous value"
                        );
                    }
                }
                debug!(cycle = report.cycle, "cycle merged");
                self.clamp_scroll();
            }
            Err(e) => debug!(error = %e, "dropping cycle outcome"),
        }
    }

    pub fn handle_key(&mut self, k: KeyEvent) {
        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                self.mode = self.mode.toggled();
                info!(dark = self.mode.is_dark(), "display mode toggled");
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.capture = CaptureControl::Running,
            KeyCode::Char('x') | KeyCode::Char('X') => self.capture = CaptureControl::Stopped,
            _ => {
                let page = self.last_table_area.map(table_page_size).unwrap_or(10);
                if table_handle_key(&mut self.table_scroll, k, page) {
                    self.clamp_scroll();
                }
            }
        }
    }

    fn clamp_scroll(&mut self) {
        let page = self.last_table_area.map(table_page_size).unwrap_or(10);
        table_clamp(&mut self.table_scroll, self.store.current().records.len(), page);
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();
        let view = bind(self.store.current(), self.mode);
        let theme = Theme::for_mode(view.mode);
        f.render_widget(Block::default().style(theme.base), area);

        // Root rows: header, status, charts, packet table
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Percentage(40),
                Constraint::Min(6),
            ])
            .split(area);

        draw_header(f, rows[0], self.capture, view.mode, &theme);
        draw_status(
            f,
            rows[1],
            &self.source,
            self.store.last_cycle(),
            self.store.health(),
            &theme,
        );

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[2]);
        draw_distribution(f, charts[0], &view.slices, &theme);
        draw_timeline(f, charts[1], &view.timeline, &theme);

        // Cache for input handlers
        self.last_table_area = Some(rows[3]);
        self.clamp_scroll();
        draw_packet_table(f, rows[3], &view.rows, self.table_scroll, &theme);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(DisplayMode::default())
    }
}
