//! Top header (title, capture controls, display mode) and the status line
//! underneath it (source, last cycle, per-field freshness).

use chrono::Local;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::store::{FieldHealth, StoreHealth};
use crate::ui::theme::{Theme, START_GREEN, STOP_RED};
use crate::ui::util::ago;
use crate::view::DisplayMode;

/// Start/stop sniffing indicator. Local only; nothing is sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureControl {
    #[default]
    Stopped,
    Running,
}

pub fn draw_header(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    capture: CaptureControl,
    mode: DisplayMode,
    theme: &Theme,
) {
    let (cap_txt, cap_color) = match capture {
        CaptureControl::Running => ("● sniffing", START_GREEN),
        CaptureControl::Stopped => ("○ idle", STOP_RED),
    };
    let mode_txt = if mode.is_dark() { "☀️ [d] light mode" } else { "🌙 [d] dark mode" };
    let line = Line::from(vec![
        Span::styled(
            "📡 Packet Analyzer Dashboard",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(cap_txt, Style::default().fg(cap_color)),
        Span::raw("  "),
        Span::styled("[s] start  [x] stop  ", theme.muted),
        Span::styled(mode_txt, theme.muted),
        Span::styled("  (press 'q' to quit)", theme.muted),
    ]);
    let rule = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.border);
    f.render_widget(Paragraph::new(line).block(rule), area);
}

fn field_span(name: &str, h: &FieldHealth, theme: &Theme) -> Span<'static> {
    let now = Local::now();
    match &h.last_error {
        None => Span::styled(format!("{name} ✓ {}", ago(h.last_ok, now)), theme.muted),
        Some(e) => Span::styled(
            format!("{name} ⚠ stale ({e}), last ok {}", ago(h.last_ok, now)),
            theme.stale,
        ),
    }
}

pub fn draw_status(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    source: &str,
    last_cycle: Option<u64>,
    health: &StoreHealth,
    theme: &Theme,
) {
    let cycle = match last_cycle {
        Some(c) => format!("cycle {c}"),
        None => "connecting...".into(),
    };
    let sep = || Span::styled(" | ", theme.muted);
    let line = Line::from(vec![
        Span::styled(format!("{source} · {cycle}"), theme.muted),
        sep(),
        field_span("packets", &health.records, theme),
        sep(),
        field_span("timeline", &health.timeline, theme),
        sep(),
        field_span("protocols", &health.distribution, theme),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
