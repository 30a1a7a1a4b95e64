//! Captured packets table with zebra striping, keyboard/mouse scrolling, and a scrollbar.

use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::ui::theme::{Theme, SB_ARROW, SB_THUMB, SB_TRACK};
use crate::ui::util::truncate_middle;
use crate::view::TableRow;

const HEADERS: [&str; 6] = ["ID", "Source IP", "Dest IP", "Protocol", "Summary", "Time"];

// Header widths shared by drawing and page-size math.
const COLS: [Constraint; 6] = [
    Constraint::Length(8),      // ID
    Constraint::Length(16),     // Source IP
    Constraint::Length(16),     // Dest IP
    Constraint::Length(9),      // Protocol
    Constraint::Percentage(50), // Summary
    Constraint::Length(20),     // Time
];

// borders (2) + header (1)
const CHROME_ROWS: u16 = 3;

/// Rows visible at once for a table drawn in `area`.
pub fn table_page_size(area: Rect) -> usize {
    area.height.saturating_sub(CHROME_ROWS).max(1) as usize
}

pub fn draw_packet_table(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    rows: &[TableRow],
    scroll_offset: usize,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(format!("📋 Captured Packets ({})", rows.len()));
    f.render_widget(block, area);

    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    if inner.height < 1 || inner.width < 3 {
        return;
    }
    // reserve 2 columns for the scrollbar
    let content = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width.saturating_sub(2),
        height: inner.height,
    };

    let total_rows = rows.len();
    let viewport_rows = content.height.saturating_sub(1) as usize;
    let offset = scroll_offset.min(total_rows.saturating_sub(viewport_rows));
    let summary_w = (content.width as usize / 2).max(8);

    let visible = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(viewport_rows)
        .map(|(i, r)| {
            let style = if i % 2 == 1 { theme.zebra } else { Style::default() };
            Row::new(vec![
                Cell::from(r.cells[0].clone()).style(theme.muted),
                Cell::from(r.cells[1].clone()),
                Cell::from(r.cells[2].clone()),
                Cell::from(r.cells[3].clone()),
                Cell::from(truncate_middle(&r.cells[4], summary_w)),
                Cell::from(r.cells[5].clone()),
            ])
            .style(style)
        });

    let header = Row::new(HEADERS.to_vec()).style(theme.table_header);
    let table = Table::new(visible, COLS.to_vec())
        .header(header)
        .column_spacing(1);
    f.render_widget(table, content);

    let scroll_area = Rect {
        x: inner.x + inner.width.saturating_sub(1),
        y: inner.y,
        width: 1,
        height: inner.height,
    };
    draw_scrollbar(f, scroll_area, total_rows, viewport_rows, offset);
}

fn draw_scrollbar(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    total_rows: usize,
    viewport_rows: usize,
    offset: usize,
) {
    if area.height < 3 {
        return;
    }
    let track = (area.height - 2) as usize;
    let total = total_rows.max(1);
    let view = viewport_rows.clamp(1, total);
    let max_off = total.saturating_sub(view);

    let thumb_len = (track * view).div_ceil(total).max(1).min(track);
    let thumb_top = if max_off == 0 {
        0
    } else {
        ((track - thumb_len) * offset.min(max_off) + max_off / 2) / max_off
    };

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    lines.push(Line::from(Span::styled("▲", Style::default().fg(SB_ARROW))));
    for i in 0..track {
        if i >= thumb_top && i < thumb_top + thumb_len {
            lines.push(Line::from(Span::styled("█", Style::default().fg(SB_THUMB))));
        } else {
            lines.push(Line::from(Span::styled("│", Style::default().fg(SB_TRACK))));
        }
    }
    lines.push(Line::from(Span::styled("▼", Style::default().fg(SB_ARROW))));
    f.render_widget(Paragraph::new(lines), area);
}

/// Keep the offset within `0..=total - page`.
pub fn table_clamp(scroll_offset: &mut usize, total_rows: usize, page_size: usize) {
    let max_off = total_rows.saturating_sub(page_size);
    if *scroll_offset > max_off {
        *scroll_offset = max_off;
    }
}

/// Up/Down/PageUp/PageDown/Home/End. Returns true if the key was a scroll key.
pub fn table_handle_key(scroll_offset: &mut usize, key: KeyEvent, page_size: usize) -> bool {
    match key.code {
        KeyCode::Up => *scroll_offset = scroll_offset.saturating_sub(1),
        KeyCode::Down => *scroll_offset = scroll_offset.saturating_add(1),
        KeyCode::PageUp => *scroll_offset = scroll_offset.saturating_sub(page_size),
        KeyCode::PageDown => *scroll_offset = scroll_offset.saturating_add(page_size),
        KeyCode::Home => *scroll_offset = 0,
        // clamped to the last page afterwards
        KeyCode::End => *scroll_offset = usize::MAX,
        _ => return false,
    }
    true
}

/// Wheel scrolling while the pointer is over `area`.
pub fn table_handle_mouse(scroll_offset: &mut usize, mouse: MouseEvent, area: Rect) {
    let inside = mouse.column >= area.x
        && mouse.column < area.x + area.width
        && mouse.row >= area.y
        && mouse.row < area.y + area.height;
    if !inside {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => *scroll_offset = scroll_offset.saturating_sub(3),
        MouseEventKind::ScrollDown => *scroll_offset = scroll_offset.saturating_add(3),
        _ => {}
    }
}
