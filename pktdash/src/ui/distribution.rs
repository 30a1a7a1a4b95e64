//! Protocol distribution: one colored bar per protocol with its share.

use ratatui::{
    layout::{Direction, Rect},
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
};

use crate::ui::theme::Theme;
use crate::ui::util::truncate_middle;
use crate::view::CategorySlice;

pub fn draw_distribution(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    slices: &[CategorySlice],
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title("📊 Protocol Distribution");

    if slices.is_empty() {
        let waiting = Paragraph::new("waiting for data...").style(theme.muted).block(block);
        f.render_widget(waiting, area);
        return;
    }

    let bars: Vec<Bar> = slices
        .iter()
        .map(|s| {
            Bar::default()
                .value(s.count)
                .label(Line::from(truncate_middle(&s.label, 10)))
                .text_value(format!("{} ({:.1}%)", s.count, s.share * 100.0))
                .style(Style::default().fg(s.color))
        })
        .collect();

    let max = slices.iter().map(|s| s.count).max().unwrap_or(0).max(1);
    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(max)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}
