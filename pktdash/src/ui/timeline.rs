//! Packet timeline line chart.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use crate::ui::theme::{Theme, ACCENT};
use crate::view::TimelineChart;

// Axis labels shown: first, middle, last bucket.
fn x_labels(labels: &[String]) -> Vec<Span<'static>> {
    match labels.len() {
        0 => vec![],
        1 => vec![Span::raw(labels[0].clone())],
        2 => vec![Span::raw(labels[0].clone()), Span::raw(labels[1].clone())],
        n => vec![
            Span::raw(labels[0].clone()),
            Span::raw(labels[n / 2].clone()),
            Span::raw(labels[n - 1].clone()),
        ],
    }
}

pub fn draw_timeline(f: &mut ratatui::Frame<'_>, area: Rect, chart: &TimelineChart, theme: &Theme) {
    let title = match chart.points.last() {
        Some((t, c)) => format!("📈 Packet Timeline | {t}: {c} | peak: {}", chart.max),
        None => "📈 Packet Timeline".into(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(title);

    if chart.points.is_empty() {
        let waiting = Paragraph::new("waiting for data...").style(theme.muted).block(block);
        f.render_widget(waiting, area);
        return;
    }

    let data = chart.plot_points();
    let color = chart.color.unwrap_or(ACCENT);
    let dataset = Dataset::default()
        .name("Packets")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&data);

    let x_max = (data.len().saturating_sub(1)).max(1) as f64;
    let y_max = chart.max.max(1) as f64;
    let c = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(theme.muted)
                .bounds([0.0, x_max])
                .labels(x_labels(&chart.labels)),
        )
        .y_axis(
            Axis::default()
                .style(theme.muted)
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(chart.max.to_string())]),
        );
    f.render_widget(c, area);
}
