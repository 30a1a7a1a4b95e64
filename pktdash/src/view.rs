//! Snapshot -> render descriptors. Pure: no I/O, no mutation.

use ratatui::style::Color;

use crate::types::{PacketRecord, Snapshot};

/// Category colors, assigned by position and repeated past the end.
pub const PALETTE: [Color; 4] = [
    Color::Rgb(0x00, 0x7b, 0xff), // blue
    Color::Rgb(0xff, 0xc1, 0x07), // amber
    Color::Rgb(0x28, 0xa7, 0x45), // green
    Color::Rgb(0xdc, 0x35, 0x45), // red
];

pub const SERIES_COLOR: Color = Color::Rgb(0x00, 0x7b, 0xff);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Light => DisplayMode::Dark,
            DisplayMode::Dark => DisplayMode::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == DisplayMode::Dark
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub key: i64,
    pub cells: [String; 6],
}

impl From<&PacketRecord> for TableRow {
    fn from(p: &PacketRecord) -> Self {
        Self {
            key: p.id,
            cells: [
                p.id.to_string(),
                p.src_ip.clone().unwrap_or_default(),
                p.dest_ip.clone().unwrap_or_default(),
                p.protocol.clone().unwrap_or_default(),
                p.summary.clone().unwrap_or_default(),
                p.time.clone().unwrap_or_default(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySlice {
    pub label: String,
    pub count: u64,
    pub color: Color,
    /// Fraction of the total in 0..=1; 0 when the total is 0.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimelineChart {
    pub labels: Vec<String>,
    pub points: Vec<(String, u64)>,
    pub max: u64,
    pub color: Option<Color>,
}

impl TimelineChart {
    /// Points indexed by bucket position, for the chart widget.
    pub fn plot_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, (_, c))| (i as f64, *c as f64))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub rows: Vec<TableRow>,
    pub slices: Vec<CategorySlice>,
    pub timeline: TimelineChart,
    pub mode: DisplayMode,
}

pub fn palette_color(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}

pub fn bind(snapshot: &Snapshot, mode: DisplayMode) -> DashboardView {
    let rows = snapshot.records.iter().map(TableRow::from).collect();

    let dist = &snapshot.distribution;
    let total = dist.total();
    let slices = dist
        .labels
        .iter()
        .zip(&dist.counts)
        .enumerate()
        .map(|(i, (label, &count))| CategorySlice {
            label: label.clone(),
            count,
            color: palette_color(i),
            share: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
        })
        .collect();

    let tl = &snapshot.timeline;
    let points: Vec<(String, u64)> = tl
        .times
        .iter()
        .cloned()
        .zip(tl.counts.iter().copied())
        .collect();
    let timeline = TimelineChart {
        labels: tl.times.clone(),
        max: points.iter().map(|(_, c)| *c).max().unwrap_or(0),
        points,
        color: Some(SERIES_COLOR),
    };

    DashboardView {
        rows,
        slices,
        timeline,
        mode,
    }
}
