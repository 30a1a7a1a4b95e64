//! Shared UI theme: light/dark styles plus scrollbar colors.

use ratatui::style::{Color, Modifier, Style};

use crate::view::DisplayMode;

// Scrollbar colors
pub const SB_ARROW: Color = Color::Rgb(170, 170, 180);
pub const SB_TRACK: Color = Color::Rgb(170, 170, 180);
pub const SB_THUMB: Color = Color::Rgb(170, 170, 180);

pub const ACCENT: Color = Color::Rgb(0x00, 0x7b, 0xff);
pub const START_GREEN: Color = Color::Rgb(0x28, 0xa7, 0x45);
pub const STOP_RED: Color = Color::Rgb(0xdc, 0x35, 0x45);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub base: Style,
    pub border: Style,
    pub table_header: Style,
    pub zebra: Style,
    pub muted: Style,
    pub stale: Style,
}

impl Theme {
    pub fn for_mode(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Light => Self {
                base: Style::default().fg(Color::Black).bg(Color::White),
                border: Style::default().fg(Color::DarkGray),
                table_header: Style::default()
                    .fg(Color::White)
                    .bg(ACCENT)
                    .add_modifier(Modifier::BOLD),
                zebra: Style::default().bg(Color::Rgb(240, 240, 245)),
                muted: Style::default().fg(Color::DarkGray),
                stale: Style::default().fg(Color::Rgb(0xb0, 0x6a, 0x00)),
            },
            DisplayMode::Dark => Self {
                base: Style::default().fg(Color::Gray).bg(Color::Rgb(0x12, 0x12, 0x12)),
                border: Style::default().fg(Color::Rgb(90, 90, 100)),
                table_header: Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                zebra: Style::default().bg(Color::Rgb(0x1e, 0x1e, 0x24)),
                muted: Style::default().fg(Color::Rgb(120, 120, 130)),
                stale: Style::default().fg(Color::Yellow),
            },
        }
    }
}
