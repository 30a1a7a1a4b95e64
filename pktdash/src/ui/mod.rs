//! UI module root: exposes drawing functions for individual panels.

pub mod distribution;
pub mod header;
pub mod table;
pub mod theme;
pub mod timeline;
pub mod util;
