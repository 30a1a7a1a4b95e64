//! pktdash: a terminal dashboard for captured packet metadata.
//!
//! The analyzer backend is polled over HTTP on a fixed cadence. Each poll
//! cycle fetches the packet list, the packet timeline, and the protocol
//! distribution concurrently; results are merged field by field into a
//! [`store::SnapshotStore`] and bound to render descriptors by [`view::bind`].

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod poller;
pub mod store;
pub mod types;
pub mod ui;
pub mod view;

pub use client::{DataSource, HttpSource};
pub use error::{ConfigError, FetchError, MergeError, PollerError};
pub use poller::{Poller, PollerState};
pub use store::{CycleOutcome, SnapshotStore};
pub use types::{PacketRecord, ProtocolDistribution, Snapshot, TimelineSeries};
pub use view::{bind, DashboardView, DisplayMode};
