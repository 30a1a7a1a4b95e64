//! Latest merged snapshot and the per-field merge rule.
//!
//! A poll cycle produces one [`CycleOutcome`]. Merging it replaces each field
//! whose fetch succeeded and whose payload is well-formed; every other field
//! keeps its previous value. Outcomes from superseded cycles, or arriving
//! after [`SnapshotStore::seal`], are dropped untouched.

use chrono::{DateTime, Local};

use crate::error::{FetchError, MergeError};
use crate::types::{PacketRecord, ProtocolDistribution, Snapshot, TimelineSeries, Validate};

/// Results of one poll cycle, one per field.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub cycle: u64,
    pub records: Result<Vec<PacketRecord>, FetchError>,
    pub timeline: Result<TimelineSeries, FetchError>,
    pub distribution: Result<ProtocolDistribution, FetchError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldStatus {
    Replaced,
    /// Previous value kept.
    Stale(FetchError),
}

impl FieldStatus {
    pub fn is_replaced(&self) -> bool {
        matches!(self, FieldStatus::Replaced)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub cycle: u64,
    pub records: FieldStatus,
    pub timeline: FieldStatus,
    pub distribution: FieldStatus,
}

impl MergeReport {
    pub fn fields(&self) -> [(&'static str, &FieldStatus); 3] {
        [
            ("records", &self.records),
            ("timeline", &self.timeline),
            ("distribution", &self.distribution),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldHealth {
    pub last_ok: Option<DateTime<Local>>,
    pub last_error: Option<FetchError>,
}

impl FieldHealth {
    /// Showing older data because the most recent fetch failed.
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }

    fn record(&mut self, status: &FieldStatus) {
        match status {
            FieldStatus::Replaced => {
                self.last_ok = Some(Local::now());
                self.last_error = None;
            }
            FieldStatus::Stale(e) => self.last_error = Some(e.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoreHealth {
    pub records: FieldHealth,
    pub timeline: FieldHealth,
    pub distribution: FieldHealth,
}

#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Snapshot,
    health: StoreHealth,
    last_cycle: Option<u64>,
    merges: u64,
    sealed: bool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, by value.
    pub fn snapshot(&self) -> Snapshot {
        self.current.clone()
    }

    /// Borrowing view for the draw path, which runs on the same turn as merge.
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    pub fn health(&self) -> &StoreHealth {
        &self.health
    }

    pub fn last_cycle(&self) -> Option<u64> {
        self.last_cycle
    }

    /// Number of merges applied so far.
    pub fn version(&self) -> u64 {
        self.merges
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Refuse every later merge. Called at teardown.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether an outcome for `cycle` would still be applied.
    pub fn is_live(&self, cycle: u64) -> bool {
        !self.sealed && self.last_cycle.map_or(true, |last| cycle > last)
    }

    pub fn merge(&mut self, outcome: CycleOutcome) -> Result<MergeReport, MergeError> {
        let cycle = outcome.cycle;
        if !self.is_live(cycle) {
            return Err(MergeError::Abandoned { cycle });
        }

        let records = replace_if_ok(&mut self.current.records, outcome.records);
        let timeline = replace_if_ok(&mut self.current.timeline, outcome.timeline);
        let distribution = replace_if_ok(&mut self.current.distribution, outcome.distribution);

        self.health.records.record(&records);
        self.health.timeline.record(&timeline);
        self.health.distribution.record(&distribution);
        self.last_cycle = Some(cycle);
        self.merges += 1;

        Ok(MergeReport {
            cycle,
            records,
            timeline,
            distribution,
        })
    }
}

// Shape is re-checked here so a DataSource that skips validation still
// cannot put a misaligned value on screen.
fn replace_if_ok<T: Validate>(slot: &mut T, fetched: Result<T, FetchError>) -> FieldStatus {
    match fetched.and_then(|v| v.validate().map(|_| v).map_err(FetchError::Decode)) {
        Ok(v) => {
            *slot = v;
            FieldStatus::Replaced
        }
        Err(e) => FieldStatus::Stale(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: i64, proto: &str) -> PacketRecord {
        PacketRecord {
            id,
            src_ip: Some("10.0.0.1".into()),
            dest_ip: Some("10.0.0.2".into()),
            protocol: Some(proto.into()),
            summary: Some("SYN".into()),
            time: Some("12:00:01".into()),
        }
    }

    fn timeline(n: u64) -> TimelineSeries {
        TimelineSeries {
            times: vec!["12:00".into()],
            counts: vec![n],
        }
    }

    fn dist(tcp: u64, udp: u64) -> ProtocolDistribution {
        ProtocolDistribution {
            labels: vec!["TCP".into(), "UDP".into()],
            counts: vec![tcp, udp],
        }
    }

    fn ok_outcome(cycle: u64, n: u64) -> CycleOutcome {
        CycleOutcome {
            cycle,
            records: Ok(vec![rec(n as i64, "TCP")]),
            timeline: Ok(timeline(n)),
            distribution: Ok(dist(n, n + 1)),
        }
    }

    #[test]
    fn starts_empty() {
        let store = SnapshotStore::new();
        assert_eq!(store.snapshot(), Snapshot::default());
        assert_eq!(store.version(), 0);
        assert!(store.last_cycle().is_none());
    }

    #[test]
    fn full_success_replaces_every_field() {
        let mut store = SnapshotStore::new();
        let report = store.merge(ok_outcome(1, 5)).unwrap();
        assert!(report.fields().iter().all(|(_, s)| s.is_replaced()));

        let snap = store.snapshot();
        assert_eq!(snap.records, vec![rec(5, "TCP")]);
        assert_eq!(snap.timeline, timeline(5));
        assert_eq!(snap.distribution, dist(5, 6));
        assert!(snap.timeline.validate().is_ok());
        assert!(snap.distribution.validate().is_ok());
    }

    #[test]
    fn one_failed_field_keeps_previous_value_others_update() {
        let mut store = SnapshotStore::new();
        store.merge(ok_outcome(1, 5)).unwrap();

        let report = store
            .merge(CycleOutcome {
                cycle: 2,
                records: Ok(vec![rec(9, "UDP")]),
                timeline: Err(FetchError::Timeout),
                distribution: Ok(dist(7, 8)),
            })
            .unwrap();

        assert!(report.records.is_replaced());
        assert_eq!(report.timeline, FieldStatus::Stale(FetchError::Timeout));
        assert!(report.distribution.is_replaced());

        let snap = store.snapshot();
        assert_eq!(snap.records, vec![rec(9, "UDP")]);
        assert_eq!(snap.timeline, timeline(5));
        assert_eq!(snap.distribution, dist(7, 8));

        assert!(store.health().timeline.is_stale());
        assert!(!store.health().records.is_stale());
    }

    #[test]
    fn misaligned_payload_is_rejected_in_isolation() {
        let mut store = SnapshotStore::new();
        store.merge(ok_outcome(1, 5)).unwrap();

        let report = store
            .merge(CycleOutcome {
                cycle: 2,
                records: Ok(vec![rec(2, "TCP")]),
                timeline: Ok(TimelineSeries {
                    times: vec!["12:00".into(), "12:01".into()],
                    counts: vec![1],
                }),
                distribution: Ok(ProtocolDistribution {
                    labels: vec!["TCP".into()],
                    counts: vec![1, 2],
                }),
            })
            .unwrap();

        assert!(report.records.is_replaced());
        assert!(matches!(report.timeline, FieldStatus::Stale(FetchError::Decode(_))));
        assert!(matches!(report.distribution, FieldStatus::Stale(FetchError::Decode(_))));

        let snap = store.snapshot();
        assert_eq!(snap.records, vec![rec(2, "TCP")]);
        assert_eq!(snap.timeline, timeline(5));
        assert_eq!(snap.distribution, dist(5, 6));
    }

    #[test]
    fn failure_before_any_success_leaves_field_empty() {
        let mut store = SnapshotStore::new();
        store
            .merge(CycleOutcome {
                cycle: 1,
                records: Err(FetchError::Transport("refused".into())),
                timeline: Ok(timeline(3)),
                distribution: Err(FetchError::Decode("bad".into())),
            })
            .unwrap();
        let snap = store.snapshot();
        assert!(snap.records.is_empty());
        assert_eq!(snap.timeline, timeline(3));
        assert_eq!(snap.distribution, ProtocolDistribution::default());
    }

    #[test]
    fn older_or_repeated_cycle_is_abandoned() {
        let mut store = SnapshotStore::new();
        store.merge(ok_outcome(3, 3)).unwrap();

        assert_eq!(
            store.merge(ok_outcome(2, 99)).unwrap_err(),
            MergeError::Abandoned { cycle: 2 }
        );
        assert_eq!(
            store.merge(ok_outcome(3, 99)).unwrap_err(),
            MergeError::Abandoned { cycle: 3 }
        );
        assert_eq!(store.snapshot().timeline, timeline(3));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn sealed_store_drops_late_results() {
        let mut store = SnapshotStore::new();
        store.merge(ok_outcome(1, 1)).unwrap();
        assert!(!store.is_sealed());
        store.seal();
        assert!(store.is_sealed());

        let before = store.snapshot();
        assert!(!store.is_live(2));
        assert_eq!(
            store.merge(ok_outcome(2, 2)).unwrap_err(),
            MergeError::Abandoned { cycle: 2 }
        );
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn each_read_sees_one_whole_cycle() {
        let mut store = SnapshotStore::new();
        for cycle in 1..=5u64 {
            store.merge(ok_outcome(cycle, cycle * 10)).unwrap();
            let snap = store.snapshot();
            // every field carries the marker of the same cycle
            assert_eq!(snap.records[0].id, (cycle * 10) as i64);
            assert_eq!(snap.timeline.counts, vec![cycle * 10]);
            assert_eq!(snap.distribution.counts, vec![cycle * 10, cycle * 10 + 1]);
        }
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut store = SnapshotStore::new();
        store.merge(ok_outcome(1, 1)).unwrap();
        let taken = store.snapshot();
        store.merge(ok_outcome(2, 2)).unwrap();
        assert_eq!(taken.timeline, timeline(1));
    }
}
