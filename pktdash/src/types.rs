//! Types that mirror the analyzer's JSON schema, plus the shape checks each
//! payload must pass before it can replace what is on screen.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One captured packet. Everything but `id` is a nullable column on the
/// analyzer side; non-IP frames (ARP and friends) carry no addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketRecord {
    pub id: i64,
    #[serde(default)]
    pub src_ip: Option<String>,
    #[serde(default)]
    pub dest_ip: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    // already formatted by the analyzer
    #[serde(default)]
    pub time: Option<String>,
}

/// Packet counts per time bucket; `times[i]` labels `counts[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSeries {
    pub times: Vec<String>,
    pub counts: Vec<u64>,
}

/// Packet counts per protocol; `labels[i]` names `counts[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDistribution {
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

/// The three collections the dashboard renders. Each field is replaced
/// independently of the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub records: Vec<PacketRecord>,
    pub timeline: TimelineSeries,
    pub distribution: ProtocolDistribution,
}

/// Shape check applied to every decoded payload. Counts are unsigned on the
/// wire, so a negative count already fails at decode time.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for Vec<PacketRecord> {
    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(self.len());
        for r in self {
            if !seen.insert(r.id) {
                return Err(format!("duplicate packet id {}", r.id));
            }
        }
        Ok(())
    }
}

impl Validate for TimelineSeries {
    fn validate(&self) -> Result<(), String> {
        if self.times.len() != self.counts.len() {
            return Err(format!(
                "timeline has {} times but {} counts",
                self.times.len(),
                self.counts.len()
            ));
        }
        Ok(())
    }
}

impl Validate for ProtocolDistribution {
    fn validate(&self) -> Result<(), String> {
        if self.labels.len() != self.counts.len() {
            return Err(format!(
                "distribution has {} labels but {} counts",
                self.labels.len(),
                self.counts.len()
            ));
        }
        let mut seen = HashSet::with_capacity(self.labels.len());
        for l in &self.labels {
            if !seen.insert(l.as_str()) {
                return Err(format!("duplicate protocol label {l:?}"));
            }
        }
        Ok(())
    }
}

impl ProtocolDistribution {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}
