//! Network statistics and quality classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse classification of current network conditions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Good,
    Ok,
    Poor,
    #[default]
    Unknown,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Good => "good",
            Quality::Ok => "ok",
            Quality::Poor => "poor",
            Quality::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a downlink (Mbps) / round-trip time (ms) pair.
///
/// Missing downlink counts as 0, missing rtt as 999; both missing is unknown.
pub fn classify(downlink_mbps: Option<f64>, rtt_ms: Option<u32>) -> Quality {
    if downlink_mbps.is_none() && rtt_ms.is_none() {
        return Quality::Unknown;
    }
    let d = downlink_mbps.unwrap_or(0.0);
    let r = rtt_ms.unwrap_or(999);

    if d >= 20.0 && r <= 80 {
        Quality::Good
    } else if d >= 5.0 && r <= 200 {
        Quality::Ok
    } else {
        Quality::Poor
    }
}

/// One observation from one trigger. `None` fields were not measured.
#[derive(Clone, Debug, PartialEq)]
pub struct StatsSample {
    pub downlink_mbps: Option<f64>,
    pub effective_type: Option<String>,
    pub rtt_ms: Option<u32>,
    pub observed_at: DateTime<Utc>,
}

impl StatsSample {
    pub fn rtt(rtt_ms: u32, observed_at: DateTime<Utc>) -> Self {
        StatsSample {
            downlink_mbps: None,
            effective_type: None,
            rtt_ms: Some(rtt_ms),
            observed_at,
        }
    }
}

/// Latest known connectivity figures
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub downlink_mbps: Option<f64>,
    pub effective_type: Option<String>,
    pub rtt_ms: Option<u32>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl NetworkStats {
    /// Overwrite the fields present in `sample`; the rest keep their values
    pub fn merge(&mut self, sample: StatsSample) {
        if let Some(d) = sample.downlink_mbps {
            self.downlink_mbps = Some(d);
        }
        if let Some(t) = sample.effective_type {
            self.effective_type = Some(t);
        }
        if let Some(r) = sample.rtt_ms {
            self.rtt_ms = Some(r);
        }
        self.last_updated = Some(sample.observed_at);
    }

    pub fn quality(&self) -> Quality {
        classify(self.downlink_mbps, self.rtt_ms)
    }

    /// "12.3 Mbps" or "? Mbps"
    pub fn downlink_label(&self) -> String {
        match self.downlink_mbps {
            Some(d) => format!("{:.1} Mbps", d),
            None => "? Mbps".to_string(),
        }
    }

    /// "42 ms" or "? ms"
    pub fn rtt_label(&self) -> String {
        match self.rtt_ms {
            Some(r) => format!("{} ms", r),
            None => "? ms".to_string(),
        }
    }

    /// One-line summary used for the network log events
    pub fn summary(&self) -> String {
        let d = self
            .downlink_mbps
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".to_string());
        let r = self
            .rtt_ms
            .map(|r| r.to_string())
            .unwrap_or_else(|| "?".to_string());
        let t = self.effective_type.as_deref().unwrap_or("n/a");
        format!("Network update: {} Mbps, {} ms RTT ({})", d, r, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_tiers() {
        assert_eq!(classify(Some(25.0), Some(50)), Quality::Good);
        assert_eq!(classify(Some(10.0), Some(150)), Quality::Ok);
        assert_eq!(classify(Some(1.0), Some(300)), Quality::Poor);
        assert_eq!(classify(None, None), Quality::Unknown);
    }

    #[test]
    fn test_classify_inclusive_bounds() {
        assert_eq!(classify(Some(20.0), Some(80)), Quality::Good);
        assert_eq!(classify(Some(19.9), Some(80)), Quality::Ok);
        assert_eq!(classify(Some(5.0), Some(200)), Quality::Ok);
        assert_eq!(classify(Some(5.0), Some(201)), Quality::Poor);
        assert_eq!(classify(Some(20.0), Some(81)), Quality::Ok);
    }

    #[test]
    fn test_classify_partial_data() {
        // rtt alone: downlink treated as 0
        assert_eq!(classify(None, Some(10)), Quality::Poor);
        // downlink alone: rtt treated as 999
        assert_eq!(classify(Some(100.0), None), Quality::Poor);
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let t0 = Utc::now();
        let mut stats = NetworkStats::default();
        stats.merge(StatsSample {
            downlink_mbps: Some(30.0),
            effective_type: Some("4g".into()),
            rtt_ms: Some(50),
            observed_at: t0,
        });
        assert_eq!(stats.quality(), Quality::Good);

        let t1 = t0 + chrono::Duration::seconds(15);
        stats.merge(StatsSample::rtt(180, t1));
        assert_eq!(stats.downlink_mbps, Some(30.0));
        assert_eq!(stats.effective_type.as_deref(), Some("4g"));
        assert_eq!(stats.rtt_ms, Some(180));
        assert_eq!(stats.last_updated, Some(t1));
        assert_eq!(stats.quality(), Quality::Ok);
    }

    #[test]
    fn test_labels() {
        let mut stats = NetworkStats::default();
        assert_eq!(stats.downlink_label(), "? Mbps");
        assert_eq!(stats.rtt_label(), "? ms");
        assert_eq!(stats.summary(), "Network update: ? Mbps, ? ms RTT (n/a)");

        stats.downlink_mbps = Some(12.34);
        stats.rtt_ms = Some(42);
        stats.effective_type = Some("4g".into());
        assert_eq!(stats.downlink_label(), "12.3 Mbps");
        assert_eq!(stats.rtt_label(), "42 ms");
        assert_eq!(stats.summary(), "Network update: 12.34 Mbps, 42 ms RTT (4g)");
    }
}
