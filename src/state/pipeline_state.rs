//! Backend pipeline trigger results and data freshness.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of `POST /api/pipeline/run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub status: String,
    pub message: String,
}

/// Response of `/api/pipeline/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStatus {
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_article: Option<DateTime<Utc>>,
}

/// How recent the dashboard data is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The backend has never run.
    Unknown,
    /// Last run within the hour.
    Fresh { minutes: i64 },
    /// Last run within the day.
    Aging { hours: i64 },
    Stale { days: i64 },
}

impl PipelineStatus {
    /// Freshness of the last pipeline run relative to `now`.
    pub fn freshness(&self, now: DateTime<Utc>) -> Freshness {
        let Some(last_run) = self.last_run else {
            return Freshness::Unknown;
        };
        let age = now.signed_duration_since(last_run).max(chrono::TimeDelta::zero());
        if age.num_hours() < 1 {
            Freshness::Fresh {
                minutes: age.num_minutes(),
            }
        } else if age.num_days() < 1 {
            Freshness::Aging {
                hours: age.num_hours(),
            }
        } else {
            Freshness::Stale {
                days: age.num_days(),
            }
        }
    }
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Sin análisis previo"),
            Self::Fresh { minutes } if *minutes < 1 => write!(f, "Actualizado recién"),
            Self::Fresh { minutes } => write!(f, "Actualizado hace {minutes} min"),
            Self::Aging { hours } => write!(f, "Actualizado hace {hours} h"),
            Self::Stale { days } => write!(f, "Sin actualizar hace {days} d"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_freshness_buckets() {
        let now = at(12, 0);
        let status = |last_run| PipelineStatus {
            last_run,
            last_article: None,
        };

        assert_eq!(status(None).freshness(now), Freshness::Unknown);
        assert_eq!(
            status(Some(at(11, 45))).freshness(now),
            Freshness::Fresh { minutes: 15 }
        );
        assert_eq!(
            status(Some(at(3, 0))).freshness(now),
            Freshness::Aging { hours: 9 }
        );
        assert_eq!(
            status(Some(now - chrono::TimeDelta::days(3))).freshness(now),
            Freshness::Stale { days: 3 }
        );
    }

    #[test]
    fn test_future_timestamps_count_as_fresh() {
        let status = PipelineStatus {
            last_run: Some(at(12, 5)),
            last_article: None,
        };
        assert_eq!(status.freshness(at(12, 0)), Freshness::Fresh { minutes: 0 });
        assert_eq!(status.freshness(at(12, 0)).to_string(), "Actualizado recién");
    }

    #[test]
    fn test_status_accepts_missing_fields() {
        let status: PipelineStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(status, PipelineStatus::default());
    }
}
