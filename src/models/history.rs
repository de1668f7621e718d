use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer};

use crate::decode::{Enveloped, envelope};

/// Completed and failed jobs (`mode=history`), delivered under `"history"`.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(remote = "Self", default)]
pub struct HistoryResponse {
    pub total_size: String,
    pub month_size: String,
    pub week_size: String,
    pub day_size: String,
    pub slots: Vec<HistorySlot>,
    #[serde(rename = "noofslots")]
    pub no_of_slots: i64,
    pub version: String,
    pub last_history_update: i64,
    pub error: Option<String>,
}

impl Enveloped for HistoryResponse {
    const KEY: &'static str = "history";

    fn deserialize_plain<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        HistoryResponse::deserialize(deserializer)
    }

    /// Materializes completion times and durations. Gated on the declared
    /// slot count rather than `slots.len()`, as the server reports them.
    fn post_process(&mut self) {
        if self.no_of_slots > 0 {
            for slot in &mut self.slots {
                slot.derive_times();
            }
        }
    }
}

impl<'de> Deserialize<'de> for HistoryResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        envelope::deserialize(deserializer)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistorySlot {
    pub id: i64,
    /// Completion time as a Unix timestamp.
    #[serde(rename = "completed")]
    pub completed_unix: i64,
    #[serde(skip)]
    pub completed: Option<DateTime<Utc>>,
    pub name: String,
    pub nzb_name: String,
    pub category: String,
    pub pp: String,
    pub script: String,
    pub report: String,
    pub url: String,
    pub status: String,
    pub nzo_id: String,
    pub storage: String,
    pub path: String,
    pub script_log: String,
    pub script_line: String,
    /// Seconds spent downloading.
    pub download_time: i64,
    #[serde(skip)]
    pub download_duration: TimeDelta,
    /// Seconds spent post-processing.
    #[serde(rename = "postproc_time")]
    pub post_processing_time: i64,
    #[serde(skip)]
    pub post_processing_duration: TimeDelta,
    #[serde(rename = "stage_log")]
    pub stage_logs: Vec<HistoryStageLog>,
    /// Downloaded bytes.
    pub downloaded: i64,
    pub completeness: i64,
    pub fail_message: String,
    pub url_info: String,
    pub bytes: i64,
    pub meta: Option<String>,
    pub series: Option<String>,
    pub md5sum: String,
    pub password: Option<String>,
    pub action_line: String,
    pub size: String,
    pub loaded: bool,
    pub retry: i64,
}

impl HistorySlot {
    fn derive_times(&mut self) {
        self.completed = DateTime::from_timestamp(self.completed_unix, 0);
        self.download_duration = seconds(self.download_time);
        self.post_processing_duration = seconds(self.post_processing_time);
    }
}

fn seconds(secs: i64) -> TimeDelta {
    TimeDelta::try_seconds(secs).unwrap_or(if secs < 0 {
        TimeDelta::MIN
    } else {
        TimeDelta::MAX
    })
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HistoryStageLog {
    pub name: String,
    pub actions: Vec<String>,
}
