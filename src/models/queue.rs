use serde::{Deserialize, Deserializer};

use crate::clock::ClockDuration;
use crate::decode::{Enveloped, de, envelope};
use crate::units::{BytesFromB, BytesFromGb, BytesFromKb, BytesFromMb};

/// Snapshot of the download queue (`mode=queue`), delivered under `"queue"`.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(remote = "Self", default)]
pub struct QueueResponse {
    pub version: String,
    pub paused: bool,
    pub pause_int: String,
    pub paused_all: bool,
    #[serde(rename = "diskspace1")]
    pub download_disk_free_space: BytesFromGb,
    #[serde(rename = "diskspace2")]
    pub complete_disk_free_space: BytesFromGb,
    pub diskspace1_norm: String,
    pub diskspace2_norm: String,
    #[serde(rename = "diskspacetotal1")]
    pub download_disk_total_space: BytesFromGb,
    #[serde(rename = "diskspacetotal2")]
    pub complete_disk_total_space: BytesFromGb,
    #[serde(rename = "speedlimit", deserialize_with = "de::i64_from_str_or_num")]
    pub speed_limit_percentage: i64,
    #[serde(rename = "speedlimit_abs")]
    pub speed_limit: BytesFromB,
    pub have_warnings: String,
    #[serde(rename = "finishaction")]
    pub finish_action: Option<String>,
    pub quota: String,
    pub have_quota: bool,
    pub left_quota: String,
    pub cache_art: String,
    pub cache_size: String,
    #[serde(rename = "kbpersec")]
    pub bytes_per_second: BytesFromKb,
    pub speed: String,
    #[serde(rename = "mbleft")]
    pub bytes_left: BytesFromMb,
    #[serde(rename = "mb")]
    pub bytes: BytesFromMb,
    /// `bytes - bytes_left`, derived at decode time.
    #[serde(skip)]
    pub bytes_missing: BytesFromMb,
    #[serde(rename = "sizeleft")]
    pub size_left: String,
    pub size: String,
    #[serde(rename = "noofslots_total")]
    pub no_of_slots_total: i64,
    #[serde(rename = "noofslots")]
    pub no_of_slots: i64,
    pub start: i64,
    pub limit: i64,
    pub finish: i64,
    pub status: String,
    #[serde(rename = "timeleft")]
    pub time_left: ClockDuration,
    pub slots: Vec<QueueSlot>,
    pub error: Option<String>,
}

impl Enveloped for QueueResponse {
    const KEY: &'static str = "queue";

    fn deserialize_plain<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        QueueResponse::deserialize(deserializer)
    }

    fn post_process(&mut self) {
        self.bytes_missing = self.bytes - self.bytes_left;
    }
}

impl<'de> Deserialize<'de> for QueueResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        envelope::deserialize(deserializer)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueueSlot {
    pub index: i64,
    pub nzo_id: String,
    #[serde(rename = "unpackopts")]
    pub unpack_opts: String,
    pub priority: String,
    pub script: String,
    pub filename: String,
    pub labels: Vec<String>,
    pub password: String,
    #[serde(rename = "cat")]
    pub category: String,
    #[serde(rename = "mbleft")]
    pub bytes_left: BytesFromMb,
    #[serde(rename = "mb")]
    pub bytes: BytesFromMb,
    pub size: String,
    #[serde(rename = "sizeleft")]
    pub size_left: String,
    pub percentage: String,
    #[serde(rename = "mbmissing")]
    pub bytes_missing: BytesFromMb,
    pub direct_unpack: Option<String>,
    pub status: String,
    #[serde(rename = "timeleft")]
    pub time_left: ClockDuration,
    #[serde(rename = "avg_age")]
    pub average_age: String,
}
