use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::units::BytesFromB;

/// Transfer totals (`mode=server_stats`), overall and per news server.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerStatsResponse {
    pub total: BytesFromB,
    pub month: BytesFromB,
    pub week: BytesFromB,
    pub day: BytesFromB,
    pub servers: BTreeMap<String, ServerStatsServer>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerStatsServer {
    pub total: BytesFromB,
    pub month: BytesFromB,
    pub week: BytesFromB,
    pub day: BytesFromB,
    pub daily: BTreeMap<ServerStatsDate, BytesFromB>,
    pub articles_tried: BTreeMap<ServerStatsDate, i64>,
    pub articles_success: BTreeMap<ServerStatsDate, i64>,
}

/// Day key as sent by the server (`YYYY-MM-DD`), kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct ServerStatsDate(pub String);

impl ServerStatsDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerStatsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
