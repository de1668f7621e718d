//! Typed SABnzbd API responses.

pub mod files;
pub mod history;
pub mod queue;
pub mod server_stats;

pub use files::*;
pub use history::*;
pub use queue::*;
pub use server_stats::*;

use serde::Deserialize;

use crate::error::ApiError;

/// Access to the `error` field any SABnzbd response may carry. A non-empty
/// message means the call failed and the remaining fields are not
/// meaningful.
pub trait ApiResponse: Sized {
    fn error_message(&self) -> Option<&str>;

    fn into_result(self) -> Result<Self, ApiError> {
        match self.error_message() {
            Some(message) => Err(ApiError::new(message)),
            None => Ok(self),
        }
    }
}

fn non_empty(error: &Option<String>) -> Option<&str> {
    error.as_deref().filter(|e| !e.is_empty())
}

macro_rules! impl_api_response {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ApiResponse for $ty {
                fn error_message(&self) -> Option<&str> {
                    non_empty(&self.error)
                }
            }
        )+
    };
}

impl_api_response!(
    VersionResponse,
    AuthResponse,
    WarningsResponse,
    CategoriesResponse,
    ScriptsResponse,
    AddFileResponse,
    ItemFilesResponse,
    QueueResponse,
    HistoryResponse,
    ServerStatsResponse,
);

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct VersionResponse {
    pub version: String,
    pub error: Option<String>,
}

/// Authentication method reported by `mode=auth` (e.g. "apikey").
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthResponse {
    pub auth: String,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct WarningsResponse {
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScriptsResponse {
    pub scripts: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AddFileResponse {
    pub nzo_ids: Vec<String>,
    pub error: Option<String>,
}
