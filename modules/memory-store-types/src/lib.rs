//! Shared types for the memory store service and its HTTP clients.

pub mod tags;

use serde::{Deserialize, Serialize};

pub use tags::{decode_tags, encode_tags, normalize_tags};

/// Listing limit applied when the client does not send one.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

// =====================================================
// Domain Types
// =====================================================

/// A stored memory, with its tag column already decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: i64,
    pub user_id: String,
    pub key: String,
    pub value: String,
    pub tags: Option<Vec<String>>,
    /// RFC 3339, UTC, microsecond precision.
    pub created_at: String,
}

// =====================================================
// Request Types
// =====================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemoryRequest {
    pub user_id: String,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Query string of `GET /memory`.
///
/// `user_id` is optional here only so a missing value can be reported
/// with the service's own error body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMemoryQuery {
    pub user_id: Option<String>,
    pub key: Option<String>,
    pub tag: Option<String>,
    pub limit: Option<u32>,
}

// =====================================================
// Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteMemoryResponse {
    pub deleted: bool,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub total_records: i64,
    pub version: String,
}
