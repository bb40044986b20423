//! Generation History & Scan Analytics
//!
//! Persistence is an external collaborator. `HistoryStore` is the contract
//! the service talks to; `InMemoryHistoryStore` is a complete in-process
//! implementation used by the CLI and by tests.
//!
//! Owner scoping follows one rule everywhere: `Some(owner)` restricts an
//! operation to that owner's records, `None` leaves it unscoped.

mod memory;

pub use memory::InMemoryHistoryStore;

use serde::{Deserialize, Serialize};

use crate::error::StudioResult;
use crate::style::{PartialStyle, StyleConfig};
use crate::types::{ContentKind, FieldMap, UserId};

// =============================================================================
// Types
// =============================================================================

/// A stored generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCodeRecord {
    pub id: String,
    pub kind: ContentKind,
    /// Encoded payload
    pub content: String,
    /// Fields the payload was built from
    pub data: FieldMap,
    pub style: StyleConfig,
    pub image_url: Option<String>,
    /// Unix seconds
    pub created_at: u64,
    pub updated_at: u64,
    pub scan_count: u64,
    pub last_scanned: Option<u64>,
    pub user_id: Option<UserId>,
}

/// Snapshot handed to `HistoryStore::create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQrRecord {
    pub kind: ContentKind,
    pub content: String,
    pub data: FieldMap,
    pub style: StyleConfig,
    pub image_url: Option<String>,
}

/// Fields that may change after creation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrRecordUpdate {
    pub content: Option<String>,
    pub data: Option<FieldMap>,
    pub style: Option<StyleConfig>,
    pub image_url: Option<String>,
}

/// Client details captured with a scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanDetails {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub device_type: Option<String>,
}

/// One recorded scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    pub qr_code_id: String,
    /// Unix seconds
    pub scan_date: u64,
    #[serde(flatten)]
    pub details: ScanDetails,
}

/// Row of the most-scanned overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub id: String,
    pub kind: ContentKind,
    pub scan_count: u64,
    pub created_at: u64,
    pub last_scanned: Option<u64>,
}

/// Predefined starting point for a generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrTemplate {
    pub id: String,
    pub name: String,
    pub kind: ContentKind,
    pub description: String,
    pub default_data: FieldMap,
    pub default_style: PartialStyle,
    pub category: String,
    pub is_popular: bool,
}

/// Rows returned by `analytics_summary`
pub const SUMMARY_LIMIT: usize = 10;

// =============================================================================
// Store Contract
// =============================================================================

/// History persistence
pub trait HistoryStore: Send + Sync {
    /// Store a new record and return it with id and timestamps
    fn create(&self, record: NewQrRecord, owner: Option<&UserId>) -> StudioResult<QrCodeRecord>;

    fn get(&self, id: &str, owner: Option<&UserId>) -> StudioResult<QrCodeRecord>;

    /// Newest first
    fn list(
        &self,
        limit: usize,
        offset: usize,
        owner: Option<&UserId>,
    ) -> StudioResult<Vec<QrCodeRecord>>;

    fn update(
        &self,
        id: &str,
        update: QrRecordUpdate,
        owner: Option<&UserId>,
    ) -> StudioResult<QrCodeRecord>;

    fn delete(&self, id: &str, owner: Option<&UserId>) -> StudioResult<()>;

    /// Log a scan and bump the record's scan counter
    fn record_scan(&self, id: &str, details: ScanDetails) -> StudioResult<ScanEvent>;

    /// Scans of one record within the last `days`, newest first
    fn scans(&self, id: &str, days: u64) -> StudioResult<Vec<ScanEvent>>;

    /// Most-scanned records, at most `SUMMARY_LIMIT`
    fn analytics_summary(&self, owner: Option<&UserId>) -> StudioResult<Vec<ScanSummary>>;

    /// Templates, popular first; `category` filters exactly
    fn templates(&self, category: Option<&str>) -> StudioResult<Vec<QrTemplate>>;
}

pub(crate) fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
