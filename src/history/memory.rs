//! In-process history store
//!
//! Records are kept oldest first; listings reverse that order. Scan events
//! live in a separate log keyed by record id.

use std::sync::{Arc, RwLock};

use rand::{rngs::OsRng, RngCore};

use super::{
    current_timestamp, HistoryStore, NewQrRecord, QrCodeRecord, QrRecordUpdate, QrTemplate,
    ScanDetails, ScanEvent, ScanSummary, SUMMARY_LIMIT,
};
use crate::error::{StudioError, StudioResult};
use crate::types::UserId;

const SECONDS_PER_DAY: u64 = 86_400;

type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

#[derive(Default)]
struct Tables {
    records: Vec<QrCodeRecord>,
    scans: Vec<ScanEvent>,
    templates: Vec<QrTemplate>,
}

/// Thread-safe in-memory `HistoryStore`
pub struct InMemoryHistoryStore {
    tables: RwLock<Tables>,
    clock: Clock,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock: Arc::new(current_timestamp),
        }
    }

    /// Store that reads time from `clock` (Unix seconds)
    pub fn with_clock<F>(clock: F) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        Self {
            tables: RwLock::new(Tables::default()),
            clock: Arc::new(clock),
        }
    }

    /// Seed the template catalog
    pub fn with_templates(mut self, templates: Vec<QrTemplate>) -> Self {
        if let Ok(tables) = self.tables.get_mut() {
            tables.templates = templates;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.tables.read().map(|t| t.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StudioResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StudioError::persistence_failed("History store lock poisoned"))
    }

    fn write(&self) -> StudioResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StudioError::persistence_failed("History store lock poisoned"))
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryHistoryStore")
            .field("records", &self.len())
            .finish()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn create(&self, record: NewQrRecord, owner: Option<&UserId>) -> StudioResult<QrCodeRecord> {
        if record.content.trim().is_empty() {
            return Err(StudioError::invalid_input("Record content required"));
        }

        let now = (self.clock)();
        let stored = QrCodeRecord {
            id: generate_record_id(),
            kind: record.kind,
            content: record.content,
            data: record.data,
            style: record.style,
            image_url: record.image_url,
            created_at: now,
            updated_at: now,
            scan_count: 0,
            last_scanned: None,
            user_id: owner.cloned(),
        };

        self.write()?.records.push(stored.clone());
        Ok(stored)
    }

    fn get(&self, id: &str, owner: Option<&UserId>) -> StudioResult<QrCodeRecord> {
        self.read()?
            .records
            .iter()
            .find(|r| r.id == id && owned_by(r, owner))
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    fn list(
        &self,
        limit: usize,
        offset: usize,
        owner: Option<&UserId>,
    ) -> StudioResult<Vec<QrCodeRecord>> {
        Ok(self
            .read()?
            .records
            .iter()
            .rev()
            .filter(|r| owned_by(r, owner))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn update(
        &self,
        id: &str,
        update: QrRecordUpdate,
        owner: Option<&UserId>,
    ) -> StudioResult<QrCodeRecord> {
        let now = (self.clock)();
        let mut tables = self.write()?;
        let record = tables
            .records
            .iter_mut()
            .find(|r| r.id == id && owned_by(r, owner))
            .ok_or_else(|| not_found(id))?;

        if let Some(content) = update.content {
            record.content = content;
        }
        if let Some(data) = update.data {
            record.data = data;
        }
        if let Some(style) = update.style {
            record.style = style;
        }
        if let Some(image_url) = update.image_url {
            record.image_url = Some(image_url);
        }
        record.updated_at = now;

        Ok(record.clone())
    }

    fn delete(&self, id: &str, owner: Option<&UserId>) -> StudioResult<()> {
        let mut tables = self.write()?;
        let before = tables.records.len();
        tables.records.retain(|r| !(r.id == id && owned_by(r, owner)));

        if tables.records.len() == before {
            return Err(not_found(id));
        }

        tables.scans.retain(|s| s.qr_code_id != id);
        Ok(())
    }

    fn record_scan(&self, id: &str, details: ScanDetails) -> StudioResult<ScanEvent> {
        let now = (self.clock)();
        let mut tables = self.write()?;
        let record = tables
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found(id))?;

        record.scan_count += 1;
        record.last_scanned = Some(now);

        let event = ScanEvent {
            qr_code_id: id.to_string(),
            scan_date: now,
            details,
        };
        tables.scans.push(event.clone());
        Ok(event)
    }

    fn scans(&self, id: &str, days: u64) -> StudioResult<Vec<ScanEvent>> {
        let since = (self.clock)().saturating_sub(days.saturating_mul(SECONDS_PER_DAY));

        Ok(self
            .read()?
            .scans
            .iter()
            .rev()
            .filter(|s| s.qr_code_id == id && s.scan_date >= since)
            .cloned()
            .collect())
    }

    fn analytics_summary(&self, owner: Option<&UserId>) -> StudioResult<Vec<ScanSummary>> {
        let tables = self.read()?;
        let mut rows: Vec<&QrCodeRecord> = tables
            .records
            .iter()
            .filter(|r| owned_by(r, owner))
            .collect();

        // Stable sort keeps insertion order among ties
        rows.sort_by(|a, b| b.scan_count.cmp(&a.scan_count));

        Ok(rows
            .into_iter()
            .take(SUMMARY_LIMIT)
            .map(|r| ScanSummary {
                id: r.id.clone(),
                kind: r.kind,
                scan_count: r.scan_count,
                created_at: r.created_at,
                last_scanned: r.last_scanned,
            })
            .collect())
    }

    fn templates(&self, category: Option<&str>) -> StudioResult<Vec<QrTemplate>> {
        let mut templates: Vec<QrTemplate> = self
            .read()?
            .templates
            .iter()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .cloned()
            .collect();

        templates.sort_by_key(|t| !t.is_popular);
        Ok(templates)
    }
}

fn owned_by(record: &QrCodeRecord, owner: Option<&UserId>) -> bool {
    match owner {
        Some(owner) => record.user_id.as_ref() == Some(owner),
        None => true,
    }
}

fn not_found(id: &str) -> StudioError {
    StudioError::not_found("QR code record not found").with_details(format!("id={}", id))
}

/// Random 128-bit hex identifier
fn generate_record_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

// =============================================================================
// Tests
// =============================================================================
