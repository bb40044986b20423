//! Generation Service
//!
//! Orchestrates one generation: format the payload, resolve the style,
//! encode, then optionally save a history record. Saving is best-effort;
//! a failed save never fails the generation.

use serde::{Deserialize, Serialize};

use crate::content::{ContentFormatter, Escaping};
use crate::error::{StudioError, StudioResult};
use crate::history::{HistoryStore, NewQrRecord, QrCodeRecord};
use crate::qr::{check_capacity, SymbolEncoder, SymbolImage};
use crate::style::{PartialStyle, StyleConfig, StyleResolver};
use crate::types::{ContentKind, FieldMap, UserId};
use crate::utils::config::MAX_PAGE_SIZE;
use crate::utils::ServiceConfig;
use crate::{log_debug, log_info, log_warn};

const MODULE: &str = "service";

// =============================================================================
// Identity
// =============================================================================

/// Source of the current user, if any
pub trait IdentityProvider {
    fn current_user(&self) -> Option<UserId>;
}

/// Fixed identity, or anonymous
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(Option<UserId>);

impl StaticIdentity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self(Some(UserId::new(id)))
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.0.clone()
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Input for one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub kind: ContentKind,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(default)]
    pub style: PartialStyle,
    /// Overrides the service's formatter escaping for this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escaping: Option<Escaping>,
}

impl GenerateRequest {
    pub fn new(kind: ContentKind, fields: FieldMap) -> Self {
        Self {
            kind,
            fields,
            style: PartialStyle::default(),
            escaping: None,
        }
    }

    pub fn with_style(mut self, style: PartialStyle) -> Self {
        self.style = style;
        self
    }
}

/// Output of a successful generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub payload: String,
    pub style: StyleConfig,
    pub image: SymbolImage,
    /// Saved history record, when saving happened and succeeded
    pub record: Option<QrCodeRecord>,
}

// =============================================================================
// Service
// =============================================================================

/// Generation orchestrator
pub struct QrService<E: SymbolEncoder, S: HistoryStore> {
    encoder: E,
    store: Option<S>,
    config: ServiceConfig,
    formatter: ContentFormatter,
    resolver: StyleResolver,
}

impl<E: SymbolEncoder, S: HistoryStore> QrService<E, S> {
    pub fn new(encoder: E, store: Option<S>, config: ServiceConfig) -> Self {
        Self {
            encoder,
            store,
            config,
            formatter: ContentFormatter::new(),
            resolver: StyleResolver::new(),
        }
    }

    pub fn with_formatter(mut self, formatter: ContentFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_resolver(mut self, resolver: StyleResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    /// Generate a symbol for `request`
    pub fn generate(
        &self,
        request: &GenerateRequest,
        identity: &dyn IdentityProvider,
    ) -> StudioResult<GenerationResult> {
        let formatter = match request.escaping {
            Some(escaping) => ContentFormatter::with_escaping(escaping),
            None => self.formatter,
        };

        let payload = formatter.format(request.kind, &request.fields);
        if payload.trim().is_empty() {
            return Err(StudioError::empty_content("Nothing to encode")
                .with_details(format!("kind={}", request.kind)));
        }

        if request.kind == ContentKind::Url {
            if let Err(e) = url::Url::parse(&payload) {
                log_warn!(MODULE, "URL payload does not parse", payload = payload, reason = e);
            }
        }

        let style = self.resolver.resolve(&request.style);
        check_capacity(&payload, style.error_correction_level)?;

        log_debug!(
            MODULE,
            "Encoding payload",
            kind = request.kind,
            payload = payload,
            size = style.size,
            ecc = style.error_correction_level,
        );

        let image = self
            .encoder
            .encode(&payload, &style.encode_options())
            .map_err(|e| {
                StudioError::encoder_failed("Symbol encoding failed").with_details(e.to_string())
            })?;

        let record = self.save(request, &payload, &style, &image, identity);

        log_info!(MODULE, "Generated symbol", kind = request.kind, bytes = image.bytes.len());

        Ok(GenerationResult {
            payload,
            style,
            image,
            record,
        })
    }

    /// Newest-first history page for the current user; errors yield an empty page
    pub fn history(
        &self,
        limit: Option<usize>,
        offset: usize,
        identity: &dyn IdentityProvider,
    ) -> Vec<QrCodeRecord> {
        let Some(store) = &self.store else {
            log_warn!(MODULE, "History requested without a store");
            return Vec::new();
        };

        let limit = limit
            .unwrap_or(self.config.history_page_size)
            .min(MAX_PAGE_SIZE);
        let owner = identity.current_user();

        match store.list(limit, offset, owner.as_ref()) {
            Ok(records) => records,
            Err(e) => {
                log_warn!(MODULE, "Failed to load history", error = e);
                Vec::new()
            }
        }
    }

    fn save(
        &self,
        request: &GenerateRequest,
        payload: &str,
        style: &StyleConfig,
        image: &SymbolImage,
        identity: &dyn IdentityProvider,
    ) -> Option<QrCodeRecord> {
        if !self.config.history_enabled {
            return None;
        }

        let Some(store) = &self.store else {
            log_warn!(MODULE, "History enabled but no store attached");
            return None;
        };

        let owner = identity.current_user();
        let snapshot = NewQrRecord {
            kind: request.kind,
            content: payload.to_string(),
            data: request.fields.clone(),
            style: style.clone(),
            image_url: Some(image.to_data_url()),
        };

        match store.create(snapshot, owner.as_ref()) {
            Ok(record) => {
                let who = owner.as_ref().map(|u| u.as_str()).unwrap_or("anonymous");
                log_debug!(MODULE, "Saved history record", id = record.id, owner = who);
                Some(record)
            }
            Err(e) => {
                log_warn!(MODULE, "Failed to save history record", error = e);
                None
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::history::{
        InMemoryHistoryStore, QrRecordUpdate, QrTemplate, ScanDetails, ScanEvent, ScanSummary,
    };
    use crate::qr::{EncodeOptions, ErrorCorrectionLevel, SymbolError};
    use crate::types::field_map;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every call and returns a fixed image
    #[derive(Default)]
    struct FakeEncoder {
        calls: AtomicUsize,
        last_options: Mutex<Option<EncodeOptions>>,
    }

    impl SymbolEncoder for FakeEncoder {
        fn encode(
            &self,
            payload: &str,
            options: &EncodeOptions,
        ) -> Result<SymbolImage, SymbolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_options.lock().unwrap() = Some(options.clone());
            Ok(SymbolImage::new("image/png", payload.as_bytes().to_vec()))
        }
    }

    struct FailingEncoder;

    impl SymbolEncoder for FailingEncoder {
        fn encode(
            &self,
            _payload: &str,
            _options: &EncodeOptions,
        ) -> Result<SymbolImage, SymbolError> {
            Err(SymbolError::Backend("renderer offline".into()))
        }
    }

    /// Store whose every operation fails
    struct BrokenStore;

    impl HistoryStore for BrokenStore {
        fn create(&self, _: NewQrRecord, _: Option<&UserId>) -> StudioResult<QrCodeRecord> {
            Err(StudioError::persistence_failed("database unreachable"))
        }
        fn get(&self, id: &str, _: Option<&UserId>) -> StudioResult<QrCodeRecord> {
            Err(StudioError::not_found(id))
        }
        fn list(&self, _: usize, _: usize, _: Option<&UserId>) -> StudioResult<Vec<QrCodeRecord>> {
            Err(StudioError::persistence_failed("database unreachable"))
        }
        fn update(
            &self,
            id: &str,
            _: QrRecordUpdate,
            _: Option<&UserId>,
        ) -> StudioResult<QrCodeRecord> {
            Err(StudioError::not_found(id))
        }
        fn delete(&self, id: &str, _: Option<&UserId>) -> StudioResult<()> {
            Err(StudioError::not_found(id))
        }
        fn record_scan(&self, id: &str, _: ScanDetails) -> StudioResult<ScanEvent> {
            Err(StudioError::not_found(id))
        }
        fn scans(&self, _: &str, _: u64) -> StudioResult<Vec<ScanEvent>> {
            Err(StudioError::persistence_failed("database unreachable"))
        }
        fn analytics_summary(&self, _: Option<&UserId>) -> StudioResult<Vec<ScanSummary>> {
            Err(StudioError::persistence_failed("database unreachable"))
        }
        fn templates(&self, _: Option<&str>) -> StudioResult<Vec<QrTemplate>> {
            Err(StudioError::persistence_failed("database unreachable"))
        }
    }

    fn create_test_service() -> QrService<FakeEncoder, InMemoryHistoryStore> {
        QrService::new(
            FakeEncoder::default(),
            Some(InMemoryHistoryStore::new()),
            ServiceConfig::default(),
        )
    }

    #[test]
    fn test_generate_saves_record() {
        let service = create_test_service();
        let request = GenerateRequest::new(ContentKind::Phone, field_map([("phone", "+15551234")]));

        let result = service.generate(&request, &StaticIdentity::user("alice")).unwrap();
        assert_eq!(result.payload, "tel:+15551234");
        assert_eq!(result.image.bytes, b"tel:+15551234");

        let record = result.record.unwrap();
        assert_eq!(record.content, "tel:+15551234");
        assert_eq!(record.user_id, Some(UserId::new("alice")));
        assert!(record.image_url.unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(service.store().unwrap().len(), 1);
    }

    #[test]
    fn test_generate_passes_resolved_style_to_encoder() {
        let service = create_test_service();
        let request = GenerateRequest::new(ContentKind::Text, field_map([("text", "hi")]))
            .with_style(PartialStyle {
                size: Some(9000),
                foreground_color: Some("#F00".to_string()),
                error_correction_level: Some(ErrorCorrectionLevel::H),
                ..Default::default()
            });

        let result = service.generate(&request, &StaticIdentity::anonymous()).unwrap();
        assert_eq!(result.style.size, 512);

        let options = service.encoder.last_options.lock().unwrap().clone().unwrap();
        assert_eq!(options.width, 512);
        assert_eq!(options.dark_color, "#ff0000");
        assert_eq!(options.error_correction_level, ErrorCorrectionLevel::H);
    }

    #[test]
    fn test_empty_payload_never_reaches_encoder() {
        let service = create_test_service();
        let request = GenerateRequest::new(ContentKind::Text, field_map([("text", "   ")]));

        let err = service.generate(&request, &StaticIdentity::anonymous()).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyContent);
        assert_eq!(service.encoder.calls.load(Ordering::SeqCst), 0);
        assert!(service.store().unwrap().is_empty());
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let service = create_test_service();
        let text = "x".repeat(1300);
        let request = GenerateRequest::new(ContentKind::Text, field_map([("text", text.as_str())]))
            .with_style(PartialStyle {
                error_correction_level: Some(ErrorCorrectionLevel::H),
                ..Default::default()
            });

        let err = service.generate(&request, &StaticIdentity::anonymous()).unwrap_err();
        assert_eq!(err.code, ErrorCode::PayloadTooLarge);
        assert_eq!(service.encoder.calls.load(Ordering::SeqCst), 0);

        let relaxed = GenerateRequest::new(ContentKind::Text, field_map([("text", text.as_str())]));
        assert!(service.generate(&relaxed, &StaticIdentity::anonymous()).is_ok());
    }

    #[test]
    fn test_encoder_failure_reported() {
        let service: QrService<_, InMemoryHistoryStore> = QrService::new(
            FailingEncoder,
            Some(InMemoryHistoryStore::new()),
            ServiceConfig::default(),
        );
        let request = GenerateRequest::new(ContentKind::Text, field_map([("text", "hello")]));

        let err = service.generate(&request, &StaticIdentity::anonymous()).unwrap_err();
        assert_eq!(err.code, ErrorCode::EncoderFailed);
        assert!(err.details.unwrap().contains("renderer offline"));
        assert!(service.store().unwrap().is_empty());
    }

    #[test]
    fn test_store_failure_still_returns_image() {
        let service =
            QrService::new(FakeEncoder::default(), Some(BrokenStore), ServiceConfig::default());
        let request =
            GenerateRequest::new(ContentKind::Url, field_map([("url", "https://example.com")]));

        let result = service.generate(&request, &StaticIdentity::user("bob")).unwrap();
        assert_eq!(result.payload, "https://example.com");
        assert!(result.record.is_none());
        assert!(!result.image.bytes.is_empty());

        assert!(service.history(None, 0, &StaticIdentity::user("bob")).is_empty());
    }

    #[test]
    fn test_history_disabled_or_missing_store() {
        let config = ServiceConfig {
            history_enabled: false,
            ..Default::default()
        };
        let service =
            QrService::new(FakeEncoder::default(), Some(InMemoryHistoryStore::new()), config);
        let request = GenerateRequest::new(ContentKind::Text, field_map([("text", "hello")]));

        let result = service.generate(&request, &StaticIdentity::anonymous()).unwrap();
        assert!(result.record.is_none());
        assert!(service.store().unwrap().is_empty());

        let storeless: QrService<_, InMemoryHistoryStore> =
            QrService::new(FakeEncoder::default(), None, ServiceConfig::default());
        let result = storeless.generate(&request, &StaticIdentity::anonymous()).unwrap();
        assert!(result.record.is_none());
        assert!(storeless.history(None, 0, &StaticIdentity::anonymous()).is_empty());
    }

    #[test]
    fn test_history_paging_and_scoping() {
        let config = ServiceConfig {
            history_page_size: 2,
            ..Default::default()
        };
        let service =
            QrService::new(FakeEncoder::default(), Some(InMemoryHistoryStore::new()), config);
        let alice = StaticIdentity::user("alice");

        for text in ["one", "two", "three"] {
            let request = GenerateRequest::new(ContentKind::Text, field_map([("text", text)]));
            service.generate(&request, &alice).unwrap();
        }
        let request = GenerateRequest::new(ContentKind::Text, field_map([("text", "bob's")]));
        service.generate(&request, &StaticIdentity::user("bob")).unwrap();

        let page = service.history(None, 0, &alice);
        let contents: Vec<&str> = page.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["three", "two"]);

        let rest = service.history(Some(10), 2, &alice);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].content, "one");

        assert_eq!(service.history(Some(10), 0, &StaticIdentity::anonymous()).len(), 4);
    }

    #[test]
    fn test_history_page_capped() {
        let service = create_test_service();
        let anyone = StaticIdentity::anonymous();
        for i in 0..(MAX_PAGE_SIZE + 5) {
            let text = format!("code {}", i);
            let request =
                GenerateRequest::new(ContentKind::Text, field_map([("text", text.as_str())]));
            service.generate(&request, &anyone).unwrap();
        }

        assert_eq!(service.history(Some(1_000), 0, &anyone).len(), MAX_PAGE_SIZE);
        assert_eq!(service.history(None, 0, &anyone).len(), 10);
    }

    #[test]
    fn test_request_escaping_override() {
        let service = create_test_service();
        let mut request = GenerateRequest::new(
            ContentKind::Wifi,
            field_map([("ssid", "Cafe;Guest"), ("password", "pw"), ("security", "WPA")]),
        );

        let plain = service.generate(&request, &StaticIdentity::anonymous()).unwrap();
        assert!(plain.payload.contains("S:Cafe;Guest;"));

        request.escaping = Some(Escaping::Standard);
        let escaped = service.generate(&request, &StaticIdentity::anonymous()).unwrap();
        assert!(escaped.payload.contains(r"S:Cafe\;Guest;"));
    }

    #[test]
    fn test_request_deserialization() {
        let json = r#"{"kind":"SMS","fields":{"phone":"+1","message":"hi"},"style":{"size":300}}"#;
        let request: GenerateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind, ContentKind::Sms);
        assert_eq!(request.style.size, Some(300));
        assert!(request.escaping.is_none());
    }
}
