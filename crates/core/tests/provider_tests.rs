// ═══════════════════════════════════════════════════════════════════
// Provider Tests: Registry routing/fallback, Frankfurter, open.er-api
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use currency_converter_core::errors::CoreError;
use currency_converter_core::models::rates::{RateSnapshot, RawRatesByDate};
use currency_converter_core::models::settings::Settings;
use currency_converter_core::models::window::DateRange;
use currency_converter_core::providers::frankfurter::FrankfurterProvider;
use currency_converter_core::providers::open_er_api::OpenErApiProvider;
use currency_converter_core::providers::registry::RateProviderRegistry;
use currency_converter_core::providers::traits::{RateCapability, RateProvider};

// ═══════════════════════════════════════════════════════════════════
// Test Helpers: Mock Providers
// ═══════════════════════════════════════════════════════════════════

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A provider that answers every request with a fixed snapshot/history.
struct MockProvider {
    name: String,
    caps: Vec<RateCapability>,
    eur_rate: f64,
}

impl MockProvider {
    fn new(name: &str, caps: Vec<RateCapability>, eur_rate: f64) -> Self {
        Self {
            name: name.to_string(),
            caps,
            eur_rate,
        }
    }
}

#[async_trait]
impl RateProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Vec<RateCapability> {
        self.caps.clone()
    }

    async fn fetch_current_rates(&self, base: &str) -> Result<RateSnapshot, CoreError> {
        RateSnapshot::new(
            base,
            HashMap::from([(base.to_string(), 1.0), ("EUR".to_string(), self.eur_rate)]),
        )
    }

    async fn fetch_history(
        &self,
        _from: &str,
        to: &str,
        range: DateRange,
    ) -> Result<RawRatesByDate, CoreError> {
        Ok(HashMap::from([(
            range.end.format("%Y-%m-%d").to_string(),
            HashMap::from([(to.to_string(), self.eur_rate)]),
        )]))
    }
}

/// A provider that always fails.
struct FailingProvider {
    name: String,
    caps: Vec<RateCapability>,
}

impl FailingProvider {
    fn new(name: &str, caps: Vec<RateCapability>) -> Self {
        Self {
            name: name.to_string(),
            caps,
        }
    }
}

#[async_trait]
impl RateProvider for FailingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Vec<RateCapability> {
        self.caps.clone()
    }

    async fn fetch_current_rates(&self, base: &str) -> Result<RateSnapshot, CoreError> {
        Err(CoreError::Api {
            provider: self.name.clone(),
            message: format!("Failed for {base}"),
        })
    }

    async fn fetch_history(
        &self,
        from: &str,
        to: &str,
        _range: DateRange,
    ) -> Result<RawRatesByDate, CoreError> {
        Err(CoreError::Api {
            provider: self.name.clone(),
            message: format!("Failed history for {from}/{to}"),
        })
    }
}

const BOTH: [RateCapability; 2] = [RateCapability::Snapshot, RateCapability::History];

fn names(registry: &RateProviderRegistry, capability: RateCapability) -> Vec<&str> {
    registry
        .get_providers_for(capability)
        .into_iter()
        .map(|p| p.name())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════
// RateProviderRegistry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn new_creates_empty_registry() {
        let registry = RateProviderRegistry::new();
        assert!(registry.get_providers_for(RateCapability::Snapshot).is_empty());
        assert!(registry.get_providers_for(RateCapability::History).is_empty());
        assert!(registry.capabilities().is_empty());
    }

    #[test]
    fn defaults_route_history_to_frankfurter_only() {
        let registry = RateProviderRegistry::new_with_defaults(&Settings::default());
        assert_eq!(
            names(&registry, RateCapability::Snapshot),
            vec!["ExchangeRate-API", "Frankfurter"]
        );
        assert_eq!(
            names(&registry, RateCapability::History),
            vec!["Frankfurter"]
        );
    }

    #[test]
    fn routes_by_capability() {
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(MockProvider::new(
            "SnapOnly",
            vec![RateCapability::Snapshot],
            0.9,
        )));
        registry.register(Box::new(MockProvider::new(
            "HistOnly",
            vec![RateCapability::History],
            0.9,
        )));

        assert_eq!(names(&registry, RateCapability::Snapshot), vec!["SnapOnly"]);
        assert_eq!(names(&registry, RateCapability::History), vec!["HistOnly"]);
        assert_eq!(registry.capabilities(), BOTH.to_vec());
    }

    #[tokio::test]
    async fn first_provider_wins() {
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(MockProvider::new("A", BOTH.to_vec(), 0.9)));
        registry.register(Box::new(MockProvider::new("B", BOTH.to_vec(), 0.8)));

        let snap = registry.fetch_current_rates("USD").await.unwrap();
        assert_eq!(snap.rate("EUR"), Some(0.9));
    }

    #[tokio::test]
    async fn falls_back_on_snapshot_failure() {
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(FailingProvider::new("Down", BOTH.to_vec())));
        registry.register(Box::new(MockProvider::new("Up", BOTH.to_vec(), 0.8)));

        let snap = registry.fetch_current_rates("USD").await.unwrap();
        assert_eq!(snap.rate("EUR"), Some(0.8));
    }

    #[tokio::test]
    async fn falls_back_on_history_failure() {
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(FailingProvider::new("Down", BOTH.to_vec())));
        registry.register(Box::new(MockProvider::new("Up", BOTH.to_vec(), 0.8)));

        let range = DateRange::ending_on(date(2024, 1, 3), 2);
        let raw = registry.fetch_history("USD", "EUR", range).await.unwrap();
        assert_eq!(raw["2024-01-03"]["EUR"], 0.8);
    }

    #[tokio::test]
    async fn all_failing_returns_last_error() {
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(FailingProvider::new("First", BOTH.to_vec())));
        registry.register(Box::new(FailingProvider::new("Second", BOTH.to_vec())));

        let err = registry.fetch_current_rates("USD").await.unwrap_err();
        match err {
            CoreError::Api { provider, .. } => assert_eq!(provider, "Second"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_provider_for_capability() {
        let mut registry = RateProviderRegistry::new();
        registry.register(Box::new(MockProvider::new(
            "SnapOnly",
            vec![RateCapability::Snapshot],
            0.9,
        )));

        let range = DateRange::ending_on(date(2024, 1, 3), 2);
        let err = registry.fetch_history("USD", "EUR", range).await.unwrap_err();
        assert!(matches!(err, CoreError::NoProvider(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// FrankfurterProvider: HTTP decoding against a mock server
// ═══════════════════════════════════════════════════════════════════

mod frankfurter {
    use super::*;

    fn provider(server: &MockServer) -> FrankfurterProvider {
        FrankfurterProvider::with_base_url(&server.uri(), Duration::from_secs(5))
    }

    #[test]
    fn advertises_both_capabilities() {
        let p = FrankfurterProvider::new();
        assert_eq!(p.name(), "Frankfurter");
        assert_eq!(p.capabilities(), BOTH.to_vec());
    }

    #[tokio::test]
    async fn fetches_time_series() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024-01-01..2024-01-03"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"amount":1.0,"base":"USD","start_date":"2024-01-02","end_date":"2024-01-03",
                    "rates":{"2024-01-03":{"EUR":0.91},"2024-01-02":{"EUR":0.90}}}"#,
            ))
            .mount(&server)
            .await;

        let range = DateRange::ending_on(date(2024, 1, 3), 2);
        let raw = provider(&server)
            .fetch_history("usd", "eur", range)
            .await
            .unwrap();

        assert_eq!(raw.len(), 2);
        assert_eq!(raw["2024-01-02"]["EUR"], 0.90);
        assert_eq!(raw["2024-01-03"]["EUR"], 0.91);
    }

    #[tokio::test]
    async fn same_currency_is_flat_without_network() {
        // No mocks mounted: any request would 404.
        let server = MockServer::start().await;
        let range = DateRange::ending_on(date(2024, 1, 3), 2);
        let raw = provider(&server)
            .fetch_history("EUR", "EUR", range)
            .await
            .unwrap();

        assert_eq!(raw.len(), 3);
        assert!(raw.values().all(|r| r["EUR"] == 1.0));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_time_series_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024-01-01..2024-01-03"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rates": [1, 2]}"#))
            .mount(&server)
            .await;

        let range = DateRange::ending_on(date(2024, 1, 3), 2);
        let err = provider(&server)
            .fetch_history("USD", "EUR", range)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
    }

    #[tokio::test]
    async fn server_error_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let range = DateRange::ending_on(date(2024, 1, 3), 2);
        let err = provider(&server)
            .fetch_history("USD", "EUR", range)
            .await
            .unwrap_err();
        match err {
            CoreError::Network(msg) => assert!(!msg.contains("from=USD")),
            other => panic!("expected Network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn latest_includes_base_at_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("from", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"amount":1.0,"base":"USD","date":"2024-01-03","rates":{"EUR":0.91,"JPY":144.2}}"#,
            ))
            .mount(&server)
            .await;

        let snap = provider(&server).fetch_current_rates("USD").await.unwrap();
        assert_eq!(snap.base(), "USD");
        assert_eq!(snap.rate("USD"), Some(1.0));
        assert_eq!(snap.rate("JPY"), Some(144.2));
    }
}

// ═══════════════════════════════════════════════════════════════════
// OpenErApiProvider: HTTP decoding against a mock server
// ═══════════════════════════════════════════════════════════════════

mod open_er_api {
    use super::*;

    fn provider(server: &MockServer) -> OpenErApiProvider {
        OpenErApiProvider::with_base_url(&server.uri(), Duration::from_secs(5))
    }

    async fn serve(body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn advertises_snapshot_only() {
        let p = OpenErApiProvider::new();
        assert_eq!(p.capabilities(), vec![RateCapability::Snapshot]);
    }

    #[tokio::test]
    async fn fetches_snapshot() {
        let server = serve(
            r#"{"result":"success","base_code":"USD","time_last_update_unix":1704240000,
                "rates":{"USD":1,"EUR":0.9,"JPY":150.0}}"#,
        )
        .await;

        let snap = provider(&server).fetch_current_rates("usd").await.unwrap();
        assert_eq!(snap.base(), "USD");
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.rate("EUR"), Some(0.9));
    }

    #[tokio::test]
    async fn missing_rates_is_parse_error() {
        let server = serve(r#"{"result":"success","base_code":"USD"}"#).await;
        let err = provider(&server).fetch_current_rates("USD").await.unwrap_err();
        assert!(matches!(err, CoreError::SnapshotParseError(_)));
    }

    #[tokio::test]
    async fn wrong_shape_is_parse_error() {
        let server = serve(r#"{"result":"success","rates":{"EUR":"0.9"}}"#).await;
        let err = provider(&server).fetch_current_rates("USD").await.unwrap_err();
        assert!(matches!(err, CoreError::SnapshotParseError(_)));
    }

    #[tokio::test]
    async fn non_positive_rate_is_parse_error() {
        let server = serve(r#"{"result":"success","rates":{"USD":1,"EUR":0}}"#).await;
        let err = provider(&server).fetch_current_rates("USD").await.unwrap_err();
        assert!(matches!(err, CoreError::SnapshotParseError(_)));
    }

    #[tokio::test]
    async fn error_result_is_api_error() {
        let server = serve(r#"{"result":"error","error-type":"unsupported-code"}"#).await;
        let err = provider(&server).fetch_current_rates("USD").await.unwrap_err();
        match err {
            CoreError::Api { message, .. } => assert!(message.contains("unsupported-code")),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn history_is_unsupported() {
        let p = OpenErApiProvider::new();
        let range = DateRange::ending_on(date(2024, 1, 3), 2);
        let err = p.fetch_history("USD", "EUR", range).await.unwrap_err();
        assert!(matches!(err, CoreError::NoProvider(_)));
    }

    #[tokio::test]
    async fn registry_falls_back_to_frankfurter() {
        let er_api = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&er_api)
            .await;

        let frankfurter = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"amount":1.0,"base":"USD","date":"2024-01-03","rates":{"EUR":0.91}}"#,
            ))
            .mount(&frankfurter)
            .await;

        let settings = Settings::from_json_str(&format!(
            r#"{{"providers": {{"open_er_api_url": "{}", "frankfurter_url": "{}"}}}}"#,
            er_api.uri(),
            frankfurter.uri()
        ))
        .unwrap();

        let registry = RateProviderRegistry::new_with_defaults(&settings);
        let snap = registry.fetch_current_rates("USD").await.unwrap();
        assert_eq!(snap.rate("EUR"), Some(0.91));
    }
}
