//! Ticket machine service HTTP client.

use tracing::debug;

use crate::domain::{DecodedTicket, MachineConfig, MachineId, Ticket};
use crate::poller::RefreshHandle;

use super::TicketMachineFacade;
use super::codec::TicketCodec;
use super::convert::convert_machine_config;
use super::error::{CodecError, FacadeError};
use super::subscribers::ChangeSubscribers;
use super::types::MachineConfigDto;

/// Default base URL for a locally running ticket machine service.
const DEFAULT_BASE_URL: &str = "http://localhost:8080/lunderground/rest";

/// Configuration for the REST facade.
#[derive(Debug, Clone)]
pub struct RestFacadeConfig {
    /// Base URL for the service
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Secret used to sign and check tickets
    pub ticket_secret: String,
}

impl RestFacadeConfig {
    /// Create a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
            ticket_secret: String::new(),
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the ticket signing secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.ticket_secret = secret.into();
        self
    }
}

impl Default for RestFacadeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Facade backed by the ticket machine REST service.
#[derive(Debug)]
pub struct RestFacade {
    http: reqwest::Client,
    base_url: String,
    codec: TicketCodec,
    subscribers: ChangeSubscribers,
}

impl RestFacade {
    /// Create a new client with the given configuration.
    pub fn new(config: RestFacadeConfig) -> Result<Self, FacadeError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            codec: TicketCodec::new(config.ticket_secret),
            subscribers: ChangeSubscribers::new(),
        })
    }

    /// Tell every subscribed poller that configuration has changed.
    ///
    /// Called by whatever learns of the change (an operator, a push message
    /// from the service). Returns how many subscribers were notified.
    pub fn notify_config_changed(&self) -> usize {
        self.subscribers.notify_all()
    }
}

impl TicketMachineFacade for RestFacade {
    async fn fetch_config(&self, machine_id: &MachineId) -> Result<MachineConfig, FacadeError> {
        let url = format!("{}/ticketMachineConfig", self.base_url);
        debug!(%url, %machine_id, "fetching ticket machine configuration");

        let response = self
            .http
            .get(&url)
            .query(&[("uuid", machine_id.as_str())])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FacadeError::Unauthorized);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FacadeError::UnknownMachine(machine_id.clone()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FacadeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let dto: MachineConfigDto =
            serde_json::from_str(&body).map_err(|e| FacadeError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        Ok(convert_machine_config(&dto)?)
    }

    fn subscribe_config_changed(&self, handle: RefreshHandle) {
        self.subscribers.subscribe(handle);
    }

    fn encode_ticket(&self, ticket: &Ticket) -> Result<String, CodecError> {
        self.codec.encode(ticket)
    }

    fn decode_ticket(&self, encoded: &str) -> Result<DecodedTicket, CodecError> {
        self.codec.decode(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Price, RateBand, Station, Zone};
    use axum::Router;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::HashMap;

    const CONFIG_JSON: &str = r#"{
        "stationName": "Upney",
        "stationZone": 4,
        "stationList": [
            {"name": "Upney", "zone": 4},
            {"name": "Whitechapel", "zone": 2}
        ],
        "pricingDetails": {
            "fares": [{"fromZone": 2, "toZone": 4, "rateBand": "Peak", "price": 4.5}]
        }
    }"#;

    async fn config_handler(Query(params): Query<HashMap<String, String>>) -> Response {
        match params.get("uuid").map(String::as_str) {
            Some("tm-1") => (
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                CONFIG_JSON,
            )
                .into_response(),
            Some("locked") => StatusCode::FORBIDDEN.into_response(),
            Some("broken") => (StatusCode::OK, "{not json").into_response(),
            Some("down") => (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    /// Serve a fake ticket machine service on an ephemeral port.
    async fn serve() -> String {
        let app = Router::new().route("/rest/ticketMachineConfig", get(config_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/rest/")
    }

    fn facade(base_url: String) -> RestFacade {
        RestFacade::new(RestFacadeConfig::new(base_url).with_timeout(5).with_secret("s3cret"))
            .unwrap()
    }

    fn id(s: &str) -> MachineId {
        MachineId::parse(s).unwrap()
    }

    #[test]
    fn config_defaults() {
        let config = RestFacadeConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.ticket_secret.is_empty());
    }

    #[tokio::test]
    async fn fetches_and_converts_config() {
        let facade = facade(serve().await);

        let config = facade.fetch_config(&id("tm-1")).await.unwrap();
        assert_eq!(config.station_name(), "Upney");
        assert_eq!(config.station_list().len(), 2);
        assert_eq!(
            config
                .pricing_details()
                .fare(Zone::new(4).unwrap(), Zone::new(2).unwrap(), RateBand::Peak),
            Some(Price::from_pence(450))
        );
    }

    #[tokio::test]
    async fn maps_error_statuses() {
        let facade = facade(serve().await);

        assert!(matches!(
            facade.fetch_config(&id("nobody")).await,
            Err(FacadeError::UnknownMachine(_))
        ));
        assert!(matches!(
            facade.fetch_config(&id("locked")).await,
            Err(FacadeError::Unauthorized)
        ));
        assert!(matches!(
            facade.fetch_config(&id("broken")).await,
            Err(FacadeError::Json { .. })
        ));
        match facade.fetch_config(&id("down")).await {
            Err(FacadeError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_service_is_http_error() {
        // Bind then drop to get a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let facade = facade(format!("http://{addr}"));
        assert!(matches!(
            facade.fetch_config(&id("tm-1")).await,
            Err(FacadeError::Http(_))
        ));
    }

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, hour, min, 0).unwrap()
    }

    #[test]
    fn verify_gate_access_round_trip() {
        let facade = facade(DEFAULT_BASE_URL.to_string());
        let ticket = Ticket::new(
            at(12, 30),
            at(14, 30),
            RateBand::OffPeak,
            Price::from_pence(500),
            Station::new("Upney", Zone::new(2).unwrap()),
            Station::new("Whitechapel", Zone::new(4).unwrap()),
        )
        .unwrap();
        let encoded = facade.encode_ticket(&ticket).unwrap();

        assert!(facade.verify_gate_access(&encoded, Zone::new(3).unwrap(), at(13, 31)));
        assert!(!facade.verify_gate_access(&encoded, Zone::new(1).unwrap(), at(13, 31)));
        assert!(!facade.verify_gate_access(&encoded, Zone::new(3).unwrap(), at(11, 30)));
        assert!(!facade.verify_gate_access("not a ticket", Zone::new(3).unwrap(), at(13, 31)));
    }
}
