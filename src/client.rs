//! Long poll transport.
//!
//! One HTTP GET per poll iteration against the session's server, using
//! reqwest. The request timeout is the configured hold time plus a
//! margin, since the server may keep the connection open for the full
//! `wait` interval before answering.

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::config::LongPollConfig;
use crate::error::{LongPollError, LongPollResult};
use crate::types::{LongPollSession, PollEnvelope};

/// Build the `a_check` request URL for one poll.
///
/// Deterministic: identical session and config inputs yield identical
/// URLs.
///
/// # Errors
/// Fails when the session's server URL cannot be parsed.
pub fn poll_url(session: &LongPollSession, config: &LongPollConfig) -> LongPollResult<Url> {
    let url = Url::parse_with_params(
        &session.server,
        &[
            ("act", "a_check"),
            ("key", session.key.as_str()),
            ("ts", session.ts.as_str()),
            ("wait", &config.wait.to_string()),
            ("mode", &config.mode.to_string()),
            ("version", &config.version.to_string()),
        ],
    )?;
    Ok(url)
}

/// HTTP client for the Bots Long Poll server.
#[derive(Debug, Clone)]
pub struct LongPollClient {
    http: Client,
}

impl LongPollClient {
    /// Create a client with the request timeout sized for `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &LongPollConfig) -> LongPollResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(LongPollError::Http)?;
        Ok(Self { http })
    }

    /// Perform one poll request and decode the envelope.
    ///
    /// No retries; any failure propagates to the caller.
    ///
    /// # Errors
    /// `Server` for a non-success status (carrying status and body),
    /// `Http` for network failures, `Decode` for a malformed body.
    #[instrument(skip_all, fields(ts = %session.ts))]
    pub async fn check(
        &self,
        session: &LongPollSession,
        config: &LongPollConfig,
    ) -> LongPollResult<PollEnvelope> {
        let url = poll_url(session, config)?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LongPollError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let envelope: PollEnvelope = serde_json::from_str(&body)?;
        debug!(
            ts = %envelope.ts,
            updates = envelope.updates.len(),
            "long poll response"
        );
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session(server: &str) -> LongPollSession {
        LongPollSession::new(server, "secret", "41")
    }

    #[test]
    fn poll_url_carries_all_query_params() {
        let url = poll_url(
            &session("https://lp.vk.com/whp/123"),
            &LongPollConfig::default(),
        )
        .unwrap();

        assert_eq!(url.host_str(), Some("lp.vk.com"));
        assert_eq!(url.path(), "/whp/123");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("act".into(), "a_check".into())));
        assert!(pairs.contains(&("key".into(), "secret".into())));
        assert!(pairs.contains(&("ts".into(), "41".into())));
        assert!(pairs.contains(&("wait".into(), "25".into())));
        assert!(pairs.contains(&("mode".into(), "2".into())));
        assert!(pairs.contains(&("version".into(), "2".into())));
    }

    #[test]
    fn poll_url_is_deterministic() {
        let session = session("https://lp.vk.com/whp/123");
        let config = LongPollConfig::default();
        let first = poll_url(&session, &config).unwrap();
        let second = poll_url(&session, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn poll_url_rejects_garbage_server() {
        let result = poll_url(&session("not a url"), &LongPollConfig::default());
        assert!(matches!(result, Err(LongPollError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn check_decodes_envelope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("act", "a_check"))
            .and(query_param("key", "secret"))
            .and(query_param("ts", "41"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ts": "42",
                "updates": [
                    {
                        "type": "message_allow",
                        "object": { "user_id": 7 },
                        "group_id": 1,
                        "event_id": "e1"
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = LongPollClient::new(&LongPollConfig::default()).unwrap();
        let envelope = client
            .check(&session(&mock_server.uri()), &LongPollConfig::default())
            .await
            .unwrap();

        assert_eq!(envelope.ts, "42");
        assert_eq!(envelope.updates.len(), 1);
        assert_eq!(envelope.updates[0].kind, "message_allow");
        assert_eq!(envelope.updates[0].group_id, 1);
        assert_eq!(envelope.updates[0].event_id, "e1");
    }

    #[tokio::test]
    async fn check_surfaces_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let client = LongPollClient::new(&LongPollConfig::default()).unwrap();
        let err = client
            .check(&session(&mock_server.uri()), &LongPollConfig::default())
            .await
            .unwrap_err();

        match err {
            LongPollError::Server { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "bad gateway");
                assert!(LongPollError::Server { status, body }.is_retryable());
            }
            other => panic!("expected Server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_fails_on_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = LongPollClient::new(&LongPollConfig::default()).unwrap();
        let err = client
            .check(&session(&mock_server.uri()), &LongPollConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, LongPollError::Decode(_)));
    }
}
