//! HTTP transport for configuration switching
//!
//! Plain reqwest calls against the proxy portal: one GET per switch, plus the
//! catalog listing used to populate the dropdown.

use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use super::error::SwitchError;
use crate::config::settings::ServerSettings;
use crate::constants::http::{APPLICATION_JSON, CONFIG_ID_PARAM};

/// Everything one switch request needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchRequest {
    pub config_id: String,
    pub token: String,
    pub cookie_header: String,
}

/// Decoded server answer. The status is informational only.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchResponse {
    pub status: u16,
    pub payload: Value,
}

/// Sends a switch request and decodes the JSON answer
pub trait ConfigTransport: Send + Sync + 'static {
    fn select_config(
        &self,
        request: &SwitchRequest,
    ) -> impl Future<Output = Result<SwitchResponse, SwitchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    select_url: Url,
    configs_url: Url,
}

fn parse_url(raw: &str) -> Result<Url, SwitchError> {
    Url::parse(raw).map_err(|err| SwitchError::InvalidUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })
}

impl HttpTransport {
    pub fn new(server: &ServerSettings) -> Result<Self, SwitchError> {
        let client = Client::builder()
            .timeout(server.request_timeout())
            .build()?;

        let select_url = parse_url(&format!(
            "{}/{}",
            server.base_url.trim_end_matches('/'),
            server.select_path.trim_start_matches('/')
        ))?;
        let configs_url = parse_url(&server.configs_url())?;

        Ok(Self {
            client,
            select_url,
            configs_url,
        })
    }

    /// Build the GET without sending it
    pub fn build_select_request(
        &self,
        request: &SwitchRequest,
    ) -> Result<reqwest::Request, SwitchError> {
        let mut builder = self
            .client
            .get(self.select_url.clone())
            .query(&[(CONFIG_ID_PARAM, request.config_id.as_str())])
            .header(ACCEPT, APPLICATION_JSON)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .bearer_auth(&request.token);

        if !request.cookie_header.is_empty() {
            builder = builder.header(COOKIE, &request.cookie_header);
        }

        Ok(builder.build()?)
    }

    /// Fetch the identifiers of every configuration visible to the token
    pub async fn list_configs(&self, token: &str) -> Result<Vec<String>, SwitchError> {
        debug!(url = %self.configs_url, "Fetching config catalog");

        let response = self
            .client
            .get(self.configs_url.clone())
            .header(ACCEPT, APPLICATION_JSON)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&body)?;
        Ok(config_ids(&payload))
    }
}

impl ConfigTransport for HttpTransport {
    fn select_config(
        &self,
        request: &SwitchRequest,
    ) -> impl Future<Output = Result<SwitchResponse, SwitchError>> + Send {
        let built = self.build_select_request(request);
        let client = self.client.clone();

        async move {
            let response = client.execute(built?).await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            let payload = serde_json::from_slice(&body)?;
            Ok::<_, SwitchError>(SwitchResponse { status, payload })
        }
    }
}

/// Pull the `id` of every catalog entry that has a non-empty one
pub fn config_ids(payload: &Value) -> Vec<String> {
    payload
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("id").and_then(Value::as_str))
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::switcher::error::FailureKind;
    use crate::switcher::test_support::{refused_url, serve_once};
    use serde_json::json;

    fn settings_for(base_url: &str) -> ServerSettings {
        ServerSettings {
            base_url: base_url.to_string(),
            ..ServerSettings::default()
        }
    }

    fn request(config_id: &str, token: &str) -> SwitchRequest {
        SwitchRequest {
            config_id: config_id.to_string(),
            token: token.to_string(),
            cookie_header: format!("proxy={token}"),
        }
    }

    #[test]
    fn test_select_request_shape() {
        let transport = HttpTransport::new(&settings_for("http://portal.local:8500/")).unwrap();
        let built = transport
            .build_select_request(&request("strict", "T"))
            .unwrap();

        assert_eq!(built.method(), reqwest::Method::GET);
        assert_eq!(
            built.url().as_str(),
            "http://portal.local:8500/config_id?config_id=strict"
        );

        let headers = built.headers();
        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[reqwest::header::AUTHORIZATION], "Bearer T");
        assert_eq!(headers[COOKIE], "proxy=T");
    }

    #[test]
    fn test_config_id_is_url_encoded() {
        let transport = HttpTransport::new(&settings_for("http://portal.local")).unwrap();
        let built = transport
            .build_select_request(&request("a&b=c", "T"))
            .unwrap();

        assert_eq!(built.url().query(), Some("config_id=a%26b%3Dc"));
        let pairs: Vec<_> = built.url().query_pairs().collect();
        assert_eq!(pairs[0].1, "a&b=c");
    }

    #[test]
    fn test_empty_cookie_header_is_omitted() {
        let transport = HttpTransport::new(&settings_for("http://portal.local")).unwrap();
        let mut req = request("x", "T");
        req.cookie_header.clear();

        let built = transport.build_select_request(&req).unwrap();
        assert!(built.headers().get(COOKIE).is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpTransport::new(&settings_for("not a url")).unwrap_err();
        assert!(matches!(err, SwitchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_config_ids_from_catalog() {
        let payload = json!([
            {"id": "default", "name": "Default"},
            {"name": "no id"},
            {"id": ""},
            {"id": 42},
            {"id": "strict"}
        ]);
        assert_eq!(config_ids(&payload), vec!["default", "strict"]);
        assert!(config_ids(&json!({"detail": "nope"})).is_empty());
    }

    #[tokio::test]
    async fn test_select_config_over_http() {
        let (base_url, server) = serve_once("200 OK", r#"{"status":"ok"}"#).await;
        let transport = HttpTransport::new(&settings_for(&base_url)).unwrap();

        let response = transport
            .select_config(&request("strict", "tok"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.payload, json!({"status": "ok"}));

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /config_id?config_id=strict http/1.1"));
        assert!(raw.contains("authorization: bearer tok"));
        assert!(raw.contains("accept: application/json"));
        assert!(raw.contains("content-type: application/json"));
        assert!(raw.contains("cookie: proxy=tok"));
    }

    #[tokio::test]
    async fn test_error_status_is_still_decoded() {
        let (base_url, server) =
            serve_once("403 Forbidden", r#"{"detail":"Invalid token"}"#).await;
        let transport = HttpTransport::new(&settings_for(&base_url)).unwrap();

        let response = transport.select_config(&request("x", "bad")).await.unwrap();
        assert_eq!(response.status, 403);
        assert_eq!(response.payload["detail"], "Invalid token");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let (base_url, server) = serve_once("200 OK", "<html>login</html>").await;
        let transport = HttpTransport::new(&settings_for(&base_url)).unwrap();

        let err = transport.select_config(&request("x", "T")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let transport = HttpTransport::new(&settings_for(&refused_url().await)).unwrap();

        let err = transport.select_config(&request("x", "T")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[tokio::test]
    async fn test_list_configs() {
        let (base_url, server) =
            serve_once("200 OK", r#"[{"id":"default"},{"id":"strict"}]"#).await;
        let transport = HttpTransport::new(&settings_for(&base_url)).unwrap();

        let ids = transport.list_configs("tok").await.unwrap();
        assert_eq!(ids, vec!["default", "strict"]);

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /v1/rails/configs http/1.1"));
        assert!(raw.contains("authorization: bearer tok"));
    }

    #[tokio::test]
    async fn test_list_configs_rejects_error_status() {
        let (base_url, server) = serve_once("401 Unauthorized", r#"{"detail":"no"}"#).await;
        let transport = HttpTransport::new(&settings_for(&base_url)).unwrap();

        let err = transport.list_configs("tok").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        server.await.unwrap();
    }
}
