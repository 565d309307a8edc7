//! Foreman API v2 client.
//!
//! [`ForemanClient`] implements [`ResourceClient`] over blocking HTTP. One
//! method call is one request; nothing is retried or cached.

use crate::error::{Error, Result};
use crate::types::{ConnectionOptions, Endpoint};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use declarative::{ApiError, Attributes, Kind, LookupKey, Resource, ResourceClient, ResourceId};
use serde_json::{Map, Value};
use ureq::Body;
use ureq::http::Response;

const JSON: &str = "application/json";
const USER_AGENT: &str = concat!("foremanctl/", env!("CARGO_PKG_VERSION"));

/// Foreman API client.
///
/// # Example
///
/// ```no_run
/// use declarative::{Kind, LookupKey, ResourceClient};
/// use foreman::{ConnectionOptions, ForemanClient};
///
/// let opts = ConnectionOptions::new("admin", "secret").host("foreman.example.com");
/// let client = ForemanClient::new(&opts).unwrap();
/// let role = client.find(Kind::Role, &LookupKey::by_name("Viewer")).unwrap();
/// println!("{role:?}");
/// ```
pub struct ForemanClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Scheme, host and port, e.g. `https://foreman.example.com:443`.
    base_url: String,
    /// Precomputed `Authorization` header value.
    authorization: String,
}

impl ForemanClient {
    /// Create a client for the given server.
    pub fn new(options: &ConnectionOptions) -> Result<Self> {
        options.validate()?;
        let base_url = options.base_url()?;

        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(!options.verify_tls)
            .build();
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(options.timeout))
            .tls_config(tls)
            .build()
            .into();

        if !options.verify_tls {
            log::warn!("TLS certificate verification is disabled for {base_url}");
        }

        Ok(Self {
            agent,
            base_url,
            authorization: basic_auth(&options.user, &options.password),
        })
    }

    /// Get the server base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Option<Value>> {
        let url = self.url(path);
        log::debug!("GET {url} {query:?}");
        let mut request = self
            .agent
            .get(&url)
            .header("Accept", JSON)
            .header("Authorization", &self.authorization)
            .header("User-Agent", USER_AGENT);
        for (key, value) in query {
            request = request.query(*key, value);
        }
        read_response(request.call()?)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Option<Value>> {
        let url = self.url(path);
        log::debug!("POST {url}");
        let response = self
            .agent
            .post(&url)
            .header("Accept", JSON)
            .header("Content-Type", JSON)
            .header("Authorization", &self.authorization)
            .header("User-Agent", USER_AGENT)
            .send_json(body)?;
        read_response(response)
    }

    fn put(&self, path: &str, body: &Value) -> Result<Option<Value>> {
        let url = self.url(path);
        log::debug!("PUT {url}");
        let response = self
            .agent
            .put(&url)
            .header("Accept", JSON)
            .header("Content-Type", JSON)
            .header("Authorization", &self.authorization)
            .header("User-Agent", USER_AGENT)
            .send_json(body)?;
        read_response(response)
    }

    fn delete_path(&self, path: &str) -> Result<Option<Value>> {
        let url = self.url(path);
        log::debug!("DELETE {url}");
        let response = self
            .agent
            .delete(&url)
            .header("Accept", JSON)
            .header("Authorization", &self.authorization)
            .header("User-Agent", USER_AGENT)
            .call()?;
        read_response(response)
    }

    fn list_records(&self, kind: Kind, hint: &LookupKey) -> Result<Vec<Resource>> {
        let endpoint = Endpoint::for_kind(kind);
        let body = self
            .get(&endpoint.path, &endpoint.list_query(hint))?
            .ok_or_else(|| Error::InvalidResponse("empty body for a list request".to_string()))?;
        decode_list(body)
    }

    fn create_record(&self, kind: Kind, attributes: &Attributes) -> Result<Resource> {
        let endpoint = Endpoint::for_kind(kind);
        let body = self
            .post(&endpoint.path, &wrap(endpoint.wrapper, attributes))?
            .ok_or_else(|| Error::InvalidResponse("empty body for a create request".to_string()))?;
        decode_record(endpoint.wrapper, body)
    }

    fn update_record(
        &self,
        kind: Kind,
        id: ResourceId,
        attributes: &Attributes,
    ) -> Result<Resource> {
        let endpoint = Endpoint::for_kind(kind);
        let body = self
            .put(&endpoint.member(id), &wrap(endpoint.wrapper, attributes))?
            .ok_or_else(|| Error::InvalidResponse("empty body for an update request".to_string()))?;
        decode_record(endpoint.wrapper, body)
    }

    fn delete_record(&self, kind: Kind, id: ResourceId) -> Result<Option<Resource>> {
        let endpoint = Endpoint::for_kind(kind);
        match self.delete_path(&endpoint.member(id))? {
            Some(body) => decode_record(endpoint.wrapper, body).map(Some),
            None => Ok(None),
        }
    }
}

impl ResourceClient for ForemanClient {
    fn list(&self, kind: Kind, hint: &LookupKey) -> std::result::Result<Vec<Resource>, ApiError> {
        self.list_records(kind, hint).map_err(ApiError::from)
    }

    fn create(
        &self,
        kind: Kind,
        attributes: &Attributes,
    ) -> std::result::Result<Resource, ApiError> {
        self.create_record(kind, attributes).map_err(ApiError::from)
    }

    fn update(
        &self,
        kind: Kind,
        id: ResourceId,
        attributes: &Attributes,
    ) -> std::result::Result<Resource, ApiError> {
        self.update_record(kind, id, attributes)
            .map_err(ApiError::from)
    }

    fn delete(
        &self,
        kind: Kind,
        id: ResourceId,
    ) -> std::result::Result<Option<Resource>, ApiError> {
        self.delete_record(kind, id).map_err(ApiError::from)
    }
}

/// `Authorization` header value for HTTP basic auth.
fn basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

/// Turn a response into its JSON body, or an error for non-2xx statuses.
fn read_response(mut response: Response<Body>) -> Result<Option<Value>> {
    let status = response.status().as_u16();
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| Error::Transport(e.to_string()))?;

    if !(200..300).contains(&status) {
        return Err(Error::http(status, &text));
    }
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&text)?))
}

/// Wrap attributes under the kind's payload key: `{"role": {...}}`.
fn wrap(wrapper: &str, attributes: &Attributes) -> Value {
    let inner: Map<String, Value> = attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let mut outer = Map::new();
    outer.insert(wrapper.to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// Decode a list answer: `{"results": [...]}` or a bare array.
fn decode_list(body: Value) -> Result<Vec<Resource>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("results") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::InvalidResponse(
                    "list response has no 'results' array".to_string(),
                ));
            }
        },
        other => {
            return Err(Error::InvalidResponse(format!(
                "expected a list response, got {other}"
            )));
        }
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(Error::from))
        .collect()
}

/// Decode a single record, unwrapping `{"<wrapper>": {...}}` if present.
fn decode_record(wrapper: &str, body: Value) -> Result<Resource> {
    let record = match body {
        Value::Object(mut object) if object.len() == 1 && object.contains_key(wrapper) => {
            object.remove(wrapper).unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(record)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::ErrorCategory;
    use serde_json::json;

    #[test]
    fn test_basic_auth() {
        assert_eq!(basic_auth("admin", "secret"), "Basic YWRtaW46c2VjcmV0");
    }

    #[test]
    fn test_new_rejects_missing_credentials() {
        let opts = ConnectionOptions::new("admin", "");
        assert!(matches!(
            ForemanClient::new(&opts),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_builds_base_url() {
        let opts = ConnectionOptions::new("admin", "secret")
            .host("foreman.example.com")
            .port(8443)
            .verify_tls(false);
        let client = ForemanClient::new(&opts).unwrap();
        assert_eq!(client.base_url(), "https://foreman.example.com:8443");
        assert_eq!(
            client.url("/api/roles"),
            "https://foreman.example.com:8443/api/roles"
        );
    }

    #[test]
    fn test_wrap_payload() {
        let mut attributes = Attributes::new();
        attributes.insert("name".into(), json!("FreeBSD"));
        attributes.insert("layout".into(), json!("zerombr"));
        assert_eq!(
            wrap("ptable", &attributes),
            json!({"ptable": {"name": "FreeBSD", "layout": "zerombr"}})
        );
    }

    #[test]
    fn test_decode_list_results() {
        let body = json!({
            "total": 2,
            "subtotal": 1,
            "page": 1,
            "per_page": 20,
            "search": "name=\"MyRole\"",
            "results": [{"id": 7, "name": "MyRole", "builtin": 0}]
        });
        let resources = decode_list(body).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].id, ResourceId(7));
        assert_eq!(resources[0].name(), Some("MyRole"));
    }

    #[test]
    fn test_decode_list_bare_array() {
        let body = json!([
            {"id": 40, "config_template_id": 12, "template_kind_id": 3},
            {"id": 41, "config_template_id": 13, "template_kind_id": 1}
        ]);
        let resources = decode_list(body).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[1].get_id("config_template_id"), Some(ResourceId(13)));
    }

    #[test]
    fn test_decode_list_rejects_other_shapes() {
        assert!(decode_list(json!({"total": 0})).is_err());
        assert!(decode_list(json!("nope")).is_err());

        let err = decode_list(json!({"results": [{"name": "no id"}]})).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidResponse);
    }

    #[test]
    fn test_decode_record_unwraps_payload_key() {
        let wrapped = json!({"role": {"id": 7, "name": "MyRole"}});
        assert_eq!(decode_record("role", wrapped).unwrap().id, ResourceId(7));

        let flat = json!({"id": 8, "name": "Other"});
        assert_eq!(decode_record("role", flat).unwrap().id, ResourceId(8));
    }

    #[test]
    fn test_decode_record_does_not_unwrap_real_fields() {
        // A record with a single field named like the wrapper is still a record
        let body = json!({"id": 3, "ptable": "x"});
        let record = decode_record("ptable", body).unwrap();
        assert_eq!(record.get_str("ptable"), Some("x"));
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        let opts = ConnectionOptions::new("admin", "secret")
            .host("http://127.0.0.1")
            .port(9)
            .timeout(std::time::Duration::from_secs(2));
        let client = ForemanClient::new(&opts).unwrap();
        let err = client
            .list(Kind::Role, &LookupKey::by_name("MyRole"))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transport);
    }
}
