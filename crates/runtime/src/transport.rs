//! reqwest-backed operators for the operations of an OpenAPI document.

use std::sync::Arc;

use contentgen_core::client::{Endpoint, HttpMethod};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::TransportError;
use crate::operator::{ApiResponse, Operator};

/// Parameter carrying the JSON request body.
pub const BODY_PARAMETER: &str = "body";

/// reqwest client bound to the API base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Arc<Url>,
}

impl HttpTransport {
    /// Transport with a default client.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Transport reusing `client`. The base URL must be able to carry a path.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, TransportError> {
        let url = Url::parse(base_url).map_err(|source| TransportError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(TransportError::OpaqueBaseUrl(base_url.to_string()));
        }
        Ok(HttpTransport {
            client,
            base_url: Arc::new(url),
        })
    }

    /// Base every operation path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Operator calling `endpoint` through this transport.
    pub fn operator(&self, endpoint: Endpoint) -> HttpOperator {
        HttpOperator {
            transport: self.clone(),
            endpoint: Arc::new(endpoint),
        }
    }

    /// Substitute `{placeholders}` in `path`, removing them from `parameters`.
    fn url(
        &self,
        endpoint: &Endpoint,
        parameters: &mut Map<String, Value>,
    ) -> Result<Url, TransportError> {
        let mut url = (*self.base_url).clone();
        let mut segments = Vec::new();
        for segment in endpoint.path.split('/').filter(|s| !s.is_empty()) {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    let value = parameters.remove(name).ok_or_else(|| {
                        TransportError::MissingPathParameter {
                            operation_id: endpoint.operation_id.clone(),
                            name: name.to_string(),
                        }
                    })?;
                    segments.push(scalar(&value));
                }
                None => segments.push(segment.to_string()),
            }
        }

        url.path_segments_mut()
            .map_err(|()| TransportError::OpaqueBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(&segments);
        Ok(url)
    }
}

fn set_query(url: &mut Url, parameters: &Map<String, Value>) {
    if parameters.is_empty() {
        return;
    }
    let mut query = url.query_pairs_mut();
    for (name, value) in parameters {
        append_query(&mut query, name, value);
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Nested objects and arrays use bracket notation: `pagination[page]=1`.
fn append_query(
    query: &mut url::form_urlencoded::Serializer<'_, url::UrlQuery<'_>>,
    key: &str,
    value: &Value,
) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                append_query(query, &format!("{key}[{index}]"), item);
            }
        }
        Value::Object(map) => {
            for (name, item) in map {
                append_query(query, &format!("{key}[{name}]"), item);
            }
        }
        other => {
            query.append_pair(key, &scalar(other));
        }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Calls one endpoint. Parameters are an object; `{path}` placeholders are
/// taken from it and `body` is sent as JSON. The rest go in the query string
/// for GET and DELETE, and in the body otherwise.
#[derive(Debug, Clone)]
pub struct HttpOperator {
    transport: HttpTransport,
    endpoint: Arc<Endpoint>,
}

impl HttpOperator {
    async fn send(self, parameters: Value) -> Result<ApiResponse, TransportError> {
        let mut parameters = match parameters {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                // A bare scalar fills the single path placeholder, if any.
                let mut map = Map::new();
                if let Some(name) = first_placeholder(&self.endpoint.path) {
                    map.insert(name.to_string(), other);
                }
                map
            }
        };
        let explicit_body = parameters.remove(BODY_PARAMETER);
        let mut url = self.transport.url(&self.endpoint, &mut parameters)?;

        // GET and DELETE carry leftovers in the query string. Other methods
        // send them as the body unless an explicit `body` was given.
        let body = if self.endpoint.method.has_query() || explicit_body.is_some() {
            set_query(&mut url, &parameters);
            explicit_body
        } else if parameters.is_empty() {
            None
        } else {
            Some(Value::Object(parameters))
        };

        debug!(
            operation = %self.endpoint.operation_id,
            method = %self.endpoint.method,
            url = %url,
            "Calling API operation."
        );

        let mut request = self
            .transport
            .client
            .request(method(self.endpoint.method), url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let data = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse { status, data })
    }
}

fn first_placeholder(path: &str) -> Option<&str> {
    let start = path.find('{')?;
    let len = path[start..].find('}')?;
    Some(&path[start + 1..start + len])
}

impl Operator for HttpOperator {
    fn call(&self, parameters: Value) -> BoxFuture<'static, Result<ApiResponse, TransportError>> {
        self.clone().send(parameters).boxed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method as http_method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn endpoint(operation_id: &str, method: HttpMethod, path: &str) -> Endpoint {
        Endpoint {
            operation_id: operation_id.into(),
            method,
            path: path.into(),
        }
    }

    #[tokio::test]
    async fn substitutes_path_and_sends_query() {
        let server = MockServer::start().await;
        Mock::given(http_method("GET"))
            .and(path("/api/tags/5"))
            .and(query_param("populate[author]", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": 5 } })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&format!("{}/api", server.uri())).unwrap();
        let operator = transport.operator(endpoint("getTagsId", HttpMethod::Get, "/tags/{id}"));
        let response = operator
            .call(json!({ "id": 5, "populate": { "author": true } }))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.data["data"]["id"], 5);
    }

    #[tokio::test]
    async fn sends_body_as_json() {
        let server = MockServer::start().await;
        Mock::given(http_method("POST"))
            .and(path("/api/tags"))
            .and(body_json(json!({ "data": { "label": "rust" } })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": 9 } })))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&format!("{}/api/", server.uri())).unwrap();
        let operator = transport.operator(endpoint("postTags", HttpMethod::Post, "/tags"));
        let response = operator
            .call(json!({ "body": { "data": { "label": "rust" } } }))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn leftovers_become_the_body_without_an_explicit_one() {
        let server = MockServer::start().await;
        Mock::given(http_method("PUT"))
            .and(path("/tags/4"))
            .and(body_json(json!({ "data": { "label": "go" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "id": 4 } })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&server.uri()).unwrap();
        let response = transport
            .operator(endpoint("putTagsId", HttpMethod::Put, "/tags/{id}"))
            .call(json!({ "id": 4, "data": { "label": "go" } }))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn explicit_body_keeps_leftovers_in_the_query() {
        let server = MockServer::start().await;
        Mock::given(http_method("POST"))
            .and(path("/tags"))
            .and(query_param("locale", "fr"))
            .and(body_json(json!({ "data": { "label": "rust" } })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&server.uri()).unwrap();
        let response = transport
            .operator(endpoint("postTags", HttpMethod::Post, "/tags"))
            .call(json!({ "locale": "fr", "body": { "data": { "label": "rust" } } }))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.data, Value::Null);
    }

    #[tokio::test]
    async fn error_statuses_are_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(http_method("DELETE"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&server.uri()).unwrap();
        let response = transport
            .operator(endpoint("deleteTagsId", HttpMethod::Delete, "/tags/{id}"))
            .call(json!(3))
            .await
            .unwrap();

        assert_eq!(response.status, 403);
        assert_eq!(response.data, json!("forbidden"));
    }

    #[tokio::test]
    async fn missing_path_parameter_is_an_error() {
        let transport = HttpTransport::new("http://localhost:1337/api").unwrap();
        let err = transport
            .operator(endpoint("getTagsId", HttpMethod::Get, "/tags/{id}"))
            .call(json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::MissingPathParameter { ref name, .. } if name == "id"));
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            HttpTransport::new("not a url"),
            Err(TransportError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            HttpTransport::new("mailto:api@example.com"),
            Err(TransportError::OpaqueBaseUrl(_))
        ));
    }
}
