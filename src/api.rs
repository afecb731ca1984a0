use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    fn carries_body(self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// A call against the API, relative to the configured base URI.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Body>,
    /// Whether the session's bearer token is attached.
    pub authenticated: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Some(Body::Form(pairs));
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Fully resolved request as handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl HttpRequest {
    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    #[cfg(test)]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        }
    }

    #[cfg(test)]
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: String::new(),
        }
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

/// The request never completed (refused connection, DNS, bad URL, ...).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking reqwest transport. No timeouts and no retries.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> crate::error::Result<Self> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            Some(Body::Json(value)) => builder.body(value.to_string()),
            Some(Body::Form(pairs)) => builder.form(pairs),
            None => builder,
        };
        let response = builder
            .send()
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().map_err(|e| TransportError(e.to_string()))?;
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Where an unauthenticated response sends the user.
pub trait Host {
    fn alert(&mut self, message: &str);
    fn redirect_to_login(&mut self);
}

/// What a call resolved to once the response has been interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 2xx with a JSON body, or 204 (no body).
    Success(Option<Value>),
    /// Non-2xx; carries the status code and server detail.
    Failure(String),
    /// Transport failure or a 2xx without JSON. Logged only.
    Nothing,
}

pub const UNAUTHORIZED_PREFIX: &str = "Error 401 (authentication). Redirecting to login.";

pub struct ApiClient {
    base_uri: String,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(base_uri: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn url(&self, request: &ApiRequest) -> Result<String, TransportError> {
        let raw = format!("{}{}", self.base_uri, request.path);
        let mut url = reqwest::Url::parse(&raw)
            .map_err(|e| TransportError(format!("invalid URL {raw}: {e}")))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.to_string())
    }

    /// Resolve headers and URL. JSON is always accepted; a content type is
    /// declared for every method that carries a body, even an empty one.
    pub fn build(&self, token: Option<&str>, request: &ApiRequest) -> Result<HttpRequest, TransportError> {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(token) = token.filter(|_| request.authenticated) {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if request.method.carries_body() {
            let content_type = match request.body {
                Some(Body::Form(_)) => "application/x-www-form-urlencoded",
                _ => "application/json",
            };
            headers.push(("Content-Type".to_string(), content_type.to_string()));
        }
        Ok(HttpRequest {
            method: request.method,
            url: self.url(request)?,
            headers,
            body: request.body.clone(),
        })
    }

    /// Perform the request. Safe to call from a worker thread.
    pub fn execute(&self, token: Option<&str>, request: &ApiRequest) -> Result<HttpResponse, TransportError> {
        let http = self.build(token, request)?;
        self.transport.send(&http)
    }

    /// Turn a raw result into an [`Outcome`]. A 401 on an authenticated
    /// request additionally raises an alert and sends the host back to the
    /// login view; an anonymous 401 (bad credentials) is a plain failure.
    pub fn interpret(
        result: Result<HttpResponse, TransportError>,
        authenticated: bool,
        host: &mut dyn Host,
    ) -> Outcome {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "request did not complete");
                return Outcome::Nothing;
            }
        };

        if response.status == 204 {
            return Outcome::Success(None);
        }

        let parsed: Option<Value> = if response.is_json() {
            match serde_json::from_str(&response.body) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(status = response.status, error = %e, "response claimed JSON but did not parse");
                    return Outcome::Nothing;
                }
            }
        } else {
            None
        };

        if !(200..300).contains(&response.status) {
            let detail = error_detail(parsed.as_ref(), &response.body);
            let message = format!("error {}, {}", response.status, detail);
            if response.status == 401 && authenticated {
                let full = format!("{UNAUTHORIZED_PREFIX} {message}");
                host.alert(&full);
                host.redirect_to_login();
                return Outcome::Failure(full);
            }
            info!("{message}");
            return Outcome::Failure(message);
        }

        match parsed {
            Some(value) => Outcome::Success(Some(value)),
            None => Outcome::Nothing,
        }
    }

    /// Blocking call with success/failure continuations. Neither continuation
    /// runs when the request never completed or a 2xx carried no JSON.
    pub fn call<S, F>(
        &self,
        token: Option<&str>,
        request: &ApiRequest,
        host: &mut dyn Host,
        on_success: S,
        on_failure: F,
    ) where
        S: FnOnce(Option<Value>),
        F: FnOnce(String),
    {
        match Self::interpret(self.execute(token, request), request.authenticated, host) {
            Outcome::Success(value) => on_success(value),
            Outcome::Failure(message) => on_failure(message),
            Outcome::Nothing => {}
        }
    }
}

fn error_detail(parsed: Option<&Value>, body: &str) -> String {
    if let Some(detail) = parsed.and_then(|v| v.get("detail")) {
        return match detail {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no detail".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned responses in order and records every request sent.
    #[derive(Default)]
    pub struct FakeTransport {
        responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        pub sent: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn push(&self, response: HttpResponse) {
            self.responses.lock().unwrap().push_back(Ok(response));
        }

        pub fn push_json(&self, status: u16, body: Value) {
            self.push(HttpResponse::json(status, &body));
        }

        pub fn push_error(&self, message: &str) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(TransportError(message.to_string())));
        }

        pub fn sent_urls(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|r| r.url.clone()).collect()
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl Transport for FakeTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError("no canned response".to_string())))
        }
    }

    #[derive(Default)]
    pub struct RecordingHost {
        pub alerts: Vec<String>,
        pub redirects: usize,
    }

    impl Host for RecordingHost {
        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn redirect_to_login(&mut self) {
            self.redirects += 1;
        }
    }
}
