//! Fluent single-use request builder

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::{redirect, Method};
use serde::Serialize;
use url::form_urlencoded;

use crate::error::TransportError;
use crate::outcome::{Outcome, TransferInfo};

const DEFAULT_TIMEOUT_SECS: i64 = 30;

/// Redirect hop limit applied to every transfer.
const REDIRECT_LIMIT: usize = 10;

/// Fluent builder for a single HTTP request.
///
/// Configure with chained setters, then fire exactly one of [`get`],
/// [`post`], [`put`], or [`delete`]. The verb method consumes the builder,
/// performs one blocking transfer, and returns a normalized [`Outcome`];
/// construct a fresh builder for every request.
///
/// The final URL is the base URL and route joined with a single `/`
/// (redundant slashes stripped), or the route verbatim when no base URL is
/// set, with the query map appended percent-encoded.
///
/// [`get`]: RequestBuilder::get
/// [`post`]: RequestBuilder::post
/// [`put`]: RequestBuilder::put
/// [`delete`]: RequestBuilder::delete
#[derive(Debug)]
pub struct RequestBuilder {
    base_url: String,
    route: String,
    query: BTreeMap<String, String>,
    body: Option<serde_json::Value>,
    headers: Vec<(String, String)>,
    timeout_secs: i64,
    user_agent: String,
    debug: bool,
    deferred: Option<TransportError>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// Create a builder with the default header set and a 30 second connect
    /// timeout.
    pub fn new() -> Self {
        Self {
            base_url: String::new(),
            route: String::new(),
            query: BTreeMap::new(),
            body: None,
            headers: vec![
                (
                    "Content-Type".to_string(),
                    "application/json; charset=utf-8".to_string(),
                ),
                ("Cache-Control".to_string(), "no-cache".to_string()),
                ("Pragma".to_string(), "no-cache".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: String::new(),
            debug: false,
            deferred: None,
        }
    }

    /// Set the base URL the route is joined onto. When empty, the route is
    /// used verbatim as the full URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the route: a path relative to the base URL, or a full URL when no
    /// base URL is set.
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    /// Replace the query-string parameters wholesale.
    pub fn query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Replace the request body wholesale. The body is sent as JSON on POST
    /// and PUT and ignored by GET and DELETE. A value that cannot be
    /// represented as JSON is reported as a serialization failure when a
    /// body-carrying verb executes.
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => {
                self.body = Some(value);
                self.deferred = None;
            }
            Err(err) => self.deferred = Some(TransportError::from(err)),
        }
        self
    }

    /// Set the connect timeout in seconds. Stored verbatim; zero and
    /// negative values disable the connect timeout.
    pub fn timeout_secs(mut self, timeout_secs: i64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set a header, replacing the value in place when an entry with the
    /// same name already exists and appending otherwise.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self
            .headers
            .iter_mut()
            .find(|(existing, _)| *existing == name)
        {
            entry.1 = value;
            return self;
        }
        self.headers.push((name, value));
        self
    }

    /// Replace the entire header list, defaults included.
    pub fn headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    /// Append a header unconditionally, keeping any existing entry with the
    /// same name.
    pub fn append_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the user-agent, applied on the transport rather than as a header
    /// entry.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Log the full request configuration for this transfer at debug level.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Issue a GET request.
    pub fn get(self) -> Outcome {
        self.execute(Method::GET)
    }

    /// Issue a POST request carrying the configured body as JSON.
    pub fn post(self) -> Outcome {
        self.execute(Method::POST)
    }

    /// Issue a PUT request carrying the configured body as JSON.
    pub fn put(self) -> Outcome {
        self.execute(Method::PUT)
    }

    /// Issue a DELETE request.
    pub fn delete(self) -> Outcome {
        self.execute(Method::DELETE)
    }

    fn execute(mut self, method: Method) -> Outcome {
        let url = self.composed_url();
        let started = Instant::now();

        let payload = if method == Method::POST || method == Method::PUT {
            if let Some(err) = self.deferred.take() {
                tracing::warn!("{} {} failed: {}", method, url, err);
                return Outcome::failed(err, TransferInfo::unsent(url, started.elapsed()));
            }
            match &self.body {
                Some(body) => Some(body.to_string()),
                None => Some(serde_json::Value::Null.to_string()),
            }
        } else {
            None
        };

        let client = match self.transport() {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!("{} {} failed: {}", method, url, err);
                return Outcome::failed(err, TransferInfo::unsent(url, started.elapsed()));
            }
        };

        let mut request = client.request(method.clone(), url.as_str());
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(payload) = payload {
            if self.debug {
                tracing::debug!("{} {} payload: {}", method, url, payload);
            }
            request = request.body(payload);
        }
        if self.debug {
            tracing::debug!("{} {} headers: {:?}", method, url, self.headers);
        }

        match request.send() {
            Ok(response) => {
                let status = response.status().as_u16();
                let info = TransferInfo::from_response(&response, started.elapsed());
                tracing::debug!("{} {} -> {} in {:?}", method, url, status, info.elapsed);

                let raw = match response.text() {
                    Ok(raw) => raw,
                    Err(err) => {
                        let err = TransportError::from(err);
                        tracing::warn!("{} {} failed: {}", method, url, err);
                        return Outcome {
                            status: Some(status),
                            data: None,
                            raw: None,
                            info,
                            error: Some(err),
                        };
                    }
                };

                // Malformed bodies decode to no data rather than an error.
                let data: Option<serde_json::Value> = if raw.is_empty() {
                    None
                } else {
                    serde_json::from_str(&raw).ok()
                };

                Outcome {
                    status: Some(status),
                    data,
                    raw: Some(raw),
                    info,
                    error: None,
                }
            }
            Err(err) => {
                let err = TransportError::from(err);
                tracing::warn!("{} {} failed: {}", method, url, err);
                Outcome::failed(err, TransferInfo::unsent(url, started.elapsed()))
            }
        }
    }

    /// Build the transport handle for this one transfer. Redirect following
    /// and TLS peer verification stay enabled; the connect timeout is applied
    /// only when positive.
    fn transport(&self) -> Result<Client, TransportError> {
        if rustls::crypto::CryptoProvider::get_default().is_none() {
            let _ = rustls::crypto::ring::default_provider().install_default();
        }

        let mut builder = Client::builder()
            .redirect(redirect::Policy::limited(REDIRECT_LIMIT))
            .user_agent(self.user_agent.as_str());
        if self.timeout_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(self.timeout_secs as u64));
        }
        builder
            .build()
            .map_err(|err| TransportError::Build(err.to_string()))
    }

    fn composed_url(&self) -> String {
        let mut url = if self.base_url.is_empty() {
            self.route.clone()
        } else if self.route.is_empty() {
            self.base_url.clone()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                self.route.trim_start_matches('/')
            )
        };

        if !self.query.is_empty() {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in &self.query {
                serializer.append_pair(key, value);
            }
            url.push('?');
            url.push_str(&serializer.finish());
        }

        url
    }
}
