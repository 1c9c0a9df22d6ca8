use crate::{ApiError, ClientConfig, FreshError, StatusClass, BASIC_AUTH_PASSWORD};
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::io::Read;
use std::time::Duration;

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
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a response whose status was not classified as an error.
/// Decoding is left to the caller, which knows the envelope to expect.
#[derive(Debug, Clone)]
pub struct ResponseBody {
    pub status: u16,
    bytes: Vec<u8>,
}

impl ResponseBody {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, FreshError> {
        serde_json::from_slice(&self.bytes).map_err(FreshError::Decode)
    }
}

/// Authenticated JSON transport for the asset API.
///
/// Every request carries:
/// - `Accept: application/json`
/// - `Content-Type: application/json`
/// - `Authorization: Basic base64("<api_key>:X")`
///
/// Statuses listed in [`crate::status::ERROR_CODES`] short-circuit into
/// [`FreshError::Api`] without reading the body. Everything else is returned
/// as a [`ResponseBody`]. Nothing is retried.
pub struct HttpTransport {
    endpoint: String,
    authorization: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            // The classifier decides which statuses are errors, not ureq.
            .http_status_as_error(false)
            .timeout_global(config.timeout_secs().map(Duration::from_secs))
            .build();
        let agent = ureq::Agent::new_with_config(agent_config);
        let credentials = format!("{}:{BASIC_AUTH_PASSWORD}", config.api_key());
        let authorization = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        );
        Self {
            endpoint: config.endpoint().to_owned(),
            authorization,
            agent,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full request URL for a resource path such as `/assets/100`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    fn decorate<B>(&self, req: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        req.header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", &self.authorization)
    }

    /// Perform one request with an already-encoded JSON payload.
    pub fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<ResponseBody, FreshError> {
        let url = self.url(path);
        match body {
            Some(data) => tracing::debug!("{method} {url} ({} bytes)", data.len()),
            None => tracing::debug!("{method} {url}"),
        }

        let response = match method {
            Method::Get => self.decorate(self.agent.get(&url)).call(),
            Method::Delete => self.decorate(self.agent.delete(&url)).call(),
            Method::Post => {
                let req = self.decorate(self.agent.post(&url));
                match body {
                    Some(data) => req.send(data),
                    None => req.send_empty(),
                }
            }
            Method::Put => {
                let req = self.decorate(self.agent.put(&url));
                match body {
                    Some(data) => req.send(data),
                    None => req.send_empty(),
                }
            }
        }?;

        let code = response.status().as_u16();
        let class = StatusClass::from_code(code);
        if class.is_error() {
            tracing::debug!("{method} {url} -> {class}");
            return Err(ApiError::new(class, format!("{method} {url}")).into());
        }

        let mut bytes = Vec::new();
        response.into_body().into_reader().read_to_end(&mut bytes)?;
        Ok(ResponseBody {
            status: code,
            bytes,
        })
    }

    /// Serialize `body` to JSON and [`send`](Self::send) it.
    pub fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<ResponseBody, FreshError> {
        let payload = serde_json::to_vec(body).map_err(FreshError::Serialization)?;
        self.send(method, path, Some(&payload))
    }
}
