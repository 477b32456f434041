// Async HTTP client for the SkillMart REST API.
//
// Wraps `reqwest::Client` with base-URL joining, bearer auth and uniform
// error parsing. Endpoint groups (cart, coupons, users, ...) are inherent
// methods defined in `endpoints/`, keeping this module to transport mechanics.

use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error response shapes ────────────────────────────────────────────

/// The backend is not consistent about error bodies. Seen in the wild:
/// `{"message": "..."}`, `{"error": "..."}` and
/// `{"error": {"message": "...", "code": "..."}}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<ErrorField>,
    #[serde(default)]
    code: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Nested {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        code: Option<String>,
    },
}

impl ErrorResponse {
    fn into_parts(self) -> (Option<String>, Option<String>) {
        let (nested_message, nested_code) = match self.error {
            Some(ErrorField::Text(text)) => (Some(text), None),
            Some(ErrorField::Nested { message, code }) => (message, code),
            None => (None, None),
        };
        let message = self
            .message
            .or(nested_message)
            .filter(|m| !m.trim().is_empty());
        (message, self.code.or(nested_code))
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the marketplace backend.
///
/// One instance is shared by every call a session makes. The base URL
/// is the API root (e.g. `https://skillmart.example/api/`); endpoint
/// paths are joined relative to it.
pub struct MarketplaceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MarketplaceClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from credentials and a transport config.
    ///
    /// A bearer token, when present, is injected as a default header.
    pub fn new(
        base_url: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(value) = credentials.authorization_header()? {
            headers.insert(AUTHORIZATION, value);
        }
        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends with `/` so relative joins keep the prefix.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The normalized API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments (e.g. `["users", id]`) to the base URL.
    ///
    /// Each segment is percent-encoded on its own, so an id can never add
    /// segments, a query or a fragment. Empty and dot segments are refused.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || matches!(**s, "." | ".."))
        {
            return Err(Error::InvalidPathSegment {
                segment: (*bad).to_owned(),
            });
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidPathSegment {
                segment: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self.http.patch(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn delete(&self, path: &[&str]) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidToken;
        }

        let raw = resp.text().await.unwrap_or_default();
        let (message, code) = serde_json::from_str::<ErrorResponse>(&raw)
            .map(ErrorResponse::into_parts)
            .unwrap_or((None, None));

        if status == reqwest::StatusCode::FORBIDDEN {
            return Error::Forbidden {
                message: message.unwrap_or_else(|| "insufficient permissions".into()),
            };
        }

        match message {
            Some(message) => Error::Api {
                status: status.as_u16(),
                message,
                code,
                from_server: true,
            },
            None => Error::Api {
                status: status.as_u16(),
                message: if raw.trim().is_empty() {
                    status.to_string()
                } else {
                    raw.chars().take(200).collect()
                },
                code,
                from_server: false,
            },
        }
    }
}
