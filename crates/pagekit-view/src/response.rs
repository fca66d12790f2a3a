//! Rendered HTML with its status and headers.

use indexmap::IndexMap;

pub(crate) const CONTENT_TYPE: &str = "Content-Type";
pub(crate) const TEXT_HTML: &str = "text/html";

/// Response produced by a view render.
///
/// Header names keep the case they were set with; lookups and replacement
/// are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlResponse {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: String,
}

impl HtmlResponse {
    #[must_use]
    pub fn new(status: u16, body: String) -> Self {
        Self {
            status,
            headers: IndexMap::new(),
            body,
        }
    }

    /// `200 OK` with `Content-Type: text/html`.
    #[must_use]
    pub fn html(body: String) -> Self {
        let mut response = Self::new(200, body);
        response.set_header(CONTENT_TYPE, TEXT_HTML);
        response
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Set a header, replacing any existing one with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some((_, existing)) = self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            *existing = value;
        } else {
            self.headers.insert(name, value);
        }
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for HtmlResponse {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{HeaderName, HeaderValue, StatusCode};
        use axum::response::IntoResponse as _;

        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = self.body.into_response();
        *response.status_mut() = status;

        for (name, value) in &self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Skipping invalid response header"),
            }
        }
        response
    }
}
