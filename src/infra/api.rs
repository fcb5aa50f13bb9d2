//! HTTP client for the content-management backend.
//!
//! List pages arrive in the backend's envelope
//! `{ "data": { "data": [...], "last_page", "from", "to", "total" } }`; only
//! those fields are consumed. Mutations invalidate nothing themselves; the
//! caller invalidates the resource's key family on success.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::loader::{FetchError, FetchedPage, PageLoader};
use crate::config::ApiSettings;
use crate::domain::types::Resource;

use super::error::InfraError;

/// Wire envelope wrapping every backend response body.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Paginated list payload inside the envelope.
#[derive(Debug, Deserialize)]
struct ListPayload<T> {
    data: Vec<T>,
    last_page: u32,
    #[serde(default)]
    from: Option<u64>,
    #[serde(default)]
    to: Option<u64>,
    total: u64,
}

/// Backend REST client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, InfraError> {
        let base = settings
            .base_url
            .join("/")
            .map_err(|err| InfraError::http_client(format!("invalid base URL: {err}")))?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;
        Ok(Self {
            client,
            base,
            token: settings.token.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("vetrina/", env!("CARGO_PKG_VERSION"))
    }

    fn list_url(&self, resource: Resource, term: &str, page: u32) -> Result<Url, FetchError> {
        let mut url = self
            .base
            .join(resource.endpoint())
            .map_err(|err| FetchError::Transport(format!("invalid URL: {err}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &page.to_string());
            if !term.is_empty() {
                pairs.append_pair("search", term);
            }
        }
        Ok(url)
    }

    fn item_url(&self, resource: Resource, id: i64) -> Result<Url, FetchError> {
        self.base
            .join(&format!("{}/{id}", resource.endpoint()))
            .map_err(|err| FetchError::Transport(format!("invalid URL: {err}")))
    }

    /// Create a record; the payload is passed through as the backend expects
    /// it.
    pub async fn create(
        &self,
        resource: Resource,
        payload: &serde_json::Value,
    ) -> Result<(), FetchError> {
        let url = self
            .base
            .join(resource.endpoint())
            .map_err(|err| FetchError::Transport(format!("invalid URL: {err}")))?;
        self.send_unit(Method::POST, url, Some(payload)).await
    }

    /// Update a record in place.
    pub async fn update(
        &self,
        resource: Resource,
        id: i64,
        payload: &serde_json::Value,
    ) -> Result<(), FetchError> {
        let url = self.item_url(resource, id)?;
        self.send_unit(Method::PUT, url, Some(payload)).await
    }

    /// Delete a record.
    pub async fn delete(&self, resource: Resource, id: i64) -> Result<(), FetchError> {
        let url = self.item_url(resource, id)?;
        self.send_unit(Method::DELETE, url, None).await
    }

    async fn send_unit(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<(), FetchError> {
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }
        Ok(())
    }
}

fn status_error(status: StatusCode, body: String) -> FetchError {
    FetchError::Status {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl<T> PageLoader<T> for ApiClient
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn load_page(
        &self,
        resource: Resource,
        term: &str,
        page: u32,
    ) -> Result<FetchedPage<T>, FetchError> {
        let url = self.list_url(resource, term, page)?;
        debug!(%url, "Fetching list page");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(status_error(
                status,
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }

        let envelope: Envelope<ListPayload<T>> = serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::Decode(err.to_string()))?;
        let payload = envelope.data;
        Ok(FetchedPage {
            rows: payload.data,
            last_page: payload.last_page,
            from: payload.from,
            to: payload.to,
            total: payload.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::records::CategoryRecord;

    use super::*;

    #[test]
    fn envelope_decodes_list_payload() {
        let body = r#"{
            "data": {
                "data": [
                    {"id": 1, "category_name": "Events", "category_status": "Active"},
                    {"id": 2, "category_name": "Press", "category_status": "Inactive"}
                ],
                "current_page": 1,
                "last_page": 4,
                "from": 1,
                "to": 2,
                "total": 38
            }
        }"#;

        let envelope: Envelope<ListPayload<CategoryRecord>> =
            serde_json::from_str(body).expect("decoded envelope");
        let payload = envelope.data;
        assert_eq!(payload.data.len(), 2);
        assert_eq!(payload.data[0].category_name, "Events");
        assert_eq!(payload.last_page, 4);
        assert_eq!(payload.from, Some(1));
        assert_eq!(payload.to, Some(2));
        assert_eq!(payload.total, 38);
    }

    #[test]
    fn envelope_tolerates_null_range_on_empty_page() {
        let body = r#"{
            "data": {
                "data": [],
                "last_page": 1,
                "from": null,
                "to": null,
                "total": 0
            }
        }"#;

        let envelope: Envelope<ListPayload<CategoryRecord>> =
            serde_json::from_str(body).expect("decoded envelope");
        assert!(envelope.data.data.is_empty());
        assert_eq!(envelope.data.from, None);
        assert_eq!(envelope.data.total, 0);
    }

    #[test]
    fn list_url_includes_search_only_when_present() {
        let settings = ApiSettings {
            base_url: Url::parse("https://backend.example.com").expect("base url"),
            token: None,
        };
        let client = ApiClient::new(&settings).expect("client");

        let bare = client
            .list_url(Resource::Category, "", 2)
            .expect("bare url");
        assert_eq!(
            bare.as_str(),
            "https://backend.example.com/api/category?page=2"
        );

        let searched = client
            .list_url(Resource::Sponsor, "gold tier", 1)
            .expect("searched url");
        assert_eq!(
            searched.as_str(),
            "https://backend.example.com/api/sponsor?page=1&search=gold+tier"
        );
    }
}
