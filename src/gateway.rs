//! HTTP access to the site-state backend.
//!
//! [`SiteGateway`] is the seam between the sync coordinator and the network:
//! the coordinator only sees the backend's four operations, so tests can
//! drive it with a scripted in-memory gateway while the binary wires in
//! [`HttpSiteGateway`].
//!
//! ## For contributors
//!
//! The backend is a small REST service; routes are listed per method below.
//! Error responses carry a JSON body shaped `{"detail": "…"}`, which
//! [`TransportError::Status`] reduces to the detail string.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::site::{Category, NotificationSite, PendingSite};

/// Default timeout applied to every backend request.
///
/// A hung backend surfaces as [`TransportError::Network`] instead of
/// stalling a refresh slot indefinitely.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A failed backend request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connect, timeout or decode failure before a usable response.
    #[error("backend request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },
}

/// The four operations the backend exposes.
#[async_trait]
pub trait SiteGateway: Send + Sync {
    /// `GET /api/notification` — monitored sites with their update times.
    async fn list_notification(&self) -> Result<Vec<NotificationSite>, TransportError>;

    /// `GET /api/pending` — bare URLs awaiting promotion.
    async fn list_pending(&self) -> Result<Vec<PendingSite>, TransportError>;

    /// `POST /api/pending` — submit a URL for tracking.  The backend rejects
    /// duplicates with a 409.
    async fn add_pending(&self, url: &str) -> Result<(), TransportError>;

    /// `DELETE /api/{category}/{url}` — remove one site.
    async fn remove(&self, category: Category, url: &str) -> Result<(), TransportError>;

    /// `POST /api/refresh` — promote every pending site to the notification
    /// collection.  All-or-nothing from the client's viewpoint.
    async fn promote_all(&self) -> Result<(), TransportError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AddPendingRequest<'a> {
    url: &'a str,
}

/// Error body shape the backend uses for non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// [`SiteGateway`] over the backend's REST interface.
pub struct HttpSiteGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSiteGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    /// Build a gateway with a custom request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// Pass successful responses through; turn anything else into
/// [`TransportError::Status`] carrying the backend's detail text.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.detail)
        .unwrap_or(text);
    Err(TransportError::Status {
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl SiteGateway for HttpSiteGateway {
    async fn list_notification(&self) -> Result<Vec<NotificationSite>, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/notification", self.base_url))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn list_pending(&self) -> Result<Vec<PendingSite>, TransportError> {
        let response = self
            .client
            .get(format!("{}/api/pending", self.base_url))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn add_pending(&self, url: &str) -> Result<(), TransportError> {
        let response = self
            .client
            .post(format!("{}/api/pending", self.base_url))
            .json(&AddPendingRequest { url })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn remove(&self, category: Category, url: &str) -> Result<(), TransportError> {
        // The URL is data here; reserved characters must not be read as
        // path or query structure by the backend router.
        let encoded = urlencoding::encode(url);
        let response = self
            .client
            .delete(format!(
                "{}/api/{}/{}",
                self.base_url,
                category.as_path(),
                encoded
            ))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn promote_all(&self) -> Result<(), TransportError> {
        let response = self
            .client
            .post(format!("{}/api/refresh", self.base_url))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> HttpSiteGateway {
        HttpSiteGateway::new(server.uri()).unwrap()
    }

    #[tokio::test]
    async fn list_notification_parses_sites_and_null_dates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notification"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"url": "https://a.example", "title": "A", "latest-updated-date": "2026-08-12T09:30:00.123000"},
                {"url": "https://b.example", "title": "B", "latest-updated-date": null}
            ])))
            .mount(&server)
            .await;

        let sites = gateway_for(&server).list_notification().await.unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].url, "https://a.example");
        assert_eq!(
            sites[0].last_updated.as_deref(),
            Some("2026-08-12T09:30:00.123000")
        );
        assert!(sites[1].last_updated.is_none());
    }

    #[tokio::test]
    async fn list_pending_parses_bare_url_strings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pending"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!(["https://x.example", "https://y.example"])),
            )
            .mount(&server)
            .await;

        let sites = gateway_for(&server).list_pending().await.unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[1].url, "https://y.example");
    }

    #[tokio::test]
    async fn add_pending_posts_the_url_as_a_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pending"))
            .and(body_json(json!({"url": "https://x.example"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        gateway_for(&server)
            .add_pending("https://x.example")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn remove_percent_encodes_the_url_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        gateway_for(&server)
            .remove(Category::Pending, "https://example.com/a?b=c#d")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url.path(),
            "/api/pending/https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%23d",
            "reserved characters must not leak into path or query structure"
        );
    }

    #[tokio::test]
    async fn promote_all_posts_to_the_refresh_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/refresh"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        gateway_for(&server).promote_all().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_add_surfaces_the_backend_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pending"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"detail": "site already in db"})),
            )
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .add_pending("https://x.example")
            .await
            .unwrap_err();
        match err {
            TransportError::Status { status, detail } => {
                assert_eq!(status, 409);
                assert_eq!(detail, "site already in db");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_error_bodies_pass_through_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notification"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = gateway_for(&server).list_notification().await.unwrap_err();
        match err {
            TransportError::Status { status, detail } => {
                assert_eq!(status, 502);
                assert_eq!(detail, "bad gateway");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_backends_time_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pending"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let gateway =
            HttpSiteGateway::with_timeout(server.uri(), Duration::from_millis(50)).unwrap();
        let err = gateway.list_pending().await.unwrap_err();
        match err {
            TransportError::Network(e) => assert!(e.is_timeout()),
            other => panic!("expected a network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn trailing_slashes_in_the_base_url_are_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let gateway = HttpSiteGateway::new(format!("{}/", server.uri())).unwrap();
        assert!(gateway.list_pending().await.unwrap().is_empty());
    }
}
