//! The site records shared across the application.
//!
//! Both collections hold these types exactly as the backend returns them.
//! A notification site keeps its `latest-updated-date` as the raw wire
//! string, so a malformed value survives deserialization and classifies as
//! invalid instead of failing the whole response decode.
//!
//! ## For contributors
//!
//! If the backend grows a new site category, add a [`Category`] variant and
//! a record type implementing [`SiteRecord`]; the collection and sync layers
//! are generic over that trait and need no changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::recency::parse_timestamp;

/// The two site categories the backend tracks, named by their REST path
/// segment.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Category {
    Notification,
    Pending,
}

impl Category {
    /// Path segment used in `/api/{category}/…` routes.
    pub fn as_path(&self) -> &'static str {
        match self {
            Category::Notification => "notification",
            Category::Pending => "pending",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

/// A site the backend actively monitors for updates.
///
/// The backend's records carry extra bookkeeping fields (search content,
/// last scan time); anything beyond these three is ignored on decode.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NotificationSite {
    /// Unique key within the collection.
    pub url: String,

    /// Display title, as scraped by the backend.
    pub title: String,

    /// Last update timestamp, exactly as the backend sent it.
    ///
    /// `None` means the site has never been seen to change.  Parsing is
    /// deferred to classification / sort time.
    #[serde(rename = "latest-updated-date", default)]
    pub last_updated: Option<String>,
}

/// A site awaiting promotion; the backend stores nothing but its URL.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingSite {
    pub url: String,
}

// ---------------------------------------------------------------------------
// SiteRecord — the uniform view the collection layer works with
// ---------------------------------------------------------------------------

/// Uniform view over both site variants.
///
/// Lets [`crate::collection::SiteCollection`] stay category-agnostic: every
/// record has a URL key, and records without timestamps simply never sort
/// ahead of dated ones.
pub trait SiteRecord: Clone {
    /// Unique key within a collection.
    fn url(&self) -> &str;

    /// Parsed update timestamp, if the record carries a usable one.
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl SiteRecord for NotificationSite {
    fn url(&self) -> &str {
        &self.url
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.last_updated.as_deref().and_then(parse_timestamp)
    }
}

impl SiteRecord for PendingSite {
    fn url(&self) -> &str {
        &self.url
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn notification_sites_decode_from_the_wire_shape() {
        let body = r#"[
            {"url": "https://a.example", "title": "A", "latest-updated-date": "2026-08-12T09:30:00.123000"},
            {"url": "https://b.example", "title": "B", "latest-updated-date": null}
        ]"#;
        let sites: Vec<NotificationSite> = serde_json::from_str(body).unwrap();
        assert_eq!(sites[0].url, "https://a.example");
        assert_eq!(
            sites[0].last_updated.as_deref(),
            Some("2026-08-12T09:30:00.123000")
        );
        assert!(sites[1].last_updated.is_none());
    }

    #[test]
    fn extra_backend_fields_are_ignored() {
        let body = r#"{
            "url": "https://a.example",
            "title": "A",
            "last-search": "2026-08-12T10:00:00",
            "latest-search-content": ["…"],
            "latest-updated-date": null
        }"#;
        let site: NotificationSite = serde_json::from_str(body).unwrap();
        assert_eq!(site.title, "A");
    }

    #[test]
    fn missing_update_field_decodes_as_none() {
        let site: NotificationSite =
            serde_json::from_str(r#"{"url": "https://a.example", "title": "A"}"#).unwrap();
        assert!(site.last_updated.is_none());
    }

    #[test]
    fn pending_sites_decode_from_bare_strings() {
        let sites: Vec<PendingSite> =
            serde_json::from_str(r#"["https://x.example", "https://y.example"]"#).unwrap();
        assert_eq!(sites[0].url, "https://x.example");
        assert_eq!(sites[1].url, "https://y.example");
    }

    #[test]
    fn updated_at_parses_the_raw_timestamp() {
        let site = NotificationSite {
            url: "https://a.example".into(),
            title: "A".into(),
            last_updated: Some("2026-08-12T09:30:00Z".into()),
        };
        assert_eq!(
            site.updated_at(),
            Some(Utc.with_ymd_and_hms(2026, 8, 12, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn unparseable_timestamps_yield_no_sort_key() {
        let site = NotificationSite {
            url: "https://a.example".into(),
            title: "A".into(),
            last_updated: Some("garbage".into()),
        };
        assert!(site.updated_at().is_none());
    }

    #[test]
    fn category_paths_match_the_rest_routes() {
        assert_eq!(Category::Notification.as_path(), "notification");
        assert_eq!(Category::Pending.as_path(), "pending");
        assert_eq!(Category::Pending.to_string(), "pending");
    }
}
