//! Server-shaped row records for each backend resource.
//!
//! The list controller itself is generic and assumes nothing about row shape
//! beyond `Clone`; these concrete types exist for the CLI front-end and carry
//! only the columns the list screens display. Unlisted server fields are
//! ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Minimal shape the console needs from a server row: a stable identifier for
/// row keys and a human label for display.
pub trait ListRecord: Clone + Send + Sync + 'static {
    fn id(&self) -> i64;
    fn label(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub category_name: String,
    #[serde(default)]
    pub category_status: String,
}

impl ListRecord for CategoryRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.category_name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SponsorRecord {
    pub id: i64,
    #[serde(default)]
    pub sponsors_image: Option<String>,
    #[serde(default)]
    pub sponsors_url: String,
    #[serde(default)]
    pub sponsors_sort: Option<i64>,
    #[serde(default)]
    pub sponsors_status: String,
}

impl ListRecord for SponsorRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.sponsors_url
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogRecord {
    pub id: i64,
    pub blog_title: String,
    #[serde(default)]
    pub blog_slug: String,
    #[serde(default)]
    pub blog_featured: Option<String>,
    #[serde(default)]
    pub blog_front: Option<String>,
}

impl ListRecord for BlogRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.blog_title
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorRecord {
    pub id: i64,
    pub indicomp_full_name: String,
    #[serde(default)]
    pub indicomp_email: Option<String>,
    #[serde(default)]
    pub indicomp_mobile_phone: Option<String>,
    #[serde(default)]
    pub indicomp_pan_no: Option<String>,
}

impl ListRecord for DonorRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> &str {
        &self.indicomp_full_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ignores_unknown_fields() {
        let row: CategoryRecord = serde_json::from_str(
            r#"{"id": 7, "category_name": "Events", "category_status": "Active",
                "created_at": "2024-01-01T00:00:00Z"}"#,
        )
        .expect("category row");
        assert_eq!(row.id(), 7);
        assert_eq!(row.label(), "Events");
        assert_eq!(row.category_status, "Active");
    }

    #[test]
    fn sponsor_tolerates_missing_optional_columns() {
        let row: SponsorRecord = serde_json::from_str(r#"{"id": 3}"#).expect("sponsor row");
        assert_eq!(row.id(), 3);
        assert!(row.sponsors_image.is_none());
        assert_eq!(row.sponsors_status, "");
    }
}
