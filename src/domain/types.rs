//! Shared domain enumerations for the console's backend resources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// A backend resource whose list screen the console can drive.
///
/// Every resource shares the same list controller; the variant only selects
/// the REST endpoint and the cache key family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Category,
    Sponsor,
    Blog,
    Donor,
}

impl Resource {
    /// Path segment under `/api/` on the backend.
    pub fn endpoint(self) -> &'static str {
        match self {
            Resource::Category => "api/category",
            Resource::Sponsor => "api/sponsor",
            Resource::Blog => "api/blog",
            Resource::Donor => "api/donor",
        }
    }

    /// Cache key family, shared by the list fetch and mutation invalidation.
    pub fn key_family(self) -> &'static str {
        match self {
            Resource::Category => "category-list",
            Resource::Sponsor => "sponsor-list",
            Resource::Blog => "blog-list",
            Resource::Donor => "donor-list",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Category => "category",
            Resource::Sponsor => "sponsor",
            Resource::Blog => "blog",
            Resource::Donor => "donor",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "category" => Ok(Resource::Category),
            "sponsor" => Ok(Resource::Sponsor),
            "blog" => Ok(Resource::Blog),
            "donor" => Ok(Resource::Donor),
            other => Err(DomainError::unknown_resource(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_resources() {
        assert_eq!("category".parse::<Resource>().unwrap(), Resource::Category);
        assert_eq!("donor".parse::<Resource>().unwrap(), Resource::Donor);
    }

    #[test]
    fn rejects_unknown_resource() {
        let err = "invoices".parse::<Resource>().expect_err("unknown rejected");
        assert!(matches!(err, DomainError::UnknownResource { .. }));
    }

    #[test]
    fn endpoint_and_family_are_stable() {
        assert_eq!(Resource::Sponsor.endpoint(), "api/sponsor");
        assert_eq!(Resource::Sponsor.key_family(), "sponsor-list");
    }
}
