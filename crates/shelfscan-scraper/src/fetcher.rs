//! The seam between the coordinator and the two acquisition tiers.

use async_trait::async_trait;
use shelfscan_core::{FetchMethod, PageQuery, ProductRecord};

/// Result of one tier's attempt at one page.
///
/// `Empty` and `Failed` both leave the caller with no records, but they mean
/// different things: `Empty` is a well-formed answer with nothing in it,
/// `Failed` is a transport, status or shape problem worth surfacing when
/// diagnosing why a search came back short.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Records(Vec<ProductRecord>),
    Empty,
    Failed { reason: String },
}

impl FetchOutcome {
    /// `Records` for a non-empty list, `Empty` otherwise.
    #[must_use]
    pub fn from_records(records: Vec<ProductRecord>) -> Self {
        if records.is_empty() {
            Self::Empty
        } else {
            Self::Records(records)
        }
    }

    #[must_use]
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self::Failed {
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn records(&self) -> &[ProductRecord] {
        match self {
            Self::Records(records) => records,
            Self::Empty | Self::Failed { .. } => &[],
        }
    }

    #[must_use]
    pub fn has_records(&self) -> bool {
        !self.records().is_empty()
    }

    /// Short label for log fields: `"records"`, `"empty"` or `"failed"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Records(_) => "records",
            Self::Empty => "empty",
            Self::Failed { .. } => "failed",
        }
    }
}

/// One acquisition tier: fetches a single page of a single query.
///
/// Implementations never return an error; every failure is folded into
/// [`FetchOutcome::Failed`] so the coordinator can fall through to the next
/// tier.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Provenance stamped on every record this tier produces.
    fn method(&self) -> FetchMethod;

    async fn fetch(&self, query: &PageQuery) -> FetchOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProductRecord {
        ProductRecord {
            name: "Mouse".to_owned(),
            price: None,
            original_price: None,
            in_stock: None,
            url: "https://www.daraz.pk/p/1".to_owned(),
            fetch_method: FetchMethod::Structured,
        }
    }

    #[test]
    fn from_records_distinguishes_empty() {
        assert_eq!(FetchOutcome::from_records(vec![]), FetchOutcome::Empty);
        assert!(FetchOutcome::from_records(vec![record()]).has_records());
    }

    #[test]
    fn failed_outcome_has_no_records() {
        let outcome = FetchOutcome::failed("HTTP 403");
        assert!(!outcome.has_records());
        assert_eq!(outcome.kind(), "failed");
        assert!(outcome.records().is_empty());
    }
}
