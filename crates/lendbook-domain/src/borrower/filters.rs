//! Borrower list filters.

use lendbook_store::{Bound, Criteria, Filters, TextSearch};
use serde::{Deserialize, Serialize};

use super::model::{EmploymentStatus, LoanStatus};
use crate::error::{DomainError, DomainResult};

/// Fields matched by the free-text search.
pub const SEARCH_FIELDS: [&str; 3] = ["firstname", "lastname", "email"];

/// Filters for listing borrowers.
///
/// Statuses match exactly, the credit score bounds are inclusive and the
/// search term matches any of [`SEARCH_FIELDS`] ignoring case. Every set
/// filter must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowerFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loanstatus: Option<LoanStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employmentstatus: Option<EmploymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mincreditscore: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maxcreditscore: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl BorrowerFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loan_status(mut self, status: LoanStatus) -> Self {
        self.loanstatus = Some(status);
        self
    }

    pub fn employment_status(mut self, status: EmploymentStatus) -> Self {
        self.employmentstatus = Some(status);
        self
    }

    pub fn min_credit_score(mut self, score: i32) -> Self {
        self.mincreditscore = Some(score);
        self
    }

    pub fn max_credit_score(mut self, score: i32) -> Self {
        self.maxcreditscore = Some(score);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Check if no filter is set. A blank search term counts as unset.
    pub fn is_empty(&self) -> bool {
        self.to_criteria().is_empty()
    }

    /// Reject a minimum credit score above the maximum.
    pub fn validate(&self) -> DomainResult<()> {
        if let (Some(min), Some(max)) = (self.mincreditscore, self.maxcreditscore) {
            if min > max {
                return Err(DomainError::invalid(
                    "creditscore",
                    format!("minimum {} is above maximum {}", min, max),
                ));
            }
        }
        Ok(())
    }

    /// The status filters as store equality filters.
    pub fn to_filters(&self) -> Filters {
        let mut filters = Filters::new();
        if let Some(status) = self.loanstatus {
            filters.insert("loanstatus", status.as_str());
        }
        if let Some(status) = self.employmentstatus {
            filters.insert("employmentstatus", status.as_str());
        }
        filters
    }

    /// Every filter as a store selection. Unset fields add no constraint.
    pub fn to_criteria(&self) -> Criteria {
        let mut criteria = Criteria::from(self.to_filters());
        if let Some(min) = self.mincreditscore {
            criteria = criteria.bound(Bound::at_least("creditscore", min));
        }
        if let Some(max) = self.maxcreditscore {
            criteria = criteria.bound(Bound::at_most("creditscore", max));
        }
        if let Some(search) = self
            .search
            .as_deref()
            .and_then(|term| TextSearch::new(term, SEARCH_FIELDS))
        {
            criteria = criteria.search(search);
        }
        criteria
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_filters() {
        let filters = BorrowerFilters::new();
        assert!(filters.is_empty());
        assert!(filters.to_criteria().is_empty());
        assert!(BorrowerFilters::new().search("  ").is_empty());
    }

    #[test]
    fn test_status_filters() {
        let filters = BorrowerFilters::new()
            .loan_status(LoanStatus::Active)
            .employment_status(EmploymentStatus::SelfEmployed)
            .to_filters();

        assert_eq!(filters.len(), 2);
        assert!(filters.matches(&json!({
            "loanstatus": "active",
            "employmentstatus": "self-employed"
        })));
        assert!(!filters.matches(&json!({
            "loanstatus": "pending",
            "employmentstatus": "self-employed"
        })));
    }

    #[test]
    fn test_credit_score_bounds() {
        let criteria = BorrowerFilters::new()
            .min_credit_score(600)
            .max_credit_score(700)
            .to_criteria();

        assert_eq!(criteria.bounds.len(), 2);
        assert!(criteria.filters.is_empty());
        assert!(criteria.matches(&json!({ "creditscore": 600 })));
        assert!(criteria.matches(&json!({ "creditscore": 700 })));
        assert!(!criteria.matches(&json!({ "creditscore": 701 })));
        assert!(!criteria.matches(&json!({ "creditscore": 599 })));
    }

    #[test]
    fn test_search_matches_names_and_email() {
        let criteria = BorrowerFilters::new().search("LOVE").to_criteria();
        let search = criteria.search.as_ref().unwrap();
        assert_eq!(search.fields, SEARCH_FIELDS);

        assert!(criteria.matches(&json!({ "firstname": "Ada", "lastname": "Lovelace", "email": "a@x.io" })));
        assert!(criteria.matches(&json!({ "firstname": "G", "lastname": "H", "email": "glove@x.io" })));
        assert!(!criteria.matches(&json!({ "firstname": "Grace", "lastname": "Hopper", "email": "g@x.io" })));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let filters = BorrowerFilters::new().min_credit_score(700).max_credit_score(600);
        assert!(matches!(
            filters.validate(),
            Err(DomainError::Invalid { field: "creditscore", .. })
        ));
        assert!(BorrowerFilters::new().min_credit_score(700).validate().is_ok());
    }
}
