//! Borrower record and payload types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lendbook_store::{Record, RecordId};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DomainError, DomainResult};

/// Lowest credit score accepted on a borrower.
pub const MIN_CREDIT_SCORE: i32 = 300;

/// Highest credit score accepted on a borrower.
pub const MAX_CREDIT_SCORE: i32 = 850;

/// How a borrower earns their income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentStatus {
    #[default]
    Employed,
    SelfEmployed,
    Unemployed,
    Retired,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 4] = [
        EmploymentStatus::Employed,
        EmploymentStatus::SelfEmployed,
        EmploymentStatus::Unemployed,
        EmploymentStatus::Retired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "employed",
            EmploymentStatus::SelfEmployed => "self-employed",
            EmploymentStatus::Unemployed => "unemployed",
            EmploymentStatus::Retired => "retired",
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmploymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownValue {
                kind: "employment status",
                value: s.to_string(),
            })
    }
}

/// Where a borrower's loan stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    /// Application received, not yet funded.
    #[default]
    Pending,
    Completed,
    Defaulted,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Active,
        LoanStatus::Pending,
        LoanStatus::Completed,
        LoanStatus::Defaulted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Pending => "pending",
            LoanStatus::Completed => "completed",
            LoanStatus::Defaulted => "defaulted",
        }
    }

    /// Whether the loan is finished, successfully or not.
    pub fn is_closed(&self) -> bool {
        matches!(self, LoanStatus::Completed | LoanStatus::Defaulted)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownValue {
                kind: "loan status",
                value: s.to_string(),
            })
    }
}

/// A borrower row in the `borrowers` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Borrower {
    pub id: RecordId,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub socialsecuritynumber: String,
    pub creditscore: i32,
    pub employmentstatus: EmploymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employername: Option<String>,
    pub monthlyincome: f64,
    pub loanstatus: LoanStatus,
    /// When the borrower was registered, as an ISO 8601 string.
    pub registrationdate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Borrower {
    /// First and last name joined by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// Social security number with all but the last four digits hidden.
    pub fn masked_ssn(&self) -> String {
        let digits: Vec<char> = self
            .socialsecuritynumber
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let last4: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        format!("***-**-{}", last4)
    }
}

impl Record for Borrower {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

/// Fields supplied when registering a borrower.
///
/// The id, timestamps and registration date are assigned on creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BorrowerDraft {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub socialsecuritynumber: String,
    pub creditscore: i32,
    pub employmentstatus: EmploymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employername: Option<String>,
    pub monthlyincome: f64,
    #[serde(default)]
    pub loanstatus: LoanStatus,
}

impl BorrowerDraft {
    /// Check the draft against borrower rules.
    pub fn validate(&self) -> DomainResult<()> {
        require("firstname", &self.firstname)?;
        require("lastname", &self.lastname)?;
        validate_email(&self.email)?;
        validate_credit_score(self.creditscore)?;
        validate_income(self.monthlyincome)?;
        Ok(())
    }
}

/// Partial update of a borrower. `None` fields are left untouched.
///
/// `employername` is doubly optional: `Some(None)` clears the employer and is
/// sent as `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BorrowerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socialsecuritynumber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creditscore: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employmentstatus: Option<EmploymentStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub employername: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthlyincome: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loanstatus: Option<LoanStatus>,
}

impl BorrowerPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loan_status(mut self, status: LoanStatus) -> Self {
        self.loanstatus = Some(status);
        self
    }

    pub fn credit_score(mut self, score: i32) -> Self {
        self.creditscore = Some(score);
        self
    }

    pub fn employment(mut self, status: EmploymentStatus, employer: Option<String>) -> Self {
        self.employmentstatus = Some(status);
        self.employername = Some(employer);
        self
    }

    /// Check if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Check the set fields against borrower rules.
    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::invalid("patch", "no fields to update"));
        }
        if let Some(name) = &self.firstname {
            require("firstname", name)?;
        }
        if let Some(name) = &self.lastname {
            require("lastname", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(score) = self.creditscore {
            validate_credit_score(score)?;
        }
        if let Some(income) = self.monthlyincome {
            validate_income(income)?;
        }
        Ok(())
    }
}

/// A field present in the input, even as `null`, is `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn require(field: &'static str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn validate_email(email: &str) -> DomainResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(DomainError::invalid(
            "email",
            format!("'{}' is not an email address", email),
        )),
    }
}

fn validate_credit_score(score: i32) -> DomainResult<()> {
    if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&score) {
        return Err(DomainError::invalid(
            "creditscore",
            format!(
                "{} is outside {}..={}",
                score, MIN_CREDIT_SCORE, MAX_CREDIT_SCORE
            ),
        ));
    }
    Ok(())
}

fn validate_income(income: f64) -> DomainResult<()> {
    if !income.is_finite() || income < 0.0 {
        return Err(DomainError::invalid(
            "monthlyincome",
            "must be a non-negative amount",
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn draft() -> BorrowerDraft {
        BorrowerDraft {
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            address: "12 St James's Square, London".to_string(),
            socialsecuritynumber: "123-45-6789".to_string(),
            creditscore: 720,
            employmentstatus: EmploymentStatus::SelfEmployed,
            employername: None,
            monthlyincome: 8200.5,
            loanstatus: LoanStatus::Pending,
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(EmploymentStatus::SelfEmployed).unwrap(),
            json!("self-employed")
        );
        assert_eq!(serde_json::to_value(LoanStatus::Defaulted).unwrap(), json!("defaulted"));
        for status in EmploymentStatus::ALL {
            assert_eq!(serde_json::to_value(status).unwrap(), json!(status.as_str()));
        }
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Retired".parse::<EmploymentStatus>().unwrap(), EmploymentStatus::Retired);
        assert_eq!("active".parse::<LoanStatus>().unwrap(), LoanStatus::Active);
        assert!(matches!(
            "frozen".parse::<LoanStatus>(),
            Err(DomainError::UnknownValue { kind: "loan status", .. })
        ));
        assert!(LoanStatus::Defaulted.is_closed());
        assert!(!LoanStatus::Active.is_closed());
    }

    #[test]
    fn test_borrower_deserializes_row() {
        let row = json!({
            "id": "b-1",
            "firstname": "Ada",
            "lastname": "Lovelace",
            "email": "ada@example.com",
            "phone": "555-0100",
            "address": "London",
            "socialsecuritynumber": "123-45-6789",
            "creditscore": 720,
            "employmentstatus": "employed",
            "employername": "Analytical Engines Ltd",
            "monthlyincome": 8200,
            "loanstatus": "active",
            "registrationdate": "2024-03-01T10:00:00.000Z",
            "created_at": "2024-03-01T10:00:00.123456+00:00"
        });

        let borrower: Borrower = serde_json::from_value(row).unwrap();
        assert_eq!(borrower.full_name(), "Ada Lovelace");
        assert_eq!(borrower.monthlyincome, 8200.0);
        assert!(borrower.created_at.is_some());
        assert!(borrower.updated_at.is_none());
        assert_eq!(borrower.masked_ssn(), "***-**-6789");
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let mut bad = draft();
        bad.email = "ada.example.com".to_string();
        assert!(matches!(bad.validate(), Err(DomainError::Invalid { field: "email", .. })));

        let mut bad = draft();
        bad.creditscore = 900;
        assert!(matches!(
            bad.validate(),
            Err(DomainError::Invalid { field: "creditscore", .. })
        ));

        let mut bad = draft();
        bad.monthlyincome = -1.0;
        assert!(bad.validate().is_err());

        let mut bad = draft();
        bad.lastname = "  ".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = BorrowerPatch::new()
            .loan_status(LoanStatus::Completed)
            .credit_score(780);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "creditscore": 780, "loanstatus": "completed" })
        );
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn test_patch_clears_employer() {
        let patch = BorrowerPatch::new().employment(EmploymentStatus::Unemployed, None);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "employmentstatus": "unemployed", "employername": null })
        );

        let parsed: BorrowerPatch =
            serde_json::from_value(json!({ "employername": null })).unwrap();
        assert_eq!(parsed.employername, Some(None));
        assert!(!parsed.is_empty());

        let parsed: BorrowerPatch = serde_json::from_value(json!({ "loanstatus": "active" })).unwrap();
        assert_eq!(parsed.employername, None);
    }

    #[test]
    fn test_empty_patch_rejected() {
        assert!(BorrowerPatch::new().is_empty());
        assert!(BorrowerPatch::new().validate().is_err());
    }
}
