//! CSV export of borrower lists.

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{Terminator, WriterBuilder};

use super::model::Borrower;
use crate::error::{DomainError, DomainResult};

/// Header row of a borrower export.
pub const CSV_HEADERS: [&str; 10] = [
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Address",
    "Credit Score",
    "Employment Status",
    "Monthly Income",
    "Loan Status",
    "Registration Date",
];

/// Render borrowers as CSV, one row per borrower after the header row.
///
/// Fields are quoted only when needed and rows end with CRLF. The social
/// security number is never exported.
pub fn borrowers_to_csv(borrowers: &[Borrower]) -> DomainResult<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS).map_err(export_error)?;
    for b in borrowers {
        writer
            .write_record([
                b.firstname.as_str(),
                b.lastname.as_str(),
                b.email.as_str(),
                b.phone.as_str(),
                b.address.as_str(),
                b.creditscore.to_string().as_str(),
                b.employmentstatus.as_str(),
                b.monthlyincome.to_string().as_str(),
                b.loanstatus.as_str(),
                b.registrationdate.as_str(),
            ])
            .map_err(export_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DomainError::Export(e.into_error().to_string()))?;
    String::from_utf8(bytes).map_err(|e| DomainError::Export(e.to_string()))
}

/// Suggested file name for an export taken at `at`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!(
        "borrowers-{}.csv",
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

fn export_error(error: csv::Error) -> DomainError {
    DomainError::Export(error.to_string())
}
