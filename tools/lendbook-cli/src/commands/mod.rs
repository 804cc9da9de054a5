//! CLI command implementations.

pub mod borrowers;
pub mod config;
pub mod tenants;

use clap::{Args, Subcommand};
use lendbook_domain::borrower::{BorrowerFilters, EmploymentStatus, LoanStatus};

/// Arguments for the borrowers command.
#[derive(Args)]
pub struct BorrowersArgs {
    #[command(subcommand)]
    pub command: BorrowersCommand,
}

#[derive(Subcommand)]
pub enum BorrowersCommand {
    /// List one page of borrowers.
    List {
        /// Page number, starting at 1.
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Borrowers per page.
        #[arg(short, long, default_value_t = 10)]
        limit: u32,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show one borrower.
    Show {
        /// Borrower ID.
        id: String,
    },
    /// Register a borrower from a JSON file.
    Create {
        /// JSON file with the borrower fields.
        #[arg(short, long)]
        file: String,
    },
    /// Update a borrower from a JSON file of changed fields.
    Update {
        /// Borrower ID.
        id: String,

        /// JSON file with the fields to change.
        #[arg(short, long)]
        file: String,
    },
    /// Delete a borrower.
    Delete {
        /// Borrower ID.
        id: String,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Export every matching borrower as CSV.
    Export {
        /// Output file (default: borrowers-<timestamp>.csv).
        #[arg(short, long)]
        out: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Borrower list filters.
#[derive(Args)]
pub struct FilterArgs {
    /// Only borrowers with this loan status (active, pending, completed, defaulted).
    #[arg(long)]
    pub loan_status: Option<LoanStatus>,

    /// Only borrowers with this employment status (employed, self-employed, unemployed, retired).
    #[arg(long)]
    pub employment_status: Option<EmploymentStatus>,

    /// Lowest credit score to include.
    #[arg(long)]
    pub min_credit_score: Option<i32>,

    /// Highest credit score to include.
    #[arg(long)]
    pub max_credit_score: Option<i32>,

    /// Match first name, last name or email, ignoring case.
    #[arg(short, long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filters(&self) -> BorrowerFilters {
        BorrowerFilters {
            loanstatus: self.loan_status,
            employmentstatus: self.employment_status,
            mincreditscore: self.min_credit_score,
            maxcreditscore: self.max_credit_score,
            search: self.search.clone(),
        }
    }
}

/// Arguments for the tenants command.
#[derive(Args)]
pub struct TenantsArgs {
    #[command(subcommand)]
    pub command: TenantsCommand,
}

#[derive(Subcommand)]
pub enum TenantsCommand {
    /// Create an organization owned by a user.
    Create {
        /// Owner user ID.
        #[arg(long)]
        user: String,

        /// Owner email, used to name the organization.
        #[arg(long)]
        email: String,
    },
    /// List the organizations a user belongs to.
    List {
        /// User ID.
        #[arg(long)]
        user: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate configuration.
    Validate,
}
