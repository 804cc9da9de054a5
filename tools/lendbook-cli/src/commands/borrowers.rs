//! Borrower commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use chrono::Utc;
use dialoguer::Confirm;
use lendbook_domain::borrower::{
    borrowers_to_csv, export_file_name, Borrower, BorrowerDraft, BorrowerFilters, BorrowerPatch,
};
use lendbook_store::RecordId;
use serde::de::DeserializeOwned;

use super::{BorrowersArgs, BorrowersCommand};
use crate::context::Context;
use crate::output::{format_money, status_badge};

const LIST_WIDTHS: [usize; 5] = [10, 24, 28, 6, 10];

/// Run the borrowers command.
pub async fn run(args: BorrowersArgs, ctx: &Context) -> Result<()> {
    match args.command {
        BorrowersCommand::List {
            page,
            limit,
            filters,
        } => list(&filters.to_filters(), page, limit, ctx).await,
        BorrowersCommand::Show { id } => show(&RecordId::new(id), ctx).await,
        BorrowersCommand::Create { file } => create(&file, ctx).await,
        BorrowersCommand::Update { id, file } => update(&RecordId::new(id), &file, ctx).await,
        BorrowersCommand::Delete { id, yes } => delete(&RecordId::new(id), yes, ctx).await,
        BorrowersCommand::Export { out, filters } => {
            export(out.as_deref(), &filters.to_filters(), ctx).await
        }
    }
}

async fn list(filters: &BorrowerFilters, page: u32, limit: u32, ctx: &Context) -> Result<()> {
    let service = ctx.borrowers()?;
    let page = service.page(filters, page, limit).await?;

    if ctx.output.is_json() {
        ctx.output.json(&page);
        return Ok(());
    }

    ctx.output.header("Borrowers");
    if page.is_empty() {
        ctx.output.info("No borrowers found");
        return Ok(());
    }

    ctx.output.table_row(&["ID", "NAME", "EMAIL", "SCORE", "STATUS"], &LIST_WIDTHS);
    for b in &page.items {
        let name = b.full_name();
        let score = b.creditscore.to_string();
        let badge = status_badge(b.loanstatus);
        ctx.output.table_row(
            &[b.id.as_str(), &name, &b.email, &score, &badge],
            &LIST_WIDTHS,
        );
    }

    println!();
    match page.total {
        Some(total) => ctx.output.info(&format!(
            "Showing {} to {} of {} results (page {} of {})",
            page.first_index(),
            page.last_index(),
            total,
            page.page,
            page.total_pages().unwrap_or(1).max(1)
        )),
        None => ctx.output.info(&format!(
            "Showing {} to {}",
            page.first_index(),
            page.last_index()
        )),
    }
    if page.has_next() {
        ctx.output
            .debug(&format!("Next page: --page {}", page.page + 1));
    }

    Ok(())
}

async fn show(id: &RecordId, ctx: &Context) -> Result<()> {
    let borrower = ctx.borrowers()?.find(id).await?;

    if ctx.output.is_json() {
        ctx.output.json(&borrower);
        return Ok(());
    }

    print_borrower(&borrower, ctx);
    Ok(())
}

async fn create(file: &str, ctx: &Context) -> Result<()> {
    let draft: BorrowerDraft = read_json(ctx, file)?;
    let borrower = ctx.borrowers()?.register(&draft).await?;

    if ctx.output.is_json() {
        ctx.output.json(&borrower);
        return Ok(());
    }

    ctx.output
        .success(&format!("Registered {} ({})", borrower.full_name(), borrower.id));
    Ok(())
}

async fn update(id: &RecordId, file: &str, ctx: &Context) -> Result<()> {
    let patch: BorrowerPatch = read_json(ctx, file)?;
    let borrower = ctx.borrowers()?.edit(id, &patch).await?;

    if ctx.output.is_json() {
        ctx.output.json(&borrower);
        return Ok(());
    }

    ctx.output.success(&format!("Updated {}", borrower.id));
    print_borrower(&borrower, ctx);
    Ok(())
}

async fn delete(id: &RecordId, yes: bool, ctx: &Context) -> Result<()> {
    if !yes {
        if ctx.output.is_json() {
            bail!("Refusing to delete without --yes in JSON mode");
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete borrower {}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Cancelled");
            return Ok(());
        }
    }

    ctx.borrowers()?.remove(id).await?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "deleted": id }));
    } else {
        ctx.output.success(&format!("Deleted borrower {}", id));
    }
    Ok(())
}

async fn export(out: Option<&str>, filters: &BorrowerFilters, ctx: &Context) -> Result<()> {
    let service = ctx.borrowers()?;

    let spinner = ctx.output.spinner("Fetching borrowers...");
    let borrowers = match service.all(filters).await {
        Ok(borrowers) => borrowers,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    spinner.finish_and_clear();
    if borrowers.is_empty() {
        ctx.output.warn("No borrowers matched, writing header only");
    }

    let path = match out {
        Some(out) => ctx.resolve_path(out),
        None => ctx.cwd.join(export_file_name(Utc::now())),
    };
    let csv = borrowers_to_csv(&borrowers)?;
    fs::write(&path, csv)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "path": path,
            "count": borrowers.len(),
        }));
    } else {
        ctx.output.success(&format!(
            "Exported {} borrowers to {}",
            borrowers.len(),
            path.display()
        ));
    }
    Ok(())
}

fn print_borrower(b: &Borrower, ctx: &Context) {
    ctx.output.header(&b.full_name());
    ctx.output.kv("id", b.id.as_str());
    ctx.output.kv("email", &b.email);
    ctx.output.kv("phone", &b.phone);
    ctx.output.kv("address", &b.address);
    ctx.output.kv("ssn", &b.masked_ssn());
    ctx.output.kv("credit score", &b.creditscore.to_string());
    ctx.output.kv("employment", b.employmentstatus.as_str());
    if let Some(employer) = &b.employername {
        ctx.output.kv("employer", employer);
    }
    ctx.output.kv("monthly income", &format_money(b.monthlyincome));
    ctx.output.kv("loan status", &status_badge(b.loanstatus));
    ctx.output.kv("registered", &b.registrationdate);
}

fn read_json<T: DeserializeOwned>(ctx: &Context, file: &str) -> Result<T> {
    let path = ctx.resolve_path(file);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
