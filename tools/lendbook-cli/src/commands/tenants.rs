//! Tenant commands.

use anyhow::Result;

use super::{TenantsArgs, TenantsCommand};
use crate::context::Context;

/// Run the tenants command.
pub async fn run(args: TenantsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        TenantsCommand::Create { user, email } => create(&user, &email, ctx).await,
        TenantsCommand::List { user } => list(&user, ctx).await,
    }
}

async fn create(user: &str, email: &str, ctx: &Context) -> Result<()> {
    let tenant = ctx.tenants()?.create_for_owner(user, email).await?;

    if ctx.output.is_json() {
        ctx.output.json(&tenant);
        return Ok(());
    }

    ctx.output
        .success(&format!("Created {} ({})", tenant.name, tenant.id));
    Ok(())
}

async fn list(user: &str, ctx: &Context) -> Result<()> {
    let tenants = ctx.tenants()?.tenants_for(user).await?;

    if ctx.output.is_json() {
        let rows: Vec<_> = tenants
            .iter()
            .map(|(membership, tenant)| {
                serde_json::json!({
                    "tenant": tenant,
                    "role": membership.role,
                })
            })
            .collect();
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header(&format!("Organizations for {}", user));
    if tenants.is_empty() {
        ctx.output.info("No organizations found");
        return Ok(());
    }

    let widths = [36, 40, 8];
    ctx.output.table_row(&["ID", "NAME", "ROLE"], &widths);
    for (membership, tenant) in &tenants {
        ctx.output.table_row(
            &[tenant.id.as_str(), &tenant.name, membership.role.as_str()],
            &widths,
        );
    }
    Ok(())
}
