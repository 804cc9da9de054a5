//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = ctx.config.redacted();

    if ctx.output.is_json() {
        ctx.output.json(&config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    ctx.output.info("[backend]");
    ctx.output.kv("url", &config.backend.url);
    ctx.output.kv("api_key", &config.backend.api_key);
    if let Some(token) = &config.backend.access_token {
        ctx.output.kv("access_token", token);
    }
    if let Some(schema) = &config.backend.schema {
        ctx.output.kv("schema", schema);
    }
    if let Some(order) = &config.backend.order {
        ctx.output.kv("order", order);
    }
    ctx.output.kv(
        "request_timeout_ms",
        &config.backend.request_timeout_ms.to_string(),
    );

    ctx.output.info("[store]");
    ctx.output.kv("max_retries", &config.store.max_retries.to_string());
    ctx.output.kv("retry_delay_ms", &config.store.retry_delay_ms.to_string());
    ctx.output.kv("backoff", &format!("{:?}", config.store.backoff));
    ctx.output.kv(
        "max_retry_delay_ms",
        &config.store.max_retry_delay_ms.to_string(),
    );
    ctx.output.kv("cache_ttl_ms", &config.store.cache_ttl_ms.to_string());
    ctx.output.kv("retry_mode", &format!("{:?}", config.store.retry_mode));

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("lendbook.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));
    ctx.output.info("Set backend.url and backend.api_key before running other commands");

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let problems = ctx.config.problems();
    if problems.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for problem in &problems {
        ctx.output.error(&format!("Error: {}", problem));
    }
    bail!("Configuration has {} error(s)", problems.len());
}
