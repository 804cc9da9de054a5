//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use lendbook_domain::borrower::BorrowerService;
use lendbook_domain::tenant::TenantDirectory;
use lendbook_postgrest::PostgrestBackend;

use crate::config::{LendbookConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration, with environment overrides applied.
    pub config: LendbookConfig,
    /// Where the configuration was read from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit config file or the nearest one found upward.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => (LendbookConfig::load(path)?, Some(PathBuf::from(path))),
            None => match find_config(&cwd) {
                Some(path) => {
                    let display = path.to_string_lossy().to_string();
                    (LendbookConfig::load(&display)?, Some(path))
                }
                None => (LendbookConfig::default(), None),
            },
        };
        config.apply_env();

        if let Some(path) = &config_path {
            output.debug(&format!("Using config {}", path.display()));
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Build the REST backend from the loaded configuration.
    pub fn backend(&self) -> Result<PostgrestBackend> {
        PostgrestBackend::new(&self.config.backend)
            .context("Backend is not configured. Run `lendbook config init` or set LENDBOOK_URL and LENDBOOK_API_KEY")
    }

    /// Borrower operations against the configured backend.
    pub fn borrowers(&self) -> Result<BorrowerService<PostgrestBackend>> {
        Ok(BorrowerService::new(self.backend()?, &self.config.store)?)
    }

    /// Tenant operations against the configured backend.
    pub fn tenants(&self) -> Result<TenantDirectory<PostgrestBackend>> {
        Ok(TenantDirectory::new(self.backend()?, &self.config.store)?)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find the nearest config file in `start` or its ancestors.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}
