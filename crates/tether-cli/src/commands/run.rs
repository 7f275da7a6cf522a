//! Run command - execute a JavaScript file.

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use tether::{Context, ContextConfig};

use crate::globals;

#[derive(Args)]
pub struct RunCommand {
    /// File to execute
    pub entry: PathBuf,

    /// Arguments to pass to script
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl RunCommand {
    pub fn run(&self, config: ContextConfig) -> Result<()> {
        let source = std::fs::read_to_string(&self.entry)
            .with_context(|| format!("Failed to read {}", self.entry.display()))?;

        let ctx = Context::with_config(config)?;
        globals::install(&ctx, &self.args)?;

        tracing::debug!(entry = %self.entry.display(), "running script");
        ctx.evaluate(&source)?;
        Ok(())
    }
}
