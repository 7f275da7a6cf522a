//! Eval command - evaluate a snippet and print its value.

use anyhow::Result;
use clap::Args;
use tether::{Context, ContextConfig};

use crate::globals;

#[derive(Args)]
pub struct EvalCommand {
    /// Code to evaluate
    pub code: String,
}

impl EvalCommand {
    pub fn run(&self, config: ContextConfig) -> Result<()> {
        let ctx = Context::with_config(config)?;
        globals::install(&ctx, &[])?;

        let value = ctx.evaluate(&self.code)?;
        if !value.is_undefined() {
            println!("{}", super::render(&value));
        }
        Ok(())
    }
}
