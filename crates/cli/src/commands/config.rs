use anyhow::Result;

use crate::config::AppConfig;

pub(crate) fn run_config(config: &AppConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
