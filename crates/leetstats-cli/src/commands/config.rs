//! Config command handlers

use std::path::PathBuf;

use anyhow::Result;

use leetstats_core::Config;

use crate::output::{Output, OutputFormat};

/// Show the effective configuration
pub fn show(config: &Config, config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let token_state = if config.gist_token.is_some() {
        "(set)"
    } else {
        "(not set)"
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "roster_file": config.roster_path(),
                    "stats_file": config.stats_path(),
                    "backend": config.backend.to_string(),
                    "mode": config.mode.to_string(),
                    "stats_api_url": config.stats_api_url,
                    "graphql_url": config.graphql_url,
                    "gist_api_url": config.gist_api_url,
                    "gist_id": config.gist_id,
                    "gist_file": config.gist_file,
                    "gist_token_set": config.gist_token.is_some(),
                    "request_timeout_secs": config.request_timeout_secs,
                    "request_delay_ms": config.request_delay_ms,
                    "update_roster": config.update_roster
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.backend);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  roster_file:          {}", config.roster_path().display());
            println!("  stats_file:           {}", config.stats_path().display());
            println!("  backend:              {}", config.backend);
            println!("  mode:                 {}", config.mode);
            println!("  stats_api_url:        {}", config.stats_api_url);
            println!("  graphql_url:          {}", config.graphql_url);
            println!("  gist_api_url:         {}", config.gist_api_url);
            println!(
                "  gist_id:              {}",
                config.gist_id.as_deref().unwrap_or("(not set)")
            );
            println!("  gist_file:            {}", config.gist_file);
            println!("  GIST_TOKEN:           {}", token_state);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!("  request_delay_ms:     {}", config.request_delay_ms);
            println!("  update_roster:        {}", config.update_roster);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}
