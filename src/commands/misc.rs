//! Miscellaneous commands: completions and config

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use menubench::cli::{Cli, CompletionShell};
use menubench::config::Config;
use menubench::error::{BenchError, Result};

/// Generate shell completions
pub fn cmd_completions(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::Powershell => Shell::PowerShell,
    };
    generate(shell, &mut cmd, "mbench", &mut io::stdout());
    Ok(())
}

/// Print the effective configuration as TOML
pub fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;
    let path = Config::config_path()?;

    let content = toml::to_string_pretty(&config)
        .map_err(|e| BenchError::ConfigError(e.to_string()))?;
    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not created, showing defaults)", path.display());
    }
    println!("{}", content);
    Ok(())
}

/// Write the default configuration to disk
pub fn cmd_config_init(force: bool) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    Config::default().save()?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
