//! mbench - benchmark competitor menus against your own catalog

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use menubench::cli::{Cli, Commands, ConfigCommands, DishCommands, HistoryCommands};
use menubench::error::Result;

mod commands;
mod utils;

/// Logs go to stderr so `--json` output stays clean.
/// MENUBENCH_LOG takes EnvFilter directives; --verbose forces debug.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("menubench=debug,mbench=debug")
    } else {
        EnvFilter::try_from_env("MENUBENCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        // Catalog
        Commands::Dish(DishCommands::Add { brand, id, fields }) => {
            commands::cmd_dish_add(brand, id, fields)
        }
        Commands::Dish(DishCommands::List { brand, json }) => commands::cmd_dish_list(brand, json),
        Commands::Dish(DishCommands::Show { id, brand, json }) => {
            commands::cmd_dish_show(&id, brand, json)
        }
        Commands::Dish(DishCommands::Edit { id, brand, fields, no_promo }) => {
            commands::cmd_dish_edit(&id, brand, fields, no_promo)
        }
        Commands::Dish(DishCommands::Delete { id, brand, yes }) => {
            commands::cmd_dish_delete(&id, brand, yes)
        }
        Commands::Import { path, json } => commands::cmd_import(&path, json),

        // Benchmarking
        Commands::Bench { brand, url, file, no_save, json } => {
            commands::cmd_bench(&brand, url, file, no_save, json)
        }
        Commands::Extract { url, file, json } => commands::cmd_extract(url, file, json),

        // History
        Commands::History(HistoryCommands::List { limit, json }) => {
            commands::cmd_history_list(limit, json)
        }
        Commands::History(HistoryCommands::Show { id, json }) => {
            commands::cmd_history_show(&id, json)
        }

        // Miscellaneous
        Commands::Config(ConfigCommands::Show) => commands::cmd_config_show(),
        Commands::Config(ConfigCommands::Init { force }) => commands::cmd_config_init(force),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
