use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Shell types for completion generation
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Parser)]
#[command(name = "mbench")]
#[command(author, version, about = "Benchmark competitor menus against your own catalog", long_about = None)]
#[command(after_help = r#"Examples:
  mbench import catalog.csv                              Load your dishes
  mbench dish list --brand Atomic                        Show the catalog
  mbench bench Atomic https://competitor.example/menu    Benchmark a menu page
  mbench bench Atomic --file saved-menu.html             Benchmark a saved page
  mbench history list                                    Past analyses

Quick Start:
  1. mbench import catalog.csv
  2. mbench bench <brand> <url>
  3. mbench history show <id>
"#)]
pub struct Cli {
    /// Show debug logs on stderr (same as MENUBENCH_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage catalog dishes
    #[command(subcommand, after_help = r#"Examples:
  mbench dish add --brand Atomic --id B1 --name "Hamburguesa Doble" --full-price 6.5
  mbench dish list --brand atomic
  mbench dish show B1
  mbench dish edit B1 --promo-price 5.9
  mbench dish delete B1 --brand Atomic
"#)]
    Dish(DishCommands),

    /// Import dishes from a CSV file (upsert by brand and id)
    #[command(after_help = r#"Expected header:
  brand,id,category,name,description,image,fullPrice,promoPrice,discount

Examples:
  mbench import catalog.csv
  mbench import catalog.csv --json
"#)]
    Import {
        /// CSV file path
        path: PathBuf,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Benchmark a competitor page against a brand's catalog
    #[command(after_help = r#"Examples:
  mbench bench Atomic https://competitor.example/menu
  mbench bench Atomic --file menu.html --no-save
  mbench bench Atomic https://competitor.example/menu --json | jq '.results[0]'
"#)]
    Bench {
        /// Brand whose dishes are the reference catalog
        brand: String,

        /// Competitor page URL
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        url: Option<String>,

        /// Read the page from a local HTML file instead of fetching
        #[arg(long)]
        file: Option<PathBuf>,

        /// Do not store the run in history
        #[arg(long)]
        no_save: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview the items mined from a page, without matching
    Extract {
        /// Page URL
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        url: Option<String>,

        /// Read the page from a local HTML file instead of fetching
        #[arg(long)]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse past benchmark runs
    #[command(subcommand)]
    History(HistoryCommands),

    /// Show or create the config file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(after_help = r#"Examples:
  mbench completions bash > ~/.local/share/bash-completion/completions/mbench
  mbench completions zsh > ~/.zfunc/_mbench
  mbench completions fish > ~/.config/fish/completions/mbench.fish
"#)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

/// Dish fields that can be set from flags
#[derive(Args, Debug, Default)]
pub struct DishFields {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Menu category
    #[arg(long)]
    pub category: Option<String>,

    /// Description text
    #[arg(long)]
    pub description: Option<String>,

    /// Image URL
    #[arg(long)]
    pub image: Option<String>,

    /// Regular price
    #[arg(long)]
    pub full_price: Option<f64>,

    /// Promotional price
    #[arg(long)]
    pub promo_price: Option<f64>,

    /// Discount percentage
    #[arg(long)]
    pub discount: Option<f64>,
}

#[derive(Subcommand)]
pub enum DishCommands {
    /// Add a dish, replacing any dish with the same brand and id
    Add {
        /// Brand the dish belongs to
        #[arg(long)]
        brand: String,

        /// Dish id, unique within the brand
        #[arg(long)]
        id: String,

        #[command(flatten)]
        fields: DishFields,
    },

    /// List dishes
    List {
        /// Only dishes of this brand (case-insensitive)
        #[arg(long, short = 'b')]
        brand: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one dish
    Show {
        /// Dish id
        id: String,

        /// Brand, required when the id exists under several brands
        #[arg(long, short = 'b')]
        brand: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of an existing dish
    Edit {
        /// Dish id
        id: String,

        /// Brand, required when the id exists under several brands
        #[arg(long, short = 'b')]
        brand: Option<String>,

        #[command(flatten)]
        fields: DishFields,

        /// Clear the promotional price
        #[arg(long, conflicts_with = "promo_price")]
        no_promo: bool,
    },

    /// Delete a dish
    Delete {
        /// Dish id
        id: String,

        /// Brand, required when the id exists under several brands
        #[arg(long, short = 'b')]
        brand: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// List past analyses, newest first
    List {
        /// Maximum number of entries to show
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one analysis
    Show {
        /// Analysis id (a unique prefix is enough)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
