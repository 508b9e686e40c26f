mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::Level;

use crate::commands::{
    cmd_favorite_add, cmd_favorite_remove, cmd_favorite_toggle, cmd_favorites_list, cmd_list,
    cmd_search, cmd_shell, cmd_show,
};
use crate::config::Config;
use crate::server::SharedStore;
use pantry_core::catalog::Catalog;
use pantry_core::controller::Controller;
use pantry_core::db::Database;
use pantry_core::service::PantryService;
use pantry_core::store::MemoryStore;

#[derive(Parser)]
#[command(
    name = "pantry",
    version,
    about = "Find recipes by the ingredients you have",
    long_about = "Find recipes by the ingredients you have.\n\n\
        Search with a comma-separated ingredient list; a recipe matches when it\n\
        uses every ingredient you name. Favorites are saved between runs."
)]
struct Cli {
    /// Load recipes from a JSON file instead of the built-in catalog
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,
    /// Database file for favorites (default: pantry.db in the data directory)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
    /// Keep favorites in memory only; nothing is read from or written to disk
    #[arg(long, global = true, conflicts_with = "db")]
    ephemeral: bool,
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find recipes that use all of the given ingredients
    Search {
        /// Comma-separated ingredients (e.g. "tomato, basil")
        query: String,
        /// Ignore empty entries such as the one in "tomato,,basil"
        #[arg(long)]
        lenient: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every recipe in the catalog
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one recipe
    Show {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage favorite recipes
    #[command(visible_alias = "fav")]
    Favorites {
        #[command(subcommand)]
        command: FavoriteCommands,
    },
    /// Interactive session: search, toggle and remove favorites
    Shell,
    /// Start the local JSON API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[derive(Subcommand)]
enum FavoriteCommands {
    /// List favorite recipes in the order they were added
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a recipe to favorites, or remove it if it already is one
    Toggle {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a recipe to favorites
    Add {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a recipe from favorites
    Remove {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_service(cli: &Cli) -> Result<PantryService<SharedStore>> {
    let catalog = match &cli.catalog {
        Some(path) => Catalog::load_file(path)?,
        None => Catalog::builtin(),
    };
    tracing::debug!(recipes = catalog.len(), "catalog ready");

    let store: SharedStore = if cli.ephemeral {
        Box::new(MemoryStore::new())
    } else {
        let mut config = Config::load()?;
        if let Some(path) = &cli.db {
            config = config.with_db_path(path.clone())?;
        }
        tracing::debug!(
            data_dir = %config.data_dir.display(),
            db = %config.db_path.display(),
            "opening favorites database"
        );
        Box::new(Database::open(&config.db_path)?)
    };

    Ok(PantryService::new(catalog, store))
}

async fn run(cli: Cli) -> Result<()> {
    let mut svc = open_service(&cli)?;

    match cli.command {
        Commands::Search {
            query,
            lenient,
            json,
        } => cmd_search(&svc, &query, lenient, json),
        Commands::List { json } => cmd_list(&svc, json),
        Commands::Show { id, json } => cmd_show(&svc, id, json),
        Commands::Favorites { command } => match command {
            FavoriteCommands::List { json } => cmd_favorites_list(&svc, json),
            FavoriteCommands::Toggle { id, json } => cmd_favorite_toggle(&mut svc, id, json),
            FavoriteCommands::Add { id, json } => cmd_favorite_add(&mut svc, id, json),
            FavoriteCommands::Remove { id, json } => cmd_favorite_remove(&mut svc, id, json),
        },
        Commands::Shell => cmd_shell(&mut Controller::new(svc)),
        Commands::Serve { port, bind } => server::start_server(svc, port, &bind).await,
    }
}
