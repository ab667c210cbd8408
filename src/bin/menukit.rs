use clap::{Parser, Subcommand};
use menukit::{ClientConfig, InMemoryBackend, cli as prog_cli, utils::logger};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "menukit", version, about = "Query menu fixtures through the in-memory backend", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to a config file (TOML). Falls back to MENUKIT_CONFIG, then the user and working directories.")]
    config: Option<PathBuf>,
    #[arg(long, help = "Write app/audit logs under this directory instead of the configured one")]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "List entity kinds with their default page size and queryable fields")]
    Kinds,
    #[command(about = "Run a query; prints one page per line as JSON")]
    Query {
        #[arg(help = "Entity kind, e.g. menus, items, modifier-groups")]
        kind: String,
        #[arg(long, help = "JSON array of documents to load before querying")]
        fixture: Option<PathBuf>,
        #[arg(long, help = "Filter JSON (e.g., {\"visible\": true, \"priceInfo.price\": {\"$gt\": \"5\"}})")]
        filter: Option<String>,
        #[arg(long, help = "Sort spec comma-separated; -priceInfo.price,+name")]
        sort: Option<String>,
        #[arg(long, help = "Page size; defaults to the kind's default")]
        limit: Option<usize>,
        #[arg(long, default_value_t = 1, help = "Follow next cursors for up to N pages")]
        pages: usize,
    },
    #[command(about = "Count documents matching a filter")]
    Count {
        #[arg(help = "Entity kind")]
        kind: String,
        #[arg(long, help = "JSON array of documents to load before counting")]
        fixture: Option<PathBuf>,
        #[arg(long, help = "Filter JSON")]
        filter: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cfg = match ClientConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => { eprintln!("error: {e}"); std::process::exit(2); }
    };
    let log_dir = cli.log_dir.clone().or_else(|| cfg.log_dir.clone());
    if let Some(dir) = log_dir.as_deref() {
        if let Err(e) = logger::configure_logging(Some(dir), cfg.log_level.as_deref(), None) {
            eprintln!("warning: logging disabled: {e}");
        }
    }

    let backend = InMemoryBackend::new(cfg);
    let cmd = match cli.command {
        Commands::Kinds => prog_cli::Command::Kinds,
        Commands::Query { kind, fixture, filter, sort, limit, pages } => {
            prog_cli::Command::Query { kind, fixture, filter_json: filter, sort, limit, pages }
        }
        Commands::Count { kind, fixture, filter } => prog_cli::Command::Count { kind, fixture, filter_json: filter },
    };
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = prog_cli::run(&backend, cmd, &mut stdout).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
