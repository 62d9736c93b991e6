use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transport_directory::app::{serve, App};
use transport_directory::config::{ServerConfig, StoreKind};
use transport_directory::domain::entities::dataset::{
    FilterToggle, PageSpec, SortDirection, SortSpec, ViewState,
};
use transport_directory::usecase::services::import_service::SeedOutcome;
use transport_directory::usecase::services::query_service::QueryService;

#[derive(Debug, Parser)]
#[command(name = "transport-directory", version, about = "Transport directory server")]
struct Cli {
    /// Listen address, e.g. 0.0.0.0:3000.
    #[arg(long, global = true)]
    bind: Option<String>,
    #[arg(long, global = true, value_enum)]
    store: Option<StoreKind>,
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    /// Path segment served under /api/.
    #[arg(long, global = true)]
    resource: Option<String>,
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Import the first sheet of a workbook, or a CSV file, into the store.
    Seed {
        file: PathBuf,
        /// Replace rows that are already stored.
        #[arg(long)]
        force: bool,
    },
    /// Print one page of the stored dataset as JSON.
    View {
        #[arg(long)]
        search: Option<String>,
        /// Toggle name; repeat for several.
        #[arg(long = "filter")]
        filters: Vec<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
}

impl Cli {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(store) = self.store {
            config.store = store;
        }
        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.clone();
        }
        if let Some(resource) = &self.resource {
            config.resource = resource.trim_matches('/').to_string();
        }
        if self.log_json {
            config.log_json = true;
        }
    }
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn view_state(
    search: Option<String>,
    filters: &[String],
    sort: Option<String>,
    desc: bool,
    page: usize,
    page_size: usize,
) -> Result<ViewState> {
    let mut state = ViewState::default();
    if let Some(search) = search {
        state = state.with_search(search);
    }
    for name in filters {
        let toggle = name.parse::<FilterToggle>().map_err(anyhow::Error::msg)?;
        state = state.with_filter(toggle, true);
    }
    if let Some(column) = sort {
        let direction = if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        state = state.with_sort(SortSpec::by(column, Some(direction)));
    }
    state.page = PageSpec::new(page_size, page);
    Ok(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;
    cli.apply(&mut config);
    init_tracing(config.log_json);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Seed { file, force } => {
            let app = App::from_config(&config)?;
            match app.imports.seed_from_file(&file, force)? {
                SeedOutcome::Imported { rows } => {
                    println!("imported {rows} rows from {}", file.display())
                }
                SeedOutcome::Skipped { existing_rows } => println!(
                    "store already holds {existing_rows} rows; pass --force to replace them"
                ),
            }
            Ok(())
        }
        Command::View {
            search,
            filters,
            sort,
            desc,
            page,
            page_size,
        } => {
            let state = view_state(search, &filters, sort, desc, page, page_size)?;
            let app = App::from_config(&config)?;
            let result = QueryService::new(app.collection.clone()).query_page(&state)?;
            let json = serde_json::to_string_pretty(&result).context("failed to encode page")?;
            println!("{json}");
            Ok(())
        }
    }
}
