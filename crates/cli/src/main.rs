use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use csv_adapter::CsvRecordRepository;
use scraper_adapter::{CommandSearchScraper, CommandTrendingIngestor, ScraperCommand, Unconfigured};
use server::config::{AccessMode, Config, Credentials};
use server::state::AppState;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use trending_core::ports::{SearchScraper, TrendingIngestor};
use trending_core::refresh::RefreshPolicy;

/// HTTP service over a periodically refreshed table of trending videos
#[derive(Parser, Debug)]
#[command(name = "trending-server")]
#[command(about = "Serves search, listing and view-count charts over a trending video CSV")]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Path of the trending table CSV
    #[arg(long, env = "TRENDING_DATA_FILE", default_value = "./data/trending_IN.csv")]
    data_file: PathBuf,

    /// Region code handed to the trending scraper on refresh
    #[arg(long, env = "TRENDING_REGION", default_value = "IN")]
    region: String,

    /// Number of videos requested per refresh
    #[arg(long, env = "TRENDING_REFRESH_LIMIT", default_value_t = 100)]
    refresh_limit: usize,

    /// Which endpoints require a login
    #[arg(long, env = "TRENDING_ACCESS", value_enum, default_value_t = Access::Gated)]
    access: Access,

    /// Behaviour when a refresh is triggered while one is running
    #[arg(long, env = "TRENDING_REFRESH_POLICY", value_enum, default_value_t = Policy::Unbounded)]
    refresh_policy: Policy,

    #[arg(long, env = "TRENDING_LOGIN_USER", default_value = "admin")]
    login_user: String,

    #[arg(long, env = "TRENDING_LOGIN_PASSWORD", default_value = "password")]
    login_password: String,

    /// Origin allowed to make credentialed cross-origin requests (repeatable)
    #[arg(long = "allowed-origin", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// Program that rewrites the data file; called with --region, --limit and --output
    #[arg(long, env = "TRENDING_SCRAPER")]
    trending_scraper: Option<String>,

    /// Program answering live searches; called with --query, prints a JSON array
    #[arg(long, env = "SEARCH_SCRAPER")]
    search_scraper: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Access {
    Open,
    Gated,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    Unbounded,
    SingleFlight,
}

impl Cli {
    fn into_config(self) -> Config {
        let defaults = Config::default();

        Config {
            host: self.host,
            port: self.port,
            data_file: self.data_file,
            region: self.region,
            refresh_limit: self.refresh_limit,
            access: match self.access {
                Access::Open => AccessMode::Open,
                Access::Gated => AccessMode::Gated,
            },
            refresh_policy: match self.refresh_policy {
                Policy::Unbounded => RefreshPolicy::Unbounded,
                Policy::SingleFlight => RefreshPolicy::SingleFlight,
            },
            credentials: Credentials {
                username: self.login_user,
                password: self.login_password,
            },
            allowed_origins: if self.allowed_origins.is_empty() {
                defaults.allowed_origins
            } else {
                self.allowed_origins
            },
        }
    }
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let trending_scraper = cli.trending_scraper.clone();
    let search_scraper = cli.search_scraper.clone();
    let config = cli.into_config();

    info!("Initializing state...");

    // Instantiate concrete implementations of secondary adapters
    let repository = Arc::new(CsvRecordRepository::new(config.data_file.clone()));

    let ingestor: Arc<dyn TrendingIngestor> = match trending_scraper {
        Some(program) => Arc::new(CommandTrendingIngestor::new(
            ScraperCommand::new(program),
            config.data_file.clone(),
        )),
        None => {
            warn!("No trending scraper configured, refresh will do nothing");
            Arc::new(Unconfigured("trending scraper"))
        }
    };

    let scraper: Arc<dyn SearchScraper> = match search_scraper {
        Some(program) => Arc::new(CommandSearchScraper::new(ScraperCommand::new(program))),
        None => {
            warn!("No search scraper configured, /scrape_youtube will fail");
            Arc::new(Unconfigured("search scraper"))
        }
    };

    let state = AppState::new(config, repository, ingestor, scraper);

    if let Err(e) = server::start_server(state).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
