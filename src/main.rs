use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use skin_market::config::Config;
use skin_market::error::Result;
use skin_market::panel::{money, Container, NoticeKind, Panel, ViewMode};
use skin_market::types::{FilterState, LoadoutRequest, Side, WearTier};
use skin_market::{BackendClient, ViewController};

/// Browse CS2 skin listings through the skin backend
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Backend base URL (overrides API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Print the result as an HTML fragment instead of text
    #[arg(long, global = true)]
    html: bool,

    /// Use the list layout for HTML card grids
    #[arg(long, global = true)]
    list: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search market listings for a weapon
    Search {
        /// Weapon name, e.g. "AK-47"
        query: String,
        /// Minimum price in dollars
        #[arg(long)]
        min: Option<f64>,
        /// Maximum price in dollars
        #[arg(long)]
        max: Option<f64>,
        /// Only show these wear tiers (fn, mw, ft, ww, bs); repeatable
        #[arg(short, long = "wear")]
        wear: Vec<WearTier>,
        /// Only show StatTrak listings
        #[arg(long)]
        stattrak: bool,
    },
    /// Let the backend pick skins that fit a budget
    Budget {
        /// Budget in dollars
        budget: f64,
        /// Weapon name
        query: String,
    },
    /// Assemble a loadout for one side
    Loadout {
        /// T or CT
        #[arg(long, default_value = "T")]
        side: Side,
        /// Budget shared by primary and secondary
        #[arg(long)]
        weapons: f64,
        #[arg(long, default_value_t = 0.0)]
        knife: f64,
        #[arg(long, default_value_t = 0.0)]
        gloves: f64,
    },
    /// Check that the backend is reachable
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(url) = &cli.api_url {
        cfg.api_url = url.trim_end_matches('/').to_string();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(std::io::stderr)
        .init();

    match run(cli, cfg).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Fatal error: {e}");
            std::process::exit(1);
        }
    }
}

/// Returns `false` when the operation ended in an error notice.
async fn run(cli: Cli, cfg: Config) -> Result<bool> {
    let client = BackendClient::new(&cfg)?;
    info!("Using backend at {}", client.base_url());

    let mut view = ViewController::new(client);
    if cli.list {
        view.set_view_mode(ViewMode::List);
    }

    let container = match cli.command {
        Commands::Search {
            query,
            min,
            max,
            wear,
            stattrak,
        } => {
            view.set_filters(FilterState::new(wear, stattrak));
            view.search(&query, min, max).await;
            Container::Search
        }
        Commands::Budget { budget, query } => {
            view.optimize_budget(Some(budget), &query).await;
            Container::Budget
        }
        Commands::Loadout {
            side,
            weapons,
            knife,
            gloves,
        } => {
            let total = LoadoutRequest {
                side,
                weapons_budget: weapons,
                knife_budget: knife,
                gloves_budget: gloves,
            }
            .total();
            if !cli.html {
                println!("{side} side | Total: {}", money(total));
            }
            view.build_loadout(side, weapons, knife, gloves).await;
            Container::Loadout
        }
        Commands::Health => {
            let health = view.client().health().await?;
            println!("{}: {}", health.status, health.message);
            return Ok(health.status.eq_ignore_ascii_case("ok"));
        }
    };

    if cli.html {
        println!("{}", view.to_html(container));
    } else {
        for line in view.panel(container).to_lines() {
            println!("{line}");
        }
    }

    let failed = matches!(
        view.panel(container),
        Panel::Notice(n) if n.kind != NoticeKind::Empty
    );
    Ok(!failed)
}
