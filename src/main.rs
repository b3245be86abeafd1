use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use variant_compass::{
    api,
    config::{
        catalog::load_catalog,
        database::{create_connection, create_tables},
        settings::{DEFAULT_LOG_FILTER, Settings},
    },
    core::{
        price_history::price_history_for_variant, seed::seed_catalog, selection::Selection,
        variant::get_variant_by_sku,
    },
    errors::{Error, Result},
};

/// Catalog and variant navigation tool
#[derive(Debug, Parser)]
#[command(name = "variant-compass", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the catalog tables
    Init,
    /// Load a TOML catalog into the store
    Seed {
        /// Catalog file, defaults to CATALOG_CONFIG or catalog.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Best group or SKU for a selection
    BestMatch {
        /// Product slug
        product: String,
        /// Selections as `slug=value`
        selections: Vec<String>,
    },
    /// Navigation payload of a group page
    Navigation {
        /// Group id
        group_id: i64,
    },
    /// Reachable options on every axis for a selection
    Options {
        /// Product slug
        product: String,
        /// Selections as `slug=value`
        selections: Vec<String>,
    },
    /// Price changes of a SKU, newest first
    PriceHistory {
        /// Variant SKU
        sku: String,
    },
}

fn product_query(product: &str, selections: &[String]) -> String {
    let selection = Selection::parse_assignments(selections.iter().map(String::as_str));
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair(api::PRODUCT_SLUG_KEY, product);
    for (slug, value) in &selection {
        query.append_pair(slug, value);
    }
    query.finish()
}

fn print_response(response: &api::ApiResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if response.is_success() {
        Ok(())
    } else {
        Err(Error::InvalidInput {
            message: format!("request failed with status {}", response.status),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env();

    // 3. Connect and make sure the schema exists
    let db = create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db).await?;

    match cli.command {
        Command::Init => {
            info!(database = %settings.database_url, "Database initialized");
        }
        Command::Seed { config } => {
            let path = config.unwrap_or(settings.catalog_config);
            let catalog = load_catalog(&path)?;
            let report = seed_catalog(&db, &catalog).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::BestMatch {
            product,
            selections,
        } => {
            let response = api::best_match_response(&db, &product_query(&product, &selections)).await?;
            print_response(&response)?;
        }
        Command::Navigation { group_id } => {
            let response = api::group_navigation_response(&db, group_id).await?;
            print_response(&response)?;
        }
        Command::Options {
            product,
            selections,
        } => {
            let response =
                api::available_options_response(&db, &product_query(&product, &selections)).await?;
            print_response(&response)?;
        }
        Command::PriceHistory { sku } => {
            let variant = get_variant_by_sku(&db, &sku)
                .await?
                .ok_or_else(|| Error::not_found("Variant", &sku))?;
            let history = price_history_for_variant(&db, variant.id).await?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
    }

    Ok(())
}
