//! Teslo CLI - product catalog management from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # First page of kids' products
//! teslo list --limit 8 --offset 0 --gender kid
//!
//! # One product by id or slug, with absolute image URLs
//! teslo show kids_cotton_tee --absolute-images
//!
//! # Create a product with two images
//! teslo create --title "Cotton Tee" --description "Soft" --slug cotton_tee \
//!     --price 25 --stock 10 --gender kid --size S --size M \
//!     --image front.jpg --image back.jpg
//!
//! # Rename a product and toggle a size
//! teslo update 42 --title "Cotton Tee v2" --size XL
//! ```
//!
//! # Environment Variables
//!
//! - `TESLO_API_BASE_URL` - Base URL of the products API (required)
//! - `TESLO_API_TOKEN` - Bearer token for write endpoints
//! - `TESLO_LOG_JSON` - Emit JSON logs instead of text
//! - `RUST_LOG` - Log filter (default: `teslo_admin=info,teslo_cli=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use teslo_admin::{AppError, CatalogConfig, ProductCatalog};
use teslo_core::SIZE_CATALOG;

mod commands;

#[derive(Parser)]
#[command(name = "teslo")]
#[command(author, version, about = "Teslo product catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of products
    List {
        /// Page size
        #[arg(short, long)]
        limit: Option<u32>,

        /// Number of products to skip
        #[arg(short, long)]
        offset: Option<u32>,

        /// Only products for this gender (`men`, `women`, `kid`, `unisex`)
        #[arg(short, long)]
        gender: Option<String>,
    },
    /// Show one product by id or slug
    Show {
        /// Product id or slug (`new` shows the empty draft)
        id_or_slug: String,

        /// Resolve image file names to URLs under the API base URL
        #[arg(long)]
        absolute_images: bool,
    },
    /// Create a product
    Create(ProductFields),
    /// Update an existing product
    Update {
        /// Product id
        id: String,

        #[command(flatten)]
        fields: ProductFields,
    },
}

/// Field overrides applied to the edit form before submitting.
#[derive(Args, Debug, Default)]
struct ProductFields {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    slug: Option<String>,

    #[arg(long)]
    price: Option<Decimal>,

    #[arg(long)]
    stock: Option<i64>,

    /// `men`, `women`, `kid` or `unisex`
    #[arg(long)]
    gender: Option<String>,

    /// Comma-separated tags, replacing the current ones
    #[arg(long)]
    tags: Option<String>,

    /// Toggle a size on or off (repeatable)
    #[arg(long = "size", value_parser = PossibleValuesParser::new(SIZE_CATALOG.iter().copied()))]
    sizes: Vec<String>,

    /// Image file to upload (repeatable)
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "teslo_admin=info,teslo_cli=info".into());

    let json = std::env::var("TESLO_LOG_JSON").is_ok();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = CatalogConfig::from_env()?;
    let catalog = ProductCatalog::new(&config)?;

    match cli.command {
        Commands::List {
            limit,
            offset,
            gender,
        } => commands::products::list(&catalog, limit, offset, gender.as_deref()).await?,
        Commands::Show {
            id_or_slug,
            absolute_images,
        } => {
            let base_url = absolute_images.then(|| config.base_url());
            commands::products::show(&catalog, &id_or_slug, base_url).await?;
        }
        Commands::Create(fields) => commands::edit::create(&catalog, fields).await?,
        Commands::Update { id, fields } => commands::edit::update(&catalog, &id, fields).await?,
    }
    Ok(())
}
