//! Jacaranda CLI - command-line storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! jacaranda products --search mesa --page 2
//!
//! # Authenticate
//! jacaranda login --email ana@example.com --password s3cret
//!
//! # Cart and checkout
//! jacaranda cart add prod-1
//! jacaranda checkout --phone "(11) 99999-9999" --street "Avenida Paulista" \
//!     --number 1000 --neighborhood "Bela Vista" --zipcode 01310100 \
//!     --city "São Paulo" --state SP
//! ```
//!
//! # Commands
//!
//! - `login` / `register` / `logout` / `whoami` - session management
//! - `products` - filtered, paginated catalog browsing
//! - `cart` - show/add/remove/set-quantity/clear
//! - `checkout` - validate the address form and submit the order
//! - `order` - confirmation view for a placed order
//! - `states` - region reference list for the address form

#![cfg_attr(not(test), forbid(unsafe_code))]
// This binary IS the presentation surface; stdout is its output channel.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use jacaranda_storefront::app::Storefront;
use jacaranda_storefront::config::StorefrontConfig;

mod commands;

#[derive(Parser)]
#[command(name = "jacaranda")]
#[command(author, version, about = "Jacaranda command-line storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create a new account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Must match --password
        #[arg(long)]
        confirm_password: String,
    },
    /// End the current session
    Logout,
    /// Show the current session identity
    Whoami,
    /// Browse the product catalog
    Products {
        /// Search term (matched against product names)
        #[arg(short, long)]
        search: Option<String>,

        /// Minimum price filter
        #[arg(long)]
        min_price: Option<Decimal>,

        /// Maximum price filter
        #[arg(long)]
        max_price: Option<Decimal>,

        /// Only discounted products (or only full-price with =false)
        #[arg(long)]
        discounted: Option<bool>,

        /// Material filter
        #[arg(short, long)]
        material: Option<String>,

        /// Page number (8 products per page)
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    Checkout {
        /// Full name (defaults to the session identity)
        #[arg(long)]
        name: Option<String>,

        /// Email (defaults to the session identity)
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        street: String,

        #[arg(long)]
        number: String,

        #[arg(long)]
        neighborhood: String,

        /// Zipcode; digits are formatted as 00000-000 like the form field
        #[arg(long)]
        zipcode: String,

        #[arg(long)]
        city: String,

        /// State code (see `jacaranda states`)
        #[arg(long)]
        state: String,

        /// Free-text note for the order
        #[arg(long, default_value = "")]
        observation: String,
    },
    /// Show the confirmation view for a placed order
    Order {
        /// Backend-assigned order ID
        order_id: String,
    },
    /// List region codes for the address form
    States,
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart items and the running total
    Show,
    /// Add products by ID, one round-trip each in order
    Add {
        /// Product IDs as shown by `jacaranda products`
        #[arg(required = true)]
        product_ids: Vec<String>,
    },
    /// Remove a product line
    Remove { product_id: String },
    /// Set a line quantity (0 removes the line)
    SetQuantity { product_id: String, quantity: i64 },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jacaranda=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let app = Storefront::start(config).await;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&app, &email, &password).await?;
        }
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            commands::auth::register(&app, &name, &email, &password, &confirm_password).await?;
        }
        Commands::Logout => commands::auth::logout(&app).await,
        Commands::Whoami => commands::auth::whoami(&app),
        Commands::Products {
            search,
            min_price,
            max_price,
            discounted,
            material,
            page,
        } => {
            commands::catalog::browse(&app, search, min_price, max_price, discounted, material, page)
                .await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&app),
            CartAction::Add { product_ids } => commands::cart::add(&app, &product_ids).await?,
            CartAction::Remove { product_id } => commands::cart::remove(&app, &product_id).await,
            CartAction::SetQuantity {
                product_id,
                quantity,
            } => commands::cart::set_quantity(&app, &product_id, quantity).await,
            CartAction::Clear => commands::cart::clear(&app).await,
        },
        Commands::Checkout {
            name,
            email,
            phone,
            street,
            number,
            neighborhood,
            zipcode,
            city,
            state,
            observation,
        } => {
            let draft = commands::checkout::DraftArgs {
                name,
                email,
                phone,
                street,
                number,
                neighborhood,
                zipcode,
                city,
                state,
                observation,
            };
            commands::checkout::submit(&app, draft).await?;
        }
        Commands::Order { order_id } => commands::orders::show(&app, &order_id).await?,
        Commands::States => commands::checkout::states(&app).await,
    }
    Ok(())
}
