//! Tokoku CLI - Inspect and edit a file-backed shopping cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! tokoku show
//!
//! # Add a product (requires a signed-in shopper)
//! TOKOKU_USER_ID=1 TOKOKU_USER_EMAIL=ana@toko.id \
//!     tokoku add --id 7 --name "Kemeja Batik" --price 100000 --size M
//!
//! # Change quantities
//! tokoku update --line 1 -q 3
//! tokoku remove --line 1
//!
//! # Totals and checkout payload
//! tokoku total
//! tokoku checkout
//! ```
//!
//! # Commands
//!
//! - `show` - List lines and totals
//! - `add` - Add a product
//! - `remove` / `update` / `clear` - Edit lines
//! - `total` / `count` - Print aggregates
//! - `checkout` - Print the checkout request body
//! - `logout` - Discard the cart along with the session
//!
//! Configuration comes from the environment; see [`tokoku_cart::config`].
//! Logs go to stderr, filtered by `RUST_LOG`. Set `TOKOKU_LOG_FORMAT=json`
//! for JSON lines.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tokoku_cart::{CartConfig, CartEvents, CartStore, FileStorage, Hydration, SessionAuthGate};

mod commands;
mod error;

use commands::edit::{AddArgs, LineSelector};
use error::CliError;

#[derive(Parser)]
#[command(name = "tokoku")]
#[command(author, version, about = "Tokoku shopping cart tools")]
struct Cli {
    /// Print JSON instead of text (for `show`)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List cart lines and totals
    Show,
    /// Add a product to the cart
    Add(AddArgs),
    /// Remove a cart line
    Remove(LineSelector),
    /// Set a cart line's quantity (0 removes it)
    Update {
        #[command(flatten)]
        selector: LineSelector,

        /// New quantity
        #[arg(short, long)]
        quantity: u32,
    },
    /// Empty the cart
    Clear,
    /// Print the amount due
    Total,
    /// Print the number of items
    Count,
    /// Print the checkout request body
    Checkout,
    /// End the shopper session, discarding the cart
    Logout,
}

fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tokoku_cart=info,tokoku_cli=info".into());

    // TOKOKU_LOG_FORMAT=json switches to one JSON object per event
    let json_logs = std::env::var("TOKOKU_LOG_FORMAT").is_ok_and(|format| format == "json");

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => print_output(&output),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}

#[allow(clippy::print_stdout)] // Command output is the product of this binary
fn print_output(output: &str) {
    println!("{output}");
}

fn run(cli: Cli) -> Result<String, CliError> {
    let config = CartConfig::from_env()?;

    let auth = SessionAuthGate::new(config.session_ttl);
    if let Some(user) = config.user.clone() {
        auth.sign_in(user);
    }

    let storage = FileStorage::new(&config.storage_dir);
    let mut cart = CartStore::open(
        storage,
        auth,
        CartEvents::new(config.event_capacity),
        config.storage_key.as_str(),
    );
    if let Hydration::Corrupted { reason } = cart.hydration() {
        tracing::warn!(
            path = %config.storage_dir.display(),
            "Ignoring corrupt cart snapshot ({reason}); it will be replaced on the next change"
        );
    }

    match cli.command {
        Commands::Show => commands::show::show(&cart, cli.json),
        Commands::Add(args) => commands::edit::add(&mut cart, &args),
        Commands::Remove(selector) => commands::edit::remove(&mut cart, &selector),
        Commands::Update { selector, quantity } => {
            commands::edit::update(&mut cart, &selector, quantity)
        }
        Commands::Clear => Ok(commands::edit::clear(&mut cart)),
        Commands::Total => Ok(commands::show::total(&cart)),
        Commands::Count => Ok(commands::show::count(&cart)),
        Commands::Checkout => commands::show::checkout(&cart),
        Commands::Logout => Ok(commands::edit::logout(&mut cart)),
    }
}
