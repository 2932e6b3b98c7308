use std::io::{self, Write};

use clap::{Parser, Subcommand};
use sabzi_app::{config::AppConfig, context::AppContext, observability};

mod cart;
mod catalog;
mod checkout;
mod delivery;
mod orders;

#[derive(Debug, Parser)]
#[command(name = "sabzi", about = "Sabzi storefront client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog(catalog::CatalogArgs),

    /// Inspect and change the cart
    Cart(cart::CartCommand),

    /// Check whether a postal code is served
    Delivery(delivery::DeliveryCommand),

    /// Past orders
    Orders(orders::OrdersCommand),

    /// Place an order for the cart
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        observability::init_subscriber(&self.config.logging)
            .map_err(|error| error.to_string())?;

        let context = AppContext::from_config(&self.config)
            .map_err(|error| format!("{error}: {}", error_source(&error)))?;

        match self.command {
            Commands::Catalog(args) => catalog::run(&context, args).await,
            Commands::Cart(command) => cart::run(&context, command).await,
            Commands::Delivery(command) => delivery::run(&context, command).await,
            Commands::Orders(command) => orders::run(&context, command).await,
            Commands::Checkout(args) => checkout::run(&context, args).await,
        }
    }
}

/// Write one line of command output.
pub(crate) fn say(line: impl std::fmt::Display) -> Result<(), String> {
    writeln!(io::stdout().lock(), "{line}").map_err(|error| error.to_string())
}

fn error_source(error: &dyn std::error::Error) -> String {
    error
        .source()
        .map_or_else(String::new, ToString::to_string)
}
