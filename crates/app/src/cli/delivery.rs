use clap::{Args, Subcommand};
use sabzi::delivery::{DeliveryState, Serviceability};
use sabzi_app::context::AppContext;

use super::say;

#[derive(Debug, Args)]
pub(crate) struct DeliveryCommand {
    #[command(subcommand)]
    command: DeliverySubcommand,
}

#[derive(Debug, Subcommand)]
enum DeliverySubcommand {
    /// Check a postal code and remember it
    Check {
        /// Postal code to check
        zip_code: String,
    },

    /// Show the remembered postal code
    Show,

    /// Forget the remembered postal code
    Reset,
}

pub(crate) async fn run(context: &AppContext, command: DeliveryCommand) -> Result<(), String> {
    match command.command {
        DeliverySubcommand::Check { zip_code } => {
            context.delivery.check_serviceability(&zip_code).await;

            report(&context.delivery.snapshot())
        }
        DeliverySubcommand::Show => match context.delivery.snapshot().zip_code() {
            Some(zip_code) => say(format!("postal code {zip_code} (not checked this session)")),
            None => say("no postal code saved"),
        },
        DeliverySubcommand::Reset => {
            context.delivery.reset();

            say("postal code forgotten")
        }
    }
}

pub(crate) fn report(state: &DeliveryState) -> Result<(), String> {
    let zip_code = state.zip_code().unwrap_or_default();

    match state.serviceability() {
        Serviceability::Serviceable => {
            let city = state.city().unwrap_or("your area");

            match state.delivery_time_hrs() {
                Some(hours) => say(format!("{zip_code}: delivering to {city} within {hours}h")),
                None => say(format!("{zip_code}: delivering to {city}")),
            }
        }
        Serviceability::NotServiceable => Err(format!(
            "{zip_code}: {}",
            state.error().unwrap_or_default()
        )),
        Serviceability::Unknown => say(format!("{zip_code}: not checked")),
    }
}
