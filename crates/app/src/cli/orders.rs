use clap::{Args, Subcommand};
use sabzi::{money::format_amount, orders::Order};
use sabzi_app::context::AppContext;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use super::say;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// List past orders
    List,

    /// Show one order
    Show {
        /// Order id
        order_id: String,
    },
}

pub(crate) async fn run(context: &AppContext, command: OrdersCommand) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::List => {
            context.orders.fetch_orders().await;

            if let Some(error) = context.orders.error() {
                return Err(error);
            }

            list(&context.orders.orders())
        }
        OrdersSubcommand::Show { order_id } => {
            context.orders.fetch_order_details(&order_id).await;

            if let Some(error) = context.orders.error() {
                return Err(error);
            }

            let order = context
                .orders
                .active_order()
                .ok_or_else(|| format!("order {order_id} not found"))?;

            context.orders.clear_active_order();

            show(&order)
        }
    }
}

fn list(orders: &[Order]) -> Result<(), String> {
    if orders.is_empty() {
        return say("no orders yet");
    }

    let mut builder = Builder::default();

    builder.push_record(["Order", "Placed", "Status", "Items", "Total"]);

    for order in orders {
        builder.push_record([
            order.id.clone(),
            order.created_at.clone(),
            order.display_status().label().to_string(),
            order.items.len().to_string(),
            format_amount(order.total_price),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..5), Alignment::right());

    say(table)
}

fn show(order: &Order) -> Result<(), String> {
    say(format!(
        "Order {} ({}), {}",
        order.id,
        order.display_status().label(),
        format_amount(order.total_price)
    ))?;

    if let Some(driver) = &order.driver_name {
        match &order.driver_phone {
            Some(phone) => say(format!("Driver: {driver} ({phone})"))?,
            None => say(format!("Driver: {driver}"))?,
        }
    }

    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Price"]);

    for item in &order.items {
        builder.push_record([
            item.product_name.clone(),
            item.quantity.to_string(),
            format_amount(item.price_at_purchase),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(1..3), Alignment::right());

    say(table)
}
