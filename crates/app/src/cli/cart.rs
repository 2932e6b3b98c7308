use clap::{Args, Subcommand};
use sabzi::{
    cart::QuantityChange,
    products::{Product, ProductId},
    receipt::Receipt,
};
use sabzi_app::context::AppContext;

use super::say;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Print the cart and its charges
    Show,

    /// Add units of a product, or take them away with a negative quantity
    Add(AddArgs),

    /// Remove a product's line
    Remove(RemoveArgs),

    /// Empty the cart
    Clear,

    /// Replace the cart with the server's copy
    Sync,

    /// Apply a coupon code
    Coupon(CouponArgs),

    /// Remove the applied coupon
    Uncoupon,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product id or slug
    product: String,

    /// Units to add; negative values remove units
    #[arg(long, short, default_value_t = 1, allow_negative_numbers = true)]
    quantity: i64,

    /// Do not notify the server
    #[arg(long)]
    offline: bool,
}

#[derive(Debug, Args)]
struct RemoveArgs {
    /// Product id
    product_id: String,
}

#[derive(Debug, Args)]
struct CouponArgs {
    /// Coupon code
    code: String,
}

pub(crate) async fn run(context: &AppContext, command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add(args) => add(context, &args).await?,
        CartSubcommand::Remove(args) => {
            if !context.cart.remove(&ProductId::new(args.product_id.clone())) {
                say(format!("{} is not in the cart", args.product_id))?;
            }
        }
        CartSubcommand::Clear => context.cart.clear(),
        CartSubcommand::Sync => {
            context.cart.sync_with_server().await;

            if let Some(error) = context.cart.snapshot().error() {
                return Err(error.to_string());
            }
        }
        CartSubcommand::Coupon(args) => {
            let subtotal = context.cart.snapshot().total_amount();

            context.cart.apply_coupon(&args.code, subtotal).await;

            if let Some(error) = context.cart.snapshot().coupon_error() {
                say(format!("coupon not applied: {error}"))?;
            }
        }
        CartSubcommand::Uncoupon => context.cart.remove_coupon(),
    }

    show(context)
}

async fn add(context: &AppContext, args: &AddArgs) -> Result<(), String> {
    let product = find_product(context, &args.product).await?;

    if args.quantity > 0 && !product.is_purchasable() {
        return Err(format!("{} is out of stock", product.name));
    }

    let change = context.cart.add_or_adjust(&product, args.quantity);

    match change {
        QuantityChange::Added(quantity) | QuantityChange::Updated(quantity) => {
            say(format!("{}: {quantity} in cart", product.name))?;
        }
        QuantityChange::Removed => say(format!("{} removed", product.name))?,
        QuantityChange::Unchanged => say(format!("{} is not in the cart", product.name))?,
    }

    if !args.offline
        && let Ok(quantity) = u32::try_from(args.quantity)
        && quantity > 0
    {
        context.cart.push_add(&product, quantity).await;

        if let Some(error) = context.cart.snapshot().error() {
            say(format!("server not updated: {error}"))?;
        }
    }

    Ok(())
}

async fn find_product(context: &AppContext, key: &str) -> Result<Product, String> {
    if let Some(item) = context
        .cart
        .snapshot()
        .items()
        .iter()
        .find(|item| item.product.matches(key))
    {
        return Ok(item.product.clone());
    }

    context.catalog.fetch_products().await;

    if let Some(error) = context.catalog.error() {
        return Err(error);
    }

    context
        .catalog
        .find(key)
        .ok_or_else(|| format!("no product with id or slug {key}"))
}

fn show(context: &AppContext) -> Result<(), String> {
    let cart = context.cart.snapshot();
    let mut out = Vec::new();

    Receipt::for_cart(&cart)
        .write_to(&mut out)
        .map_err(|error| error.to_string())?;

    say(String::from_utf8_lossy(&out).trim_end())
}
