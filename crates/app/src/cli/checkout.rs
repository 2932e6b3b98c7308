use clap::Args;
use sabzi::{
    checkout::{Address, PaymentMethod},
    money::format_amount,
    receipt::Receipt,
};
use sabzi_app::{checkout::CheckoutOutcome, context::AppContext};

use super::{delivery, say};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Postal code to deliver to; defaults to the saved one
    #[arg(long)]
    zip_code: Option<String>,

    /// Recipient name; defaults to the saved address
    #[arg(long, requires = "street")]
    name: Option<String>,

    /// Street address; defaults to the saved address
    #[arg(long, requires = "name")]
    street: Option<String>,

    /// Payment method: COD, UPI or WALLET
    #[arg(long, default_value_t = PaymentMethod::Cod)]
    payment: PaymentMethod,
}

pub(crate) async fn run(context: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    let zip_code = args
        .zip_code
        .or_else(|| context.delivery.snapshot().zip_code().map(ToString::to_string))
        .ok_or("no postal code; pass --zip-code or run `delivery check` first")?;

    context.delivery.check_serviceability(&zip_code).await;
    delivery::report(&context.delivery.snapshot())?;

    let address = match (args.name, args.street) {
        (Some(name), Some(street)) => Address::new(name, street),
        _ => context
            .checkout
            .default_address()
            .await
            .ok_or("no saved address; pass --name and --street")?,
    };

    let total = Receipt::for_cart(&context.cart.snapshot())
        .charges()
        .grand_total;

    match context
        .checkout
        .place_order(&address, args.payment)
        .await
        .map_err(|error| error.to_string())?
    {
        CheckoutOutcome::Placed { order_id } => say(format!(
            "order {order_id} placed: {} by {}",
            format_amount(total),
            args.payment
        )),
        CheckoutOutcome::VerificationRequired => {
            say("phone verification required; verify your number and try again")
        }
    }
}
