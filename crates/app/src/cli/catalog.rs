use clap::Args;
use sabzi::{
    money::format_amount,
    pricing::{resolve_image, resolve_original_price, resolve_price},
};
use sabzi_app::context::AppContext;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use super::say;

#[derive(Debug, Args)]
pub(crate) struct CatalogArgs {
    /// Only show products whose name contains this text
    #[arg(long)]
    search: Option<String>,

    /// Include image URLs
    #[arg(long)]
    images: bool,
}

pub(crate) async fn run(context: &AppContext, args: CatalogArgs) -> Result<(), String> {
    context.catalog.fetch_products().await;

    if let Some(error) = context.catalog.error() {
        return Err(error);
    }

    let needle = args.search.map(|search| search.to_lowercase());

    let products: Vec<_> = context
        .catalog
        .products()
        .into_iter()
        .filter(|product| {
            needle
                .as_deref()
                .is_none_or(|needle| product.name.to_lowercase().contains(needle))
        })
        .collect();

    if products.is_empty() {
        return say("no products found");
    }

    let mut builder = Builder::default();
    let mut header = vec!["Id", "Name", "Price", "Was", "Stock"];

    if args.images {
        header.push("Image");
    }

    builder.push_record(header);

    for product in &products {
        let mut row = vec![
            product.slug.clone().unwrap_or_else(|| product.id.to_string()),
            product.name.clone(),
            format_amount(resolve_price(product)),
            resolve_original_price(product)
                .map(format_amount)
                .unwrap_or_default(),
            if product.is_purchasable() {
                product.available_stock().to_string()
            } else {
                "sold out".to_string()
            },
        ];

        if args.images {
            row.push(resolve_image(product, &context.asset_origin));
        }

        builder.push_record(row);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..5), Alignment::right());

    say(table)
}
