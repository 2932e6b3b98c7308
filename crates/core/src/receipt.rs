//! Receipt

use std::io;

use rust_decimal::Decimal;
use tabled::{
    Table,
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartItem},
    checkout::Charges,
    money::format_amount,
    pricing::{resolve_original_price, resolve_price},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable summary of a cart and its checkout charges.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    items: &'a [CartItem],
    coupon_code: Option<&'a str>,
    charges: Charges,
}

impl<'a> Receipt<'a> {
    /// Build a receipt for the current state of `cart`.
    pub fn for_cart(cart: &'a Cart) -> Self {
        Self {
            items: cart.items(),
            coupon_code: cart.coupon_code(),
            charges: Charges::for_cart(cart),
        }
    }

    /// Charges shown under the item table.
    pub fn charges(&self) -> Charges {
        self.charges
    }

    /// Writes the item table and the charge summary to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if `out` cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.items.is_empty() {
            return writeln!(out, "\nYour cart is empty.\n").map_err(|_err| ReceiptError::IO);
        }

        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Was", "Line Total"]);

        for (index, item) in self.items.iter().enumerate() {
            builder.push_record(item_row(index, item));
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..6), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;
        writeln!(out, "{}\n", self.summary_table()).map_err(|_err| ReceiptError::IO)
    }

    fn summary_table(&self) -> Table {
        let charges = &self.charges;
        let mut builder = Builder::default();

        builder.push_record(["Subtotal:".to_string(), format_amount(charges.subtotal)]);

        if let Some(code) = self.coupon_code {
            builder.push_record([
                format!("Coupon {code}:"),
                format!("-{}", format_amount(charges.discount)),
            ]);
        }

        builder.push_record([
            "Delivery:".to_string(),
            fee_display(charges.delivery_fee),
        ]);
        builder.push_record([
            "Handling:".to_string(),
            format_amount(charges.handling_fee),
        ]);
        builder.push_record(["Total:".to_string(), format_amount(charges.grand_total)]);

        let mut table = builder.build();

        table.with(Style::blank());
        table.modify(Columns::new(..), Alignment::right());
        table.modify(Rows::last(), Color::BOLD);

        table
    }
}

fn item_row(index: usize, item: &CartItem) -> [String; 6] {
    let was = resolve_original_price(&item.product)
        .map(format_amount)
        .unwrap_or_default();

    [
        format!("#{}", index + 1),
        item.product.name.clone(),
        item.quantity.to_string(),
        format_amount(resolve_price(&item.product)),
        was,
        format_amount(item.line_total()),
    ]
}

fn fee_display(fee: Decimal) -> String {
    if fee.is_zero() {
        "FREE".to_string()
    } else {
        format_amount(fee)
    }
}
