//! Cart Demo
//!
//! Walks the full storefront flow against a file-backed cart: load (or
//! seed) the cart, watch the badge count react to mutations, apply a
//! promotion code and print the checkout summary.
//!
//! Use `-s` to point at a cart record file (state survives between runs)
//! Use `-p` to apply a promotion code (try `DEV10`, `STUDENT15` or `SAVE5`)

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use rusty_money::iso;

use trolley::{
    cart::ItemKind,
    catalog::RawCatalogEntry,
    checkout::CheckoutQuote,
    pricing,
    promotions::{PromotionValidator, StaticCodeValidator},
    store::{CartStore, JsonFileRepository},
};

const API_BASE: &str = "http://127.0.0.1:5000";

/// Arguments for the cart demo
#[derive(Debug, Parser)]
struct Args {
    /// Path of the durable cart record
    #[clap(short, long, default_value = "target/cart.json")]
    store: PathBuf,

    /// Promotion code to apply at checkout
    #[clap(short, long)]
    promo: Option<String>,
}

fn seed_entries() -> Result<Vec<RawCatalogEntry>> {
    // Stand-in for a GET /api/products response.
    let raw = serde_json::json!([
        {
            "id": 1,
            "name": "Widget",
            "price": 10.0,
            "image_url": "/uploads/widget.jpg"
        },
        {
            "id": 2,
            "name": "Gadget",
            "price": 5.0,
            "discount_price": 4.0,
            "gallery": ["/uploads/gadget.jpg"]
        }
    ]);

    Ok(serde_json::from_value(raw)?)
}

/// Cart Demo
#[expect(clippy::print_stdout, reason = "Demo binary")]
pub fn main() -> Result<()> {
    let args = Args::parse();

    let mut store = CartStore::open(JsonFileRepository::new(&args.store));
    let _badge = store.subscribe(|count| println!("badge: {count} item(s) in cart"));

    if store.cart().is_empty() {
        for entry in seed_entries()? {
            let entry = entry.normalize(API_BASE);
            if entry.is_purchasable() {
                store.add(entry.to_line(ItemKind::Product, 1))?;
            }
        }
        // Merge a repeat add of the first item onto its existing line.
        if let Some(line) = store.cart().lines().first().cloned() {
            store.increment(&line.id, line.kind)?;
        }
    }

    let subtotal = pricing::subtotal(store.cart());

    let promotion = match args.promo.as_deref() {
        Some(code) => match StaticCodeValidator::default().validate(code, subtotal) {
            Ok(promo) => Some(promo),
            Err(rejection) => {
                println!("promo rejected: {rejection}");
                None
            }
        },
        None => None,
    };

    println!();
    let quote = CheckoutQuote::new(store.cart(), promotion);
    quote.write_to(io::stdout().lock(), iso::EUR)?;

    Ok(())
}
