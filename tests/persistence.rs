//! Durable cart record behaviour across store instances.

use rust_decimal::Decimal;
use testresult::TestResult;

use trolley::prelude::*;

fn line(id: i64, name: &str, price: Decimal, qty: u32) -> CartLine {
    CartLine {
        id: LineId::from(id),
        kind: ItemKind::Product,
        name: name.to_owned(),
        price,
        discount_price: None,
        image_url: None,
        qty,
    }
}

#[test]
fn a_fresh_store_survives_a_restart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cart.json");

    {
        let mut store = CartStore::open(JsonFileRepository::new(&path));
        store.add(line(1, "Widget", Decimal::new(10_00, 2), 2))?;
        store.add(line(2, "Gadget", Decimal::new(5_00, 2), 1))?;
    }

    let store = CartStore::open(JsonFileRepository::new(&path));

    assert_eq!(store.cart().len(), 2);
    assert_eq!(store.cart().total_item_count(), 3);
    assert_eq!(subtotal(store.cart()), Decimal::new(25_00, 2));

    Ok(())
}

#[test]
fn add_clear_add_persists_only_the_second_item() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cart.json");

    {
        let mut store = CartStore::open(JsonFileRepository::new(&path));
        store.add(line(1, "First", Decimal::new(1_00, 2), 1))?;
        store.clear()?;
        store.add(line(2, "Second", Decimal::new(2_00, 2), 1))?;
    }

    let store = CartStore::open(JsonFileRepository::new(&path));

    assert_eq!(store.cart().len(), 1);
    assert!(
        store
            .cart()
            .find(&LineId::from(2), ItemKind::Product)
            .is_some(),
        "only the post-clear line should survive"
    );
    assert!(
        store
            .cart()
            .find(&LineId::from(1), ItemKind::Product)
            .is_none(),
        "the cleared line must not resurface"
    );

    Ok(())
}

#[test]
fn legacy_flat_array_records_are_read_back() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cart.json");
    std::fs::write(
        &path,
        r#"[{ "id": 9, "kind": "product", "name": "Heirloom", "price": 12.5, "qty": 2 }]"#,
    )?;

    let store = CartStore::open(JsonFileRepository::new(&path));

    assert_eq!(store.cart().total_item_count(), 2);
    let heirloom = store
        .cart()
        .find(&LineId::from(9), ItemKind::Product)
        .expect("legacy line");
    assert_eq!(heirloom.price, Decimal::new(12_50, 2));

    Ok(())
}

#[test]
fn corrupt_records_recover_as_an_empty_cart() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cart.json");
    std::fs::write(&path, "length: 13 inches")?;

    let store = CartStore::open(JsonFileRepository::new(&path));

    assert!(store.cart().is_empty());

    Ok(())
}

#[test]
fn last_writer_wins_between_two_stores() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cart.json");

    let mut first = CartStore::open(JsonFileRepository::new(&path));
    let mut second = CartStore::open(JsonFileRepository::new(&path));

    first.add(line(1, "Widget", Decimal::new(10_00, 2), 1))?;
    second.add(line(2, "Gadget", Decimal::new(5_00, 2), 1))?;

    // The second store never saw the first one's write; its record replaced
    // it wholesale. A reload makes the loss visible.
    let reloaded = first.reload();
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.find(&LineId::from(2), ItemKind::Product).is_some());
    assert!(reloaded.find(&LineId::from(1), ItemKind::Product).is_none());

    Ok(())
}

#[test]
fn quantities_merge_across_restarts_too() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("cart.json");

    {
        let mut store = CartStore::open(JsonFileRepository::new(&path));
        store.add(line(1, "Widget", Decimal::new(10_00, 2), 2))?;
    }

    let mut store = CartStore::open(JsonFileRepository::new(&path));
    store.add(line(1, "Widget", Decimal::new(10_00, 2), 3))?;

    assert_eq!(store.cart().len(), 1);
    assert_eq!(store.cart().total_item_count(), 5);

    Ok(())
}
