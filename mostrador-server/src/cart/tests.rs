use super::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn product(id: i64, price: f64, stock: i64) -> Product {
    Product {
        id,
        name: format!("Producto {id}"),
        description: None,
        category_id: None,
        legacy_category: None,
        sale_price: price,
        cost_price: price / 2.0,
        stock,
        min_stock: 0,
        is_active: true,
        created_at: 0,
        updated_at: 0,
    }
}

#[test]
fn test_discount_applied_to_subtotal() {
    let mut cart = Cart::new();
    cart.add_product(&product(1, 25.50, 10)).unwrap();
    assert_eq!(cart.set_quantity(1, 3).unwrap(), 3);
    cart.set_discount(10.0).unwrap();

    assert_eq!(cart.subtotal(), 76.50);
    assert_eq!(cart.total(), 66.50);
}

#[test]
fn test_discount_above_subtotal_floors_at_zero() {
    let mut cart = Cart::new();
    cart.add_product(&product(1, 50.0, 10)).unwrap();
    cart.set_discount(100.0).unwrap();

    assert_eq!(cart.subtotal(), 50.0);
    assert_eq!(cart.total(), 0.0);
}

#[test]
fn test_invalid_discount_rejected() {
    let mut cart = Cart::new();
    cart.add_product(&product(1, 50.0, 10)).unwrap();
    cart.set_discount(5.0).unwrap();

    assert_eq!(cart.set_discount(-1.0), Err(CartError::InvalidDiscount(-1.0)));
    assert!(matches!(
        cart.set_discount(f64::NAN),
        Err(CartError::InvalidDiscount(_))
    ));
    assert_eq!(cart.discount(), 5.0);
    assert_eq!(cart.total(), 45.0);
}

#[test]
fn test_repeated_add_increments_capped_at_stock() {
    let mut cart = Cart::new();
    let p = product(1, 10.0, 2);
    cart.add_product(&p).unwrap();
    cart.add_product(&p).unwrap();
    cart.add_product(&p).unwrap();

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.line(1).unwrap().quantity, 2);
    assert_eq!(cart.subtotal(), 20.0);
}

#[test]
fn test_set_quantity_clamps() {
    let mut cart = Cart::new();
    cart.add_product(&product(1, 10.0, 4)).unwrap();

    assert_eq!(cart.set_quantity(1, 99).unwrap(), 4);
    assert_eq!(cart.set_quantity(1, 0).unwrap(), 1);
    assert_eq!(cart.set_quantity(1, -5).unwrap(), 1);
    assert_eq!(cart.set_quantity(2, 1), Err(CartError::LineNotFound(2)));
}

#[test]
fn test_inactive_and_out_of_stock_rejected() {
    let mut cart = Cart::new();
    let mut inactive = product(1, 10.0, 4);
    inactive.is_active = false;

    assert!(matches!(
        cart.add_product(&inactive),
        Err(CartError::ProductInactive(_))
    ));
    assert!(matches!(
        cart.add_product(&product(2, 10.0, 0)),
        Err(CartError::OutOfStock(_))
    ));
    assert!(cart.is_empty());
}

#[test]
fn test_remove_line() {
    let mut cart = Cart::new();
    cart.add_product(&product(1, 10.0, 4)).unwrap();
    cart.add_product(&product(2, 5.0, 4)).unwrap();
    cart.remove(1).unwrap();

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.total(), 5.0);
    assert_eq!(cart.remove(1), Err(CartError::LineNotFound(1)));
}

#[test]
fn test_submit_guard_blocks_reentry() {
    let mut cart = Cart::new();
    cart.add_product(&product(1, 10.0, 4)).unwrap();

    let guard = cart.try_begin_submit().unwrap();
    assert!(cart.is_submitting());
    assert!(matches!(
        cart.try_begin_submit(),
        Err(CartError::SubmissionInProgress)
    ));

    drop(guard);
    assert!(!cart.is_submitting());
    assert!(cart.try_begin_submit().is_ok());
}

#[test]
fn test_cloned_cart_has_own_submit_state() {
    let mut cart = Cart::new();
    cart.add_product(&product(1, 10.0, 4)).unwrap();
    cart.set_discount(2.0).unwrap();

    let _guard = cart.try_begin_submit().unwrap();
    let copy = cart.clone();
    assert!(cart.is_submitting());
    assert!(!copy.is_submitting());
    assert_eq!(copy.lines(), cart.lines());
    assert_eq!(copy.total(), 8.0);

    let copy_guard = copy.try_begin_submit().unwrap();
    drop(copy_guard);
    assert!(cart.is_submitting());
}

#[test]
fn test_to_sale_snapshot() {
    let mut cart = Cart::new();
    assert_eq!(
        cart.to_sale(SaleStatus::Completed, 1).unwrap_err(),
        CartError::Empty
    );

    cart.add_product(&product(7, 25.50, 10)).unwrap();
    cart.set_quantity(7, 3).unwrap();
    cart.set_discount(10.0).unwrap();
    cart.customer_name = Some("Mostrador".into());

    let sale = cart.to_sale(SaleStatus::Pending, 1_700_000_000_000).unwrap();
    assert_eq!(sale.id, 0);
    assert_eq!(sale.lines.len(), 1);
    assert_eq!(sale.lines[0].product_id, Some(7));
    assert_eq!(sale.lines[0].subtotal, 76.50);
    assert_eq!(sale.total, 66.50);
    assert_eq!(sale.status, SaleStatus::Pending);
    assert_eq!(sale.customer_name.as_deref(), Some("Mostrador"));
}

#[test]
fn test_cart_error_codes() {
    let err: AppError = CartError::SubmissionInProgress.into();
    assert_eq!(err.code, ErrorCode::SaleSubmissionInProgress);
    let err: AppError = CartError::OutOfStock("Yerba".into()).into();
    assert_eq!(err.code, ErrorCode::ProductOutOfStock);
}

/// Random add / set / remove / discount sequences keep the totals and
/// quantity bounds consistent.
#[test]
fn test_random_operation_sequences_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let catalog: Vec<Product> = (1..=6)
        .map(|id| product(id, f64::from(rng.gen_range(0..5000u32)) / 100.0, rng.gen_range(1..8)))
        .collect();

    for _ in 0..200 {
        let mut cart = Cart::new();
        for _ in 0..40 {
            let p = &catalog[rng.gen_range(0..catalog.len())];
            match rng.gen_range(0..4) {
                0 => cart.add_product(p).unwrap(),
                1 => {
                    let _ = cart.set_quantity(p.id, rng.gen_range(-3..12));
                }
                2 => {
                    let _ = cart.remove(p.id);
                }
                _ => cart
                    .set_discount(f64::from(rng.gen_range(0..20000u32)) / 100.0)
                    .unwrap(),
            }

            let expected_subtotal =
                money::sum(cart.lines().iter().map(|l| money::line_total(l.quantity, l.unit_price)));
            assert_eq!(cart.subtotal(), expected_subtotal);
            assert_eq!(
                cart.total(),
                money::discounted_total(expected_subtotal, cart.discount())
            );
            assert!(cart.total() >= 0.0);
            for line in cart.lines() {
                assert!(line.quantity >= 1);
                assert!(line.quantity <= line.available_stock);
            }
        }
    }
}
