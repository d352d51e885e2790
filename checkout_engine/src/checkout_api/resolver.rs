use sce_common::Money;

use crate::{
    checkout_api::{
        checkout_objects::{BuyerProfile, OrderIntent, PurchaseContext},
        errors::IntentError,
    },
    db_types::{CartLine, OrderLine},
};

/// Build a frozen [`OrderIntent`] from the buyer's cart.
///
/// Pure computation: the cart lines are whatever snapshot the caller fetched, and nothing here reads or writes any
/// state. A single-product context selects the one matching cart line; a full-cart context takes every line. Both
/// produce a structurally identical intent.
///
/// The totals are recomputed from the lines (an upstream total is never trusted), which also makes them invariant
/// under reordering of the cart.
pub fn resolve(buyer: &BuyerProfile, cart: &[CartLine], context: &PurchaseContext) -> Result<OrderIntent, IntentError> {
    let selected: Vec<CartLine> = match context {
        PurchaseContext::FullCart => cart.to_vec(),
        PurchaseContext::SingleProduct(product_id) => {
            cart.iter().filter(|line| &line.product_id == product_id).cloned().collect()
        },
    };
    if selected.is_empty() {
        return Err(IntentError::EmptySelection);
    }
    let lines = selected.into_iter().map(validate_line).collect::<Result<Vec<OrderLine>, IntentError>>()?;
    let total_quantity = lines.iter().map(|line| line.quantity).sum();
    let total_price = lines.iter().map(OrderLine::line_total).sum();
    Ok(OrderIntent {
        buyer_id: buyer.buyer_id.clone(),
        shipping: buyer.shipping.clone(),
        lines,
        total_quantity,
        total_price,
    })
}

fn validate_line(line: CartLine) -> Result<OrderLine, IntentError> {
    if line.quantity <= 0 {
        return Err(IntentError::InvalidLine(format!(
            "product {} has non-positive quantity {}",
            line.product_id, line.quantity
        )));
    }
    if line.unit_cost < Money::default() {
        return Err(IntentError::InvalidLine(format!("product {} has a negative unit cost", line.product_id)));
    }
    if line.seller_id.trim().is_empty() {
        return Err(IntentError::InvalidLine(format!("product {} has no seller", line.product_id)));
    }
    if line.category.trim().is_empty() {
        return Err(IntentError::InvalidLine(format!("product {} has no category", line.product_id)));
    }
    Ok(OrderLine::from(line))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db_types::{ProductId, ShippingAddress};

    fn buyer() -> BuyerProfile {
        BuyerProfile::new("buyer-1", ShippingAddress { city: "Hanoi".to_string(), ..Default::default() })
    }

    fn line(product_id: &str, quantity: i64, unit_cost: i64) -> CartLine {
        CartLine {
            product_id: ProductId::from(product_id),
            product_name: format!("Product {product_id}"),
            quantity,
            unit_cost: Money::from_cents(unit_cost),
            seller_id: "seller-1".to_string(),
            category: "electronics".to_string(),
            subcategory: "audio".to_string(),
        }
    }

    #[test]
    fn totals_are_recomputed_from_lines() {
        let cart = vec![line("p1", 2, 1000), line("p2", 1, 500)];
        let intent = resolve(&buyer(), &cart, &PurchaseContext::FullCart).unwrap();
        assert_eq!(intent.total_quantity, 3);
        assert_eq!(intent.total_price, Money::from_cents(2500));
        assert_eq!(intent.lines.len(), 2);
        assert_eq!(intent.shipping.city, "Hanoi");
    }

    #[test]
    fn totals_are_invariant_under_reordering() {
        let cart = vec![line("p1", 2, 1000), line("p2", 1, 500), line("p3", 4, 250)];
        let mut reversed = cart.clone();
        reversed.reverse();
        let a = resolve(&buyer(), &cart, &PurchaseContext::FullCart).unwrap();
        let b = resolve(&buyer(), &reversed, &PurchaseContext::FullCart).unwrap();
        assert_eq!(a.total_price, b.total_price);
        assert_eq!(a.total_quantity, b.total_quantity);
    }

    #[test]
    fn empty_cart_is_an_empty_selection() {
        let err = resolve(&buyer(), &[], &PurchaseContext::FullCart).unwrap_err();
        assert_eq!(err, IntentError::EmptySelection);
    }

    #[test]
    fn missing_product_is_an_empty_selection() {
        let cart = vec![line("p1", 1, 1000)];
        let context = PurchaseContext::SingleProduct(ProductId::from("p2"));
        let err = resolve(&buyer(), &cart, &context).unwrap_err();
        assert_eq!(err, IntentError::EmptySelection);
    }

    #[test]
    fn single_product_context_selects_only_that_line() {
        let cart = vec![line("p1", 2, 1000), line("p2", 1, 2000)];
        let context = PurchaseContext::SingleProduct(ProductId::from("p2"));
        let intent = resolve(&buyer(), &cart, &context).unwrap();
        assert_eq!(intent.lines.len(), 1);
        assert_eq!(intent.lines[0].product_id, ProductId::from("p2"));
        assert_eq!(intent.total_price, Money::from_cents(2000));
        assert_eq!(intent.total_quantity, 1);
    }

    #[test]
    fn non_positive_quantity_is_an_invalid_line() {
        let cart = vec![line("p1", 0, 1000)];
        let err = resolve(&buyer(), &cart, &PurchaseContext::FullCart).unwrap_err();
        assert!(matches!(err, IntentError::InvalidLine(_)));
    }

    #[test]
    fn missing_seller_is_an_invalid_line() {
        let mut bad = line("p1", 1, 1000);
        bad.seller_id = " ".to_string();
        let err = resolve(&buyer(), &[bad], &PurchaseContext::FullCart).unwrap_err();
        assert!(matches!(err, IntentError::InvalidLine(_)));
    }

    #[test]
    fn missing_category_is_an_invalid_line() {
        let mut bad = line("p1", 1, 1000);
        bad.category = String::new();
        let err = resolve(&buyer(), &[bad], &PurchaseContext::FullCart).unwrap_err();
        assert!(matches!(err, IntentError::InvalidLine(_)));
    }
}
