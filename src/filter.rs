//! Title search over a catalog snapshot

use crate::data::Product;

/// Returns the products whose title contains `term`, ignoring case
///
/// The result keeps catalog order. An empty term matches every product
/// and a term that matches nothing yields an empty list.
pub fn filter_products<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let needle = term.to_lowercase();
    products
        .iter()
        .filter(|product| product.title.to_lowercase().contains(&needle))
        .collect()
}
