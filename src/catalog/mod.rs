//! In-memory product catalog standing in for the database.

pub mod types;

pub use types::{Product, ProductDetail};

/// The fixed product listing.
pub fn list_products() -> Vec<Product> {
    vec![
        Product::new(1, "Laptop", 999),
        Product::new(2, "Mouse", 25),
        Product::new(3, "Keyboard", 75),
    ]
}

/// Synthesize the product for `id`: `Product {id}` priced at `100 * id`.
pub fn product_by_id(id: u64) -> Product {
    Product::new(id, format!("Product {}", id), id.saturating_mul(100))
}
