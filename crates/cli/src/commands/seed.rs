//! Seed the catalog from a YAML file.
//!
//! The file is a list of products in the same shape the create endpoint
//! accepts:
//!
//! ```yaml
//! - name: Widget
//!   description: A widget
//!   price: 9.99
//!   stock: 10
//! ```
//!
//! Every entry is validated before the database is touched, so a bad file
//! inserts nothing.

use std::path::Path;

use tracing::info;

use ecommerce_api::db::{self, ProductRepository};
use ecommerce_api::models::NewProduct;

use super::database_url;

/// Insert every product in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, an entry fails
/// validation, or an insert fails.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let products = parse_products(&content)?;
    info!(count = products.len(), "Parsed products");

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url, 1).await?;
    let repo = ProductRepository::new(&pool);

    for product in &products {
        let created = repo.create(product).await?;
        info!(id = %created.id, name = %created.name, "Inserted product");
    }

    info!(inserted = products.len(), "Seeding complete");
    Ok(())
}

fn parse_products(content: &str) -> Result<Vec<NewProduct>, Box<dyn std::error::Error>> {
    let raw: Vec<NewProduct> = serde_yaml::from_str(content)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, product)| {
            product
                .validate()
                .map_err(|e| Box::<dyn std::error::Error>::from(format!("product #{}: {e}", index + 1)))
        })
        .collect()
}
