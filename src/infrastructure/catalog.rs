use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogStore;
use crate::domain::product::ProductView;
use crate::models::product::Product;
use crate::schema::products;

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        ProductView {
            id: p.id,
            name: p.name,
            sku: p.sku,
            price: p.price,
            discount_price: p.discount_price,
            stock_quantity: p.stock_quantity,
            low_stock_threshold: p.low_stock_threshold,
            is_active: p.is_active,
        }
    }
}

pub struct DieselCatalogStore {
    pool: DbPool,
}

impl DieselCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogStore for DieselCatalogStore {
    fn get_product(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .filter(products::id.eq(id))
            .select(Product::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(ProductView::from))
    }

    fn adjust_stock(&self, product_id: Uuid, delta: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        apply_stock_adjustment(&mut conn, product_id, delta)
    }
}

/// Applies `stock_quantity += delta` as one guarded UPDATE, so the stock
/// check and the write cannot interleave with a concurrent adjustment of
/// the same row. Zero rows updated means the guard rejected the delta or
/// the product does not exist; the follow-up read disambiguates.
///
/// Takes a bare connection so the order engine can run it inside its own
/// transaction.
pub fn apply_stock_adjustment(
    conn: &mut PgConnection,
    product_id: Uuid,
    delta: i32,
) -> Result<(), DomainError> {
    let updated = diesel::update(
        products::table
            .filter(products::id.eq(product_id))
            .filter((products::stock_quantity + delta).ge(0)),
    )
    .set(products::stock_quantity.eq(products::stock_quantity + delta))
    .execute(conn)?;

    if updated == 1 {
        return Ok(());
    }

    let current = products::table
        .filter(products::id.eq(product_id))
        .select((products::name, products::stock_quantity))
        .first::<(String, i32)>(conn)
        .optional()?;
    match current {
        None => Err(DomainError::NotFound),
        Some((product, available)) => Err(DomainError::InsufficientStock { product, available }),
    }
}
