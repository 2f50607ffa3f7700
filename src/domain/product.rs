use bigdecimal::BigDecimal;
use uuid::Uuid;

/// Catalog-side view of a product, as exposed to the order engine.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub price: BigDecimal,
    pub discount_price: Option<BigDecimal>,
    pub stock_quantity: i32,
    pub low_stock_threshold: i32,
    pub is_active: bool,
}

/// Derives a URL-safe slug from a display name: lowercase ASCII
/// alphanumerics with single dashes between words. Used when a category or
/// product is created without an explicit slug; the result is immutable
/// afterwards.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn lowercases_and_dashes_words() {
        assert_eq!(slugify("Wireless Mouse"), "wireless-mouse");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("USB-C  /  2.0 Hub!"), "usb-c-2-0-hub");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  Gift Card  "), "gift-card");
    }

    #[test]
    fn drops_non_ascii() {
        assert_eq!(slugify("Café Crème 250g"), "caf-cr-me-250g");
    }
}
