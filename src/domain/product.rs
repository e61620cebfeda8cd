//! Product catalog for the wizard
//!
//! The wizard sells exactly four products. Each maps to a fixed
//! variant/product/placement triple in the fulfillment catalog. The table is
//! not user-editable; changing it is a code change.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Products offered by the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Tshirt,
    Mug,
    Canvas,
    Tote,
}

/// Fixed fulfillment identifiers for a product
///
/// `product_id` addresses the catalog product, `variant_id` the concrete
/// size/color sold by the wizard, and `placement` the print area the artwork
/// is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacementSpec {
    pub product_id: i64,
    pub variant_id: i64,
    pub placement: &'static str,
}

impl ProductKind {
    /// All products, in wizard display order
    pub const ALL: [ProductKind; 4] = [
        ProductKind::Tshirt,
        ProductKind::Mug,
        ProductKind::Canvas,
        ProductKind::Tote,
    ];

    /// Look up the fixed fulfillment triple for this product
    pub const fn placement_spec(&self) -> PlacementSpec {
        match self {
            ProductKind::Tshirt => PlacementSpec {
                product_id: 71,
                variant_id: 4012,
                placement: "front",
            },
            ProductKind::Mug => PlacementSpec {
                product_id: 19,
                variant_id: 1320,
                placement: "default",
            },
            ProductKind::Canvas => PlacementSpec {
                product_id: 29,
                variant_id: 823,
                placement: "default",
            },
            ProductKind::Tote => PlacementSpec {
                product_id: 367,
                variant_id: 10457,
                placement: "default",
            },
        }
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductKind::Tshirt => write!(f, "tshirt"),
            ProductKind::Mug => write!(f, "mug"),
            ProductKind::Canvas => write!(f, "canvas"),
            ProductKind::Tote => write!(f, "tote"),
        }
    }
}
