use serde::{Deserialize, Serialize};

use super::coerce::{deserialize_some, CoercedDecimal, CoercedInt, ImageUrls};

/// Body of `POST /api/admin/products`. Unknown keys are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to 0 when absent.
    #[serde(default)]
    pub price: Option<CoercedDecimal>,
    /// Defaults to 0 when absent.
    #[serde(default)]
    pub stock: Option<CoercedInt>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_urls: Option<ImageUrls>,
}

/// Body of `PUT /api/admin/products/:id`.
///
/// Each field is applied only when its key is present. For the nullable
/// columns an explicit `null` clears the value, so those fields carry a
/// nested `Option`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub price: Option<CoercedDecimal>,
    #[serde(default)]
    pub stock: Option<CoercedInt>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub image_urls: Option<Option<ImageUrls>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.image_urls.is_none()
    }
}

/// Response of a successful product creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreated {
    pub message: String,
    pub id: i32,
}
