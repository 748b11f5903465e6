//! Mapping from the raw product API payload to [`ProductRecord`].
//!
//! Every payload field is optional; JSON `null` is treated like an absent
//! field. Only unparseable JSON (or a field of the wrong type) fails. Image
//! and size entries without a value stay in place as empty strings.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, instrument, trace};

use super::error::NormalizeError;
use super::record::{IN_STOCK, OUT_OF_STOCK, ProductRecord, Ratings};

/// Default host for canonical product page URLs.
pub const DEFAULT_PRODUCT_URL_BASE: &str = "https://shop.adidas.jp";

/// Default currency label appended to prices.
pub const DEFAULT_CURRENCY: &str = "JPY";

/// Default brand constant.
pub const DEFAULT_BRAND: &str = "Adidas";

/// Fixed values the payload does not carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Host used to build `<base>/products/<id>`.
    pub product_url_base: String,
    /// Suffix for the rounded price.
    pub currency: String,
    /// Brand written to every record.
    pub brand: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            product_url_base: DEFAULT_PRODUCT_URL_BASE.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            brand: DEFAULT_BRAND.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawProduct {
    id: Option<String>,
    name: Option<String>,
    product_listing_assets: Option<Vec<RawAsset>>,
    attribute_list: Option<RawAttributes>,
    pricing_information: Option<RawPricing>,
    product_description: Option<RawDescription>,
    variation_list: Option<Vec<RawVariation>>,
    product_link_list: Option<Vec<RawProductLink>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAsset {
    image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAttributes {
    color: Option<String>,
    category: Option<String>,
    functions: Option<Vec<String>>,
    productfit: Option<Vec<String>>,
    base_material: Option<Vec<String>>,
    is_orderable: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPricing {
    #[serde(rename = "currentPrice")]
    current_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDescription {
    text: Option<String>,
    usps: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVariation {
    size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProductLink {
    search_color: Option<String>,
}

/// Turns raw API bodies into records.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    /// Creates a normalizer with explicit options.
    #[must_use]
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Parses `body` fetched for `identifier` and builds the record.
    ///
    /// The record's id comes from the payload; the requested identifier is
    /// used when the payload omits it.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Parse`] if `body` is not a JSON object of the
    /// expected shape.
    #[instrument(skip(self, body), fields(bytes = body.len()))]
    pub fn normalize(&self, identifier: &str, body: &[u8]) -> Result<ProductRecord, NormalizeError> {
        trace!(raw = %String::from_utf8_lossy(body), "raw product JSON");
        let raw: RawProduct =
            serde_json::from_slice(body).map_err(|e| NormalizeError::parse(identifier, e))?;
        let record = self.build(identifier, raw);
        debug!(
            id = %record.id,
            name = %record.name,
            price = %record.price,
            sizes = record.sizes.len(),
            colors = record.colors.len(),
            features = record.features.len(),
            availability = %record.availability,
            "normalized product"
        );
        Ok(record)
    }

    fn build(&self, identifier: &str, raw: RawProduct) -> ProductRecord {
        let id = raw
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| identifier.to_string());
        let attributes = raw.attribute_list.unwrap_or_default();
        let description = raw.product_description.unwrap_or_default();
        let price = raw
            .pricing_information
            .and_then(|p| p.current_price)
            .unwrap_or_default();

        let images = raw
            .product_listing_assets
            .unwrap_or_default()
            .into_iter()
            .map(|asset| asset.image_url.unwrap_or_default())
            .collect();
        let sizes = raw
            .variation_list
            .unwrap_or_default()
            .into_iter()
            .map(|variation| variation.size.unwrap_or_default())
            .collect();
        let primary_color = attributes.color.unwrap_or_default();
        let search_colors: Vec<String> = raw
            .product_link_list
            .unwrap_or_default()
            .into_iter()
            .filter_map(|link| link.search_color)
            .collect();
        let colors = merge_colors(primary_color, search_colors);
        let features = dedup_features([
            attributes.functions.unwrap_or_default(),
            attributes.productfit.unwrap_or_default(),
            attributes.base_material.unwrap_or_default(),
            description.usps.unwrap_or_default(),
        ]);

        ProductRecord {
            url: format!(
                "{}/products/{id}",
                self.options.product_url_base.trim_end_matches('/')
            ),
            id,
            name: raw.name.unwrap_or_default(),
            price: format_price(price, &self.options.currency),
            description: description.text.unwrap_or_default(),
            images,
            sizes,
            colors,
            availability: availability(attributes.is_orderable.unwrap_or(false)).to_string(),
            brand: self.options.brand.clone(),
            category: attributes.category.unwrap_or_default(),
            features,
            ratings: Ratings::default(),
        }
    }
}

/// Rounds to zero decimals (ties to even) and appends the currency label.
#[must_use]
pub fn format_price(price: f64, currency: &str) -> String {
    format!("{price:.0} {currency}")
}

/// Maps the orderability flag to one of the two availability labels.
#[must_use]
pub fn availability(is_orderable: bool) -> &'static str {
    if is_orderable { IN_STOCK } else { OUT_OF_STOCK }
}

/// Primary color first, then every non-empty search color that differs from it.
///
/// Repeats among the search colors are kept as they come.
#[must_use]
pub fn merge_colors(primary: String, search_colors: Vec<String>) -> Vec<String> {
    let mut colors = Vec::with_capacity(search_colors.len() + 1);
    let tail: Vec<String> = search_colors
        .into_iter()
        .filter(|color| !color.is_empty() && *color != primary)
        .collect();
    colors.push(primary);
    colors.extend(tail);
    colors
}

/// Concatenates the feature sub-lists in order, keeping the first occurrence of each entry.
#[must_use]
pub fn dedup_features<I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .flatten()
        .filter(|feature| seen.insert(feature.clone()))
        .collect()
}
