//! Product records and payload normalization.

mod error;
mod normalize;
mod record;

pub use error::NormalizeError;
pub use normalize::{
    DEFAULT_BRAND, DEFAULT_CURRENCY, DEFAULT_PRODUCT_URL_BASE, NormalizeOptions, Normalizer,
    availability, dedup_features, format_price, merge_colors,
};
pub use record::{
    COLUMN_COUNT, COLUMN_HEADERS, IN_STOCK, LIST_SEPARATOR, OUT_OF_STOCK, ProductRecord,
    RATING_PLACEHOLDER, Ratings,
};

#[cfg(test)]
pub(crate) use record::sample_record;
