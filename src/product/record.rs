//! Canonical product record and its fixed column layout.

/// Value written to every rating column; the API never returns review data.
pub const RATING_PLACEHOLDER: &str = "N/A";

/// Availability label for orderable products.
pub const IN_STOCK: &str = "In Stock";

/// Availability label for everything else (flag false or absent).
pub const OUT_OF_STOCK: &str = "Out of Stock";

/// Separator for multi-valued fields inside one cell.
pub const LIST_SEPARATOR: &str = ",";

/// Number of output columns.
pub const COLUMN_COUNT: usize = 17;

/// Output columns, in order. Both sinks use this layout.
pub const COLUMN_HEADERS: [&str; COLUMN_COUNT] = [
    "ID",
    "URL",
    "Name",
    "Price",
    "Category",
    "Sizes",
    "Colors",
    "Availability",
    "Description",
    "Images",
    "Features",
    "Sense of Fitting Rating",
    "Length Appropriation Rating",
    "Material Quality Rating",
    "Comfort Rating",
    "Average Rating",
    "Review Count",
];

/// Review fields kept in the record even though they are never populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ratings {
    pub fitting: String,
    pub length: String,
    pub quality: String,
    pub comfort: String,
    pub average: String,
    pub review_count: String,
}

impl Default for Ratings {
    fn default() -> Self {
        Self {
            fitting: RATING_PLACEHOLDER.to_string(),
            length: RATING_PLACEHOLDER.to_string(),
            quality: RATING_PLACEHOLDER.to_string(),
            comfort: RATING_PLACEHOLDER.to_string(),
            average: RATING_PLACEHOLDER.to_string(),
            review_count: RATING_PLACEHOLDER.to_string(),
        }
    }
}

/// One normalized product, ready for the sinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: String,
    pub url: String,
    pub name: String,
    /// Rounded price with currency label, e.g. `"5990 JPY"`.
    pub price: String,
    pub description: String,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    /// Primary color first, then variant search colors other than the primary.
    pub colors: Vec<String>,
    pub availability: String,
    pub brand: String,
    pub category: String,
    /// De-duplicated, first occurrence wins.
    pub features: Vec<String>,
    pub ratings: Ratings,
}

impl ProductRecord {
    /// Cell values in [`COLUMN_HEADERS`] order; lists are comma-joined.
    #[must_use]
    pub fn to_row(&self) -> [String; COLUMN_COUNT] {
        [
            self.id.clone(),
            self.url.clone(),
            self.name.clone(),
            self.price.clone(),
            self.category.clone(),
            self.sizes.join(LIST_SEPARATOR),
            self.colors.join(LIST_SEPARATOR),
            self.availability.clone(),
            self.description.clone(),
            self.images.join(LIST_SEPARATOR),
            self.features.join(LIST_SEPARATOR),
            self.ratings.fitting.clone(),
            self.ratings.length.clone(),
            self.ratings.quality.clone(),
            self.ratings.comfort.clone(),
            self.ratings.average.clone(),
            self.ratings.review_count.clone(),
        ]
    }
}

#[cfg(test)]
pub(crate) fn sample_record(id: &str) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        url: format!("https://shop.example.com/products/{id}"),
        name: "Tee".to_string(),
        price: "5990 JPY".to_string(),
        description: "Soft cotton, \"relaxed\" fit".to_string(),
        images: vec!["https://img/1.jpg".to_string(), "https://img/2.jpg".to_string()],
        sizes: vec!["S".to_string(), "M".to_string()],
        colors: vec!["black".to_string(), "red".to_string()],
        availability: IN_STOCK.to_string(),
        brand: "Adidas".to_string(),
        category: "T-shirts".to_string(),
        features: vec!["breathable".to_string(), "regular fit".to_string()],
        ratings: Ratings::default(),
    }
}
