//! Product record

/// Product metadata stored against a barcode number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    /// Symbology label, e.g. `EAN13`
    pub barcode_type: String,
    /// Barcode number (record key)
    pub barcode_number: String,
    /// Product name
    pub product_name: String,
    /// Free-form product description
    pub product_description: String,
}

impl ProductInfo {
    /// Symbology label written for records created from a scan
    pub const EAN13: &'static str = "EAN13";

    /// Create a record for an EAN-13 barcode
    pub fn ean13(
        barcode_number: impl Into<String>,
        product_name: impl Into<String>,
        product_description: impl Into<String>,
    ) -> Self {
        Self {
            barcode_type: Self::EAN13.to_string(),
            barcode_number: barcode_number.into(),
            product_name: product_name.into(),
            product_description: product_description.into(),
        }
    }
}
