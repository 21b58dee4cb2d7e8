pub mod detection;
pub mod outcome;
pub mod point;
pub mod product;

pub use detection::DetectionResult;
pub use outcome::{BarcodeReadOutcome, SharpenStrength};
pub use point::{Point, Quad};
pub use product::ProductInfo;
