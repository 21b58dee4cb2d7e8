//! Detection backend output

use super::{Point, Quad};

/// Candidate barcode regions reported by a detection backend
///
/// Regions are stored as quads, so the flattened corner list is always a
/// multiple of four. `payloads` and `types` are index-aligned with the
/// regions but may be shorter: a region past the end of either list, or with
/// an empty type, was located but not decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    regions: Vec<Quad>,
    payloads: Vec<String>,
    types: Vec<String>,
}

impl DetectionResult {
    /// Empty result (nothing located)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a result from raw backend output
    pub fn from_parts(regions: Vec<Quad>, payloads: Vec<String>, types: Vec<String>) -> Self {
        Self {
            regions,
            payloads,
            types,
        }
    }

    /// Build a result from a flat corner list, four corners per region.
    ///
    /// Returns `None` when the corner count is not a multiple of four.
    pub fn from_corners(
        corners: &[Point],
        payloads: Vec<String>,
        types: Vec<String>,
    ) -> Option<Self> {
        if corners.len() % 4 != 0 {
            return None;
        }
        let regions = corners
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        Some(Self::from_parts(regions, payloads, types))
    }

    /// Add a region that was located and decoded
    pub fn push_decoded(&mut self, quad: Quad, payload: impl Into<String>, kind: impl Into<String>) {
        // Keep payload/type aligned with any located-only regions before this one
        self.payloads.resize(self.regions.len(), String::new());
        self.types.resize(self.regions.len(), String::new());
        self.regions.push(quad);
        self.payloads.push(payload.into());
        self.types.push(kind.into());
    }

    /// Add a region that was located but not decoded
    pub fn push_located(&mut self, quad: Quad) {
        self.regions.push(quad);
    }

    /// Number of located regions
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// True when no region was located
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Located regions in detection order
    pub fn regions(&self) -> &[Quad] {
        &self.regions
    }

    /// Payload and symbology for region `idx` if it was decoded
    pub fn decoded(&self, idx: usize) -> Option<(&str, &str)> {
        let payload = self.payloads.get(idx)?;
        let kind = self.types.get(idx)?;
        if kind.is_empty() {
            return None;
        }
        Some((payload.as_str(), kind.as_str()))
    }
}
