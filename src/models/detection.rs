use serde::{Deserialize, Serialize};

/// One recognized text region, passed through from the extraction engine
/// unmodified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub text: String,

    /// Quadrilateral in image pixel space: top-left, top-right, bottom-right,
    /// bottom-left for axis-aligned sources.
    #[serde(rename = "box")]
    pub bounding_box: [[f64; 2]; 4],

    /// Recognition confidence in `[0, 1]`.
    pub confidence: f64,

    /// 1-based page number; always 1 for single-image input.
    pub page_number: u32,
}
