//! Trait for text recognition (OCR) backends.

use crate::tracker::Detection;

/// Trait for per-frame text recognition backends.
///
/// Implement this trait to connect any OCR engine to the tracker.
///
/// # Example
///
/// ```ignore
/// use textrack_rs::{TextSource, Detection};
///
/// struct MyOcrEngine {
///     // Your engine here
/// }
///
/// impl TextSource for MyOcrEngine {
///     type Error = std::io::Error;
///
///     fn recognize(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run recognition and return per-frame detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait TextSource {
    /// Error type for recognition failures.
    type Error;

    /// Run recognition on raw frame data and return text detections with
    /// normalized bounding boxes.
    fn recognize(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Helper trait for converting engine-specific outputs to `Detection`.
pub trait IntoDetections {
    /// Convert the output into a vector of detections.
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}
