// src/utils/geometry.rs

type Pixel = [f64; 2];

/// Euclidean distance between two pixel positions
pub fn pixel_distance(p1: Pixel, p2: Pixel) -> f64 {
    let dx = p1[0] - p2[0];
    let dy = p1[1] - p2[1];
    (dx * dx + dy * dy).sqrt()
}

/// A detector image shown scaled inside a window region.
///
/// The image is stretched to the view, so x and y scale independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub view_width: f64,
    pub view_height: f64,
    pub image_width: f64,
    pub image_height: f64,
}

impl Viewport {
    fn scale(&self) -> (f64, f64) {
        (self.view_width / self.image_width, self.view_height / self.image_height)
    }

    /// Window point -> detector pixel. Each axis is unscaled on its own.
    pub fn window_to_detector(&self, window: Pixel) -> Pixel {
        let (sx, sy) = self.scale();
        [window[0] / sx, window[1] / sy]
    }

    /// Detector pixel -> window point
    pub fn detector_to_window(&self, detector: Pixel) -> Pixel {
        let (sx, sy) = self.scale();
        [detector[0] * sx, detector[1] * sy]
    }
}
