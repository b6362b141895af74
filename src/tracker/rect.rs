/// Axis-aligned bounding box in normalized image coordinates (0..1 per axis).
///
/// Stored in TLWH form (top-left x, top-left y, width, height). A TLBR
/// conversion is provided since OCR engines commonly report corner pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Get the area of the bounding box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Euclidean distance between the centers of two boxes.
    #[inline]
    pub fn center_distance(&self, other: &Rect) -> f32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }

    /// Linear interpolation toward `target` by factor `alpha` (0 = frozen,
    /// 1 = jump to target), applied per component.
    pub fn lerp(&self, target: &Rect, alpha: f32) -> Rect {
        let a = alpha.clamp(0.0, 1.0);
        Rect {
            x: self.x + (target.x - self.x) * a,
            y: self.y + (target.y - self.y) * a,
            width: self.width + (target.width - self.width) * a,
            height: self.height + (target.height - self.height) * a,
        }
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    pub fn iou(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_conversions() {
        let rect = Rect::new(0.1, 0.2, 0.3, 0.4);
        assert_eq!(rect.to_tlwh(), [0.1, 0.2, 0.3, 0.4]);

        let [x1, y1, x2, y2] = rect.to_tlbr();
        assert!((x1 - 0.1).abs() < 1e-6);
        assert!((y1 - 0.2).abs() < 1e-6);
        assert!((x2 - 0.4).abs() < 1e-6);
        assert!((y2 - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_from_tlbr() {
        let rect = Rect::from_tlbr(0.1, 0.2, 0.4, 0.6);
        let [x, y, w, h] = rect.to_tlwh();
        assert!((x - 0.1).abs() < 1e-6);
        assert!((y - 0.2).abs() < 1e-6);
        assert!((w - 0.3).abs() < 1e-6);
        assert!((h - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_center_distance() {
        let a = Rect::new(0.0, 0.0, 0.2, 0.2);
        let b = Rect::new(0.3, 0.4, 0.2, 0.2);
        // Centers: (0.1, 0.1) and (0.4, 0.5) -> distance 0.5
        assert!((a.center_distance(&b) - 0.5).abs() < 1e-6);
        assert_eq!(a.center_distance(&a), 0.0);
    }

    #[test]
    fn test_lerp() {
        let a = Rect::new(0.0, 0.0, 0.2, 0.1);
        let b = Rect::new(0.1, 0.1, 0.2, 0.1);

        let mid = a.lerp(&b, 0.5);
        assert!((mid.x - 0.05).abs() < 1e-6);
        assert!((mid.y - 0.05).abs() < 1e-6);
        assert!((mid.width - 0.2).abs() < 1e-6);

        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_iou() {
        let a = Rect::new(0.0, 0.0, 0.1, 0.1);
        let b = Rect::new(0.05, 0.05, 0.1, 0.1);

        // Intersection 0.05 x 0.05, union 0.01 + 0.01 - 0.0025
        let iou = a.iou(&b);
        assert!((iou - 0.0025 / 0.0175).abs() < 1e-6);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = Rect::new(0.0, 0.0, 0.1, 0.1);
        let b = Rect::new(0.5, 0.5, 0.1, 0.1);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_same_box() {
        let a = Rect::new(0.2, 0.2, 0.1, 0.1);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }
}
