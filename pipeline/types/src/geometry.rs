/*!
    Output geometry resolution and letterbox math.
*/

use crate::PixelFormat;

/**
    Requested output geometry for a frame pipeline.

    A zero width or height means "derive from the source aspect ratio"; both
    zero means "use the source dimensions". Resolution happens exactly once,
    before the filter graph is built and before any frame is retrieved.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetGeometry {
    /// Requested width in pixels (0 = derive from source).
    pub width: u32,
    /// Requested height in pixels (0 = derive from source).
    pub height: u32,
    /// Requested pixel format.
    pub format: PixelFormat,
    /// Preserve the source aspect ratio by letterboxing instead of stretching.
    pub keep_aspect_ratio: bool,
}

impl TargetGeometry {
    /**
        Create a target geometry with explicit dimensions.
    */
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            keep_aspect_ratio: false,
        }
    }

    /**
        Create a target geometry that keeps the source dimensions.
    */
    pub fn native(format: PixelFormat) -> Self {
        Self::new(0, 0, format)
    }

    /**
        Enable aspect-ratio-preserving letterboxing.
    */
    pub fn with_keep_aspect_ratio(mut self) -> Self {
        self.keep_aspect_ratio = true;
        self
    }

    /**
        Resolve this geometry against the source dimensions.

        Missing (zero) dimensions are derived from the source aspect ratio.

        # Panics

        Panics if the source dimensions are zero.
    */
    pub fn resolve(&self, src_width: u32, src_height: u32) -> ResolvedGeometry {
        assert!(
            src_width > 0 && src_height > 0,
            "source dimensions must be nonzero"
        );
        let (width, height) = match (self.width, self.height) {
            (0, 0) => (src_width, src_height),
            (0, h) => (src_width * h / src_height, h),
            (w, 0) => (w, src_height * w / src_width),
            (w, h) => (w, h),
        };
        ResolvedGeometry {
            width,
            height,
            format: self.format,
        }
    }
}

/**
    Fully-resolved output geometry: both dimensions known and nonzero.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedGeometry {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl ResolvedGeometry {
    /**
        Compute the letterbox content rectangle for a source of the given
        dimensions.

        Returns `Some` when the source and target aspect ratios differ by
        more than 1%: the source content is scaled to fit inside the target
        and centered, with symmetric black margins on one axis. Returns
        `None` when the ratios already match within tolerance (a plain
        scale is distortion-free).
    */
    pub fn letterbox(&self, src_width: u32, src_height: u32) -> Option<Letterbox> {
        let src_ar = src_width as f64 / src_height as f64;
        let dst_ar = self.width as f64 / self.height as f64;
        if (src_ar - dst_ar).abs() <= 0.01 {
            return None;
        }
        if src_width as u64 * self.height as u64 > self.width as u64 * src_height as u64 {
            // Source is wider: vertical margins.
            let content_height = self.width * src_height / src_width;
            Some(Letterbox {
                width: self.width,
                height: content_height,
                x: 0,
                y: (self.height - content_height) / 2,
            })
        } else {
            // Source is taller: horizontal margins.
            let content_width = self.height * src_width / src_height;
            Some(Letterbox {
                width: content_width,
                height: self.height,
                x: (self.width - content_width) / 2,
                y: 0,
            })
        }
    }
}

/**
    A letterbox content rectangle: where scaled source content lands inside
    the target frame. The remaining area is padded black.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Letterbox {
    /// Scaled content width.
    pub width: u32,
    /// Scaled content height.
    pub height: u32,
    /// Horizontal offset of the content inside the target frame.
    pub x: u32,
    /// Vertical offset of the content inside the target frame.
    pub y: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_both_zero_uses_source() {
        let g = TargetGeometry::native(PixelFormat::Rgb24).resolve(640, 480);
        assert_eq!((g.width, g.height), (640, 480));
        assert_eq!(g.format, PixelFormat::Rgb24);
    }

    #[test]
    fn resolve_derives_width_from_aspect_ratio() {
        let target = TargetGeometry::new(0, 240, PixelFormat::Rgb24);
        let g = target.resolve(640, 480);
        assert_eq!((g.width, g.height), (320, 240));
    }

    #[test]
    fn resolve_derives_height_from_aspect_ratio() {
        let target = TargetGeometry::new(320, 0, PixelFormat::Rgb24);
        let g = target.resolve(640, 480);
        assert_eq!((g.width, g.height), (320, 240));
    }

    #[test]
    fn resolve_keeps_explicit_dimensions() {
        let target = TargetGeometry::new(224, 224, PixelFormat::Rgb24);
        let g = target.resolve(1920, 1080);
        assert_eq!((g.width, g.height), (224, 224));
    }

    #[test]
    #[should_panic(expected = "source dimensions must be nonzero")]
    fn resolve_zero_source_panics() {
        TargetGeometry::native(PixelFormat::Rgb24).resolve(0, 480);
    }

    #[test]
    fn letterbox_none_when_ratios_match() {
        let g = ResolvedGeometry {
            width: 320,
            height: 240,
            format: PixelFormat::Rgb24,
        };
        assert_eq!(g.letterbox(640, 480), None);
    }

    #[test]
    fn letterbox_wide_source_gets_vertical_margins() {
        // 16:9 source into a square target.
        let g = ResolvedGeometry {
            width: 224,
            height: 224,
            format: PixelFormat::Rgb24,
        };
        let lb = g.letterbox(1920, 1080).unwrap();
        assert_eq!(lb.width, 224);
        assert_eq!(lb.x, 0);
        assert!(lb.height < 224);
        // Symmetric within a pixel: top margin == y, bottom margin is the rest.
        let bottom = 224 - lb.height - lb.y;
        assert!(lb.y.abs_diff(bottom) <= 1);
    }

    #[test]
    fn letterbox_tall_source_gets_horizontal_margins() {
        let g = ResolvedGeometry {
            width: 224,
            height: 224,
            format: PixelFormat::Rgb24,
        };
        let lb = g.letterbox(1080, 1920).unwrap();
        assert_eq!(lb.height, 224);
        assert_eq!(lb.y, 0);
        let right = 224 - lb.width - lb.x;
        assert!(lb.x.abs_diff(right) <= 1);
    }

    #[test]
    fn letterbox_tolerance_boundary() {
        // 1.008:1 vs 1:1 is within the 1% tolerance; 1.2:1 is not.
        let g = ResolvedGeometry {
            width: 1000,
            height: 1000,
            format: PixelFormat::Gray8,
        };
        assert_eq!(g.letterbox(1008, 1000), None);
        assert!(g.letterbox(1200, 1000).is_some());
    }

    #[test]
    fn letterbox_content_fits_inside_target() {
        let g = ResolvedGeometry {
            width: 100,
            height: 80,
            format: PixelFormat::Gray8,
        };
        let lb = g.letterbox(400, 100).unwrap();
        assert!(lb.x + lb.width <= 100);
        assert!(lb.y + lb.height <= 80);
    }
}
