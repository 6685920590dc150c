use runtime::HostSize;

/// Upper bound on the device pixel ratio used for the backing store.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Host element size in CSS pixels plus the resulting backing-store size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub css: HostSize,
    pub pixel_ratio: f64,
    pub physical_width: u32,
    pub physical_height: u32,
}

impl Viewport {
    pub fn new(css: HostSize, device_pixel_ratio: f64) -> Self {
        let pixel_ratio = clamp_pixel_ratio(device_pixel_ratio);
        let px = |v: f64| ((v * pixel_ratio).round() as u32).max(1);
        Self {
            css,
            pixel_ratio,
            physical_width: px(css.width),
            physical_height: px(css.height),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.css.aspect()
    }
}

/// `min(dpr, 2)`, with `1` for unusable values.
pub fn clamp_pixel_ratio(device_pixel_ratio: f64) -> f64 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Viewport, clamp_pixel_ratio};
    use runtime::HostSize;

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(clamp_pixel_ratio(3.0), 2.0);
        assert_eq!(clamp_pixel_ratio(1.5), 1.5);
        assert_eq!(clamp_pixel_ratio(0.0), 1.0);
        assert_eq!(clamp_pixel_ratio(f64::NAN), 1.0);
    }

    #[test]
    fn backing_store_scales_css_size() {
        let v = Viewport::new(HostSize::new(420.0, 300.0), 3.0);
        assert_eq!((v.physical_width, v.physical_height), (840, 600));
        assert!((v.aspect() - 1.4).abs() < 1e-12);
    }
}
