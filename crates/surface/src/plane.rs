/// Single-channel `f32` raster in equirectangular layout.
///
/// Row 0 is the northernmost row, column 0 is longitude −180°. Horizontal
/// neighbours wrap around the antimeridian; vertical neighbours clamp at the
/// poles.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Plane {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0.0)
    }

    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Builds a plane from raw samples. `None` if the length does not match.
    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Option<Self> {
        (data.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let i = self.index(x, y);
        self.data[i] = value;
    }

    /// Sample with horizontal wrap and vertical clamp.
    pub fn get_wrapped(&self, x: i64, y: i64) -> f32 {
        let w = self.width as i64;
        let h = self.height as i64;
        let xi = x.rem_euclid(w);
        let yi = y.clamp(0, h - 1);
        self.data[(yi * w + xi) as usize]
    }

    pub fn row(&self, y: u32) -> &[f32] {
        let start = self.index(0, y);
        &self.data[start..start + self.width as usize]
    }

    /// Maps every sample to `1.0` if it is strictly above `threshold`,
    /// otherwise `0.0`.
    pub fn threshold(&mut self, threshold: f32) {
        for v in &mut self.data {
            *v = if *v > threshold { 1.0 } else { 0.0 };
        }
    }

    /// Quantizes `[0, 1]` samples to bytes.
    pub fn to_u8(&self) -> Vec<u8> {
        self.data.iter().map(|v| unit_to_u8(*v)).collect()
    }

    /// Fraction of the raster (by pixel count) at or above `0.5`.
    pub fn coverage(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let land = self.data.iter().filter(|v| **v >= 0.5).count();
        land as f64 / self.data.len() as f64
    }
}

pub fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::Plane;

    #[test]
    fn wrapped_sampling() {
        let mut p = Plane::new(4, 2);
        p.set(3, 0, 1.0);
        assert_eq!(p.get_wrapped(-1, 0), 1.0);
        assert_eq!(p.get_wrapped(7, -5), 1.0);
        assert_eq!(p.get_wrapped(3, 9), 0.0);
    }

    #[test]
    fn threshold_is_strict() {
        let mut p = Plane::from_vec(3, 1, vec![0.2, 0.5, 0.8]).unwrap();
        p.threshold(0.5);
        assert_eq!(p.data(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Plane::from_vec(2, 2, vec![0.0; 3]).is_none());
    }
}
