use std::fmt;

/// Share of the original color kept when a piece is locked into the grid.
pub const LOCK_SATURATION: f64 = 0.5;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`. Anything else yields `None`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Perceptual gray used as the blend target when desaturating.
    pub fn luma(&self) -> f64 {
        0.41 * f64::from(self.r) + 0.51 * f64::from(self.g) + 0.08 * f64::from(self.b)
    }

    /// Blends every channel toward [`Rgb::luma`], keeping `sat` of the original.
    pub fn saturate(&self, sat: f64) -> Self {
        let gray = self.luma() * (1.0 - sat);
        let blend = |c: u8| (f64::from(c) * sat + gray).round().clamp(0.0, 255.0) as u8;
        Self::new(blend(self.r), blend(self.g), blend(self.b))
    }

    /// The duller shade written into the grid when a piece locks.
    pub fn locked(&self) -> Self {
        self.saturate(LOCK_SATURATION)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
