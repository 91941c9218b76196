/// Display color of a segment, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Converts a packed `0xAARRGGBB` value, dropping alpha.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_argb(argb: u32) -> Self {
        let channel = |shift: u32| f32::from(((argb >> shift) & 0xff) as u8) / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }
}
