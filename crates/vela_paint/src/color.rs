//! Paint colors

/// Unit-range RGBA color
///
/// Drawing calls pair a color with a separate 0-255 alpha (the context's
/// paint alpha), so most colors here are opaque and `a` only matters for
/// gradient stops and recorded snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Color from 0-255 channels
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        let unit = |v: u8| f32::from(v) / 255.0;
        Self::new(unit(r), unit(g), unit(b), unit(a))
    }

    /// Color from `0xRRGGBB`, or `0xRRGGBBAA` when the value needs four bytes
    pub fn from_hex(hex: u32) -> Self {
        let [hi, b1, b2, lo] = hex.to_be_bytes();
        if hex > 0x00FF_FFFF {
            Self::from_rgba8(hi, b1, b2, lo)
        } else {
            Self::from_rgba8(b1, b2, lo, 255)
        }
    }

    /// Opaque color from a packed 0xRRGGBB value; any high byte is ignored
    pub fn from_rgb_u32(rgb: u32) -> Self {
        Self::from_hex(rgb & 0x00FF_FFFF)
    }

    /// Same color with `alpha` as its own alpha channel
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { a: alpha, ..self }
    }

    /// Packed 0xRRGGBB value (alpha dropped)
    pub fn to_rgb_u32(&self) -> u32 {
        let [r, g, b, _] = self.to_rgba8();
        (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }

    /// Packed 0xAARRGGBB value with an explicit 0-255 alpha
    pub fn to_argb_u32(&self, alpha: u8) -> u32 {
        (u32::from(alpha) << 24) | self.to_rgb_u32()
    }

    /// Channels rounded to 0-255, in RGBA order
    pub fn to_rgba8(&self) -> [u8; 4] {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }
}
