//! True-color RGB pixels and channel math.

/// True-color RGB pixel.
///
/// Uses 3 bytes for 24-bit color depth. LED panels take the channels
/// as-is; the terminal preview emits them as ANSI true-color.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black (0, 0, 0)
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Cyan (0, 255, 255), the signature accent color
    pub const CYAN: Self = Self::new(0, 255, 255);

    /// Create from a 24-bit hex color (e.g., 0x00FFFF).
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    /// True if all channels are zero.
    #[inline]
    pub const fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// Per-channel maximum ("lighter wins").
    ///
    /// Bright overlay pixels show through a black background without
    /// alpha blending; black overlay regions leave `self` untouched.
    #[inline]
    pub const fn lighten(self, other: Self) -> Self {
        Self::new(
            if self.r > other.r { self.r } else { other.r },
            if self.g > other.g { self.g } else { other.g },
            if self.b > other.b { self.b } else { other.b },
        )
    }

    /// Linear interpolation from `self` toward `other`.
    ///
    /// Bit-exact at the endpoints: `t = 0.0` returns `self`, `t = 1.0`
    /// returns `other`. Values outside [0, 1] are clamped.
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let tt = ((t.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
        let it = 255 - tt;
        Self::new(
            mul_div255(u16::from(self.r), it).saturating_add(mul_div255(u16::from(other.r), tt)),
            mul_div255(u16::from(self.g), it).saturating_add(mul_div255(u16::from(other.g), tt)),
            mul_div255(u16::from(self.b), it).saturating_add(mul_div255(u16::from(other.b), tt)),
        )
    }

    /// Multiply all channels by `factor`, clamped to [0, 255].
    #[inline]
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |c: u8| -> u8 {
            let v = f32::from(c) * factor;
            v.clamp(0.0, 255.0).round() as u8
        };
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Rounded `x * y / 255` in u8 range.
#[inline]
fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

/// Convert HSV to RGB.
///
/// `h` is in degrees (wrapped into [0, 360)), `s` and `v` in [0, 1].
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    let sector = (h / 60.0) as u32 % 6;
    let f = h / 60.0 - (h / 60.0).floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let u = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector {
        0 => (v, u, p),
        1 => (q, v, p),
        2 => (p, v, u),
        3 => (p, q, v),
        4 => (u, p, v),
        _ => (v, p, q),
    };

    let to_u8 = |c: f32| (c * 255.0).clamp(0.0, 255.0).round() as u8;
    Rgb::new(to_u8(r), to_u8(g), to_u8(b))
}

/// Decompose an RGB pixel into (hue, saturation, value).
///
/// Hue is in degrees [0, 360), saturation and value in [0, 1]. Black
/// and grey pixels (zero chroma) report hue 0.
pub fn rgb_to_hsv(color: Rgb) -> (f32, f32, f32) {
    let r = f32::from(color.r) / 255.0;
    let g = f32::from(color.g) / 255.0;
    let b = f32::from(color.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let hue = if delta <= f32::EPSILON {
        0.0
    } else if (max - r).abs() <= f32::EPSILON {
        60.0 * ((g - b) / delta)
    } else if (max - g).abs() <= f32::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let saturation = if max <= f32::EPSILON { 0.0 } else { delta / max };

    (hue.rem_euclid(360.0), saturation, max)
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<u32> for Rgb {
    /// Convert from a 24-bit hex color (e.g., 0x00FFFF)
    #[inline]
    fn from(hex: u32) -> Self {
        Self::from_u32(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_tuple() {
        let rgb: Rgb = (255, 128, 0).into();
        assert_eq!(rgb.r, 255);
        assert_eq!(rgb.g, 128);
        assert_eq!(rgb.b, 0);
    }

    #[test]
    fn test_rgb_from_hex() {
        let rgb: Rgb = 0xFF8000.into();
        assert_eq!(rgb, Rgb::new(255, 128, 0));
    }

    #[test]
    fn test_lighten_per_channel() {
        let a = Rgb::new(100, 0, 0);
        let b = Rgb::new(0, 50, 0);
        assert_eq!(a.lighten(b), Rgb::new(100, 50, 0));
        assert_eq!(b.lighten(a), Rgb::new(100, 50, 0));
    }

    #[test]
    fn test_lerp_endpoints_exact() {
        let a = Rgb::new(13, 200, 255);
        let b = Rgb::new(240, 1, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        // Out-of-range t clamps
        assert_eq!(a.lerp(b, -2.0), a);
        assert_eq!(a.lerp(b, 7.5), b);
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(255, 255, 255);
        let mid = a.lerp(b, 0.5);
        assert!(mid.r >= 127 && mid.r <= 128);
    }

    #[test]
    fn test_scaled_clamps() {
        assert_eq!(Rgb::new(200, 10, 0).scaled(0.5), Rgb::new(100, 5, 0));
        assert_eq!(Rgb::new(200, 200, 200).scaled(2.0), Rgb::WHITE);
        assert_eq!(Rgb::new(9, 9, 9).scaled(0.0), Rgb::BLACK);
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), Rgb::new(0, 0, 255));
        // Hue wraps
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), hsv_to_rgb(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_hsv_round_trip() {
        for h in [0.0_f32, 60.0, 120.0, 180.0, 240.0, 300.0] {
            let rgb = hsv_to_rgb(h, 1.0, 1.0);
            let (hue, s, v) = rgb_to_hsv(rgb);
            assert!((hue - h).abs() < 2.0, "hue {h} drifted to {hue}");
            assert!(s > 0.99 && v > 0.99);
        }
        let (h, s, v) = rgb_to_hsv(Rgb::new(128, 128, 128));
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert!((v - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", Rgb::new(0, 255, 128)), "#00ff80");
    }
}
