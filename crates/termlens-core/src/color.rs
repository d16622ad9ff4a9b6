//! Color types for the screen cache
//!
//! The cache stores the engine's palette verbatim so downstream consumers
//! can resolve indexed colors without asking the engine again.

use serde::{Deserialize, Serialize};

/// RGB color value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse from hex string like "#RRGGBB" or "RRGGBB"
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Ordered color table copied from the engine during a capture.
///
/// The table is opaque to the synchronization core: entries are copied
/// verbatim and indexed the way the engine indexes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rgb> {
        self.colors.iter()
    }
}

impl Default for Palette {
    /// Standard 256-entry table: 16 ANSI colors, the 6x6x6 color cube, and
    /// 24 grayscale steps.
    fn default() -> Self {
        let mut colors = Vec::with_capacity(256);

        const ANSI: [(u8, u8, u8); 16] = [
            (0, 0, 0),
            (205, 0, 0),
            (0, 205, 0),
            (205, 205, 0),
            (0, 0, 238),
            (205, 0, 205),
            (0, 205, 205),
            (229, 229, 229),
            (127, 127, 127),
            (255, 0, 0),
            (0, 255, 0),
            (255, 255, 0),
            (92, 92, 255),
            (255, 0, 255),
            (0, 255, 255),
            (255, 255, 255),
        ];
        for (r, g, b) in ANSI {
            colors.push(Rgb::new(r, g, b));
        }

        // 6x6x6 color cube (indices 16..232)
        let level = |c: u8| if c == 0 { 0 } else { 55 + 40 * c };
        for r in 0..6 {
            for g in 0..6 {
                for b in 0..6 {
                    colors.push(Rgb::new(level(r), level(g), level(b)));
                }
            }
        }

        // Grayscale ramp (indices 232..256)
        for i in 0..24 {
            let v = 8 + 10 * i;
            colors.push(Rgb::new(v, v, v));
        }

        Self { colors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_roundtrip() {
        let color = Rgb::from_hex("#1a2b3c").unwrap();
        assert_eq!(color, Rgb::new(0x1a, 0x2b, 0x3c));
        assert_eq!(color.to_hex(), "#1a2b3c");

        assert_eq!(Rgb::from_hex("ff0000"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::from_hex("#ff00"), None);
    }

    #[test]
    fn test_default_palette_layout() {
        let palette = Palette::default();
        assert_eq!(palette.len(), 256);
        assert_eq!(palette.iter().count(), 256);

        // Cube corner: index 16 is black, index 231 is white
        assert_eq!(palette.get(16), Some(Rgb::new(0, 0, 0)));
        assert_eq!(palette.get(231), Some(Rgb::new(255, 255, 255)));

        // Grayscale ramp endpoints
        assert_eq!(palette.get(232), Some(Rgb::new(8, 8, 8)));
        assert_eq!(palette.get(255), Some(Rgb::new(238, 238, 238)));
    }
}
