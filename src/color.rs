// src/color.rs

use indexmap::IndexMap;
use palette::{FromColor, Lch, Srgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub type Color = Srgb<u8>;

/// Fill for marks inside the brush.
pub const SELECTED: Color = Srgb::new(0xff, 0x6b, 0x6b);

const NIGHT: Color = Srgb::new(0x4b, 0x74, 0xff);
const DAY: Color = Srgb::new(0xff, 0xba, 0x42);

/// Blue-to-orange color for an hour of the day in `[0, 24]`.
pub fn hour_color(hour_frac: f64) -> Color {
    let t = (hour_frac / 24.0).clamp(0.0, 1.0) as f32;
    Srgb::new(
        lerp(NIGHT.red, DAY.red, t),
        lerp(NIGHT.green, DAY.green, t),
        lerp(NIGHT.blue, DAY.blue, t),
    )
}

fn lerp(from: u8, to: u8, t: f32) -> u8 {
    (from as f32 + (to as f32 - from as f32) * t).round() as u8
}

pub fn to_hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

const TABLEAU10: [Color; 10] = [
    Srgb::new(0x4e, 0x79, 0xa7),
    Srgb::new(0xf2, 0x8e, 0x2c),
    Srgb::new(0xe1, 0x57, 0x59),
    Srgb::new(0x76, 0xb7, 0xb2),
    Srgb::new(0x59, 0xa1, 0x4f),
    Srgb::new(0xed, 0xc9, 0x49),
    Srgb::new(0xaf, 0x7a, 0xa1),
    Srgb::new(0xff, 0x9d, 0xa7),
    Srgb::new(0x9c, 0x75, 0x5f),
    Srgb::new(0xba, 0xb0, 0xab),
];

/// Categorical colors for language tags.
///
/// A tag keeps the color it was first given for the lifetime of the palette,
/// even when later domains no longer contain it. The first ten tags take the
/// Tableau 10 scheme; any further tags get seeded random hues.
#[derive(Debug, Clone)]
pub struct CategoricalPalette {
    assigned: IndexMap<String, Color>,
    rng: StdRng,
}

impl Default for CategoricalPalette {
    fn default() -> Self {
        Self {
            assigned: IndexMap::new(),
            rng: StdRng::seed_from_u64(42),
        }
    }
}

impl CategoricalPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure every tag in `domain` has a color.
    pub fn extend<'a, I: IntoIterator<Item = &'a str>>(&mut self, domain: I) {
        for tag in domain {
            if self.assigned.contains_key(tag) {
                continue;
            }
            let color = match TABLEAU10.get(self.assigned.len()) {
                Some(&c) => c,
                None => self.random_color(),
            };
            self.assigned.insert(tag.to_string(), color);
        }
    }

    pub fn color(&self, tag: &str) -> Option<Color> {
        self.assigned.get(tag).copied()
    }

    fn random_color(&mut self) -> Color {
        let hue = self.rng.gen_range(0.0f32..360.0f32);
        let color = Lch::new(70.0f32, 80.0f32, hue);
        let srgb: Srgb<f32> = Srgb::from_color(color);
        let (r, g, b) = srgb.into_components();
        Srgb::new(
            (r.clamp(0.0, 1.0) * 255.0) as u8,
            (g.clamp(0.0, 1.0) * 255.0) as u8,
            (b.clamp(0.0, 1.0) * 255.0) as u8,
        )
    }
}
