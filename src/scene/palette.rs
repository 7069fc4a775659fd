//! Topic colors.
//!
//! Each declared topic lane gets an evenly stepped hue at fixed
//! saturation/lightness, so colors are stable across reloads as long as the
//! lane order is. Topics missing from the metadata get a one-off random hue.

use std::collections::HashMap;

use rand::Rng;

use crate::config::SceneConfig;
use crate::data::TopicLane;

/// Linear RGB color, 0.0–1.0 per channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        const INV_255: f32 = 1.0 / 255.0;
        Self {
            r: ((hex >> 16) & 0xff) as f32 * INV_255,
            g: ((hex >> 8) & 0xff) as f32 * INV_255,
            b: (hex & 0xff) as f32 * INV_255,
        }
    }

    /// HSL with every component in 0.0–1.0; hue wraps.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            return Self::new(l, l, l);
        }
        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self {
            r: hue_to_rgb(p, q, h + 1.0 / 3.0),
            g: hue_to_rgb(p, q, h),
            b: hue_to_rgb(p, q, h - 1.0 / 3.0),
        }
    }

    /// Componentwise sum, saturating at 1.0
    pub fn add(self, other: Self) -> Self {
        Self {
            r: (self.r + other.r).min(1.0),
            g: (self.g + other.g).min(1.0),
            b: (self.b + other.b).min(1.0),
        }
    }

    pub fn scale(self, k: f32) -> Self {
        Self {
            r: (self.r * k).clamp(0.0, 1.0),
            g: (self.g * k).clamp(0.0, 1.0),
            b: (self.b * k).clamp(0.0, 1.0),
        }
    }

    pub fn is_black(self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    pub fn to_rgba8(self, alpha: f32) -> [u8; 4] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Topic → base color table, built once per scene generation
#[derive(Debug, Clone, Default)]
pub struct TopicPalette {
    colors: HashMap<String, Color>,
    fallback_saturation: f32,
    fallback_lightness: f32,
}

impl TopicPalette {
    pub fn new(topics: &[TopicLane], cfg: &SceneConfig) -> Self {
        let colors = topics
            .iter()
            .enumerate()
            .map(|(idx, lane)| {
                let hue = (idx as f32 * cfg.hue_step).rem_euclid(1.0);
                (
                    lane.topic.clone(),
                    Color::from_hsl(hue, cfg.topic_saturation, cfg.topic_lightness),
                )
            })
            .collect();
        Self {
            colors,
            fallback_saturation: cfg.fallback_saturation,
            fallback_lightness: cfg.fallback_lightness,
        }
    }

    pub fn get(&self, topic: &str) -> Option<Color> {
        self.colors.get(topic).copied()
    }

    /// Declared color, or a fresh random hue for an undeclared topic.
    pub fn color_for<R: Rng + ?Sized>(&self, topic: &str, rng: &mut R) -> Color {
        match self.get(topic) {
            Some(c) => c,
            None => {
                log::warn!("Topic {topic:?} is not declared in metadata; using a random hue");
                Color::from_hsl(rng.gen::<f32>(), self.fallback_saturation, self.fallback_lightness)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
