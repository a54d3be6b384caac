use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Used for reporters without a configured colour.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Parse a `#RRGGBB` hex string.
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

// ---------------------------------------------------------------------------
// Country colour mapping
// ---------------------------------------------------------------------------

/// Maps reporter names to chart colours: configured hex colours first,
/// generated hues for any remaining reporters.
#[derive(Debug, Clone, Default)]
pub struct CountryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CountryColors {
    /// Build the mapping for `countries` (display order) from the
    /// configured hex palette, filling gaps with generated hues.
    pub fn new(configured: &BTreeMap<String, String>, countries: &[String]) -> Self {
        let mut mapping = BTreeMap::new();
        let unconfigured: Vec<&String> = countries
            .iter()
            .filter(|c| !configured.contains_key(*c))
            .collect();
        let fallback = generate_palette(unconfigured.len());

        for country in countries {
            if let Some(color) = configured.get(country).and_then(|hex| parse_hex(hex)) {
                mapping.insert(country.clone(), color);
            }
        }
        for (country, color) in unconfigured.into_iter().zip(fallback) {
            mapping.insert(country.clone(), color);
        }

        CountryColors { mapping }
    }

    /// Colour for a reporter; grey for anything unknown.
    pub fn color_for(&self, country: &str) -> Color32 {
        self.mapping.get(country).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Continuous ramps
// ---------------------------------------------------------------------------

fn lerp_anchors(anchors: &[Color32], t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let scaled = t * (anchors.len() - 1) as f32;
    let lo = (scaled.floor() as usize).min(anchors.len() - 2);
    let frac = scaled - lo as f32;

    let to_lin = |c: Color32| -> LinSrgb {
        Srgb::new(
            c.r() as f32 / 255.0,
            c.g() as f32 / 255.0,
            c.b() as f32 / 255.0,
        )
        .into_linear()
    };
    let mixed: Srgb = Srgb::from_linear(to_lin(anchors[lo]).mix(to_lin(anchors[lo + 1]), frac));
    Color32::from_rgb(
        (mixed.red * 255.0) as u8,
        (mixed.green * 255.0) as u8,
        (mixed.blue * 255.0) as u8,
    )
}

/// Diverging red → yellow → green ramp for the trade-balance heatmap;
/// `t` in [0, 1] with 0.5 at a balanced cell.
pub fn balance_ramp(t: f64) -> Color32 {
    const ANCHORS: [Color32; 3] = [
        Color32::from_rgb(0xFF, 0x69, 0x61), // deficit
        Color32::from_rgb(0xFF, 0xFF, 0x99),
        Color32::from_rgb(0x77, 0xDD, 0x77), // surplus
    ];
    lerp_anchors(&ANCHORS, t)
}

/// Sequential yellow → orange → red ramp for the contribution view;
/// `t` in [0, 1].
pub fn contribution_ramp(t: f64) -> Color32 {
    const ANCHORS: [Color32; 3] = [
        Color32::from_rgb(0xFF, 0xFF, 0xCC),
        Color32::from_rgb(0xFD, 0x8D, 0x3C),
        Color32::from_rgb(0xB1, 0x00, 0x26),
    ];
    lerp_anchors(&ANCHORS, t)
}
