//! Palette colors and perceptual nearest-color classification.
//!
//! Colors are compared in CIELAB (D65 white point) with the CIEDE2000
//! color difference. Palettes are tiny (at most a handful of entries), so
//! classification is a brute-force scan.

use serde::{Deserialize, Serialize};

/// Integer RGB triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Round and clamp floating point channels.
    pub fn from_f64(rgb: [f64; 3]) -> Self {
        let q = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(q(rgb[0]), q(rgb[1]), q(rgb[2]))
    }

    pub fn to_lab(self) -> Lab {
        Lab::from_rgb8(self)
    }
}

/// A configured palette entry: `[r, g, b, a]`, alpha ignored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorRgba(pub [f64; 4]);

impl ColorRgba {
    pub fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self([r, g, b, 255.0])
    }

    pub fn to_rgb8(self) -> Rgb8 {
        Rgb8::from_f64([self.0[0], self.0[1], self.0[2]])
    }
}

/// CIELAB color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

const WHITE_D65: [f64; 3] = [95.047, 100.0, 108.883];

impl Lab {
    pub fn from_rgb8(c: Rgb8) -> Self {
        let lin = |v: u8| {
            let v = v as f64 / 255.0;
            let v = if v > 0.04045 {
                ((v + 0.055) / 1.055).powf(2.4)
            } else {
                v / 12.92
            };
            v * 100.0
        };
        let (r, g, b) = (lin(c.r), lin(c.g), lin(c.b));

        let x = r * 0.4124 + g * 0.3576 + b * 0.1805;
        let y = r * 0.2126 + g * 0.7152 + b * 0.0722;
        let z = r * 0.0193 + g * 0.1192 + b * 0.9505;

        let f = |t: f64| {
            if t > 0.008856 {
                t.cbrt()
            } else {
                7.787 * t + 16.0 / 116.0
            }
        };
        let fx = f(x / WHITE_D65[0]);
        let fy = f(y / WHITE_D65[1]);
        let fz = f(z / WHITE_D65[2]);

        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }
}

/// CIEDE2000 color difference with unit weighting factors.
pub fn ciede2000(c1: Lab, c2: Lab) -> f64 {
    const POW25_7: f64 = 6_103_515_625.0; // 25^7

    let c1_ab = c1.a.hypot(c1.b);
    let c2_ab = c2.a.hypot(c2.b);
    let c_bar = 0.5 * (c1_ab + c2_ab);
    let c_bar7 = c_bar.powi(7);
    let g = 0.5 * (1.0 - (c_bar7 / (c_bar7 + POW25_7)).sqrt());

    let a1p = (1.0 + g) * c1.a;
    let a2p = (1.0 + g) * c2.a;
    let c1p = a1p.hypot(c1.b);
    let c2p = a2p.hypot(c2.b);

    let hue = |b: f64, ap: f64| {
        if b == 0.0 && ap == 0.0 {
            0.0
        } else {
            b.atan2(ap).to_degrees().rem_euclid(360.0)
        }
    };
    let h1p = hue(c1.b, a1p);
    let h2p = hue(c2.b, a2p);

    let d_lp = c2.l - c1.l;
    let d_cp = c2p - c1p;

    let chroma_product = c1p * c2p;
    let d_hp = if chroma_product == 0.0 {
        0.0
    } else {
        let d = h2p - h1p;
        if d.abs() <= 180.0 {
            d
        } else if d > 180.0 {
            d - 360.0
        } else {
            d + 360.0
        }
    };
    let d_big_hp = 2.0 * chroma_product.sqrt() * (d_hp.to_radians() / 2.0).sin();

    let l_bar_p = 0.5 * (c1.l + c2.l);
    let c_bar_p = 0.5 * (c1p + c2p);
    let h_bar_p = if chroma_product == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        0.5 * (h1p + h2p)
    } else if h1p + h2p < 360.0 {
        0.5 * (h1p + h2p + 360.0)
    } else {
        0.5 * (h1p + h2p - 360.0)
    };

    let t = 1.0 - 0.17 * (h_bar_p - 30.0).to_radians().cos()
        + 0.24 * (2.0 * h_bar_p).to_radians().cos()
        + 0.32 * (3.0 * h_bar_p + 6.0).to_radians().cos()
        - 0.20 * (4.0 * h_bar_p - 63.0).to_radians().cos();

    let d_theta = 30.0 * (-((h_bar_p - 275.0) / 25.0).powi(2)).exp();
    let c_bar_p7 = c_bar_p.powi(7);
    let r_c = 2.0 * (c_bar_p7 / (c_bar_p7 + POW25_7)).sqrt();
    let l50 = (l_bar_p - 50.0).powi(2);
    let s_l = 1.0 + 0.015 * l50 / (20.0 + l50).sqrt();
    let s_c = 1.0 + 0.045 * c_bar_p;
    let s_h = 1.0 + 0.015 * c_bar_p * t;
    let r_t = -(2.0 * d_theta).to_radians().sin() * r_c;

    let dl = d_lp / s_l;
    let dc = d_cp / s_c;
    let dh = d_big_hp / s_h;
    (dl * dl + dc * dc + dh * dh + r_t * dc * dh).sqrt()
}

/// Index of the candidate closest to `sample`; ties keep the first entry.
pub fn closest_color_index(sample: Rgb8, candidates: &[Rgb8]) -> Option<usize> {
    let lab = sample.to_lab();
    candidates
        .iter()
        .map(|c| ciede2000(lab, c.to_lab()))
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((idx, d)),
        })
        .map(|(idx, _)| idx)
}

/// Reference colors with their precomputed Lab values.
#[derive(Clone, Debug)]
pub struct Palette {
    colors: Vec<Rgb8>,
    labs: Vec<Lab>,
}

impl Palette {
    pub fn new(colors: &[ColorRgba]) -> Self {
        let colors: Vec<Rgb8> = colors.iter().map(|c| c.to_rgb8()).collect();
        let labs = colors.iter().map(|c| c.to_lab()).collect();
        Self { colors, labs }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb8] {
        &self.colors
    }

    /// Palette index perceptually closest to `sample`. `None` only for an
    /// empty palette.
    pub fn classify(&self, sample: Rgb8) -> Option<usize> {
        let lab = sample.to_lab();
        let mut best: Option<(usize, f64)> = None;
        for (idx, entry) in self.labs.iter().enumerate() {
            let d = ciede2000(lab, *entry);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((idx, d));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ciede2000_matches_reference_pair() {
        // First pair of the Sharma, Wu & Dalal test data set.
        let a = Lab {
            l: 50.0,
            a: 2.6772,
            b: -79.7751,
        };
        let b = Lab {
            l: 50.0,
            a: 0.0,
            b: -82.7485,
        };
        assert_abs_diff_eq!(ciede2000(a, b), 2.0425, epsilon = 1e-4);
    }

    #[test]
    fn ciede2000_is_zero_for_identical_colors() {
        let c = Rgb8::new(119, 43, 24).to_lab();
        assert_abs_diff_eq!(ciede2000(c, c), 0.0);
    }

    #[test]
    fn white_maps_to_full_lightness() {
        let lab = Rgb8::new(255, 255, 255).to_lab();
        assert_abs_diff_eq!(lab.l, 100.0, epsilon = 1e-2);
        assert_abs_diff_eq!(lab.a, 0.0, epsilon = 1e-2);
        assert_abs_diff_eq!(lab.b, 0.0, epsilon = 1e-2);
    }

    #[test]
    fn classify_picks_perceptually_nearest_entry() {
        let palette = Palette::new(&[
            ColorRgba::opaque(200.0, 30.0, 30.0),
            ColorRgba::opaque(30.0, 160.0, 40.0),
            ColorRgba::opaque(30.0, 40.0, 190.0),
            ColorRgba::opaque(20.0, 20.0, 20.0),
        ]);
        assert_eq!(palette.classify(Rgb8::new(180, 50, 40)), Some(0));
        assert_eq!(palette.classify(Rgb8::new(40, 140, 60)), Some(1));
        assert_eq!(palette.classify(Rgb8::new(50, 50, 170)), Some(2));
        assert_eq!(palette.classify(Rgb8::new(35, 32, 30)), Some(3));
    }

    #[test]
    fn empty_palette_classifies_nothing() {
        let palette = Palette::new(&[]);
        assert!(palette.is_empty());
        assert_eq!(palette.classify(Rgb8::new(1, 2, 3)), None);
        assert_eq!(closest_color_index(Rgb8::new(1, 2, 3), &[]), None);
    }

    #[test]
    fn rgba_rounds_and_ignores_alpha() {
        let c = ColorRgba([119.4, 42.6, 300.0, 0.0]).to_rgb8();
        assert_eq!(c, Rgb8::new(119, 43, 255));
    }

    #[test]
    fn rgba_serializes_as_plain_array() {
        let c: ColorRgba = serde_json::from_str("[65, 80, 84, 255]").unwrap();
        assert_eq!(c.to_rgb8(), Rgb8::new(65, 80, 84));
    }
}
