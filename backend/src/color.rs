//! Couple colors are stored as CSS-style HSL triples (`"220 70% 50%"`), the
//! form the theme variables consume directly. The admin settings form edits
//! them as hex, so both directions of the conversion live here.

use std::fmt;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue in degrees, `[0, 360)`.
    pub h: f64,
    /// Saturation in percent, `[0, 100]`.
    pub s: f64,
    /// Lightness in percent, `[0, 100]`.
    pub l: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Option<Self> {
        let valid = h.is_finite()
            && (0.0..=100.0).contains(&s)
            && (0.0..=100.0).contains(&l);
        valid.then(|| Self {
            h: h.rem_euclid(360.0),
            s,
            l,
        })
    }

    /// Parses `"220 70% 50%"`, also accepting commas and a `hsl(...)` wrapper.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let inner = trimmed
            .strip_prefix("hsl(")
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);

        let parts: Vec<&str> = inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != 3 {
            return None;
        }

        let h = parts[0].trim_end_matches("deg").parse::<f64>().ok()?;
        let s = parts[1].strip_suffix('%')?.parse::<f64>().ok()?;
        let l = parts[2].strip_suffix('%')?.parse::<f64>().ok()?;
        Self::new(h, s, l)
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}% {}%",
            trim_number(self.h),
            trim_number(self.s),
            trim_number(self.l)
        )
    }
}

// One decimal place keeps hex -> hsl -> hex within a single step per channel.
fn trim_number(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    let text = format!("{:.1}", rounded);
    match text.strip_suffix(".0") {
        Some(whole) if whole == "-0" => "0".to_string(),
        Some(whole) => whole.to_string(),
        None => text,
    }
}

/// Parse a hex color string (`#rrggbb` or `#rgb`, `#` optional) to RGB.
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some((digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> Hsl {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let delta = max - min;

    if delta == 0.0 {
        return Hsl {
            h: 0.0,
            s: 0.0,
            l: l * 100.0,
        };
    }

    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let h = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsl {
        h: (h * 60.0).rem_euclid(360.0),
        s: s * 100.0,
        l: l * 100.0,
    }
}

pub fn hsl_to_rgb(hsl: Hsl) -> (u8, u8, u8) {
    let s = hsl.s / 100.0;
    let l = hsl.l / 100.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = hsl.h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (channel(r), channel(g), channel(b))
}

pub fn hex_to_hsl(hex: &str) -> Option<Hsl> {
    let (r, g, b) = parse_hex(hex)?;
    Some(rgb_to_hsl(r, g, b))
}

pub fn hsl_to_hex(hsl: Hsl) -> String {
    let (r, g, b) = hsl_to_rgb(hsl);
    rgb_to_hex(r, g, b)
}

/// Converts whatever the editor sent (hex or an HSL triple) into the stored
/// HSL triple string.
pub fn normalize_color(input: &str) -> Result<String, AppError> {
    let trimmed = input.trim();
    let hsl = if trimmed.starts_with('#') {
        hex_to_hsl(trimmed)
    } else {
        Hsl::parse(trimmed).or_else(|| hex_to_hsl(trimmed))
    };

    hsl.map(|hsl| hsl.to_string())
        .ok_or_else(|| AppError::validation(format!("Cor inválida: {}", input)))
}

/// Stored triple back to the hex the editor shows.
pub fn stored_to_hex(stored: &str) -> Option<String> {
    Hsl::parse(stored).map(hsl_to_hex)
}
