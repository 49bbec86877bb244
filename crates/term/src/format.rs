//! Tile labels and colours.

use crate::fb::Rgb;
use crate::types::Slot;

/// Colours for 1, 2, 4, ... 2^19
const BASE_PALETTE: [&str; 20] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#e67e22", "#34495e",
    "#c0392b", "#16a085", "#8e44ad", "#27ae60", "#d35400", "#2980b9", "#c0392b", "#7f8c8d",
    "#f1c40f", "#e74c3c", "#3498db", "#2ecc71",
];

pub const BONUS_COLOR: Rgb = Rgb::new(255, 193, 7);
pub const EMPTY_LIGHT: Rgb = Rgb::new(205, 193, 180);
pub const EMPTY_DARK: Rgb = Rgb::new(45, 45, 52);

/// Short label: `1.5k`, `2m`, `*` for bonus, empty for an empty slot
pub fn format_slot(slot: Slot) -> String {
    match slot {
        Slot::Empty => String::new(),
        Slot::Bonus => "*".to_string(),
        Slot::Number(n) => format_number(n),
    }
}

pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        with_suffix(n as f64 / 1_000_000.0, 'm')
    } else if n >= 1_000 {
        with_suffix(n as f64 / 1_000.0, 'k')
    } else {
        n.to_string()
    }
}

fn with_suffix(v: f64, suffix: char) -> String {
    let s = format!("{v:.1}");
    let s = s.strip_suffix(".0").unwrap_or(&s);
    format!("{s}{suffix}")
}

/// Background colour of a tile
pub fn slot_color(slot: Slot, dark: bool) -> Rgb {
    match slot {
        Slot::Empty if dark => EMPTY_DARK,
        Slot::Empty => EMPTY_LIGHT,
        Slot::Bonus => BONUS_COLOR,
        Slot::Number(n) => number_color(n, dark),
    }
}

/// Palette colour for powers of two, golden-angle hue otherwise
pub fn number_color(n: u64, dark: bool) -> Rgb {
    if n.is_power_of_two() {
        if let Some(c) = BASE_PALETTE
            .get(n.trailing_zeros() as usize)
            .and_then(|hex| Rgb::from_hex(hex))
        {
            return c;
        }
    }
    let hue = (n as f64 * 137.508) % 360.0;
    let saturation = 60 + n % 20;
    let lightness = if dark { 35 + n % 20 } else { 45 + n % 15 };
    hsl_to_rgb(hue, saturation as f64 / 100.0, lightness as f64 / 100.0)
}

/// Readable text colour on top of `bg`
pub fn text_color(bg: Rgb) -> Rgb {
    if bg.luma() > 160 {
        Rgb::new(40, 40, 40)
    } else {
        Rgb::new(250, 250, 250)
    }
}

/// `h` in degrees, `s`/`l` in 0..=1
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_u8(r1), to_u8(g1), to_u8(b1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1), "1");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1k");
        assert_eq!(format_number(1536), "1.5k");
        assert_eq!(format_number(2_000_000), "2m");
        assert_eq!(format_number(1_260_000), "1.3m");
    }

    #[test]
    fn test_format_slot() {
        assert_eq!(format_slot(Slot::Empty), "");
        assert_eq!(format_slot(Slot::Bonus), "*");
        assert_eq!(format_slot(Slot::Number(64)), "64");
    }

    #[test]
    fn test_palette_for_powers_of_two() {
        assert_eq!(number_color(1, false), Rgb::new(0xe7, 0x4c, 0x3c));
        assert_eq!(number_color(2, true), Rgb::new(0x34, 0x98, 0xdb));
        assert_eq!(number_color(65536, false), Rgb::new(0xf1, 0xc4, 0x0f));
    }

    #[test]
    fn test_hue_rule_depends_on_theme() {
        let light = number_color(3, false);
        let dark = number_color(3, true);
        assert_ne!(light, dark);
        assert_eq!(number_color(3, false), light);
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Rgb::new(255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), Rgb::new(0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), Rgb::new(0, 0, 255));
    }
}
