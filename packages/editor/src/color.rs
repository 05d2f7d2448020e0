//! # Color Families
//!
//! Heuristic classification of literal colors into named families, and
//! family-to-family rewriting of text that embeds them.
//!
//! ## Thresholds
//!
//! Channel values are 0–255. A color is *neutral* when its saturation
//! (`(max - min) / max`) is below 0.2 or its channel spread is below 30;
//! neutrals split into black (`max < 60`), white (`min > 215`) and gray.
//! Chromatic colors are tested in this order, first match wins:
//!
//! | family | rule |
//! |---|---|
//! | yellow | `r ≥ 180`, `g ≥ 160`, `b ≤ 120`, `g ≥ 0.75·r` |
//! | orange | `r ≥ 180`, `70 ≤ g < 170`, `b ≤ 90`, `g < 0.75·r` |
//! | pink / purple | `r ≥ 150`, `b ≥ 110`, `b > g`; pink when `r > 1.05·b` |
//! | red | `r ≥ 120`, `r > 1.8·g`, `r > 1.8·b` |
//! | green | `g ≥ 100`, `g > 1.3·r`, `g > 1.15·b` |
//! | purple | `b ≥ 80`, `r ≥ 60`, `r ≥ 0.4·b`, `g < 0.8·r`, `g < 0.8·b` |
//! | blue | `b ≥ 100`, `b > 1.3·r`, `b > 1.1·g` |
//!
//! Every family's canonical color classifies into that family, which makes a
//! rewrite idempotent.
//!
//! ## Rewriting
//!
//! The original notation is kept: hex becomes the target's canonical hex,
//! `rgb()`/`rgba()` keep their function name and alpha. Keywords are only
//! touched as the value of a `color`, `background-color` or `border-color`
//! declaration, and only inside a styling context:
//!
//! - a `style="…"` or `style='…'` attribute value
//! - a `<style>…</style>` block
//! - text that is nothing but a declaration list, like `color: red;`
//!
//! Prose such as `Team color: red` is never a styling context.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;
use std::str::FromStr;

use crate::errors::OperationError;

static HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b").expect("valid hex pattern"));

static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(rgba?)\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([0-9.]+%?)\s*)?\)",
    )
    .expect("valid rgb pattern")
});

// The property must open a declaration, so `outline-color` or `--brand-color` never match.
static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(^|[;{\s])(background-color|border-color|color)(\s*:\s*)([a-z]+)\b")
        .expect("valid declaration pattern")
});

static STYLE_CONTEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)(?P<attr>\sstyle\s*=\s*)(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')|(?P<open><style\b[^>]*>)(?P<css>.*?)(?P<close></style\s*>)"#,
    )
    .expect("valid style context pattern")
});

static DECLARATION_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[-a-zA-Z]+\s*:[^;{}<>]*(?:;\s*[-a-zA-Z]+\s*:[^;{}<>]*)*;?\s*$")
        .expect("valid declaration list pattern")
});

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `rrggbb` or `rgb`, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Named cluster of visually similar colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFamily {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Gray,
    Black,
    White,
}

impl ColorFamily {
    pub const ALL: [ColorFamily; 10] = [
        ColorFamily::Red,
        ColorFamily::Orange,
        ColorFamily::Yellow,
        ColorFamily::Green,
        ColorFamily::Blue,
        ColorFamily::Purple,
        ColorFamily::Pink,
        ColorFamily::Gray,
        ColorFamily::Black,
        ColorFamily::White,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorFamily::Red => "red",
            ColorFamily::Orange => "orange",
            ColorFamily::Yellow => "yellow",
            ColorFamily::Green => "green",
            ColorFamily::Blue => "blue",
            ColorFamily::Purple => "purple",
            ColorFamily::Pink => "pink",
            ColorFamily::Gray => "gray",
            ColorFamily::Black => "black",
            ColorFamily::White => "white",
        }
    }

    /// Color written for hex and rgb matches
    pub fn canonical(self) -> Rgb {
        match self {
            ColorFamily::Red => Rgb::new(220, 38, 38),
            ColorFamily::Orange => Rgb::new(234, 88, 12),
            ColorFamily::Yellow => Rgb::new(250, 204, 21),
            ColorFamily::Green => Rgb::new(22, 163, 74),
            ColorFamily::Blue => Rgb::new(37, 99, 235),
            ColorFamily::Purple => Rgb::new(147, 51, 234),
            ColorFamily::Pink => Rgb::new(236, 72, 153),
            ColorFamily::Gray => Rgb::new(107, 114, 128),
            ColorFamily::Black => Rgb::new(0, 0, 0),
            ColorFamily::White => Rgb::new(255, 255, 255),
        }
    }

    /// Keyword written for keyword matches; the family's own CSS name
    pub fn keyword(self) -> &'static str {
        self.name()
    }

    pub fn classify(color: Rgb) -> Option<ColorFamily> {
        let (r, g, b) = (f32::from(color.r), f32::from(color.g), f32::from(color.b));
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let saturation = if max == 0.0 { 0.0 } else { (max - min) / max };

        if saturation < 0.2 || max - min < 30.0 {
            return Some(if max < 60.0 {
                ColorFamily::Black
            } else if min > 215.0 {
                ColorFamily::White
            } else {
                ColorFamily::Gray
            });
        }

        if r >= 180.0 && g >= 160.0 && b <= 120.0 && g >= r * 0.75 {
            Some(ColorFamily::Yellow)
        } else if r >= 180.0 && (70.0..170.0).contains(&g) && b <= 90.0 && g < r * 0.75 {
            Some(ColorFamily::Orange)
        } else if r >= 150.0 && b >= 110.0 && b > g {
            Some(if r > b * 1.05 {
                ColorFamily::Pink
            } else {
                ColorFamily::Purple
            })
        } else if r >= 120.0 && r > g * 1.8 && r > b * 1.8 {
            Some(ColorFamily::Red)
        } else if g >= 100.0 && g > r * 1.3 && g > b * 1.15 {
            Some(ColorFamily::Green)
        } else if b >= 80.0 && r >= 60.0 && r >= b * 0.4 && g < r * 0.8 && g < b * 0.8 {
            Some(ColorFamily::Purple)
        } else if b >= 100.0 && b > r * 1.3 && b > g * 1.1 {
            Some(ColorFamily::Blue)
        } else {
            None
        }
    }

    pub fn contains(self, color: Rgb) -> bool {
        Self::classify(color) == Some(self)
    }
}

impl fmt::Display for ColorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorFamily {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = if name == "grey" { "gray" } else { name.as_str() };
        Self::ALL
            .into_iter()
            .find(|family| family.name() == name)
            .ok_or_else(|| OperationError::malformed(format!("unknown color family `{}`", s)))
    }
}

/// RGB value of a CSS color keyword
pub fn keyword_rgb(keyword: &str) -> Option<Rgb> {
    let rgb = match keyword.to_ascii_lowercase().as_str() {
        "black" => Rgb::new(0, 0, 0),
        "white" => Rgb::new(255, 255, 255),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        "silver" => Rgb::new(192, 192, 192),
        "darkgray" | "darkgrey" => Rgb::new(169, 169, 169),
        "dimgray" | "dimgrey" => Rgb::new(105, 105, 105),
        "lightgray" | "lightgrey" => Rgb::new(211, 211, 211),
        "red" => Rgb::new(255, 0, 0),
        "darkred" => Rgb::new(139, 0, 0),
        "maroon" => Rgb::new(128, 0, 0),
        "crimson" => Rgb::new(220, 20, 60),
        "firebrick" => Rgb::new(178, 34, 34),
        "orange" => Rgb::new(255, 165, 0),
        "darkorange" => Rgb::new(255, 140, 0),
        "tomato" => Rgb::new(255, 99, 71),
        "yellow" => Rgb::new(255, 255, 0),
        "gold" => Rgb::new(255, 215, 0),
        "green" => Rgb::new(0, 128, 0),
        "lime" => Rgb::new(0, 255, 0),
        "darkgreen" => Rgb::new(0, 100, 0),
        "forestgreen" => Rgb::new(34, 139, 34),
        "seagreen" => Rgb::new(46, 139, 87),
        "blue" => Rgb::new(0, 0, 255),
        "navy" => Rgb::new(0, 0, 128),
        "darkblue" => Rgb::new(0, 0, 139),
        "royalblue" => Rgb::new(65, 105, 225),
        "dodgerblue" => Rgb::new(30, 144, 255),
        "steelblue" => Rgb::new(70, 130, 180),
        "skyblue" => Rgb::new(135, 206, 235),
        "purple" => Rgb::new(128, 0, 128),
        "indigo" => Rgb::new(75, 0, 130),
        "violet" => Rgb::new(238, 130, 238),
        "magenta" | "fuchsia" => Rgb::new(255, 0, 255),
        "pink" => Rgb::new(255, 192, 203),
        "hotpink" => Rgb::new(255, 105, 180),
        "deeppink" => Rgb::new(255, 20, 147),
        _ => return None,
    };
    Some(rgb)
}

/// Rewrites every color of one family into another family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRewrite {
    pub from: ColorFamily,
    pub to: ColorFamily,
}

impl ColorRewrite {
    pub fn new(from: ColorFamily, to: ColorFamily) -> Self {
        Self { from, to }
    }

    pub fn parse(from: &str, to: &str) -> Result<Self, OperationError> {
        Ok(Self::new(from.parse()?, to.parse()?))
    }

    /// Rewrite colors embedded in free text
    pub fn apply(&self, text: &str) -> String {
        let target = self.to.canonical();

        let text = HEX_RE.replace_all(text, |caps: &Captures| match Rgb::from_hex(&caps[1]) {
            Some(color) if self.from.contains(color) => target.to_hex(),
            _ => caps[0].to_string(),
        });

        let text = RGB_RE.replace_all(&text, |caps: &Captures| {
            let channel = |i: usize| caps[i].parse::<u8>().ok();
            let color = match (channel(2), channel(3), channel(4)) {
                (Some(r), Some(g), Some(b)) => Rgb::new(r, g, b),
                _ => return caps[0].to_string(),
            };
            if !self.from.contains(color) {
                return caps[0].to_string();
            }
            match caps.get(5) {
                Some(alpha) => format!(
                    "{}({}, {}, {}, {})",
                    &caps[1],
                    target.r,
                    target.g,
                    target.b,
                    alpha.as_str()
                ),
                None => format!("{}({}, {}, {})", &caps[1], target.r, target.g, target.b),
            }
        });

        self.rewrite_keywords(&text)
    }

    fn rewrite_keywords(&self, text: &str) -> String {
        if DECLARATION_LIST_RE.is_match(text) {
            return self.rewrite_declarations(text);
        }

        STYLE_CONTEXT_RE
            .replace_all(text, |caps: &Captures| {
                if let Some(attr) = caps.name("attr") {
                    match (caps.name("dq"), caps.name("sq")) {
                        (Some(body), _) => format!(
                            "{}\"{}\"",
                            attr.as_str(),
                            self.rewrite_declarations(body.as_str())
                        ),
                        (None, Some(body)) => format!(
                            "{}'{}'",
                            attr.as_str(),
                            self.rewrite_declarations(body.as_str())
                        ),
                        (None, None) => caps[0].to_string(),
                    }
                } else {
                    format!(
                        "{}{}{}",
                        &caps["open"],
                        self.rewrite_declarations(&caps["css"]),
                        &caps["close"]
                    )
                }
            })
            .into_owned()
    }

    /// Rewrite keyword values of color declarations in CSS text
    fn rewrite_declarations(&self, css: &str) -> String {
        DECLARATION_RE
            .replace_all(css, |caps: &Captures| match keyword_rgb(&caps[4]) {
                Some(color) if self.from.contains(color) => {
                    format!("{}{}{}{}", &caps[1], &caps[2], &caps[3], self.to.keyword())
                }
                _ => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Rewrite the value of a color-valued style property.
    ///
    /// The property name supplies the declaration context, so a bare keyword
    /// value is eligible.
    pub fn apply_to_value(&self, value: &str) -> String {
        match keyword_rgb(value.trim()) {
            Some(color) if self.from.contains(color) => self.to.keyword().to_string(),
            Some(_) => value.to_string(),
            None => self.apply(value),
        }
    }
}
