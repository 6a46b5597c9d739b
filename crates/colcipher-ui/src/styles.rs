//! Ayu color theme and styling functions for colc output.
//!
//! Color source: <https://github.com/ayu-theme/ayu-colors>
//!
//! Only results get color: pass/fail verdicts, warnings, algorithm tags and
//! success rates. Plain data stays in the default foreground.

use colcipher_core::enums::Algorithm;
use colcipher_core::formula::EncodingFormula;
use owo_colors::OwoColorize;

use crate::terminal::supports_color;

// ---------------------------------------------------------------------------
// Ayu Dark color palette (RGB values)
// ---------------------------------------------------------------------------

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c - bright green
const WARN: (u8, u8, u8) = (0xff, 0xb4, 0x54); // #ffb454 - bright yellow
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178 - bright red
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680 - muted gray
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff); // #59c2ff - bright blue
const CUSTOM: (u8, u8, u8) = (0xd2, 0xa6, 0xff); // #d2a6ff - purple

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

pub const ICON_PASS: &str = "\u{2713}"; // ✓
pub const ICON_WARN: &str = "\u{26A0}"; // ⚠
pub const ICON_FAIL: &str = "\u{2716}"; // ✖
pub const ICON_ARROW: &str = "\u{2192}"; // →

pub const SEPARATOR_LIGHT: &str = "\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}\u{2500}";

// ---------------------------------------------------------------------------
// Helper: apply truecolor only when color is supported
// ---------------------------------------------------------------------------

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

fn color_bold_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).bold().to_string()
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Core semantic render helpers
// ---------------------------------------------------------------------------

/// Renders text with pass (green) styling.
pub fn render_pass(s: &str) -> String {
    color_str(s, PASS)
}

/// Renders text with warning (yellow) styling.
pub fn render_warn(s: &str) -> String {
    color_str(s, WARN)
}

/// Renders text with fail (red) styling.
pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

/// Renders text with muted (gray) styling.
pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

/// Renders text with accent (blue) styling.
pub fn render_accent(s: &str) -> String {
    color_str(s, ACCENT)
}

pub fn render_bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

/// Renders a section header in uppercase with accent color and bold.
pub fn render_category(s: &str) -> String {
    color_bold_str(&s.to_uppercase(), ACCENT)
}

pub fn render_separator() -> String {
    render_muted(SEPARATOR_LIGHT)
}

pub fn render_pass_icon() -> String {
    color_str(ICON_PASS, PASS)
}

pub fn render_warn_icon() -> String {
    color_str(ICON_WARN, WARN)
}

pub fn render_fail_icon() -> String {
    color_str(ICON_FAIL, FAIL)
}

// ---------------------------------------------------------------------------
// Domain renderers
// ---------------------------------------------------------------------------

/// Renders an algorithm tag; user-defined algorithms in purple, unknown
/// tags in red.
pub fn render_algorithm(algorithm: &Algorithm) -> String {
    match algorithm {
        Algorithm::Unknown(tag) if tag.trim().is_empty() => render_fail("(none)"),
        Algorithm::Unknown(tag) => render_fail(tag),
        Algorithm::Custom | Algorithm::CustomMapping => color_str(algorithm.as_str(), CUSTOM),
        _ => render_accent(algorithm.as_str()),
    }
}

/// A pass or fail icon followed by `label`.
pub fn render_verdict(ok: bool, label: &str) -> String {
    if ok {
        format!("{} {}", render_pass_icon(), render_pass(label))
    } else {
        format!("{} {}", render_fail_icon(), render_fail(label))
    }
}

/// Renders a success percentage: green at 100, yellow from 90, red below.
pub fn render_rate(rate: f64) -> String {
    let text = format!("{rate:.1}%");
    if rate >= 100.0 {
        render_pass(&text)
    } else if rate >= 90.0 {
        render_warn(&text)
    } else {
        render_fail(&text)
    }
}

/// One-line formula summary: `ID  algorithm  name (parameters)`.
pub fn render_formula_compact(formula: &EncodingFormula) -> String {
    format!(
        "{}  {}  {} {}",
        render_bold(&formula.id),
        render_algorithm(&formula.algorithm),
        formula.name,
        render_muted(&format!("({})", formula.parameter_summary()))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use colcipher_core::formula::FormulaBuilder;

    #[test]
    fn render_algorithm_contains_tag() {
        assert!(render_algorithm(&Algorithm::Caesar).contains("caesar"));
        assert!(render_algorithm(&Algorithm::Custom).contains("custom"));
        assert!(render_algorithm(&Algorithm::from("rot47")).contains("rot47"));
        assert!(render_algorithm(&Algorithm::default()).contains("(none)"));
    }

    #[test]
    fn render_verdict_uses_icons() {
        assert!(render_verdict(true, "valid").contains(ICON_PASS));
        assert!(render_verdict(false, "invalid").contains(ICON_FAIL));
    }

    #[test]
    fn render_rate_formats_one_decimal() {
        assert!(render_rate(100.0).contains("100.0%"));
        assert!(render_rate(87.25).contains("87.2%") || render_rate(87.25).contains("87.3%"));
    }

    #[test]
    fn render_formula_compact_contains_fields() {
        let f = FormulaBuilder::new("Shift five")
            .id("fm-abc123")
            .algorithm(Algorithm::Caesar)
            .shift(5)
            .build();
        let rendered = render_formula_compact(&f);
        assert!(rendered.contains("fm-abc123"));
        assert!(rendered.contains("Shift five"));
        assert!(rendered.contains("caesar"));
    }
}
