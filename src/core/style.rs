//! SGR style model
//!
//! Represents the Select Graphic Rendition state of a cell (colors plus
//! the boolean attributes) and produces ANSI code vectors for it, either
//! absolute or differential against a previous state.
//!
//! Emission goes through [`EmitMode`]: `Modern` uses per-attribute off
//! codes and the 90–97/100–107 bright range, `Legacy` is ANSI-1990 safe
//! (bright via bold, reset-and-rebuild when anything turns off), and
//! `VgaLegacy` additionally replaces every standard color with the exact
//! VGA hardware RGB value.

use serde::{Deserialize, Serialize};

/// A terminal color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// Default foreground or background color
    Default,
    /// Standard 16-color palette (0-15)
    Standard(u8),
    /// 256-color palette index
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::Default
    }
}

impl Color {
    pub fn is_default(&self) -> bool {
        matches!(self, Color::Default)
    }

    /// Standard color in the bright half (8-15)
    pub fn is_bright_standard(&self) -> bool {
        matches!(self, Color::Standard(i) if *i >= 8)
    }
}

/// The 16 canonical VGA text-mode colors, exact hardware values.
pub const VGA_PALETTE: [(u8, u8, u8); 16] = [
    (0x00, 0x00, 0x00), // 0: Black
    (0xAA, 0x00, 0x00), // 1: Red
    (0x00, 0xAA, 0x00), // 2: Green
    (0xAA, 0x55, 0x00), // 3: Yellow/Brown
    (0x00, 0x00, 0xAA), // 4: Blue
    (0xAA, 0x00, 0xAA), // 5: Magenta
    (0x00, 0xAA, 0xAA), // 6: Cyan
    (0xAA, 0xAA, 0xAA), // 7: Light Gray
    (0x55, 0x55, 0x55), // 8: Dark Gray
    (0xFF, 0x55, 0x55), // 9: Bright Red
    (0x55, 0xFF, 0x55), // 10: Bright Green
    (0xFF, 0xFF, 0x55), // 11: Bright Yellow
    (0x55, 0x55, 0xFF), // 12: Bright Blue
    (0xFF, 0x55, 0xFF), // 13: Bright Magenta
    (0x55, 0xFF, 0xFF), // 14: Bright Cyan
    (0xFF, 0xFF, 0xFF), // 15: Bright White
];

/// How SGR state is rendered back into ANSI codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmitMode {
    /// Per-attribute off codes, 90-97/100-107 bright range
    Modern,
    /// ANSI-1990 safe: bright via bold, reset-and-rebuild on turn-off
    #[default]
    Legacy,
    /// Legacy rules, standard colors promoted to VGA palette RGB
    VgaLegacy,
}

impl EmitMode {
    pub fn is_legacy(self) -> bool {
        matches!(self, EmitMode::Legacy | EmitMode::VgaLegacy)
    }

    /// Foreground color codes for one SGR state.
    ///
    /// In `VgaLegacy`, bold with a standard index below 8 selects the
    /// bright palette entry (the VGA bold-is-bright behavior).
    fn fg_codes(self, sgr: &Sgr) -> Vec<u16> {
        match sgr.fg {
            Color::Default => vec![39],
            Color::Standard(i) => match self {
                EmitMode::VgaLegacy => {
                    let idx = if sgr.bold && i < 8 { i + 8 } else { i };
                    let (r, g, b) = VGA_PALETTE[idx as usize & 0xF];
                    vec![38, 2, r as u16, g as u16, b as u16]
                }
                _ if i < 8 => vec![30 + i as u16],
                EmitMode::Legacy => vec![1, 30 + (i - 8) as u16],
                EmitMode::Modern => vec![90 + (i - 8) as u16],
            },
            Color::Indexed(n) => vec![38, 5, n as u16],
            Color::Rgb(r, g, b) => vec![38, 2, r as u16, g as u16, b as u16],
        }
    }

    /// Background color codes. Backgrounds are never bold-promoted.
    fn bg_codes(self, sgr: &Sgr) -> Vec<u16> {
        match sgr.bg {
            Color::Default => vec![49],
            Color::Standard(i) => match self {
                EmitMode::VgaLegacy => {
                    let (r, g, b) = VGA_PALETTE[i as usize & 0xF];
                    vec![48, 2, r as u16, g as u16, b as u16]
                }
                _ if i < 8 => vec![40 + i as u16],
                EmitMode::Legacy => vec![1, 40 + (i - 8) as u16],
                EmitMode::Modern => vec![100 + (i - 8) as u16],
            },
            Color::Indexed(n) => vec![48, 5, n as u16],
            Color::Rgb(r, g, b) => vec![48, 2, r as u16, g as u16, b as u16],
        }
    }
}

/// Select Graphic Rendition state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sgr {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub reverse: bool,
    pub hidden: bool,
    pub strikethrough: bool,
}

impl Default for Sgr {
    fn default() -> Self {
        DEFAULT_SGR
    }
}

/// The reset state.
///
/// Intentionally not the ECMA-48 default/default pair: light grey on black
/// keeps reset text visible on renderers that have no palette of their own.
/// Never reconverted to `Color::Default` downstream.
pub const DEFAULT_SGR: Sgr = Sgr {
    fg: Color::Standard(7),
    bg: Color::Standard(0),
    bold: false,
    dim: false,
    italic: false,
    underline: false,
    blink: false,
    reverse: false,
    hidden: false,
    strikethrough: false,
};

impl Sgr {
    pub fn new() -> Self {
        DEFAULT_SGR
    }

    pub fn reset(&mut self) {
        *self = DEFAULT_SGR;
    }

    pub fn is_default(&self) -> bool {
        *self == DEFAULT_SGR
    }

    /// Apply a run of numeric SGR parameters.
    ///
    /// Extended colors (38/48) consume their sub-parameters; incomplete
    /// extended runs swallow the mode byte and continue. Unknown codes are
    /// ignored.
    pub fn apply_params(&mut self, params: &[u16]) {
        let mut i = 0;
        while i < params.len() {
            match params[i] {
                0 => self.reset(),
                1 => self.bold = true,
                21 | 22 => self.bold = false,
                2 => self.dim = true,
                3 => self.italic = true,
                4 => self.underline = true,
                5 => self.blink = true,
                7 => self.reverse = true,
                8 => self.hidden = true,
                9 => self.strikethrough = true,
                23 => self.italic = false,
                24 => self.underline = false,
                25 => self.blink = false,
                27 => self.reverse = false,
                28 => self.hidden = false,
                29 => self.strikethrough = false,
                n @ 30..=37 => self.fg = Color::Standard((n - 30) as u8),
                38 => {
                    let (color, consumed) = parse_extended_color(params, i + 1);
                    if let Some(color) = color {
                        self.fg = color;
                    }
                    i += consumed;
                }
                39 => self.fg = Color::Default,
                n @ 40..=47 => self.bg = Color::Standard((n - 40) as u8),
                48 => {
                    let (color, consumed) = parse_extended_color(params, i + 1);
                    if let Some(color) = color {
                        self.bg = color;
                    }
                    i += consumed;
                }
                49 => self.bg = Color::Default,
                n @ 90..=97 => self.fg = Color::Standard((n - 90 + 8) as u8),
                n @ 100..=107 => self.bg = Color::Standard((n - 100 + 8) as u8),
                _ => {}
            }
            i += 1;
        }
    }

    /// True when any attribute or color would have to be switched off to
    /// reach `self` from `prev`. Bright-to-normal standard transitions
    /// count: in legacy encoding bright colors carry an implicit bold.
    pub(crate) fn turned_off_since(&self, prev: &Sgr) -> bool {
        let toggles = [
            (prev.bold, self.bold),
            (prev.dim, self.dim),
            (prev.italic, self.italic),
            (prev.underline, self.underline),
            (prev.blink, self.blink),
            (prev.reverse, self.reverse),
            (prev.hidden, self.hidden),
            (prev.strikethrough, self.strikethrough),
        ];
        if toggles.iter().any(|&(was, now)| was && !now) {
            return true;
        }
        if !prev.fg.is_default() && self.fg.is_default() {
            return true;
        }
        if !prev.bg.is_default() && self.bg.is_default() {
            return true;
        }
        if prev.fg.is_bright_standard() && !self.fg.is_bright_standard() {
            return true;
        }
        if prev.bg.is_bright_standard() && !self.bg.is_bright_standard() {
            return true;
        }
        false
    }

    /// Absolute code vector: foreground, background, then attributes in
    /// the fixed `1 2 3 4 5 7 8 9` order. Empty when the state carries
    /// nothing (both colors Default, no attributes).
    pub fn absolute_codes(&self, mode: EmitMode) -> Vec<u16> {
        let mut codes = Vec::new();

        if !self.fg.is_default() {
            codes.extend(mode.fg_codes(self));
        }
        if !self.bg.is_default() {
            codes.extend(mode.bg_codes(self));
        }

        // In plain legacy mode a bright standard color already encoded a
        // leading 1; a second bold code would be redundant.
        let bold_carried = mode == EmitMode::Legacy
            && (self.fg.is_bright_standard() || self.bg.is_bright_standard());

        if self.bold && !bold_carried {
            codes.push(1);
        }
        if self.dim {
            codes.push(2);
        }
        if self.italic {
            codes.push(3);
        }
        if self.underline {
            codes.push(4);
        }
        if self.blink {
            codes.push(5);
        }
        if self.reverse {
            codes.push(7);
        }
        if self.hidden {
            codes.push(8);
        }
        if self.strikethrough {
            codes.push(9);
        }

        codes
    }

    /// Minimal code vector to go from `previous` to `self`.
    ///
    /// `None` previous yields the absolute encoding. A transition back to
    /// [`DEFAULT_SGR`] is a bare reset. In legacy modes any turn-off falls
    /// back to reset-and-rebuild; otherwise only the deltas are emitted.
    pub fn diff(&self, previous: Option<&Sgr>, mode: EmitMode) -> Vec<u16> {
        let prev = match previous {
            None => return self.absolute_codes(mode),
            Some(prev) => prev,
        };

        if self == prev {
            return Vec::new();
        }
        if self.is_default() {
            return vec![0];
        }
        if mode.is_legacy() && self.turned_off_since(prev) {
            let mut codes = vec![0];
            codes.extend(self.absolute_codes(mode));
            return codes;
        }

        let mut codes = Vec::new();

        // Legacy bright foregrounds encode bold inside the color codes.
        let mut emit_bold = self.bold != prev.bold;
        if mode == EmitMode::Legacy && self.fg != prev.fg && self.fg.is_bright_standard() {
            emit_bold = false;
        }
        if emit_bold {
            codes.push(if self.bold { 1 } else { 22 });
        }

        let toggles: [(bool, bool, u16, u16); 7] = [
            (prev.dim, self.dim, 2, 22),
            (prev.italic, self.italic, 3, 23),
            (prev.underline, self.underline, 4, 24),
            (prev.blink, self.blink, 5, 25),
            (prev.reverse, self.reverse, 7, 27),
            (prev.hidden, self.hidden, 8, 28),
            (prev.strikethrough, self.strikethrough, 9, 29),
        ];
        for (was, now, on, off) in toggles {
            if was != now {
                codes.push(if now { on } else { off });
            }
        }

        // A bold toggle changes the VGA promotion of a standard foreground,
        // so the color has to be re-emitted even though it did not change.
        let vga_bold_flip = mode == EmitMode::VgaLegacy
            && self.bold != prev.bold
            && matches!(self.fg, Color::Standard(i) if i < 8);

        if self.fg != prev.fg || vga_bold_flip {
            codes.extend(mode.fg_codes(self));
        }
        if self.bg != prev.bg {
            codes.extend(mode.bg_codes(self));
        }

        codes
    }

    /// Absolute ANSI escape for this state. `ESC [ 0 m` when the state
    /// carries no codes at all.
    pub fn escape(&self, mode: EmitMode) -> String {
        let codes = self.absolute_codes(mode);
        if codes.is_empty() {
            return "\x1b[0m".to_string();
        }
        format!("\x1b[{}m", join_codes(&codes))
    }

    /// Differential ANSI escape, empty when no transition is needed.
    pub fn diff_escape(&self, previous: Option<&Sgr>, mode: EmitMode) -> String {
        let codes = self.diff(previous, mode);
        if codes.is_empty() {
            return String::new();
        }
        format!("\x1b[{}m", join_codes(&codes))
    }
}

fn parse_extended_color(params: &[u16], start: usize) -> (Option<Color>, usize) {
    if start >= params.len() {
        return (None, 0);
    }
    match params[start] {
        5 if start + 1 < params.len() => (Some(Color::Indexed(params[start + 1] as u8)), 2),
        2 if start + 3 < params.len() => (
            Some(Color::Rgb(
                params[start + 1] as u8,
                params[start + 2] as u8,
                params[start + 3] as u8,
            )),
            4,
        ),
        _ => (None, 1),
    }
}

fn join_codes(codes: &[u16]) -> String {
    codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Sgr {
        Sgr {
            fg: Color::Standard(1),
            ..DEFAULT_SGR
        }
    }

    #[test]
    fn test_default_is_grey_on_black() {
        let sgr = Sgr::new();
        assert_eq!(sgr.fg, Color::Standard(7));
        assert_eq!(sgr.bg, Color::Standard(0));
        assert!(!sgr.bold);
    }

    #[test]
    fn test_apply_params_colors() {
        let mut sgr = Sgr::new();
        sgr.apply_params(&[31]);
        assert_eq!(sgr.fg, Color::Standard(1));
        sgr.apply_params(&[44]);
        assert_eq!(sgr.bg, Color::Standard(4));
        sgr.apply_params(&[91]);
        assert_eq!(sgr.fg, Color::Standard(9));
        sgr.apply_params(&[104]);
        assert_eq!(sgr.bg, Color::Standard(12));
        sgr.apply_params(&[39, 49]);
        assert_eq!(sgr.fg, Color::Default);
        assert_eq!(sgr.bg, Color::Default);
    }

    #[test]
    fn test_apply_params_extended() {
        let mut sgr = Sgr::new();
        sgr.apply_params(&[38, 5, 123]);
        assert_eq!(sgr.fg, Color::Indexed(123));
        sgr.apply_params(&[48, 2, 255, 100, 50]);
        assert_eq!(sgr.bg, Color::Rgb(255, 100, 50));
    }

    #[test]
    fn test_apply_params_extended_truncated() {
        // 38;5 with no index leaves the color alone
        let mut sgr = Sgr::new();
        sgr.apply_params(&[38, 5]);
        assert_eq!(sgr.fg, Color::Standard(7));
    }

    #[test]
    fn test_apply_params_attributes() {
        let mut sgr = Sgr::new();
        sgr.apply_params(&[1, 4, 5]);
        assert!(sgr.bold && sgr.underline && sgr.blink);
        sgr.apply_params(&[22, 24, 25]);
        assert!(!sgr.bold && !sgr.underline && !sgr.blink);
    }

    #[test]
    fn test_apply_params_reset() {
        let mut sgr = Sgr::new();
        sgr.apply_params(&[1, 31, 44]);
        sgr.apply_params(&[0]);
        assert!(sgr.is_default());
    }

    #[test]
    fn test_absolute_plain_red() {
        assert_eq!(red().absolute_codes(EmitMode::Legacy), vec![31, 40]);
        assert_eq!(red().absolute_codes(EmitMode::Modern), vec![31, 40]);
    }

    #[test]
    fn test_absolute_bright_legacy_vs_modern() {
        let sgr = Sgr {
            fg: Color::Standard(9),
            ..DEFAULT_SGR
        };
        assert_eq!(sgr.absolute_codes(EmitMode::Legacy), vec![1, 31, 40]);
        assert_eq!(sgr.absolute_codes(EmitMode::Modern), vec![91, 40]);
    }

    #[test]
    fn test_absolute_bright_legacy_no_double_bold() {
        let sgr = Sgr {
            fg: Color::Standard(9),
            bold: true,
            ..DEFAULT_SGR
        };
        // The 1 inside the bright encoding already covers bold.
        assert_eq!(sgr.absolute_codes(EmitMode::Legacy), vec![1, 31, 40]);
    }

    #[test]
    fn test_absolute_empty_is_reset_escape() {
        let sgr = Sgr {
            fg: Color::Default,
            bg: Color::Default,
            ..DEFAULT_SGR
        };
        assert!(sgr.absolute_codes(EmitMode::Legacy).is_empty());
        assert_eq!(sgr.escape(EmitMode::Legacy), "\x1b[0m");
    }

    #[test]
    fn test_vga_promotion_bold_is_bright() {
        let sgr = Sgr {
            fg: Color::Standard(1),
            bold: true,
            ..DEFAULT_SGR
        };
        let codes = sgr.absolute_codes(EmitMode::VgaLegacy);
        // Bright red from the palette, then bg black, then bold itself.
        assert_eq!(
            codes,
            vec![38, 2, 0xFF, 0x55, 0x55, 48, 2, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_vga_background_not_promoted() {
        let sgr = Sgr {
            bg: Color::Standard(1),
            bold: true,
            ..DEFAULT_SGR
        };
        let codes = sgr.absolute_codes(EmitMode::VgaLegacy);
        assert_eq!(
            codes,
            vec![38, 2, 0xFF, 0xFF, 0xFF, 48, 2, 0xAA, 0, 0, 1]
        );
    }

    #[test]
    fn test_diff_equal_is_empty() {
        let sgr = red();
        assert!(sgr.diff(Some(&sgr), EmitMode::Legacy).is_empty());
        assert!(sgr.diff(Some(&sgr), EmitMode::Modern).is_empty());
        assert_eq!(sgr.diff_escape(Some(&sgr), EmitMode::Legacy), "");
    }

    #[test]
    fn test_diff_to_default_is_reset() {
        let sgr = red();
        assert_eq!(DEFAULT_SGR.diff(Some(&sgr), EmitMode::Legacy), vec![0]);
        assert_eq!(DEFAULT_SGR.diff(Some(&sgr), EmitMode::Modern), vec![0]);
    }

    #[test]
    fn test_diff_none_is_absolute() {
        let sgr = red();
        assert_eq!(
            sgr.diff(None, EmitMode::Legacy),
            sgr.absolute_codes(EmitMode::Legacy)
        );
    }

    #[test]
    fn test_diff_color_only() {
        let prev = red();
        let cur = Sgr {
            fg: Color::Standard(2),
            ..DEFAULT_SGR
        };
        assert_eq!(cur.diff(Some(&prev), EmitMode::Legacy), vec![32]);
    }

    #[test]
    fn test_diff_legacy_turn_off_rebuilds() {
        let prev = Sgr {
            underline: true,
            ..red()
        };
        let cur = red();
        let codes = cur.diff(Some(&prev), EmitMode::Legacy);
        assert_eq!(codes[0], 0);
        assert_eq!(&codes[1..], &cur.absolute_codes(EmitMode::Legacy)[..]);
    }

    #[test]
    fn test_diff_modern_turn_off_uses_off_code() {
        let prev = Sgr {
            underline: true,
            ..red()
        };
        let cur = red();
        assert_eq!(cur.diff(Some(&prev), EmitMode::Modern), vec![24]);
    }

    #[test]
    fn test_diff_legacy_bright_fg_no_separate_bold() {
        let prev = red();
        let cur = Sgr {
            fg: Color::Standard(9),
            bold: true,
            ..DEFAULT_SGR
        };
        // Bold flips on together with a bright foreground: one 1 only.
        assert_eq!(cur.diff(Some(&prev), EmitMode::Legacy), vec![1, 31]);
    }

    #[test]
    fn test_diff_vga_bold_flip_reemits_fg() {
        let prev = red();
        let cur = Sgr {
            bold: true,
            ..red()
        };
        let codes = cur.diff(Some(&prev), EmitMode::VgaLegacy);
        assert_eq!(codes, vec![1, 38, 2, 0xFF, 0x55, 0x55]);
    }

    #[test]
    fn test_diff_modern_roundtrip_law() {
        let samples = [
            DEFAULT_SGR,
            red(),
            Sgr {
                fg: Color::Standard(9),
                ..DEFAULT_SGR
            },
            Sgr {
                fg: Color::Indexed(123),
                bg: Color::Rgb(1, 2, 3),
                italic: true,
                ..DEFAULT_SGR
            },
            Sgr {
                bold: true,
                underline: true,
                bg: Color::Standard(4),
                ..DEFAULT_SGR
            },
            Sgr {
                fg: Color::Default,
                bg: Color::Default,
                blink: true,
                ..DEFAULT_SGR
            },
        ];
        for a in &samples {
            for b in &samples {
                let codes = b.diff(Some(a), EmitMode::Modern);
                let mut applied = *a;
                applied.apply_params(&codes);
                assert_eq!(&applied, b, "apply(diff({b:?}, {a:?})) != target");
            }
        }
    }

    #[test]
    fn test_diff_absolute_applies_from_default() {
        let sgr = Sgr {
            fg: Color::Indexed(200),
            bg: Color::Standard(3),
            underline: true,
            ..DEFAULT_SGR
        };
        let codes = sgr.diff(None, EmitMode::Modern);
        let mut applied = DEFAULT_SGR;
        applied.apply_params(&codes);
        assert_eq!(applied, sgr);
    }
}
