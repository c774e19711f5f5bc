//! TTF font loading and glyph rasterization via ab_glyph.
//!
//! Certificates carry CJK text, so fonts are loaded from files supplied by
//! the operator instead of being embedded. [`CharMetrics`] is the seam
//! between layout math and the actual font: the flow/wrap algorithm only
//! needs character advances, which keeps it testable with synthetic metrics.

use std::path::Path;

use ab_glyph::{Font, FontArc, Point, ScaleFont};

use crate::error::CertError;

/// Character-level measurements used by text layout.
pub trait CharMetrics {
    /// Horizontal advance of `ch` at `px` pixels.
    fn advance(&self, ch: char, px: f32, bold: bool) -> f32;

    /// Line height (ascent + descent + gap) at `px` pixels.
    fn line_height(&self, px: f32) -> f32;

    /// Baseline distance from the top of the line at `px` pixels.
    fn ascent(&self, px: f32) -> f32;
}

/// A loaded font pair: regular plus an optional bold face.
///
/// When no bold face is supplied, bold runs fall back to the regular face;
/// weight is then only a color/flow distinction, not a visual one.
pub struct LoadedFont {
    regular: FontArc,
    bold: Option<FontArc>,
}

impl LoadedFont {
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self, CertError> {
        let regular = FontArc::try_from_vec(regular)
            .map_err(|e| CertError::Render(format!("invalid font data: {}", e)))?;
        let bold = match bold {
            Some(bytes) => Some(
                FontArc::try_from_vec(bytes)
                    .map_err(|e| CertError::Render(format!("invalid bold font data: {}", e)))?,
            ),
            None => None,
        };
        Ok(Self { regular, bold })
    }

    pub fn from_files(
        regular: impl AsRef<Path>,
        bold: Option<&Path>,
    ) -> Result<Self, CertError> {
        let regular = std::fs::read(regular)?;
        let bold = bold.map(std::fs::read).transpose()?;
        Self::from_bytes(regular, bold)
    }

    fn face(&self, bold: bool) -> &FontArc {
        if bold {
            self.bold.as_ref().unwrap_or(&self.regular)
        } else {
            &self.regular
        }
    }

    /// Rasterize one character at the given baseline origin.
    ///
    /// `plot(x, y, coverage)` receives canvas coordinates and anti-aliased
    /// coverage in `0.0..=1.0`; bounds checking is the caller's job.
    pub fn draw_char(
        &self,
        ch: char,
        px: f32,
        bold: bool,
        origin: Point,
        mut plot: impl FnMut(i32, i32, f32),
    ) {
        let font = self.face(bold);
        let glyph = font.glyph_id(ch).with_scale_and_position(px, origin);
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                plot(
                    gx as i32 + bounds.min.x as i32,
                    gy as i32 + bounds.min.y as i32,
                    coverage,
                );
            });
        }
    }
}

impl CharMetrics for LoadedFont {
    fn advance(&self, ch: char, px: f32, bold: bool) -> f32 {
        let font = self.face(bold);
        let scaled = font.as_scaled(px);
        scaled.h_advance(font.glyph_id(ch))
    }

    fn line_height(&self, px: f32) -> f32 {
        let scaled = self.face(false).as_scaled(px);
        scaled.ascent() - scaled.descent() + scaled.line_gap()
    }

    fn ascent(&self, px: f32) -> f32 {
        self.face(false).as_scaled(px).ascent()
    }
}
