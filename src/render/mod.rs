//! Compositor: draws a template background plus resolved, bound text onto
//! a raster surface and encodes the result as a downloadable PNG.
//!
//! Placeholder geometry lives in design units (the 800×566 editor canvas)
//! and is scaled onto the output raster (1240×874 for landscape A4 at
//! ~150 DPI). Paragraph blocks are specified directly in output pixels.
//!
//! Known limitation, kept on purpose: text that exceeds its placeholder
//! box is not clipped.

pub mod flow;
pub mod font;

use std::io::Cursor;

use ab_glyph::point;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use rand::{Rng, distr::Alphanumeric};

use crate::assets::BackgroundStore;
use crate::error::CertError;
use crate::model::{Align, Orientation, Placeholder, Recipient, Template};
use crate::registry::TemplateRegistry;
use crate::{binding, layout};

use flow::{Paragraph, StyledRun};
use font::{CharMetrics, LoadedFont};

/// Editor canvas width in design units.
pub const DESIGN_WIDTH: f32 = 800.0;
/// Editor canvas height in design units.
pub const DESIGN_HEIGHT: f32 = 566.0;
/// Output raster width (landscape).
pub const OUTPUT_WIDTH: u32 = 1240;
/// Output raster height (landscape).
pub const OUTPUT_HEIGHT: u32 = 874;

/// A resolved placeholder together with its bound text.
#[derive(Debug, Clone)]
pub struct BoundText {
    pub placeholder: Placeholder,
    pub text: String,
}

/// A flowed paragraph anchored at an output-pixel origin.
#[derive(Debug, Clone)]
pub struct ParagraphBlock {
    pub paragraph: Paragraph,
    /// Left margin of the flow, output pixels.
    pub x: f32,
    /// First baseline, output pixels.
    pub y: f32,
}

/// An encoded certificate image plus its randomized download filename.
pub struct RenderedCertificate {
    pub file_name: String,
    pub png: Vec<u8>,
}

/// Draws certificates. Holds the loaded font faces; everything else comes
/// in per render call.
pub struct Compositor {
    font: LoadedFont,
}

impl Compositor {
    pub fn new(font: LoadedFont) -> Self {
        Self { font }
    }

    /// Composite one certificate.
    ///
    /// The background is stretched to fill the canvas; when absent, the
    /// fallback frame (white fill, red outer border, gold inner rule) is
    /// drawn instead. Each bound text is drawn single-line, anchored per
    /// its alignment, baseline at box-top plus the font ascent. Overflow
    /// is not clipped.
    pub fn render(
        &self,
        template: &Template,
        background: Option<&DynamicImage>,
        texts: &[BoundText],
        paragraphs: &[ParagraphBlock],
    ) -> Result<RenderedCertificate, CertError> {
        let (out_w, out_h, design_w, design_h) = match template.orientation {
            Orientation::LandscapeA4 => (OUTPUT_WIDTH, OUTPUT_HEIGHT, DESIGN_WIDTH, DESIGN_HEIGHT),
            Orientation::PortraitA4 => (OUTPUT_HEIGHT, OUTPUT_WIDTH, DESIGN_HEIGHT, DESIGN_WIDTH),
        };

        let mut canvas = match background {
            Some(img) => img.resize_exact(out_w, out_h, FilterType::Lanczos3).to_rgba8(),
            None => fallback_background(out_w, out_h),
        };

        let sx = out_w as f32 / design_w;
        let sy = out_h as f32 / design_h;

        for item in texts {
            let p = &item.placeholder;
            let px = p.font_size * sx;
            let color = parse_color(&p.color)?;
            let width = flow::line_width(&item.text, px, false, &self.font);
            let x = anchor_x(p, sx, width);
            let baseline = p.y * sy + self.font.ascent(px);
            self.draw_line(&mut canvas, &item.text, px, false, color, x, baseline);
        }

        for block in paragraphs {
            let colors = block
                .paragraph
                .runs
                .iter()
                .map(|r| parse_color(&r.color))
                .collect::<Result<Vec<_>, _>>()?;
            let placed = flow::flow_paragraph(&block.paragraph, &self.font, block.x, block.y);
            for c in placed {
                let run = &block.paragraph.runs[c.run];
                self.font.draw_char(
                    c.ch,
                    block.paragraph.font_px,
                    run.bold,
                    point(c.x, c.y),
                    |gx, gy, cov| blend_pixel(&mut canvas, gx, gy, colors[c.run], cov),
                );
            }
        }

        Ok(RenderedCertificate {
            file_name: random_file_name(),
            png: encode_png(canvas)?,
        })
    }

    fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        px: f32,
        bold: bool,
        color: Rgba<u8>,
        mut x: f32,
        baseline: f32,
    ) {
        for ch in text.chars() {
            self.font
                .draw_char(ch, px, bold, point(x, baseline), |gx, gy, cov| {
                    blend_pixel(canvas, gx, gy, color, cov)
                });
            x += self.font.advance(ch, px, bold);
        }
    }
}

/// Resolve, bind, and render one recipient's certificate.
///
/// This is the full merge pipeline: registry schema + recipient overrides →
/// resolved placeholders → bound texts → composite, with the award sentence
/// paragraph on top. A missing or unloadable background falls back to the
/// fallback frame rather than failing the render.
pub async fn render_recipient(
    compositor: &Compositor,
    registry: &TemplateRegistry,
    backgrounds: &BackgroundStore,
    recipient: &Recipient,
) -> Result<RenderedCertificate, CertError> {
    let template = registry.template_for(recipient)?;
    let resolved = layout::resolve(registry.schema(&template.code), &recipient.overrides);

    let texts: Vec<BoundText> = resolved
        .into_iter()
        .map(|placeholder| {
            let text = binding::bind(&placeholder.key, recipient, |id| registry.org_name(id));
            BoundText { placeholder, text }
        })
        .collect();

    let background = match backgrounds.load(&template.background_image).await {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::warn!(
                "background unavailable for template {}: {}",
                template.code,
                e
            );
            None
        }
    };

    let sentence = award_sentence(&recipient.award_title);
    compositor.render(
        template,
        background.as_ref(),
        &texts,
        std::slice::from_ref(&sentence),
    )
}

/// The composite award sentence: gray body text with the award title as a
/// red bold run, flowed through one paragraph.
pub fn award_sentence(award_title: &str) -> ParagraphBlock {
    ParagraphBlock {
        x: 180.0,
        y: 480.0,
        paragraph: Paragraph {
            runs: vec![
                StyledRun {
                    text: "在2024年度“卓越创新奖”评选活动中表现优异，荣获 ".into(),
                    color: "#475569".into(),
                    bold: false,
                },
                StyledRun {
                    text: award_title.into(),
                    color: "#d32f2f".into(),
                    bold: true,
                },
                StyledRun {
                    text: "，特发此证，以资鼓励。".into(),
                    color: "#475569".into(),
                    bold: false,
                },
            ],
            font_px: 30.0,
            line_height: 50.0,
            max_width: 880.0,
        },
    }
}

/// Horizontal pen position for a single-line placeholder text: the text's
/// anchor sits at the box's left edge, center, or right edge.
pub fn anchor_x(p: &Placeholder, sx: f32, text_width: f32) -> f32 {
    match p.align {
        Align::Left => p.x * sx,
        Align::Center => (p.x + p.width / 2.0) * sx - text_width / 2.0,
        Align::Right => (p.x + p.width) * sx - text_width,
    }
}

/// Parse a `#rrggbb` hex color.
pub fn parse_color(color: &str) -> Result<Rgba<u8>, CertError> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CertError::Render(format!("invalid color {:?}", color)));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| CertError::Render(format!("invalid color {:?}", color)))
    };
    Ok(Rgba([channel(0..2)?, channel(2..4)?, channel(4..6)?, 255]))
}

/// Download filename: fixed prefix plus a random alphanumeric token, so
/// generated certificate URLs are not guessable.
pub fn random_file_name() -> String {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("CERT_{}.png", token)
}

/// White canvas with the fallback certificate frame: red outer border,
/// gold inner rule.
fn fallback_background(w: u32, h: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
    let (w, h) = (w as i32, h as i32);
    stroke_rect(&mut canvas, 40, 40, w - 40, h - 40, 20, Rgba([211, 47, 47, 255]));
    stroke_rect(&mut canvas, 60, 60, w - 60, h - 60, 4, Rgba([255, 179, 0, 255]));
    canvas
}

/// Stroke a rectangle outline centered on its edges, canvas-style.
fn stroke_rect(canvas: &mut RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32, thickness: i32, color: Rgba<u8>) {
    let half = thickness / 2;
    fill_rect(canvas, x0 - half, y0 - half, x1 + half, y0 + half, color);
    fill_rect(canvas, x0 - half, y1 - half, x1 + half, y1 + half, color);
    fill_rect(canvas, x0 - half, y0 - half, x0 + half, y1 + half, color);
    fill_rect(canvas, x1 - half, y0 - half, x1 + half, y1 + half, color);
}

fn fill_rect(canvas: &mut RgbaImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba<u8>) {
    let (w, h) = (canvas.width() as i32, canvas.height() as i32);
    for y in y0.max(0)..y1.min(h) {
        for x in x0.max(0)..x1.min(w) {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Alpha-blend anti-aliased glyph coverage over the canvas.
fn blend_pixel(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    let cov = coverage.clamp(0.0, 1.0);
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    for i in 0..3 {
        let d = dst[i] as f32;
        dst[i] = (d + (color[i] as f32 - d) * cov).round() as u8;
    }
    dst[3] = 255;
}

fn encode_png(canvas: RgbaImage) -> Result<Vec<u8>, CertError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| CertError::Render(format!("PNG encode failed: {}", e)))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(align: Align) -> Placeholder {
        Placeholder {
            id: "p1".into(),
            key: "recipient_name".into(),
            label: "获奖人姓名".into(),
            x: 400.0,
            y: 350.0,
            width: 300.0,
            height: 60.0,
            font_size: 48.0,
            color: "#333333".into(),
            align,
        }
    }

    #[test]
    fn parse_color_accepts_hex() {
        assert_eq!(parse_color("#d32f2f").unwrap(), Rgba([211, 47, 47, 255]));
        assert_eq!(parse_color("#333333").unwrap(), Rgba([51, 51, 51, 255]));
    }

    #[test]
    fn parse_color_rejects_garbage() {
        assert!(parse_color("red").is_err());
        assert!(parse_color("#33").is_err());
        assert!(parse_color("#3333zz").is_err());
    }

    #[test]
    fn anchor_positions_match_alignment() {
        let sx = OUTPUT_WIDTH as f32 / DESIGN_WIDTH;
        let text_width = 200.0;

        assert_eq!(anchor_x(&placeholder(Align::Left), sx, text_width), 400.0 * sx);
        assert_eq!(
            anchor_x(&placeholder(Align::Center), sx, text_width),
            550.0 * sx - 100.0
        );
        assert_eq!(
            anchor_x(&placeholder(Align::Right), sx, text_width),
            700.0 * sx - 200.0
        );
    }

    #[test]
    fn file_names_are_prefixed_and_randomized() {
        let name = random_file_name();
        assert!(name.starts_with("CERT_"));
        assert!(name.ends_with(".png"));
        let token = &name[5..name.len() - 4];
        assert_eq!(token.chars().count(), 6);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(!token.chars().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn fallback_frame_has_red_border_on_white() {
        let canvas = fallback_background(OUTPUT_WIDTH, OUTPUT_HEIGHT);
        // Inside the red band (x in [30, 50))
        assert_eq!(*canvas.get_pixel(45, 437), Rgba([211, 47, 47, 255]));
        // Inside the gold band (x in [58, 62))
        assert_eq!(*canvas.get_pixel(59, 437), Rgba([255, 179, 0, 255]));
        // Interior stays white
        assert_eq!(*canvas.get_pixel(620, 437), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn award_sentence_highlights_the_award_run() {
        let block = award_sentence("中国民族民间舞");
        assert_eq!(block.paragraph.runs.len(), 3);
        let award = &block.paragraph.runs[1];
        assert_eq!(award.text, "中国民族民间舞");
        assert!(award.bold);
        assert_eq!(award.color, "#d32f2f");
    }
}
