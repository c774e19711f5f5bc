//! Styled-run paragraph flow with per-character greedy line wrapping.
//!
//! A paragraph is an ordered list of styled runs sharing one text flow: a
//! cursor advances character by character, and wraps to the next line just
//! before the first character whose placement would exceed the paragraph's
//! `max_width`. Wrapping is per-character rather than per-word because the
//! target text is CJK, where words are not whitespace-delimited.

use std::collections::HashMap;

use super::font::CharMetrics;

/// One styled span of a paragraph.
#[derive(Debug, Clone)]
pub struct StyledRun {
    pub text: String,
    /// `#rrggbb` hex color.
    pub color: String,
    pub bold: bool,
}

/// A multi-run paragraph with its flow bounds, in output pixels.
#[derive(Debug, Clone)]
pub struct Paragraph {
    pub runs: Vec<StyledRun>,
    pub font_px: f32,
    pub line_height: f32,
    pub max_width: f32,
}

/// A character placed by the flow: position plus the run it came from
/// (for color/weight selection when drawing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedChar {
    pub ch: char,
    pub run: usize,
    pub x: f32,
    pub y: f32,
}

/// Flow a paragraph starting at `(left, baseline)`.
///
/// The cursor starts at the left margin; each character is measured, wrapped
/// if `cursor.x + advance` would exceed `left + max_width`, then placed and
/// the cursor advanced. Advances are memoized per `(char, bold)` so repeated
/// characters are measured once per call.
pub fn flow_paragraph(
    paragraph: &Paragraph,
    metrics: &dyn CharMetrics,
    left: f32,
    baseline: f32,
) -> Vec<PlacedChar> {
    let mut widths: HashMap<(char, bool), f32> = HashMap::new();
    let mut placed = Vec::new();
    let mut x = left;
    let mut y = baseline;

    for (run_idx, run) in paragraph.runs.iter().enumerate() {
        for ch in run.text.chars() {
            let w = *widths
                .entry((ch, run.bold))
                .or_insert_with(|| metrics.advance(ch, paragraph.font_px, run.bold));
            if x + w > left + paragraph.max_width {
                x = left;
                y += paragraph.line_height;
            }
            placed.push(PlacedChar {
                ch,
                run: run_idx,
                x,
                y,
            });
            x += w;
        }
    }

    placed
}

/// Total advance of a single-style line of text.
pub fn line_width(text: &str, px: f32, bold: bool, metrics: &dyn CharMetrics) -> f32 {
    text.chars().map(|ch| metrics.advance(ch, px, bold)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is `width` wide; enough for wrap-contract tests.
    struct FixedMetrics {
        width: f32,
    }

    impl CharMetrics for FixedMetrics {
        fn advance(&self, _ch: char, _px: f32, _bold: bool) -> f32 {
            self.width
        }
        fn line_height(&self, px: f32) -> f32 {
            px * 1.2
        }
        fn ascent(&self, px: f32) -> f32 {
            px * 0.8
        }
    }

    fn run(text: &str, bold: bool) -> StyledRun {
        StyledRun {
            text: text.into(),
            color: "#475569".into(),
            bold,
        }
    }

    #[test]
    fn wraps_before_first_overflowing_char() {
        // 10px chars, 35px bound: 3 chars fit, the 4th would end at 40 > 35
        let para = Paragraph {
            runs: vec![run("甲乙丙丁戊", false)],
            font_px: 30.0,
            line_height: 50.0,
            max_width: 35.0,
        };
        let placed = flow_paragraph(&para, &FixedMetrics { width: 10.0 }, 0.0, 100.0);

        assert_eq!(placed[0].x, 0.0);
        assert_eq!(placed[1].x, 10.0);
        assert_eq!(placed[2].x, 20.0);
        // 丁 wraps: back to the left margin, one line down
        assert_eq!(placed[3].x, 0.0);
        assert_eq!(placed[3].y, 150.0);
        assert_eq!(placed[4].x, 10.0);
    }

    #[test]
    fn no_line_exceeds_max_width() {
        let para = Paragraph {
            runs: vec![run("在评选活动中表现优异荣获金奖特发此证", false)],
            font_px: 30.0,
            line_height: 50.0,
            max_width: 72.0,
        };
        let width = 10.0;
        let placed = flow_paragraph(&para, &FixedMetrics { width }, 5.0, 0.0);

        for c in &placed {
            assert!(
                c.x + width <= 5.0 + 72.0,
                "char at x={} overflows the bound",
                c.x
            );
        }
    }

    #[test]
    fn runs_share_one_flow() {
        // Second run continues mid-line instead of restarting
        let para = Paragraph {
            runs: vec![run("甲乙", false), run("丙丁", true)],
            font_px: 30.0,
            line_height: 50.0,
            max_width: 100.0,
        };
        let placed = flow_paragraph(&para, &FixedMetrics { width: 10.0 }, 0.0, 0.0);

        assert_eq!(placed[2].x, 20.0);
        assert_eq!(placed[2].run, 1);
        assert_eq!(placed[2].y, 0.0);
    }

    #[test]
    fn exact_fit_does_not_wrap() {
        // 3 chars of 10px exactly fill a 30px bound
        let para = Paragraph {
            runs: vec![run("甲乙丙", false)],
            font_px: 30.0,
            line_height: 50.0,
            max_width: 30.0,
        };
        let placed = flow_paragraph(&para, &FixedMetrics { width: 10.0 }, 0.0, 0.0);
        assert!(placed.iter().all(|c| c.y == 0.0));
    }

    #[test]
    fn line_width_sums_advances() {
        let m = FixedMetrics { width: 12.0 };
        assert_eq!(line_width("陈小舞", 48.0, false, &m), 36.0);
        assert_eq!(line_width("", 48.0, false, &m), 0.0);
    }
}
