//! Pagination of text blocks onto slides.
//!
//! Blocks of one PDF page are stacked top-down in fixed-height boxes. A new
//! slide is started when the next box would cross the bottom margin or the
//! slide already holds `max_boxes_per_slide` boxes. Slides never mix blocks
//! from different PDF pages, and a page without blocks yields no slide.

use crate::config::LayoutConfig;
use crate::pipeline::extract::PageText;
use tracing::debug;

/// A positioned text box. All lengths are EMU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBox {
    pub x: u64,
    pub y: u64,
    pub width: u64,
    pub height: u64,
    pub text: String,
}

/// One output slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// The PDF page the boxes came from (1-indexed).
    pub source_page: u32,
    pub boxes: Vec<TextBox>,
}

/// Lay out every page's blocks onto slides, in page order.
pub fn paginate(pages: &[PageText], layout: &LayoutConfig) -> Vec<Slide> {
    let mut slides = Vec::new();
    for page in pages {
        let before = slides.len();
        paginate_page(page, layout, &mut slides);
        debug!(
            "Page {}: {} blocks → {} slides",
            page.page_number,
            page.blocks.len(),
            slides.len() - before
        );
    }
    slides
}

fn paginate_page(page: &PageText, layout: &LayoutConfig, slides: &mut Vec<Slide>) {
    let bottom = layout.slide_height.saturating_sub(layout.margin_top);
    let mut blocks = page.blocks.iter().peekable();

    while blocks.peek().is_some() {
        let mut slide = Slide {
            source_page: page.page_number,
            boxes: Vec::new(),
        };
        let mut y = layout.margin_top;

        while let Some(text) = blocks.peek() {
            let full = slide.boxes.len() >= layout.max_boxes_per_slide;
            // An empty slide always takes one box so pagination makes progress.
            let overflows = !slide.boxes.is_empty() && y + layout.box_height > bottom;
            if full || overflows {
                break;
            }
            slide.boxes.push(TextBox {
                x: layout.margin_left,
                y,
                width: layout.box_width(),
                height: layout.box_height,
                text: (*text).clone(),
            });
            y += layout.box_height + layout.box_spacing;
            blocks.next();
        }

        slides.push(slide);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page_number: u32, n: usize) -> PageText {
        PageText {
            page_number,
            blocks: (0..n).map(|i| format!("block {i}")).collect(),
        }
    }

    fn counts(slides: &[Slide]) -> Vec<usize> {
        slides.iter().map(|s| s.boxes.len()).collect()
    }

    #[test]
    fn default_geometry_fits_six_boxes() {
        let slides = paginate(&[page(1, 14)], &LayoutConfig::default());
        assert_eq!(counts(&slides), vec![6, 6, 2]);

        let last_on_first = &slides[0].boxes[5];
        assert_eq!(last_on_first.y, 508_000 + 5 * (762_000 + 254_000));
        assert!(last_on_first.y + last_on_first.height <= 6_858_000 - 508_000);
        assert_eq!(slides[1].boxes[0].text, "block 6");
    }

    #[test]
    fn box_cap_limits_slide_before_height_does() {
        let layout = LayoutConfig {
            max_boxes_per_slide: 2,
            ..LayoutConfig::default()
        };
        let slides = paginate(&[page(1, 5)], &layout);
        assert_eq!(counts(&slides), vec![2, 2, 1]);
    }

    #[test]
    fn pages_never_share_a_slide() {
        let slides = paginate(&[page(1, 1), page(2, 1)], &LayoutConfig::default());
        assert_eq!(counts(&slides), vec![1, 1]);
        assert_eq!(slides[0].source_page, 1);
        assert_eq!(slides[1].source_page, 2);
    }

    #[test]
    fn empty_pages_produce_no_slides() {
        let slides = paginate(&[page(1, 0), page(2, 3), page(3, 0)], &LayoutConfig::default());
        assert_eq!(counts(&slides), vec![3]);
        assert_eq!(slides[0].source_page, 2);
        assert!(paginate(&[], &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn boxes_span_slide_between_margins() {
        let layout = LayoutConfig::default();
        let slides = paginate(&[page(1, 1)], &layout);
        let b = &slides[0].boxes[0];
        assert_eq!(b.x, layout.margin_left);
        assert_eq!(b.y, layout.margin_top);
        assert_eq!(b.width, layout.slide_width - 2 * layout.margin_left);
        assert_eq!(b.height, layout.box_height);
    }

    #[test]
    fn oversized_box_still_makes_progress() {
        // Not reachable through validated config, but must not loop forever.
        let layout = LayoutConfig {
            box_height: 10_000_000,
            ..LayoutConfig::default()
        };
        let slides = paginate(&[page(1, 3)], &layout);
        assert_eq!(counts(&slides), vec![1, 1, 1]);
    }
}
