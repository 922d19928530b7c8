//! Text measurement seam
//!
//! Real glyph metrics belong to the host renderer; the layout only needs the
//! advance width of each segment.

/// Measures the advance width of a text segment in pixels
pub trait TextMeasure {
    fn measure(&self, text: &str) -> f32;
}

/// Width estimate from average glyph advances (20px sans-serif by default)
#[derive(Debug, Clone, Copy)]
pub struct AverageGlyphMeasure {
    pub glyph_advance: f32,
    pub space_advance: f32,
}

impl Default for AverageGlyphMeasure {
    fn default() -> Self {
        Self {
            glyph_advance: 10.0,
            space_advance: 5.5,
        }
    }
}

impl TextMeasure for AverageGlyphMeasure {
    fn measure(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| {
                if c.is_whitespace() {
                    self.space_advance
                } else {
                    self.glyph_advance
                }
            })
            .sum()
    }
}
