//! Text measurement and line breaking
//!
//! Widths are approximated from Helvetica character classes rather than
//! real font metrics; the standard-14 faces ship no metrics with the
//! document and the report layout tolerates a few percent of error.

/// Approximate advance width of one character, in em units
fn char_width_em(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '!' | '\'' | '|' | '.' | ',' | ':' | ';' => 0.28,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | '/' | '\\' => 0.33,
        ' ' => 0.278,
        'm' | 'M' | 'W' => 0.89,
        'w' => 0.72,
        'A'..='Z' => 0.70,
        '0'..='9' => 0.556,
        _ => 0.53,
    }
}

/// Approximate rendered width of a string at the given font size
pub fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().map(char_width_em).sum::<f64>() * font_size
}

/// Baseline offset from the top of a line
pub fn baseline_offset(font_size: f64) -> f64 {
    font_size * 0.8
}

/// Word-wrapping line breaker
pub struct LineBreaker {
    max_width: f64,
}

impl LineBreaker {
    pub fn new(max_width: f64) -> Self {
        Self { max_width }
    }

    /// Break text into lines on whitespace
    ///
    /// A word wider than the full line is placed on its own line rather
    /// than split; the renderer clips, never panics. Empty input yields
    /// a single empty line so headers always occupy vertical space.
    pub fn break_text(&self, text: &str, font_size: f64) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0;
        let space = text_width(" ", font_size);

        for word in text.split_whitespace() {
            let word_width = text_width(word, font_size);
            let needed = if current.is_empty() {
                word_width
            } else {
                current_width + space + word_width
            };

            if needed <= self.max_width || current.is_empty() {
                if !current.is_empty() {
                    current.push(' ');
                    current_width += space;
                }
                current.push_str(word);
                current_width += word_width;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_width;
            }
        }

        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }
}
