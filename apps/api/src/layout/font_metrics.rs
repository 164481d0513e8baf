//! Static font metrics and page geometry for PDF output.
//!
//! Character widths are in em units (relative to font size), taken from the
//! Helvetica AFM. The table covers ASCII 0x20..=0x7E (95 printable characters);
//! every other encodable character falls back to `average_char_width`.
//! Index = (char as usize) - 32.

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Layout parameters for the exported PDF. All lengths in points.
#[derive(Debug, Clone)]
pub struct PageConfig {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_left_pt: f32,
    pub margin_right_pt: f32,
    pub margin_top_pt: f32,
    /// A new page starts when the next line would cross this bottom margin.
    pub margin_bottom_pt: f32,
    pub font_size_pt: f32,
    pub line_height_pt: f32,
    /// Column width used by the first wrapping pass.
    pub wrap_columns: usize,
}

impl PageConfig {
    /// Printable width between the side margins.
    pub fn text_width_pt(&self) -> f32 {
        self.page_width_pt - self.margin_left_pt - self.margin_right_pt
    }

    /// Printable width in em units at the configured font size.
    pub fn text_width_em(&self) -> f32 {
        self.text_width_pt() / self.font_size_pt
    }

    /// Number of lines that fit between the top margin and the page-break margin.
    pub fn lines_per_page(&self) -> usize {
        let usable = self.page_height_pt - self.margin_top_pt - self.margin_bottom_pt;
        ((usable / self.line_height_pt).floor() as usize).max(1)
    }
}

/// A4 portrait, 10 mm side/top margins, page break 15 mm from the bottom,
/// Helvetica 12 pt on a 10 mm line, wrapped at 100 columns.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        page_width_pt: 210.0 * PT_PER_MM,
        page_height_pt: 297.0 * PT_PER_MM,
        margin_left_pt: 10.0 * PT_PER_MM,
        margin_right_pt: 10.0 * PT_PER_MM,
        margin_top_pt: 10.0 * PT_PER_MM,
        margin_bottom_pt: 15.0 * PT_PER_MM,
        font_size_pt: 12.0,
        line_height_pt: 10.0 * PT_PER_MM,
        wrap_columns: 100,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a base-14 font.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    /// PDF `BaseFont` name.
    pub base_font: &'static str,
    widths: [f32; 95],
    /// Fallback width for characters outside the ASCII table. Slightly wide on purpose
    /// so measured lines err toward wrapping early.
    pub average_char_width: f32,
}

impl FontMetricTable {
    /// Width of one character in em units.
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        }
    }
}

/// Helvetica: the PDF base-14 sans-serif. Widths from the Adobe AFM (1/1000 em).
pub static HELVETICA: FontMetricTable = FontMetricTable {
    base_font: "Helvetica",
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.667,
};
