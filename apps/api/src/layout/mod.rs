// PDF text layout: page geometry, font metrics, line wrapping, and font encoding.
// Pure and CPU-bound; callers run it inside tokio::task::spawn_blocking.

pub mod encoding;
pub mod font_metrics;
pub mod wrap;

pub use font_metrics::{default_page_config, FontMetricTable, PageConfig, HELVETICA};

/// Lays out `text` into printable lines.
///
/// Each input line is wrapped to `config.wrap_columns` (blank lines vanish),
/// stripped of characters the font cannot encode, and wrapped again to the
/// printed width. A piece that strips down to nothing stays as an empty line.
pub fn layout_lines(text: &str, metrics: &FontMetricTable, config: &PageConfig) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.split('\n') {
        for piece in wrap::wrap_columns(line, config.wrap_columns) {
            let safe = if encoding::is_encodable(&piece) {
                piece
            } else {
                encoding::strip_unencodable(&piece)
            };
            let fitted = wrap::wrap_to_width(&safe, metrics, config);
            if fitted.is_empty() {
                out.push(String::new());
            } else {
                out.extend(fitted);
            }
        }
    }
    out
}

/// Splits laid-out lines into pages.
pub fn paginate(lines: Vec<String>, config: &PageConfig) -> Vec<Vec<String>> {
    let per_page = config.lines_per_page();
    let mut pages: Vec<Vec<String>> = Vec::new();
    let mut iter = lines.into_iter().peekable();
    while iter.peek().is_some() {
        pages.push(iter.by_ref().take(per_page).collect());
    }
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    pages
}
