use crate::Summary;

/// Render a summary as plain text (title line, then the summary body)
pub fn render_text(summary: &Summary) -> String {
    if summary.title.is_empty() {
        summary.summary.clone()
    } else {
        format!("{}\n\n{}", summary.title, summary.summary)
    }
}

/// Render a summary as pretty-printed JSON
pub fn render_json(summary: &Summary) -> String {
    serde_json::to_string_pretty(summary).unwrap_or_default()
}
