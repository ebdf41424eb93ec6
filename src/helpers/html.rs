//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape text content and turn line breaks into `<br />`
pub fn text_to_html(s: &str) -> String {
    html_escape(s).replace('\n', "<br />")
}
