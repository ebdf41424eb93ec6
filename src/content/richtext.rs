//! Structured text (Prismic rich text) model and HTML serializer

use serde::{Deserialize, Serialize};

use crate::helpers::{html_escape, text_to_html};

/// A rich text field: an ordered list of blocks
pub type RichText = Vec<RichTextBlock>;

/// One block of a rich text field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RichTextBlock {
    #[serde(rename = "heading1")]
    Heading1(TextBlock),
    #[serde(rename = "heading2")]
    Heading2(TextBlock),
    #[serde(rename = "heading3")]
    Heading3(TextBlock),
    #[serde(rename = "heading4")]
    Heading4(TextBlock),
    #[serde(rename = "heading5")]
    Heading5(TextBlock),
    #[serde(rename = "heading6")]
    Heading6(TextBlock),
    #[serde(rename = "paragraph")]
    Paragraph(TextBlock),
    #[serde(rename = "preformatted")]
    Preformatted(TextBlock),
    #[serde(rename = "list-item")]
    ListItem(TextBlock),
    #[serde(rename = "o-list-item")]
    OListItem(TextBlock),
    #[serde(rename = "image")]
    Image(ImageBlock),
    #[serde(rename = "embed")]
    Embed(EmbedBlock),
    #[serde(other)]
    Unsupported,
}

impl RichTextBlock {
    /// Plain text of text-bearing blocks
    pub fn text(&self) -> Option<&str> {
        self.text_block().map(|b| b.text.as_str())
    }

    fn text_block(&self) -> Option<&TextBlock> {
        match self {
            RichTextBlock::Heading1(b)
            | RichTextBlock::Heading2(b)
            | RichTextBlock::Heading3(b)
            | RichTextBlock::Heading4(b)
            | RichTextBlock::Heading5(b)
            | RichTextBlock::Heading6(b)
            | RichTextBlock::Paragraph(b)
            | RichTextBlock::Preformatted(b)
            | RichTextBlock::ListItem(b)
            | RichTextBlock::OListItem(b) => Some(b),
            RichTextBlock::Image(_) | RichTextBlock::Embed(_) | RichTextBlock::Unsupported => None,
        }
    }

    /// Shorthand for a paragraph without spans
    pub fn paragraph(text: impl Into<String>) -> Self {
        RichTextBlock::Paragraph(TextBlock::plain(text))
    }
}

/// Text with inline spans
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TextBlock {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
            label: None,
        }
    }
}

/// Inline markup over `[start, end)`, offsets in UTF-16 code units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageBlock {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(rename = "linkTo", default, skip_serializing_if = "Option::is_none")]
    pub link_to: Option<SpanData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedBlock {
    pub oembed: OEmbed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OEmbed {
    #[serde(default)]
    pub embed_url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

/// Serialize a rich text field to HTML, keeping block order
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list = match block {
            RichTextBlock::ListItem(_) => Some("ul"),
            RichTextBlock::OListItem(_) => Some("ol"),
            _ => None,
        };

        if open_list != list {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list;
        }

        match block {
            RichTextBlock::Heading1(b) => push_text_block(&mut html, "h1", b),
            RichTextBlock::Heading2(b) => push_text_block(&mut html, "h2", b),
            RichTextBlock::Heading3(b) => push_text_block(&mut html, "h3", b),
            RichTextBlock::Heading4(b) => push_text_block(&mut html, "h4", b),
            RichTextBlock::Heading5(b) => push_text_block(&mut html, "h5", b),
            RichTextBlock::Heading6(b) => push_text_block(&mut html, "h6", b),
            RichTextBlock::Paragraph(b) => push_text_block(&mut html, "p", b),
            RichTextBlock::Preformatted(b) => push_text_block(&mut html, "pre", b),
            RichTextBlock::ListItem(b) | RichTextBlock::OListItem(b) => {
                push_text_block(&mut html, "li", b)
            }
            RichTextBlock::Image(image) => push_image(&mut html, image),
            RichTextBlock::Embed(embed) => push_embed(&mut html, &embed.oembed),
            RichTextBlock::Unsupported => {
                tracing::debug!("Skipping unsupported rich text block");
            }
        }
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn push_text_block(html: &mut String, tag: &str, block: &TextBlock) {
    match &block.label {
        Some(label) => html.push_str(&format!(r#"<{} class="{}">"#, tag, html_escape(label))),
        None => html.push_str(&format!("<{}>", tag)),
    }
    html.push_str(&serialize_spans(&block.text, &block.spans));
    html.push_str(&format!("</{}>", tag));
}

fn push_image(html: &mut String, image: &ImageBlock) {
    let mut img = format!(
        r#"<img src="{}" alt="{}""#,
        html_escape(&image.url),
        html_escape(image.alt.as_deref().unwrap_or(""))
    );
    if let Some(copyright) = &image.copyright {
        img.push_str(&format!(r#" copyright="{}""#, html_escape(copyright)));
    }
    img.push_str(" />");

    html.push_str(r#"<p class="block-img">"#);
    match image.link_to.as_ref().and_then(|l| l.url.as_deref()) {
        Some(url) => html.push_str(&format!(r#"<a href="{}">{}</a>"#, html_escape(url), img)),
        None => html.push_str(&img),
    }
    html.push_str("</p>");
}

fn push_embed(html: &mut String, oembed: &OEmbed) {
    html.push_str(&format!(
        r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">"#,
        html_escape(&oembed.embed_url),
        html_escape(&oembed.kind),
        html_escape(&oembed.provider_name.as_deref().unwrap_or("").to_lowercase())
    ));
    // Provider markup is trusted content from the repository
    html.push_str(oembed.html.as_deref().unwrap_or(""));
    html.push_str("</div>");
}

fn open_tag(span: &Span) -> String {
    let data = span.data.clone().unwrap_or_default();
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => {
            let href = html_escape(data.url.as_deref().unwrap_or(""));
            match data.target {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    href,
                    html_escape(&target)
                ),
                None => format!(r#"<a href="{}">"#, href),
            }
        }
        SpanKind::Label => format!(
            r#"<span class="{}">"#,
            html_escape(data.label.as_deref().unwrap_or(""))
        ),
        SpanKind::Unsupported => String::new(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label => "</span>",
        SpanKind::Unsupported => "",
    }
}

/// Render text with spans, splitting overlapping spans so tags always nest
fn serialize_spans(text: &str, spans: &[Span]) -> String {
    // byte_at[i] is the byte offset of UTF-16 position i
    let mut byte_at = Vec::with_capacity(text.len() + 1);
    for (offset, c) in text.char_indices() {
        for _ in 0..c.len_utf16() {
            byte_at.push(offset);
        }
    }
    byte_at.push(text.len());
    let len16 = byte_at.len() - 1;

    // Outer spans first: earlier start, then longer
    let mut ordered: Vec<&Span> = spans
        .iter()
        .filter(|s| s.start < s.end && s.start < len16)
        .collect();
    ordered.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut bounds: Vec<usize> = vec![0, len16];
    for span in &ordered {
        bounds.push(span.start);
        bounds.push(span.end.min(len16));
    }
    bounds.sort_unstable();
    bounds.dedup();

    let mut html = String::with_capacity(text.len());
    let mut stack: Vec<usize> = Vec::new();

    for window in bounds.windows(2) {
        let (from, to) = (window[0], window[1]);
        let active: Vec<usize> = ordered
            .iter()
            .enumerate()
            .filter(|(_, s)| s.start <= from && s.end >= to)
            .map(|(i, _)| i)
            .collect();

        let common = stack
            .iter()
            .zip(active.iter())
            .take_while(|(a, b)| a == b)
            .count();

        while stack.len() > common {
            if let Some(i) = stack.pop() {
                html.push_str(close_tag(ordered[i]));
            }
        }
        for &i in &active[common..] {
            html.push_str(&open_tag(ordered[i]));
            stack.push(i);
        }

        html.push_str(&text_to_html(&text[byte_at[from]..byte_at[to]]));
    }

    while let Some(i) = stack.pop() {
        html.push_str(close_tag(ordered[i]));
    }

    html
}
