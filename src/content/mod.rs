//! Content module - post models, rich text and reading time

mod post;
pub mod reading_time;
pub mod richtext;

pub use post::{Banner, ContentSection, PostDetail, PostPagination, PostSummary};
pub use reading_time::{count_words, reading_time, DEFAULT_WORDS_PER_MINUTE};
pub use richtext::{as_html, RichText, RichTextBlock, TextBlock};
