//! Reading-time estimate

use super::PostDetail;

/// Assumed reading speed
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Count the tokens of a post.
///
/// Body text is split on single spaces, so an empty text still counts as one
/// piece. Headings contribute one token per UTF-16 code unit, not per word.
pub fn count_words(post: &PostDetail) -> usize {
    post.content
        .iter()
        .map(|section| {
            let body: usize = section
                .body
                .iter()
                .filter_map(|block| block.text())
                .map(|text| text.split(' ').count())
                .sum();
            body + section.heading.encode_utf16().count()
        })
        .sum()
}

/// Minutes needed to read a post, rounded up
pub fn reading_time(post: &PostDetail, words_per_minute: usize) -> usize {
    count_words(post).div_ceil(words_per_minute.max(1))
}
