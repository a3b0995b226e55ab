// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Documentation-comment structure.
//!
//! The host tokenizer splits a doc comment into opener, stars, tags,
//! payload strings, and closer, and records the tag pointers on the
//! opener. [`Comment::fetch`] reassembles that into per-tag payloads: each
//! tag owns the payload strings up to the next tag (continuation lines
//! included, joined with newlines), along with the token pointers needed
//! to apply fixes back onto the host file.

use std::collections::HashMap;

use ecow::EcoString;

use crate::host::{HostToken, TokenCode};

/// One occurrence of a tag inside a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOccurrence {
    /// Pointer of the tag token itself.
    pub ptr: usize,
    /// The tag's payload: its lines joined with `\n`.
    pub content: EcoString,
    /// Pointer of the first payload token, if any.
    pub c_start: Option<usize>,
    /// Pointer of the last payload token, if any.
    pub c_end: Option<usize>,
}

/// A doc comment, grouped by tag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    /// Pointer of the comment opener.
    pub ptr: usize,
    /// Tag name (`@param`, …) → occurrences in source order.
    pub tags: HashMap<EcoString, Vec<TagOccurrence>>,
}

impl Comment {
    /// Builds the tag map for the doc comment opening at `ptr`.
    #[must_use]
    pub fn fetch(tokens: &[HostToken], ptr: usize) -> Self {
        let opener = &tokens[ptr];
        let closer = opener.comment_closer.unwrap_or(tokens.len());
        let mut tags: HashMap<EcoString, Vec<TagOccurrence>> = HashMap::new();

        let tag_ptrs = &opener.comment_tags;
        for (index, &tag_ptr) in tag_ptrs.iter().enumerate() {
            let end = tag_ptrs.get(index + 1).copied().unwrap_or(closer);
            let mut content = EcoString::new();
            let mut c_start = None;
            let mut c_end = None;
            for (offset, token) in tokens[tag_ptr + 1..end.min(tokens.len())].iter().enumerate() {
                if token.code == TokenCode::DocCommentString {
                    if c_start.is_some() {
                        content.push('\n');
                    }
                    content.push_str(token.content.trim_end());
                    let p = tag_ptr + 1 + offset;
                    c_start.get_or_insert(p);
                    c_end = Some(p);
                }
            }
            let name = tokens[tag_ptr].content.clone();
            tags.entry(name).or_default().push(TagOccurrence {
                ptr: tag_ptr,
                content,
                c_start,
                c_end,
            });
        }

        Self { ptr, tags }
    }

    /// The occurrences of one tag, in source order.
    #[must_use]
    pub fn occurrences(&self, tag: &str) -> &[TagOccurrence] {
        self.tags.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Whether the comment contains the tag at all.
    #[must_use]
    pub fn has(&self, tag: &str) -> bool {
        !self.occurrences(tag).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_tokens() -> Vec<HostToken> {
        // /** @param int $x the count
        //  *     over two lines
        //  * @return bool
        //  */
        let mut opener = HostToken::new(TokenCode::DocCommentOpen, "/**");
        opener.comment_tags = vec![1, 5];
        opener.comment_closer = Some(7);
        vec![
            opener,
            HostToken::new(TokenCode::DocCommentTag, "@param"),
            HostToken::new(TokenCode::DocCommentString, "int $x the count"),
            HostToken::new(TokenCode::DocCommentStar, "*"),
            HostToken::new(TokenCode::DocCommentString, "over two lines"),
            HostToken::new(TokenCode::DocCommentTag, "@return"),
            HostToken::new(TokenCode::DocCommentString, "bool"),
            HostToken::new(TokenCode::DocCommentClose, "*/"),
        ]
    }

    #[test]
    fn tags_own_their_payload() {
        let tokens = doc_tokens();
        let comment = Comment::fetch(&tokens, 0);
        let params = comment.occurrences("@param");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].content, "int $x the count\nover two lines");
        assert_eq!(params[0].c_start, Some(2));
        assert_eq!(params[0].c_end, Some(4));

        let returns = comment.occurrences("@return");
        assert_eq!(returns.len(), 1);
        assert_eq!(returns[0].content, "bool");
        assert_eq!(returns[0].ptr, 5);
    }

    #[test]
    fn missing_tags_are_empty() {
        let tokens = doc_tokens();
        let comment = Comment::fetch(&tokens, 0);
        assert!(comment.occurrences("@var").is_empty());
        assert!(!comment.has("@var"));
        assert!(comment.has("@param"));
    }

    #[test]
    fn tag_without_payload_has_empty_content() {
        let mut opener = HostToken::new(TokenCode::DocCommentOpen, "/**");
        opener.comment_tags = vec![1];
        opener.comment_closer = Some(2);
        let tokens = vec![
            opener,
            HostToken::new(TokenCode::DocCommentTag, "@return"),
            HostToken::new(TokenCode::DocCommentClose, "*/"),
        ];
        let comment = Comment::fetch(&tokens, 0);
        let returns = comment.occurrences("@return");
        assert_eq!(returns[0].content, "");
        assert_eq!(returns[0].c_start, None);
    }
}
