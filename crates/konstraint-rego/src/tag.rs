//! Tag tokenizer for header annotations.
//!
//! An annotation line looks like `@tag value value ...`. The tag must be the
//! first token on the line and match exactly (case-sensitive).

use crate::error::{AnnotationError, Result};

/// Split an annotation line into the values that follow `tag`.
///
/// Fails with [`AnnotationError::TagMismatch`] when the line does not start
/// with `tag` as a whole token, and with [`AnnotationError::NoArguments`] when
/// nothing but whitespace follows it.
pub fn string_list(tag: &str, line: &str) -> Result<Vec<String>> {
    let rest = strip_tag(tag, line).ok_or_else(|| AnnotationError::TagMismatch {
        tag: tag.to_string(),
    })?;

    let values: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
    if values.is_empty() {
        return Err(AnnotationError::NoArguments {
            tag: tag.to_string(),
        });
    }

    Ok(values)
}

/// Like [`string_list`], but a line carrying another tag (or none) is
/// `Ok(None)` instead of an error.
pub(crate) fn tagged_values(tag: &str, line: &str) -> Result<Option<Vec<String>>> {
    match string_list(tag, line) {
        Ok(values) => Ok(Some(values)),
        Err(AnnotationError::TagMismatch { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

fn strip_tag<'a>(tag: &str, line: &'a str) -> Option<&'a str> {
    if tag.is_empty() {
        return None;
    }

    let rest = line.trim_start().strip_prefix(tag)?;
    // "@kindsX" is not "@kinds"
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}
