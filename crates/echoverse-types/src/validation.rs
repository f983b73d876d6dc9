//! Input rules applied before anything is sent to the service.
//!
//! Each check reports only the first rule that fails. Lengths are measured
//! in characters after trimming surrounding whitespace.

pub const STORY_MIN_CHARS: usize = 10;
pub const STORY_MAX_CHARS: usize = 2000;
pub const COMMENT_MAX_CHARS: usize = 500;
pub const ALIAS_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Story must be at least 10 characters")]
    StoryTooShort,
    #[error("Story must be less than 2000 characters")]
    StoryTooLong,
    #[error("Comment cannot be empty")]
    CommentEmpty,
    #[error("Comment must be less than 500 characters")]
    CommentTooLong,
    #[error("Alias must be less than 50 characters")]
    AliasTooLong,
}

fn trimmed_len(s: &str) -> usize {
    s.trim().chars().count()
}

pub fn validate_story(content: &str) -> Result<(), ValidationError> {
    let len = trimmed_len(content);
    if len < STORY_MIN_CHARS {
        return Err(ValidationError::StoryTooShort);
    }
    if len > STORY_MAX_CHARS {
        return Err(ValidationError::StoryTooLong);
    }
    Ok(())
}

pub fn validate_comment(content: &str, alias: Option<&str>) -> Result<(), ValidationError> {
    let len = trimmed_len(content);
    if len == 0 {
        return Err(ValidationError::CommentEmpty);
    }
    if len > COMMENT_MAX_CHARS {
        return Err(ValidationError::CommentTooLong);
    }
    if alias.is_some_and(|a| trimmed_len(a) > ALIAS_MAX_CHARS) {
        return Err(ValidationError::AliasTooLong);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_length_bounds() {
        assert_eq!(validate_story("hello"), Err(ValidationError::StoryTooShort));
        assert_eq!(validate_story("   123456789   "), Err(ValidationError::StoryTooShort));
        assert!(validate_story("1234567890").is_ok());
        assert!(validate_story(&"a".repeat(2000)).is_ok());
        assert_eq!(validate_story(&"a".repeat(2001)), Err(ValidationError::StoryTooLong));
    }

    #[test]
    fn story_message_matches_ui_text() {
        let err = validate_story("short").unwrap_err();
        assert_eq!(err.to_string(), "Story must be at least 10 characters");
    }

    #[test]
    fn story_counts_characters_not_bytes() {
        // ten multi-byte characters
        assert!(validate_story("éééééééééé").is_ok());
    }

    #[test]
    fn comment_bounds() {
        assert_eq!(validate_comment("", None), Err(ValidationError::CommentEmpty));
        assert_eq!(validate_comment(" \n\t ", None), Err(ValidationError::CommentEmpty));
        assert!(validate_comment("x", None).is_ok());
        assert!(validate_comment(&"x".repeat(500), None).is_ok());
        assert_eq!(
            validate_comment(&"x".repeat(501), None),
            Err(ValidationError::CommentTooLong)
        );
    }

    #[test]
    fn alias_bounds() {
        assert!(validate_comment("nice", Some(&"a".repeat(50))).is_ok());
        assert!(validate_comment("nice", Some("   ")).is_ok());
        assert_eq!(
            validate_comment("nice", Some(&"a".repeat(51))),
            Err(ValidationError::AliasTooLong)
        );
    }

    #[test]
    fn comment_content_checked_before_alias() {
        assert_eq!(
            validate_comment("", Some(&"a".repeat(51))),
            Err(ValidationError::CommentEmpty)
        );
    }
}
