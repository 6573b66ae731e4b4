// Command Validation
//
// Explicit accumulating validation: every failing field is reported in a
// single error, no short-circuit.

use crate::application::constants::{MAX_AUTHOR_LEN, MAX_DESCRIPTION_LEN};
use crate::domain::Command;
use serde::Serialize;
use std::collections::BTreeMap;

/// Accumulated field errors (field name -> message)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields.insert(field.to_string(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a command against admission rules.
///
/// `now_millis` is the validation-time clock reading; `submitted_at` strictly
/// after it is rejected. Lengths are counted in characters, not bytes.
pub fn validate(command: &Command, now_millis: i64) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if command.author.trim().is_empty() {
        errors.push("author", "author must not be empty");
    } else if command.author.chars().count() > MAX_AUTHOR_LEN {
        errors.push(
            "author",
            format!("author must not exceed {} characters", MAX_AUTHOR_LEN),
        );
    }

    if command.description.trim().is_empty() {
        errors.push("description", "description must not be empty");
    } else if command.description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(
            "description",
            format!(
                "description must not exceed {} characters",
                MAX_DESCRIPTION_LEN
            ),
        );
    }

    match command.submitted_at {
        None => errors.push("submitted_at", "submission time must not be empty"),
        Some(ts) if ts > now_millis => {
            errors.push("submitted_at", "submission time must not be in the future")
        }
        Some(_) => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;

    const NOW: i64 = 1_700_000_000_000;

    fn valid_command() -> Command {
        Command::new(
            "check reactor block status",
            Priority::Medium,
            "Ellen Ripley",
            Some(NOW - 1_000),
        )
    }

    #[test]
    fn test_valid_command_passes() {
        assert!(validate(&valid_command(), NOW).is_ok());
    }

    #[test]
    fn test_empty_author_rejected() {
        let mut cmd = valid_command();
        cmd.author = "   ".to_string();

        let errors = validate(&cmd, NOW).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get("author").unwrap().contains("empty"));
    }

    #[test]
    fn test_author_too_long_rejected() {
        let mut cmd = valid_command();
        cmd.author = "a".repeat(101);

        let errors = validate(&cmd, NOW).unwrap_err();
        assert!(errors.get("author").unwrap().contains("100"));
    }

    #[test]
    fn test_author_at_limit_passes() {
        let mut cmd = valid_command();
        cmd.author = "a".repeat(100);

        assert!(validate(&cmd, NOW).is_ok());
    }

    #[test]
    fn test_description_too_long_rejected() {
        let mut cmd = valid_command();
        cmd.description = "d".repeat(1001);

        let errors = validate(&cmd, NOW).unwrap_err();
        assert!(errors.get("description").unwrap().contains("1000"));
    }

    #[test]
    fn test_missing_timestamp_rejected() {
        let mut cmd = valid_command();
        cmd.submitted_at = None;

        let errors = validate(&cmd, NOW).unwrap_err();
        assert!(errors.get("submitted_at").unwrap().contains("empty"));
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let mut cmd = valid_command();
        cmd.submitted_at = Some(NOW + 1);

        let errors = validate(&cmd, NOW).unwrap_err();
        assert!(errors.get("submitted_at").unwrap().contains("future"));
    }

    #[test]
    fn test_timestamp_equal_to_now_passes() {
        let mut cmd = valid_command();
        cmd.submitted_at = Some(NOW);

        assert!(validate(&cmd, NOW).is_ok());
    }

    #[test]
    fn test_errors_accumulate_across_fields() {
        let cmd = Command::new("", Priority::Low, "", Some(NOW));

        let errors = validate(&cmd, NOW).unwrap_err();
        assert_eq!(errors.len(), 2, "expected exactly two field entries");
        assert!(errors.get("author").is_some());
        assert!(errors.get("description").is_some());
    }
}
