use crate::error::{AppError, Result};

/// Positional arguments of a prompt.
///
/// The prompt is split on single spaces with no trimming, merging or quoting,
/// so `"a  b"` yields `["a", "", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Tokens<'a> {
    pub fn new(prompt: &'a str) -> Self {
        Self {
            tokens: prompt.split(' ').collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    /// The token at `index`. Absent and empty tokens are both a missing argument.
    pub fn required(&self, index: usize, name: &'static str) -> Result<&'a str> {
        self.get(index)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::MissingArgument { name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_single_spaces() {
        let tokens = Tokens::new("main  prod\n");
        assert_eq!(tokens.get(0), Some("main"));
        assert_eq!(tokens.get(1), Some(""));
        assert_eq!(tokens.get(2), Some("prod\n"));
        assert_eq!(tokens.get(3), None);
    }

    #[test]
    fn test_does_not_trim() {
        let tokens = Tokens::new(" nightly.yml");
        assert_eq!(tokens.get(0), Some(""));
        assert_eq!(tokens.get(1), Some("nightly.yml"));
    }

    #[test]
    fn test_required_reports_missing_argument() {
        let tokens = Tokens::new("main");
        assert_eq!(tokens.required(0, "branch").unwrap(), "main");
        assert!(matches!(
            tokens.required(1, "environment"),
            Err(AppError::MissingArgument { name: "environment" })
        ));
    }

    #[test]
    fn test_empty_prompt_has_no_arguments() {
        let tokens = Tokens::new("");
        assert!(tokens.required(0, "workflow").is_err());
    }
}
