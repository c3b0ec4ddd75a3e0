//! Account pattern matching
//!
//! A pattern is an account name in which `*` stands for any run of
//! characters, the empty run included. Everything else is literal and the
//! whole account name has to match.

use regex::Regex;

use crate::error::{TallyError, TallyResult};

/// A compiled account pattern
#[derive(Debug, Clone)]
pub struct AccountPattern {
    source: String,
    regex: Regex,
}

impl AccountPattern {
    pub fn new(pattern: &str) -> TallyResult<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = Regex::new(&format!("^(?s:{})$", body)).map_err(|e| {
            TallyError::Validation(format!("Invalid account pattern '{}': {}", pattern, e))
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, account: &str) -> bool {
        self.regex.is_match(account)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// One-off match of `account` against `pattern`
pub fn matches(account: &str, pattern: &str) -> bool {
    AccountPattern::new(pattern).is_ok_and(|p| p.matches(account))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_pattern_matches_only_itself() {
        assert!(matches("Expenses:Food", "Expenses:Food"));
        assert!(!matches("Expenses:Food:Groceries", "Expenses:Food"));
        assert!(!matches("Expenses:Foo", "Expenses:Food"));
        assert!(!matches("XExpenses:Food", "Expenses:Food"));
    }

    #[test]
    fn test_trailing_wildcard() {
        let pattern = AccountPattern::new("Expenses:Food*").unwrap();
        assert!(pattern.matches("Expenses:Food"));
        assert!(pattern.matches("Expenses:Food:Groceries"));
        assert!(pattern.matches("Expenses:FoodCourt"));
        assert!(!pattern.matches("Expenses:Fo"));
        assert!(!pattern.matches("Assets:Expenses:Food"));
    }

    #[test]
    fn test_child_wildcard() {
        assert!(matches("Expenses:Transport", "Expenses:*"));
        assert!(matches("Expenses:", "Expenses:*"));
        assert!(!matches("Expenses", "Expenses:*"));
        assert!(!matches("Income:Salary", "Expenses:*"));
    }

    #[test]
    fn test_inner_wildcards() {
        assert!(matches("Expenses:Food:Dining", "Expenses:*:Dining"));
        assert!(matches("Liabilities:CreditCard:Visa", "*Card*"));
        assert!(matches("anything at all", "*"));
        assert!(matches("", "*"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(matches("Expenses:Food.Out", "Expenses:Food.Out"));
        assert!(!matches("Expenses:FoodXOut", "Expenses:Food.Out"));
        assert!(matches("Expenses:(Misc)+", "Expenses:(Misc)+"));
        assert!(matches("Expenses:$[a]", "Expenses:$[*]"));
    }

    #[test]
    fn test_prefix_property() {
        let prefix = "Expenses:Food";
        let pattern = AccountPattern::new(&format!("{}*", prefix)).unwrap();
        for suffix in ["", ":A", ":A:B", "X", "食品"] {
            assert!(pattern.matches(&format!("{}{}", prefix, suffix)));
        }
        for other in ["Expenses:Foo", "Expenses", "Income:Food", " Expenses:Food"] {
            assert!(!pattern.matches(other));
        }
        assert_eq!(pattern.as_str(), "Expenses:Food*");
    }
}
