//! Rule validation.

use regex::Regex;

use formwright_common::{FieldValue, RuleKind, ValidationRule};

/// What a value must look like for the email rule: something, `@`,
/// something, a dot, something, with no whitespace or second `@`.
/// Not a full RFC address check.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

const PASSWORD_MIN_CHARS: usize = 8;
const PASSWORD_LENGTH_MESSAGE: &str = "Password must be at least 8 characters long";
const PASSWORD_DIGIT_MESSAGE: &str = "Password must contain at least one number";

/// Stateless rule checker with the email pattern compiled once.
///
/// [`check`](Self::check) walks the rules in declaration order and
/// collects one message per failed rule, without short-circuiting: a
/// value failing three rules produces three messages. Rules only inspect
/// the value shapes they understand: length and email rules gate text
/// and silently pass everything else.
pub struct FieldValidator {
    email: Option<Regex>,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self {
            email: Regex::new(EMAIL_PATTERN).ok(),
        }
    }

    /// Check `value` against `rules`, returning the failure messages in
    /// rule order. An empty result means the value passed.
    pub fn check(&self, value: &FieldValue, rules: &[ValidationRule]) -> Vec<String> {
        let mut failures = Vec::new();
        for rule in rules {
            match rule.kind {
                RuleKind::NotEmpty => {
                    if is_blank(value) {
                        failures.push(rule.message.clone());
                    }
                }
                RuleKind::MinLength => {
                    if let (Some(text), Some(bound)) = (value.as_text(), rule.bound) {
                        if (text.chars().count() as u32) < bound {
                            failures.push(rule.message.clone());
                        }
                    }
                }
                RuleKind::MaxLength => {
                    if let (Some(text), Some(bound)) = (value.as_text(), rule.bound) {
                        if (text.chars().count() as u32) > bound {
                            failures.push(rule.message.clone());
                        }
                    }
                }
                RuleKind::Email => {
                    if let (Some(text), Some(pattern)) = (value.as_text(), self.email.as_ref()) {
                        if !pattern.is_match(text) {
                            failures.push(rule.message.clone());
                        }
                    }
                }
                // password ignores the configured message and emits its
                // own, one per violated condition
                RuleKind::Password => {
                    if let Some(text) = value.as_text() {
                        if text.chars().count() < PASSWORD_MIN_CHARS {
                            failures.push(PASSWORD_LENGTH_MESSAGE.to_string());
                        }
                        if !text.chars().any(|c| c.is_ascii_digit()) {
                            failures.push(PASSWORD_DIGIT_MESSAGE.to_string());
                        }
                    }
                }
            }
        }
        failures
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Blank for validation purposes: loosely absent, or text that trims to
/// nothing.
fn is_blank(value: &FieldValue) -> bool {
    value.is_absent() || value.as_text().is_some_and(|s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: RuleKind, bound: Option<u32>, message: &str) -> ValidationRule {
        ValidationRule::new(kind, bound, message).unwrap()
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn not_empty_fails_absent_and_blank_values() {
        let validator = FieldValidator::new();
        let rules = [rule(RuleKind::NotEmpty, None, "Required")];

        assert_eq!(validator.check(&FieldValue::Empty, &rules), vec!["Required"]);
        assert_eq!(validator.check(&text(""), &rules), vec!["Required"]);
        assert_eq!(validator.check(&text("   "), &rules), vec!["Required"]);
        assert_eq!(validator.check(&FieldValue::Number(0.0), &rules), vec!["Required"]);
        assert_eq!(validator.check(&FieldValue::Bool(false), &rules), vec!["Required"]);

        assert!(validator.check(&text("x"), &rules).is_empty());
        assert!(validator.check(&FieldValue::Bool(true), &rules).is_empty());
        assert!(validator.check(&FieldValue::Number(2.0), &rules).is_empty());
    }

    #[test]
    fn length_rules_only_gate_text() {
        let validator = FieldValidator::new();

        let min = [rule(RuleKind::MinLength, Some(3), "Too short")];
        assert_eq!(validator.check(&text("ab"), &min), vec!["Too short"]);
        assert!(validator.check(&text("abc"), &min).is_empty());
        assert!(validator.check(&FieldValue::Number(1.0), &min).is_empty());
        assert!(validator.check(&FieldValue::Empty, &min).is_empty());

        let max = [rule(RuleKind::MaxLength, Some(3), "Too long")];
        assert_eq!(validator.check(&text("abcd"), &max), vec!["Too long"]);
        assert!(validator.check(&text("abc"), &max).is_empty());
        assert!(validator.check(&FieldValue::Bool(true), &max).is_empty());
    }

    #[test]
    fn length_rule_without_bound_never_fails() {
        let validator = FieldValidator::new();
        let rules = [rule(RuleKind::MinLength, None, "Too short")];
        assert!(validator.check(&text(""), &rules).is_empty());
        assert!(validator.check(&text("x"), &rules).is_empty());
    }

    #[test]
    fn email_wants_local_part_domain_and_dot() {
        let validator = FieldValidator::new();
        let rules = [rule(RuleKind::Email, None, "Bad email")];

        assert!(validator.check(&text("a@b.co"), &rules).is_empty());
        assert!(validator.check(&text("user@sub.example.com"), &rules).is_empty());

        assert_eq!(validator.check(&text("a@b"), &rules), vec!["Bad email"]);
        assert_eq!(validator.check(&text("notanemail"), &rules), vec!["Bad email"]);
        assert_eq!(validator.check(&text("a b@c.d"), &rules), vec!["Bad email"]);
        assert_eq!(validator.check(&text("a@@b.co"), &rules), vec!["Bad email"]);
        assert_eq!(validator.check(&text(""), &rules), vec!["Bad email"]);

        // non-text values pass silently
        assert!(validator.check(&FieldValue::Number(5.0), &rules).is_empty());
    }

    #[test]
    fn password_emits_fixed_messages_per_violation() {
        let validator = FieldValidator::new();
        let rules = [rule(RuleKind::Password, None, "ignored")];

        assert_eq!(
            validator.check(&text("abc"), &rules),
            vec![
                "Password must be at least 8 characters long",
                "Password must contain at least one number",
            ]
        );
        assert_eq!(
            validator.check(&text("short1"), &rules),
            vec!["Password must be at least 8 characters long"]
        );
        assert_eq!(
            validator.check(&text("longenough"), &rules),
            vec!["Password must contain at least one number"]
        );
        assert!(validator.check(&text("12345678"), &rules).is_empty());
        assert!(validator.check(&FieldValue::Empty, &rules).is_empty());
    }

    #[test]
    fn rules_accumulate_in_declaration_order() {
        let validator = FieldValidator::new();
        let rules = [
            rule(RuleKind::NotEmpty, None, "Required"),
            rule(RuleKind::MinLength, Some(5), "Too short"),
            rule(RuleKind::Email, None, "Bad email"),
        ];

        assert_eq!(
            validator.check(&text("a"), &rules),
            vec!["Too short", "Bad email"]
        );
        assert_eq!(
            validator.check(&text(""), &rules),
            vec!["Required", "Too short", "Bad email"]
        );
        assert!(validator.check(&text("hello@example.com"), &rules).is_empty());
    }
}
