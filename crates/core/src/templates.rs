//! Email Templates
//!
//! Administrators write assignment emails with `{NAME}` placeholders. Known
//! placeholders are substituted; anything else is emitted as written so a
//! stray or misspelt token never breaks a send. `{{` and `}}` produce literal
//! braces.

use jiff::Timestamp;

/// Learner email address.
pub const USER_EMAIL: &str = "USER_EMAIL";

/// Voucher code.
pub const CODE: &str = "CODE";

/// Slots the learner can still redeem.
pub const REDEMPTIONS_REMAINING: &str = "REDEMPTIONS_REMAINING";

/// Last day the code is valid.
pub const EXPIRATION_DATE: &str = "EXPIRATION_DATE";

/// Assignments of the pair already redeemed.
pub const REDEEMED_OFFER_COUNT: &str = "REDEEMED_OFFER_COUNT";

/// Assignments of the pair not revoked.
pub const TOTAL_OFFER_COUNT: &str = "TOTAL_OFFER_COUNT";

/// Format used for the `EXPIRATION_DATE` placeholder.
pub const EXPIRATION_DATE_FORMAT: &str = "%d %B, %Y";

/// Template text supplied by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmailTemplate {
    /// Main template body.
    pub body: String,

    /// Optional text placed before the body.
    pub greeting: Option<String>,

    /// Optional text placed after the body.
    pub closing: Option<String>,
}

impl EmailTemplate {
    /// Template with only a body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            greeting: None,
            closing: None,
        }
    }

    /// Render greeting, body and closing with `values` substituted.
    #[must_use]
    pub fn render(&self, values: &[(&str, String)]) -> String {
        [self.greeting.as_deref(), Some(self.body.as_str()), self.closing.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .map(|part| fill_placeholders(part, values))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Substitute `{NAME}` placeholders found in `values`.
#[must_use]
pub fn fill_placeholders(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;

                while let Some(&next) = chars.peek() {
                    if next == '}' {
                        chars.next();
                        closed = true;
                        break;
                    }

                    if next == '{' {
                        break;
                    }

                    name.push(next);
                    chars.next();
                }

                let value = values
                    .iter()
                    .find(|(key, _)| closed && *key == name)
                    .map(|(_, value)| value.as_str());

                match value {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(&name);

                        if closed {
                            out.push('}');
                        }
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}

/// Format an expiration timestamp for templates, e.g. `31 December, 2026`.
#[must_use]
pub fn format_expiration(end: Timestamp) -> String {
    end.strftime(EXPIRATION_DATE_FORMAT).to_string()
}
