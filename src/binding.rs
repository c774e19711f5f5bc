//! Text Binding Resolver: maps a placeholder key to a recipient's data.
//!
//! The dictionary is fixed. A key outside it yields the literal token
//! `{{key}}` so a missing binding shows up on the rendered certificate
//! instead of silently leaving the field blank.

use crate::model::Recipient;

/// Resolve the text for one placeholder key.
///
/// `org_lookup` translates the recipient's organization id to a display
/// name; if it returns `None`, `organization_name` falls through to the
/// fallback token like any unknown key.
pub fn bind<'a>(
    key: &str,
    recipient: &Recipient,
    org_lookup: impl Fn(&str) -> Option<&'a str>,
) -> String {
    match key {
        "recipient_name" => recipient.name.clone(),
        "award_subject" => recipient.award_title.clone(),
        "award_rank" => recipient.award_rank.clone(),
        "cert_date" => recipient.date.clone(),
        "cert_number" => recipient.cert_number.clone(),
        "organization_name" => match org_lookup(&recipient.org_id) {
            Some(name) => name.to_string(),
            None => fallback_token(key),
        },
        _ => fallback_token(key),
    }
}

fn fallback_token(key: &str) -> String {
    format!("{{{{{}}}}}", key)
}
