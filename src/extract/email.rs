//! Email body extraction for RFC822 (.eml) files.
//!
//! Legal correspondence often arrives as exported email. Only the
//! subject and body text feed the pipeline; attachments should be
//! analyzed as separate documents.

use std::path::Path;
use std::sync::LazyLock;

use mail_parser::MessageParser;
use regex::Regex;

use super::ExtractionError;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("html tag pattern should compile"));

/// Extract subject and body text from an email file.
pub fn extract_email(path: &Path) -> Result<String, ExtractionError> {
    let raw = std::fs::read(path)?;
    let message = MessageParser::default()
        .parse(&raw)
        .ok_or_else(|| ExtractionError::ExtractionFailed("failed to parse email".to_string()))?;

    let mut out = String::new();
    if let Some(subject) = message.subject() {
        out.push_str("Subject: ");
        out.push_str(subject);
        out.push_str("\n\n");
    }

    if let Some(body) = message.body_text(0) {
        out.push_str(&body);
    } else if let Some(html) = message.body_html(0) {
        // Fall back to a stripped HTML body
        out.push_str(HTML_TAG.replace_all(&html, " ").as_ref());
    }

    let out = out.trim().to_string();
    if out.is_empty() {
        return Err(ExtractionError::ExtractionFailed(
            "email has no text body".to_string(),
        ));
    }
    Ok(out)
}
