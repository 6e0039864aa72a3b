use crate::parse::{HeaderParser, ParsedEmail, Part};

pub const RFC822: &str = "message/rfc822";
pub const RFC822_HEADERS: &str = "text/rfc822-headers";

/// The embedded copy of the original message: a `message/rfc822` part,
/// or failing that a `text/rfc822-headers` part.
pub fn find_original_part(email: &ParsedEmail) -> Option<&Part> {
    email
        .find_part(RFC822)
        .or_else(|| email.find_part(RFC822_HEADERS))
}

/// Recover the `Message-ID` of the original message.
///
/// A missing part or a header block that fails to parse both yield `None`.
pub fn resolve<P: HeaderParser + ?Sized>(email: &ParsedEmail, parser: &P) -> Option<String> {
    let part = match find_original_part(email) {
        Some(part) => part,
        None => {
            log::debug!("No embedded original message found");
            return None;
        }
    };

    match parser.parse_headers(part.body()) {
        Ok(headers) => headers.message_id().map(str::to_string),
        Err(e) => {
            log::debug!("Failed to parse embedded {} part: {:#}", part.content_type(), e);
            None
        }
    }
}

/// Value of the first line starting with `label`, with the label removed
fn labelled_line<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    text.lines()
        .find_map(|line| line.strip_prefix(label))
        .map(str::trim)
}

/// Address from the `Final-Recipient:` line of a delivery-status block
pub fn final_recipient(status_text: &str) -> Option<String> {
    let value = labelled_line(status_text, "Final-Recipient:")?;
    let address = match value.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("rfc822;") => value[7..].trim(),
        _ => value,
    };

    if address.is_empty() {
        None
    } else {
        Some(address.to_string())
    }
}

/// Text of the first `Subject:` line of an embedded message
pub fn subject_line(message_text: &str) -> Option<String> {
    labelled_line(message_text, "Subject:")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{EmbeddedHeaders, MailparseHeaderParser};

    struct FailingParser;

    impl HeaderParser for FailingParser {
        fn parse_headers(&self, _text: &str) -> anyhow::Result<EmbeddedHeaders> {
            anyhow::bail!("malformed header block")
        }
    }

    #[test]
    fn test_resolve_from_rfc822_part() {
        let email = ParsedEmail::new(None, "")
            .with_part("message/delivery-status", "Status: 5.1.1\n")
            .with_part(RFC822, "From: a@example.com\nMessage-ID: <abc123@mail.example.com>\n\nhi\n");
        assert_eq!(
            resolve(&email, &MailparseHeaderParser),
            Some("abc123@mail.example.com".to_string())
        );
    }

    #[test]
    fn test_rfc822_part_preferred_over_headers_part() {
        let email = ParsedEmail::new(None, "")
            .with_part(RFC822_HEADERS, "Message-ID: <headers@example.com>\n")
            .with_part(RFC822, "Message-ID: <full@example.com>\n");
        assert_eq!(
            resolve(&email, &MailparseHeaderParser),
            Some("full@example.com".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_headers_part() {
        let email = ParsedEmail::new(None, "")
            .with_part(RFC822_HEADERS, "Message-ID: <headers@example.com>\n");
        assert_eq!(
            resolve(&email, &MailparseHeaderParser),
            Some("headers@example.com".to_string())
        );
    }

    #[test]
    fn test_no_candidate_part() {
        let email = ParsedEmail::new(None, "").with_part("text/plain", "Message-ID: <x@example.com>\n");
        assert_eq!(resolve(&email, &MailparseHeaderParser), None);
    }

    #[test]
    fn test_parse_failure_is_absent() {
        let email = ParsedEmail::new(None, "").with_part(RFC822, "Message-ID: <x@example.com>\n");
        assert_eq!(resolve(&email, &FailingParser), None);
    }

    #[test]
    fn test_final_recipient() {
        assert_eq!(
            final_recipient("Reporting-MTA: dns; x\nFinal-Recipient: rfc822;carol@example.com\n"),
            Some("carol@example.com".to_string())
        );
        assert_eq!(
            final_recipient("Final-Recipient: RFC822; carol@example.com\n"),
            Some("carol@example.com".to_string())
        );
        assert_eq!(
            final_recipient("Final-Recipient: carol@example.com"),
            Some("carol@example.com".to_string())
        );
        assert_eq!(final_recipient("Final-Recipient: rfc822;\n"), None);
        assert_eq!(final_recipient("Status: 5.0.0\n"), None);
    }

    #[test]
    fn test_subject_line() {
        let message = "From: a@example.com\nSubject: Quarterly Report\n\nSubject: not this one\n";
        assert_eq!(subject_line(message), Some("Quarterly Report".to_string()));
        assert_eq!(subject_line("From: a@example.com\n"), None);
    }
}
