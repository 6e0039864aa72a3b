use mailparse::{MailHeaderMap, ParsedMail, parse_mail};

/// A single leaf MIME part of a bounce message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub content_type: String,
    pub body: String,
}

impl Part {
    pub fn new(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Parsed email reduced to what bounce classification looks at.
///
/// Built by [`parse_email`], or directly by callers that already have
/// the message split up by some other MIME library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEmail {
    pub subject: Option<String>,
    pub body: String,
    pub parts: Vec<Part>,
}

impl ParsedEmail {
    pub fn new(subject: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.map(str::to_string),
            body: body.into(),
            parts: vec![],
        }
    }

    pub fn with_part(mut self, content_type: &str, body: impl Into<String>) -> Self {
        self.parts.push(Part::new(content_type, body));
        self
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// First part whose content type is exactly `content_type`
    pub fn find_part(&self, content_type: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.content_type == content_type)
    }

    /// Classify this message as a bounce
    pub fn undeliverable_info(&self) -> crate::BounceRecord {
        crate::bounce::classify(self)
    }
}

/// Parse a raw RFC 5322 message into a [`ParsedEmail`].
///
/// Only a failure to parse the outer message is an error. Parts whose
/// body cannot be decoded fall back to their raw bytes.
pub fn parse_email(raw: &[u8]) -> anyhow::Result<ParsedEmail> {
    let parsed = parse_mail(raw)?;
    let subject = parsed.headers.get_first_value("Subject");

    if !parsed.ctype.mimetype.starts_with("multipart/") {
        return Ok(ParsedEmail {
            subject,
            body: part_body(&parsed),
            parts: vec![],
        });
    }

    let mut parts = vec![];
    collect_leaf_parts(&parsed, &mut parts);

    let body = parts
        .iter()
        .find(|p| p.content_type == "text/plain")
        .map(|p| p.body.clone())
        .unwrap_or_default();

    Ok(ParsedEmail {
        subject,
        body,
        parts,
    })
}

fn collect_leaf_parts(mail: &ParsedMail, out: &mut Vec<Part>) {
    for sub in &mail.subparts {
        if sub.ctype.mimetype.starts_with("multipart/") {
            collect_leaf_parts(sub, out);
        } else {
            out.push(Part::new(sub.ctype.mimetype.clone(), part_body(sub)));
        }
    }
}

fn part_body(mail: &ParsedMail) -> String {
    let mimetype = mail.ctype.mimetype.as_str();

    // Embedded messages and header blocks are kept as-is; charset
    // decoding would mangle the original 8bit content
    let embedded = mimetype.starts_with("message/") || mimetype == "text/rfc822-headers";

    let body = if embedded {
        raw_body(mail)
    } else {
        match mail.get_body() {
            Ok(body) => body,
            Err(e) => {
                log::warn!("Failed to decode {} part, using raw body: {}", mimetype, e);
                raw_body(mail)
            }
        }
    };

    body.replace("\r\n", "\n")
}

fn raw_body(mail: &ParsedMail) -> String {
    match mail.get_body_raw() {
        Ok(raw) => String::from_utf8_lossy(&raw).into_owned(),
        Err(e) => {
            log::warn!("Unreadable {} part body: {}", mail.ctype.mimetype, e);
            String::new()
        }
    }
}

/// Headers recovered from an embedded copy of the original message
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmbeddedHeaders {
    message_id: Option<String>,
}

impl EmbeddedHeaders {
    pub fn new(message_id: Option<String>) -> Self {
        Self { message_id }
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }
}

/// Header block parser used for the original-message sub-parse
pub trait HeaderParser {
    fn parse_headers(&self, text: &str) -> anyhow::Result<EmbeddedHeaders>;
}

/// [`HeaderParser`] backed by `mailparse`
#[derive(Debug, Default, Clone, Copy)]
pub struct MailparseHeaderParser;

impl HeaderParser for MailparseHeaderParser {
    fn parse_headers(&self, text: &str) -> anyhow::Result<EmbeddedHeaders> {
        let (headers, _) = mailparse::parse_headers(text.as_bytes())?;
        let message_id = headers
            .get_first_value("Message-ID")
            .and_then(|id| normalize_message_id(&id));
        Ok(EmbeddedHeaders { message_id })
    }
}

/// Strips whitespace and one pair of surrounding angle brackets
pub fn normalize_message_id(id: &str) -> Option<String> {
    let id = id.trim();
    let id = match id.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        Some(inner) => inner.trim(),
        None => id,
    };

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse::{HeaderParser, MailparseHeaderParser, normalize_message_id, parse_email};

    #[test]
    fn test_normalize_message_id() {
        assert_eq!(
            normalize_message_id(" <abc@example.com> "),
            Some("abc@example.com".to_string())
        );
        assert_eq!(
            normalize_message_id("abc@example.com"),
            Some("abc@example.com".to_string())
        );
        assert_eq!(normalize_message_id("<>"), None);
        assert_eq!(normalize_message_id("   "), None);
    }

    #[test]
    fn test_parse_headers_message_id() {
        let headers = MailparseHeaderParser
            .parse_headers("From: a@example.com\nMessage-ID: <abc123@mail.example.com>\n\nbody\n")
            .unwrap();
        assert_eq!(headers.message_id(), Some("abc123@mail.example.com"));
    }

    #[test]
    fn test_parse_headers_without_message_id() {
        let headers = MailparseHeaderParser
            .parse_headers("From: a@example.com\nSubject: hi\n")
            .unwrap();
        assert_eq!(headers.message_id(), None);
    }

    #[test]
    fn test_parse_email_single_part() {
        let raw = b"From: MAILER-DAEMON@example.com\r\nSubject: Mail delivery failed: returning message to sender\r\n\r\nline one\r\nline two\r\n";
        let parsed = parse_email(raw).unwrap();
        assert_eq!(
            parsed.subject(),
            Some("Mail delivery failed: returning message to sender")
        );
        assert_eq!(parsed.body(), "line one\nline two\n");
        assert!(parsed.parts().is_empty());
    }

    #[test]
    fn test_parse_email_flattens_nested_parts() {
        let raw = b"Subject: Delivery Status Notification\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/report; report-type=delivery-status; boundary=\"outer\"\r\n\
\r\n\
--outer\r\n\
Content-Type: multipart/alternative; boundary=\"inner\"\r\n\
\r\n\
--inner\r\n\
Content-Type: text/plain\r\n\
\r\n\
Delivery failed.\r\n\
--inner\r\n\
Content-Type: text/html\r\n\
\r\n\
<p>Delivery failed.</p>\r\n\
--inner--\r\n\
--outer\r\n\
Content-Type: message/delivery-status\r\n\
\r\n\
Reporting-MTA: dns; mx.example.com\r\n\
\r\n\
Final-Recipient: rfc822; bob@example.com\r\n\
Status: 5.1.1\r\n\
--outer--\r\n";
        let parsed = parse_email(raw).unwrap();
        let types: Vec<&str> = parsed.parts().iter().map(|p| p.content_type()).collect();
        assert_eq!(
            types,
            vec!["text/plain", "text/html", "message/delivery-status"]
        );
        assert_eq!(parsed.body().trim(), "Delivery failed.");
        let status = parsed.find_part("message/delivery-status").unwrap();
        assert!(status.body().contains("Status: 5.1.1"));
        assert!(!status.body().contains('\r'));
    }
}
