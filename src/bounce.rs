use std::collections::HashMap;

use crate::delivery_status;
use crate::detect::{DELIVERY_STATUS, HandlingServer, detect};
use crate::free_text;
use crate::original_message::{self, find_original_part};
use crate::parse::{HeaderParser, MailparseHeaderParser, ParsedEmail};

/// Delivery outcome, derived from the leading digit of the `Status` field.
///
/// - `Success` – 2.x.x
/// - `TemporaryFailure` – 4.x.x, the sending MTA may still retry
/// - `Failure` – 5.x.x, permanent
/// - `Unknown` – no status, or one that does not start with a known class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Outcome {
    Success,
    TemporaryFailure,
    Failure,
    Unknown,
}

impl Outcome {
    pub fn from_status(status: Option<&str>) -> Self {
        match status.and_then(|s| s.chars().next()) {
            Some('5') => Outcome::Failure,
            Some('4') => Outcome::TemporaryFailure,
            Some('2') => Outcome::Success,
            _ => Outcome::Unknown,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Outcome::Success => "Success",
            Outcome::TemporaryFailure => "Temporary Failure",
            Outcome::Failure => "Failure",
            Outcome::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Normalized description of a bounce message
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BounceRecord {
    handling_server: HandlingServer,
    status_fields: HashMap<String, String>,
    original_message_id: Option<String>,
    original_recipient: Option<String>,
    original_subject: Option<String>,
    outcome: Outcome,
}

impl BounceRecord {
    fn new(handling_server: HandlingServer, status_fields: HashMap<String, String>) -> Self {
        let outcome = Outcome::from_status(status_fields.get("Status").map(String::as_str));
        Self {
            handling_server,
            status_fields,
            original_message_id: None,
            original_recipient: None,
            original_subject: None,
            outcome,
        }
    }

    pub fn handling_server(&self) -> HandlingServer {
        self.handling_server
    }

    pub fn status_fields(&self) -> &HashMap<String, String> {
        &self.status_fields
    }

    /// Shortcut for the `Status` field
    pub fn status(&self) -> Option<&str> {
        self.status_fields.get("Status").map(String::as_str)
    }

    pub fn original_message_id(&self) -> Option<&str> {
        self.original_message_id.as_deref()
    }

    pub fn original_recipient(&self) -> Option<&str> {
        self.original_recipient.as_deref()
    }

    pub fn original_subject(&self) -> Option<&str> {
        self.original_subject.as_deref()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

/// Classify a parsed bounce, re-parsing any embedded original message
/// with `mailparse`. Never fails; unrecognized input produces a record
/// with `HandlingServer::Unknown`.
pub fn classify(email: &ParsedEmail) -> BounceRecord {
    classify_with(email, &MailparseHeaderParser)
}

/// Like [`classify`], with a caller supplied header parser
pub fn classify_with<P: HeaderParser + ?Sized>(email: &ParsedEmail, parser: &P) -> BounceRecord {
    let server = detect(email);
    log::debug!("Classifying bounce as {}", server);

    match server {
        HandlingServer::Standard => {
            let status_fields = email
                .find_part(DELIVERY_STATUS)
                .map(|p| delivery_status::extract(p.body()))
                .unwrap_or_default();
            let mut record = BounceRecord::new(server, status_fields);
            record.original_message_id = original_message::resolve(email, parser);
            record
        }
        HandlingServer::Domino => {
            // Domino replaces the original Message-ID, so it is never reported
            let status_part = email.find_part(DELIVERY_STATUS);
            let status_fields = status_part
                .map(|p| delivery_status::extract(p.body()))
                .unwrap_or_default();
            let mut record = BounceRecord::new(server, status_fields);
            record.original_recipient =
                status_part.and_then(|p| original_message::final_recipient(p.body()));
            record.original_subject =
                find_original_part(email).and_then(|p| original_message::subject_line(p.body()));
            record
        }
        HandlingServer::Exim => {
            let (message_id, status_fields) = free_text::scan(email.body());
            let mut record = BounceRecord::new(server, status_fields);
            record.original_message_id = message_id;
            record
        }
        HandlingServer::Unknown => BounceRecord::new(server, HashMap::new()),
    }
}
