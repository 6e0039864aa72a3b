use crate::parse::ParsedEmail;

pub const DELIVERY_STATUS: &str = "message/delivery-status";
pub const DOMINO_SUBJECT: &str = "not listed in Domino Directory";
pub const EXIM_SUBJECT: &str = "Mail delivery failed: returning message to sender";

/// The reporting convention a bounce was produced with.
///
/// - `Domino` – Lotus Domino; the embedded message id is rewritten, so only
///   the recipient and subject of the original are trusted.
/// - `Exim` – no structured parts; the failure is described in plain text.
/// - `Standard` – a `message/delivery-status` part plus an embedded copy
///   of the original message.
/// - `Unknown` – none of the above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum HandlingServer {
    Domino,
    Exim,
    Standard,
    Unknown,
}

impl std::fmt::Display for HandlingServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HandlingServer::Domino => "Domino",
            HandlingServer::Exim => "Exim",
            HandlingServer::Standard => "Standard",
            HandlingServer::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Decide which extraction strategy applies to `email`.
///
/// The Domino subject is checked before the structural rule because
/// Domino bounces carry a delivery-status part of their own.
pub fn detect(email: &ParsedEmail) -> HandlingServer {
    let subject = email.subject().unwrap_or("");

    if subject.contains(DOMINO_SUBJECT) {
        HandlingServer::Domino
    } else if email.find_part(DELIVERY_STATUS).is_some() {
        HandlingServer::Standard
    } else if subject == EXIM_SUBJECT {
        HandlingServer::Exim
    } else {
        HandlingServer::Unknown
    }
}
