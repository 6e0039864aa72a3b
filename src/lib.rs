pub mod bounce;
pub mod delivery_status;
pub mod detect;
pub mod free_text;
pub mod original_message;
pub mod parse;

pub use bounce::{BounceRecord, Outcome, classify, classify_with};
pub use detect::HandlingServer;
pub use parse::{HeaderParser, MailparseHeaderParser, ParsedEmail, Part, parse_email};
