use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::parse::normalize_message_id;

const ADDRESS_MARKER: &str = "The following address";
/// Lines between the marker and the status text
const BOILERPLATE_LINES: usize = 2;

static MESSAGE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Message.*").unwrap());

/// Scrape a message id and a `Status` line out of an Exim plain-text
/// bounce. Only the fixed Exim phrasing is understood; anything else
/// yields an absent id and an empty map.
pub fn scan(body_text: &str) -> (Option<String>, HashMap<String, String>) {
    (scan_message_id(body_text), scan_status(body_text))
}

fn scan_message_id(body_text: &str) -> Option<String> {
    let found = MESSAGE_LINE.find(body_text)?;
    found
        .as_str()
        .split_whitespace()
        .nth(1)
        .and_then(normalize_message_id)
}

fn scan_status(body_text: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    let lines: Vec<&str> = body_text.lines().collect();

    let marker = match lines.iter().position(|l| l.contains(ADDRESS_MARKER)) {
        Some(idx) => idx,
        None => {
            log::debug!("No failed address block in plain-text bounce");
            return fields;
        }
    };

    let status: Vec<&str> = lines
        .iter()
        .skip(marker + 1 + BOILERPLATE_LINES)
        .map(|l| l.trim())
        .take_while(|l| !l.is_empty())
        .collect();

    if !status.is_empty() {
        fields.insert("Status".to_string(), status.join(" "));
    }
    fields
}
