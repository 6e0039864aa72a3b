use std::collections::HashMap;

/// Parse the `key: value` block of a `message/delivery-status` part.
///
/// Folded continuation lines are joined onto the line they continue
/// before splitting. Lines without a colon are skipped and a repeated
/// key keeps its last value.
pub fn extract(status_part_body: &str) -> HashMap<String, String> {
    let unfolded = status_part_body
        .replace("\r\n", "\n")
        .replace("\n ", "")
        .replace("\n\t", "");

    let mut fields = HashMap::new();
    for line in unfolded.split('\n') {
        if line.trim().is_empty() {
            continue;
        }

        match line.split_once(':') {
            Some((key, value)) => {
                fields.insert(key.to_string(), value.trim().to_string());
            }
            None => log::debug!("Skipping delivery-status line without a field name: {:?}", line),
        }
    }

    fields
}
