//! Input validation for outgoing chat traffic

/// Longest message body the chat accepts
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Longest chat or user identifier
const MAX_ID_LEN: usize = 64;

/// Validates a chat or user identifier
pub fn validate_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if id.len() > MAX_ID_LEN {
        return Err(format!("Identifier too long (max {} characters)", MAX_ID_LEN));
    }

    if id.contains(|c: char| c.is_whitespace() || c.is_control()) {
        return Err("Identifier contains invalid characters".to_string());
    }

    Ok(())
}

/// Validates the real-time endpoint URL (ws, wss, http or https)
pub fn validate_endpoint(endpoint: &str) -> Result<(), String> {
    if endpoint.is_empty() {
        return Err("Endpoint cannot be empty".to_string());
    }

    let rest = ["wss://", "ws://", "https://", "http://"]
        .iter()
        .find_map(|scheme| endpoint.strip_prefix(scheme))
        .ok_or_else(|| "Endpoint must start with ws://, wss://, http:// or https://".to_string())?;

    let host = rest.split(['/', '?']).next().unwrap_or("");
    if host.is_empty() {
        return Err("Endpoint has no host".to_string());
    }

    if endpoint.contains(char::is_whitespace) {
        return Err("Endpoint cannot contain whitespace".to_string());
    }

    Ok(())
}

/// Validates a message body before sending
pub fn validate_message(msg: &str) -> Result<(), String> {
    if msg.trim().is_empty() {
        return Err("Message cannot be empty".to_string());
    }

    if msg.chars().count() > MAX_MESSAGE_CHARS {
        return Err(format!("Message too long (max {} characters)", MAX_MESSAGE_CHARS));
    }

    // Line breaks are fine, other control characters are not
    if msg.contains(|c: char| c.is_control() && c != '\n') {
        return Err("Message contains control characters".to_string());
    }

    Ok(())
}

/// Trims a message and removes characters `validate_message` rejects
pub fn sanitize_message(msg: &str) -> String {
    msg.trim()
        .replace("\r\n", "\n")
        .chars()
        .filter(|&c| !c.is_control() || c == '\n')
        .take(MAX_MESSAGE_CHARS)
        .collect()
}
