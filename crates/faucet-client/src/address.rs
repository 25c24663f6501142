//! Account identifier validation

/// Number of hex digits after the `0x` prefix
pub const ADDRESS_HEX_LEN: usize = 40;

/// Strip surrounding whitespace from raw user input
pub fn normalize_address(raw: &str) -> &str {
    raw.trim()
}

/// `0x` followed by exactly 40 hex digits, any case
pub fn is_valid_address(text: &str) -> bool {
    match text.strip_prefix("0x") {
        Some(digits) => digits.len() == ADDRESS_HEX_LEN && hex::decode(digits).is_ok(),
        None => false,
    }
}

/// Shorten an address for display: first 6 and last 4 characters
pub fn short_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}
