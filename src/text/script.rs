use serde_json::Value;

/// First code point of the Hebrew block.
pub const SCRIPT_START: u32 = 0x0590;
/// Last code point of the Hebrew block.
pub const SCRIPT_END: u32 = 0x05FF;

pub fn is_script_char(c: char) -> bool {
    (SCRIPT_START..=SCRIPT_END).contains(&(c as u32))
}

/// True if `text` is non-blank and contains at least one Hebrew-block char.
pub fn is_target_script(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    text.chars().any(is_script_char)
}

/// JSON-level variant: anything but a string is rejected.
pub fn is_target_script_value(value: &Value) -> bool {
    value.as_str().map(is_target_script).unwrap_or(false)
}
