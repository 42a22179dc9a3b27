//! Phone number utilities

/// Mask a phone number for logs, keeping the leading `+` and the last 4 digits
///
/// # Example
///
/// ```
/// use mazad_shared::utils::phone::mask_phone_number;
///
/// assert_eq!(mask_phone_number("+9647701234567"), "+*********4567");
/// ```
pub fn mask_phone_number(phone: &str) -> String {
    let len = phone.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }

    let visible = 4;
    let last: String = phone.chars().skip(len - visible).collect();

    if phone.starts_with('+') {
        format!("+{}{}", "*".repeat(len - visible - 1), last)
    } else {
        format!("{}{}", "*".repeat(len - visible), last)
    }
}
