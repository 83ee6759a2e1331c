// bazaar/src/services/phone.rs

/// Canonical local form of a contact number: spaces and dashes removed, a
/// leading `+880` or `880` country prefix replaced by `0`. Idempotent.
pub fn normalize_phone(raw: &str) -> String {
  let compact: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
  if let Some(rest) = compact.strip_prefix("+880") {
    format!("0{}", rest)
  } else if let Some(rest) = compact.strip_prefix("880") {
    format!("0{}", rest)
  } else {
    compact
  }
}

/// Keeps the first three and last two digits, masking the rest.
pub fn mask_phone(phone: &str) -> String {
  let chars: Vec<char> = phone.chars().collect();
  if chars.len() <= 5 {
    return "*".repeat(chars.len());
  }
  chars
    .iter()
    .enumerate()
    .map(|(i, c)| if i < 3 || i >= chars.len() - 2 { *c } else { '*' })
    .collect()
}
