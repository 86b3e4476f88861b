//! Lenient field decoders for backend records whose column types drift
//! between string and number depending on the query that produced them.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<TextOrNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        TextOrNumber::Text(s) if s.trim().is_empty() => None,
        TextOrNumber::Text(s) => Some(s),
        TextOrNumber::Int(n) => Some(n.to_string()),
        TextOrNumber::Float(f) => Some(f.to_string()),
    }))
}

pub(crate) fn opt_order<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<TextOrNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        TextOrNumber::Text(s) => s.trim().parse::<u32>().ok(),
        TextOrNumber::Int(n) => u32::try_from(n).ok(),
        TextOrNumber::Float(f) if f >= 0.0 && f.fract() == 0.0 => Some(f as u32),
        TextOrNumber::Float(_) => None,
    }))
}

/// Truthy decoding for amenity flags stored as 0/1 integers.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        Some(Flag::Text(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        None => false,
    })
}

/// Empty strings are treated as "absent".
pub(crate) fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}
