//! # models::input
//!
//! Request payloads for the trade-editing endpoints.
//!
//! Every field is optional at the serde level so that a missing value turns
//! into a `400 Missing required fields` from the validator instead of a
//! framework rejection. Numbers may arrive as JSON numbers or numeric
//! strings (HTML form values).

use serde::{Deserialize, Deserializer};

/// Fields of an open trade as typed by the user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenTradeInput {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub entry: Option<f64>,
    #[serde(default, rename = "tp", deserialize_with = "lenient_number")]
    pub take_profit: Option<f64>,
    #[serde(default, rename = "sl", deserialize_with = "lenient_number")]
    pub stop_loss: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub size: Option<f64>,
}

/// Fields of a closed trade as edited by the user. Dates are `MM/DD/YY`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClosedTradeInput {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub entry: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub size: Option<f64>,
    #[serde(default)]
    pub opened_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub exit: Option<f64>,
    #[serde(default)]
    pub closed_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts `12.5`, `"12.5"` or `null`. Text that is not a number becomes `None`.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Number(value)) => Some(value),
        Some(NumberOrText::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}
