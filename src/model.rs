use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message kind carried in the envelope's `type` field.
///
/// Unknown wire values are preserved verbatim so that envelopes from newer
/// producers survive a decode/encode round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    NewToken,
    PumpDetected,
    GenericAlert,
    Unknown(String),
}

impl MessageKind {
    pub fn as_wire(&self) -> &str {
        match self {
            MessageKind::NewToken => "NEW_TOKEN",
            MessageKind::PumpDetected => "PUMP_DETECTED",
            MessageKind::GenericAlert => "GENERIC_ALERT",
            MessageKind::Unknown(other) => other,
        }
    }

    pub fn from_wire(s: &str) -> Self {
        match s {
            "NEW_TOKEN" => MessageKind::NewToken,
            "PUMP_DETECTED" => MessageKind::PumpDetected,
            "GENERIC_ALERT" => MessageKind::GenericAlert,
            other => MessageKind::Unknown(other.to_string()),
        }
    }
}

impl Default for MessageKind {
    fn default() -> Self {
        MessageKind::Unknown(String::new())
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for MessageKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for MessageKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(MessageKind::from_wire(&s))
    }
}

fn default_origin() -> String {
    "UNKNOWN".to_string()
}

/// The unit of mesh communication.
///
/// Wire shape: `{ "type": ..., "source": ..., "timestamp": ..., "data": {...} }`.
/// Missing `type` / `source` / `data` degrade to defaults rather than failing
/// the decode; `data` stays a raw map so unknown payload keys pass through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(rename = "source", default = "default_origin")]
    pub origin: String,
    /// ISO-8601, stamped by the producer at send time. Not re-validated by
    /// consumers (no clock-skew correction).
    #[serde(rename = "timestamp", default)]
    pub emitted_at: String,
    #[serde(rename = "data", default)]
    pub data: Map<String, Value>,
}

impl Envelope {
    /// Build an envelope stamped with the current time.
    pub fn new(kind: MessageKind, origin: impl Into<String>, data: Map<String, Value>) -> Self {
        Envelope {
            kind,
            origin: origin.into(),
            emitted_at: Utc::now().to_rfc3339(),
            data,
        }
    }
}

/// Payload shape for `NEW_TOKEN` envelopes.
///
/// Every field is defaulted: a partially-formed producer never fails the
/// parse, it just yields empty strings / zero amounts.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TokenDetection {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    /// Venue identifier, e.g. "pump_fun" or "raydium".
    #[serde(default)]
    pub platform: String,
    /// Quote-currency liquidity (USD).
    #[serde(default)]
    pub liquidity: Decimal,
    #[serde(default)]
    pub price: Decimal,
}

impl TokenDetection {
    /// Extract the typed payload from an envelope's data map. Fails only if a
    /// present field has the wrong JSON type.
    pub fn from_data(data: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(data.clone()))
    }

    pub fn to_data(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Payload shape for `PUMP_DETECTED` envelopes.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PumpAlert {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl PumpAlert {
    pub fn from_data(data: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(data.clone()))
    }
}

/// Receiver-local record of an executed buy, keyed by token address in the
/// ledger. Created only by a successful execution; never expired here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub buy_price: Decimal,
    /// Base-asset units acquired.
    pub amount: Decimal,
    /// Quote-currency cost of the entry.
    pub sol_spent: Decimal,
    pub opened_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_mapping() {
        assert_eq!(MessageKind::from_wire("NEW_TOKEN"), MessageKind::NewToken);
        assert_eq!(
            MessageKind::from_wire("PUMP_DETECTED"),
            MessageKind::PumpDetected
        );
        assert_eq!(
            MessageKind::from_wire("SOMETHING_ELSE"),
            MessageKind::Unknown("SOMETHING_ELSE".to_string())
        );
        assert_eq!(
            MessageKind::Unknown("SOMETHING_ELSE".to_string()).as_wire(),
            "SOMETHING_ELSE"
        );
    }

    #[test]
    fn test_detection_defaults_on_missing_fields() {
        let mut data = Map::new();
        data.insert("address".to_string(), Value::String("So1abc".to_string()));

        let detection = TokenDetection::from_data(&data).expect("partial payload must parse");
        assert_eq!(detection.address, "So1abc");
        assert_eq!(detection.symbol, "");
        assert_eq!(detection.liquidity, Decimal::ZERO);
    }
}
