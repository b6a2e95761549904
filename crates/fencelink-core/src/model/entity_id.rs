// ── Core identity types ──
//
// EntityId names geofences and device groups; DeviceId names the
// network-server queue target. Persistence layers disagree on key
// shape, so EntityId accepts integer keys, UUIDs, and opaque strings.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ── EntityId ────────────────────────────────────────────────────────

/// Canonical identifier for a stored geofence or device group.
///
/// `42` and `"42"` resolve to the same id. Text is only read as an
/// integer when it prints back unchanged, so `"007"` stays a distinct key.
/// Anything that is neither an integer nor a UUID is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(i64),
    Uuid(Uuid),
    Key(String),
}

/// Wire shape accepted for an id before normalization.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self::Int(n),
            RawId::Text(s) => Self::from(s),
        })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Key(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        if let Ok(n) = s.parse::<i64>() {
            if n.to_string() == s {
                return Self::Int(n);
            }
        }
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Key(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

// ── DeviceId ────────────────────────────────────────────────────────

/// Device EUI as known to the network server. Used as the queue path
/// segment and the `devEUI` body field; surrounding whitespace is dropped
/// however the id arrives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl DeviceId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_from_integer_string() {
        assert_eq!(EntityId::from("42"), EntityId::Int(42));
    }

    #[test]
    fn entity_id_from_uuid_string() {
        let id = EntityId::from("550e8400-e29b-41d4-a716-446655440000");
        assert!(matches!(id, EntityId::Uuid(_)));
    }

    #[test]
    fn entity_id_zero_padded_text_stays_a_key() {
        assert_eq!(EntityId::from("007"), EntityId::Key("007".into()));
        assert_eq!(EntityId::from("+7"), EntityId::Key("+7".into()));
        assert_ne!(EntityId::from("007"), EntityId::from("7"));

        let from_json: EntityId = serde_json::from_str("\"007\"").unwrap();
        assert_eq!(from_json.to_string(), "007");
    }

    #[test]
    fn entity_id_keeps_opaque_keys() {
        let id: EntityId = "north-paddock".parse().unwrap();
        assert_eq!(id, EntityId::Key("north-paddock".into()));
        assert_eq!(id.to_string(), "north-paddock");
    }

    #[test]
    fn entity_id_number_and_string_agree() {
        let from_number: EntityId = serde_json::from_str("7").unwrap();
        let from_string: EntityId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "7");
    }

    #[test]
    fn device_id_trims_whitespace() {
        let id = DeviceId::new(" 0011223344556677\n");
        assert_eq!(id.as_str(), "0011223344556677");
    }

    #[test]
    fn device_id_trims_when_deserialized() {
        let ids: Vec<DeviceId> = serde_json::from_str(r#"[" aa ", "bb\t"]"#).unwrap();
        assert_eq!(ids, vec![DeviceId::from("aa"), DeviceId::from("bb")]);
        assert_eq!(serde_json::to_string(&ids[0]).unwrap(), r#""aa""#);
    }
}
