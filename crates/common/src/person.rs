use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// A person/passport record stored in the world state under its `id`.
///
/// Field declaration order is the wire order. Peers running contract
/// implementations in other languages re-serialize the same record, so the
/// JSON bytes must match key for key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique record key
    pub id: String,

    /// External passport document number
    #[serde(rename = "passport")]
    pub serial: String,

    pub name: String,
    pub surname: String,
    pub city: String,
    pub address: String,
    pub phone: String,
    pub married: bool,
}

impl Person {
    /// Serialize to the canonical JSON bytes written to the world state
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a record read back from the world state
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Records written by `InitLedger`
    pub fn seed() -> Vec<Person> {
        vec![
            Person {
                id: "person0".to_string(),
                serial: "0510 228148".to_string(),
                name: "Igor".to_string(),
                surname: "Nikolaev".to_string(),
                city: "Moscow".to_string(),
                address: "Likhachevsky proezd 2".to_string(),
                phone: "88005553535".to_string(),
                married: true,
            },
            Person {
                id: "person1".to_string(),
                serial: "1020 123654".to_string(),
                name: "Matvei".to_string(),
                surname: "Stepanov".to_string(),
                city: "Dolgoprudny".to_string(),
                address: "Universitetskaya 11".to_string(),
                phone: "88005553535".to_string(),
                married: false,
            },
        ]
    }
}

/// One change of a record, synthesized from the key's change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Transaction that made the change
    pub tx: String,

    /// Platform clock at the time of the change
    pub timestamp: DateTime<Utc>,

    /// Record value after the change, `None` when the change was a deletion
    pub data: Option<Person>,
}

impl HistoryEntry {
    pub fn is_delete(&self) -> bool {
        self.data.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_field_order() {
        let person = Person::seed().remove(0);
        let json = String::from_utf8(person.to_bytes().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"id":"person0","passport":"0510 228148","name":"Igor","surname":"Nikolaev","city":"Moscow","address":"Likhachevsky proezd 2","phone":"88005553535","married":true}"#
        );
    }

    #[test]
    fn test_bytes_roundtrip_keeps_boolean() {
        let person = Person::seed().remove(1);
        let decoded = Person::from_bytes(&person.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, person);
        assert!(!decoded.married);
    }

    #[test]
    fn test_malformed_bytes_are_a_serialization_fault() {
        let err = Person::from_bytes(b"{\"id\":\"p\"").unwrap_err();
        assert!(matches!(err, crate::Error::Serialization(_)));

        // Boolean must not be coerced from a string
        let err = Person::from_bytes(
            br#"{"id":"p","passport":"1","name":"n","surname":"s","city":"c","address":"a","phone":"p","married":"true"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, crate::Error::Serialization(_)));
    }

    #[test]
    fn test_history_entry_shape() {
        let entry = HistoryEntry {
            tx: "abc".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            data: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["tx"], "abc");
        assert_eq!(value["timestamp"], "2024-03-01T12:00:00Z");
        assert!(value["data"].is_null());
        assert!(entry.is_delete());
    }
}
