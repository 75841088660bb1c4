use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::Value;

/// JSON text codec used by a session.
///
/// Each session carries its own copy; there is no process-wide serializer
/// state, so sessions with different settings never interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    /// Drop object members whose value is `null` when encoding.
    ///
    /// Those members read back as the target type's default (`None` for
    /// `Option` fields) rather than as an explicit `null`.
    pub omit_null_fields: bool,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self {
            omit_null_fields: true,
        }
    }
}

impl JsonCodec {
    /// Serialize `value` to compact JSON text.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<Vec<u8>> {
        if !self.omit_null_fields {
            return serde_json::to_vec(value);
        }
        let mut tree = serde_json::to_value(value)?;
        strip_null_members(&mut tree);
        serde_json::to_vec(&tree)
    }

    /// Deserialize one JSON document into `T`.
    pub fn decode<T: DeserializeOwned>(&self, text: &[u8]) -> serde_json::Result<T> {
        serde_json::from_slice(text)
    }

    /// Check that `text` is UTF-8 holding exactly one syntactically valid
    /// JSON value.
    pub fn validate(&self, text: &[u8]) -> serde_json::Result<()> {
        let text = std::str::from_utf8(text)
            .map_err(<serde_json::Error as serde::de::Error>::custom)?;
        serde_json::from_str::<IgnoredAny>(text).map(|_| ())
    }
}

fn strip_null_members(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            map.values_mut().for_each(strip_null_members);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_null_members),
        _ => {}
    }
}
