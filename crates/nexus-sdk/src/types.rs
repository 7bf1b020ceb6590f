//! Wire helpers shared by the models.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// JSON-LD allows `@type` and friends to be a single string or an array.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

/// Percent-encode an identifier for use as one path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Overlay the keys of `overlay` on top of `base`. Non-object inputs leave
/// `base` unchanged.
pub(crate) fn merge_objects(mut base: Value, overlay: Value) -> Value {
    if let (Value::Object(target), Value::Object(source)) = (&mut base, overlay) {
        target.extend(source);
    }
    base
}
