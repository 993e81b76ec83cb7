//! Serde adapter for maps keyed by user id: JSON object keys are strings, the
//! in-memory key is the integer id.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::state::UserId;

pub fn serialize<S, V>(value: &BTreeMap<UserId, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let as_string = value
        .iter()
        .map(|(key, entry)| (key.to_string(), entry))
        .collect::<BTreeMap<_, _>>();
    as_string.serialize(serializer)
}

pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<UserId, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, entry)| {
            key.trim()
                .parse::<UserId>()
                .map(|parsed| (parsed, entry))
                .map_err(|err| serde::de::Error::custom(format!("invalid user id `{key}`: {err}")))
        })
        .collect()
}
