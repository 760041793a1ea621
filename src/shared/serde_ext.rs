use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use std::collections::BTreeMap;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(value) => value,
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Flag(value) => value.to_string(),
        }
    }
}

/// Accepts a mapping whose values are any YAML/JSON scalar and stores them as
/// strings. A null mapping reads as empty.
pub fn scalar_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<Scalar>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.map(Scalar::into_string).unwrap_or_default()))
        .collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accepts either a single string or a sequence of strings.
pub fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<OneOrMany>::deserialize(deserializer) {
        Ok(Some(OneOrMany::One(value))) => Ok(vec![value]),
        Ok(Some(OneOrMany::Many(values))) => Ok(values),
        Ok(None) => Ok(Vec::new()),
        Err(err) => Err(D::Error::custom(format!(
            "expected a string or a sequence of strings: {err}"
        ))),
    }
}

/// Writes a single entry as a bare string and anything longer as a sequence.
pub fn serialize_one_or_many<S>(values: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match values {
        [single] => serializer.serialize_str(single),
        _ => serializer.collect_seq(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "scalar_string_map")]
        args: BTreeMap<String, String>,
        #[serde(default, deserialize_with = "one_or_many")]
        requires: Vec<String>,
    }

    #[test]
    fn scalar_values_are_stored_as_strings() {
        let probe: Probe = serde_yaml::from_str("args:\n  port: 80\n  verbose: true\n  host: example\n")
            .expect("parse probe");
        assert_eq!(probe.args["port"], "80");
        assert_eq!(probe.args["verbose"], "true");
        assert_eq!(probe.args["host"], "example");
    }

    #[test]
    fn requires_accepts_single_string_and_sequence() {
        let single: Probe = serde_yaml::from_str("requires: scan\n").expect("single");
        assert_eq!(single.requires, vec!["scan".to_string()]);

        let many: Probe = serde_yaml::from_str("requires: [scan, 'dns:resolve']\n").expect("many");
        assert_eq!(
            many.requires,
            vec!["scan".to_string(), "dns:resolve".to_string()]
        );

        let absent: Probe = serde_yaml::from_str("{}").expect("absent");
        assert!(absent.requires.is_empty());
    }
}
