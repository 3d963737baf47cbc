use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::Duration;

/// Serializes Duration as whole milliseconds
pub fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    (duration.as_millis() as u64).serialize(serializer)
}

/// Deserializes Duration from whole milliseconds
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(millis))
}

/// Serializes an optional Duration as whole milliseconds
pub fn serialize_opt_duration<S>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    duration
        .map(|d| d.as_millis() as u64)
        .serialize(serializer)
}

/// Deserializes an optional Duration from whole milliseconds
pub fn deserialize_opt_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = Option::<u64>::deserialize(deserializer)?;
    Ok(millis.map(Duration::from_millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[derive(Serialize, Deserialize)]
    struct Test {
        #[serde(serialize_with = "serialize_duration")]
        #[serde(deserialize_with = "deserialize_duration")]
        timeout: Duration,
        #[serde(serialize_with = "serialize_opt_duration")]
        #[serde(deserialize_with = "deserialize_opt_duration")]
        limit: Option<Duration>,
    }

    #[test]
    fn test_duration_serialization() {
        let original = Test {
            timeout: Duration::from_millis(1500),
            limit: None,
        };

        let serialized = serde_json::to_string(&original).unwrap();
        assert_eq!(serialized, r#"{"timeout":1500,"limit":null}"#);

        let deserialized: Test = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.timeout, original.timeout);
        assert_eq!(deserialized.limit, None);
    }

    #[test]
    fn test_optional_duration_present() {
        let deserialized: Test =
            serde_json::from_str(r#"{"timeout":1000,"limit":60000}"#).unwrap();
        assert_eq!(deserialized.limit, Some(Duration::from_secs(60)));
    }
}
