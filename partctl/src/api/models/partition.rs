use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Body of `POST /partition`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PartitionRequest {
    /// Name of a previously uploaded file. Missing means empty, which hands the script the
    /// uploads directory itself.
    #[serde(default)]
    pub file: String,
    /// Column names handed to the script, in order. Missing or `null` means none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub columns: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_default_to_empty() {
        let request: PartitionRequest = serde_json::from_str(r#"{"file": "data.csv"}"#).unwrap();
        assert!(request.columns.is_empty());

        let request: PartitionRequest = serde_json::from_str(r#"{"file": "data.csv", "columns": null}"#).unwrap();
        assert!(request.columns.is_empty());
    }

    #[test]
    fn test_file_defaults_to_empty() {
        let request: PartitionRequest = serde_json::from_str(r#"{"columns": ["a"]}"#).unwrap();

        assert_eq!(request.file, "");
        assert_eq!(request.columns, vec!["a".to_string()]);
    }

    #[test]
    fn test_file_must_be_a_string() {
        assert!(serde_json::from_str::<PartitionRequest>(r#"{"file": 7}"#).is_err());
    }
}
