//! Issue domain entities.
//!
//! Rows come from the remote store and are passed through with light
//! reshaping only: identifiers are opaque strings (the store may serve them
//! as numbers, so deserialization accepts both), timestamps stay as the
//! store's own strings, and no referential integrity is enforced locally.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Accept JSON strings or numbers for identifier-ish columns.
pub(crate) mod id_string {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Str(String),
        Int(i64),
        Float(f64),
    }

    impl StringOrNumber {
        fn into_string(self) -> String {
            match self {
                StringOrNumber::Str(s) => s,
                StringOrNumber::Int(n) => n.to_string(),
                StringOrNumber::Float(f) => f.to_string(),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        StringOrNumber::deserialize(deserializer)
            .map(StringOrNumber::into_string)
            .map_err(de::Error::custom)
    }

    pub mod option {
        use super::StringOrNumber;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(Option::<StringOrNumber>::deserialize(deserializer)?
                .map(StringOrNumber::into_string))
        }
    }
}

/// One stored photo: retrieval URL plus the host's deletion key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Image {
    pub url: String,
    pub public_id: String,
}

/// A reported civic issue as the remote store serves it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Issue {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Free-form "lat,lon" string, or empty.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Open-ended status tag: "pending", "assigned", "resolved", others allowed.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub department_id: Option<String>,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<String>,
}

/// A full citizen submission, resolved at the boundary from the multipart
/// form before entering the core.
#[derive(Debug, Clone, Default)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub status: Option<String>,
}

/// A partial update; only the populated fields are applied.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub department_id: Option<String>,
}

impl IssuePatch {
    /// The non-null fields as a JSON object for a partial PATCH.
    pub fn to_payload(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut payload = serde_json::Map::new();
        let fields = [
            ("title", &self.title),
            ("description", &self.description),
            ("status", &self.status),
            ("category", &self.category),
            ("location", &self.location),
            ("department_id", &self.department_id),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                payload.insert(key.to_string(), serde_json::Value::String(value.clone()));
            }
        }
        payload
    }
}
