//! Wire models exchanged with the password service.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Opaque entry/category/tag identifier.
///
/// The server emits numeric ids; strings are accepted too. Numeric ids are
/// written back as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "RawId")]
pub struct EntryId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Str(String),
}

impl From<RawId> for EntryId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Str(s) => Self(s),
        }
    }
}

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for EntryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for EntryId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// The backend stores flags as TINYINT; accept `true`/`false` and `0`/`1`.
fn bool_or_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

/// Which server query produced a cached list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterKey {
    All,
    Favorites,
    Recent,
    Oldest,
}

impl FilterKey {
    pub const ALL: [FilterKey; 4] = [
        FilterKey::All,
        FilterKey::Favorites,
        FilterKey::Recent,
        FilterKey::Oldest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::All => "All",
            FilterKey::Favorites => "Favorites",
            FilterKey::Recent => "Recent",
            FilterKey::Oldest => "Oldest",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterKey::All),
            "favorites" | "favourites" | "fav" => Ok(FilterKey::Favorites),
            "recent" => Ok(FilterKey::Recent),
            "oldest" => Ok(FilterKey::Oldest),
            other => Err(format!(
                "unknown filter '{}', expected one of: all, favorites, recent, oldest",
                other
            )),
        }
    }
}

/// Tag attached to an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRef {
    #[serde(rename = "type_id")]
    pub id: EntryId,
    #[serde(default, rename = "type_name", alias = "name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One stored credential as delivered by the server.
///
/// `password` is plaintext; the client never encrypts or decrypts.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultEntry {
    #[serde(rename = "pass_id", alias = "id")]
    pub id: EntryId,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<EntryId>,
    #[serde(default, rename = "types")]
    pub tags: Vec<TagRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

// Keep secrets out of debug logs.
impl fmt::Debug for VaultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultEntry")
            .field("id", &self.id)
            .field("service", &self.service)
            .field("username", &self.username)
            .field("password", &"********")
            .field("is_favorite", &self.is_favorite)
            .field("category_id", &self.category_id)
            .field("tags", &self.tags)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Body for create and update requests.
#[derive(Clone, Serialize)]
pub struct EntryInput {
    pub service: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<EntryId>,
    #[serde(rename = "type_id")]
    pub tag_ids: Vec<EntryId>,
    pub is_favorite: bool,
}

impl fmt::Debug for EntryInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryInput")
            .field("service", &self.service)
            .field("username", &self.username)
            .field("category_id", &self.category_id)
            .field("tag_ids", &self.tag_ids)
            .field("is_favorite", &self.is_favorite)
            .finish_non_exhaustive()
    }
}

/// `/user-info` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

/// `/profile` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, alias = "id")]
    pub user_id: Option<EntryId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub user_phone: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

/// `PUT /profile` body. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.user_phone.is_none()
    }
}

/// `POST /register/confirm` body.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub user_email: String,
    pub user_password: String,
    /// Five-digit code mailed by `/register/start`.
    pub code: String,
}

/// Entry category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "category_id", alias = "id")]
    pub id: EntryId,
    #[serde(default, alias = "category_name")]
    pub name: String,
}

/// Tag type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagType {
    #[serde(rename = "type_id", alias = "id")]
    pub id: EntryId,
    #[serde(default, alias = "type_name")]
    pub name: String,
}

/// Options for server-side password generation.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratePasswordOptions {
    pub length: u32,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub special: bool,
}

impl Default for GeneratePasswordOptions {
    fn default() -> Self {
        Self {
            length: 16,
            uppercase: true,
            lowercase: true,
            numbers: true,
            special: true,
        }
    }
}

impl GeneratePasswordOptions {
    /// At least one character class must be enabled.
    pub fn has_character_class(&self) -> bool {
        self.uppercase || self.lowercase || self.numbers || self.special
    }
}

/// `/generate-password` response.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeneratedPassword {
    pub password: String,
    #[serde(default)]
    pub strength: Option<String>,
}

impl fmt::Debug for GeneratedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedPassword")
            .field("strength", &self.strength)
            .finish_non_exhaustive()
    }
}

/// `/login` response.
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthScoreResponse {
    pub health_score: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleFavoriteResponse {
    #[serde(deserialize_with = "bool_or_int")]
    pub is_favorite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_from_server_shape() {
        let json = r#"{
            "pass_id": 12,
            "service": "Gmail",
            "username": "a@b.com",
            "password": "hunter2",
            "is_favorite": 1,
            "category_id": 3,
            "types": [{"type_id": 1, "type_name": "work"}, {"type_id": "x"}],
            "created_at": "2025-01-01T10:00:00Z"
        }"#;

        let entry: VaultEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, EntryId::from(12));
        assert_eq!(entry.service, "Gmail");
        assert!(entry.is_favorite);
        assert_eq!(entry.category_id, Some(EntryId::from(3)));
        assert_eq!(entry.tags.len(), 2);
        assert_eq!(entry.tags[0].name.as_deref(), Some("work"));
        assert_eq!(entry.tags[1].id.as_str(), "x");
    }

    #[test]
    fn test_entry_accepts_plain_id_and_missing_fields() {
        let entry: VaultEntry =
            serde_json::from_str(r#"{"id": 1, "service": "Gmail", "is_favorite": true}"#).unwrap();
        assert_eq!(entry.id.as_str(), "1");
        assert!(entry.is_favorite);
        assert!(entry.username.is_empty());
        assert!(entry.tags.is_empty());
        assert!(entry.category_id.is_none());
    }

    #[test]
    fn test_entry_debug_hides_password() {
        let entry: VaultEntry =
            serde_json::from_str(r#"{"id": 1, "service": "Gmail", "password": "hunter2"}"#)
                .unwrap();
        let debug = format!("{:?}", entry);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("Gmail"));
    }

    #[test]
    fn test_entry_input_wire_shape() {
        let input = EntryInput {
            service: "Gmail".to_string(),
            username: "a@b.com".to_string(),
            password: "x".to_string(),
            category_id: Some(EntryId::from(2)),
            tag_ids: vec![EntryId::from(5), EntryId::from("custom")],
            is_favorite: false,
        };

        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["category_id"], serde_json::json!(2));
        assert_eq!(value["type_id"], serde_json::json!([5, "custom"]));
        assert_eq!(value["is_favorite"], serde_json::json!(false));
        assert!(!format!("{:?}", input).contains("\"x\""));
    }

    #[test]
    fn test_filter_key_parsing() {
        assert_eq!("all".parse::<FilterKey>().unwrap(), FilterKey::All);
        assert_eq!("Favorites".parse::<FilterKey>().unwrap(), FilterKey::Favorites);
        assert_eq!(" RECENT ".parse::<FilterKey>().unwrap(), FilterKey::Recent);
        assert_eq!("oldest".parse::<FilterKey>().unwrap(), FilterKey::Oldest);
        assert!("newest".parse::<FilterKey>().is_err());
    }

    #[test]
    fn test_filter_key_display_round_trips() {
        for filter in FilterKey::ALL {
            assert_eq!(filter.to_string().parse::<FilterKey>().unwrap(), filter);
        }
    }

    #[test]
    fn test_toggle_response_accepts_int_flag() {
        let resp: ToggleFavoriteResponse = serde_json::from_str(r#"{"is_favorite": 0}"#).unwrap();
        assert!(!resp.is_favorite);
    }

    #[test]
    fn test_profile_accepts_id_alias() {
        let profile: Profile =
            serde_json::from_str(r#"{"id": 9, "username": "neo", "first_name": "Thomas"}"#).unwrap();
        assert_eq!(profile.user_id, Some(EntryId::from(9)));
        assert_eq!(profile.username.as_deref(), Some("neo"));
        assert!(profile.user_phone.is_none());
    }

    #[test]
    fn test_generate_options_require_a_class() {
        let mut options = GeneratePasswordOptions::default();
        assert!(options.has_character_class());
        options.uppercase = false;
        options.lowercase = false;
        options.numbers = false;
        options.special = false;
        assert!(!options.has_character_class());
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            user_phone: Some("555".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({"user_phone": "555"}));
        assert!(ProfileUpdate::default().is_empty());
    }
}
