use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Profile and app settings persisted next to the lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub dark_mode: bool,
    pub notifications: bool,
    pub push_token: Option<String>,
    pub profile_pic: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            notifications: true,
            push_token: None,
            profile_pic: None,
            user_name: None,
            email: None,
        }
    }
}

impl UserPreferences {
    /// Reads preferences out of a raw user document
    ///
    /// Each field falls back to its default when absent or of the wrong type.
    /// Older documents spell some fields differently (`pushToken` vs
    /// `pushNotifToken`, `username` vs `userName`); the first present wins.
    pub fn from_document(doc: Option<&Value>) -> Self {
        let defaults = Self::default();
        let Some(fields) = doc.and_then(Value::as_object) else {
            return defaults;
        };

        Self {
            dark_mode: bool_field(fields, "darkMode").unwrap_or(defaults.dark_mode),
            notifications: bool_field(fields, "notifications").unwrap_or(defaults.notifications),
            push_token: string_field(fields, &["pushNotifToken", "pushToken"]),
            profile_pic: string_field(fields, &["profilePic"]),
            user_name: string_field(fields, &["userName", "username"]),
            email: string_field(fields, &["email"]),
        }
    }

    /// Document fields written when an account is first provisioned
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("darkMode".to_string(), Value::Bool(self.dark_mode));
        fields.insert("notifications".to_string(), Value::Bool(self.notifications));
        let optional = [
            ("pushNotifToken", &self.push_token),
            ("profilePic", &self.profile_pic),
            ("userName", &self.user_name),
            ("email", &self.email),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.insert(name.to_string(), Value::String(value.clone()));
            }
        }
        fields
    }
}

fn bool_field(fields: &Map<String, Value>, name: &str) -> Option<bool> {
    fields.get(name).and_then(Value::as_bool)
}

fn string_field(fields: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| fields.get(*name).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Partial settings change; only supplied fields are written
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreferencesUpdate {
    pub dark_mode: Option<bool>,
    pub notifications: Option<bool>,
    pub push_token: Option<String>,
    pub profile_pic: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
}

impl PreferencesUpdate {
    /// Builds the merge-write payload, validating the supplied values
    pub fn to_fields(&self) -> AppResult<Map<String, Value>> {
        let mut fields = Map::new();

        if let Some(dark_mode) = self.dark_mode {
            fields.insert("darkMode".to_string(), Value::Bool(dark_mode));
        }
        if let Some(notifications) = self.notifications {
            fields.insert("notifications".to_string(), Value::Bool(notifications));
        }
        if let Some(token) = &self.push_token {
            fields.insert(
                "pushNotifToken".to_string(),
                Value::String(non_blank("pushToken", token)?),
            );
        }
        if let Some(pic) = &self.profile_pic {
            fields.insert("profilePic".to_string(), Value::String(pic.trim().to_string()));
        }
        if let Some(name) = &self.user_name {
            fields.insert(
                "userName".to_string(),
                Value::String(non_blank("userName", name)?),
            );
        }
        if let Some(email) = &self.email {
            let email = non_blank("email", email)?;
            if !email.contains('@') {
                return Err(AppError::InvalidInput(format!(
                    "'{}' is not an email address",
                    email
                )));
            }
            fields.insert("email".to_string(), Value::String(email));
        }

        if fields.is_empty() {
            return Err(AppError::InvalidInput(
                "no preference fields supplied".to_string(),
            ));
        }

        Ok(fields)
    }
}

fn non_blank(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}
