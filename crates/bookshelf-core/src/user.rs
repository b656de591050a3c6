//! User records.
//!
//! The stored `password` is an argon2 hash. It is read from the store but
//! never serialized back out, so every user returned by the API has it
//! stripped.

use bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::password::{PasswordError, hash_password};
use crate::types::{Resource, lenient_int};
use crate::validation::{
    ValidationResult, check_email, check_link, check_non_negative, check_optional_text, check_text,
    decode_patch, decode_payload,
};

/// A user as stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub batch: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl Resource for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";
}

/// Payload for creating a user. `password` arrives in plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl NewUser {
    /// Decode and validate a create payload.
    pub fn from_payload(payload: Map<String, Value>) -> ValidationResult<Self> {
        let user: Self = decode_payload(payload)?;
        user.validate()?;
        Ok(user)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        check_text("name", &self.name)?;
        check_text("email", &self.email)?;
        check_email("email", Some(&self.email))?;
        check_optional_text("phone", self.phone.as_deref())?;
        check_optional_text("roll", self.roll.as_deref())?;
        check_optional_text("department", self.department.as_deref())?;
        check_non_negative("batch", self.batch)?;
        check_optional_text("position", self.position.as_deref())?;
        check_link("profilePicture", self.profile_picture.as_deref())?;
        check_optional_text("password", self.password.as_deref())
    }

    /// Replace the plaintext password with its hash.
    pub fn hash_password(&mut self) -> Result<(), PasswordError> {
        hash_in_place(&mut self.password)
    }
}

/// Partial update for a user. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserPatch {
    /// Strip identifiers, decode and validate a partial update payload.
    pub fn from_payload(payload: Map<String, Value>) -> ValidationResult<Self> {
        let patch: Self = decode_patch(payload)?;
        patch.validate()?;
        Ok(patch)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        check_optional_text("name", self.name.as_deref())?;
        check_optional_text("email", self.email.as_deref())?;
        check_email("email", self.email.as_deref())?;
        check_optional_text("phone", self.phone.as_deref())?;
        check_optional_text("roll", self.roll.as_deref())?;
        check_optional_text("department", self.department.as_deref())?;
        check_non_negative("batch", self.batch)?;
        check_optional_text("position", self.position.as_deref())?;
        check_link("profilePicture", self.profile_picture.as_deref())?;
        check_optional_text("password", self.password.as_deref())
    }

    /// Replace a plaintext password, if present, with its hash.
    pub fn hash_password(&mut self) -> Result<(), PasswordError> {
        hash_in_place(&mut self.password)
    }
}

fn hash_in_place(password: &mut Option<String>) -> Result<(), PasswordError> {
    if let Some(plain) = password.take() {
        *password = Some(hash_password(&plain)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;
    use crate::validation::ValidationError;
    use bson::doc;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_new_user_from_payload() {
        let user = NewUser::from_payload(object(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "batch": 2021,
            "profilePicture": "https://example.com/ada.png"
        })))
        .unwrap();
        assert_eq!(user.batch, Some(2021));
        assert!(user.password.is_none());
    }

    #[test]
    fn test_new_user_rejects_bad_email() {
        let err = NewUser::from_payload(object(json!({
            "name": "Ada",
            "email": "nope"
        })))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field: "email", .. }));
    }

    #[test]
    fn test_new_user_hashes_password() {
        let mut user = NewUser::from_payload(object(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter2"
        })))
        .unwrap();
        user.hash_password().unwrap();
        let hash = user.password.as_deref().unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", hash));
    }

    #[test]
    fn test_user_password_never_serialized() {
        let document = doc! {
            "_id": ObjectId::new(),
            "name": "Ada",
            "email": "ada@example.com",
            "password": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
        };
        let user: User = bson::from_document(document).unwrap();
        assert!(user.password.is_some());

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["name"], "Ada");
    }

    #[test]
    fn test_patch_rejects_unknown_field() {
        let err = UserPatch::from_payload(object(json!({"nickname": "A"}))).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn test_patch_rejects_negative_batch() {
        let err = UserPatch::from_payload(object(json!({"batch": -3}))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field: "batch", .. }));
    }

    #[test]
    fn test_patch_rejects_null_field() {
        let err = UserPatch::from_payload(object(json!({"phone": null}))).unwrap_err();
        assert_eq!(err, ValidationError::NullField("phone".to_string()));
    }

    #[test]
    fn test_user_decodes_partial_document() {
        let document = doc! {
            "_id": ObjectId::new(),
            "name": "Legacy",
            "batch": 2019.0,
        };
        let user: User = bson::from_document(document).unwrap();
        assert!(user.email.is_none());
        assert_eq!(user.batch, Some(2019));
    }

    #[test]
    fn test_patch_without_password_is_unchanged_by_hashing() {
        let mut patch = UserPatch::from_payload(object(json!({"department": "CSE"}))).unwrap();
        patch.hash_password().unwrap();
        assert!(patch.password.is_none());
        assert_eq!(patch.department.as_deref(), Some("CSE"));
    }
}
