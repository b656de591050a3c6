//! Book records.

use bson::{oid::ObjectId, serde_helpers::serialize_object_id_as_hex_string};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Resource, lenient_int};
use crate::validation::{
    ValidationError, ValidationResult, check_copies, check_link, check_non_negative,
    check_optional_text, check_text, decode_patch, decode_payload,
};

const MAX_PUBLICATION_YEAR: i64 = 9999;

/// A book as stored in the `books` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub total_copies: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int", skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Book {
    const COLLECTION: &'static str = "books";
    const LABEL: &'static str = "Book";
}

/// Payload for creating a book. The store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_copies: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewBook {
    /// Decode and validate a create payload.
    pub fn from_payload(payload: Map<String, Value>) -> ValidationResult<Self> {
        let book: Self = decode_payload(payload)?;
        book.validate()?;
        Ok(book)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        check_text("title", &self.title)?;
        check_text("author", &self.author)?;
        check_optional_text("publisher", self.publisher.as_deref())?;
        check_optional_text("isbn", self.isbn.as_deref())?;
        check_optional_text("edition", self.edition.as_deref())?;
        check_optional_text("category", self.category.as_deref())?;
        check_optional_text("language", self.language.as_deref())?;
        check_non_negative("totalCopies", self.total_copies)?;
        check_non_negative("availableCopies", self.available_copies)?;
        check_publication_year(self.publication_year)?;
        check_link("coverImage", self.cover_image.as_deref())?;
        check_copies(self.available_copies, self.total_copies)
    }
}

/// Partial update for a book. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_copies: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BookPatch {
    /// Strip identifiers, decode and validate a partial update payload.
    pub fn from_payload(payload: Map<String, Value>) -> ValidationResult<Self> {
        let patch: Self = decode_patch(payload)?;
        patch.validate()?;
        Ok(patch)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        check_optional_text("title", self.title.as_deref())?;
        check_optional_text("author", self.author.as_deref())?;
        check_optional_text("publisher", self.publisher.as_deref())?;
        check_optional_text("isbn", self.isbn.as_deref())?;
        check_optional_text("edition", self.edition.as_deref())?;
        check_optional_text("category", self.category.as_deref())?;
        check_optional_text("language", self.language.as_deref())?;
        check_non_negative("totalCopies", self.total_copies)?;
        check_non_negative("availableCopies", self.available_copies)?;
        check_publication_year(self.publication_year)?;
        check_link("coverImage", self.cover_image.as_deref())?;
        check_copies(self.available_copies, self.total_copies)
    }

    /// Whether the patch changes either copy count.
    pub fn touches_copies(&self) -> bool {
        self.total_copies.is_some() || self.available_copies.is_some()
    }

    /// Check the copy invariant on the record this patch would produce.
    pub fn check_against(&self, current: &Book) -> ValidationResult<()> {
        check_copies(
            self.available_copies.or(current.available_copies),
            self.total_copies.or(current.total_copies),
        )
    }
}

fn check_publication_year(year: Option<i64>) -> ValidationResult<()> {
    match year {
        Some(y) if !(0..=MAX_PUBLICATION_YEAR).contains(&y) => Err(ValidationError::invalid(
            "publicationYear",
            format!("must be between 0 and {MAX_PUBLICATION_YEAR}"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_new_book_from_payload() {
        let book = NewBook::from_payload(object(json!({
            "title": "A",
            "author": "B",
            "totalCopies": 3,
            "availableCopies": 3
        })))
        .unwrap();
        assert_eq!(book.title, "A");
        assert_eq!(book.total_copies, Some(3));
        assert!(book.publisher.is_none());
    }

    #[test]
    fn test_new_book_requires_title() {
        let err = NewBook::from_payload(object(json!({"author": "B"}))).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(msg) if msg.contains("title")));
    }

    #[test]
    fn test_new_book_ignores_supplied_id() {
        let book = NewBook::from_payload(object(json!({
            "_id": "507f1f77bcf86cd799439011",
            "title": "A",
            "author": "B"
        })))
        .unwrap();
        assert_eq!(book.author, "B");
    }

    #[test]
    fn test_new_book_rejects_excess_available_copies() {
        let err = NewBook::from_payload(object(json!({
            "title": "A",
            "author": "B",
            "totalCopies": 2,
            "availableCopies": 5
        })))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::CopiesExceedTotal {
                available: 5,
                total: 2
            }
        );
    }

    #[test]
    fn test_new_book_rejects_bad_year() {
        let err = NewBook::from_payload(object(json!({
            "title": "A",
            "author": "B",
            "publicationYear": 12000
        })))
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidField {
                field: "publicationYear",
                ..
            }
        ));
    }

    #[test]
    fn test_new_book_serializes_without_absent_fields() {
        let book = NewBook::from_payload(object(json!({"title": "A", "author": "B"}))).unwrap();
        let document = bson::to_document(&book).unwrap();
        assert_eq!(document, doc! { "title": "A", "author": "B" });
    }

    #[test]
    fn test_patch_strips_identifier() {
        let patch = BookPatch::from_payload(object(json!({
            "_id": "507f1f77bcf86cd799439011",
            "title": "New"
        })))
        .unwrap();
        let document = bson::to_document(&patch).unwrap();
        assert_eq!(document, doc! { "title": "New" });
    }

    #[test]
    fn test_patch_rejects_null_field() {
        let err = BookPatch::from_payload(object(json!({"description": null}))).unwrap_err();
        assert_eq!(err, ValidationError::NullField("description".to_string()));
    }

    #[test]
    fn test_patch_check_against_current() {
        let current = Book {
            id: ObjectId::new(),
            title: Some("A".into()),
            author: Some("B".into()),
            publisher: None,
            isbn: None,
            edition: None,
            category: None,
            language: None,
            total_copies: Some(3),
            available_copies: Some(2),
            publication_year: None,
            cover_image: None,
            description: None,
        };

        let raise = BookPatch {
            available_copies: Some(4),
            ..Default::default()
        };
        assert!(raise.touches_copies());
        assert!(raise.check_against(&current).is_err());

        let shrink = BookPatch {
            total_copies: Some(2),
            ..Default::default()
        };
        assert!(shrink.check_against(&current).is_ok());
    }

    #[test]
    fn test_book_from_document_to_json() {
        let id = ObjectId::new();
        let document = doc! {
            "_id": id,
            "title": "A",
            "author": "B",
            "totalCopies": 3_i32,
            "availableCopies": 3_i64,
        };
        let book: Book = bson::from_document(document).unwrap();
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["_id"], id.to_hex());
        assert_eq!(json["totalCopies"], 3);
        assert_eq!(json["availableCopies"], 3);
        assert!(json.get("publisher").is_none());
    }

    #[test]
    fn test_book_decodes_partial_document() {
        let id = ObjectId::new();
        let document = doc! {
            "_id": id,
            "title": "Legacy",
            "totalCopies": 3.0,
            "availableCopies": 1_i32,
        };
        let book: Book = bson::from_document(document).unwrap();
        assert!(book.author.is_none());
        assert_eq!(book.total_copies, Some(3));

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json, json!({"_id": id.to_hex(), "title": "Legacy", "totalCopies": 3, "availableCopies": 1}));
    }
}
