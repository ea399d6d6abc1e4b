//! Request argument schemas for the video resource.
//!
//! Arguments arrive as a flat JSON object (form and query values are strings) and are
//! checked field by field. Every failing field is reported with its help text so the
//! caller can tell which one to fix.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use snafu::Snafu;

use crate::model::{CreateVideo, UpdateVideo};

/// A single declared argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub help: &'static str,
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, help: &'static str) -> Self {
        Field {
            name,
            help,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, help: &'static str) -> Self {
        Field {
            name,
            help,
            required: false,
        }
    }
}

/// The three video arguments under one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: Field,
    pub views: Field,
    pub likes: Field,
}

pub const CREATE: Schema = Schema {
    name: Field::required("name", "Name of the video is required"),
    views: Field::required("views", "Views of the video is required"),
    likes: Field::required("likes", "Likes of the video is required"),
};

pub const UPDATE: Schema = Schema {
    name: Field::optional("name", "Name of the video"),
    views: Field::optional("views", "Views of the video"),
    likes: Field::optional("likes", "Likes of the video"),
};

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("invalid request arguments: {}", fields(errors)))]
pub struct ValidationError {
    /// field name to message
    pub errors: BTreeMap<&'static str, String>,
}

fn fields(errors: &BTreeMap<&'static str, String>) -> String {
    errors.keys().copied().collect::<Vec<_>>().join(", ")
}

pub fn create_video(input: &Map<String, Value>) -> Result<CreateVideo, ValidationError> {
    let mut parser = Parser::new(input);

    let name = parser.text(&CREATE.name);
    let views = parser.integer(&CREATE.views);
    let likes = parser.integer(&CREATE.likes);

    parser.finish()?;

    // required fields are all present once `finish` succeeds
    Ok(CreateVideo {
        name: name.unwrap_or_default(),
        views: views.unwrap_or_default(),
        likes: likes.unwrap_or_default(),
    })
}

pub fn update_video(input: &Map<String, Value>) -> Result<UpdateVideo, ValidationError> {
    let mut parser = Parser::new(input);

    let update = UpdateVideo {
        name: parser.text(&UPDATE.name),
        views: parser.integer(&UPDATE.views),
        likes: parser.integer(&UPDATE.likes),
    };

    parser.finish()?;
    Ok(update)
}

struct Parser<'a> {
    input: &'a Map<String, Value>,
    errors: BTreeMap<&'static str, String>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a Map<String, Value>) -> Self {
        Parser {
            input,
            errors: BTreeMap::new(),
        }
    }

    /// `null` counts as not supplied.
    fn lookup(&mut self, field: &Field) -> Option<&'a Value> {
        let value = self.input.get(field.name).filter(|value| !value.is_null());

        if value.is_none() && field.required {
            self.errors.insert(field.name, field.help.to_string());
        }

        value
    }

    fn reject(&mut self, field: &Field, reason: impl std::fmt::Display) {
        self.errors
            .insert(field.name, format!("{}: {}", field.help, reason));
    }

    fn text(&mut self, field: &Field) -> Option<String> {
        match self.lookup(field)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => {
                self.reject(field, "expected a string");
                None
            }
        }
    }

    fn integer(&mut self, field: &Field) -> Option<i64> {
        match self.lookup(field)? {
            Value::Number(number) => match number.as_i64() {
                Some(value) => Some(value),
                None => {
                    self.reject(field, format!("'{number}' is not an integer"));
                    None
                }
            },
            Value::String(text) => match text.trim().parse::<i64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    self.reject(field, format!("'{text}' is not an integer"));
                    None
                }
            },
            _ => {
                self.reject(field, "expected an integer");
                None
            }
        }
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test arguments must be an object"),
        }
    }

    #[test]
    fn create_accepts_complete_arguments() {
        let result = create_video(&args(json!({ "name": "a", "views": 1, "likes": 2 })));
        assert_eq!(result, Ok(CreateVideo::new("a".into(), 1, 2)));
    }

    #[test]
    fn create_coerces_form_strings() {
        let result = create_video(&args(json!({ "name": "a", "views": " 10 ", "likes": "-3" })));
        assert_eq!(result, Ok(CreateVideo::new("a".into(), 10, -3)));
    }

    #[test]
    fn create_reports_every_missing_field() {
        let error = create_video(&args(json!({ "views": 1 }))).unwrap_err();

        assert_eq!(error.errors.len(), 2);
        assert_eq!(error.errors["name"], "Name of the video is required");
        assert_eq!(error.errors["likes"], "Likes of the video is required");
    }

    #[test]
    fn create_treats_null_as_missing() {
        let error =
            create_video(&args(json!({ "name": null, "views": 1, "likes": 1 }))).unwrap_err();
        assert_eq!(error.errors["name"], "Name of the video is required");
    }

    #[test]
    fn create_rejects_non_integer_views() {
        let error =
            create_video(&args(json!({ "name": "a", "views": "many", "likes": 1 }))).unwrap_err();

        assert_eq!(error.errors.len(), 1);
        assert_eq!(
            error.errors["views"],
            "Views of the video is required: 'many' is not an integer"
        );
    }

    #[test]
    fn integer_rejects_floats_and_booleans() {
        let error =
            create_video(&args(json!({ "name": "a", "views": 1.5, "likes": true }))).unwrap_err();

        assert!(error.errors.contains_key("views"));
        assert_eq!(
            error.errors["likes"],
            "Likes of the video is required: expected an integer"
        );
    }

    #[test]
    fn text_accepts_numbers() {
        let result = create_video(&args(json!({ "name": 42, "views": 1, "likes": 1 })));
        assert_eq!(result.map(|video| video.name), Ok("42".to_string()));
    }

    #[test]
    fn text_rejects_objects() {
        let error = update_video(&args(json!({ "name": { "nested": true } }))).unwrap_err();
        assert_eq!(error.errors["name"], "Name of the video: expected a string");
    }

    #[test]
    fn update_allows_empty_arguments() {
        let result = update_video(&Map::new());
        assert_eq!(result, Ok(UpdateVideo::default()));
    }

    #[test]
    fn update_keeps_zero_values() {
        let result = update_video(&args(json!({ "views": 0, "likes": "0" })));
        assert_eq!(result, Ok(UpdateVideo::new(None, Some(0), Some(0))));
    }

    #[test]
    fn update_rejects_wrong_type() {
        let error = update_video(&args(json!({ "likes": "lots" }))).unwrap_err();
        assert_eq!(
            error.errors["likes"],
            "Likes of the video: 'lots' is not an integer"
        );
    }

    #[test]
    fn unknown_arguments_are_ignored() {
        let result = update_video(&args(json!({ "title": "ignored", "name": "b" })));
        assert_eq!(result, Ok(UpdateVideo::new(Some("b".into()), None, None)));
    }

    #[test]
    fn error_message_lists_fields() {
        let error = create_video(&Map::new()).unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid request arguments: likes, name, views"
        );
    }
}
