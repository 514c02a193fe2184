//! Normalization of stored or client-supplied recommendation payloads.
//!
//! Payloads reach us in several shapes depending on where they came from.
//! `PayloadShape::classify` names the shape; `normalize` flattens it to a
//! `RecommendationResult`, or `None` when there is nothing to show.

use serde_json::{Map, Value};

use crate::recommend::client::RecommendationResult;

/// Known input shapes, checked in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadShape {
    /// `{queryData, recommendations: {recommendations: [...], summary, additionalNotes}}`,
    /// produced when a saved search is reloaded.
    Nested {
        items: Vec<Value>,
        inner: Notes,
        outer: Notes,
    },
    /// `{recommendations: "<json text>", ...}`.
    Stringified { raw: String, outer: Notes },
    /// `{recommendations: [...], summary, additionalNotes}`.
    Flat { items: Vec<Value>, notes: Notes },
    /// A bare array of items that each carry a `name`.
    BareArray(Vec<Value>),
    /// Nothing recognisable beyond possibly some text.
    Unrecognized(Notes),
}

/// The two free-text fields that accompany the item list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notes {
    pub summary: Option<String>,
    pub additional_notes: Option<String>,
}

impl Notes {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            summary: non_empty_text(obj.get("summary")),
            additional_notes: non_empty_text(obj.get("additionalNotes")),
        }
    }

    /// Fields set on `self` win; gaps are filled from `fallback`.
    fn or(self, fallback: Notes) -> Notes {
        Notes {
            summary: self.summary.or(fallback.summary),
            additional_notes: self.additional_notes.or(fallback.additional_notes),
        }
    }

    fn is_empty(&self) -> bool {
        self.summary.is_none() && self.additional_notes.is_none()
    }
}

fn non_empty_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn is_named_item_list(items: &[Value]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|item| item.as_object().is_some_and(|o| o.contains_key("name")))
}

impl PayloadShape {
    pub fn classify(payload: &Value) -> Self {
        match payload {
            Value::Object(obj) => {
                let outer = Notes::from_object(obj);
                match obj.get("recommendations") {
                    Some(Value::Object(inner)) => match inner.get("recommendations") {
                        Some(Value::Array(items)) => PayloadShape::Nested {
                            items: items.clone(),
                            inner: Notes::from_object(inner),
                            outer,
                        },
                        _ => PayloadShape::Unrecognized(Notes::from_object(inner).or(outer)),
                    },
                    Some(Value::String(raw)) => PayloadShape::Stringified {
                        raw: raw.clone(),
                        outer,
                    },
                    Some(Value::Array(items)) => PayloadShape::Flat {
                        items: items.clone(),
                        notes: outer,
                    },
                    _ => PayloadShape::Unrecognized(outer),
                }
            }
            Value::Array(items) if is_named_item_list(items) => {
                PayloadShape::BareArray(items.clone())
            }
            _ => PayloadShape::Unrecognized(Notes::default()),
        }
    }
}

/// Flattens any known payload shape. `None` means "no content": no items and
/// no summary or notes text.
pub fn normalize(payload: &Value) -> Option<RecommendationResult> {
    let (items, notes) = match PayloadShape::classify(payload) {
        PayloadShape::Nested {
            items,
            inner,
            outer,
        } => (items, inner.or(outer)),
        PayloadShape::Stringified { raw, outer } => match serde_json::from_str::<Value>(&raw) {
            Ok(parsed) => {
                // The decoded text may itself be any of the other shapes.
                let (items, notes) = items_and_notes(&parsed);
                (items, notes.or(outer))
            }
            Err(_) => (Vec::new(), outer),
        },
        PayloadShape::Flat { items, notes } => (items, notes),
        PayloadShape::BareArray(items) => (items, Notes::default()),
        PayloadShape::Unrecognized(notes) => (Vec::new(), notes),
    };

    if items.is_empty() && notes.is_empty() {
        return None;
    }

    Some(RecommendationResult {
        recommendations: items,
        summary: notes.summary.unwrap_or_default(),
        additional_notes: notes.additional_notes.unwrap_or_default(),
    })
}

fn items_and_notes(payload: &Value) -> (Vec<Value>, Notes) {
    match payload {
        Value::Array(items) => (items.clone(), Notes::default()),
        other => match normalize(other) {
            Some(result) => (
                result.recommendations,
                Notes {
                    summary: Some(result.summary).filter(|s| !s.is_empty()),
                    additional_notes: Some(result.additional_notes).filter(|s| !s.is_empty()),
                },
            ),
            None => (Vec::new(), Notes::default()),
        },
    }
}

/// Number of items a payload normalizes to.
pub fn recommendation_count(payload: &Value) -> usize {
    normalize(payload).map_or(0, |r| r.recommendations.len())
}
