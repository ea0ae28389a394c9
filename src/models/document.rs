use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::event::NotificationEvent;

/// Name under which the whole document is visible to expressions.
pub const DOCUMENT_BINDING: &str = "doc";

/// A lifecycle event on a business document, as delivered by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEvent {
    pub doctype: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstatus: Option<i64>,

    /// Download key the host issued for the rendered document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_key: Option<String>,

    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl DocumentEvent {
    /// Resolves the rule trigger. A named lifecycle event takes precedence over
    /// the numeric document status.
    pub fn trigger(&self) -> Option<NotificationEvent> {
        match &self.event {
            Some(name) => NotificationEvent::from_lifecycle(name),
            None => self.docstatus.and_then(NotificationEvent::from_docstatus),
        }
    }

    pub fn document_ref(&self) -> DocumentRef {
        DocumentRef {
            doctype: self.doctype.clone(),
            name: self.name.clone(),
            share_key: self.share_key.clone(),
        }
    }

    pub fn context(&self) -> EvaluationContext {
        let mut fields = self.fields.clone();
        fields
            .entry("doctype")
            .or_insert_with(|| Value::String(self.doctype.clone()));
        fields
            .entry("name")
            .or_insert_with(|| Value::String(self.name.clone()));
        if let Some(docstatus) = self.docstatus {
            fields
                .entry("docstatus")
                .or_insert_with(|| Value::from(docstatus));
        }

        EvaluationContext::new(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub doctype: String,
    pub name: String,

    #[serde(default, skip_serializing)]
    pub share_key: Option<String>,
}

/// Read-only snapshot of a document's fields, shared by every expression
/// evaluated for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    document: Value,
}

impl EvaluationContext {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            document: Value::Object(fields),
        }
    }

    /// Looks up a top-level field. `doc` resolves to the whole document unless
    /// the document has a field of that name.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        if let Value::Object(fields) = &self.document {
            if let Some(value) = fields.get(name) {
                return Some(value);
            }
        }

        (name == DOCUMENT_BINDING).then_some(&self.document)
    }
}

impl From<Value> for EvaluationContext {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::new(fields),
            _ => Self::new(Map::new()),
        }
    }
}
