use std::fmt::{Display, Formatter, Result};

use chrono::{Local, NaiveDateTime, ParseError};
use log::debug;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::model::Kind;

/// Discriminator key in the wire format, kept for compatibility with
/// existing data files.
pub const CLASS_KEY: &str = "__class__";

const TIMESTAMP_OUT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const TIMESTAMP_IN: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One stored object: a typed core plus an open-ended bag of extra
/// attributes. The core fields always serialize; the extras merge flat into
/// the same record.
#[derive(Debug, Clone)]
pub struct Entity {
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    kind: Kind,
    extra: Map<String, Value>,
}

impl Entity {
    pub fn new(kind: Kind) -> Self {
        let now = Local::now().naive_local();

        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            kind,
            extra: Map::new(),
        }
    }

    /// Rebuilds an entity from a stored record. The discriminator is
    /// consumed, timestamps are parsed back from text, every other field is
    /// copied verbatim into the extras. An unparseable timestamp is an
    /// error; a missing one falls back to the current time.
    pub fn from_record(kind: Kind, record: Map<String, Value>) -> std::result::Result<Self, ParseError> {
        let mut extra = record;
        extra.shift_remove(CLASS_KEY);

        let id = match extra.shift_remove("id") {
            Some(Value::String(id)) => id,
            Some(other) => other.to_string(),
            None => {
                debug!("record has no id field");
                String::new()
            }
        };

        let created_at = parse_timestamp("created_at", extra.shift_remove("created_at"))?;
        let updated_at = parse_timestamp("updated_at", extra.shift_remove("updated_at"))?;

        Ok(Self {
            id,
            created_at,
            updated_at,
            kind,
            extra,
        })
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub const fn kind(&self) -> Kind {
        self.kind
    }

    pub const fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Composite registry key, `<Kind>.<id>`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.kind, self.id)
    }

    /// Bumps `updated_at` to the current time.
    pub fn touch(&mut self) {
        self.updated_at = Local::now().naive_local();
    }

    /// Assigns one attribute. The typed core fields are not protected from
    /// overwrite: `id` takes the value's textual form, and the timestamps
    /// accept valid ISO-8601 text. The discriminator is never writable.
    pub fn set_attr(&mut self, name: &str, value: Value) {
        match name {
            "id" => {
                self.id = match value {
                    Value::String(id) => id,
                    other => other.to_string(),
                };
            }
            "created_at" => match timestamp_value(&value) {
                Some(stamp) => self.created_at = stamp,
                None => debug!("discarding unparseable created_at {value}"),
            },
            "updated_at" => match timestamp_value(&value) {
                Some(stamp) => self.updated_at = stamp,
                None => debug!("discarding unparseable updated_at {value}"),
            },
            CLASS_KEY => debug!("discarding {CLASS_KEY} assignment"),
            _ => {
                self.extra.insert(name.to_owned(), value);
            }
        }
    }

    /// Serializable record: core fields, extras, and the discriminator,
    /// timestamps rendered as ISO-8601 text. Suitable as direct input to
    /// `from_record`.
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("id".to_owned(), Value::String(self.id.clone()));
        record.insert(
            "created_at".to_owned(),
            Value::String(self.created_at.format(TIMESTAMP_OUT).to_string()),
        );
        record.insert(
            "updated_at".to_owned(),
            Value::String(self.updated_at.format(TIMESTAMP_OUT).to_string()),
        );
        for (key, value) in &self.extra {
            record.insert(key.clone(), value.clone());
        }
        record.insert(CLASS_KEY.to_owned(), Value::String(self.kind.to_string()));
        record
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let mut attributes = self.to_record();
        attributes.shift_remove(CLASS_KEY);

        write!(f, "[{}] ({}) {}", self.kind, self.id, Value::Object(attributes))
    }
}

fn parse_timestamp(field: &str, value: Option<Value>) -> std::result::Result<NaiveDateTime, ParseError> {
    match value {
        Some(Value::String(text)) => NaiveDateTime::parse_from_str(&text, TIMESTAMP_IN),
        Some(other) => {
            debug!("record has a non-text {field} field: {other}");
            Ok(Local::now().naive_local())
        }
        None => {
            debug!("record has no {field} field");
            Ok(Local::now().naive_local())
        }
    }
}

fn timestamp_value(value: &Value) -> Option<NaiveDateTime> {
    value
        .as_str()
        .and_then(|text| NaiveDateTime::parse_from_str(text, TIMESTAMP_IN).ok())
}
