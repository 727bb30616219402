use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};

use crate::components::{array::Array, collection::Collection, image::Image};

/// Acquisition time of an image.
pub const TIME_START: &str = "system:time_start";
/// Identifier of the scene an image was read from.
pub const SCENE_ID: &str = "system:index";

/// Evaluated property.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Time(DateTime<Utc>),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_time(&self) -> Option<&DateTime<Utc>> {
        match self {
            PropertyValue::Time(time) => Some(time),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        PropertyValue::Time(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.into())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

/// Image property, resolved by an engine only when requested.
#[derive(Clone, Debug)]
pub enum Property {
    Value(PropertyValue),
    /// Absent when `source` has no `key`.
    CopiedFrom { source: Image, key: String },
    /// Taken from the earliest image of `collection`, absent when it is empty.
    FirstOf { collection: Collection, key: String },
    /// `100 * values[index] / sum(values)` formatted with two decimals.
    PercentOfTotal { values: Array, index: usize },
    /// Comma separated `labels` whose value magnitude is at most `tolerance`.
    NearZero {
        values: Array,
        labels: Arc<[String]>,
        tolerance: f64,
    },
}

impl Property {
    pub fn copied(source: &Image, key: &str) -> Self {
        Property::CopiedFrom {
            source: source.clone(),
            key: key.into(),
        }
    }
}

impl From<PropertyValue> for Property {
    fn from(value: PropertyValue) -> Self {
        Property::Value(value)
    }
}

pub type Properties = BTreeMap<String, Property>;
pub type PropertyValues = BTreeMap<String, PropertyValue>;
