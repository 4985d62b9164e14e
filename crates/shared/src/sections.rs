//! Singleton storefront sections. The server creates each one lazily, so a
//! body without an `id` is simply a section nobody has configured yet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub image_url: Option<String>,
    pub background_color: String,
    pub hero_box_title: String,
    pub hero_box_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub heading: String,
    pub description: String,
    pub image_url: Option<String>,
    pub cta_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// "Why our furniture is something more" block with its bullet list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FurnitureDetailsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub heading: String,
    pub subheading: String,
    pub image_url: Option<String>,
    pub details: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialsSectionSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub heading: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoriesSectionSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub heading: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Newsletter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Newsletter {
    fn default() -> Self {
        Self {
            id: None,
            title: "Subscribe to Our Newsletter".to_string(),
            description: String::new(),
            placeholder: "Enter your email".to_string(),
            updated_at: None,
        }
    }
}
