//! List-backed content records and the drafts used to create or update them.
//!
//! Records are what the server returns and always carry an id. Drafts are what
//! the editor submits; they never carry one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    FaqCategory, FaqId, FooterColumnType, FooterLinkId, FooterSectionId, GalleryCategory,
    GalleryItemId, NavbarItemId, PartnerId, SocialLinkId, SocialPlatform, StoryId, TestimonialId,
};

fn active() -> bool {
    true
}

fn five_stars() -> u8 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryDraft {
    pub title: String,
    pub excerpt: String,
    pub author: String,
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: TestimonialId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "five_stars")]
    pub rating: u8,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestimonialDraft {
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub comment: String,
    #[serde(default = "five_stars")]
    pub rating: u8,
    #[serde(default)]
    pub image_url: String,
}

impl Default for TestimonialDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: String::new(),
            comment: String::new(),
            rating: five_stars(),
            image_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: GalleryItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: GalleryCategory,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItemDraft {
    pub title: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: GalleryCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub id: FaqId,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub category: FaqCategory,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqDraft {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: FaqCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: PartnerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerDraft {
    pub name: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub link: String,
}

/// Header navigation entry. Children of a dropdown carry `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavbarItem {
    pub id: NavbarItemId,
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub icon_class: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_dropdown: bool,
    #[serde(default)]
    pub parent_id: Option<NavbarItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavbarItemDraft {
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub icon_class: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_dropdown: bool,
    #[serde(default)]
    pub parent_id: Option<NavbarItemId>,
}

impl Default for NavbarItemDraft {
    fn default() -> Self {
        Self {
            label: String::new(),
            url: String::new(),
            icon_class: String::new(),
            order: 0,
            is_active: true,
            is_dropdown: false,
            parent_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterSection {
    pub id: FooterSectionId,
    pub column_title: String,
    pub column_type: FooterColumnType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterSectionDraft {
    pub column_title: String,
    #[serde(default)]
    pub column_type: FooterColumnType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl Default for FooterSectionDraft {
    fn default() -> Self {
        Self {
            column_title: String::new(),
            column_type: FooterColumnType::default(),
            content: String::new(),
            order: 0,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterLink {
    pub id: FooterLinkId,
    pub section_id: FooterSectionId,
    pub link_text: String,
    pub link_url: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterLinkDraft {
    #[serde(default)]
    pub section_id: Option<FooterSectionId>,
    pub link_text: String,
    pub link_url: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl Default for FooterLinkDraft {
    fn default() -> Self {
        Self {
            section_id: None,
            link_text: String::new(),
            link_url: String::new(),
            order: 0,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub id: SocialLinkId,
    pub platform: SocialPlatform,
    pub url: String,
    #[serde(default)]
    pub icon_class: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinkDraft {
    #[serde(default)]
    pub platform: SocialPlatform,
    pub url: String,
    #[serde(default)]
    pub icon_class: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl Default for SocialLinkDraft {
    fn default() -> Self {
        Self {
            platform: SocialPlatform::default(),
            url: String::new(),
            icon_class: String::new(),
            order: 0,
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_tolerates_nulls_and_extra_server_fields() {
        let story: Story = serde_json::from_value(serde_json::json!({
            "id": 42,
            "title": "Oak Table Story",
            "excerpt": "...",
            "author": "J. Lee",
            "image": null,
            "image_url": null,
            "order": 0,
            "is_active": true,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00.123456+02:00"
        }))
        .expect("story");

        assert_eq!(story.id, StoryId(42));
        assert_eq!(story.image_url, None);
        assert!(story.updated_at.is_some());
    }

    #[test]
    fn testimonial_draft_defaults_to_five_stars() {
        let draft: TestimonialDraft =
            serde_json::from_str(r#"{"name":"Ana","comment":"Lovely sofa"}"#).expect("draft");
        assert_eq!(draft.rating, 5);
        assert_eq!(TestimonialDraft::default().rating, 5);
    }

    #[test]
    fn footer_link_draft_serializes_missing_section_as_null() {
        let value = serde_json::to_value(FooterLinkDraft::default()).expect("json");
        assert_eq!(value["section_id"], serde_json::Value::Null);
        assert_eq!(value["is_active"], serde_json::Value::Bool(true));
    }
}
