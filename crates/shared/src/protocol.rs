use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    content::{FooterLink, FooterSection, NavbarItem, SocialLink},
    domain::{FooterColumnType, FooterLinkId, FooterSectionId, NavbarItemId},
};

/// Acknowledgement returned by the navbar/footer command endpoints.
///
/// Saves echo a partial record under an entity-specific key
/// (`navbar_item`, `footer_section`, ...), which lands in `payload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl CommandAck {
    pub fn record_id<I: DeserializeOwned>(&self, key: &str) -> Option<I> {
        let id = self.payload.get(key)?.get("id")?.clone();
        serde_json::from_value(id).ok()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteCommand<I> {
    pub id: I,
}

/// Update body for command endpoints: the draft with its target id spliced in.
#[derive(Debug, Serialize)]
pub struct WithId<'a, I, D> {
    pub id: I,
    #[serde(flatten)]
    pub draft: &'a D,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavbarListing {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub navbar_items: Vec<NavbarNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavbarNode {
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
    pub submenu: Vec<NavbarChild>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NavbarChild {
    pub id: NavbarItemId,
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub icon_class: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl NavbarListing {
    /// Flattens the two-level menu tree; parents precede their children.
    pub fn into_items(self) -> Vec<NavbarItem> {
        let mut items = Vec::new();
        for node in self.navbar_items {
            let parent_id = node.id;
            items.push(NavbarItem {
                id: node.id,
                label: node.label,
                url: node.url,
                icon_class: node.icon_class,
                order: node.order,
                is_active: node.is_active,
                is_dropdown: node.is_dropdown,
                parent_id: None,
            });
            items.extend(node.submenu.into_iter().map(|child| NavbarItem {
                id: child.id,
                label: child.label,
                url: child.url,
                icon_class: child.icon_class,
                order: child.order,
                is_active: child.is_active,
                is_dropdown: false,
                parent_id: Some(parent_id),
            }));
        }
        items
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FooterListing {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub footer_sections: Vec<FooterSectionNode>,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FooterSectionNode {
    pub id: FooterSectionId,
    pub column_title: String,
    pub column_type: FooterColumnType,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub links: Vec<FooterLinkNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FooterLinkNode {
    pub id: FooterLinkId,
    pub link_text: String,
    pub link_url: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl FooterListing {
    pub fn sections(&self) -> Vec<FooterSection> {
        self.footer_sections
            .iter()
            .map(|node| FooterSection {
                id: node.id,
                column_title: node.column_title.clone(),
                column_type: node.column_type,
                content: node.content.clone().unwrap_or_default(),
                order: node.order,
                is_active: node.is_active,
            })
            .collect()
    }

    pub fn links(&self) -> Vec<FooterLink> {
        self.footer_sections
            .iter()
            .flat_map(|node| {
                node.links.iter().map(move |link| FooterLink {
                    id: link.id,
                    section_id: node.id,
                    link_text: link.link_text.clone(),
                    link_url: link.link_url.clone(),
                    order: link.order,
                    is_active: link.is_active,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageUploadResponse {
    pub image_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

fn active() -> bool {
    true
}
