use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(StoryId);
id_newtype!(TestimonialId);
id_newtype!(GalleryItemId);
id_newtype!(FaqId);
id_newtype!(PartnerId);
id_newtype!(NavbarItemId);
id_newtype!(FooterSectionId);
id_newtype!(FooterLinkId);
id_newtype!(SocialLinkId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryCategory {
    #[default]
    Rooms,
    Bedrooms,
    Kitchens,
    Outdoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaqCategory {
    #[default]
    Shipping,
    Returns,
    Payment,
    Products,
}

/// Kind of footer column. Only link-bearing columns own [`crate::content::FooterLink`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FooterColumnType {
    #[default]
    About,
    Menu,
    Account,
    Info,
    Contact,
}

impl FooterColumnType {
    pub fn carries_links(self) -> bool {
        matches!(self, Self::Menu | Self::Account | Self::Info)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    #[default]
    Facebook,
    Instagram,
    Twitter,
    Pinterest,
    Linkedin,
    Youtube,
}

impl SocialPlatform {
    /// Font Awesome class the storefront uses when none is configured.
    pub fn default_icon_class(self) -> &'static str {
        match self {
            Self::Facebook => "fab fa-facebook",
            Self::Instagram => "fab fa-instagram",
            Self::Twitter => "fab fa-twitter",
            Self::Pinterest => "fab fa-pinterest",
            Self::Linkedin => "fab fa-linkedin",
            Self::Youtube => "fab fa-youtube",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_integers() {
        assert_eq!(serde_json::to_string(&StoryId(42)).expect("json"), "42");
        let id: FooterSectionId = serde_json::from_str("7").expect("parse");
        assert_eq!(id, FooterSectionId(7));
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn only_menu_account_and_info_columns_carry_links() {
        assert!(FooterColumnType::Menu.carries_links());
        assert!(FooterColumnType::Account.carries_links());
        assert!(FooterColumnType::Info.carries_links());
        assert!(!FooterColumnType::About.carries_links());
        assert!(!FooterColumnType::Contact.carries_links());
    }

    #[test]
    fn enums_use_snake_case_wire_names() {
        assert_eq!(
            serde_json::to_string(&SocialPlatform::Linkedin).expect("json"),
            "\"linkedin\""
        );
        let category: GalleryCategory = serde_json::from_str("\"kitchens\"").expect("parse");
        assert_eq!(category, GalleryCategory::Kitchens);
    }
}
