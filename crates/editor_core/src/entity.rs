use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

use serde::{de::DeserializeOwned, Serialize};
use shared::{
    content::{
        Faq, FaqDraft, FooterLink, FooterLinkDraft, FooterSection, FooterSectionDraft,
        GalleryItem, GalleryItemDraft, NavbarItem, NavbarItemDraft, Partner, PartnerDraft,
        SocialLink, SocialLinkDraft, Story, StoryDraft, Testimonial, TestimonialDraft,
    },
    domain::{
        FaqId, FooterLinkId, FooterSectionId, GalleryItemId, NavbarItemId, PartnerId,
        SocialLinkId, StoryId, TestimonialId,
    },
    protocol::{FooterListing, NavbarListing},
    sections::{
        CollectionsSection, FurnitureDetailsSection, HeroSection, Newsletter, QualitySection,
        StoriesSectionSettings, TestimonialsSectionSettings,
    },
};

use crate::{
    error::{ClientError, ValidationError},
    sanitize::{persistable_image_url, persistable_optional},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Resource { collection: &'static str },
    Command {
        list: &'static str,
        save: &'static str,
        delete: &'static str,
        ack_key: &'static str,
    },
}

impl Endpoint {
    pub fn list_path(self) -> &'static str {
        match self {
            Self::Resource { collection } => collection,
            Self::Command { list, .. } => list,
        }
    }
}

pub trait ListEntity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Id: Copy
        + Eq
        + Hash
        + Debug
        + Display
        + From<i64>
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;
    type Draft: Clone + Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Listing: DeserializeOwned + Send + 'static;

    const LABEL: &'static str;
    const ENDPOINT: Endpoint;

    fn id(&self) -> Self::Id;

    fn unpack(listing: Self::Listing) -> Result<Vec<Self>, ClientError>;

    fn validate(draft: &Self::Draft) -> Result<(), ValidationError>;

    fn sanitize(draft: Self::Draft) -> Self::Draft {
        draft
    }

    fn display_order(&self) -> Option<i32> {
        None
    }
}

pub trait Section:
    Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const LABEL: &'static str;
    const PATH: &'static str;

    fn sanitize(self) -> Self {
        self
    }

    fn is_configured(&self) -> bool;
}

fn require(entity: &'static str, field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { entity, field })
    } else {
        Ok(())
    }
}

fn command_listing(success: bool, error: Option<String>, what: &str) -> Result<(), ClientError> {
    if success {
        Ok(())
    } else {
        Err(ClientError::Refused(
            error.unwrap_or_else(|| format!("failed to load {what}")),
        ))
    }
}

impl ListEntity for Story {
    type Id = StoryId;
    type Draft = StoryDraft;
    type Listing = Vec<Story>;

    const LABEL: &'static str = "story";
    const ENDPOINT: Endpoint = Endpoint::Resource {
        collection: "website/stories/",
    };

    fn id(&self) -> StoryId {
        self.id
    }

    fn unpack(listing: Vec<Story>) -> Result<Vec<Self>, ClientError> {
        Ok(listing)
    }

    fn validate(draft: &StoryDraft) -> Result<(), ValidationError> {
        require(Self::LABEL, "title", &draft.title)?;
        require(Self::LABEL, "excerpt", &draft.excerpt)?;
        require(Self::LABEL, "author", &draft.author)
    }

    fn sanitize(mut draft: StoryDraft) -> StoryDraft {
        draft.image_url = persistable_image_url(&draft.image_url);
        draft
    }
}

impl ListEntity for Testimonial {
    type Id = TestimonialId;
    type Draft = TestimonialDraft;
    type Listing = Vec<Testimonial>;

    const LABEL: &'static str = "testimonial";
    const ENDPOINT: Endpoint = Endpoint::Resource {
        collection: "website/testimonials/",
    };

    fn id(&self) -> TestimonialId {
        self.id
    }

    fn unpack(listing: Vec<Testimonial>) -> Result<Vec<Self>, ClientError> {
        Ok(listing)
    }

    fn validate(draft: &TestimonialDraft) -> Result<(), ValidationError> {
        require(Self::LABEL, "name", &draft.name)?;
        require(Self::LABEL, "comment", &draft.comment)?;
        if !(1..=5).contains(&draft.rating) {
            return Err(ValidationError::RatingOutOfRange {
                rating: draft.rating,
            });
        }
        Ok(())
    }

    fn sanitize(mut draft: TestimonialDraft) -> TestimonialDraft {
        draft.image_url = persistable_image_url(&draft.image_url);
        draft
    }
}

impl ListEntity for GalleryItem {
    type Id = GalleryItemId;
    type Draft = GalleryItemDraft;
    type Listing = Vec<GalleryItem>;

    const LABEL: &'static str = "gallery item";
    const ENDPOINT: Endpoint = Endpoint::Resource {
        collection: "website/gallery/",
    };

    fn id(&self) -> GalleryItemId {
        self.id
    }

    fn unpack(listing: Vec<GalleryItem>) -> Result<Vec<Self>, ClientError> {
        Ok(listing)
    }

    fn validate(draft: &GalleryItemDraft) -> Result<(), ValidationError> {
        require(Self::LABEL, "title", &draft.title)
    }

    fn sanitize(mut draft: GalleryItemDraft) -> GalleryItemDraft {
        draft.image_url = persistable_image_url(&draft.image_url);
        draft
    }
}

impl ListEntity for Faq {
    type Id = FaqId;
    type Draft = FaqDraft;
    type Listing = Vec<Faq>;

    const LABEL: &'static str = "FAQ";
    const ENDPOINT: Endpoint = Endpoint::Resource {
        collection: "website/faq/",
    };

    fn id(&self) -> FaqId {
        self.id
    }

    fn unpack(listing: Vec<Faq>) -> Result<Vec<Self>, ClientError> {
        Ok(listing)
    }

    fn validate(draft: &FaqDraft) -> Result<(), ValidationError> {
        require(Self::LABEL, "question", &draft.question)?;
        require(Self::LABEL, "answer", &draft.answer)
    }
}

impl ListEntity for Partner {
    type Id = PartnerId;
    type Draft = PartnerDraft;
    type Listing = Vec<Partner>;

    const LABEL: &'static str = "partner";
    const ENDPOINT: Endpoint = Endpoint::Resource {
        collection: "website/partners/",
    };

    fn id(&self) -> PartnerId {
        self.id
    }

    fn unpack(listing: Vec<Partner>) -> Result<Vec<Self>, ClientError> {
        Ok(listing)
    }

    fn validate(draft: &PartnerDraft) -> Result<(), ValidationError> {
        require(Self::LABEL, "name", &draft.name)
    }

    fn sanitize(mut draft: PartnerDraft) -> PartnerDraft {
        draft.logo_url = persistable_image_url(&draft.logo_url);
        draft.link = draft.link.trim().to_string();
        draft
    }
}

impl ListEntity for NavbarItem {
    type Id = NavbarItemId;
    type Draft = NavbarItemDraft;
    type Listing = NavbarListing;

    const LABEL: &'static str = "navbar item";
    const ENDPOINT: Endpoint = Endpoint::Command {
        list: "website/navbar/get/",
        save: "website/navbar/save/",
        delete: "website/navbar/delete/",
        ack_key: "navbar_item",
    };

    fn id(&self) -> NavbarItemId {
        self.id
    }

    fn unpack(listing: NavbarListing) -> Result<Vec<Self>, ClientError> {
        command_listing(listing.success, listing.error.clone(), "navbar")?;
        Ok(listing.into_items())
    }

    fn validate(draft: &NavbarItemDraft) -> Result<(), ValidationError> {
        require(Self::LABEL, "label", &draft.label)?;
        require(Self::LABEL, "url", &draft.url)
    }

    fn display_order(&self) -> Option<i32> {
        Some(self.order)
    }
}

impl ListEntity for FooterSection {
    type Id = FooterSectionId;
    type Draft = FooterSectionDraft;
    type Listing = FooterListing;

    const LABEL: &'static str = "footer section";
    const ENDPOINT: Endpoint = Endpoint::Command {
        list: "website/footer/get/",
        save: "website/footer/section/save/",
        delete: "website/footer/section/delete/",
        ack_key: "footer_section",
    };

    fn id(&self) -> FooterSectionId {
        self.id
    }

    fn unpack(listing: FooterListing) -> Result<Vec<Self>, ClientError> {
        command_listing(listing.success, listing.error.clone(), "footer")?;
        Ok(listing.sections())
    }

    fn validate(draft: &FooterSectionDraft) -> Result<(), ValidationError> {
        require(Self::LABEL, "column_title", &draft.column_title)
    }

    fn display_order(&self) -> Option<i32> {
        Some(self.order)
    }
}

impl ListEntity for FooterLink {
    type Id = FooterLinkId;
    type Draft = FooterLinkDraft;
    type Listing = FooterListing;

    const LABEL: &'static str = "footer link";
    const ENDPOINT: Endpoint = Endpoint::Command {
        list: "website/footer/get/",
        save: "website/footer/link/save/",
        delete: "website/footer/link/delete/",
        ack_key: "footer_link",
    };

    fn id(&self) -> FooterLinkId {
        self.id
    }

    fn unpack(listing: FooterListing) -> Result<Vec<Self>, ClientError> {
        command_listing(listing.success, listing.error.clone(), "footer")?;
        Ok(listing.links())
    }

    fn validate(draft: &FooterLinkDraft) -> Result<(), ValidationError> {
        if draft.section_id.is_none() {
            return Err(ValidationError::MissingField {
                entity: Self::LABEL,
                field: "section_id",
            });
        }
        require(Self::LABEL, "link_text", &draft.link_text)?;
        require(Self::LABEL, "link_url", &draft.link_url)
    }

    fn display_order(&self) -> Option<i32> {
        Some(self.order)
    }
}

impl ListEntity for SocialLink {
    type Id = SocialLinkId;
    type Draft = SocialLinkDraft;
    type Listing = FooterListing;

    const LABEL: &'static str = "social link";
    const ENDPOINT: Endpoint = Endpoint::Command {
        list: "website/footer/get/",
        save: "website/footer/social/save/",
        delete: "website/footer/social/delete/",
        ack_key: "social_link",
    };

    fn id(&self) -> SocialLinkId {
        self.id
    }

    fn unpack(listing: FooterListing) -> Result<Vec<Self>, ClientError> {
        command_listing(listing.success, listing.error.clone(), "footer")?;
        Ok(listing.social_links)
    }

    fn validate(draft: &SocialLinkDraft) -> Result<(), ValidationError> {
        require(Self::LABEL, "url", &draft.url)
    }

    fn sanitize(mut draft: SocialLinkDraft) -> SocialLinkDraft {
        if draft.icon_class.trim().is_empty() {
            draft.icon_class = draft.platform.default_icon_class().to_string();
        }
        draft
    }

    fn display_order(&self) -> Option<i32> {
        Some(self.order)
    }
}

impl Section for HeroSection {
    const LABEL: &'static str = "hero section";
    const PATH: &'static str = "website/hero/";

    fn sanitize(mut self) -> Self {
        self.image_url = persistable_optional(self.image_url.as_deref());
        self
    }

    fn is_configured(&self) -> bool {
        self.id.is_some()
    }
}

impl Section for CollectionsSection {
    const LABEL: &'static str = "collections section";
    const PATH: &'static str = "website/collections/";

    fn is_configured(&self) -> bool {
        self.id.is_some()
    }
}

impl Section for QualitySection {
    const LABEL: &'static str = "quality section";
    const PATH: &'static str = "website/quality/";

    fn sanitize(mut self) -> Self {
        self.image_url = persistable_optional(self.image_url.as_deref());
        self
    }

    fn is_configured(&self) -> bool {
        self.id.is_some()
    }
}

impl Section for FurnitureDetailsSection {
    const LABEL: &'static str = "furniture details section";
    const PATH: &'static str = "website/furniture-details/";

    fn sanitize(mut self) -> Self {
        self.image_url = persistable_optional(self.image_url.as_deref());
        self.details.retain(|detail| !detail.trim().is_empty());
        self
    }

    fn is_configured(&self) -> bool {
        self.id.is_some()
    }
}

impl Section for TestimonialsSectionSettings {
    const LABEL: &'static str = "testimonials section settings";
    const PATH: &'static str = "website/testimonials-section/";

    fn is_configured(&self) -> bool {
        self.id.is_some()
    }
}

impl Section for StoriesSectionSettings {
    const LABEL: &'static str = "stories section settings";
    const PATH: &'static str = "website/stories-section/";

    fn is_configured(&self) -> bool {
        self.id.is_some()
    }
}

impl Section for Newsletter {
    const LABEL: &'static str = "newsletter";
    const PATH: &'static str = "website/newsletter/";

    fn is_configured(&self) -> bool {
        self.id.is_some()
    }
}
