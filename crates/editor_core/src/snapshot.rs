//! Last-known-good copy of every slice, written after a bulk load that
//! reached the server and read back only when nothing could be loaded.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    content::{
        Faq, FooterLink, FooterSection, GalleryItem, NavbarItem, Partner, SocialLink, Story,
        Testimonial,
    },
    sections::{
        CollectionsSection, FurnitureDetailsSection, HeroSection, Newsletter, QualitySection,
        StoriesSectionSettings, TestimonialsSectionSettings,
    },
};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSnapshot {
    pub saved_at: Option<DateTime<Utc>>,
    pub hero: HeroSection,
    pub collections: CollectionsSection,
    pub quality: QualitySection,
    pub furniture_details: FurnitureDetailsSection,
    pub testimonials_section: TestimonialsSectionSettings,
    pub stories_section: StoriesSectionSettings,
    pub newsletter: Newsletter,
    pub stories: Vec<Story>,
    pub testimonials: Vec<Testimonial>,
    pub gallery: Vec<GalleryItem>,
    pub faqs: Vec<Faq>,
    pub partners: Vec<Partner>,
    pub navbar: Vec<NavbarItem>,
    pub footer_sections: Vec<FooterSection>,
    pub footer_links: Vec<FooterLink>,
    pub social_links: Vec<SocialLink>,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no snapshot has been written yet.
    pub async fn load(&self) -> Result<Option<SiteSnapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading snapshot {}", self.path.display()))
            }
        };
        let snapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing snapshot {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    pub async fn save(&self, snapshot: &SiteSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating snapshot directory {}", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(snapshot).context("encoding snapshot")?;

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, json)
            .await
            .with_context(|| format!("writing snapshot {}", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("replacing snapshot {}", self.path.display()))?;
        debug!(path = %self.path.display(), "snapshot written");
        Ok(())
    }
}
