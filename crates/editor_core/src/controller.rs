use std::{sync::Arc, time::Duration};

use shared::{
    content::{
        Faq, FooterLink, FooterSection, GalleryItem, NavbarItem, Partner, SocialLink, Story,
        Testimonial,
    },
    protocol::FooterListing,
    sections::{
        CollectionsSection, FurnitureDetailsSection, HeroSection, Newsletter, QualitySection,
        StoriesSectionSettings, TestimonialsSectionSettings,
    },
};
use tracing::{info, warn};

use crate::{
    entity::{ListEntity, Section},
    error::ClientError,
    flow::{
        failure_message, LinkableSectionCheck, ListFlow, NavbarParentCheck, Reconcile,
        SectionFlow,
    },
    notices::{Notices, ERROR_TTL, SUCCESS_TTL},
    snapshot::{SiteSnapshot, SnapshotStore},
    transport::{ApiClient, Credentials},
    upload::ImageUpload,
};

#[derive(Debug, Clone)]
pub struct EditorOptions {
    pub snapshots: Option<SnapshotStore>,
    pub success_ttl: Duration,
    pub error_ttl: Duration,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            snapshots: None,
            success_ttl: SUCCESS_TTL,
            error_ttl: ERROR_TTL,
        }
    }
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<&'static str>,
    pub failed: Vec<(&'static str, String)>,
    pub restored_from_snapshot: bool,
}

impl LoadReport {
    fn record(&mut self, label: &'static str, outcome: Result<(), ClientError>) {
        match outcome {
            Ok(()) => self.loaded.push(label),
            Err(err) => self.failed.push((label, err.to_string())),
        }
    }

    pub fn all_failed(&self) -> bool {
        self.loaded.is_empty() && !self.failed.is_empty()
    }

    pub fn failed_labels(&self) -> Vec<&'static str> {
        self.failed.iter().map(|(label, _)| *label).collect()
    }
}

pub struct ContentEditorController {
    api: Arc<ApiClient>,
    notices: Arc<Notices>,
    snapshots: Option<SnapshotStore>,

    pub hero: Arc<SectionFlow<HeroSection>>,
    pub collections: Arc<SectionFlow<CollectionsSection>>,
    pub quality: Arc<SectionFlow<QualitySection>>,
    pub furniture_details: Arc<SectionFlow<FurnitureDetailsSection>>,
    pub testimonials_section: Arc<SectionFlow<TestimonialsSectionSettings>>,
    pub stories_section: Arc<SectionFlow<StoriesSectionSettings>>,
    pub newsletter: Arc<SectionFlow<Newsletter>>,

    pub stories: Arc<ListFlow<Story>>,
    pub testimonials: Arc<ListFlow<Testimonial>>,
    pub gallery: Arc<ListFlow<GalleryItem>>,
    pub faqs: Arc<ListFlow<Faq>>,
    pub partners: Arc<ListFlow<Partner>>,
    pub navbar: Arc<ListFlow<NavbarItem>>,
    pub footer_sections: Arc<ListFlow<FooterSection>>,
    pub footer_links: Arc<ListFlow<FooterLink>>,
    pub social_links: Arc<ListFlow<SocialLink>>,
}

impl ContentEditorController {
    pub fn new(api: ApiClient, options: EditorOptions) -> Self {
        let api = Arc::new(api);
        let notices = Arc::new(Notices::new(options.success_ttl, options.error_ttl));

        let footer_sections = Arc::new(ListFlow::new(api.clone(), notices.clone()));
        let footer_links = Arc::new(
            ListFlow::new(api.clone(), notices.clone())
                .with_check(Arc::new(LinkableSectionCheck::new(footer_sections.clone()))),
        );
        let links_dependent: Arc<dyn Reconcile> = footer_links.clone();
        footer_sections.add_dependent(Arc::downgrade(&links_dependent));

        Self {
            hero: section(&api, &notices),
            collections: section(&api, &notices),
            quality: section(&api, &notices),
            furniture_details: section(&api, &notices),
            testimonials_section: section(&api, &notices),
            stories_section: section(&api, &notices),
            newsletter: section(&api, &notices),

            stories: list(&api, &notices),
            testimonials: list(&api, &notices),
            gallery: list(&api, &notices),
            faqs: list(&api, &notices),
            partners: list(&api, &notices),
            navbar: Arc::new(
                ListFlow::new(api.clone(), notices.clone()).with_check(Arc::new(NavbarParentCheck)),
            ),
            footer_sections,
            footer_links,
            social_links: list(&api, &notices),

            api,
            notices,
            snapshots: options.snapshots,
        }
    }

    pub async fn mount(api: ApiClient, options: EditorOptions) -> (Self, LoadReport) {
        let controller = Self::new(api, options);
        let report = controller.load_all().await;
        (controller, report)
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn session(&self) -> &Credentials {
        self.api.credentials()
    }

    pub async fn load_all(&self) -> LoadReport {
        let (
            hero,
            collections,
            quality,
            furniture_details,
            testimonials_section,
            stories_section,
            newsletter,
            stories,
            testimonials,
            gallery,
            faqs,
            partners,
            navbar,
            footer,
        ) = tokio::join!(
            self.hero.load(),
            self.collections.load(),
            self.quality.load(),
            self.furniture_details.load(),
            self.testimonials_section.load(),
            self.stories_section.load(),
            self.newsletter.load(),
            self.stories.load(),
            self.testimonials.load(),
            self.gallery.load(),
            self.faqs.load(),
            self.partners.load(),
            self.navbar.load(),
            self.load_footer(),
        );

        let mut report = LoadReport::default();
        report.record(HeroSection::LABEL, hero);
        report.record(CollectionsSection::LABEL, collections);
        report.record(QualitySection::LABEL, quality);
        report.record(FurnitureDetailsSection::LABEL, furniture_details);
        report.record(TestimonialsSectionSettings::LABEL, testimonials_section);
        report.record(StoriesSectionSettings::LABEL, stories_section);
        report.record(Newsletter::LABEL, newsletter);
        report.record(Story::LABEL, stories);
        report.record(Testimonial::LABEL, testimonials);
        report.record(GalleryItem::LABEL, gallery);
        report.record(Faq::LABEL, faqs);
        report.record(Partner::LABEL, partners);
        report.record(NavbarItem::LABEL, navbar);
        let [sections, links, social] = footer;
        report.record(FooterSection::LABEL, sections);
        report.record(FooterLink::LABEL, links);
        report.record(SocialLink::LABEL, social);

        info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "bulk load finished"
        );
        self.settle_snapshot(&mut report).await;
        report
    }

    pub async fn reload_footer(&self) -> Result<(), ClientError> {
        let [sections, links, social] = self.load_footer().await;
        sections.and(links).and(social)
    }

    async fn load_footer(&self) -> [Result<(), ClientError>; 3] {
        let sections_ticket = self.footer_sections.begin_load().await;
        let links_ticket = self.footer_links.begin_load().await;
        let social_ticket = self.social_links.begin_load().await;

        let path = FooterSection::ENDPOINT.list_path();
        match self.api.get::<FooterListing>(path).await {
            Ok(listing) => [
                self.footer_sections
                    .apply_listing(sections_ticket, listing.clone())
                    .await,
                self.footer_links
                    .apply_listing(links_ticket, listing.clone())
                    .await,
                self.social_links.apply_listing(social_ticket, listing).await,
            ],
            Err(err) => {
                self.footer_sections
                    .apply_failure(sections_ticket, &err)
                    .await;
                self.footer_links.apply_failure(links_ticket, &err).await;
                self.social_links.apply_failure(social_ticket, &err).await;
                let detail = err.to_string();
                [
                    Err(err),
                    Err(ClientError::Refused(detail.clone())),
                    Err(ClientError::Refused(detail)),
                ]
            }
        }
    }

    async fn settle_snapshot(&self, report: &mut LoadReport) {
        let Some(store) = &self.snapshots else {
            return;
        };

        if !report.loaded.is_empty() {
            if let Err(err) = store.save(&self.snapshot().await).await {
                warn!(error = %format!("{err:#}"), "failed to write content snapshot");
            }
            return;
        }

        match store.load().await {
            Ok(Some(snapshot)) => {
                warn!(
                    path = %store.path().display(),
                    saved_at = ?snapshot.saved_at,
                    "server unreachable; showing last saved content snapshot"
                );
                self.restore(snapshot).await;
                report.restored_from_snapshot = true;
            }
            Ok(None) => {}
            Err(err) => warn!(error = %format!("{err:#}"), "failed to read content snapshot"),
        }
    }

    pub async fn upload_image(&self, upload: ImageUpload) -> Result<String, ClientError> {
        upload.validate()?;
        match self.api.upload_image(&upload).await {
            Ok(url) => {
                info!(filename = %upload.filename, %url, "image uploaded");
                self.notices.success("Image uploaded").await;
                Ok(url)
            }
            Err(err) => {
                warn!(filename = %upload.filename, error = %err, "image upload failed");
                self.notices
                    .error(failure_message("upload", "image", &err))
                    .await;
                Err(err)
            }
        }
    }

    pub async fn snapshot(&self) -> SiteSnapshot {
        SiteSnapshot {
            saved_at: Some(chrono::Utc::now()),
            hero: self.hero.current().await,
            collections: self.collections.current().await,
            quality: self.quality.current().await,
            furniture_details: self.furniture_details.current().await,
            testimonials_section: self.testimonials_section.current().await,
            stories_section: self.stories_section.current().await,
            newsletter: self.newsletter.current().await,
            stories: self.stories.items().await,
            testimonials: self.testimonials.items().await,
            gallery: self.gallery.items().await,
            faqs: self.faqs.items().await,
            partners: self.partners.items().await,
            navbar: self.navbar.items().await,
            footer_sections: self.footer_sections.items().await,
            footer_links: self.footer_links.items().await,
            social_links: self.social_links.items().await,
        }
    }

    pub async fn restore(&self, snapshot: SiteSnapshot) {
        self.hero.restore(snapshot.hero).await;
        self.collections.restore(snapshot.collections).await;
        self.quality.restore(snapshot.quality).await;
        self.furniture_details
            .restore(snapshot.furniture_details)
            .await;
        self.testimonials_section
            .restore(snapshot.testimonials_section)
            .await;
        self.stories_section.restore(snapshot.stories_section).await;
        self.newsletter.restore(snapshot.newsletter).await;
        self.stories.restore(snapshot.stories).await;
        self.testimonials.restore(snapshot.testimonials).await;
        self.gallery.restore(snapshot.gallery).await;
        self.faqs.restore(snapshot.faqs).await;
        self.partners.restore(snapshot.partners).await;
        self.navbar.restore(snapshot.navbar).await;
        self.footer_sections.restore(snapshot.footer_sections).await;
        self.footer_links.restore(snapshot.footer_links).await;
        self.social_links.restore(snapshot.social_links).await;
    }

    pub async fn reset(&self) {
        self.hero.reset().await;
        self.collections.reset().await;
        self.quality.reset().await;
        self.furniture_details.reset().await;
        self.testimonials_section.reset().await;
        self.stories_section.reset().await;
        self.newsletter.reset().await;
        self.stories.reset().await;
        self.testimonials.reset().await;
        self.gallery.reset().await;
        self.faqs.reset().await;
        self.partners.reset().await;
        self.navbar.reset().await;
        self.footer_sections.reset().await;
        self.footer_links.reset().await;
        self.social_links.reset().await;
        self.notices.dismiss().await;
    }
}

fn section<S: Section>(api: &Arc<ApiClient>, notices: &Arc<Notices>) -> Arc<SectionFlow<S>> {
    Arc::new(SectionFlow::new(api.clone(), notices.clone()))
}

fn list<E: ListEntity>(api: &Arc<ApiClient>, notices: &Arc<Notices>) -> Arc<ListFlow<E>> {
    Arc::new(ListFlow::new(api.clone(), notices.clone()))
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
