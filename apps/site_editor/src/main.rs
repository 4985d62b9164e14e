mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use editor_core::{
    entity::{ListEntity, Section},
    flow::{ListFlow, SectionFlow},
    ApiClient, BannerKind, ContentEditorController, EditorOptions, ImageUpload, SnapshotStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "site_editor", about = "Edit the storefront's front-page content")]
struct Args {
    /// Settings file; defaults to ./site_editor.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    token: Option<String>,
    #[arg(long)]
    csrf_token: Option<String>,
    /// Skip reading and writing the offline content snapshot.
    #[arg(long)]
    no_snapshot: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load everything and print it as JSON.
    Dump,
    Create {
        entity: EntityKind,
        #[arg(long)]
        json: String,
    },
    Update {
        entity: EntityKind,
        id: i64,
        #[arg(long)]
        json: String,
    },
    Delete {
        entity: EntityKind,
        id: i64,
    },
    /// Only the given fields change; the rest keep their loaded values.
    SaveSection {
        section: SectionKind,
        #[arg(long)]
        json: String,
    },
    /// Upload an image and print its URL.
    Upload { path: PathBuf },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum EntityKind {
    Story,
    Testimonial,
    Gallery,
    Faq,
    Partner,
    Navbar,
    FooterSection,
    FooterLink,
    SocialLink,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SectionKind {
    Hero,
    Collections,
    Quality,
    FurnitureDetails,
    TestimonialsSection,
    StoriesSection,
    Newsletter,
}

/// Binds `$flow` to the controller's list flow for `$kind` and evaluates `$body`.
macro_rules! with_list {
    ($controller:expr, $kind:expr, |$flow:ident| $body:expr) => {
        match $kind {
            EntityKind::Story => {
                let $flow = &$controller.stories;
                $body
            }
            EntityKind::Testimonial => {
                let $flow = &$controller.testimonials;
                $body
            }
            EntityKind::Gallery => {
                let $flow = &$controller.gallery;
                $body
            }
            EntityKind::Faq => {
                let $flow = &$controller.faqs;
                $body
            }
            EntityKind::Partner => {
                let $flow = &$controller.partners;
                $body
            }
            EntityKind::Navbar => {
                let $flow = &$controller.navbar;
                $body
            }
            EntityKind::FooterSection => {
                let $flow = &$controller.footer_sections;
                $body
            }
            EntityKind::FooterLink => {
                let $flow = &$controller.footer_links;
                $body
            }
            EntityKind::SocialLink => {
                let $flow = &$controller.social_links;
                $body
            }
        }
    };
}

macro_rules! with_section {
    ($controller:expr, $kind:expr, |$flow:ident| $body:expr) => {
        match $kind {
            SectionKind::Hero => {
                let $flow = &$controller.hero;
                $body
            }
            SectionKind::Collections => {
                let $flow = &$controller.collections;
                $body
            }
            SectionKind::Quality => {
                let $flow = &$controller.quality;
                $body
            }
            SectionKind::FurnitureDetails => {
                let $flow = &$controller.furniture_details;
                $body
            }
            SectionKind::TestimonialsSection => {
                let $flow = &$controller.testimonials_section;
                $body
            }
            SectionKind::StoriesSection => {
                let $flow = &$controller.stories_section;
                $body
            }
            SectionKind::Newsletter => {
                let $flow = &$controller.newsletter;
                $body
            }
        }
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if args.token.is_some() {
        settings.token = args.token;
    }
    if args.csrf_token.is_some() {
        settings.csrf_token = args.csrf_token;
    }
    if args.no_snapshot {
        settings.snapshot_path = None;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let api = ApiClient::new(
        &settings.base_url,
        settings.credentials(),
        settings.timeout(),
    )
    .with_context(|| format!("invalid base url '{}'", settings.base_url))?;
    let options = EditorOptions {
        snapshots: settings.snapshot_path.clone().map(SnapshotStore::new),
        ..Default::default()
    };
    info!(base_url = %api.base_url(), "mounting content editor");
    let (controller, report) = ContentEditorController::mount(api, options).await;
    for (label, err) in &report.failed {
        eprintln!("could not load {label}: {err}");
    }
    if report.restored_from_snapshot {
        eprintln!("server unreachable; showing the last saved snapshot");
    }

    let outcome = run(&controller, args.command).await;
    if let Some(banner) = controller.notices().current().await {
        let tag = match banner.kind {
            BannerKind::Success => "ok",
            BannerKind::Error => "error",
        };
        eprintln!("[{tag}] {}", banner.message);
    }
    outcome
}

async fn run(controller: &ContentEditorController, command: Command) -> Result<()> {
    match command {
        Command::Dump => {
            let snapshot = controller.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Create { entity, json } => {
            with_list!(controller, entity, |flow| create(flow, &json).await)?;
        }
        Command::Update { entity, id, json } => {
            with_list!(controller, entity, |flow| update(flow, id, &json).await)?;
        }
        Command::Delete { entity, id } => {
            with_list!(controller, entity, |flow| delete(flow, id).await)?;
        }
        Command::SaveSection { section, json } => {
            with_section!(controller, section, |flow| save_section(flow, &json).await)?;
        }
        Command::Upload { path } => {
            let url = upload(controller, &path).await?;
            println!("{url}");
        }
    }
    Ok(())
}

fn parse_draft<E: ListEntity>(json: &str) -> Result<E::Draft> {
    serde_json::from_str(json).with_context(|| format!("invalid {} JSON", E::LABEL))
}

async fn create<E: ListEntity>(flow: &ListFlow<E>, json: &str) -> Result<()> {
    let id = flow.create(parse_draft::<E>(json)?).await?;
    println!("{id}");
    Ok(())
}

async fn update<E: ListEntity>(flow: &ListFlow<E>, id: i64, json: &str) -> Result<()> {
    let id = E::Id::from(id);
    flow.update(id, parse_draft::<E>(json)?).await?;
    if let Some(record) = flow.get(id).await {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }
    Ok(())
}

async fn delete<E: ListEntity>(flow: &ListFlow<E>, id: i64) -> Result<()> {
    flow.delete(E::Id::from(id)).await?;
    Ok(())
}

async fn save_section<S: Section>(flow: &SectionFlow<S>, json: &str) -> Result<()> {
    let changes: serde_json::Value =
        serde_json::from_str(json).with_context(|| format!("invalid {} JSON", S::LABEL))?;
    let saved = flow.save_changes(changes).await?;
    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}

async fn upload(controller: &ContentEditorController, path: &Path) -> Result<String> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let mime_type = mime_guess::from_path(path).first_raw().map(str::to_string);
    Ok(controller
        .upload_image(ImageUpload::new(filename, mime_type, bytes))
        .await?)
}
