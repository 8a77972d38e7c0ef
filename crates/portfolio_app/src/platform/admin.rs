use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::Local;
use portfolio_core::{
    Credentials, DocumentKind, Draft, ExperienceDetails, ProjectDetails,
};
use portfolio_engine::{write_atomic, AppContext, CacheError, MAX_DOWNLOAD_BYTES};
use portfolio_logging::{portfolio_info, portfolio_warn};

use super::cli::{AdminAction, AdminArgs};

pub const ENV_ADMIN_PASSWORD: &str = "PORTFOLIO_ADMIN_PASSWORD";

pub async fn run(ctx: &AppContext, args: AdminArgs) -> anyhow::Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => std::env::var(ENV_ADMIN_PASSWORD)
            .with_context(|| format!("no --password given and {ENV_ADMIN_PASSWORD} is not set"))?,
    };
    let credentials = Credentials::new(args.email, password);
    credentials.validate().context("invalid credentials")?;

    let auth = ctx.auth();
    auth.initialize().await;

    if matches!(args.action, AdminAction::SignUp) {
        let user = auth.sign_up(&credentials.email, &credentials.password).await?;
        println!("Created account {}", user.email.as_deref().unwrap_or(&user.id));
        if !auth.session().is_authenticated {
            println!("Confirm the address from the email you received, then sign in.");
        }
        return Ok(());
    }

    auth.sign_in(&credentials.email, &credentials.password)
        .await
        .context("sign in failed")?;
    let result = perform(ctx, args.action).await;
    if let Err(err) = auth.sign_out().await {
        portfolio_warn!("Sign out after admin command failed: {}", err);
    }
    result
}

async fn perform(ctx: &AppContext, action: AdminAction) -> anyhow::Result<()> {
    match action {
        AdminAction::SignUp => Ok(()),
        AdminAction::Whoami => {
            let session = ctx.auth().session();
            match session.user {
                Some(user) => println!("{} ({})", user.email.as_deref().unwrap_or("-"), user.id),
                None => println!("not signed in"),
            }
            Ok(())
        }
        AdminAction::AddProject {
            title,
            description,
            category,
            tags,
            image_url,
            demo_url,
            repo_url,
        } => {
            let draft = Draft {
                title,
                description,
                tags,
                category,
                details: ProjectDetails {
                    image_url,
                    demo_url,
                    repo_url,
                },
            };
            let created = ctx.service::<ProjectDetails>().create(&draft).await?;
            println!("Created project {} ({})", created.title, created.id);
            Ok(())
        }
        AdminAction::DeleteProject { id } => {
            ctx.service::<ProjectDetails>().delete(&id).await?;
            println!("Deleted project {id}");
            Ok(())
        }
        AdminAction::AddExperience {
            company,
            position,
            duration,
            description,
            skills,
        } => {
            let draft = Draft {
                title: format!("{position} at {company}"),
                description,
                tags: skills,
                category: String::new(),
                details: ExperienceDetails {
                    company,
                    position,
                    duration,
                },
            };
            let created = ctx.service::<ExperienceDetails>().create(&draft).await?;
            println!("Created experience {} ({})", created.title, created.id);
            Ok(())
        }
        AdminAction::DeleteExperience { id } => {
            ctx.service::<ExperienceDetails>().delete(&id).await?;
            println!("Deleted experience {id}");
            Ok(())
        }
        AdminAction::Documents => {
            let documents = ctx.documents().list_all().await?;
            if documents.is_empty() {
                println!("No documents uploaded.");
            }
            for doc in documents {
                println!(
                    "{:<11} {}  {} ({}, {} KB)  {}",
                    doc.kind,
                    doc.created_at.with_timezone(&Local).format("%Y-%m-%d"),
                    doc.title,
                    doc.file_name,
                    doc.file_size.div_ceil(1024),
                    doc.file_url
                );
            }
            Ok(())
        }
        AdminAction::Upload { kind, file, title } => {
            let kind: DocumentKind = kind.into();
            let bytes = fs::read(&file).with_context(|| format!("cannot read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .context("upload path has no file name")?;

            let created = ctx.documents().publish(kind, &file_name, title, bytes).await?;
            portfolio_info!(
                "Uploaded {} ({} bytes) to {}",
                created.file_name,
                created.file_size,
                created.file_url
            );
            println!("Uploaded {} {} ({})", created.kind, created.title, created.id);
            Ok(())
        }
        AdminAction::DeleteDocument { id } => {
            ctx.documents().delete(&id).await?;
            println!("Deleted document {id}");
            Ok(())
        }
    }
}

/// Downloads the newest CV into `out`.
pub async fn download_cv(ctx: &AppContext, out: &Path) -> anyhow::Result<()> {
    let documents = ctx.documents();
    let Some(cv) = documents.latest_cv().await? else {
        bail!("no CV has been uploaded yet");
    };
    let bytes = documents.download(&cv, MAX_DOWNLOAD_BYTES).await?;
    let path = save_document(out, &cv.file_name, &bytes)?;
    println!("Saved {} ({} bytes) to {}", cv.title, bytes.len(), path.display());
    Ok(())
}

/// Writes `bytes` as `{dir}/{base name of file_name}`, replacing any earlier copy.
fn save_document(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, CacheError> {
    let name = Path::new(file_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "cv.pdf".to_string());
    let target = dir.join(name);
    write_atomic(&target, bytes)?;
    Ok(target)
}
