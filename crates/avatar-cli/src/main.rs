//! Avatar CLI: command-line client for the avatar service.
//!
//! `crop` works offline. `upload` and `delete` act on the configured owner
//! (AVATAR_OWNER_ID / --owner-id); `resolve` is public.

use anyhow::Context;
use avatar_cli::api_client::ApiClient;
use avatar_cli::crop::{crop_to_avatar, read_source, selection_rect};
use avatar_cli::init_tracing;
use avatar_core::constants::{CROPPED_CONTENT_TYPE, CROPPED_FILENAME};
use avatar_core::{OwnerId, VariantName};
use avatar_processing::ImageProcessor;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "avatar", about = "Avatar service CLI")]
struct Cli {
    /// Service URL (defaults to AVATAR_API_URL, then http://localhost:3000)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Owner (account) UUID sent with settings calls (defaults to AVATAR_OWNER_ID)
    #[arg(long, global = true, value_name = "UUID")]
    owner_id: Option<OwnerId>,

    /// Owner display name (defaults to AVATAR_OWNER_NAME)
    #[arg(long, global = true)]
    owner_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Square selection in source pixels. Omit all three for the largest centered square.
#[derive(Args, Debug)]
struct SelectionArgs {
    #[arg(long)]
    x: Option<i64>,
    #[arg(long)]
    y: Option<i64>,
    /// Edge length of the square
    #[arg(long)]
    size: Option<i64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop an image to a square PNG without uploading it
    Crop {
        /// Source image
        input: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Where to write the cropped PNG
        #[arg(long, short, default_value = CROPPED_FILENAME)]
        output: PathBuf,
    },
    /// Crop an image and upload it as the owner's avatar
    Upload {
        /// Image to upload
        file: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Send the file as-is instead of cropping it first
        #[arg(long, conflicts_with_all = ["x", "y", "size"])]
        raw: bool,
    },
    /// Remove the owner's avatar
    Delete,
    /// Show the avatar URL displayed for an owner
    Resolve {
        /// Owner UUID (defaults to --owner-id)
        owner_id: Option<OwnerId>,
        /// One of 40x40, 80x80, 160x160
        #[arg(long)]
        variant: Option<VariantName>,
        /// Display name for the placeholder
        #[arg(long)]
        name: Option<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client = ApiClient::from_env(cli.base_url, cli.owner_id, cli.owner_name)
        .context("Failed to create API client")?;

    match cli.command {
        Commands::Crop {
            input,
            selection,
            output,
        } => {
            let rect = selection_rect(selection.x, selection.y, selection.size)?;
            let cropped = crop_to_avatar(&read_source(&input)?, rect)?;
            std::fs::write(&output, &cropped)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            print_json(&serde_json::json!({
                "output": output.display().to_string(),
                "content_type": CROPPED_CONTENT_TYPE,
                "size_bytes": cropped.len(),
            }))?;
        }
        Commands::Upload {
            file,
            selection,
            raw,
        } => {
            let source = read_source(&file)?;
            let (data, file_name, content_type) = if raw {
                let content_type = ImageProcessor::sniff_content_type(&source)
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let file_name = file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(CROPPED_FILENAME)
                    .to_string();
                (source, file_name, content_type)
            } else {
                let rect = selection_rect(selection.x, selection.y, selection.size)?;
                (
                    crop_to_avatar(&source, rect)?,
                    CROPPED_FILENAME.to_string(),
                    CROPPED_CONTENT_TYPE.to_string(),
                )
            };

            let response = client
                .upload_avatar(data, &file_name, &content_type)
                .await?;
            print_json(&response)?;
        }
        Commands::Delete => {
            let response = client.delete_avatar().await?;
            print_json(&response)?;
        }
        Commands::Resolve {
            owner_id,
            variant,
            name,
        } => {
            let owner_id = owner_id
                .or_else(|| client.owner().map(|o| o.id))
                .context("Pass an owner UUID or set AVATAR_OWNER_ID")?;
            let name = name.or_else(|| client.owner().map(|o| o.name.clone()));
            let response = client
                .resolve_avatar(owner_id, variant, name.as_deref())
                .await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
