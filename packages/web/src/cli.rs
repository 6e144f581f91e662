//! Terminal clients for a running server.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use api::client::load_image;
use api::settings::Settings;
use api::{ClipClient, ClipInfo, Draft, Poller};
use qrcode::render::unicode::Dense1x2;
use qrcode::QrCode;
use tokio_util::sync::CancellationToken;

use crate::notify::TerminalNotifier;

/// Which server to talk to and how often to poll it.
pub struct Target {
    client: ClipClient,
    interval: Duration,
}

impl Target {
    pub fn new(settings: &Settings, server: Option<String>, interval_secs: Option<u64>) -> Self {
        let base_url = server.unwrap_or_else(|| settings.server.public_url.clone());
        let interval = interval_secs
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or_else(|| settings.poll.interval());
        Self {
            client: ClipClient::new(&base_url),
            interval,
        }
    }
}

pub async fn share(target: Target, draft: Option<String>) -> anyhow::Result<()> {
    let created = target
        .client
        .create_session()
        .await
        .context("failed to create session")?;

    let qr = QrCode::new(created.session_url.as_bytes()).context("failed to encode QR code")?;
    println!(
        "{}",
        qr.render::<Dense1x2>().quiet_zone(true).build()
    );
    println!("Session: {}", created.session_id);
    println!("Open:    {}", created.session_url);
    println!("Waiting for content (Ctrl-C to stop)...");

    poll(target, created.session_id, draft).await
}

pub async fn watch(target: Target, session_id: &str, draft: Option<String>) -> anyhow::Result<()> {
    let clip = target
        .client
        .get_clip(session_id)
        .await
        .context("failed to read session")?;
    print_clip(&clip);
    println!("Watching {} (Ctrl-C to stop)...", session_id);

    poll(target, session_id.to_string(), draft).await
}

async fn poll(target: Target, session_id: String, local: Option<String>) -> anyhow::Result<()> {
    let draft = Draft::new();
    if let Some(text) = local {
        draft.edit(text);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let state = Poller::new(target.client, session_id, TerminalNotifier::new())
        .with_interval(target.interval)
        .with_draft(draft.clone())
        .run(cancel)
        .await;

    tracing::debug!(
        text = state.text_notified(),
        images = state.images_notified(),
        "poller stopped"
    );
    if draft.is_dirty() {
        println!("Unsaved draft:\n{}", draft.text());
    }
    Ok(())
}

pub async fn show(target: Target, session_id: &str) -> anyhow::Result<()> {
    let clip = target
        .client
        .get_clip(session_id)
        .await
        .context("failed to read session")?;
    print_clip(&clip);
    Ok(())
}

pub async fn push(
    target: Target,
    session_id: &str,
    text: Option<&str>,
    images: &[PathBuf],
) -> anyhow::Result<()> {
    if text.is_none() && images.is_empty() {
        anyhow::bail!("nothing to push: pass --text and/or --image");
    }

    let clip = if images.is_empty() {
        target
            .client
            .save_text(session_id, text.unwrap_or_default())
            .await
    } else {
        let mut uploads = Vec::with_capacity(images.len());
        for path in images {
            uploads.push(load_image(path).await?);
        }
        target
            .client
            .save_with_images(session_id, text, uploads)
            .await
    }
    .context("failed to save clip")?;

    print_clip(&clip);
    Ok(())
}

fn print_clip(clip: &ClipInfo) {
    println!("--- {} ---", clip.session_id);
    println!("{}", clip.text);
    if !clip.images.is_empty() {
        println!("[{} image(s)]", clip.images.len());
    }
}
