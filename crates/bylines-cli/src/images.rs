//! Image-backfill flow: fetch each journalist's profile page, download the
//! header headshot, and record where it was written.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use bylines_core::JournalistRecord;
use bylines_db::JournalistStore;
use bylines_scraper::{
    download_image, image_url_from_profile, BylineClient, Dispatcher, DrainSummary, Url,
};

pub(crate) async fn run_images<S>(
    store: Arc<S>,
    client: Arc<BylineClient>,
    image_dir: PathBuf,
    concurrency: usize,
) -> anyhow::Result<DrainSummary>
where
    S: JournalistStore + 'static,
{
    tokio::fs::create_dir_all(&image_dir)
        .await
        .with_context(|| format!("failed to create image directory {}", image_dir.display()))?;

    let journalists = store.list_journalists().await?;
    let pending: Vec<JournalistRecord> = journalists
        .into_iter()
        .filter(JournalistRecord::needs_image)
        .collect();
    tracing::info!(
        pending = pending.len(),
        concurrency,
        dir = %image_dir.display(),
        "starting image backfill"
    );

    let image_dir = Arc::new(image_dir);
    let mut dispatcher = Dispatcher::<anyhow::Error>::new("images", concurrency);
    for journalist in pending {
        let store = Arc::clone(&store);
        let client = Arc::clone(&client);
        let image_dir = Arc::clone(&image_dir);
        let label = journalist.name.clone();

        dispatcher
            .submit(label, async move {
                backfill_one(store.as_ref(), &client, &image_dir, &journalist).await?;
                Ok::<(), anyhow::Error>(())
            })
            .await;
    }

    Ok(dispatcher.drain().await)
}

/// Runs the profile → image URL → download → write → update chain for one
/// journalist.
///
/// Returns the written path, or `None` when the profile has no headshot.
pub(crate) async fn backfill_one<S: JournalistStore>(
    store: &S,
    client: &BylineClient,
    image_dir: &Path,
    journalist: &JournalistRecord,
) -> anyhow::Result<Option<PathBuf>> {
    let Some(profile_url) = journalist.profile_url.as_deref() else {
        return Ok(None);
    };
    let profile_url = Url::parse(profile_url)
        .with_context(|| format!("invalid profile URL for {}: {profile_url}", journalist.name))?;

    let html = client
        .fetch_html(&profile_url)
        .await
        .with_context(|| format!("failed to fetch profile page for {}", journalist.name))?;
    let Some(image_url) = image_url_from_profile(&html, &profile_url)? else {
        tracing::debug!(journalist = %journalist.name, "profile has no header image");
        return Ok(None);
    };
    tracing::info!(journalist = %journalist.name, image_url = %image_url, "found profile image");

    let image = download_image(client, &image_url)
        .await
        .with_context(|| format!("failed to download profile image for {}", journalist.name))?;

    let path = image_dir.join(image.file_name(safe_file_stem(&journalist.name)?));
    tokio::fs::write(&path, &image.bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    let stored = path.to_string_lossy();
    store
        .update_journalist_image_path(&journalist.name, &stored)
        .await
        .with_context(|| format!("failed to record image path for {}", journalist.name))?;

    Ok(Some(path))
}

/// Rejects names that would escape the image directory.
fn safe_file_stem(name: &str) -> anyhow::Result<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        anyhow::bail!("journalist name {name:?} is not usable as a file name");
    }
    Ok(name)
}

#[cfg(test)]
#[path = "images_test.rs"]
mod tests;
