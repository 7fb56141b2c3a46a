use anyhow::Context as _;

use crate::{ClipboardEntry as _, Element as _, Host};

const IMAGE_PREFIX: &str = "image";

/// Reads every clipboard item and, when a container is given, appends an image for each image type.
///
/// All items and all of their types are visited. The payload retrieved last wins, whatever its type.
pub(crate) async fn paste<H: Host>(host: &H, select: Option<&H::Element>) -> Option<H::Blob> {
    match paste_entries(host, select).await {
        Ok(blob) => blob,
        Err(e) => {
            warn!("Paste error: {e:#}");
            None
        }
    }
}

async fn paste_entries<H: Host>(host: &H, select: Option<&H::Element>) -> anyhow::Result<Option<H::Blob>> {
    let entries = host.read_clipboard().await.context("clipboard read")?;

    let mut last = None;

    for entry in &entries {
        for mime_type in entry.types() {
            let blob = entry
                .get_type(&mime_type)
                .await
                .with_context(|| format!("clipboard item as {mime_type}"))?;

            if let Some(container) = select {
                if mime_type.starts_with(IMAGE_PREFIX) {
                    attach_image(host, container, &blob)?;
                }
            }

            last = Some(blob);
        }
    }

    if last.is_none() {
        debug!("Clipboard has no content");
    }

    Ok(last)
}

fn attach_image<H: Host>(host: &H, container: &H::Element, blob: &H::Blob) -> anyhow::Result<()> {
    let image = host.create_image()?;
    let url = host.create_object_url(blob)?;

    // The object URL is only needed until the image has decoded it.
    let loaded = image.clone();
    let releaser = host.clone();
    host.listen_once(
        &image,
        "load",
        Box::new(move || {
            if let Some(src) = loaded.attribute("src") {
                releaser.revoke_object_url(&src);
            }
        }),
    )?;

    image.set_attribute("src", &url)?;
    container.append_child(&image)?;

    Ok(())
}
