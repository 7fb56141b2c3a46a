use anyhow::Context as _;

use crate::{Element, Host};

/// Fetches the resource behind `select` and writes it to the clipboard as one typed item.
///
/// Returns `false` when `select` has no resource location or when any step fails.
pub(crate) async fn copy<H: Host>(host: &H, select: Option<&H::Element>) -> bool {
    let Some(url) = select.and_then(Element::source_url) else {
        debug!("Copy target has neither `src` nor `href`");
        return false;
    };

    match copy_url(host, &url).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Copy error: {e:#}");
            false
        }
    }
}

async fn copy_url<H: Host>(host: &H, url: &str) -> anyhow::Result<()> {
    let item = host.fetch(url).await.with_context(|| format!("fetch {url}"))?;

    trace!("Fetched {url} as {}", item.mime_type);

    host.write_clipboard(vec![item]).await.context("clipboard write")?;

    Ok(())
}
