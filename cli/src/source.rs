//! Loading the graph document from a file or an http(s) URL

use anyhow::{bail, Context, Result};
use ownership_explorer::GraphStore;
use tracing::info;

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub async fn load(source: &str) -> Result<GraphStore> {
    let text = if is_remote(source) {
        fetch(source).await?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read {}", source))?
    };

    let store = GraphStore::from_json_str(&text)
        .with_context(|| format!("Failed to load graph data from {}", source))?;
    info!("Loaded {} links from {}", store.link_count(), source);
    Ok(store)
}

async fn fetch(url: &str) -> Result<String> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("Failed to load graph data (status: {})", status);
    }

    Ok(response.text().await?)
}
