use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::info;

use rollarchive_core::server::serve;
use rollarchive_core::{AppConfig, ArchiveServer, PostArchive};

pub async fn run(config: &AppConfig) -> Result<()> {
    let server_config = &config.server;
    let path = server_config.posts_path.as_ref().ok_or_else(|| {
        anyhow!(
            "No posts to serve.\nPass a posts file with:\n  rollarchive serve --posts posts.json\n\nOr set server.posts_path in the config file."
        )
    })?;

    let archive = PostArchive::load(path, server_config.per_page)?
        .with_site_title(server_config.site_title.clone())
        .with_strings(config.strings.clone());
    info!(
        "Loaded {} posts from {} ({} per page)",
        archive.len(),
        path.display(),
        server_config.per_page
    );

    let server = ArchiveServer::new(Arc::new(archive), server_config);
    serve(server, server_config).await?;
    Ok(())
}
