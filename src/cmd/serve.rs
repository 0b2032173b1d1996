//! HTTP server command: `kanban serve`.

use anyhow::Result;

use kanban::config::KanbanToml;

pub async fn cmd_serve(
    settings: KanbanToml,
    port: Option<u16>,
    host: Option<String>,
    cors: bool,
) -> Result<()> {
    let mut config = settings.server_config();
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(host) = host {
        config.host = host;
    }
    config.cors_permissive |= cors;

    kanban::board::start_server(config).await
}
