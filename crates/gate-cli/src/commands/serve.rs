use anyhow::Result;
use gate_config::Config;

pub async fn handle(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
    database_url: Option<String>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if database_url.is_some() {
        config.database.url = database_url;
    }

    gate_server::serve(config).await
}
