use shell_search::platform::default_collaborators;
use shell_search::{spawn_provider, ProviderConfig, ProviderResult, Server};

#[tokio::main]
async fn main() -> ProviderResult<()> {
    setup_tracing();

    let config = ProviderConfig::from_env()?;
    let provider = spawn_provider(&config, default_collaborators(&config))?;
    let mut server = Server::bind(config.bind_addr, provider.clone()).await?;
    println!("{}", server.addr());

    tokio::select! {
        _ = provider.keepalive().idle(config.inactivity_timeout) => {
            tracing::info!("no activity, exiting");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(error) = result {
                tracing::warn!("failed to listen for ctrl-c: {error}");
            }
            tracing::info!("interrupted, exiting");
        }
    }

    provider.shutdown().await?;
    server.shutdown()
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shell_search=info,filesearch=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
