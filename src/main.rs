use bookshelf_mcp::infra::config::ClientConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdoutはMCPのトランスポートなのでログはstderrへ
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = ClientConfig::load(std::env::args().nth(1))?;

    bookshelf_mcp::interface::mcp::run(config).await
}
