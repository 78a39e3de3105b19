use std::sync::Arc;

use task_module_bot::bot::{DialogBot, build_dialogs, dialog_ids};
use task_module_bot::channels::{ChannelManager, CliChannel, bot_routes};
use task_module_bot::config::BotConfig;
use task_module_bot::store::{LibSqlStorage, MemoryStorage, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env()?;

    eprintln!("🤖 Task Module Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Messages: http://0.0.0.0:{}/api/messages", config.port);
    eprintln!("   Task module base URL: {}", config.base_url);

    // ── Storage ──────────────────────────────────────────────────────────
    let storage: Arc<dyn Storage> = match &config.db_path {
        Some(path) => {
            let storage = LibSqlStorage::new_local(path).await?;
            eprintln!("   Database: {}", path.display());
            Arc::new(storage)
        }
        None => {
            eprintln!("   Database: in-memory (state is lost on exit)");
            Arc::new(MemoryStorage::new())
        }
    };

    // ── Dialogs ──────────────────────────────────────────────────────────
    let dialogs = Arc::new(build_dialogs()?);
    let bot = Arc::new(
        DialogBot::new(dialogs, storage, dialog_ids::MAIN_DIALOG, &config.base_url)?
            .with_max_turn_attempts(config.max_turn_attempts),
    );

    // ── HTTP ─────────────────────────────────────────────────────────────
    let app = bot_routes(Arc::clone(&bot));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "HTTP endpoint started");
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "HTTP server stopped");
        }
    });

    // ── Channels ─────────────────────────────────────────────────────────
    if config.cli_enabled {
        let mut channels = ChannelManager::new();
        channels.add(Box::new(CliChannel::default()));
        eprintln!("   Channels: {}", channels.names().join(", "));
        eprintln!("   Type a message and press Enter. /quit to exit.\n");
        channels.run(&bot).await?;
        server.abort();
    } else {
        eprintln!("   Channels: http only\n");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("Ctrl+C received, shutting down..."),
            _ = server => {}
        }
    }

    Ok(())
}
