mod config;
mod console;

use config::ServerConfig;
use console::Console;
use gs_game::item_data::ItemDataRegistry;
use gs_game::scene::ScenePlayer;
use gs_game::world::World;
use tokio::io::AsyncBufReadExt;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match ServerConfig::load("server.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "{} v{} starting (host uid {}, peer {})",
        config.server.name,
        env!("CARGO_PKG_VERSION"),
        config.server.host_uid,
        config.server.host_peer_id
    );

    let items = match ItemDataRegistry::load(&config.world.item_data) {
        Ok(items) => items,
        Err(e) => {
            error!("Failed to load {}: {}", config.world.item_data, e);
            std::process::exit(1);
        }
    };
    info!("Loaded {} item definitions", items.len());

    let scene_id = config.world.default_scene;
    let mut world = World::new(config.server.host_uid, config.server.host_peer_id);
    world
        .get_or_create_scene(scene_id)
        .set_dont_destroy_when_empty(true);
    world.add_player(
        scene_id,
        ScenePlayer::new(
            config.server.host_uid,
            config.server.host_peer_id,
            config.server.nickname.clone(),
        ),
    );

    let mut console = Console::new(world, items, scene_id, config.drops.clone());
    let stats = console.flush_outgoing();
    info!(
        "Scene {} ready ({} packet(s), {} bytes queued)",
        scene_id, stats.packets, stats.bytes
    );

    // Console REPL: read lines from stdin
    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            line = console_rx.recv() => {
                let Some(line) = line else {
                    info!("Console closed");
                    break;
                };
                let result = console.handle_line(&line);
                for message in &result.messages {
                    if result.success {
                        info!("{}", message);
                    } else {
                        warn!("{}", message);
                    }
                }
                let stats = console.flush_outgoing();
                if stats.packets > 0 {
                    info!("Sent {} packet(s), {} bytes", stats.packets, stats.bytes);
                }
                if result.should_stop {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!(
        "Server shut down with {} scene(s) loaded.",
        console.world().scene_count()
    );
}
