use std::path::{Path, PathBuf};

use clap::{Arg, Command};
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use tokio::net::TcpListener;

use embermoor::config::ServerConfig;
use embermoor::data::load_game_data;
use embermoor::game::messages::ControlMessage;
use embermoor::game::storage::{self, StorageDirs};
use embermoor::game::GameWorld;
use embermoor::protocol::GameServer;

const EXIT_CONTENT_LOAD_FAILURE: i32 = 1;
const EXIT_INVALID_CONFIGURATION: i32 = 2;
const EXIT_FATAL_RUNTIME_ERROR: i32 = 3;

#[tokio::main]
async fn main() {
    let matches = Command::new("embermoor-server")
        .about("Authoritative server for the Embermoor text adventure")
        .arg(
            Arg::new("content-dir")
                .long("content-dir")
                .takes_value(true)
                .default_value("content")
                .help("Directory holding items/, npcs/, quests/, enemies/, areas/"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .takes_value(true)
                .help("Directory for durable state (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .takes_value(true)
                .help("Optional JSON configuration file"),
        )
        .arg(
            Arg::new("listen")
                .long("listen")
                .takes_value(true)
                .default_value("0.0.0.0:4000"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .takes_value(true)
                .default_value("info")
                .possible_values(["error", "warn", "info", "debug", "trace"]),
        )
        .get_matches();

    let log_level = match matches.value_of("log-level") {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    TermLogger::init(
        log_level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .ok();

    let config = match ServerConfig::load(matches.value_of("config").map(Path::new)) {
        Ok(config) => config,
        Err(error) => {
            error!("{}", error);
            std::process::exit(EXIT_INVALID_CONFIGURATION);
        }
    };

    let content_dir = PathBuf::from(matches.value_of("content-dir").unwrap_or("content"));
    let game_data = match load_game_data(&content_dir) {
        Ok(data) => data,
        Err(load_error) => {
            error!("{}", load_error);
            std::process::exit(EXIT_CONTENT_LOAD_FAILURE);
        }
    };

    if let Err(config_error) = config.validate_against_content(&game_data) {
        error!("{}", config_error);
        std::process::exit(EXIT_INVALID_CONFIGURATION);
    }

    let data_dir = matches
        .value_of("data-dir")
        .map(PathBuf::from)
        .unwrap_or_else(storage::default_data_dir);
    let storage_dirs = match StorageDirs::new(&data_dir) {
        Ok(dirs) => dirs,
        Err(error) => {
            error!("failed to prepare data directory {}: {}", data_dir.display(), error);
            std::process::exit(EXIT_FATAL_RUNTIME_ERROR);
        }
    };

    let (control_tx, control_rx) = crossbeam_channel::unbounded();
    let game_config = config.clone();
    let game_thread = std::thread::spawn(move || {
        GameWorld::new(game_data, game_config, storage_dirs).run(control_rx);
    });

    let listen_addr = matches.value_of("listen").unwrap_or("0.0.0.0:4000");
    let listener = match TcpListener::bind(listen_addr).await {
        Ok(listener) => listener,
        Err(error) => {
            error!("failed to bind {}: {}", listen_addr, error);
            std::process::exit(EXIT_FATAL_RUNTIME_ERROR);
        }
    };
    info!("listening on {}", listen_addr);

    let mut server = GameServer::new(listener, control_tx.clone());
    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
        }
    }

    let (response_tx, response_rx) = tokio::sync::oneshot::channel();
    control_tx
        .send(ControlMessage::Shutdown { response_tx })
        .ok();
    response_rx.await.ok();
    game_thread.join().ok();

    std::process::exit(0);
}
