//! tictac_duel - unified CLI
//!
//! Runs the session server, a hot-seat local game, or a terminal client
//! against a running server.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tictac_duel::{
    AppState, ClientView, LocalGame, LocalOutcome, Mark, Poller, ResetAction, RestSessionClient,
    ServerConfig, SessionApi, SessionManager, SessionSnapshot, ViewEvent, router,
};
use tokio::sync::{mpsc, watch};
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();
    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => run_server(config, host, port).await,
        Command::Local => run_local(),
        Command::Create {
            server_url,
            user_id,
            user_name,
        } => {
            let client = RestSessionClient::new(server_url);
            let created = client.create(&user_id, user_name.as_deref()).await?;
            println!("Game: {}", created.game_id);
            println!("Invite: {}", created.invite_link);
            Ok(())
        }
        Command::Join {
            server_url,
            game_id,
            user_id,
            user_name,
        } => {
            let client = RestSessionClient::new(server_url);
            let snapshot = client.join(&game_id, &user_id, user_name.as_deref()).await?;
            print_snapshot(&snapshot, &user_id);
            Ok(())
        }
        Command::Move {
            server_url,
            game_id,
            user_id,
            cell,
        } => {
            let client = RestSessionClient::new(server_url);
            let snapshot = client.make_move(&game_id, &user_id, cell).await?;
            print_snapshot(&snapshot, &user_id);
            Ok(())
        }
        Command::Reset {
            server_url,
            game_id,
            user_id,
            action,
        } => run_reset(server_url, game_id, user_id, action).await,
        Command::Watch {
            server_url,
            game_id,
            user_id,
            interval_ms,
        } => run_watch(server_url, game_id, user_id, interval_ms).await,
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tictac_duel=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the HTTP session server
#[instrument(skip_all, fields(config_path = %config.display()))]
async fn run_server(config: PathBuf, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = ServerConfig::load(&config)?;
    if let Some(host) = host {
        config = config.with_host(host);
    }
    if let Some(port) = port {
        config = config.with_port(port);
    }

    let sessions = SessionManager::new(
        Arc::new(tictac_duel::MemorySessionStore::new()),
        config.retention()?,
    );
    let addr = config.bind_addr();
    let app = router(AppState::new(sessions, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Session server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Hot-seat game on stdin/stdout
fn run_local() -> Result<()> {
    let mut game = LocalGame::new();
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    println!("Enter a cell (0-8), 'n' for a new round, 'q' to quit.");
    loop {
        println!("\n{}\n", game.board().display());
        if *game.active() {
            print!("{} to move> ", game.current_player());
        } else {
            print!("Round over> ");
        }
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "q" => break,
            "n" => {
                game.new_round();
                continue;
            }
            input => {
                let Ok(cell) = input.parse::<usize>() else {
                    println!("Not a cell: {}", input);
                    continue;
                };
                match game.play(cell) {
                    Ok(LocalOutcome::Continue { .. }) => {}
                    Ok(LocalOutcome::Won { mark, line }) => {
                        println!("\n{}\n", game.board().display());
                        println!("{} wins along {:?}!", mark, line);
                        print_score(&game);
                    }
                    Ok(LocalOutcome::Draw) => {
                        println!("\n{}\n", game.board().display());
                        println!("It's a draw!");
                        print_score(&game);
                    }
                    Err(e) => println!("{}", e),
                }
            }
        }
    }
    Ok(())
}

fn print_score(game: &LocalGame) {
    println!(
        "Score - X: {}  O: {}",
        game.score().wins(Mark::X),
        game.score().wins(Mark::O)
    );
}

fn print_snapshot(snapshot: &SessionSnapshot, user_id: &str) {
    let mut view = ClientView::new(user_id.to_string());
    view.apply(snapshot.clone());
    println!("\n{}\n", snapshot.board.display());
    println!("{}", view.status());
}

/// Send one rematch handshake step
#[instrument]
async fn run_reset(
    server_url: String,
    game_id: String,
    user_id: String,
    action: ResetAction,
) -> Result<()> {
    let client = RestSessionClient::new(server_url);
    let snapshot = client.reset(&game_id, &user_id, action).await?;
    match &snapshot.pending_reset {
        Some(pending) => println!("Rematch {} by {}", pending.status, pending.by),
        None => println!("No rematch pending"),
    }
    print_snapshot(&snapshot, &user_id);
    Ok(())
}

/// Poll a session and print view events until Ctrl-C
#[instrument]
async fn run_watch(
    server_url: String,
    game_id: String,
    user_id: String,
    interval_ms: Option<u64>,
) -> Result<()> {
    let interval_ms = match interval_ms {
        Some(ms) => ms,
        None => *ServerConfig::default()
            .with_env_overrides(|key| std::env::var(key).ok())?
            .poll_interval_ms(),
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = Poller::new(
        Arc::new(RestSessionClient::new(server_url)),
        game_id,
        ClientView::new(user_id),
        std::time::Duration::from_millis(interval_ms),
        event_tx,
        shutdown_rx,
    );
    let handle = tokio::spawn(poller.run());

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(ViewEvent::BoardChanged(board)) => println!("\n{}\n", board.display()),
                Some(ViewEvent::OpponentJoined { name }) => println!("{} joined", name),
                Some(ViewEvent::GameOver(winner)) => println!("Game over: {:?}", winner),
                Some(ViewEvent::ResetRequested { by }) => println!("{} wants a rematch", by),
                Some(ViewEvent::AwaitingResetResponse) => println!("Waiting for opponent to answer rematch"),
                Some(ViewEvent::ResetRejected) => println!("Rematch declined"),
                Some(ViewEvent::RoundRestarted) => println!("New round"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                shutdown_tx.send(true).ok();
                break;
            }
        }
    }

    let view = handle.await?;
    println!("{}", view.status());
    Ok(())
}
