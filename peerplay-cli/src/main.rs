use clap::{Parser, Subcommand};
use peerplay_cli::application::{render_directory, render_game, HELP};
use peerplay_cli::{describe_event, parse_command, run_demo, CliError, Command, LogConfig, Result};
use peerplay_core::{MoveRules, PeerId};
use peerplay_p2p::{SessionConfig, SessionOrchestrator, SimulatedMediaTransport, WsChannel};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

type Session = SessionOrchestrator<WsChannel, SimulatedMediaTransport>;

#[derive(Parser)]
#[command(name = "peerplay")]
#[command(version, about = "peerplay - find a peer, call them, play tic-tac-toe")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a relay and play interactively
    Play {
        /// Display name
        #[arg(short = 'n', long)]
        name: String,

        /// Relay WebSocket URL
        #[arg(short = 's', long, env = "PEERPLAY_SIGNALING_URL")]
        server: Option<String>,

        /// Enforce alternating turns (caller moves first)
        #[arg(long)]
        strict_turns: bool,

        /// TURN server URL (optional, format: turn:host:port)
        #[arg(long)]
        turn_server: Option<String>,

        /// TURN username (required if turn-server is set)
        #[arg(long)]
        turn_username: Option<String>,

        /// TURN credential (required if turn-server is set)
        #[arg(long)]
        turn_credential: Option<String>,
    },

    /// Run a scripted Alice vs Bob match in-process
    Demo {
        /// Enforce alternating turns
        #[arg(long)]
        strict_turns: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = match (&cli.command, cli.verbose) {
        (_, true) => LogConfig::dev(),
        (Commands::Play { .. }, false) => LogConfig::interactive(),
        (Commands::Demo { .. }, false) => LogConfig::default(),
    };
    if cli.json_logs {
        log_config = log_config.with_json();
    }
    log_config.init().map_err(CliError::Logging)?;

    match cli.command {
        Commands::Play {
            name,
            server,
            strict_turns,
            turn_server,
            turn_username,
            turn_credential,
        } => {
            let config = build_config(
                server,
                strict_turns,
                turn_server,
                turn_username,
                turn_credential,
            )?;
            play(config, &name).await?;
        }
        Commands::Demo { strict_turns } => {
            let rules = if strict_turns {
                MoveRules::Alternating
            } else {
                MoveRules::Open
            };
            let report = run_demo(rules)?;
            println!("{}", report.board);
            match &report.winners[0] {
                Some(winner) => println!("Winner: {}", winner),
                None => println!("No winner"),
            }
        }
    }

    Ok(())
}

fn build_config(
    server: Option<String>,
    strict_turns: bool,
    turn_server: Option<String>,
    turn_username: Option<String>,
    turn_credential: Option<String>,
) -> Result<SessionConfig> {
    let mut config = SessionConfig::from_env();
    if let Some(server) = server {
        config.signaling_url = server;
    }
    if strict_turns {
        config = config.with_move_rules(MoveRules::Alternating);
    }

    if let Some(turn_url) = turn_server {
        match (turn_username, turn_credential) {
            (Some(username), Some(credential)) => {
                info!("Using TURN server: {}", turn_url);
                config = config.with_turn_server(turn_url, username, credential);
            }
            _ => {
                return Err(CliError::InvalidConfig(
                    "TURN server requires both username and credential".to_string(),
                ));
            }
        }
    }

    Ok(config)
}

async fn play(config: SessionConfig, name: &str) -> Result<()> {
    info!("Connecting to {}", config.signaling_url);

    let channel = WsChannel::connect(&config.signaling_url).await?;
    let transport = SimulatedMediaTransport::new(config.ice_servers.clone());
    let mut session = SessionOrchestrator::new(channel, transport, config.move_rules);
    session.assign_identity(name)?;

    println!("Hi {}! {}", name, HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(Duration::from_millis(config.poll_interval_ms));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                session.poll();
                for event in session.drain_events() {
                    println!("* {}", describe_event(&event));
                    if event == peerplay_p2p::SessionEvent::ChannelLost {
                        return Ok(());
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(&mut session, command) {
                            println!("! {}", e);
                        }
                    }
                    Err(e) => println!("! {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                break;
            }
        }
    }

    Ok(())
}

fn execute(session: &mut Session, command: Command) -> Result<()> {
    match command {
        Command::Users => {
            session.request_presence()?;
            println!("{}", render_directory(session.directory()));
        }
        Command::Select(target) => {
            let peer = resolve_peer(session, &target)?;
            session.select_peer(&peer)?;
            println!("Selected {}", target);
        }
        Command::Call => session.initiate_call()?,
        Command::Move { row, col } => {
            session.play_local(row, col)?;
            print_board(session);
        }
        Command::Board => print_board(session),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}

/// Accept either a directory index or a literal peer id
fn resolve_peer(session: &Session, target: &str) -> Result<PeerId> {
    if let Ok(index) = target.parse::<usize>() {
        if let Some(peer) = session.directory().nth(index) {
            return Ok(peer.id().clone());
        }
    }
    let id = PeerId::new(target);
    if session.directory().contains(&id) {
        Ok(id)
    } else {
        Err(CliError::PeerNotFound(target.to_string()))
    }
}

fn print_board(session: &Session) {
    match session.game() {
        Some(game) => println!("{}", render_game(game)),
        None => println!("No game yet, select a peer first"),
    }
}
