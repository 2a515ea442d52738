use arcade_client::domain::tank::TankClass;
use arcade_client::domain::tuning::{pong::PongTuning, shooter::ShooterTuning, tank::TankTuning};
use arcade_client::frameworks::config::TICK_INTERVAL;
use arcade_client::frameworks::runtime::connection_settings;
use arcade_client::interface_adapters::input::DragMode;
use arcade_client::interface_adapters::protocol::{PongCodec, ShooterCodec, TankCodec};
use arcade_client::use_cases::tank_session::{GameMode, TankOptions};
use arcade_client::use_cases::{ClientLoop, LoopSettings, PongSession, ShooterSession, TankSession};
use clap::{Parser, Subcommand};

/// Terminal client for the pong, tank battle and space shooter servers.
#[derive(Debug, Parser)]
#[command(name = "arcade_client", version)]
struct Cli {
    /// WebSocket server URL; overrides ARCADE_SERVER_URL.
    #[arg(long, global = true)]
    url: Option<String>,

    /// Skip the server and play the local simulation.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    game: Game,
}

#[derive(Debug, Subcommand)]
enum Game {
    Pong {
        #[arg(long, default_value = "Player")]
        name: String,
    },
    Tank {
        #[arg(long, default_value = "Player")]
        name: String,
        #[arg(long, default_value = "medium", value_parser = parse_class)]
        class: TankClass,
        #[arg(long, default_value = "deathmatch", value_parser = parse_mode)]
        mode: GameMode,
        /// Room code to join in team and capture modes.
        #[arg(long)]
        room: Option<String>,
    },
    Shooter {
        #[arg(long, default_value = "Player")]
        name: String,
        #[arg(long)]
        room: Option<String>,
    },
}

fn parse_class(value: &str) -> Result<TankClass, String> {
    TankClass::parse(value)
        .ok_or_else(|| format!("unknown tank class {value:?} (light, medium, heavy, artillery)"))
}

fn parse_mode(value: &str) -> Result<GameMode, String> {
    GameMode::parse(value)
        .ok_or_else(|| format!("unknown game mode {value:?} (deathmatch, team, capture)"))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    let mut config = arcade_client::init_runtime()?;
    if let Some(url) = cli.url {
        config.server_url = url;
    }
    tracing::info!(url = %config.server_url, offline = cli.offline, "starting");

    let settings = LoopSettings {
        reconnect: config.reconnect,
        offline: cli.offline,
    };
    let connection = connection_settings(&config);

    match cli.game {
        Game::Pong { name } => {
            let session = PongSession::new(name, PongTuning::default(), config.demo_fallback_delay);
            arcade_client::run::<_, PongCodec>(
                ClientLoop::new(session, settings),
                connection,
                DragMode::Vertical,
            )
            .await
        }
        Game::Tank {
            name,
            class,
            mode,
            room,
        } => {
            let options = TankOptions {
                player_name: name,
                class,
                mode,
                room_code: room,
            };
            let session =
                TankSession::new(options, TankTuning::default(), TICK_INTERVAL.as_secs_f32());
            arcade_client::run::<_, TankCodec>(
                ClientLoop::new(session, settings),
                connection,
                DragMode::Directional,
            )
            .await
        }
        Game::Shooter { name, room } => {
            let session = ShooterSession::new(name, room, ShooterTuning::default());
            arcade_client::run::<_, ShooterCodec>(
                ClientLoop::new(session, settings),
                connection,
                DragMode::Directional,
            )
            .await
        }
    }
}
