//! Schedule Studio command-line client
//!
//! Picks a theme and background, then requests a rendered schedule image for
//! a room and saves it as `<room>.jpg`.

use anyhow::{bail, Context, Result};
use app_core::{
    DeliveryCapability, DirectoryTarget, ImagePipeline, RoomInput, StudioConfig, SubmitOutcome,
};
use app_state::{Notifier, SaveOutcome, ThemeSession};
use app_ui::{
    classify, hex_to_color, readable_text_color, Background, Slot, ThemeRef, BUILTIN_THEMES,
};
use clap::{Args, Parser, Subcommand};
use networking::{RenderClient, RenderClientConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storage::{KvConfig, KvPreferenceStore, KvStore, LocalStore};
use tracing_subscriber::EnvFilter;

const DEFAULT_ENDPOINT: &str = "http://localhost:8080/render";

#[derive(Parser)]
#[command(name = "schedule-studio", about = "Themed class schedule images")]
struct Cli {
    #[arg(long, global = true, env = "SCHEDULE_STUDIO_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    #[arg(long, global = true, env = "SCHEDULE_STUDIO_DATA", default_value = "schedule_studio_kv.db")]
    data: PathBuf,
    #[arg(long, global = true, env = "SCHEDULE_STUDIO_USER", default_value = "local")]
    user: String,
    /// Request timeout in seconds; waits indefinitely when unset
    #[arg(long, global = true, env = "SCHEDULE_STUDIO_TIMEOUT_SECS")]
    timeout: Option<u64>,
    /// Extra header sent to the render backend, as `name: value`
    #[arg(long = "header", global = true, value_parser = parse_header)]
    headers: Vec<(String, String)>,
    /// Comma-separated allow-list replacing the built-in rooms
    #[arg(long, global = true, env = "SCHEDULE_STUDIO_ROOMS", value_delimiter = ',')]
    rooms: Vec<u16>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render and save the schedule image for a room
    Render(RenderArgs),
    /// List themes
    Themes,
    /// Manage the active theme and custom themes
    #[command(subcommand)]
    Theme(ThemeCommand),
    /// Show how a color is classified and which text color reads on it
    Contrast {
        /// Color as hex
        color: String,
    },
    /// Print the last submitted room
    LastRoom,
}

#[derive(Args)]
struct RenderArgs {
    /// Room number; defaults to the last submitted room
    #[arg(long)]
    room: Option<String>,
    /// Theme reference (`d-<key>` or `c-<id>`); defaults to the active theme
    #[arg(long)]
    theme: Option<String>,
    /// Background overlay; defaults to the saved background
    #[arg(long)]
    background: Option<Background>,
    #[arg(long, env = "SCHEDULE_STUDIO_OUTPUT", default_value = ".")]
    output_dir: PathBuf,
    /// User agent of the requesting browser, used to pick the delivery path
    #[arg(long)]
    client_user_agent: Option<String>,
}

#[derive(Subcommand)]
enum ThemeCommand {
    /// Activate a theme
    Select { reference: String },
    /// Set the background overlay
    Background { background: Background },
    /// Save the active palette with slot overrides
    Save {
        /// New theme name; required when the active theme is built in
        #[arg(long)]
        name: Option<String>,
        /// Slot override as `slot=#RRGGBB`, repeatable
        #[arg(long = "set", value_parser = parse_slot_color)]
        overrides: Vec<(Slot, String)>,
    },
    /// Delete a custom theme
    Delete { id: String },
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw.split_once(':').ok_or("expected `name: value`")?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn parse_slot_color(raw: &str) -> std::result::Result<(Slot, String), String> {
    let (slot, color) = raw.split_once('=').ok_or("expected `slot=#RRGGBB`")?;
    let slot = slot.parse::<Slot>().map_err(|e| e.to_string())?;
    Ok((slot, color.to_string()))
}

fn build_config(cli: &Cli) -> StudioConfig {
    let mut render = RenderClientConfig::new(&cli.endpoint);
    if let Some(secs) = cli.timeout {
        render = render.with_timeout(Duration::from_secs(secs));
    }
    for (name, value) in &cli.headers {
        render = render.with_header(name, value);
    }

    let mut config = StudioConfig::default()
        .with_render(render)
        .with_kv(KvConfig::new(cli.data.to_string_lossy()));
    if !cli.rooms.is_empty() {
        config = config.with_rooms(cli.rooms.iter().copied());
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = build_config(&cli);

    let kv = Arc::new(KvStore::new(config.kv.clone()).context("failed to open local store")?);
    let local = LocalStore::new(kv.clone());
    let notifier = Notifier::new(config.notification_duration);
    let mut session = ThemeSession::new(Arc::new(KvPreferenceStore::new(kv.clone())), notifier.clone());
    session.sign_in(cli.user.as_str()).await;

    match cli.command {
        Command::Render(args) => {
            config = config.with_output_dir(&args.output_dir);
            if let Some(theme) = &args.theme {
                let reference: ThemeRef = theme.parse().context("invalid theme reference")?;
                session.select(reference).await;
            }
            if let Some(background) = args.background {
                session.select_background(background).await;
            }

            let last_room = local.last_room().context("failed to read last room")?;
            let room = match args.room.or(last_room) {
                Some(room) => room,
                None => bail!("no room given and none remembered"),
            };
            let input = RoomInput::new(config.rooms.clone(), Some(&room));
            if !input.is_valid() {
                bail!("room {:?} is not on the allow-list", room);
            }

            let capability = args
                .client_user_agent
                .as_deref()
                .map(DeliveryCapability::from_user_agent)
                .unwrap_or_default();
            let client = RenderClient::new(config.render.clone()).context("failed to build HTTP client")?;
            let target = Arc::new(DirectoryTarget::new(&config.output_dir, client.clone()));
            let pipeline = ImagePipeline::new(client, local, notifier, target)
                .with_validator(config.rooms.clone())
                .with_capability(capability);

            let selection = session.selection();
            match pipeline
                .submit(input.value(), selection.working_palette(), selection.background())
                .await?
            {
                SubmitOutcome::Delivered { filename, via_link } => {
                    let path = config.output_dir.join(filename);
                    tracing::info!(room = input.value(), via_link, "Schedule image ready");
                    println!("{}", path.display());
                }
                SubmitOutcome::AlreadyRequesting => println!("A request is already in flight"),
            }
        }
        Command::Themes => {
            let active = session.selection().active().clone();
            for builtin in BUILTIN_THEMES {
                let reference = ThemeRef::builtin(builtin.key);
                let marker = if reference == active { "*" } else { " " };
                println!("{} {:<14} {}", marker, reference.to_string(), builtin.name);
            }
            for (id, theme) in session.selection().catalog().custom_entries() {
                let reference = ThemeRef::custom(id);
                let marker = if reference == active { "*" } else { " " };
                println!("{} {:<14} {}", marker, reference.to_string(), theme.name);
            }
            println!("background: {}", session.selection().background().label());
        }
        Command::Theme(command) => run_theme_command(&mut session, command).await?,
        Command::Contrast { color } => {
            let color = hex_to_color(&color).with_context(|| format!("invalid color {:?}", color))?;
            let thresholds = config.thresholds;
            println!("color:   {}", color);
            println!("action:  {}", classify(&color, thresholds.action));
            println!("preview: {}", classify(&color, thresholds.preview));
            println!("text:    {}", readable_text_color(&color, thresholds.action));
        }
        Command::LastRoom => match local.last_room().context("failed to read last room")? {
            Some(room) => println!("{}", room),
            None => println!("(none)"),
        },
    }

    kv.flush().context("failed to flush local store")?;
    Ok(())
}

async fn run_theme_command(session: &mut ThemeSession, command: ThemeCommand) -> Result<()> {
    match command {
        ThemeCommand::Select { reference } => {
            let reference: ThemeRef = reference.parse().context("invalid theme reference")?;
            session.select(reference).await;
            println!("{}", session.selection().theme().name);
        }
        ThemeCommand::Background { background } => {
            session.select_background(background).await;
        }
        ThemeCommand::Save { name, overrides } => {
            for (slot, hex) in overrides {
                let color = hex_to_color(&hex).with_context(|| format!("invalid color {:?}", hex))?;
                session.edit_slot(slot, color);
            }
            match session.save_active(name.as_deref()).await? {
                SaveOutcome::Updated(id) => println!("updated c-{}", id),
                SaveOutcome::Created(id) => println!("created c-{}", id),
            }
        }
        ThemeCommand::Delete { id } => {
            let id = id.strip_prefix("c-").unwrap_or(&id).to_string();
            if !session.delete_custom(&id).await {
                println!("no custom theme {}", id);
            }
        }
    }
    Ok(())
}
