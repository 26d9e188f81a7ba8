use std::fmt::Display;

use clap::{Args, Parser, Subcommand};
use floorplan::camera::Point;
use floorplan::doc::{
    EntityId, EntityKind, EntityRef, MapObjectKind, MapObjectPatch, NewMapObject, NewTable, TableShape,
};
use floorplan::panel::PropertyEdit;
use floorplan::{Action, EditError, EditorCore};
use pos_client::layout::{refresh_on_event, save_editor};
use pos_client::{ClientConfig, ClientError, PosApi, RealtimeClient, fetch_layout, promptpay};
use realtime::ServerEvent;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("edit rejected: {0}")]
    Edit(#[from] EditError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("failed to load .env: {0}")]
    Env(#[from] dotenvy::Error),
    #[error("ctrl-c handler failed: {0}")]
    Signal(#[from] std::io::Error),
    #[error("nothing to change; pass {0}")]
    NothingToChange(&'static str),
    #[error("refusing to delete {0} without --yes")]
    ConfirmationRequired(String),
}

#[derive(Parser, Debug)]
#[command(name = "pos-cli", about = "Floor-plan, realtime, and PromptPay CLI for the POS backend")]
struct Cli {
    /// Overrides POS_BASE_URL (default http://127.0.0.1:3000).
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides POS_ADMIN_SECRET.
    #[arg(long)]
    admin_secret: Option<String>,

    /// Overrides POS_SOCKET_URL.
    #[arg(long)]
    socket_url: Option<String>,

    /// Overrides POS_REQUEST_TIMEOUT_SECS (default 30).
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Overrides POS_CONNECT_TIMEOUT_SECS (default 10).
    #[arg(long)]
    connect_timeout_secs: Option<u64>,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    /// `POS_*` settings from the environment, then any flags on top.
    fn config(&self) -> Result<ClientConfig, ClientError> {
        Ok(self.override_config(ClientConfig::from_env()?))
    }

    fn override_config(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_owned();
        }
        if let Some(secret) = &self.admin_secret {
            config.admin_secret = Some(secret.clone()).filter(|s| !s.is_empty());
        }
        if let Some(socket_url) = &self.socket_url {
            config.socket_url = Some(socket_url.trim_end_matches('/').to_owned()).filter(|s| !s.is_empty());
        }
        if let Some(secs) = self.request_timeout_secs {
            config.timeouts.request_secs = secs;
        }
        if let Some(secs) = self.connect_timeout_secs {
            config.timeouts.connect_secs = secs;
        }
        config
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    Zone(ZoneCommand),
    Table(TableCommand),
    Object(ObjectCommand),
    /// Edit the floor plan through the editor engine, then save the whole layout.
    Layout(LayoutCommand),
    /// Print real-time events until interrupted.
    Events(EventsArgs),
    /// Print a PromptPay QR payload.
    Promptpay(PromptPayArgs),
}

#[derive(Args, Debug)]
struct ZoneCommand {
    #[command(subcommand)]
    command: ZoneSubcommand,
}

#[derive(Subcommand, Debug)]
enum ZoneSubcommand {
    List,
    Create {
        name: String,
    },
    Delete {
        zone_id: EntityId,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct TableCommand {
    #[command(subcommand)]
    command: TableSubcommand,
}

#[derive(Subcommand, Debug)]
enum TableSubcommand {
    List,
    Create(TableCreateArgs),
    Delete {
        table_id: EntityId,
        #[arg(long)]
        yes: bool,
    },
    /// Set the service status (`available`, `occupied`, ...).
    Status {
        table_id: EntityId,
        status: String,
    },
    CallBill {
        table_name: String,
    },
}

#[derive(Args, Debug)]
struct TableCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    zone: String,
    #[arg(long, default_value_t = 4)]
    seats: u32,
    #[arg(long, value_parser = parse_tag::<TableShape>)]
    shape: Option<TableShape>,
    #[command(flatten)]
    geometry: GeometryArgs,
}

#[derive(Args, Debug)]
struct GeometryArgs {
    #[arg(long)]
    x: Option<f64>,
    #[arg(long)]
    y: Option<f64>,
    #[arg(long)]
    w: Option<f64>,
    #[arg(long)]
    h: Option<f64>,
    #[arg(long)]
    rotation: Option<f64>,
}

#[derive(Args, Debug)]
struct ObjectCommand {
    #[command(subcommand)]
    command: ObjectSubcommand,
}

#[derive(Subcommand, Debug)]
enum ObjectSubcommand {
    List,
    Create(ObjectCreateArgs),
    /// Write only the fields present in `--data`, e.g. `{"name":"Patio"}`.
    Patch {
        object_id: EntityId,
        #[arg(long)]
        data: String,
    },
    Delete {
        object_id: EntityId,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct ObjectCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long = "type", value_parser = parse_tag::<MapObjectKind>)]
    kind: MapObjectKind,
    #[arg(long)]
    zone: String,
    #[command(flatten)]
    geometry: GeometryArgs,
}

#[derive(Args, Debug)]
struct LayoutCommand {
    #[command(subcommand)]
    command: LayoutSubcommand,
}

#[derive(Subcommand, Debug)]
enum LayoutSubcommand {
    /// Print zones, tables, and map objects.
    Show,
    /// Drag an entity (`table:<id>` or `object:<id>`) by a client-space offset.
    Move {
        #[arg(value_parser = parse_target)]
        target: EntityRef,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dx: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dy: f64,
    },
    Resize {
        #[arg(value_parser = parse_target)]
        target: EntityRef,
        #[arg(long)]
        w: Option<f64>,
        #[arg(long)]
        h: Option<f64>,
    },
    /// Rotate to `degrees`, snapped to 15°.
    Rotate {
        #[arg(value_parser = parse_target)]
        target: EntityRef,
        #[arg(allow_negative_numbers = true)]
        degrees: f64,
    },
    Shape {
        table_id: EntityId,
        #[arg(value_parser = parse_tag::<TableShape>)]
        shape: TableShape,
    },
    Seats {
        table_id: EntityId,
        seats: u32,
    },
    /// Remove an entity from the plan and delete it on the backend.
    Delete {
        #[arg(value_parser = parse_target)]
        target: EntityRef,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct EventsArgs {
    /// Keep a local copy of the layout and refetch it when an event touches the floor plan.
    #[arg(long)]
    layout: bool,
}

#[derive(Args, Debug)]
struct PromptPayArgs {
    /// Phone number, tax id, or e-wallet id.
    #[arg(default_value = promptpay::FALLBACK_TARGET)]
    target: String,
    /// Amount in baht. Omit for a static QR.
    #[arg(long)]
    amount: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Load .env before building the config so `POS_*` values in it apply.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(error) if error.not_found() => {}
        Err(error) => return Err(error.into()),
    }

    let config = cli.config()?;
    match cli.command {
        Command::Zone(zone) => run_zone(&PosApi::new(&config)?, zone).await,
        Command::Table(table) => run_table(&PosApi::new(&config)?, table).await,
        Command::Object(object) => run_object(&PosApi::new(&config)?, object).await,
        Command::Layout(layout) => run_layout(&PosApi::new(&config)?, layout).await,
        Command::Events(args) => run_events(&config, args).await,
        Command::Promptpay(args) => {
            println!("{}", promptpay::payload(&args.target, args.amount)?);
            Ok(())
        }
    }
}

async fn run_zone(api: &PosApi, zone: ZoneCommand) -> Result<(), CliError> {
    match zone.command {
        ZoneSubcommand::List => print_json(&api.list_zones().await?),
        ZoneSubcommand::Create { name } => print_json(&api.create_zone(&name).await?),
        ZoneSubcommand::Delete { zone_id, yes } => {
            confirm(yes, format!("zone {zone_id}"))?;
            print_json(&api.delete_zone(zone_id).await?)
        }
    }
}

async fn run_table(api: &PosApi, table: TableCommand) -> Result<(), CliError> {
    match table.command {
        TableSubcommand::List => print_json(&api.list_tables().await?),
        TableSubcommand::Create(args) => {
            let form = NewTable {
                name: args.name,
                zone: args.zone,
                seats: args.seats,
                shape: args.shape,
                x: args.geometry.x,
                y: args.geometry.y,
                w: args.geometry.w,
                h: args.geometry.h,
                rotation: args.geometry.rotation,
            };
            print_json(&api.create_table(form).await?)
        }
        TableSubcommand::Delete { table_id, yes } => {
            confirm(yes, EntityRef::table(table_id))?;
            print_json(&api.delete_table(table_id).await?)
        }
        TableSubcommand::Status { table_id, status } => print_json(&api.set_table_status(table_id, &status).await?),
        TableSubcommand::CallBill { table_name } => print_json(&api.call_bill(&table_name).await?),
    }
}

async fn run_object(api: &PosApi, object: ObjectCommand) -> Result<(), CliError> {
    match object.command {
        ObjectSubcommand::List => print_json(&api.list_objects().await?),
        ObjectSubcommand::Create(args) => {
            let form = NewMapObject {
                name: args.name,
                kind: args.kind,
                zone: args.zone,
                x: args.geometry.x,
                y: args.geometry.y,
                w: args.geometry.w,
                h: args.geometry.h,
                rotation: args.geometry.rotation,
            };
            print_json(&api.create_object(&form).await?)
        }
        ObjectSubcommand::Patch { object_id, data } => {
            let patch = serde_json::from_str::<MapObjectPatch>(&data)?;
            print_json(&api.patch_object(object_id, &patch).await?)
        }
        ObjectSubcommand::Delete { object_id, yes } => {
            confirm(yes, EntityRef::decoration(object_id))?;
            print_json(&api.delete_object(object_id).await?)
        }
    }
}

async fn run_layout(api: &PosApi, layout: LayoutCommand) -> Result<(), CliError> {
    let mut editor = EditorCore::new();
    editor.load_snapshot(fetch_layout(api).await?);

    let (target, actions) = match layout.command {
        LayoutSubcommand::Show => return print_json(&editor.doc.snapshot()),
        LayoutSubcommand::Move { target, dx, dy } => {
            let end = Point::new(dx, dy);
            let mut actions = editor.begin_drag(target, Point::new(0.0, 0.0))?;
            actions.extend(editor.on_pointer_move(end));
            actions.extend(editor.on_pointer_up(end));
            (target, actions)
        }
        LayoutSubcommand::Resize { target, w, h } => {
            if w.is_none() && h.is_none() {
                return Err(CliError::NothingToChange("--w and/or --h"));
            }
            let edits = w.map(PropertyEdit::Width).into_iter().chain(h.map(PropertyEdit::Height));
            (target, edit(&mut editor, target, edits)?)
        }
        LayoutSubcommand::Rotate { target, degrees } => {
            (target, edit(&mut editor, target, [PropertyEdit::Rotation(degrees)])?)
        }
        LayoutSubcommand::Shape { table_id, shape } => {
            let target = EntityRef::table(table_id);
            (target, edit(&mut editor, target, [PropertyEdit::Shape(shape)])?)
        }
        LayoutSubcommand::Seats { table_id, seats } => {
            let target = EntityRef::table(table_id);
            (target, edit(&mut editor, target, [PropertyEdit::Seats(seats)])?)
        }
        LayoutSubcommand::Delete { target, yes } => {
            report(&editor.request_delete(target)?);
            confirm(yes, target)?;
            (target, editor.confirm_delete(target)?)
        }
    };

    for action in &actions {
        report(action);
    }
    if !editor.is_dirty() {
        eprintln!("{target}: no change");
        return Ok(());
    }

    if let Some(action) = save_editor(api, &mut editor).await? {
        report(&action);
    }
    if !editor.doc.contains(target) {
        return Ok(());
    }
    match target.kind {
        EntityKind::Table => print_json(&editor.doc.table(target.id)),
        EntityKind::Decoration => print_json(&editor.doc.object(target.id)),
    }
}

fn edit(
    editor: &mut EditorCore,
    target: EntityRef,
    edits: impl IntoIterator<Item = PropertyEdit>,
) -> Result<Vec<Action>, EditError> {
    if !editor.doc.contains(target) {
        return Err(EditError::NotFound(target));
    }
    let mut actions: Vec<Action> = editor.select(target).into_iter().collect();
    for edit in edits {
        actions.extend(editor.edit_selected(edit)?);
    }
    Ok(actions)
}

fn report(action: &Action) {
    match action {
        Action::SeatsOverridden { id, seats } => eprintln!("table {id} is a hut; seats kept at {seats}"),
        Action::GeometryChanged { target, geometry } => eprintln!(
            "{target}: x={:.0} y={:.0} w={:.0} h={:.0} rotation={:.0}",
            geometry.x, geometry.y, geometry.w, geometry.h, geometry.rotation
        ),
        Action::EntityDeleted { target, .. } => eprintln!("{target}: deleted"),
        Action::LayoutReloaded => eprintln!("layout reloaded from server"),
        other => tracing::debug!(?other, "editor action"),
    }
}

async fn run_events(config: &ClientConfig, args: EventsArgs) -> Result<(), CliError> {
    let api = PosApi::new(config)?;
    let mut editor = EditorCore::new();
    if args.layout {
        editor.load_snapshot(fetch_layout(&api).await?);
    }

    let mut client = RealtimeClient::connect(config).await?;
    eprintln!("connected: sid={}", client.sid());

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            event = client.next_event() => {
                let Some(event) = event else {
                    eprintln!("realtime channel closed");
                    break;
                };
                print_json(&event_json(&event))?;
                if args.layout {
                    match refresh_on_event(&api, &mut editor, &event).await {
                        Ok(Some(action)) => eprintln!(
                            "{action:?}: {} tables, {} objects",
                            editor.doc.tables().count(),
                            editor.doc.objects().count()
                        ),
                        Ok(None) => {}
                        Err(error) => tracing::warn!(%error, "layout refetch failed"),
                    }
                }
            }
        }
    }

    client.disconnect().await;
    Ok(())
}

/// Deletes run only when the operator passed `--yes`.
fn confirm(yes: bool, what: impl Display) -> Result<(), CliError> {
    if yes { Ok(()) } else { Err(CliError::ConfirmationRequired(what.to_string())) }
}

fn event_json(event: &ServerEvent) -> Value {
    let data = event.to_packet().data.and_then(|d| d.get(1).cloned()).unwrap_or(Value::Null);
    serde_json::json!({ "event": event.name(), "data": data })
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

/// `table:<id>` or `object:<id>`.
fn parse_target(raw: &str) -> Result<EntityRef, String> {
    let (kind, id) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected table:<id> or object:<id>, got {raw:?}"))?;
    let id = id.parse::<EntityId>().map_err(|_| format!("invalid id in {raw:?}"))?;
    match kind {
        "table" => Ok(EntityRef::table(id)),
        "object" => Ok(EntityRef::decoration(id)),
        _ => Err(format!("unknown entity kind {kind:?}")),
    }
}

/// Parse a serde tag such as `hut` or `water_station`.
fn parse_tag<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(Value::String(raw.to_owned())).map_err(|error| error.to_string())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
