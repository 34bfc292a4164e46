//! Device command handlers.

use serde_json::{Map, Value, json};
use tabled::Tabled;

use smarthome_api::{
    Device, DeviceCommand, DeviceDraft, Interval, LockEvent, SmartHome, TelemetryPoint,
};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts, HistoryCommand, IntervalArg};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Online")]
    online: String,
    #[tabled(rename = "State")]
    state: String,
}

impl DeviceRow {
    fn new(d: &Device, color: bool) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            dtype: d.device_type.clone(),
            room: d.room.clone().unwrap_or_default(),
            online: output::flag(d.online, "online", "offline", color),
            state: output::flag(d.active, "on", "off", color),
        }
    }
}

#[derive(Tabled)]
struct SampleRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&TelemetryPoint> for SampleRow {
    fn from(p: &TelemetryPoint) -> Self {
        Self {
            time: p.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            value: format!("{:.1}", p.value),
        }
    }
}

#[derive(Tabled)]
struct LockEventRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Method")]
    method: String,
}

impl From<&LockEvent> for LockEventRow {
    fn from(e: &LockEvent) -> Self {
        Self {
            time: e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            device: e.device_id.clone(),
            action: e.action.clone(),
            user: e.user.clone().unwrap_or_default(),
            method: e.method.clone().unwrap_or_default(),
        }
    }
}

fn detail(d: &Device) -> String {
    let mut lines = vec![
        format!("ID:        {}", d.id),
        format!("Name:      {}", d.name),
        format!("Type:      {}", d.device_type),
        format!("Category:  {}", d.category.as_deref().unwrap_or("-")),
        format!("Room:      {}", d.room.as_deref().unwrap_or("-")),
        format!("Online:    {}", d.online),
        format!("Active:    {}", d.active),
        format!("Control:   {}", d.can_control),
    ];
    if let Some(b) = d.brightness {
        lines.push(format!("Brightness: {b}%"));
    }
    if let Some(ref c) = d.color {
        lines.push(format!("Color:     {c}"));
    }
    if let Some(ts) = d.last_updated {
        lines.push(format!("Updated:   {}", ts.format("%Y-%m-%d %H:%M:%S")));
    }
    if !d.properties.is_empty() {
        lines.push("Properties:".into());
        for (k, v) in &d.properties {
            let shown = v.as_str().map_or_else(|| v.to_string(), str::to_owned);
            lines.push(format!("  {k} = {shown}"));
        }
    }
    lines.join("\n")
}

fn interval(arg: IntervalArg) -> Interval {
    match arg {
        IntervalArg::Hour => Interval::Hour,
        IntervalArg::Day => Interval::Day,
        IntervalArg::Week => Interval::Week,
        IntervalArg::Month => Interval::Month,
    }
}

fn power(state: &str) -> DeviceCommand {
    let mut params = Map::new();
    params.insert("tb_power".into(), json!(state));
    DeviceCommand::set_state(params)
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    home: &SmartHome,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.format();
    let color = output::should_color(&global.color_mode());

    match args.command {
        DevicesCommand::List => {
            let devices = home.devices().await?;
            let out = output::render_list(
                &format,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| d.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { id } => {
            let Some(device) = home.device(&id).await? else {
                return Err(CliError::NotFound {
                    message: format!("device '{id}'"),
                });
            };
            let out = output::render_single(&format, &device, detail, |d| d.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Create {
            name,
            device_type,
            room,
            category,
            sub_type,
            properties,
        } => {
            let props = util::parse_pairs("prop", &properties)?;
            let draft = DeviceDraft {
                name: Some(name),
                device_type: Some(device_type),
                category,
                sub_type,
                room,
                properties: (!props.is_empty()).then(|| props.into_iter().collect()),
            };
            let device = home.create_device(draft).await?;
            let out = output::render_single(&format, &device, detail, |d| d.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Update {
            id,
            name,
            room,
            properties,
        } => {
            let props = util::parse_pairs("prop", &properties)?;
            let changes = DeviceDraft {
                name,
                room,
                properties: (!props.is_empty()).then(|| props.into_iter().collect()),
                ..DeviceDraft::default()
            };
            let updated = home.update_device(&id, &changes).await?;
            if updated.is_null() {
                return Err(CliError::NotFound {
                    message: format!("device '{id}'"),
                });
            }
            let out = output::render_value(&format, &util::checked(updated)?);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete device {id}?"), global.yes)? {
                return Ok(());
            }
            util::checked(home.delete_device(&id).await?)?;
            if !global.quiet {
                eprintln!("Device deleted");
            }
            Ok(())
        }

        DevicesCommand::Command {
            id,
            command,
            params,
        } => {
            let params = util::parse_pairs("param", &params)?;
            let cmd = DeviceCommand {
                command,
                parameters: (!params.is_empty()).then_some(params),
            };
            run_command(home, &id, &cmd, global).await
        }

        DevicesCommand::On { id } => run_command(home, &id, &power("on"), global).await,
        DevicesCommand::Off { id } => run_command(home, &id, &power("off"), global).await,

        DevicesCommand::Status { id } => print_value(home.device_status(&id).await?, global),
        DevicesCommand::Available => print_value(home.available_devices().await?, global),

        DevicesCommand::Sync { id } => {
            let result = util::checked(home.sync_thingsboard(&id).await?)?;
            output::print_output(&output::render_value(&format, &result), global.quiet);
            Ok(())
        }

        DevicesCommand::History(history) => handle_history(home, history.command, global).await,
    }
}

async fn run_command(
    home: &SmartHome,
    id: &str,
    command: &DeviceCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = home.send_command(id, command).await?;
    if !outcome.success {
        return Err(CliError::Rejected {
            message: outcome
                .message
                .unwrap_or_else(|| format!("command '{}' failed", command.command)),
        });
    }
    let format = global.format();
    let out = match outcome.device {
        Some(ref device) => output::render_single(&format, device, detail, |d| d.id.clone()),
        None => output::render_single(
            &format,
            &outcome,
            |o| o.message.clone().unwrap_or_else(|| "Command sent".into()),
            |_| id.to_owned(),
        ),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_value(value: Value, global: &GlobalOpts) -> Result<(), CliError> {
    let value = util::checked(value)?;
    output::print_output(&output::render_value(&global.format(), &value), global.quiet);
    Ok(())
}

async fn handle_history(
    home: &SmartHome,
    command: HistoryCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.format();
    match command {
        HistoryCommand::Temperature { id, interval: i } => {
            let points = home.temperature_history(&id, interval(i)).await?;
            let out = output::render_list(
                &format,
                &points,
                |p| SampleRow::from(p),
                |p| p.value.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HistoryCommand::Humidity { id, interval: i } => {
            let points = home.humidity_history(&id, interval(i)).await?;
            let out = output::render_list(
                &format,
                &points,
                |p| SampleRow::from(p),
                |p| p.value.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HistoryCommand::Lock { id } => {
            let events = match id {
                Some(ref id) => home.lock_history(id).await?,
                None => home.all_lock_history().await?,
            };
            let out = output::render_list(
                &format,
                &events,
                |e| LockEventRow::from(e),
                |e| e.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HistoryCommand::AddLock {
            id,
            action,
            user,
            method,
        } => {
            let mut entry = json!({ "action": action });
            if let Some(user) = user {
                entry["user"] = json!(user);
            }
            if let Some(method) = method {
                entry["method"] = json!(method);
            }
            print_value(home.add_lock_history_entry(&id, entry).await?, global)
        }

        HistoryCommand::Sensor { id } => {
            let history = match id {
                Some(ref id) => home.sensor_history(id).await?,
                None => home.all_sensor_history().await?,
            };
            print_value(history, global)
        }

        HistoryCommand::AddSensor { id, payload } => {
            let entry = util::required_payload(&payload)?;
            print_value(home.add_sensor_history_entry(&id, entry).await?, global)
        }

        HistoryCommand::Ack { entry, device, all } => {
            let result = match (entry, device) {
                (Some(entry), _) => home.acknowledge_sensor_entry(&entry).await?,
                (None, Some(device)) => home.acknowledge_device_sensor_history(&device).await?,
                (None, None) if all => home.acknowledge_all_sensor_history().await?,
                (None, None) => {
                    return Err(CliError::Validation {
                        field: "ack".into(),
                        reason: "pass --entry <id>, --device <id> or --all".into(),
                    });
                }
            };
            util::checked(result)?;
            if !global.quiet {
                eprintln!("Sensor history acknowledged");
            }
            Ok(())
        }
    }
}
