//! Location and room command handlers.

use serde_json::{Value, json};

use smarthome_api::SmartHome;

use crate::cli::{GlobalOpts, LocationsArgs, LocationsCommand, PayloadArgs, RoomsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

/// Payload from `--data`/`--from-file`, or `{ "name": ... }` built from `--name`.
fn named_payload(name: Option<String>, payload: &PayloadArgs) -> Result<Value, CliError> {
    if let Some(value) = util::payload(payload)? {
        return Ok(value);
    }
    name.map(|name| json!({ "name": name }))
        .ok_or_else(|| CliError::Validation {
            field: "name".into(),
            reason: "pass --name, --data or --from-file".into(),
        })
}

pub async fn handle(
    home: &SmartHome,
    args: LocationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = match args.command {
        LocationsCommand::List => home.locations().await?,
        LocationsCommand::Get { id } => home.location(&id).await?,
        LocationsCommand::Create { name, payload } => {
            home.create_location(named_payload(name, &payload)?).await?
        }
        LocationsCommand::Update { id, payload } => {
            home.update_location(&id, util::required_payload(&payload)?).await?
        }
        LocationsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete location {id}?"), global.yes)? {
                return Ok(());
            }
            home.delete_location(&id).await?
        }
        LocationsCommand::Rooms(rooms) => match rooms.command {
            RoomsCommand::List { location } => home.rooms(&location).await?,
            RoomsCommand::Create {
                location,
                name,
                payload,
            } => {
                home.create_room(&location, named_payload(name, &payload)?)
                    .await?
            }
            RoomsCommand::Update {
                location,
                room,
                payload,
            } => {
                home.update_room(&location, &room, util::required_payload(&payload)?)
                    .await?
            }
            RoomsCommand::Delete { location, room } => {
                if !util::confirm(&format!("Delete room {room}?"), global.yes)? {
                    return Ok(());
                }
                home.delete_room(&location, &room).await?
            }
        },
    };

    let result = util::checked(result)?;
    output::print_output(&output::render_value(&global.format(), &result), global.quiet);
    Ok(())
}
