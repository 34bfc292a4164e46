//! Scenario command handlers.

use smarthome_api::SmartHome;

use crate::cli::{GlobalOpts, ScenariosArgs, ScenariosCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    home: &SmartHome,
    args: ScenariosArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = match args.command {
        ScenariosCommand::List => home.scenarios().await?,
        ScenariosCommand::Get { id } => home.scenario(&id).await?,
        ScenariosCommand::Create { payload } => {
            home.create_scenario(util::required_payload(&payload)?).await?
        }
        ScenariosCommand::Update { id, payload } => {
            home.update_scenario(&id, util::required_payload(&payload)?).await?
        }
        ScenariosCommand::Delete { id } => {
            if !util::confirm(&format!("Delete scenario {id}?"), global.yes)? {
                return Ok(());
            }
            home.delete_scenario(&id).await?
        }
        ScenariosCommand::Run { id } => home.run_scenario(&id).await?,
    };

    let result = util::checked(result)?;
    output::print_output(&output::render_value(&global.format(), &result), global.quiet);
    Ok(())
}
