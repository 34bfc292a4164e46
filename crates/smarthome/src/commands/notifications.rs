//! Notification command handlers.

use tabled::Tabled;

use smarthome_api::{Notification, NotificationFilter, SmartHome};

use crate::cli::{GlobalOpts, NotificationStatusArg, NotificationsArgs, NotificationsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Read")]
    read: String,
}

impl NotificationRow {
    fn new(n: &Notification, color: bool) -> Self {
        Self {
            id: n.id.clone(),
            time: n.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            kind: n.kind.clone(),
            title: n.title.clone(),
            read: output::flag(!n.is_read, "new", "read", color),
        }
    }
}

pub async fn handle(
    home: &SmartHome,
    args: NotificationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NotificationsCommand::List { status } => {
            let filter = match status {
                NotificationStatusArg::All => NotificationFilter::All,
                NotificationStatusArg::Read => NotificationFilter::Read,
                NotificationStatusArg::Unread => NotificationFilter::Unread,
            };
            let color = output::should_color(&global.color_mode());
            let list = home.notifications(filter).await?;
            let out = output::render_list(
                &global.format(),
                &list,
                |n| NotificationRow::new(n, color),
                |n| n.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NotificationsCommand::Read { id } => {
            let result = home.mark_notification_read(&id).await?;
            if result.is_null() {
                return Err(CliError::NotFound {
                    message: format!("notification '{id}'"),
                });
            }
            let result = util::checked(result)?;
            output::print_output(&output::render_value(&global.format(), &result), global.quiet);
            Ok(())
        }

        NotificationsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete notification {id}?"), global.yes)? {
                return Ok(());
            }
            util::checked(home.delete_notification(&id).await?)?;
            if !global.quiet {
                eprintln!("Notification deleted");
            }
            Ok(())
        }
    }
}
