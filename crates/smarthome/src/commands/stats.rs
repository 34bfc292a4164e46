//! Statistics command handlers.

use smarthome_api::{DashboardStats, SmartHome};

use crate::cli::{GlobalOpts, StatsArgs, StatsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn dashboard_detail(stats: &DashboardStats) -> String {
    let mut lines = vec![
        format!("Devices:  {}", stats.device_count),
        format!("Active:   {}", stats.active_device_count),
        format!("Offline:  {}", stats.offline_device_count),
    ];
    if !stats.recent_events.is_empty() {
        lines.push(String::new());
        lines.push("Recent events:".into());
        for event in &stats.recent_events {
            lines.push(format!(
                "  {}  {:<8} {}",
                event.timestamp.format("%Y-%m-%d %H:%M"),
                event.kind,
                event.message
            ));
        }
    }
    lines.join("\n")
}

pub async fn handle(
    home: &SmartHome,
    args: StatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let format = global.format();

    let result = match args.command {
        StatsCommand::Dashboard => {
            let stats = home.dashboard_stats().await?;
            let out = output::render_single(&format, &stats, dashboard_detail, |s| {
                s.device_count.to_string()
            });
            output::print_output(&out, global.quiet);
            return Ok(());
        }
        StatsCommand::Energy { period } => home.energy_consumption(&period).await?,
        StatsCommand::Consumption { period } => home.consumption_stats(&period).await?,
        StatsCommand::Usage => home.device_usage_stats().await?,
        StatsCommand::Activity { params } => {
            let pairs = util::parse_pairs("param", &params)?;
            let owned: Vec<(String, String)> = pairs
                .into_iter()
                .map(|(k, v)| {
                    let text = v.as_str().map_or_else(|| v.to_string(), str::to_owned);
                    (k, text)
                })
                .collect();
            let borrowed: Vec<(&str, &str)> = owned
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            home.device_activity(&borrowed).await?
        }
    };

    let result = util::checked(result)?;
    output::print_output(&output::render_value(&format, &result), global.quiet);
    Ok(())
}
