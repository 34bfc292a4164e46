//! Login, logout, account and connection command handlers.

use serde::Serialize;
use serde_json::Value;

use smarthome_api::{ConnectionStatus, Credentials, SessionState, SmartHome, User};

use crate::cli::{GlobalOpts, LoginArgs, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn user_detail(u: &User) -> String {
    let mut lines = vec![
        format!("ID:     {}", u.id),
        format!("Name:   {}", u.name.as_deref().unwrap_or("-")),
        format!("Email:  {}", u.email.as_deref().unwrap_or("-")),
        format!("Role:   {}", u.role.as_deref().unwrap_or("-")),
    ];
    if let Some(ts) = u.last_login {
        lines.push(format!("Login:  {}", ts.format("%Y-%m-%d %H:%M:%S")));
    }
    lines.join("\n")
}

// ── Login / logout ──────────────────────────────────────────────────

pub async fn login(
    home: &SmartHome,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let password = match args.password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ").map_err(prompt_err)?,
    };
    if args.email.trim().is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "email and password cannot be empty".into(),
        });
    }

    let response = util::checked(home.login(&Credentials::new(args.email, password)).await?)?;

    if response.get("token").and_then(Value::as_str).is_none() {
        return Err(CliError::Rejected {
            message: "the server did not return a session token".into(),
        });
    }
    if !global.quiet {
        let who = response
            .pointer("/user/email")
            .or_else(|| response.pointer("/user/name"))
            .and_then(Value::as_str)
            .unwrap_or("user");
        eprintln!("Logged in as {who}");
    }
    Ok(())
}

pub fn logout(home: &SmartHome, global: &GlobalOpts) -> Result<(), CliError> {
    home.logout()?;
    if !global.quiet {
        eprintln!("Session cleared");
    }
    Ok(())
}

pub async fn whoami(home: &SmartHome, global: &GlobalOpts) -> Result<(), CliError> {
    let user = home.current_user().await?;
    let out = output::render_single(&global.format(), &user, user_detail, |u| u.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn users(
    home: &SmartHome,
    args: UsersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = match args.command {
        UsersCommand::Me => return whoami(home, global).await,
        UsersCommand::Update { payload } => {
            home.update_user(util::required_payload(&payload)?).await?
        }
        UsersCommand::Register { payload } => {
            home.register(util::required_payload(&payload)?).await?
        }
    };
    let result = util::checked(result)?;
    output::print_output(&output::render_value(&global.format(), &result), global.quiet);
    Ok(())
}

// ── Connection status ───────────────────────────────────────────────

#[derive(Serialize)]
struct StatusReport {
    mode: &'static str,
    server_url: String,
    session: &'static str,
    #[serde(flatten)]
    connection: ConnectionStatus,
}

fn status_detail(r: &StatusReport) -> String {
    let mut lines = vec![
        format!("Mode:       {}", r.mode),
        format!("Server:     {}", r.server_url),
        format!("Session:    {}", r.session),
        format!(
            "Connected:  {}",
            if r.connection.connected { "yes" } else { "no" }
        ),
    ];
    if let Some(ref e) = r.connection.error {
        lines.push(format!("Error:      {e}"));
    }
    lines.join("\n")
}

pub async fn status(home: &SmartHome, global: &GlobalOpts) -> Result<(), CliError> {
    let dispatcher = home.dispatcher();
    let connection = dispatcher.test_connection().await;
    let report = StatusReport {
        mode: if dispatcher.settings().demo_mode() {
            "demo"
        } else {
            "live"
        },
        server_url: dispatcher.server_url(),
        session: match dispatcher.session_state() {
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticated => "authenticated",
            SessionState::LoginRequired => "login required",
        },
        connection,
    };

    let out = output::render_single(&global.format(), &report, status_detail, |r| {
        r.connection.connected.to_string()
    });
    output::print_output(&out, global.quiet);

    match report.connection.error {
        Some(reason) if !report.connection.connected => Err(CliError::ConnectionFailed {
            url: report.server_url,
            source: reason.into(),
        }),
        _ => Ok(()),
    }
}
