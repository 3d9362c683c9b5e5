//! Auth command - login session management.

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;
use libris_client::{AuthFlow, UserProfile};
use serde_json::json;

use super::Context;
use crate::ui::{self, PromptCodeProvider};

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Exchange a platform login code for a session
    Login {
        /// Login code (prompted for when omitted)
        #[arg(long)]
        code: Option<String>,
    },

    /// Show who is logged in
    Status,

    /// Forget the stored session
    Logout,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login { code } => cmd_login(code, ctx).await,
        AuthCommand::Status => cmd_status(ctx),
        AuthCommand::Logout => cmd_logout(ctx),
    }
}

fn flow(ctx: &Context, code: Option<String>) -> Result<AuthFlow> {
    let client = ctx.client()?;
    Ok(AuthFlow::new(client, Arc::new(PromptCodeProvider::new(code))))
}

fn describe(user: &UserProfile) -> String {
    let name = user
        .nickname()
        .map(str::to_string)
        .unwrap_or_else(|| format!("user {}", user.id));
    if user.is_admin {
        format!("{} (admin)", name)
    } else {
        name
    }
}

async fn cmd_login(code: Option<String>, ctx: &Context) -> Result<()> {
    let auth = flow(ctx, code)?;

    if let Some(user) = auth.get_user()
        && auth.check_login()
    {
        println!("Already logged in as {}", describe(&user));
        println!("Run 'libris auth logout' first to switch accounts.");
        return Ok(());
    }

    let response = auth.login().await?;

    if ctx.json_output {
        ctx.print_json(&response.user)?;
    } else {
        ui::success(format!("Logged in as {}", describe(&response.user)));
    }
    Ok(())
}

fn cmd_status(ctx: &Context) -> Result<()> {
    let env = ctx.environment()?;
    let auth = flow(ctx, None)?;
    let user = auth.get_user().filter(|_| auth.check_login());

    if ctx.json_output {
        return ctx.print_json(&json!({
            "environment": env.environment().as_str(),
            "base_url": env.base_url(),
            "logged_in": user.is_some(),
            "user": user,
        }));
    }

    let dim = Style::new().dim();
    ui::heading("Session");
    println!("{:<12} {}", "Environment", env.environment());
    println!("{:<12} {}", "Server", dim.apply_to(env.base_url()));
    match user {
        Some(user) => println!("{:<12} {}", "User", describe(&user)),
        None => println!("{:<12} {}", "User", dim.apply_to("not logged in")),
    }
    if ctx.verbose {
        println!("{:<12} {}ms", "Timeout", env.timeout().as_millis());
        if let Some(dir) = libris_config::session_dir() {
            println!("{:<12} {}", "Session dir", dim.apply_to(dir.display()));
        }
        println!(
            "{:<12} {}",
            "Log dir",
            dim.apply_to(libris_config::log_dir().display())
        );
    }
    Ok(())
}

fn cmd_logout(ctx: &Context) -> Result<()> {
    let auth = flow(ctx, None)?;
    let was_logged_in = auth.check_login();
    auth.logout();

    if ctx.json_output {
        ctx.print_json(&json!({ "logged_out": was_logged_in }))?;
    } else if was_logged_in {
        ui::success("Logged out");
    } else {
        ui::empty("Not logged in");
    }
    Ok(())
}
