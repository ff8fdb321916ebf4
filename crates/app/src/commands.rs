//! Command execution.

use std::error::Error;
use std::io::Write;

use scm_application::{CallbackOutcome, ProfileApi, ProfileUpdate, RestoreOutcome};
use scm_domain::{AuthState, GuardDecision, SessionUser};
use tracing::debug;

use crate::cli::{Command, ProfileChanges, ProfileCommand};
use crate::context::AppContext;

type CommandResult = Result<(), Box<dyn Error>>;

/// Restores the persisted session, then runs `command`.
pub async fn run(ctx: &mut AppContext, command: Command, out: &mut impl Write) -> CommandResult {
    let outcome = ctx.manager.restore_session().await;
    debug!(?outcome, "Session restoration settled");
    if let RestoreOutcome::Degraded { error } = &outcome {
        writeln!(out, "Offline: using cached session ({})", error.user_message())?;
    }

    match command {
        Command::Login { email, password } => login(ctx, &email, &password, out).await,
        Command::Logout => logout(ctx, out).await,
        Command::Status => status(&ctx.manager.state(), out),
        Command::OauthCallback { url } => oauth_callback(ctx, &url, out).await,
        Command::Open { path } => open(ctx, &path, out).await,
        Command::Profile(ProfileCommand::Show) => profile_show(ctx, out).await,
        Command::Profile(ProfileCommand::Update(changes)) => {
            profile_update(ctx, changes, out).await
        }
    }
}

async fn login(
    ctx: &AppContext,
    email: &str,
    password: &str,
    out: &mut impl Write,
) -> CommandResult {
    let response = ctx
        .manager
        .login(email, password)
        .await
        .map_err(|e| e.user_message())?;

    let state = ctx.manager.state();
    let signed_in = state.user().map_or(email, |user| user.email.as_str());
    writeln!(out, "Signed in as {signed_in}")?;
    if let Some(message) = response.message.as_deref() {
        writeln!(out, "{message}")?;
    }
    ctx.router.navigate(&ctx.settings.routes.landing)?;
    Ok(())
}

async fn logout(ctx: &AppContext, out: &mut impl Write) -> CommandResult {
    ctx.manager.logout().await;
    if let Some(flash) = ctx.navigator.take_flash() {
        writeln!(out, "{}", flash.content)?;
    }
    Ok(())
}

fn status(state: &AuthState, out: &mut impl Write) -> CommandResult {
    let Some(user) = state.user() else {
        writeln!(out, "Not signed in")?;
        return Ok(());
    };

    match user.name.as_deref() {
        Some(name) => writeln!(out, "Signed in as {} ({name})", user.email)?,
        None => writeln!(out, "Signed in as {}", user.email)?,
    }
    if !user.role_list.is_empty() {
        writeln!(out, "Roles: {}", user.role_list.join(", "))?;
    }
    Ok(())
}

async fn oauth_callback(ctx: &mut AppContext, url: &str, out: &mut impl Write) -> CommandResult {
    match ctx.oauth.process(url).await.map_err(|e| e.user_message())? {
        CallbackOutcome::SignedIn { email } => writeln!(out, "Signed in as {email}")?,
        CallbackOutcome::Rejected => {
            return Err("the callback did not carry a token and email".into());
        }
        CallbackOutcome::AlreadyProcessed => writeln!(out, "Callback already processed")?,
    }
    Ok(())
}

async fn open(ctx: &AppContext, path: &str, out: &mut impl Write) -> CommandResult {
    match ctx.router.navigate_when_settled(path).await? {
        GuardDecision::Allow => writeln!(out, "Opened {path}")?,
        GuardDecision::Redirect { to } => writeln!(out, "Redirected to {to}")?,
        GuardDecision::Wait => writeln!(out, "Waiting for the session to load")?,
    }
    Ok(())
}

async fn profile_show(ctx: &AppContext, out: &mut impl Write) -> CommandResult {
    require_signed_in(ctx)?;
    let profile = ctx.api.fetch_profile().await?;
    print_profile(&profile, out)
}

async fn profile_update(
    ctx: &AppContext,
    changes: ProfileChanges,
    out: &mut impl Write,
) -> CommandResult {
    let current = require_signed_in(ctx)?;
    if changes.is_empty() {
        return Err("nothing to update; pass --name, --about, --phone or --profile-pic".into());
    }

    let profile = ctx.api.fetch_profile().await?;
    let mut update = ProfileUpdate::from_user(&profile);
    update.name = changes.name.or(update.name);
    update.about = changes.about.or(update.about);
    update.phone_number = changes.phone_number.or(update.phone_number);
    update.profile_pic = changes.profile_pic.or(update.profile_pic);

    let mut updated = ctx.api.update_profile(&update).await?;
    if updated.role_list.is_empty() {
        updated.role_list = current.role_list;
    }
    ctx.manager
        .update_user(updated.clone())
        .await
        .map_err(|e| e.user_message())?;

    writeln!(out, "Profile updated")?;
    print_profile(&updated, out)
}

fn require_signed_in(ctx: &AppContext) -> Result<SessionUser, Box<dyn Error>> {
    ctx.manager
        .state()
        .user()
        .cloned()
        .ok_or_else(|| "not signed in; run `scm login` first".into())
}

fn print_profile(user: &SessionUser, out: &mut impl Write) -> CommandResult {
    writeln!(out, "Email:   {}", user.email)?;
    let fields = [
        ("Name", user.name.as_deref()),
        ("About", user.about.as_deref()),
        ("Phone", user.phone_number.as_deref()),
        ("Picture", user.profile_pic.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            writeln!(out, "{:<8} {value}", format!("{label}:"))?;
        }
    }
    if let Some(provider) = &user.provider {
        writeln!(out, "Signed up via {provider}")?;
    }
    Ok(())
}
