//! Profile and account commands.

use super::{confirm, prompt_secret, Context};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use nuvault_api::ProfileUpdate;

/// Show the profile.
pub async fn profile_show(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    let profile = match ctx.client.profile().await {
        Ok(profile) => profile,
        Err(e) => {
            output::print_error(&e.user_message(), format);
            return Ok(());
        }
    };

    match format {
        OutputFormat::Text => {
            let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
            output::print_heading("Profile");
            output::print_row("Username", &or_dash(&profile.username));
            output::print_row("First name", &or_dash(&profile.first_name));
            output::print_row("Last name", &or_dash(&profile.last_name));
            output::print_row("Phone", &or_dash(&profile.user_phone));
            output::print_row("Email", &or_dash(&profile.user_email));
        }
        OutputFormat::Json => output::print_json(&profile)?,
    }

    Ok(())
}

/// Update profile fields.
pub async fn profile_update(
    ctx: &Context,
    update: ProfileUpdate,
    format: &OutputFormat,
) -> Result<()> {
    ctx.require_login()?;

    if update.is_empty() {
        output::print_error("Nothing to update", format);
        return Ok(());
    }

    match ctx.client.update_profile(&update).await {
        Ok(()) => {
            // Username may have changed.
            ctx.cache.clear();
            output::print_success("Profile updated", format);
        }
        Err(e) => output::print_error(&e.user_message(), format),
    }

    Ok(())
}

/// Change the account password.
pub async fn change_password(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    let current = prompt_secret("Current password")?;
    let new = prompt_secret("New password")?;
    let repeat = prompt_secret("Repeat new password")?;

    if current.is_empty() || new.is_empty() {
        output::print_error("Passwords are required", format);
        return Ok(());
    }
    if new != repeat {
        output::print_error("Passwords do not match", format);
        return Ok(());
    }

    match ctx.client.change_password(&current, &new).await {
        Ok(response) => output::print_success(
            response.message.as_deref().unwrap_or("Password changed"),
            format,
        ),
        Err(e) => output::print_error(&e.user_message(), format),
    }

    Ok(())
}

/// Permanently delete the account, then drop the local session and cache.
pub async fn delete_account(ctx: &Context, yes: bool, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    let profile = match ctx.client.profile().await {
        Ok(profile) => profile,
        Err(e) => {
            output::print_error(&e.user_message(), format);
            return Ok(());
        }
    };
    let Some(user_id) = profile.user_id else {
        output::print_error("Could not determine the account id", format);
        return Ok(());
    };

    if !yes && !confirm("Delete your account and every stored password? This cannot be undone") {
        output::print_success("Cancelled", format);
        return Ok(());
    }

    match ctx.client.delete_account(&user_id).await {
        Ok(()) => {
            ctx.client.logout()?;
            ctx.cache.clear();
            output::print_success("Account deleted", format);
        }
        Err(e) => output::print_error(&e.user_message(), format),
    }

    Ok(())
}
