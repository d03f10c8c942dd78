//! Authentication commands.

use super::{prompt, prompt_secret, Context};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use nuvault_api::{ErrorKind, Registration};

/// Login with email and password.
pub async fn login(ctx: &Context, format: &OutputFormat) -> Result<()> {
    if ctx.session.is_authenticated()? {
        output::print_success("Already logged in. Run 'nuvault logout' to switch accounts", format);
        return Ok(());
    }

    let email = prompt("Email")?;
    if email.is_empty() {
        output::print_error("Email is required", format);
        return Ok(());
    }

    let password = prompt_secret("Password")?;
    if password.is_empty() {
        output::print_error("Password is required", format);
        return Ok(());
    }

    println!("Logging in...");

    match ctx.client.login(&email, &password).await {
        Ok(()) => {
            ctx.cache.clear();
            output::print_success(&format!("Logged in as {}", email), format);
        }
        Err(e) if e.kind() == ErrorKind::Authentication || e.kind() == ErrorKind::NotFound => {
            output::print_error("Login failed: invalid email or password", format);
        }
        Err(e) => {
            output::print_error(&format!("Login failed: {}", e.user_message()), format);
        }
    }

    Ok(())
}

/// Create an account. A verification code is mailed before the account is created.
pub async fn register(ctx: &Context, format: &OutputFormat) -> Result<()> {
    let email = prompt("Email")?;
    if email.is_empty() {
        output::print_error("Email is required", format);
        return Ok(());
    }

    if let Err(e) = ctx.client.register_start(&email).await {
        output::print_error(&format!("Registration failed: {}", e.user_message()), format);
        return Ok(());
    }
    println!("A verification code was sent to {}", email);

    let code = prompt("Verification code")?;
    let username = prompt("Username")?;
    let first_name = prompt("First name")?;
    let last_name = prompt("Last name")?;
    let password = prompt_secret("Password")?;
    let repeat = prompt_secret("Repeat password")?;

    if code.is_empty() || username.is_empty() || password.is_empty() {
        output::print_error("Code, username and password are required", format);
        return Ok(());
    }
    if password != repeat {
        output::print_error("Passwords do not match", format);
        return Ok(());
    }

    let registration = Registration {
        username,
        first_name,
        last_name,
        user_email: email,
        user_password: password,
        code,
    };

    match ctx.client.register_confirm(&registration).await {
        Ok(()) => output::print_success(
            "Account created. Run 'nuvault login' to sign in",
            format,
        ),
        Err(e) => {
            output::print_error(&format!("Registration failed: {}", e.user_message()), format)
        }
    }

    Ok(())
}

/// Logout and clear session.
pub async fn logout(ctx: &Context, format: &OutputFormat) -> Result<()> {
    let had_token = ctx.client.logout()?;
    ctx.cache.clear();

    if had_token {
        output::print_success("Logged out successfully", format);
    } else {
        output::print_success("Not logged in", format);
    }

    Ok(())
}

/// Check authentication status against the server.
pub async fn status(ctx: &Context, format: &OutputFormat) -> Result<()> {
    let has_token = ctx.session.is_authenticated()?;

    let (logged_in, detail) = if !has_token {
        (false, None)
    } else {
        match ctx.client.validate_token().await {
            Ok(()) => (true, None),
            Err(e) if e.kind() == ErrorKind::Authentication => {
                ctx.client.logout()?;
                ctx.cache.clear();
                (false, Some("session expired".to_string()))
            }
            Err(e) => (true, Some(format!("could not verify: {}", e.user_message()))),
        }
    };

    match format {
        OutputFormat::Text => {
            if logged_in {
                println!("Auth:     logged in");
            } else {
                println!("Auth:     not logged in");
            }
            if let Some(detail) = &detail {
                println!("Detail:   {}", detail);
            }
        }
        OutputFormat::Json => {
            output::print_json(&serde_json::json!({
                "logged_in": logged_in,
                "detail": detail,
            }))?;
        }
    }

    Ok(())
}

/// Show the logged-in user's name.
pub async fn whoami(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    match ctx.cache.get_username().await {
        Some(username) => match format {
            OutputFormat::Text => println!("{}", username),
            OutputFormat::Json => output::print_json(&serde_json::json!({ "username": username }))?,
        },
        None if !ctx.session.is_authenticated()? => {
            output::print_error("Session expired. Run 'nuvault login' again", format);
        }
        None => {
            let message = ctx
                .cache
                .snapshot()
                .error
                .unwrap_or_else(|| "Username unavailable".to_string());
            output::print_error(&message, format);
        }
    }

    Ok(())
}
