//! Vault entry commands.

use super::{confirm, prompt, prompt_secret, prompt_with_default, Context};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use nuvault_api::{EntryId, EntryInput, FilterKey, GeneratePasswordOptions, VaultEntry};
use nuvault_cache::filter_entries;

/// Fields that may be given on the command line for `add` and `edit`.
#[derive(Debug, Default)]
pub struct EntryFields {
    pub service: Option<String>,
    pub username: Option<String>,
    /// Prompt for a new password (edit) instead of keeping the current one.
    pub new_password: bool,
    /// Ask the server to generate the password.
    pub generate: bool,
    pub favorite: Option<bool>,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

fn entry_json(entry: &VaultEntry, show_secret: bool) -> serde_json::Value {
    let mut value = serde_json::json!({
        "id": entry.id.as_str(),
        "service": entry.service,
        "username": entry.username,
        "is_favorite": entry.is_favorite,
        "category_id": entry.category_id.as_ref().map(|id| id.as_str()),
        "tags": entry.tags.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        "created_at": entry.created_at,
    });
    if show_secret {
        value["password"] = serde_json::Value::String(entry.password.clone());
    }
    value
}

/// Account password check before secrets are revealed.
async fn verify_access(ctx: &Context, format: &OutputFormat) -> Result<bool> {
    let password = prompt_secret("Account password")?;
    match ctx.client.verify_vault_access(&password).await {
        Ok(()) => Ok(true),
        Err(e) => {
            output::print_error(&format!("Access denied: {}", e.user_message()), format);
            Ok(false)
        }
    }
}

/// List entries for a filter, optionally narrowed by a search query.
pub async fn list(
    ctx: &Context,
    filter: FilterKey,
    search: Option<&str>,
    show_secrets: bool,
    format: &OutputFormat,
) -> Result<()> {
    ctx.require_login()?;

    if show_secrets && !verify_access(ctx, format).await? {
        return Ok(());
    }

    let entries = ctx.cache.get_entries(filter).await;
    if let Some(error) = ctx.cache.snapshot().error {
        output::print_error(&error, format);
        return Ok(());
    }

    let matches = filter_entries(&entries, search.unwrap_or_default());

    match format {
        OutputFormat::Text => {
            output::print_heading(&format!("{} ({} of {})", filter, matches.len(), entries.len()));
            if matches.is_empty() {
                println!("  No entries");
            }
            for entry in matches {
                println!("{}", output::entry_line(entry, show_secrets));
            }
        }
        OutputFormat::Json => {
            let items: Vec<_> = matches
                .iter()
                .map(|entry| entry_json(entry, show_secrets))
                .collect();
            output::print_json(&serde_json::json!({
                "filter": filter,
                "total": entries.len(),
                "entries": items,
            }))?;
        }
    }

    Ok(())
}

/// Show one entry.
pub async fn show(ctx: &Context, id: &str, show_secret: bool, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    if show_secret && !verify_access(ctx, format).await? {
        return Ok(());
    }

    let entry = match ctx.client.get_entry(&EntryId::from(id)).await {
        Ok(entry) => entry,
        Err(e) => {
            output::print_error(&e.user_message(), format);
            return Ok(());
        }
    };

    match format {
        OutputFormat::Text => {
            output::print_heading(&entry.service);
            output::print_row("ID", entry.id.as_str());
            output::print_row("Username", &entry.username);
            let secret = if show_secret {
                entry.password.clone()
            } else {
                output::mask(&entry.password)
            };
            output::print_row("Password", &secret);
            output::print_row("Favorite", if entry.is_favorite { "yes" } else { "no" });
            if let Some(category) = &entry.category_id {
                output::print_row("Category", category.as_str());
            }
            if !entry.tags.is_empty() {
                let tags: Vec<_> = entry
                    .tags
                    .iter()
                    .map(|t| t.name.clone().unwrap_or_else(|| t.id.to_string()))
                    .collect();
                output::print_row("Tags", &tags.join(", "));
            }
            if let Some(created_at) = &entry.created_at {
                output::print_row("Created", created_at);
            }
        }
        OutputFormat::Json => output::print_json(&entry_json(&entry, show_secret))?,
    }

    Ok(())
}

async fn read_password(ctx: &Context, generate: bool) -> Result<Option<String>> {
    if generate {
        let generated = ctx
            .client
            .generate_password(&GeneratePasswordOptions::default())
            .await?;
        return Ok(Some(generated.password));
    }

    let password = prompt_secret("Password")?;
    Ok((!password.is_empty()).then_some(password))
}

/// Create an entry.
pub async fn add(ctx: &Context, fields: EntryFields, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    let service = match fields.service {
        Some(service) => service,
        None => prompt("Service")?,
    };
    let username = match fields.username {
        Some(username) => username,
        None => prompt("Username")?,
    };
    if service.is_empty() || username.is_empty() {
        output::print_error("Service and username are required", format);
        return Ok(());
    }

    let Some(password) = read_password(ctx, fields.generate).await? else {
        output::print_error("Password is required", format);
        return Ok(());
    };

    let input = EntryInput {
        service,
        username,
        password,
        category_id: fields.category.map(EntryId::new),
        tag_ids: fields.tags.into_iter().map(EntryId::new).collect(),
        is_favorite: fields.favorite.unwrap_or(false),
    };

    match ctx.cache.add_entry(&input).await {
        Ok(()) => output::print_success(&format!("Saved {}", input.service), format),
        Err(e) => output::print_error(&e.user_message(), format),
    }

    Ok(())
}

/// Edit an entry. Unset fields keep their current value.
pub async fn edit(ctx: &Context, id: &str, fields: EntryFields, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    let id = EntryId::from(id);
    let current = match ctx.client.get_entry(&id).await {
        Ok(entry) => entry,
        Err(e) => {
            output::print_error(&e.user_message(), format);
            return Ok(());
        }
    };

    let service = match fields.service {
        Some(service) => service,
        None => prompt_with_default("Service", &current.service)?,
    };
    let username = match fields.username {
        Some(username) => username,
        None => prompt_with_default("Username", &current.username)?,
    };

    let password = if fields.new_password || fields.generate {
        match read_password(ctx, fields.generate).await? {
            Some(password) => password,
            None => {
                output::print_error("Password is required", format);
                return Ok(());
            }
        }
    } else {
        current.password.clone()
    };

    let tag_ids = if fields.tags.is_empty() {
        current.tags.iter().map(|t| t.id.clone()).collect()
    } else {
        fields.tags.into_iter().map(EntryId::new).collect()
    };

    let input = EntryInput {
        service,
        username,
        password,
        category_id: fields.category.map(EntryId::new).or(current.category_id),
        tag_ids,
        is_favorite: fields.favorite.unwrap_or(current.is_favorite),
    };

    match ctx.cache.update_entry(&id, &input).await {
        Ok(()) => output::print_success(&format!("Updated {}", input.service), format),
        Err(e) => output::print_error(&e.user_message(), format),
    }

    Ok(())
}

/// Delete an entry.
pub async fn delete(ctx: &Context, id: &str, yes: bool, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    if !yes && !confirm(&format!("Delete entry {}?", id)) {
        output::print_success("Cancelled", format);
        return Ok(());
    }

    match ctx.cache.delete_entry(&EntryId::from(id)).await {
        Ok(()) => output::print_success("Entry deleted", format),
        Err(e) => output::print_error(&e.user_message(), format),
    }

    Ok(())
}

/// Toggle an entry's favorite flag.
pub async fn favorite(ctx: &Context, id: &str, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    match ctx.cache.toggle_favorite(&EntryId::from(id)).await {
        Ok(true) => output::print_success("Added to favorites", format),
        Ok(false) => output::print_success("Removed from favorites", format),
        Err(e) => output::print_error(&e.user_message(), format),
    }

    Ok(())
}

/// Show the vault health score.
pub async fn health(ctx: &Context, refresh: bool, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    let score = ctx.cache.get_health_score(refresh).await;

    match format {
        OutputFormat::Text => println!("Health Score: {}%", score),
        OutputFormat::Json => output::print_json(&serde_json::json!({ "health_score": score }))?,
    }

    Ok(())
}
