//! Password generator and tag lookups.

use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use nuvault_api::GeneratePasswordOptions;

/// Generate a password on the server.
pub async fn generate(
    ctx: &Context,
    options: GeneratePasswordOptions,
    format: &OutputFormat,
) -> Result<()> {
    match ctx.client.generate_password(&options).await {
        Ok(generated) => match format {
            OutputFormat::Text => {
                println!("{}", generated.password);
                if let Some(strength) = &generated.strength {
                    eprintln!("Strength: {}", strength);
                }
            }
            OutputFormat::Json => output::print_json(&serde_json::json!({
                "password": generated.password,
                "strength": generated.strength,
            }))?,
        },
        Err(e) => output::print_error(&e.user_message(), format),
    }

    Ok(())
}

/// List entry categories.
pub async fn categories(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    match ctx.client.categories().await {
        Ok(categories) => match format {
            OutputFormat::Text => {
                output::print_heading("Categories");
                for category in &categories {
                    output::print_row(category.id.as_str(), &category.name);
                }
            }
            OutputFormat::Json => output::print_json(&categories)?,
        },
        Err(e) => output::print_error(&e.read_message(), format),
    }

    Ok(())
}

/// List tag types.
pub async fn tags(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.require_login()?;

    match ctx.client.tag_types().await {
        Ok(tags) => match format {
            OutputFormat::Text => {
                output::print_heading("Tags");
                for tag in &tags {
                    output::print_row(tag.id.as_str(), &tag.name);
                }
            }
            OutputFormat::Json => output::print_json(&tags)?,
        },
        Err(e) => output::print_error(&e.read_message(), format),
    }

    Ok(())
}
