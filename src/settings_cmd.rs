//! `solace settings` and `solace models`.

use anyhow::{bail, Result};

use solace_core::settings::{API_KEY, KNOWN_KEYS};

use crate::app::AppContext;
use crate::gemini::GeminiGenerator;

/// Show the first four characters of a secret.
fn mask(secret: &str) -> String {
    let head: String = secret.chars().take(4).collect();
    format!("{}****", head)
}

pub fn run_get(ctx: &AppContext, key: Option<&str>) -> Result<()> {
    let keys: Vec<&str> = match key {
        Some(key) => vec![key],
        None => KNOWN_KEYS.to_vec(),
    };
    for key in keys {
        let value = match ctx.settings.get(key)? {
            Some(v) if key == API_KEY => mask(&v),
            Some(v) => v,
            None => "(not set)".to_string(),
        };
        println!("{} = {}", key, value);
    }
    Ok(())
}

pub fn run_set(ctx: &AppContext, key: &str, value: &str) -> Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        bail!(
            "Unknown setting '{}'. Known settings: {}",
            key,
            KNOWN_KEYS.join(", ")
        );
    }
    ctx.settings.set(key, value)?;
    println!("{} updated.", key);
    Ok(())
}

pub fn run_toggle_theme(ctx: &AppContext) -> Result<()> {
    let theme = ctx.settings.toggle_theme()?;
    println!("Theme is now {}.", theme);
    Ok(())
}

pub async fn run_models(ctx: &AppContext) -> Result<()> {
    if !ctx.config.generator.is_enabled() {
        bail!("The generator is disabled in the configuration");
    }
    let gemini = GeminiGenerator::new(&ctx.config.generator, ctx.settings.clone())?;
    let models = gemini.list_models().await?;
    let current = ctx.settings.model()?;
    for model in models {
        let marker = if model.name == current { "*" } else { " " };
        println!("{} {:<32} {}", marker, model.name, model.display_name);
    }
    Ok(())
}
