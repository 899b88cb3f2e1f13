use crate::cli::{Cli, ConfigAction};
use crate::commands::{CommandError, Context, Result};
use crate::output::{emit, OutputData};
use exabrowse_core::config::{config_dir, AppConfig};
use exabrowse_core::credentials::{env_var_for, KNOWN_PROVIDERS};
use exabrowse_core::{CredentialStore, FileCredentialStore};
use owo_colors::OwoColorize;
use serde_json::{json, Value};
use std::io::{self, Write};

pub async fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Set { provider, value } => set_config(&provider, value.as_deref()),
        ConfigAction::Remove { provider } => remove_config(&provider),
        ConfigAction::Path => {
            println!("{}", config_dir().display());
            Ok(())
        }
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let ctx = Context::load()?;
    emit(cli, &OutputData::ConfigInfo(config_json(&ctx.store, &ctx.config)))
}

/// Provider status with masked keys, plus the effective LLM settings.
fn config_json(store: &dyn CredentialStore, config: &AppConfig) -> Value {
    let mut providers = json!({});
    for (provider, var) in KNOWN_PROVIDERS {
        let stored = store
            .load(provider)
            .and_then(|c| c.get("api_key").cloned())
            .filter(|k| !k.trim().is_empty());
        let (source, key) = match stored {
            Some(key) => ("store".to_string(), Some(key)),
            None => match std::env::var(var).ok().filter(|k| !k.trim().is_empty()) {
                Some(key) => (format!("env {}", var), Some(key)),
                None => ("missing".to_string(), None),
            },
        };
        providers[*provider] = json!({
            "source": source,
            "key": key.as_deref().map(mask).unwrap_or_default(),
        });
    }

    json!({
        "config_dir": config_dir().display().to_string(),
        "providers": providers,
        "llm": {
            "provider": config.llm.provider.display_name(),
            "base_url": config.llm.base_url(),
            "summary_model": config.llm.summary_model(),
            "chat_model": config.llm.chat_model(),
        },
    })
}

fn set_config(provider: &str, value: Option<&str>) -> Result<()> {
    ensure_known(provider)?;

    let key = match value {
        Some(v) => v.trim().to_string(),
        None => {
            print!("{} API key: ", provider.cyan());
            io::stdout().flush()?;
            read_secret()?
        }
    };
    if key.is_empty() {
        return Err(CommandError::InvalidInput("API key cannot be empty".to_string()));
    }

    let store = FileCredentialStore::new_default();
    let mut credentials = store.load(provider).unwrap_or_default();
    credentials.insert("api_key".to_string(), key);
    store.save(provider, &credentials)?;

    println!(
        "{} API key saved for {}",
        "Success!".green().bold(),
        provider.cyan()
    );
    Ok(())
}

fn remove_config(provider: &str) -> Result<()> {
    ensure_known(provider)?;
    let store = FileCredentialStore::new_default();
    if store.remove(provider)? {
        println!("{} Removed {}", "Success!".green().bold(), provider.cyan());
    } else {
        println!("{} has no stored key", provider.yellow());
    }
    Ok(())
}

fn ensure_known(provider: &str) -> Result<()> {
    if env_var_for(provider).is_some() {
        return Ok(());
    }
    let known: Vec<&str> = KNOWN_PROVIDERS.iter().map(|(name, _)| *name).collect();
    Err(CommandError::InvalidConfig(format!(
        "Unknown provider '{}'. Use one of: {}",
        provider,
        known.join(", ")
    )))
}

/// Show the first and last four characters only.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

fn read_secret() -> Result<String> {
    match rpassword::read_password() {
        Ok(password) => Ok(password.trim().to_string()),
        Err(_) => {
            // Non-TTY stdin
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            Ok(input.trim().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exabrowse_core::MemoryCredentialStore;

    #[test]
    fn test_mask() {
        assert_eq!(mask("short"), "****");
        assert_eq!(mask("exa-1234567890abcd"), "exa-…abcd");
    }

    #[test]
    fn test_config_json_reports_store_keys() {
        let store = MemoryCredentialStore::with_api_key("exa", "exa-secret-key-123");
        let value = config_json(&store, &AppConfig::default());
        assert_eq!(value["providers"]["exa"]["source"], "store");
        assert_eq!(value["providers"]["exa"]["key"], "exa-…-123");
        assert!(value["llm"]["summary_model"].is_string());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(matches!(
            ensure_known("openai"),
            Err(CommandError::InvalidConfig(_))
        ));
        assert!(ensure_known("stripe").is_ok());
    }
}
