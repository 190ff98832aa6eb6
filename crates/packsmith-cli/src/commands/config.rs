//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs, ProviderArgs, TuningArgs};
use crate::config::FileConfigStore;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use packsmith_extractor::ExtractorConfig;
use packsmith_llm::{ProviderConfig, ProviderKind};

/// Execute the config command.
pub async fn execute_config(args: ConfigArgs, store: &FileConfigStore, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let config = store.load_config()?;
            println!("{}", formatter.format_config(&config)?);
        }
        ConfigAction::Set { provider, tuning } => {
            let mut config = store.load_config()?;
            config.provider = Some(apply_provider_args(config.provider.take(), &provider)?);
            apply_tuning_args(&mut config.extractor, &tuning);
            config.extractor.validate()?;
            store.save_config(&config)?;
            println!(
                "{}",
                formatter.success(&format!("Saved configuration to {}", store.path().display()))
            );
        }
        ConfigAction::Path => println!("{}", store.path().display()),
    }
    Ok(())
}

/// Overlay command-line provider settings on a stored provider config.
///
/// Switching the provider kind keeps the stored key but resets the model and
/// base URL to the new provider's defaults.
pub(crate) fn apply_provider_args(stored: Option<ProviderConfig>, args: &ProviderArgs) -> Result<ProviderConfig> {
    let kind = match args.provider.as_deref() {
        Some(name) => Some(
            ProviderKind::parse(name)
                .ok_or_else(|| CliError::InvalidInput(format!("unknown provider '{}'", name)))?,
        ),
        None => None,
    };

    let mut config = match (stored, kind) {
        (Some(stored), Some(kind)) if stored.provider != kind => {
            ProviderConfig {
                timeout_secs: stored.timeout_secs,
                ..ProviderConfig::new(kind, stored.api_key)
            }
        }
        (Some(stored), _) => stored,
        (None, kind) => ProviderConfig::new(kind.unwrap_or_default(), ""),
    };

    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = Some(base_url.clone());
    }
    if let Some(api_key) = &args.api_key {
        config.api_key = api_key.clone();
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    Ok(config)
}

/// Overlay command-line tuning on an extractor config.
pub(crate) fn apply_tuning_args(config: &mut ExtractorConfig, args: &TuningArgs) {
    if let Some(window_size) = args.window_size {
        config.window_size = window_size;
    }
    if let Some(overlap) = args.overlap {
        config.overlap = overlap;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
}
