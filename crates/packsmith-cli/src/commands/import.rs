//! Import command implementation.

use crate::cli::ImportArgs;
use crate::commands::config::{apply_provider_args, apply_tuning_args};
use crate::config::{FileConfigStore, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use packsmith_domain::traits::LlmProvider;
use packsmith_domain::CardPackage;
use packsmith_extractor::{Extractor, ExtractorConfig, ImportOutcome};
use packsmith_llm::OpenAiProvider;
use packsmith_validator::{ValidationConfig, Validator};
use std::fmt::Display;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Everything an import needs besides the model provider.
#[derive(Debug)]
pub struct ImportJob {
    /// Text to import
    pub text: String,

    /// Package to extend
    pub context: CardPackage,

    /// Extractor tuning
    pub config: ExtractorConfig,

    /// Where the package is written
    pub output: PathBuf,

    /// Strict validation, failing on errors
    pub strict: bool,
}

/// Execute the import command.
pub async fn execute_import(args: ImportArgs, store: &FileConfigStore, formatter: &Formatter) -> Result<()> {
    let stored = store.load_config()?;

    let provider_config = apply_provider_args(stored.provider, &args.provider)?;
    provider_config.validate()?;

    let mut config = stored.extractor;
    apply_tuning_args(&mut config, &args.tuning);

    let text = fs::read_to_string(&args.file)?;
    let context = match &args.context {
        Some(path) => load_package(path)?,
        None => CardPackage::new(),
    };
    let output = args.output.unwrap_or_else(|| default_output_path(&args.file));

    let provider = OpenAiProvider::new(&provider_config)?;
    info!(
        "Importing {} with {} ({})",
        args.file.display(),
        provider_config.model,
        provider_config.provider.as_str()
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let job = ImportJob {
        text,
        context,
        config,
        output,
        strict: args.strict,
    };

    // A first Ctrl-C finishes the current window; a second drops the in-flight call.
    tokio::select! {
        result = run_import(provider, job, cancel.clone(), formatter) => result.map(|_| ()),
        true = watch_interrupts(cancel, tokio::signal::ctrl_c) => Err(CliError::Interrupted),
    }
}

/// Run the pipeline, write the package and report the outcome.
///
/// # Errors
///
/// Fails on invalid tuning, unwritable output, or, under `strict`, when the
/// package has validation errors. The package is written in every case
/// except invalid tuning.
pub async fn run_import<P>(
    provider: P,
    job: ImportJob,
    cancel: Arc<AtomicBool>,
    formatter: &Formatter,
) -> Result<ImportOutcome>
where
    P: LlmProvider,
    P::Error: Display,
{
    let validator = if job.strict {
        Validator::new(ValidationConfig::strict())
    } else {
        Validator::default_config()
    };

    let extractor = Extractor::new(provider, validator, job.config).with_cancel_flag(cancel);
    let show_progress = formatter.format() != OutputFormat::Quiet;

    let outcome = extractor
        .process(&job.text, job.context, |state| {
            if show_progress {
                eprintln!("{}", formatter.progress(state));
            }
        })
        .await?;

    fs::write(&job.output, serde_json::to_string_pretty(&outcome.data)?)?;

    let report = formatter.format_outcome(&outcome)?;
    if !report.is_empty() {
        println!("{}", report);
    }
    if show_progress {
        println!(
            "{}",
            formatter.info(&format!("Wrote package to {}", job.output.display()))
        );
    }

    if job.strict && outcome.has_errors() {
        return Err(CliError::ValidationFailed(outcome.errors.len()));
    }
    Ok(outcome)
}

/// Read a package JSON file.
pub fn load_package(path: &Path) -> Result<CardPackage> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// `cards.txt` becomes `cards.package.json` next to it.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "import".to_string());
    input.with_file_name(format!("{}.package.json", stem))
}

/// Set `flag` on the first interrupt and return `true` on the second.
///
/// Returns `false` if the interrupt source fails, in which case the caller
/// keeps running.
async fn watch_interrupts<F, Fut>(flag: Arc<AtomicBool>, mut interrupt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if interrupt().await.is_err() {
        return false;
    }
    warn!("Interrupt received, stopping after the current window (press Ctrl-C again to abort)");
    flag.store(true, Ordering::Relaxed);

    if interrupt().await.is_err() {
        return false;
    }
    warn!("Second interrupt received, aborting");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use packsmith_extractor::Termination;
    use packsmith_llm::MockProvider;
    use tempfile::TempDir;

    fn create_test_job(dir: &TempDir, text: &str, strict: bool) -> ImportJob {
        ImportJob {
            text: text.to_string(),
            context: CardPackage::new(),
            config: ExtractorConfig::default(),
            output: dir.path().join("out.package.json"),
            strict,
        }
    }

    fn quiet() -> Formatter {
        Formatter::new(OutputFormat::Quiet, false)
    }

    fn reply(cards: &str, processed_up_to: usize) -> String {
        format!(
            r#"{{"cards": {}, "metadata": {{"processedUpTo": {}}}}}"#,
            cards, processed_up_to
        )
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/cards.txt")),
            PathBuf::from("/tmp/cards.package.json")
        );
        assert_eq!(default_output_path(Path::new("notes")), PathBuf::from("notes.package.json"));
    }

    #[tokio::test]
    async fn test_import_writes_package() {
        let dir = TempDir::new().unwrap();
        let text = "Loreborne: a community of scholars.";
        let provider = MockProvider::new(reply(
            r#"[{"type": "community", "id": "loreborne", "name": "Loreborne"}]"#,
            text.chars().count(),
        ));
        let job = create_test_job(&dir, text, false);
        let output = job.output.clone();

        let outcome = run_import(provider, job, Arc::new(AtomicBool::new(false)), &quiet())
            .await
            .unwrap();
        assert_eq!(outcome.termination, Termination::Completed);

        let written = load_package(&output).unwrap();
        assert_eq!(written.community.len(), 1);
        assert_eq!(written.community[0].name.as_deref(), Some("Loreborne"));
    }

    #[tokio::test]
    async fn test_context_is_extended() {
        let dir = TempDir::new().unwrap();
        let context_path = dir.path().join("context.json");
        fs::write(
            &context_path,
            r#"{"community": [{"id": "wildborne", "name": "Wildborne"}]}"#,
        )
        .unwrap();

        let text = "Loreborne: a community of scholars.";
        let provider = MockProvider::new(reply(
            r#"[{"type": "community", "id": "loreborne", "name": "Loreborne"}]"#,
            text.chars().count(),
        ));
        let mut job = create_test_job(&dir, text, false);
        job.context = load_package(&context_path).unwrap();

        let outcome = run_import(provider, job, Arc::new(AtomicBool::new(false)), &quiet())
            .await
            .unwrap();
        assert_eq!(outcome.data.community.len(), 2);
    }

    #[tokio::test]
    async fn test_strict_fails_on_errors_but_writes() {
        let dir = TempDir::new().unwrap();
        let text = "An unnamed ancestry.";
        let provider = MockProvider::new(reply(
            r#"[{"type": "ancestry", "id": "a1", "category": 1}]"#,
            text.chars().count(),
        ));
        let job = create_test_job(&dir, text, true);
        let output = job.output.clone();

        let result = run_import(provider, job, Arc::new(AtomicBool::new(false)), &quiet()).await;
        assert!(matches!(result, Err(CliError::ValidationFailed(1))));
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_errors_are_reported_without_strict() {
        let dir = TempDir::new().unwrap();
        let text = "An unnamed ancestry.";
        let provider = MockProvider::new(reply(
            r#"[{"type": "ancestry", "id": "a1", "category": 1}]"#,
            text.chars().count(),
        ));

        let outcome = run_import(
            provider,
            create_test_job(&dir, text, false),
            Arc::new(AtomicBool::new(false)),
            &quiet(),
        )
        .await
        .unwrap();
        assert!(outcome.has_errors());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::default();

        let outcome = run_import(
            provider,
            create_test_job(&dir, "some text", false),
            Arc::new(AtomicBool::new(true)),
            &quiet(),
        )
        .await
        .unwrap();
        assert_eq!(outcome.termination, Termination::Cancelled);
        assert_eq!(outcome.iterations, 0);
    }

    #[tokio::test]
    async fn test_invalid_tuning_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut job = create_test_job(&dir, "text", false);
        job.config.window_size = 0;
        let output = job.output.clone();

        let result = run_import(MockProvider::default(), job, Arc::new(AtomicBool::new(false)), &quiet()).await;
        assert!(matches!(result, Err(CliError::Extractor(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_second_interrupt_aborts() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut seen = 0;

        let aborted = watch_interrupts(flag.clone(), || {
            seen += 1;
            async { Ok(()) }
        })
        .await;

        assert!(aborted);
        assert_eq!(seen, 2);
        assert!(flag.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_failed_interrupt_source_keeps_running() {
        let flag = Arc::new(AtomicBool::new(false));
        let aborted = watch_interrupts(flag.clone(), || async {
            Err(std::io::Error::other("no signal handler"))
        })
        .await;

        assert!(!aborted);
        assert!(!flag.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_one_interrupt_only_cancels() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut calls = 0;

        let aborted = watch_interrupts(flag.clone(), || {
            calls += 1;
            let result = if calls == 1 {
                Ok(())
            } else {
                Err(std::io::Error::other("handler gone"))
            };
            async move { result }
        })
        .await;

        assert!(!aborted);
        assert!(flag.load(Ordering::Relaxed));
    }

    #[test]
    fn test_load_package_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_package(&path), Err(CliError::Serialization(_))));
    }
}
