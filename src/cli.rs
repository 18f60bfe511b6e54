//! Command line interface

use std::io::{
    self,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use clap::{
    Args,
    Parser,
    Subcommand,
};
use serde_json::{
    Map,
    Value,
};
use thiserror::Error;

use crate::config::{
    ConfigError,
    ConfigManager,
    Settings,
    SettingsOverrides,
};
use crate::source::{
    BatchFileSource,
    ChatCompletionSource,
    ResponseShape,
    SourceError,
    TranslationRequest,
    TranslationSource,
};
use crate::store::{
    LocaleStore,
    to_json_bytes,
};
use crate::tree::{
    LocaleTree,
    TranslationBatch,
};
use crate::updater::{
    FailurePolicy,
    UpdateError,
    UpdateReport,
    sort_locale_files,
    update_locales,
};

#[derive(Debug, Parser)]
#[command(
    name = "locale-translate",
    about = "Translate JSON strings with a chat model and merge them into per-locale JSON files",
    version
)]
pub struct Cli {
    /// Configuration file [default: ./.locale-translate.json when present]
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Translate a JSON document with the configured model and merge the result.
    Translate(TranslateArgs),

    /// Merge a saved model reply without calling the model.
    Apply(ApplyArgs),

    /// Sort keys of the existing locale files at every level.
    Sort(SortArgs),
}

#[derive(Debug, Args)]
pub struct TranslateArgs {
    /// JSON object whose values are translated
    #[arg(long, short, value_name = "FILE")]
    pub input: PathBuf,

    /// Print the translations without writing locale files
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Saved model reply (JSON object or fenced block)
    #[arg(long, short, value_name = "FILE")]
    pub batch: PathBuf,

    /// Print the translations without writing locale files
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Debug, Args)]
pub struct SortArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Options that take precedence over the configuration file.
#[derive(Debug, Clone, Default, Args)]
pub struct OverrideArgs {
    /// Directory holding `<locale>.json` files
    #[arg(long, value_name = "DIR")]
    pub locales_dir: Option<PathBuf>,

    /// Comma separated locale identifiers, source locale included
    #[arg(long, value_delimiter = ',', value_name = "LOCALES")]
    pub locales: Option<Vec<String>>,

    /// Sort keys before writing
    #[arg(long, conflicts_with = "no_sort")]
    pub sort: bool,

    /// Keep key order as merged
    #[arg(long)]
    pub no_sort: bool,

    /// Keep going when a locale file fails, exit with status 2 at the end
    #[arg(long)]
    pub continue_on_error: bool,

    /// Expect `{"original": ..., "translations": {...}}` replies
    #[arg(long)]
    pub wrapped: bool,
}

impl From<OverrideArgs> for SettingsOverrides {
    fn from(args: OverrideArgs) -> Self {
        let auto_sort = if args.sort {
            Some(true)
        } else if args.no_sort {
            Some(false)
        } else {
            None
        };
        Self {
            locales_directory: args.locales_dir,
            locales: args.locales,
            auto_sort,
            on_error: args.continue_on_error.then_some(FailurePolicy::Continue),
            response_shape: args.wrapped.then_some(ResponseShape::Wrapped),
        }
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error("Failed to read input document {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Input document {} is not a JSON object: {source}", path.display())]
    InvalidInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write preview: {0}")]
    Preview(#[source] io::Error),
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Some locales failed under `--continue-on-error`.
    PartialFailure,
}

impl Outcome {
    fn from_report(report: &UpdateReport) -> Self {
        tracing::info!(
            updated = report.updated.len(),
            failed = report.failed.len(),
            "Finished updating locale files"
        );
        if report.is_success() { Self::Success } else { Self::PartialFailure }
    }
}

/// Runs a parsed command line. The translation preview goes to `out`.
///
/// # Errors
/// Configuration, translation source or locale file failures.
pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<Outcome, CliError> {
    let mut config_manager = ConfigManager::new();
    match &cli.config {
        Some(path) => config_manager.load_file(path)?,
        None => config_manager.load_settings(Some(Path::new(".")))?,
    }

    match cli.command {
        Commands::Translate(args) => {
            config_manager.apply_overrides(args.overrides.into())?;
            let settings = config_manager.get_settings();
            let source =
                ChatCompletionSource::from_env(settings.model.clone(), settings.response_shape)?;
            translate(settings, &source, &args.input, args.dry_run, out).await
        }
        Commands::Apply(args) => {
            config_manager.apply_overrides(args.overrides.into())?;
            let settings = config_manager.get_settings();
            let source = BatchFileSource::new(&args.batch, settings.response_shape);
            let request = TranslationRequest {
                locales: settings.locales.clone(),
                source_locale: settings.source_locale.clone(),
                document: Value::Object(Map::new()),
            };
            let batch = source.translate(&request).await?;
            finish(settings, batch, args.dry_run, out)
        }
        Commands::Sort(args) => {
            config_manager.apply_overrides(args.overrides.into())?;
            let settings = config_manager.get_settings();
            let store = LocaleStore::new(&settings.locales_directory);
            let report = sort_locale_files(&store, &settings.locales, settings.on_error)?;
            Ok(Outcome::from_report(&report))
        }
    }
}

/// Translates the document at `input` with `source` and merges the result.
///
/// The source locale's file always receives the input document itself,
/// whatever the model echoed back for it.
///
/// # Errors
/// The input is unreadable or not a JSON object, the source fails, or a
/// locale file cannot be updated.
pub async fn translate<S: TranslationSource>(
    settings: &Settings,
    source: &S,
    input: &Path,
    dry_run: bool,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let text = tokio::fs::read_to_string(input)
        .await
        .map_err(|source| CliError::Input { path: input.to_path_buf(), source })?;
    let document: Value = serde_json::from_str(&text)
        .map_err(|source| CliError::InvalidInput { path: input.to_path_buf(), source })?;
    let source_tree = LocaleTree::from_json(document.clone())
        .map_err(|source| CliError::InvalidInput { path: input.to_path_buf(), source })?;

    let request = TranslationRequest {
        locales: settings.locales.clone(),
        source_locale: settings.source_locale.clone(),
        document,
    };
    tracing::info!(
        strings = source_tree.leaf_count(),
        locales = request.locales.len(),
        "Requesting translations"
    );

    let mut batch = source.translate(&request).await?;
    if !batch.is_empty() {
        batch.insert(settings.source_locale.clone(), source_tree);
    }

    finish(settings, batch, dry_run, out)
}

fn finish(
    settings: &Settings,
    batch: TranslationBatch,
    dry_run: bool,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    if batch.is_empty() {
        tracing::warn!("Translation source returned no usable translations; nothing to update");
        return Ok(Outcome::Success);
    }

    write_preview(out, &batch).map_err(CliError::Preview)?;

    if dry_run {
        tracing::info!("Dry run, locale files left untouched");
        return Ok(Outcome::Success);
    }

    let store = LocaleStore::new(&settings.locales_directory);
    let report = update_locales(&store, batch, settings.merge_configuration())?;
    Ok(Outcome::from_report(&report))
}

fn write_preview(out: &mut dyn Write, batch: &TranslationBatch) -> io::Result<()> {
    let bytes = to_json_bytes(batch).map_err(io::Error::other)?;
    out.write_all(&bytes)?;
    out.write_all(b"\n")?;
    out.flush()
}
