mod export;
mod generate;
mod screen;
mod summary;
mod watch;

use std::time::Instant;

use ferroscreen_core::{
    load_batch, load_batch_cached, BatchCache, FallbackGenerator, JsonFileSource, LoadedBatch,
    NasdaqScreenerSource, PipelineConfig, RecordSource, SourceId, SyntheticSource,
};
use serde_json::Value;

use crate::cli::{Cli, Command, SourceSelector};
use crate::envelope::{Envelope, EnvelopeError, EnvelopeMeta};
use crate::error::CliError;

/// Warning attached when the filters leave nothing to report.
pub const NO_MATCHES_WARNING: &str = "no results match your filters";

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub cache_hit: bool,
    pub source_chain: Vec<SourceId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<SourceId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            cache_hit: false,
            source_chain,
        }
    }

    /// Result carrying the provenance of a loaded batch.
    pub fn from_batch(data: Value, batch: &LoadedBatch) -> Self {
        Self {
            data,
            warnings: batch.warnings.clone(),
            errors: batch
                .source_error
                .iter()
                .map(EnvelopeError::from)
                .collect(),
            cache_hit: batch.cache_hit,
            source_chain: batch.source_chain.clone(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Everything a command needs to load batches.
pub struct Context {
    pub config: PipelineConfig,
    pub source: Box<dyn RecordSource>,
    pub generator: FallbackGenerator,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut config = PipelineConfig::from_env();
        if let Some(min_records) = cli.min_records {
            config.min_records = min_records;
        }
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }

        let generator = config.generator()?;
        let source = build_source(cli)?;

        Ok(Self {
            config,
            source,
            generator,
        })
    }

    pub async fn load(&mut self) -> LoadedBatch {
        load_batch(self.source.as_ref(), &mut self.generator, &self.config).await
    }

    pub async fn load_cached(&mut self, cache: &BatchCache) -> LoadedBatch {
        load_batch_cached(cache, self.source.as_ref(), &mut self.generator, &self.config).await
    }
}

fn build_source(cli: &Cli) -> Result<Box<dyn RecordSource>, CliError> {
    match cli.source {
        SourceSelector::Nasdaq => Ok(Box::new(
            NasdaqScreenerSource::live().with_timeout_ms(cli.timeout_ms),
        )),
        SourceSelector::File => {
            let path = cli.input.as_ref().ok_or_else(|| {
                CliError::Command(String::from("--input is required with --source file"))
            })?;
            Ok(Box::new(JsonFileSource::new(path)))
        }
        SourceSelector::Synthetic => Ok(Box::new(SyntheticSource)),
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();
    let mut context = Context::from_cli(cli)?;

    let command_result = match &cli.command {
        Command::Screen(args) => screen::run(args, &mut context).await?,
        Command::Summary(args) => summary::run(args, &mut context).await?,
        Command::Export(args) => export::run(args, &mut context).await?,
        Command::Generate(args) => generate::run(args, &mut context)?,
        Command::Watch(args) => watch::run(args, &mut context).await?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        cache_hit,
        source_chain,
    } = command_result;

    let latency_ms = started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64;
    let mut meta = EnvelopeMeta::new(source_chain, latency_ms, cache_hit);
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(Envelope::new(meta, data, errors))
}
