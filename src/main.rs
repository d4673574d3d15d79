//! Textreuse batch runner entrypoint.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mimalloc::MiMalloc;

use textreuse::annotation::{Annotator, Language, LexiconAnnotator};
use textreuse::classifier::LinearClassifier;
use textreuse::config::Config;
use textreuse::pipeline::{PairScoringPipeline, PipelineError, RunSummary};
use textreuse::storage::{InputStore, ResultStore};
use textreuse::synonyms::{SynonymResolver, ThesaurusResolver};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[command(name = "textreuse")]
#[command(about = "Scores and labels text reuse between source and candidate texts", long_about = None)]
#[command(version)]
struct Cli {
    /// Input SQLite database with `sources` and candidate tables
    #[arg(short, long)]
    input: PathBuf,

    /// Output SQLite database [env: TEXTREUSE_OUTPUT_PATH, default: predictions.db]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Linear classifier JSON artifact
    #[arg(short, long)]
    model: PathBuf,

    /// Worker threads [default: available cores]
    #[arg(short = 't', long)]
    workers: Option<usize>,

    /// First row to process (inclusive)
    #[arg(short, long)]
    start: Option<u64>,

    /// Row to stop before (exclusive)
    #[arg(short, long)]
    end: Option<u64>,

    /// Also compute modified (synonym / skip-gram) n-gram scores
    #[arg(long = "mngs", alias = "modified")]
    modified: bool,

    /// Text language: de or en [env: TEXTREUSE_LANGUAGE, default: de]
    #[arg(long)]
    language: Option<String>,

    /// Tab-separated `form, lemma, POS` lexicon for annotation
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Tab-separated `lemma, category, synonyms` thesaurus (required with --mngs)
    #[arg(long)]
    thesaurus: Option<PathBuf>,

    /// Candidate table in the input database
    #[arg(long, default_value = textreuse::constants::DEFAULT_CANDIDATE_TABLE)]
    candidate_table: String,
}

impl Cli {
    /// Applies command-line values on top of `config`.
    fn apply(self, mut config: Config) -> Result<Config, PipelineError> {
        config.input_path = Some(self.input);
        config.model_path = Some(self.model);
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(language) = self.language {
            config.language =
                language
                    .parse::<Language>()
                    .map_err(|e| PipelineError::Configuration {
                        reason: e.to_string(),
                    })?;
        }
        config.start = self.start;
        config.end = self.end;
        config.use_modified = self.modified;
        config.lexicon_path = self.lexicon.or(config.lexicon_path);
        config.thesaurus_path = self.thesaurus.or(config.thesaurus_path);
        config.candidate_table = self.candidate_table;
        Ok(config)
    }
}

fn configuration<E: std::fmt::Display>(e: E) -> PipelineError {
    PipelineError::Configuration {
        reason: e.to_string(),
    }
}

fn resource<E: std::fmt::Display>(e: E) -> PipelineError {
    PipelineError::Resource {
        reason: e.to_string(),
    }
}

async fn run(cli: Cli) -> Result<RunSummary, PipelineError> {
    let config = cli.apply(Config::from_env().map_err(configuration)?)?;
    config.validate().map_err(configuration)?;

    tracing::info!(
        input = ?config.input_path,
        output = %config.output_path.display(),
        language = %config.language,
        workers = config.workers,
        modified = config.use_modified,
        "Textreuse starting"
    );

    // validate() guarantees both paths are present
    let input_path = config.input_path.clone().unwrap_or_default();
    let model_path = config.model_path.clone().unwrap_or_default();

    let classifier = LinearClassifier::load(&model_path).map_err(configuration)?;

    let annotator: Arc<dyn Annotator> = match &config.lexicon_path {
        Some(path) => Arc::new(LexiconAnnotator::load(path, config.language).map_err(resource)?),
        None => Arc::new(LexiconAnnotator::new(config.language)),
    };

    let synonyms: Option<Arc<dyn SynonymResolver>> = match &config.thesaurus_path {
        Some(path) if config.use_modified => Some(Arc::new(
            ThesaurusResolver::load(path, config.language).map_err(resource)?,
        )),
        _ => None,
    };

    let pipeline = PairScoringPipeline::new(
        config.pipeline_settings(),
        annotator,
        synonyms,
        Arc::new(classifier),
    )?;

    let input = InputStore::open(&input_path, &config.candidate_table)
        .map_err(|source| PipelineError::Open { source })?;
    let mut output = ResultStore::open(&config.output_path)
        .map_err(|source| PipelineError::Open { source })?;

    let range = PairScoringPipeline::resolve_range(&input, config.start, config.end)?;
    pipeline.run(&input, &mut output, range).await
}

/// Context attached to a failed run: the stage and the last rows attempted.
fn failure_context(e: &PipelineError) -> String {
    let range = e
        .row_range()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "none".to_string());
    format!("{} stage failed, last attempted rows: {}", e.stage(), range)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(summary) => {
            tracing::info!(
                pairs = summary.pairs_scored,
                skipped = summary.rows_skipped,
                inserted = summary.inserted,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                "Completed"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                stage = %e.stage(),
                rows = ?e.row_range(),
                error = %e,
                "Run failed"
            );
            let context = failure_context(&e);
            Err(anyhow::Error::new(e).context(context))
        }
    }
}
