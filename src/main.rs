mod cli;

use vidforge::config::{self, Config};
use vidforge::video::{self, ImageInput, PollState, Submission, VideoConfig, VideoProvider};
use vidforge_common::{AspectRatio, TaskId};
use vidforge_db::columns;
use vidforge_db::models::NewVideo;
use vidforge_db::pool::{self, get_conn, init_pool};
use vidforge_db::queries::videos;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidforge=trace,vidforge_db=debug,reqwest=debug".to_string()
        } else {
            "vidforge=info,vidforge_db=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::FixDb { db, table, column } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            fix_db(db.as_deref(), &config, &table, &column)
        }
        Commands::Generate {
            prompt,
            image,
            duration,
            aspect_ratio,
            model,
            no_wait,
            db,
            json,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let request = GenerateRequest {
                prompt,
                image,
                duration,
                aspect_ratio,
                model: model.unwrap_or_else(|| config.provider.model.clone()),
                no_wait,
                db: db.or_else(|| config.database.path.clone()),
                json,
            };
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(generate(&config, request))
        }
        Commands::Status { task_id, json } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(status(&config, TaskId::from(task_id), json))
        }
        Commands::Models => list_models(),
        Commands::Validate { file } => {
            let path = file.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("vidforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {:?}", path))
}

fn fix_db(db: Option<&Path>, config: &Config, table: &str, column: &str) -> Result<()> {
    let path = db
        .or(config.database.path.as_deref())
        .context("No database given; pass --db or set database.path in the config")?;

    tracing::info!("Checking {}.{} in {:?}", table, column, path);
    let conn = pool::open_existing(path_str(path)?)?;

    match columns::ensure_integer_column(&conn, table, column)? {
        columns::ColumnOutcome::Added => println!("Column '{}' added to table {}", column, table),
        columns::ColumnOutcome::AlreadyPresent => {
            println!("Table {} already has column '{}'", table, column)
        }
    }

    Ok(())
}

struct GenerateRequest {
    prompt: String,
    image: Option<PathBuf>,
    duration: u32,
    aspect_ratio: AspectRatio,
    model: String,
    no_wait: bool,
    db: Option<PathBuf>,
    json: bool,
}

async fn generate(config: &Config, request: GenerateRequest) -> Result<()> {
    let mut input = VideoConfig::new(request.prompt, request.model)
        .with_duration(request.duration)
        .with_aspect_ratio(request.aspect_ratio);

    if let Some(ref image_path) = request.image {
        let bytes = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("Failed to read image: {:?}", image_path))?;
        input = input.with_image(ImageInput::Bytes(bytes));
    }

    let provider = video::create_provider(config);

    // Optional local bookkeeping
    let record = match request.db {
        Some(ref path) => {
            let db_pool = init_pool(path_str(path)?)?;
            let conn = get_conn(&db_pool)?;
            let id = videos::insert_video(
                &conn,
                &NewVideo {
                    prompt: input.prompt.clone(),
                    model: input.model.clone(),
                    duration: i64::from(input.duration),
                    aspect_ratio: input.aspect_ratio.to_string(),
                },
            )?;
            tracing::debug!(video_id = id, "Recorded video submission");
            Some((db_pool, id))
        }
        None => None,
    };

    let started = std::time::Instant::now();
    let outcome = run_generation(
        provider.as_ref(),
        &input,
        &record,
        request.no_wait,
        request.json,
    )
    .await;

    if let Some((ref db_pool, id)) = record {
        if let Err(e) = record_outcome(db_pool, id, &outcome, started.elapsed()) {
            tracing::warn!(video_id = id, "Failed to record generation outcome: {}", e);
        }
    }

    match outcome? {
        Some(result) if request.json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Some(result) => {
            if let Some(ref task_id) = result.task_id {
                println!("Task: {}", task_id);
            }
            println!("Video URL: {}", result.video_url);
            println!("Elapsed: {}s", result.elapsed.as_secs());
        }
        None => {}
    }

    Ok(())
}

/// Store the final state of a recorded job.
fn record_outcome(
    db_pool: &pool::DbPool,
    id: i64,
    outcome: &video::Result<Option<video::GenerationResult>>,
    elapsed: std::time::Duration,
) -> vidforge_common::Result<()> {
    let conn = get_conn(db_pool)?;
    match outcome {
        Ok(Some(result)) => {
            let secs = i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX);
            videos::mark_completed(&conn, id, &result.video_url, secs)
        }
        Ok(None) => Ok(()),
        Err(e) => videos::mark_failed(&conn, id, &e.to_string()),
    }
}

/// Submit, record the task id, and wait unless `no_wait` is set.
///
/// Returns `Ok(None)` when the job was submitted without waiting.
async fn run_generation(
    provider: &dyn VideoProvider,
    input: &VideoConfig,
    record: &Option<(pool::DbPool, i64)>,
    no_wait: bool,
    json: bool,
) -> video::Result<Option<video::GenerationResult>> {
    let started = std::time::Instant::now();

    let task_id = match provider.submit(input).await? {
        Submission::Completed { task_id, video_url } => {
            return Ok(Some(video::GenerationResult {
                task_id,
                video_url,
                elapsed: started.elapsed(),
            }));
        }
        Submission::Pending { task_id } => task_id,
    };

    if let Some((ref db_pool, id)) = *record {
        // Bookkeeping failures shouldn't abandon a job the provider already accepted.
        let stored = get_conn(db_pool).and_then(|conn| videos::set_task_id(&conn, id, &task_id));
        if let Err(e) = stored {
            tracing::warn!("Failed to record task id {}: {}", task_id, e);
        }
    }

    if no_wait {
        if json {
            println!("{}", serde_json::json!({ "task_id": task_id }));
        } else {
            println!("Task: {}", task_id);
        }
        return Ok(None);
    }

    let video_url = provider.wait_for_completion(&task_id).await?;
    Ok(Some(video::GenerationResult {
        task_id: Some(task_id),
        video_url,
        elapsed: started.elapsed(),
    }))
}

async fn status(config: &Config, task_id: TaskId, json: bool) -> Result<()> {
    let provider = video::create_provider(config);
    let state = provider
        .query(&task_id)
        .await
        .with_context(|| format!("Failed to query task {}", task_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    println!("Task: {}", task_id);
    match state {
        PollState::Completed { video_url } => {
            println!("State: completed");
            println!("Video URL: {}", video_url);
        }
        PollState::Pending => println!("State: pending"),
        PollState::Failed { message } => {
            println!("State: failed");
            println!("Reason: {}", message);
        }
    }

    Ok(())
}

fn list_models() -> Result<()> {
    for model in video::MODELS {
        let mut modes = Vec::new();
        if model.text_to_video {
            modes.push("text");
        }
        if model.image_to_video {
            modes.push("image");
        }
        let ratios: Vec<String> = model.aspect_ratios.iter().map(|r| r.to_string()).collect();
        println!(
            "{}  durations: {:?}  ratios: {}  modes: {}",
            model.name,
            model.durations,
            ratios.join(", "),
            modes.join("+")
        );
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Provider: {}", config.provider.base_url);
            println!("  Model: {}", config.provider.model);
            println!(
                "  API key: {}",
                if config.provider.api_key.is_some() {
                    "set"
                } else {
                    "missing"
                }
            );
            println!(
                "  Polling: every {}s, up to {} checks",
                config.polling.interval_secs, config.polling.max_attempts
            );
            println!("  Upload limit: {} bytes", config.upload.max_bytes);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!("  Provider: {}", config.provider.base_url);
            println!("  Model: {}", config.provider.model);
        }
    }

    Ok(())
}
