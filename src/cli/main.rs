use anyhow::{bail, Context};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;
use xp_management_events::config::{Config, ObservabilityConfig};
use xp_management_events::messagequeue::{
    create_message_queue, init_message_queue_metrics, MessageQueueService, UpdateType,
};
use xp_management_events::models::{CustomSegmenter, Experiment, SegmenterValueType, Settings};
use xp_management_events::proto::pubsub::{self, ProjectSettings};
use xp_management_events::proto::segmenters::SegmenterConfiguration;
use xp_management_events::proto::MessagePublishState;

#[derive(Parser)]
#[command(name = "xp-events-cli")]
#[command(about = "Publish and inspect XP management update messages", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file, replacing config/xp.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Construct the configured message queue and report it
    CheckConfig,

    /// Publish an update through the configured message queue
    Publish(UpdateArgs),

    /// Print the base64 encoded update without publishing it
    Encode(UpdateArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Entity {
    Settings,
    Experiment,
    Segmenter,
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(value_enum)]
    entity: Entity,

    /// create, update or delete
    #[arg(short, long, default_value = "create")]
    update_type: UpdateType,

    /// JSON snapshot of the entity
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Project owning the segmenter
    #[arg(short, long)]
    project_id: Option<i64>,

    /// Segmenter name, for deletions without a snapshot
    #[arg(short, long)]
    name: Option<String>,

    /// Segmenter value types as NAME=TYPE, e.g. days_of_week=INTEGER
    #[arg(short = 't', long = "segmenter-type", value_parser = parse_segmenter_type)]
    segmenter_types: Vec<(String, SegmenterValueType)>,
}

enum Snapshot {
    Settings(ProjectSettings),
    Experiment(pubsub::Experiment),
    Segmenter(SegmenterConfiguration, i64),
}

fn parse_segmenter_type(raw: &str) -> Result<(String, SegmenterValueType), String> {
    let (name, value_type) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=TYPE, got '{}'", raw))?;
    let value_type = value_type
        .to_uppercase()
        .parse::<SegmenterValueType>()
        .map_err(|_| format!("unknown segmenter type '{}'", value_type))?;
    Ok((name.to_string(), value_type))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn require_file(args: &UpdateArgs) -> anyhow::Result<&Path> {
    match &args.file {
        Some(path) => Ok(path),
        None => bail!("--file is required for this update"),
    }
}

fn load_snapshot(args: &UpdateArgs) -> anyhow::Result<Snapshot> {
    let segmenter_types: HashMap<String, SegmenterValueType> =
        args.segmenter_types.iter().cloned().collect();

    match args.entity {
        Entity::Settings => {
            let settings: Settings = read_json(require_file(args)?)?;
            Ok(Snapshot::Settings(settings.to_proto()))
        }
        Entity::Experiment => {
            let experiment: Experiment = read_json(require_file(args)?)?;
            experiment.validate().context("invalid experiment")?;
            Ok(Snapshot::Experiment(experiment.to_proto(&segmenter_types)))
        }
        Entity::Segmenter => match (&args.file, args.update_type) {
            (Some(path), _) => {
                let segmenter: CustomSegmenter = read_json(path)?;
                segmenter.validate().context("invalid segmenter")?;
                let project_id = args.project_id.unwrap_or(segmenter.project_id);
                Ok(Snapshot::Segmenter(segmenter.to_configuration(&segmenter_types)?, project_id))
            }
            (None, UpdateType::Delete) => {
                let (Some(project_id), Some(name)) = (args.project_id, args.name.clone()) else {
                    bail!("deleting a segmenter without --file needs --project-id and --name");
                };
                let segmenter = SegmenterConfiguration {
                    name,
                    ..Default::default()
                };
                Ok(Snapshot::Segmenter(segmenter, project_id))
            }
            (None, _) => bail!("--file is required for segmenter {}", args.update_type),
        },
    }
}

fn envelope(update_type: UpdateType, snapshot: &Snapshot) -> anyhow::Result<MessagePublishState> {
    let envelope = match snapshot {
        Snapshot::Settings(settings) => {
            MessagePublishState::for_project_settings(update_type, settings)?
        }
        Snapshot::Experiment(experiment) => {
            MessagePublishState::for_experiment(update_type, experiment)?
        }
        Snapshot::Segmenter(segmenter, project_id) => {
            MessagePublishState::for_project_segmenter(update_type, segmenter, *project_id)
        }
    };
    Ok(envelope)
}

async fn publish(
    mq: &dyn MessageQueueService,
    update_type: UpdateType,
    snapshot: &Snapshot,
) -> anyhow::Result<()> {
    match snapshot {
        Snapshot::Settings(settings) => {
            mq.publish_project_settings_message(update_type, settings)
                .await?
        }
        Snapshot::Experiment(experiment) => {
            mq.publish_experiment_message(update_type, experiment)
                .await?
        }
        Snapshot::Segmenter(segmenter, project_id) => {
            mq.publish_project_segmenter_message(update_type, segmenter, *project_id)
                .await?
        }
    }
    Ok(())
}

fn init_tracing(observability: &ObservabilityConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("xp_management_events={}", observability.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if observability.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    init_tracing(&config.observability);
    init_message_queue_metrics();

    match cli.command {
        Commands::CheckConfig => {
            let mq = create_message_queue(&config.message_queue).await?;
            println!("message queue: {}", mq.kind().name());
        }

        Commands::Publish(args) => {
            let snapshot = load_snapshot(&args)?;
            let mq = create_message_queue(&config.message_queue).await?;
            publish(mq.as_ref(), args.update_type, &snapshot).await?;
            tracing::info!(
                backend = mq.kind().name(),
                update_type = %args.update_type,
                "Update published"
            );
        }

        Commands::Encode(args) => {
            let snapshot = load_snapshot(&args)?;
            let bytes = envelope(args.update_type, &snapshot)?.to_bytes()?;
            println!("{}", BASE64.encode(bytes));
        }
    }

    Ok(())
}
