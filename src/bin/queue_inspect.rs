use anyhow::{Context, Result, bail};
use liftlog_sync::{
    AppConfig, ConnectionPool, EntryId, QueueEntry, QueueStore, SqliteQueueStore, init_logging,
};
use std::env;
use tokio::runtime::Runtime;

const DEFAULT_PURGE_AGE_SECS: i64 = 7 * 24 * 3600;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    List,
    DeadLetters,
    Discard(String),
    Retry(String),
    PurgeCompleted,
}

#[derive(Debug, Clone)]
struct CliOptions {
    command: Command,
    pretty: bool,
    database_url: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct StatusReport {
    database_url: String,
    pending_count: u32,
    dead_letter_count: usize,
}

#[derive(Debug, serde::Serialize)]
struct EntriesReport {
    count: usize,
    entries: Vec<QueueEntry>,
}

fn usage() -> &'static str {
    "Usage: queue-inspect <status|list|dead-letters|discard <id>|retry <id>|purge-completed> [--pretty] [--database-url <url>]"
}

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(args.into_iter())?;
    let database_url = resolve_database_url(&options);

    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run(&options, &database_url))
}

async fn run(options: &CliOptions, database_url: &str) -> Result<()> {
    let pool = ConnectionPool::new(database_url, 1)
        .await
        .with_context(|| format!("Failed to open queue database {database_url}"))?;
    pool.migrate().await.context("Migration failed")?;

    let store = SqliteQueueStore::new(pool.get_pool().clone());

    match &options.command {
        Command::Status => {
            let report = StatusReport {
                database_url: database_url.to_string(),
                pending_count: store.pending_count().await?,
                dead_letter_count: store.dead_letters().await?.len(),
            };
            println!("{}", to_json(&report, options.pretty)?);
        }
        Command::List => {
            let entries = store.pending().await?;
            let report = EntriesReport {
                count: entries.len(),
                entries,
            };
            println!("{}", to_json(&report, options.pretty)?);
        }
        Command::DeadLetters => {
            let entries = store.dead_letters().await?;
            let report = EntriesReport {
                count: entries.len(),
                entries,
            };
            println!("{}", to_json(&report, options.pretty)?);
        }
        Command::Discard(id) => {
            let entry_id = parse_entry_id(id)?;
            if store.discard(&entry_id).await? {
                println!("Discarded {entry_id}");
            } else {
                bail!("No dead-lettered entry with id {entry_id}");
            }
        }
        Command::Retry(id) => {
            let entry_id = parse_entry_id(id)?;
            if store.retry_dead_letter(&entry_id).await? {
                println!("Entry {entry_id} returned to the pending queue");
            } else {
                bail!("No dead-lettered entry with id {entry_id}");
            }
        }
        Command::PurgeCompleted => {
            let purged = store.purge_completed(DEFAULT_PURGE_AGE_SECS).await?;
            println!("Purged {purged} completed entries");
        }
    }

    pool.close().await;
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

fn parse_entry_id(value: &str) -> Result<EntryId> {
    EntryId::parse(value).map_err(|e| anyhow::anyhow!(e))
}

fn parse_args<I>(args: I) -> Result<CliOptions>
where
    I: IntoIterator<Item = String>,
{
    let mut command: Option<Command> = None;
    let mut pretty = false;
    let mut database_url: Option<String> = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "status" => command = Some(Command::Status),
            "list" => command = Some(Command::List),
            "dead-letters" => command = Some(Command::DeadLetters),
            "discard" => {
                let id = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("discard requires an entry id\n{}", usage()))?;
                command = Some(Command::Discard(id));
            }
            "retry" => {
                let id = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("retry requires an entry id\n{}", usage()))?;
                command = Some(Command::Retry(id));
            }
            "purge-completed" => command = Some(Command::PurgeCompleted),
            "--pretty" => pretty = true,
            "--database-url" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow::anyhow!("--database-url requires a value\n{}", usage())
                })?;
                database_url = Some(value);
            }
            "-h" | "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            other => {
                bail!("Unknown argument: {other}\n{}", usage());
            }
        }
    }

    let command = command.ok_or_else(|| anyhow::anyhow!("No command given\n{}", usage()))?;

    Ok(CliOptions {
        command,
        pretty,
        database_url,
    })
}

fn resolve_database_url(options: &CliOptions) -> String {
    if let Some(url) = &options.database_url {
        return url.clone();
    }
    if let Ok(env_url) = env::var("LIFTLOG_DATABASE_URL") {
        if !env_url.trim().is_empty() {
            return env_url;
        }
    }
    AppConfig::from_env().database.url
}
