mod cli;

use crate::cli::{Command, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use ppa_core::{LinkStore, Repository};
use ppa_generator::DigestGenerator;
use ppa_shortener::{LinkStoreService, StoreSettings};
use ppa_storage::{InMemoryRepository, MySqlRepository, MySqlSettings};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEMO_URL: &str = "https://www.example.com";
const DEMO_NEW_URL: &str = "https://www.example.com/new";
const DEMO_DAYS: u32 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_json);

    info!(
        storage_backend = %config.storage,
        namespace = %config.namespace,
        code_len = config.code_len,
        "starting ppa"
    );

    let generator = DigestGenerator::new(config.namespace.clone(), config.code_len)
        .context("invalid short code generator settings")?;
    let settings = StoreSettings::builder()
        .operation_timeout(Duration::from_millis(config.operation_timeout_ms))
        .build();

    match config.storage {
        StorageBackendArg::InMemory => {
            run(InMemoryRepository::new(), generator, settings, config.command).await
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(&mysql_dsn, &MySqlSettings::default())
                .await
                .context("failed to connect to mysql")?;
            repository
                .migrate()
                .await
                .context("failed to prepare short_links table")?;

            let result = run(repository.clone(), generator, settings, config.command).await;
            repository.close().await;
            result
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run<R: Repository>(
    repository: R,
    generator: DigestGenerator,
    settings: StoreSettings,
    command: Command,
) -> anyhow::Result<()> {
    let store = LinkStoreService::with_settings(repository, generator, settings);

    match command {
        Command::Shorten { url } => {
            let code = store.create(&url).await?;
            println!("{code}");
        }
        Command::Update { code, url } => {
            let updated = store.update_destination(&code, &url).await?;
            if !updated {
                warn!(code = %code, "short code not found or destination unchanged");
            }
            println!("{updated}");
        }
        Command::Resolve { code } => match store.resolve(&code).await? {
            Some(destination) => println!("{destination}"),
            None => anyhow::bail!("short code {code} not found or expired"),
        },
        Command::Extend { code, days } => {
            let extended = store.extend_expiry(&code, days).await?;
            if !extended {
                warn!(code = %code, "short code not found");
            }
            println!("{extended}");
        }
        Command::Inspect { code } => match store.inspect(&code).await? {
            Some(link) => {
                let expires_at = link
                    .expires_at
                    .map_or_else(|| "never".to_string(), |ts| ts.to_string());
                println!("code:        {}", link.code);
                println!("destination: {}", link.destination);
                println!("created_at:  {}", link.created_at);
                println!("expires_at:  {expires_at}");
            }
            None => anyhow::bail!("short code {code} not found"),
        },
        Command::Demo => demo(&store).await?,
    }

    Ok(())
}

async fn demo<S: LinkStore>(store: &S) -> anyhow::Result<()> {
    let code = store.create(DEMO_URL).await?;
    println!("Short URL: {code}");

    let updated = store.update_destination(&code, DEMO_NEW_URL).await?;
    println!("Update Success: {updated}");

    let destination = store.resolve(&code).await?;
    println!(
        "Retrieved Destination URL: {}",
        destination.as_deref().unwrap_or("<none>")
    );

    let extended = store.extend_expiry(&code, DEMO_DAYS).await?;
    println!("Expiry Update Success: {extended}");

    Ok(())
}
