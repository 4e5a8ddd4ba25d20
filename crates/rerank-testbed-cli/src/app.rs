use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rerank_testbed_client::{HttpBackendConfig, SearchOutcome, TestbedSession, build_search_backend};
use rerank_testbed_settings::{
    JsonFileSettingsStore, MemorySettingsStore, SettingsStore, default_settings_path,
    resolve_settings, update_api_base,
};
use serde_json::json;
use tracing::info;

use crate::cli::{Cli, Command, ConfigCommand};
use crate::display;
use crate::items_file::read_items_file;

pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    let store: Box<dyn SettingsStore> = if cli.ephemeral {
        Box::new(MemorySettingsStore::default())
    } else {
        Box::new(JsonFileSettingsStore::new(&settings_path))
    };

    match &cli.command {
        Command::Config(cmd) => run_config(&cli, cmd, store.as_ref(), &settings_path, out),
        Command::Parse { query } => {
            let session = open_session(&cli, store.as_ref())?;
            let outcome = session.parse(query).await?;
            emit(&cli, out, &outcome)
        }
        Command::Rerank { query, items } => {
            let session = open_session(&cli, store.as_ref())?;
            match items {
                Some(path) => {
                    let loaded = read_items_file(path)?;
                    info!(path = %path.display(), items = loaded.len(), "loaded items file");
                    session.load_items(loaded)?;
                }
                None => {
                    session.parse(query).await?;
                }
            }
            let outcome = session.rerank(query).await?;
            emit(&cli, out, &outcome)
        }
        Command::Search { query } => {
            let session = open_session(&cli, store.as_ref())?;
            let outcome = session.search(query).await?;
            emit(&cli, out, &outcome)
        }
    }
}

fn open_session(cli: &Cli, store: &dyn SettingsStore) -> Result<TestbedSession> {
    let settings = resolve_settings(cli.api_base.as_deref(), store)
        .context("failed to resolve api base")?;
    info!(api_base = %settings.api_base, "using search backend");
    let config = HttpBackendConfig::new(settings.api_base)
        .with_timeout(Duration::from_millis(cli.timeout_ms.max(1)));
    let backend = build_search_backend(config)?;
    Ok(TestbedSession::new(backend))
}

fn emit(cli: &Cli, out: &mut dyn Write, outcome: &SearchOutcome) -> Result<()> {
    if cli.json {
        display::write_json(out, outcome)?;
    } else {
        display::write_outcome(out, outcome)?;
    }
    Ok(())
}

fn run_config(
    cli: &Cli,
    cmd: &ConfigCommand,
    store: &dyn SettingsStore,
    settings_path: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    let location = if cli.ephemeral {
        "(ephemeral)".to_string()
    } else {
        settings_path.display().to_string()
    };

    match cmd {
        ConfigCommand::Show => {
            let stored = store.load().context("failed to read settings")?;
            let effective = resolve_settings(cli.api_base.as_deref(), store)?;
            let source = if cli.api_base.is_some() {
                "override"
            } else if stored.is_some() {
                "stored"
            } else {
                "default"
            };
            if cli.json {
                let report = json!({
                    "api_base": effective.api_base,
                    "source": source,
                    "settings_path": location,
                });
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                writeln!(out, "api base: {} ({source})", effective.api_base)?;
                writeln!(out, "settings: {location}")?;
            }
        }
        ConfigCommand::SetApiBase { url } => {
            let changed = update_api_base(store, url).context("failed to save api base")?;
            if changed {
                writeln!(out, "saved api base to {location}")?;
            } else {
                writeln!(out, "api base unchanged")?;
            }
        }
        ConfigCommand::Reset => {
            store.clear().context("failed to clear settings")?;
            writeln!(out, "settings cleared")?;
        }
    }
    Ok(())
}
