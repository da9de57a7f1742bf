//! CLI command implementations

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Subcommand;
use seedscope_core::config::SeedscopeConfig;
use seedscope_core::{Commands as Core, InfoHash, JsonFileStore, SeedscopeError, Torrent, TrackerStatus};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show the contents of a torrent file
    Inspect {
        /// Path to the .torrent file
        file: PathBuf,
        /// Print the decoded torrent as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check the trackers of a torrent file
    Probe {
        /// Path to the .torrent file
        file: PathBuf,
        /// Per-tracker timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check tracker URLs directly
    Check {
        /// Tracker announce URLs
        #[arg(required = true)]
        trackers: Vec<String>,
        /// Per-tracker timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// Add a torrent file to the library
    Add {
        /// Path to the .torrent file
        file: PathBuf,
    },
    /// List torrents in the library
    List {
        /// Print the library as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a torrent from the library
    Remove {
        /// 40-character hex info hash
        info_hash: String,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands, config: SeedscopeConfig) -> anyhow::Result<()> {
    match command {
        Commands::Inspect { file, json } => inspect(config, &file, json).await,
        Commands::Probe {
            file,
            timeout,
            json,
        } => probe(with_timeout(config, timeout), &file, json).await,
        Commands::Check { trackers, timeout } => check(with_timeout(config, timeout), trackers).await,
        Commands::Add { file } => add(config, &file).await,
        Commands::List { json } => list(config, json).await,
        Commands::Remove { info_hash } => remove(config, &info_hash).await,
    }
}

fn with_timeout(mut config: SeedscopeConfig, timeout: Option<u64>) -> SeedscopeConfig {
    if let Some(seconds) = timeout {
        config.probe.timeout = Duration::from_secs(seconds);
    }
    config
}

async fn read_torrent(core: &Core, file: &Path) -> anyhow::Result<Torrent> {
    let buffer = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    core.decode_metainfo(&buffer)
        .map_err(|e| user_facing(SeedscopeError::from(e)))
        .with_context(|| format!("Failed to decode {}", file.display()))
}

/// Keeps the full cause chain but leads with the display message.
fn user_facing(error: SeedscopeError) -> anyhow::Error {
    let message = error.user_message();
    anyhow::Error::new(error).context(message)
}

/// Show a decoded torrent
///
/// # Errors
/// - File cannot be read or does not decode
pub async fn inspect(config: SeedscopeConfig, file: &Path, json: bool) -> anyhow::Result<()> {
    let core = Core::new(config);
    let torrent = read_torrent(&core, file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&torrent)?);
    } else {
        print!("{}", render_torrent(&torrent));
    }

    Ok(())
}

/// Probe every tracker of a torrent file with its info hash
///
/// # Errors
/// - File cannot be read or does not decode
pub async fn probe(config: SeedscopeConfig, file: &Path, json: bool) -> anyhow::Result<()> {
    let core = Core::new(config);
    let torrent = read_torrent(&core, file).await?;

    if torrent.trackers.is_empty() {
        println!("'{}' lists no trackers.", torrent.info.name);
        return Ok(());
    }

    let statuses = core.probe_torrent(&torrent).await;

    if json {
        let report: Vec<_> = torrent
            .trackers
            .iter()
            .zip(&statuses)
            .map(|(url, status)| serde_json::json!({ "url": url, "status": status }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_statuses(&torrent.trackers, &statuses));
    }

    Ok(())
}

/// Probe tracker URLs given on the command line; Ctrl+C cancels
///
/// # Errors
/// - Probe cancelled by the user
pub async fn check(config: SeedscopeConfig, trackers: Vec<String>) -> anyhow::Result<()> {
    let core = Core::new(config);
    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let statuses = core
        .probe_trackers_until(&trackers, cancel)
        .await
        .map_err(|e| user_facing(e.into()))?;

    print!("{}", render_statuses(&trackers, &statuses));
    Ok(())
}

/// Add a torrent file to the library
///
/// # Errors
/// - File cannot be read, does not decode, or the library cannot be saved
pub async fn add(config: SeedscopeConfig, file: &Path) -> anyhow::Result<()> {
    let store = JsonFileStore::from_config(&config.storage);
    let core = Core::new(config);

    let buffer = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let torrent = core
        .import_torrent(&buffer, &store)
        .await
        .map_err(user_facing)?;

    println!("Added '{}' ({})", torrent.info.name, torrent.info_hash);
    println!("  Library: {}", store.path().display());
    Ok(())
}

/// List torrents in the library
///
/// # Errors
/// - Library cannot be loaded
pub async fn list(config: SeedscopeConfig, json: bool) -> anyhow::Result<()> {
    let store = JsonFileStore::from_config(&config.storage);
    let core = Core::new(config);
    let torrents = core
        .library(&store)
        .await
        .map_err(|e| user_facing(e.into()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&torrents)?);
        return Ok(());
    }

    if torrents.is_empty() {
        println!("No torrents in library.");
        println!("Use 'seedscope add <file>' to add one.");
        return Ok(());
    }

    println!("{:<40}  {:>10}  {:>8}  Name", "Info Hash", "Size", "Trackers");
    println!("{:-<80}", "");
    for torrent in &torrents {
        println!(
            "{}  {:>10}  {:>8}  {}",
            torrent.info_hash,
            format_size(torrent.info.total_length()),
            torrent.trackers.len(),
            torrent.info.name
        );
    }

    Ok(())
}

/// Remove a torrent from the library
///
/// # Errors
/// - Invalid info hash, unknown torrent, or library cannot be saved
pub async fn remove(config: SeedscopeConfig, info_hash: &str) -> anyhow::Result<()> {
    let info_hash: InfoHash = info_hash
        .parse()
        .with_context(|| format!("Invalid info hash '{info_hash}', expected 40 hex characters"))?;

    let store = JsonFileStore::from_config(&config.storage);
    let core = Core::new(config);
    let removed = core
        .remove_torrent(&store, info_hash)
        .await
        .map_err(|e| user_facing(e.into()))?;

    if !removed {
        bail!("No torrent {info_hash} in library");
    }

    println!("Removed {info_hash}");
    Ok(())
}

fn render_torrent(torrent: &Torrent) -> String {
    let info = &torrent.info;
    let mut out = String::new();

    out.push_str(&format!("Name:         {}\n", info.name));
    out.push_str(&format!("Info hash:    {}\n", torrent.info_hash));
    out.push_str(&format!(
        "Size:         {} ({} bytes)\n",
        format_size(info.total_length()),
        info.total_length()
    ));
    out.push_str(&format!(
        "Pieces:       {} x {}\n",
        info.pieces.len(),
        format_size(info.piece_length)
    ));

    match &info.files {
        Some(files) => {
            out.push_str(&format!("Files:        {}\n", files.len()));
            for file in files {
                out.push_str(&format!("  {:>10}  {}\n", format_size(file.length), file.path));
            }
        }
        None => out.push_str("Files:        1 (single file)\n"),
    }

    if torrent.trackers.is_empty() {
        out.push_str("Trackers:     none\n");
    } else {
        out.push_str(&format!("Trackers:     {}\n", torrent.trackers.len()));
        for tracker in &torrent.trackers {
            out.push_str(&format!("  {tracker}\n"));
        }
    }

    out
}

fn render_statuses(trackers: &[String], statuses: &[TrackerStatus]) -> String {
    let mut out = String::new();
    for (tracker, status) in trackers.iter().zip(statuses) {
        out.push_str(&format!("{:<10} {tracker}\n", status.label()));
    }

    let online = statuses.iter().filter(|status| status.is_up()).count();
    out.push_str(&format!("{online}/{} trackers online\n", statuses.len()));
    out
}

/// Formats a byte count with binary units.
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use seedscope_core::decode_metainfo;

    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KiB");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0 GiB");
    }

    #[test]
    fn test_render_torrent() {
        let torrent = decode_metainfo(
            b"d8:announce8:http://a4:infod5:filesld6:lengthi2048e4:pathl1:x5:y.txteee4:name4:demo12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee",
        )
        .unwrap();

        let rendered = render_torrent(&torrent);

        assert!(rendered.contains("Name:         demo\n"));
        assert!(rendered.contains("Size:         2.0 KiB (2048 bytes)\n"));
        assert!(rendered.contains("Pieces:       1 x 16.0 KiB\n"));
        assert!(rendered.contains("     2.0 KiB  x/y.txt\n"));
        assert!(rendered.contains("  http://a\n"));
    }

    #[test]
    fn test_render_statuses() {
        let trackers = vec!["http://a".to_string(), "udp://b:1".to_string()];
        let statuses = vec![TrackerStatus::Online, TrackerStatus::TimedOut];

        let rendered = render_statuses(&trackers, &statuses);

        assert_eq!(
            rendered,
            "online     http://a\ntimed out  udp://b:1\n1/2 trackers online\n"
        );
    }

    #[test]
    fn test_with_timeout_override() {
        let config = with_timeout(SeedscopeConfig::default(), Some(3));
        assert_eq!(config.probe.timeout, Duration::from_secs(3));

        let config = with_timeout(SeedscopeConfig::default(), None);
        assert_eq!(config.probe.timeout, Duration::from_secs(10));
    }
}
