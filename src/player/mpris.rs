//! MPRIS queries over `busctl --user` subprocesses.
//!
//! No D-Bus library: the two properties we need (Metadata, Position) are
//! read by shelling out to busctl and parsing its text output. The parsing
//! lives in free functions so it can be tested against captured output.

use anyhow::{bail, Context, Result};
use tokio::process::Command;

const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";
const PLAYER_OBJECT: &str = "/org/mpris/MediaPlayer2";
const PLAYER_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

#[derive(Debug, Clone, Default)]
pub struct MprisPlayer;

impl MprisPlayer {
    pub fn new() -> Self {
        Self
    }

    /// Artist and title of whatever the first MPRIS player is playing.
    /// Errors when no player is on the bus or the metadata is incomplete.
    pub async fn current_song(&self) -> Result<(String, String)> {
        let bus = self.first_player_bus().await?;
        let metadata = self.get_property(&bus, "Metadata").await?;
        let artist = extract_metadata_array_first(&metadata, "xesam:artist");
        let title = extract_metadata_string(&metadata, "xesam:title");
        match (artist, title) {
            (Some(artist), Some(title)) if !artist.is_empty() && !title.is_empty() => {
                Ok((artist, title))
            }
            _ => bail!("player metadata has no artist/title"),
        }
    }

    /// Playback position and track duration in seconds. Either value falls
    /// back to zero when the player does not report it.
    pub async fn position(&self) -> Result<(f64, f64)> {
        let bus = self.first_player_bus().await?;
        let position_out = self.get_property(&bus, "Position").await?;
        let position_us = parse_numeric_property(&position_out).unwrap_or(0.0);
        let metadata = self.get_property(&bus, "Metadata").await?;
        let duration_us = extract_metadata_number(&metadata, "mpris:length").unwrap_or(0.0);
        Ok((position_us / 1_000_000.0, duration_us / 1_000_000.0))
    }

    async fn first_player_bus(&self) -> Result<String> {
        let output = Command::new("busctl")
            .args(["--user", "list", "--no-legend"])
            .output()
            .await
            .context("failed to run busctl list")?;
        if !output.status.success() {
            bail!("busctl list exited with {}", output.status);
        }
        let text = String::from_utf8_lossy(&output.stdout);
        first_mpris_name(&text).context("no MPRIS player on the session bus")
    }

    async fn get_property(&self, bus: &str, property: &str) -> Result<String> {
        let output = Command::new("busctl")
            .args([
                "--user",
                "get-property",
                bus,
                PLAYER_OBJECT,
                PLAYER_INTERFACE,
                property,
            ])
            .output()
            .await
            .with_context(|| format!("failed to run busctl get-property {property}"))?;
        if !output.status.success() {
            bail!("busctl get-property {property} exited with {}", output.status);
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn first_mpris_name(busctl_list: &str) -> Option<String> {
    busctl_list
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .find(|name| name.starts_with(MPRIS_PREFIX))
        .map(str::to_string)
}

/// Slice just past a `"key"` entry in a busctl a{sv} dump, with an
/// explicit `v` variant marker skipped when present.
fn value_after_key<'a>(metadata: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("\"{key}\"");
    let start = metadata.find(&needle)? + needle.len();
    let mut rest = metadata[start..].trim_start();
    if let Some(stripped) = rest.strip_prefix("v ") {
        rest = stripped;
    }
    Some(rest)
}

/// Value of a `"key" s "value"` entry.
fn extract_metadata_string(metadata: &str, key: &str) -> Option<String> {
    let rest = value_after_key(metadata, key)?;
    let rest = rest.strip_prefix("s ")?.trim_start();
    read_quoted(rest.strip_prefix('"')?)
}

/// First element of a `"key" as N "first" ...` entry.
fn extract_metadata_array_first(metadata: &str, key: &str) -> Option<String> {
    let rest = value_after_key(metadata, key)?;
    let rest = rest.strip_prefix("as ")?;
    let quote = rest.find('"')?;
    read_quoted(&rest[quote + 1..])
}

/// Value of a numeric `"key" x 219000000` entry, any integer type code.
fn extract_metadata_number(metadata: &str, key: &str) -> Option<f64> {
    let rest = value_after_key(metadata, key)?;
    let mut fields = rest.split_whitespace();
    let _type_code = fields.next()?;
    fields.next()?.parse().ok()
}

/// A scalar property dump is `<type code> <value>`.
fn parse_numeric_property(output: &str) -> Option<f64> {
    output.split_whitespace().nth(1)?.parse().ok()
}

/// Read up to the next unescaped double quote.
fn read_quoted(s: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '"' => return Some(out),
            _ => out.push(c),
        }
    }
    None
}
