//! Roster bundle exchange: a zip archive carrying the roster document, a
//! manifest with a format tag and checksum, and workspace metadata. Import
//! refuses anything whose checksum or format tag does not line up.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::store;

const MANIFEST_ENTRY: &str = "manifest.json";
const ROSTER_ENTRY: &str = "data/roster.json";
const META_WORKSPACE_ENTRY: &str = "meta/workspace.json";
pub const BUNDLE_FORMAT_V1: &str = "rosterd-bundle-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
    pub roster_sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub roster_sha256: String,
}

pub fn export_roster_bundle(workspace_path: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    let roster_path = store::roster_path(workspace_path);
    if !roster_path.is_file() {
        return Err(anyhow!(
            "workspace roster not found: {}",
            roster_path.to_string_lossy()
        ));
    }
    let roster_bytes = std::fs::read(&roster_path)
        .with_context(|| format!("failed to read roster {}", roster_path.to_string_lossy()))?;
    let roster_sha256 = hex_sha256(&roster_bytes);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "rosterSha256": roster_sha256,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(ROSTER_ENTRY, opts)
        .context("failed to start roster entry")?;
    zip.write_all(&roster_bytes)
        .context("failed to write roster entry")?;

    let workspace_meta = json!({
        "sourceWorkspace": workspace_path.to_string_lossy(),
    });
    zip.start_file(META_WORKSPACE_ENTRY, opts)
        .context("failed to start workspace metadata entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&workspace_meta)
            .context("failed to serialize workspace metadata")?
            .as_bytes(),
    )
    .context("failed to write workspace metadata entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: 3,
        roster_sha256,
    })
}

pub fn import_roster_bundle(in_path: &Path, workspace_path: &Path) -> anyhow::Result<ImportSummary> {
    std::fs::create_dir_all(workspace_path).with_context(|| {
        format!(
            "failed to create workspace {}",
            workspace_path.to_string_lossy()
        )
    })?;

    if !is_zip_file(in_path)? {
        bail!(
            "not a roster bundle (zip signature missing): {}",
            in_path.to_string_lossy()
        );
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }
    let expected_sha256 = manifest
        .get("rosterSha256")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("manifest missing rosterSha256"))?
        .to_string();

    let mut roster_bytes = Vec::new();
    archive
        .by_name(ROSTER_ENTRY)
        .context("bundle missing data/roster.json")?
        .read_to_end(&mut roster_bytes)
        .context("failed to read roster entry")?;
    let actual_sha256 = hex_sha256(&roster_bytes);
    if actual_sha256 != expected_sha256 {
        bail!(
            "roster checksum mismatch: manifest says {expected_sha256}, payload is {actual_sha256}"
        );
    }

    let dst = store::roster_path(workspace_path);
    let tmp_dst = workspace_path.join(format!("{}.importing", store::ROSTER_FILE));
    if tmp_dst.exists() {
        let _ = std::fs::remove_file(&tmp_dst);
    }
    let mut roster_out = File::create(&tmp_dst).with_context(|| {
        format!("failed to create temp roster {}", tmp_dst.to_string_lossy())
    })?;
    roster_out
        .write_all(&roster_bytes)
        .context("failed to extract roster entry")?;
    roster_out
        .flush()
        .context("failed to flush extracted roster")?;
    drop(roster_out);

    std::fs::rename(&tmp_dst, &dst).with_context(|| {
        format!(
            "failed to move extracted roster to {}",
            dst.to_string_lossy()
        )
    })?;

    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
        roster_sha256: actual_sha256,
    })
}

fn hex_sha256(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
