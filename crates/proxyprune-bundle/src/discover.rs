use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use globset::GlobSet;
use std::collections::BTreeMap;

/// One input archive selected for processing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredBundle {
    pub name: String,
    pub archive: Utf8PathBuf,
    pub archive_bytes: u64,
}

/// Find `*.zip` bundle archives in `source_dir`, keyed by proxy name.
///
/// Export suffixes (`orders_rev3_2024_01_31.zip`) are stripped to the proxy
/// name; an optional glob filter selects by that name. Output is sorted by
/// name. Two archives collapsing to the same name keep the first and warn.
pub fn discover_local_bundles(
    source_dir: &Utf8Path,
    filter: Option<&GlobSet>,
) -> anyhow::Result<Vec<DiscoveredBundle>> {
    let mut paths: Vec<Utf8PathBuf> = Vec::new();
    let entries =
        std::fs::read_dir(source_dir.as_std_path()).with_context(|| format!("read {source_dir}"))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read {source_dir}"))?;
        let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) else {
            continue;
        };
        if path.extension() == Some("zip") && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut bundles: BTreeMap<String, DiscoveredBundle> = BTreeMap::new();
    for path in paths {
        let stem = path.file_stem().unwrap_or_default();
        let name = strip_revision_suffix(stem).to_string();
        if let Some(filter) = filter {
            if !filter.is_match(&name) {
                continue;
            }
        }
        if bundles.contains_key(&name) {
            tracing::warn!(bundle = %name, archive = %path, "duplicate bundle name, keeping first");
            continue;
        }
        let archive_bytes = std::fs::metadata(path.as_std_path())
            .with_context(|| format!("stat {path}"))?
            .len();
        bundles.insert(
            name.clone(),
            DiscoveredBundle {
                name,
                archive: path,
                archive_bytes,
            },
        );
    }

    Ok(bundles.into_values().collect())
}

/// Strip the `_rev<NN>_<yyyy>_<mm>_<dd>` export suffix from an archive stem.
pub fn strip_revision_suffix(stem: &str) -> &str {
    if let Some(idx) = stem.rfind("_rev") {
        if is_revision_tail(&stem[idx + 4..]) {
            return &stem[..idx];
        }
    }
    stem
}

fn is_revision_tail(tail: &str) -> bool {
    let parts: Vec<&str> = tail.split('_').collect();
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    parts.len() == 4
        && all_digits(parts[0])
        && parts[1].len() == 4
        && all_digits(parts[1])
        && parts[2].len() == 2
        && all_digits(parts[2])
        && parts[3].len() == 2
        && all_digits(parts[3])
}
