use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canonical bundle-relative path used as the file-tree key and in findings.
///
/// Normalization rules are intentionally simple and deterministic:
/// - always forward slashes (`/`)
/// - no leading `./`
/// - never empty (an empty input becomes `.`)
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct BundlePath(String);

impl BundlePath {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let mut v = s.as_ref().replace('\\', "/");
        while v.starts_with("./") {
            v = v.trim_start_matches("./").to_string();
        }
        if v.is_empty() {
            v = ".".to_string();
        }
        Self(v)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_utf8_pathbuf(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.0.clone())
    }

    pub fn join(&self, segment: &str) -> BundlePath {
        let base = Utf8Path::new(self.as_str());
        BundlePath::new(base.join(segment).as_str())
    }

    /// Final component without its extension (`proxies/default.xml` -> `default`).
    pub fn file_stem(&self) -> &str {
        Utf8Path::new(self.as_str()).file_stem().unwrap_or("")
    }

    pub fn extension(&self) -> Option<&str> {
        Utf8Path::new(self.as_str()).extension()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        Utf8Path::new(self.as_str()).starts_with(prefix)
    }
}

impl std::fmt::Display for BundlePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Utf8Path> for BundlePath {
    fn from(value: &Utf8Path) -> Self {
        BundlePath::new(value.as_str())
    }
}

impl From<Utf8PathBuf> for BundlePath {
    fn from(value: Utf8PathBuf) -> Self {
        BundlePath::new(value.as_str())
    }
}
