use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;

/// Minimal management-API client used to fetch deployed proxies as local
/// bundle archives. Downloads complete before the analysis pipeline starts;
/// nothing in the core ever blocks on network IO.
pub struct ManagementClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl ManagementClient {
    pub fn new(token: &str) -> anyhow::Result<Self> {
        Self::with_base_url("https://apigee.googleapis.com/v1", token)
    }

    pub fn with_base_url(base_url: &str, token: &str) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Names of all API proxies in the organization.
    pub fn list_proxies(&self, org: &str) -> anyhow::Result<Vec<String>> {
        let url = format!("{}/organizations/{org}/apis", self.base_url);
        let value: Value = self.get(&url)?.json().context("decode proxy list")?;
        Ok(proxy_names(&value))
    }

    /// Highest revision of one proxy.
    pub fn latest_revision(&self, org: &str, api: &str) -> anyhow::Result<String> {
        let url = format!("{}/organizations/{org}/apis/{api}/revisions", self.base_url);
        let value: Value = self.get(&url)?.json().context("decode revision list")?;
        max_revision(&value).with_context(|| format!("no revisions for proxy {api}"))
    }

    /// Highest revision of one proxy currently deployed to an environment.
    pub fn deployed_revision(&self, org: &str, env: &str, api: &str) -> anyhow::Result<String> {
        let url = format!(
            "{}/organizations/{org}/environments/{env}/apis/{api}/deployments",
            self.base_url
        );
        let value: Value = self.get(&url)?.json().context("decode deployment list")?;
        max_deployed_revision(&value)
            .with_context(|| format!("proxy {api} is not deployed to {env}"))
    }

    /// Download one revision as a bundle archive under `dest_dir`.
    pub fn download_bundle(
        &self,
        org: &str,
        api: &str,
        revision: &str,
        dest_dir: &Utf8Path,
    ) -> anyhow::Result<Utf8PathBuf> {
        let url = format!(
            "{}/organizations/{org}/apis/{api}/revisions/{revision}?format=bundle",
            self.base_url
        );
        tracing::info!(proxy = api, revision, "downloading bundle");
        let bytes = self
            .get(&url)?
            .bytes()
            .with_context(|| format!("download bundle for {api}"))?;

        std::fs::create_dir_all(dest_dir.as_std_path())
            .with_context(|| format!("create directory {dest_dir}"))?;
        let path = dest_dir.join(format!("{api}.zip"));
        std::fs::write(path.as_std_path(), &bytes).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    fn get(&self, url: &str) -> anyhow::Result<reqwest::blocking::Response> {
        self.http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))
    }
}

fn proxy_names(value: &Value) -> Vec<String> {
    value
        .get("proxies")
        .and_then(Value::as_array)
        .map(|proxies| {
            proxies
                .iter()
                .filter_map(|p| p.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Revisions arrive as an array of numeric strings; pick the numeric maximum.
fn max_revision(value: &Value) -> Option<String> {
    value
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|s| s.parse::<u64>().ok().map(|n| (n, s)))
        .max_by_key(|(n, _)| *n)
        .map(|(_, s)| s.to_string())
}

/// Deployments arrive as `{"deployments": [{"revision": "3"}, ...]}`.
fn max_deployed_revision(value: &Value) -> Option<String> {
    value
        .get("deployments")?
        .as_array()?
        .iter()
        .filter_map(|d| d.get("revision").and_then(Value::as_str))
        .filter_map(|s| s.parse::<u64>().ok().map(|n| (n, s)))
        .max_by_key(|(n, _)| *n)
        .map(|(_, s)| s.to_string())
}
