//! Natural-language search translation.
//!
//! Turns "fotos maiores que 2GB" into structured filter parameters. The
//! translation is advisory: on any failure the caller keeps whatever literal
//! filter state it already had, so a flaky network or a bad key never breaks
//! search.

use crate::client::AssistClient;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Deserialize;
use serde_json::json;

const BYTES_PER_MB: f64 = (1024u64 * 1024) as f64;
const BYTES_PER_GB: f64 = (1024u64 * 1024 * 1024) as f64;

/// Structured parameters extracted from a natural-language query.
///
/// Field values come straight from the model and are only as trustworthy as
/// the prompt: the `kind` label still has to survive the caller's taxonomy
/// parse, and sizes go through [`min_size_bytes`](Self::min_size_bytes).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TranslatedQuery {
    /// Keywords to match against file names and paths.
    #[serde(default)]
    pub query: Option<String>,
    /// Taxonomy label (`"imagem"`, `"video"`, ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, rename = "minSizeMB")]
    pub min_size_mb: Option<f64>,
    #[serde(default, rename = "minSizeGB")]
    pub min_size_gb: Option<f64>,
}

impl TranslatedQuery {
    /// Minimum size in bytes, preferring the coarser unit when the model
    /// filled in both.
    pub fn min_size_bytes(&self) -> Option<u64> {
        let bytes = match (self.min_size_gb, self.min_size_mb) {
            (Some(gb), _) => gb * BYTES_PER_GB,
            (None, Some(mb)) => mb * BYTES_PER_MB,
            (None, None) => return None,
        };
        (bytes.is_finite() && bytes >= 0.0).then_some(bytes as u64)
    }
}

/// Translate a natural-language query into structured search parameters.
///
/// Fail-closed: any transport, service, or parse problem is logged at WARN
/// and collapses to `None` — never an error.
pub async fn translate_query(client: &AssistClient, text: &str) -> Option<TranslatedQuery> {
    match translate_inner(client, text).await {
        Ok(translated) => Some(translated),
        Err(err) => {
            tracing::warn!(error = ?err, "query translation failed; keeping literal filters");
            None
        },
    }
}

async fn translate_inner(client: &AssistClient, text: &str) -> Result<TranslatedQuery> {
    let prompt = format!(
        r#"You are a helper for a file system catalog.
The user is searching for files using natural language in Portuguese or English.
Convert the user's query into structured search parameters.

User Query: "{text}"

Available parameters:
- query: keywords to search in filename (string)
- type: one of ['imagem', 'video', 'audio', 'documento', 'arquivo', 'executavel', 'codigo', 'outros'] (string)
- minSizeMB: minimum size in Megabytes (number)
- minSizeGB: minimum size in Gigabytes (number)

Return JSON.
"#
    );
    let schema = json!({
        "type": "OBJECT",
        "properties": {
            "query": { "type": "STRING" },
            "type": { "type": "STRING" },
            "minSizeMB": { "type": "NUMBER" },
            "minSizeGB": { "type": "NUMBER" },
        }
    });
    let body = client.generate(&prompt, Some(schema)).await?;
    serde_json::from_str(&body).or_raise(|| ErrorKind::MalformedResponse)
}
