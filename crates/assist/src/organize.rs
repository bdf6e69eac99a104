//! Organization advice over a sample of the catalog.

use crate::client::AssistClient;
use crate::error::Result;

/// At most this many file descriptors go into the prompt.
pub const SAMPLE_LIMIT: usize = 50;

/// Shown when no advice could be generated, matching the product's voice.
pub const FALLBACK_MESSAGE: &str = "Não foi possível gerar sugestões no momento.";

/// Ask for folder-structure and cleanup advice over sampled descriptors.
///
/// Each descriptor is a display line such as `"Fotos/2019/praia.jpg (2.1MB)"`;
/// anything past [`SAMPLE_LIMIT`] is ignored. Fail-closed: every failure is
/// logged at WARN and collapses to [`FALLBACK_MESSAGE`].
pub async fn suggest_organization(client: &AssistClient, sample: &[String]) -> String {
    match suggest_inner(client, sample).await {
        Ok(advice) => advice,
        Err(err) => {
            tracing::warn!(error = ?err, "organization suggestion failed");
            FALLBACK_MESSAGE.to_string()
        },
    }
}

async fn suggest_inner(client: &AssistClient, sample: &[String]) -> Result<String> {
    let listing = sample[..sample.len().min(SAMPLE_LIMIT)].join("\n");
    let prompt = format!(
        "I have a list of files on my hard drive. Analyze them and suggest a \
         folder structure or cleanup strategy in Portuguese.\n\nFiles:\n{listing}"
    );
    client.generate(&prompt, None).await
}
