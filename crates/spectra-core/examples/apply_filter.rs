//! Minimal filter example — from pasted notes to a structured study aid.
//!
//! Builds the default filter registry, applies one filter to a sample of
//! study text, and prints the typed payload as pretty JSON.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run --example apply_filter -- blue
//! ```

use std::sync::Arc;

use spectra_core::filters::FilterSet;
use spectra_core::{FilterKind, GeminiClient, GeminiConfig};

const STUDY_TEXT: &str = "\
The mitochondria is the powerhouse of the cell. It produces ATP through \
cellular respiration, a process that consumes oxygen and glucose. The inner \
membrane folds into cristae, which increase the surface area available for \
ATP synthesis.";

#[tokio::main]
async fn main() -> Result<(), String> {
    // 1. Create the Gemini client from the environment.
    let config = GeminiConfig::from_env()
        .ok_or("Set GEMINI_API_KEY env var to your Google AI Studio key")?;
    let client = Arc::new(GeminiClient::new(Some(config)).map_err(|e| e.to_string())?);

    // 2. Register all six filters against the shared client.
    let filters = FilterSet::with_default_filters(client);

    // 3. Pick a filter by wire tag (defaults to the metacognition filter).
    let tag = std::env::args().nth(1).unwrap_or_else(|| "blue".to_string());
    let kind = FilterKind::from_tag(&tag).ok_or_else(|| format!("unknown filter tag: {tag}"))?;

    // 4. Apply it.
    let output = filters
        .apply(kind, STUDY_TEXT, "normal")
        .await
        .map_err(|e| e.to_string())?;

    // 5. Print the structured payload.
    let pretty = serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?;
    println!("{pretty}");
    Ok(())
}
