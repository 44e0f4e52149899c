//! Chamber Assistant ("Windy"): Data Assembly and Orchestration
//!
//! ## Overview
//!
//! Every chat question triggers a *fresh* pull of chamber data: the
//! assistant deliberately bypasses the view-model's live cache so its answer
//! reflects the stores at the moment of asking, not the dashboard's last
//! render. The pulled data is serialized into labeled plain-text sections,
//! combined with a fixed instruction preamble, the recent conversation, and
//! the new question, and sent to a text-generation endpoint behind the
//! [`TextGenerator`] seam.
//!
//! ## Failure posture
//!
//! Nothing here returns an error to the chat layer:
//! - an individual fetch failure renders as an explicit "No data available"
//!   line, so the model downstream can tell absence-of-data from
//!   absence-of-mention;
//! - a failed or unusable generation call becomes a fixed apology string in
//!   the transcript.
//!
//! The serialized context has no size cap. If the receiving endpoint ever
//! enforces an input limit, truncation behavior is undefined here; the
//! section order (instructions and data first) is chosen so tail truncation
//! hurts least.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, warn};
use serde_json::Value;

use crate::errors::AiError;
use crate::paths;
use crate::records::ChatTurn;
use crate::store::{DocumentStore, KeyedStore};

/// Shown in the transcript when the generation call fails outright.
pub const APOLOGY: &str = "Sorry, I encountered an error while analyzing the data. \
Please try again. If the problem persists, check your connection and API configuration.";

/// Instruction preamble sent with every request.
const SYSTEM_PROMPT: &str = "\
You are Windy, an AI assistant specialized in monitoring and analyzing a smart \
growth chamber for optimal plant health.

**Your Mission:**
Help users understand their sensor data, identify issues, and provide practical \
recommendations for plant growth, with special focus on airflow, light, humidity, \
soil moisture, and water usage.

**Critical Rules:**
1. ALWAYS reference the actual chamber data provided in the context below when answering
2. If data is missing or empty, state that explicitly - never guess values
3. For vague questions, briefly list the data sources you have (group12, group3, \
group30, group6&35, plus telemetry history) and analyze the current readings
4. Prefer practical, specific recommendations over generic advice
5. Reference specific sensor values and timestamps when making observations
6. Proactively mention unusual patterns or concerning trends

**Response Style:**
Clear and concise, data-driven, with practical action steps when relevant. \
Friendly but professional.

Now analyze the chamber data provided below and answer the user's question.";

/// Generation parameters forwarded verbatim to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,
    /// Top-k sampling cutoff
    pub top_k: u32,
    /// Nucleus sampling cutoff
    pub top_p: f32,
    /// Hard cap on generated tokens
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// Seam to the text-generation endpoint. The HTTP client lives in the
/// connectors crate; tests substitute a canned generator.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for `prompt`. Implementations return the extracted
    /// reply text, or [`AiError`] for transport-level failures.
    async fn generate(&self, prompt: &str, config: &GenerationConfig)
        -> Result<String, AiError>;
}

/// One status group's worth of context.
struct GroupSection {
    label: &'static str,
    short_label: &'static str,
    data: Option<Value>,
}

/// One telemetry collection's worth of context, oldest-first.
struct HistorySection {
    label: &'static str,
    documents: Vec<Value>,
}

/// Everything fetched for one question.
pub struct ContextBundle {
    fetched_at: String,
    groups: Vec<GroupSection>,
    histories: Vec<HistorySection>,
}

/// Status group prompt labels (full and short), in serialization order.
const GROUP_SECTIONS: [(&str, &str); 4] = [
    ("Group 12 - Environmental Sensors", "Group 12"),
    ("Group 3 - Light Control", "Group 3"),
    ("Group 30 - Fan/Ventilation Control", "Group 30"),
    ("Group 6&35 - Additional Sensors", "Group 6&35"),
];

/// Telemetry history prompt labels, in serialization order.
const HISTORY_SECTIONS: [&str; 2] = ["Group 30 History", "Group 3 History"];

/// Pull a fresh snapshot of every tracked group and history collection, in
/// parallel. Failed fetches degrade to empty sections; assembly never
/// aborts.
pub async fn fetch_context(
    keyed: &dyn KeyedStore,
    documents: &dyn DocumentStore,
) -> ContextBundle {
    let (g_soil, g_light, g_fan, g_climate, h_rpm, h_lux) = tokio::join!(
        read_group(keyed, paths::GROUP_SOIL),
        read_group(keyed, paths::GROUP_LIGHT),
        read_group(keyed, paths::GROUP_FAN),
        read_group(keyed, paths::GROUP_CLIMATE),
        read_history(documents, paths::RPM_COLLECTION),
        read_history(documents, paths::LUX_COLLECTION),
    );

    let group_data = [g_soil, g_light, g_fan, g_climate];
    let history_docs = [h_rpm, h_lux];

    ContextBundle {
        fetched_at: Utc::now().to_rfc3339(),
        groups: GROUP_SECTIONS
            .into_iter()
            .zip(group_data)
            .map(|((label, short_label), data)| GroupSection {
                label,
                short_label,
                data,
            })
            .collect(),
        histories: HISTORY_SECTIONS
            .into_iter()
            .zip(history_docs)
            .map(|(label, documents)| HistorySection { label, documents })
            .collect(),
    }
}

async fn read_group(keyed: &dyn KeyedStore, group: &str) -> Option<Value> {
    match keyed.read(&paths::status_group(group)).await {
        Ok(value) => value,
        Err(err) => {
            warn!("context fetch failed for status/{group}: {err}");
            None
        }
    }
}

async fn read_history(documents: &dyn DocumentStore, collection: &str) -> Vec<Value> {
    match documents
        .fetch_latest(collection, paths::CONTEXT_HISTORY_LIMIT)
        .await
    {
        Ok(mut page) => {
            // Newest-first from the store; chronological reads better in a
            // prompt.
            page.reverse();
            page
        }
        Err(err) => {
            warn!("context fetch failed for {collection}: {err}");
            Vec::new()
        }
    }
}

/// Serialize the bundle into labeled plain-text sections, fixed order:
/// status groups first, then histories. Missing data renders as an explicit
/// no-data line, never as an omitted section.
pub fn serialize_context(bundle: &ContextBundle) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push("=== CURRENT GROWTH CHAMBER DATA ===".into());
    sections.push(format!("Data fetched at: {}", bundle.fetched_at));
    sections.push(String::new());

    sections.push("--- REALTIME STATUS (Current Readings) ---".into());
    for group in &bundle.groups {
        match &group.data {
            Some(data) => {
                sections.push(format!("\n[{}]", group.label));
                sections.push(pretty(data));
            }
            None => sections.push(format!("\n[{}] No data available", group.short_label)),
        }
    }

    sections.push("\n--- TELEMETRY HISTORY (Recent Trends) ---".into());
    for history in &bundle.histories {
        if history.documents.is_empty() {
            sections.push(format!("\n[{}] No historical data available", history.label));
        } else {
            sections.push(format!(
                "\n[{} - {} recent records]",
                history.label,
                history.documents.len()
            ));
            sections.push(pretty(&Value::Array(history.documents.clone())));
        }
    }

    sections.push("\n=== END OF DATA ===\n".into());
    sections.join("\n")
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Assemble the complete prompt: preamble, serialized context, the last
/// [`paths::CONTEXT_TURN_LIMIT`] conversation turns verbatim, then the new
/// question.
pub fn build_prompt(user_message: &str, history: &[ChatTurn], bundle: &ContextBundle) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(SYSTEM_PROMPT.into());
    sections.push("\n".into());
    sections.push(serialize_context(bundle));
    sections.push("\n".into());

    if !history.is_empty() {
        sections.push("--- CONVERSATION HISTORY ---".into());
        let skip = history.len().saturating_sub(paths::CONTEXT_TURN_LIMIT);
        for turn in &history[skip..] {
            sections.push(format!("{}: {}", turn.role.label(), turn.content));
        }
        sections.push("\n".into());
    }

    sections.push("--- CURRENT USER QUESTION ---".into());
    sections.push(format!("User: {user_message}"));
    sections.push("\n".into());
    sections.push("Windy, please analyze the data above and provide a helpful, data-driven response:".into());

    sections.join("\n")
}

/// Tidy a raw reply: trim, collapse runs of blank lines, and make sure the
/// persona signs off.
pub fn post_process(reply: &str) -> String {
    let mut text = reply.trim().to_string();
    while text.contains("\n\n\n") {
        text = text.replace("\n\n\n", "\n\n");
    }
    if !text.to_lowercase().contains("windy") {
        text.push_str("\n\n— Windy 🌬️");
    }
    text
}

/// The chat panel's single entry point: fetch, assemble, generate, tidy.
pub struct Assistant {
    keyed: Arc<dyn KeyedStore>,
    documents: Arc<dyn DocumentStore>,
    generator: Arc<dyn TextGenerator>,
    config: GenerationConfig,
}

impl Assistant {
    /// Assistant over explicit store and generator handles, with default
    /// generation parameters.
    pub fn new(
        keyed: Arc<dyn KeyedStore>,
        documents: Arc<dyn DocumentStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            keyed,
            documents,
            generator,
            config: GenerationConfig::default(),
        }
    }

    /// Override the default generation parameters.
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Answer one question. Always returns displayable text.
    pub async fn ask(&self, user_message: &str, history: &[ChatTurn]) -> String {
        let bundle = fetch_context(self.keyed.as_ref(), self.documents.as_ref()).await;
        let prompt = build_prompt(user_message, history, &bundle);
        debug!("assembled prompt: {} bytes", prompt.len());

        match self.generator.generate(&prompt, &self.config).await {
            Ok(reply) => post_process(&reply),
            Err(err) => {
                error!("generation call failed: {err}");
                APOLOGY.to_string()
            }
        }
    }
}
