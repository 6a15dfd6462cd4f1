//! Catalogue of remote models and their capability metadata.
//!
//! The registry is built once at startup (built-in entries plus any extra
//! `[[models]]` declared in the config file) and then shared read-only via
//! `Arc`. Adding a model means adding an entry, never a code path.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Something a model can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Accepts image input
    Vision,
    Fast,
    Reasoning,
    Advanced,
    /// Tuned for diagrams and technical drawings
    Technical,
}

/// Backend family a model is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Direct multimodal API (Gemini `generateContent`)
    Gemini,
    /// OpenAI-style chat completions (OpenRouter)
    OpenRouter,
}

impl ProviderKind {
    /// Parse a provider tag as written in the catalogue.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "gemini" => Some(Self::Gemini),
            "openrouter" => Some(Self::OpenRouter),
            _ => None,
        }
    }

    /// Catalogue tag for this provider.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Immutable description of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Identifier sent to the provider (e.g., "gemini-2.5-flash")
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Provider tag ("gemini" or "openrouter").
    /// Kept as text so config-declared entries with a typo survive loading
    /// and fail loudly when a run selects them.
    pub provider: String,

    /// What the model can do
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,

    /// Whether the model is on a free tier
    #[serde(default)]
    pub free: bool,

    /// Context window label (e.g., "128K tokens")
    #[serde(default)]
    pub context: String,

    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ModelDescriptor {
    /// Resolve the provider tag, if it names a known provider.
    pub fn provider_kind(&self) -> Option<ProviderKind> {
        ProviderKind::from_tag(&self.provider)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

fn entry(
    id: &str,
    name: &str,
    provider: ProviderKind,
    capabilities: &[Capability],
    free: bool,
    context: &str,
    notes: Option<&str>,
) -> ModelDescriptor {
    ModelDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        provider: provider.tag().to_string(),
        capabilities: capabilities.iter().copied().collect(),
        free,
        context: context.to_string(),
        notes: notes.map(String::from),
    }
}

/// Read-only model catalogue with O(1) lookup by id.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
    index: HashMap<String, usize>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelRegistry {
    /// Id of the model used when none is requested.
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";

    /// The built-in catalogue.
    pub fn builtin() -> Self {
        use Capability::*;
        use ProviderKind::*;

        Self::from_models(vec![
            entry(
                "gemini-2.5-flash",
                "Gemini 2.5 Flash",
                Gemini,
                &[Vision, Fast],
                true,
                "1M tokens",
                None,
            ),
            entry(
                "gemini-2.5-pro",
                "Gemini 2.5 Pro",
                Gemini,
                &[Vision, Reasoning, Advanced],
                false,
                "2M tokens",
                None,
            ),
            entry(
                "xiaomi/mimo-v2-flash:free",
                "Xiaomi MiMo V2 Flash",
                OpenRouter,
                &[Vision, Fast],
                true,
                "128K tokens",
                Some("Fast multimodal, good for quick analysis"),
            ),
            entry(
                "deepseek/deepseek-r1",
                "DeepSeek R1",
                OpenRouter,
                &[Reasoning, Advanced],
                false,
                "64K tokens",
                Some("Excellent reasoning, chain-of-thought analysis"),
            ),
            entry(
                "nvidia/nemotron-nano-12b-v2-vl:free",
                "NVIDIA Nemotron Nano VL",
                OpenRouter,
                &[Vision, Technical],
                true,
                "32K tokens",
                Some("Optimized for technical diagrams"),
            ),
            entry(
                "qwen/qwen3-235b-a22b",
                "Qwen 3 235B",
                OpenRouter,
                &[Reasoning, Advanced],
                false,
                "32K tokens",
                Some("Large model, excellent for detailed analysis"),
            ),
        ])
    }

    /// Build a registry from an ordered list. Later duplicates replace earlier ones.
    pub fn from_models(models: Vec<ModelDescriptor>) -> Self {
        let mut registry = Self {
            models: Vec::with_capacity(models.len()),
            index: HashMap::with_capacity(models.len()),
        };
        for model in models {
            registry.insert(model);
        }
        registry
    }

    /// Built-in catalogue extended (or overridden by id) with extra entries.
    pub fn with_extra(extra: &[ModelDescriptor]) -> Self {
        let mut registry = Self::builtin();
        for model in extra {
            registry.insert(model.clone());
        }
        registry
    }

    fn insert(&mut self, model: ModelDescriptor) {
        match self.index.get(&model.id) {
            Some(&pos) => self.models[pos] = model,
            None => {
                self.index.insert(model.id.clone(), self.models.len());
                self.models.push(model);
            }
        }
    }

    /// Look up a model by id.
    pub fn describe(&self, model_id: &str) -> Option<&ModelDescriptor> {
        self.index.get(model_id).map(|&pos| &self.models[pos])
    }

    /// Whether `model_id` is known and has `capability`. Unknown models have none.
    pub fn has_capability(&self, model_id: &str, capability: Capability) -> bool {
        self.describe(model_id)
            .is_some_and(|m| m.has_capability(capability))
    }

    /// All models in catalogue order.
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogue() {
        let registry = ModelRegistry::builtin();
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.models()[0].id, ModelRegistry::DEFAULT_MODEL);

        let flash = registry.describe("gemini-2.5-flash").unwrap();
        assert_eq!(flash.provider_kind(), Some(ProviderKind::Gemini));
        assert!(flash.free);
        assert!(flash.has_capability(Capability::Vision));
    }

    #[test]
    fn test_unknown_model_is_absent() {
        let registry = ModelRegistry::builtin();
        assert!(registry.describe("nope/not-a-model").is_none());
        assert!(!registry.has_capability("nope/not-a-model", Capability::Vision));
    }

    #[test]
    fn test_reasoning_models_lack_vision() {
        let registry = ModelRegistry::builtin();
        assert!(!registry.has_capability("deepseek/deepseek-r1", Capability::Vision));
        assert!(registry.has_capability("deepseek/deepseek-r1", Capability::Reasoning));
        assert!(registry.has_capability(
            "nvidia/nemotron-nano-12b-v2-vl:free",
            Capability::Technical
        ));
    }

    #[test]
    fn test_extra_models_override_and_append() {
        let extra = vec![
            ModelDescriptor {
                id: "gemini-2.5-pro".to_string(),
                name: "Gemini Pro (pinned)".to_string(),
                provider: "gemini".to_string(),
                capabilities: [Capability::Vision].into_iter().collect(),
                free: false,
                context: "2M tokens".to_string(),
                notes: None,
            },
            ModelDescriptor {
                id: "acme/drafter".to_string(),
                name: "Acme Drafter".to_string(),
                provider: "acme".to_string(),
                capabilities: BTreeSet::new(),
                free: true,
                context: String::new(),
                notes: None,
            },
        ];
        let registry = ModelRegistry::with_extra(&extra);
        assert_eq!(registry.len(), 7);
        assert_eq!(registry.models()[1].name, "Gemini Pro (pinned)");
        let acme = registry.describe("acme/drafter").unwrap();
        assert_eq!(acme.provider_kind(), None);
    }

    #[test]
    fn test_descriptor_deserializes_from_toml() {
        let toml = r#"
            id = "openai/gpt-4o"
            name = "GPT-4o"
            provider = "openrouter"
            capabilities = ["vision", "advanced"]
        "#;
        let model: ModelDescriptor = toml::from_str(toml).unwrap();
        assert_eq!(model.provider_kind(), Some(ProviderKind::OpenRouter));
        assert!(model.has_capability(Capability::Advanced));
        assert!(!model.free);
        assert!(model.notes.is_none());
    }
}
