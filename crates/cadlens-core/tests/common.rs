//! Shared fixtures for the integration tests.
//!
//! Test-only: scripted providers, counting pacing, and synthetic drawings.

// Each test file uses a different subset of these helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use cadlens_core::llm::{ImageInput, LlmResponse};
use cadlens_core::{
    Analyzer, Config, ModelRegistry, PacingPolicy, ProviderKind, ProviderTable, RunResult,
    VisionProvider,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Script = dyn Fn(u32, &str) -> RunResult<String> + Send + Sync;

/// Provider whose replies come from a closure of `(call index, prompt)`.
///
/// Records every prompt and image payload it receives.
pub struct ScriptedProvider {
    script: Box<Script>,
    calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
    images: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(script: impl Fn(u32, &str) -> RunResult<String> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
            images: Mutex::new(Vec::new()),
        })
    }

    /// Answers every call with a text naming the call index.
    pub fn echo() -> Arc<Self> {
        Self::new(|n, _| Ok(format!("Finding #{n}")))
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn images(&self) -> Vec<String> {
        self.images.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(
        &self,
        image: &ImageInput,
        prompt: &str,
        model_id: &str,
    ) -> RunResult<LlmResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.images.lock().unwrap().push(image.data.clone());

        (self.script)(n, prompt).map(|text| LlmResponse {
            text,
            model: model_id.to_string(),
            tokens_used: Some(100),
            latency_ms: 1,
        })
    }

    fn timeout(&self) -> Option<Duration> {
        None
    }
}

/// Pacing that never sleeps, only counts.
#[derive(Default)]
pub struct CountingPacing {
    calls: AtomicU32,
}

impl CountingPacing {
    pub fn count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PacingPolicy for CountingPacing {
    async fn between_passes(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Analyzer serving both provider kinds from `provider`.
pub fn analyzer_with(
    config: Config,
    provider: Arc<dyn VisionProvider>,
    pacing: Arc<CountingPacing>,
) -> Analyzer {
    let registry = Arc::new(config.registry());
    let providers = ProviderTable::new()
        .with(ProviderKind::Gemini, provider.clone())
        .with(ProviderKind::OpenRouter, provider);
    Analyzer::with_providers(config, registry, providers).with_pacing(pacing)
}

pub fn builtin_registry() -> Arc<ModelRegistry> {
    Arc::new(ModelRegistry::builtin())
}

/// A synthetic line drawing: light sheet with a dark border and grid.
pub fn drawing(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let border = x < 4 || y < 4 || x + 4 >= width || y + 4 >= height;
        if border || x % 50 == 0 || y % 50 == 0 {
            Rgb([30, 30, 30])
        } else {
            Rgb([240, 240, 235])
        }
    })
}

pub fn drawing_png(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(drawing(width, height))
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
