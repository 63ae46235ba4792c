//! End-to-end deck generation: admit, generate, render, serialize

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;

use crate::domain::{DomainError, PresentationRequest};
use crate::infrastructure::generator::ContentGenerator;
use crate::infrastructure::observability::record_generation;
use crate::infrastructure::pptx::PptxWriter;
use crate::infrastructure::rate_limiter::AdmissionControl;
use crate::infrastructure::render::DeckRenderer;

/// A serialized deck ready to send or save
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub bytes: Bytes,
    pub file_name: String,
    pub slide_count: usize,
}

/// Runs each stage in order; the first failure stops the pipeline
#[derive(Debug, Clone)]
pub struct PipelineOrchestrator {
    admission: Arc<dyn AdmissionControl>,
    generator: ContentGenerator,
    renderer: DeckRenderer,
    writer: PptxWriter,
}

impl PipelineOrchestrator {
    pub fn new(
        admission: Arc<dyn AdmissionControl>,
        generator: ContentGenerator,
        renderer: DeckRenderer,
        writer: PptxWriter,
    ) -> Self {
        Self {
            admission,
            generator,
            renderer,
            writer,
        }
    }

    pub fn generator(&self) -> &ContentGenerator {
        &self.generator
    }

    pub async fn run(
        &self,
        client_id: &str,
        request: &PresentationRequest,
    ) -> Result<GeneratedDeck, DomainError> {
        let started = Instant::now();
        let result = self.execute(client_id, request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        record_generation(outcome, started.elapsed());

        match &result {
            Ok(deck) => tracing::info!(
                client_id = %client_id,
                topic = %request.topic(),
                slides = deck.slide_count,
                bytes = deck.bytes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Presentation generated"
            ),
            Err(DomainError::RateLimited { retry_after_secs }) => tracing::warn!(
                client_id = %client_id,
                retry_after_secs,
                "Presentation request rejected by rate limiter"
            ),
            Err(e) => tracing::error!(
                client_id = %client_id,
                topic = %request.topic(),
                error = %e,
                "Presentation generation failed"
            ),
        }

        result
    }

    async fn execute(
        &self,
        client_id: &str,
        request: &PresentationRequest,
    ) -> Result<GeneratedDeck, DomainError> {
        let decision = self.admission.check(client_id).await;
        if !decision.allowed {
            return Err(DomainError::rate_limited(decision.retry_after_secs));
        }

        let plan = self.generator.generate(request).await?;
        let deck = self.renderer.render(&plan, request.aspect_ratio())?;
        let bytes = self.writer.write(&deck)?;

        Ok(GeneratedDeck {
            bytes,
            file_name: file_name_for(request.topic()),
            slide_count: deck.len(),
        })
    }
}

/// Download name derived from the topic
///
/// Spaces become underscores and anything outside `[A-Za-z0-9_-]` is
/// dropped.
pub fn file_name_for(topic: &str) -> String {
    let stem: String = topic
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .collect();

    if stem.is_empty() {
        "presentation.pptx".to_string()
    } else {
        format!("{}_presentation.pptx", stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::domain::llm::ScriptedLanguageModel;
    use crate::domain::{AspectRatio, LanguageModel};
    use crate::infrastructure::cache::GenerationCache;
    use crate::infrastructure::rate_limiter::{MockAdmissionControl, RateLimitDecision};

    fn response() -> String {
        json!({ "slides": [
            { "layout": "title_slide", "content": { "title": "Mars", "subtitle": "Red" } },
            { "layout": "two_column", "content": {
                "title": "Compare",
                "left_column": { "heading": "Mars", "points": ["Cold"] }
            } }
        ] })
        .to_string()
    }

    fn orchestrator(
        admission: MockAdmissionControl,
        model: &Arc<ScriptedLanguageModel>,
    ) -> PipelineOrchestrator {
        let generator = ContentGenerator::new(
            Arc::clone(model) as Arc<dyn LanguageModel>,
            GenerationCache::new(),
        );
        PipelineOrchestrator::new(
            Arc::new(admission),
            generator,
            DeckRenderer::default(),
            PptxWriter::new(),
        )
    }

    fn admit_all() -> MockAdmissionControl {
        let mut admission = MockAdmissionControl::new();
        admission
            .expect_check()
            .returning(|_| RateLimitDecision::allow(5, 4));
        admission
    }

    #[tokio::test]
    async fn test_run_produces_pptx() {
        let model = Arc::new(ScriptedLanguageModel::responding(response()));
        let pipeline = orchestrator(admit_all(), &model);
        let request = PresentationRequest::new("Mars Facts", 2, AspectRatio::Widescreen).unwrap();

        let deck = pipeline.run("10.0.0.1", &request).await.unwrap();

        assert_eq!(deck.slide_count, 2);
        assert_eq!(deck.file_name, "Mars_Facts_presentation.pptx");
        // zip local file header
        assert_eq!(&deck.bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn test_denied_request_never_reaches_model() {
        let mut admission = MockAdmissionControl::new();
        admission
            .expect_check()
            .withf(|client_id| client_id == "10.0.0.9")
            .times(1)
            .returning(|_| RateLimitDecision::deny(5, 30));

        let model = Arc::new(ScriptedLanguageModel::responding(response()));
        let pipeline = orchestrator(admission, &model);
        let request = PresentationRequest::new("Mars", 2, AspectRatio::Widescreen).unwrap();

        let err = pipeline.run("10.0.0.9", &request).await.unwrap_err();

        assert_eq!(err, DomainError::rate_limited(30));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_short_circuits() {
        let model = Arc::new(ScriptedLanguageModel::responding("not json"));
        let pipeline = orchestrator(admit_all(), &model);
        let request = PresentationRequest::new("Mars", 2, AspectRatio::Standard).unwrap();

        let err = pipeline.run("client", &request).await.unwrap_err();

        assert!(matches!(err, DomainError::GenerationValidation { .. }));
        assert!(pipeline.generator().cache().is_empty());
    }

    #[tokio::test]
    async fn test_cached_plan_is_rendered_per_aspect_ratio() {
        let model = Arc::new(ScriptedLanguageModel::responding(response()));
        let pipeline = orchestrator(admit_all(), &model);

        let wide = PresentationRequest::new("Mars", 2, AspectRatio::Widescreen).unwrap();
        let first = pipeline.run("client", &wide).await.unwrap();
        let again = pipeline.run("client", &wide).await.unwrap();

        assert_eq!(model.calls(), 1);
        assert_eq!(first.slide_count, again.slide_count);

        // the aspect ratio is part of the cache key
        let standard = PresentationRequest::new("Mars", 2, AspectRatio::Standard).unwrap();
        pipeline.run("client", &standard).await.unwrap();
        assert_eq!(model.calls(), 2);
    }

    #[test]
    fn test_file_name_for() {
        assert_eq!(file_name_for("Saturn's Rings"), "Saturns_Rings_presentation.pptx");
        assert_eq!(file_name_for("AI/ML in 2025"), "AIML_in_2025_presentation.pptx");
        assert_eq!(file_name_for("well-known topic"), "well-known_topic_presentation.pptx");
        assert_eq!(file_name_for("日本語"), "presentation.pptx");
    }
}
