//! Typed assistant tasks over an [`AssistantService`].

use chrono::NaiveDate;

use pawlog_core::analytics::WeeklyInsights;
use pawlog_core::models::{HealthEvent, Pet};

use crate::client::{AssistantError, AssistantRequest, AssistantResult, AssistantService};
use crate::context::{AssistantContext, DEFAULT_EVENT_LIMIT};
use crate::parser::{parse_care_plan, parse_digest, parse_triage, CarePlan, DigestSummary, TriageAssessment};
use crate::prompts::{care_plan_prompt, digest_prompt, question_prompt, triage_prompt};

/// Builds prompts, calls the service and parses the reply.
pub struct PetAssistant<S: AssistantService> {
    service: S,
    event_limit: usize,
}

impl<S: AssistantService> PetAssistant<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            event_limit: DEFAULT_EVENT_LIMIT,
        }
    }

    pub fn with_event_limit(mut self, limit: usize) -> Self {
        self.event_limit = limit;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Context for a pet from its journal.
    pub fn context(&self, pet: &Pet, events: &[HealthEvent], today: NaiveDate) -> AssistantContext {
        AssistantContext::from_pet(pet, events, self.event_limit, today)
    }

    /// Free-form answer to an owner question.
    pub fn ask(&self, context: &AssistantContext, question: &str) -> AssistantResult<String> {
        self.complete(AssistantRequest::new(question_prompt(context, question)).with_context(context))
    }

    /// Symptom triage, optionally with photos.
    pub fn triage(
        &self,
        context: &AssistantContext,
        description: &str,
        images: Vec<String>,
    ) -> AssistantResult<TriageAssessment> {
        let request = AssistantRequest::new(triage_prompt(context, description))
            .with_context(context)
            .with_images(images);
        Ok(parse_triage(&self.complete(request)?))
    }

    pub fn care_plan(&self, context: &AssistantContext, goal: &str) -> AssistantResult<CarePlan> {
        let request = AssistantRequest::new(care_plan_prompt(context, goal)).with_context(context);
        Ok(parse_care_plan(&self.complete(request)?))
    }

    /// Words for an already computed digest.
    pub fn narrate_digest(
        &self,
        context: &AssistantContext,
        insights: &WeeklyInsights,
    ) -> AssistantResult<DigestSummary> {
        let request = AssistantRequest::new(digest_prompt(context, insights)).with_context(context);
        Ok(parse_digest(&self.complete(request)?))
    }

    fn complete(&self, request: AssistantRequest) -> AssistantResult<String> {
        match self.service.complete(&request) {
            Ok(reply) if reply.trim().is_empty() => Err(AssistantError::EmptyResponse),
            Ok(reply) => Ok(reply),
            Err(e) => {
                tracing::warn!(error = %e, "assistant call failed");
                Err(e)
            }
        }
    }
}
