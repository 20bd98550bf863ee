//! Symptom advisory generation.
//!
//! The advisory is informational triage text, never a diagnosis, and its
//! failure must never block intake. This module therefore has an unusual
//! contract: `generate` cannot fail. Empty symptoms short-circuit to a
//! sentinel, an empty model reply becomes a placeholder, and a transport
//! fault becomes descriptive text carrying the fault message. Whatever
//! happens, the caller gets something displayable to store on the record.

use tracing::{debug, warn};

use super::ollama::TextGenerator;
use super::prompt::{build_advisory_prompt, ADVISORY_SYSTEM_PROMPT};

/// Stored verbatim when the patient reported no symptoms. The service is
/// not called at all in that case.
pub const NO_SYMPTOMS_SENTINEL: &str = "No symptoms provided.";

/// Stored when the service answered successfully but with an empty or
/// whitespace-only reply.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "No advisory received.";

/// Generates the one-shot advisory attached to every new patient record.
pub struct AdvisoryGenerator {
    client: Box<dyn TextGenerator>,
    model: String,
}

impl AdvisoryGenerator {
    pub fn new(client: Box<dyn TextGenerator>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    /// Produce advisory text for the given symptoms. Always returns.
    pub fn generate(&self, symptoms: &str) -> String {
        if symptoms.trim().is_empty() {
            debug!("No symptoms at intake, storing sentinel advisory");
            return NO_SYMPTOMS_SENTINEL.to_string();
        }

        let prompt = build_advisory_prompt(symptoms);
        match self.client.generate(&self.model, &prompt, ADVISORY_SYSTEM_PROMPT) {
            Ok(reply) => {
                let trimmed = reply.trim();
                if trimmed.is_empty() {
                    warn!(model = %self.model, "Advisory service returned an empty reply");
                    EMPTY_REPLY_PLACEHOLDER.to_string()
                } else {
                    debug!(model = %self.model, chars = trimmed.len(), "Advisory generated");
                    trimmed.to_string()
                }
            }
            Err(e) => {
                warn!(model = %self.model, error = %e, "Advisory generation failed, storing fault text");
                format!("Error generating advisory: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ollama::MockTextGenerator;

    fn generator(mock: MockTextGenerator) -> AdvisoryGenerator {
        AdvisoryGenerator::new(Box::new(mock), "gemma3:4b")
    }

    #[test]
    fn successful_reply_is_stored_trimmed() {
        let advisory = generator(MockTextGenerator::new("  **Likely Conditions:**\n- Malaria\n  "));
        let text = advisory.generate("fever, chills");
        assert_eq!(text, "**Likely Conditions:**\n- Malaria");
    }

    #[test]
    fn empty_symptoms_short_circuit_without_service_call() {
        let mock = MockTextGenerator::new("should never be seen");
        let probe = mock.clone();
        let advisory = generator(mock);

        assert_eq!(advisory.generate(""), NO_SYMPTOMS_SENTINEL);
        assert_eq!(advisory.generate("   \n\t "), NO_SYMPTOMS_SENTINEL);
        assert_eq!(probe.calls(), 0);
    }

    #[test]
    fn empty_reply_becomes_placeholder() {
        let advisory = generator(MockTextGenerator::new("   \n  "));
        assert_eq!(advisory.generate("fever"), EMPTY_REPLY_PLACEHOLDER);
    }

    #[test]
    fn service_fault_degrades_to_fault_text() {
        let advisory = generator(MockTextGenerator::failing());
        let text = advisory.generate("fever");
        assert!(text.starts_with("Error generating advisory:"));
        assert!(text.contains("Ollama"));
    }

    #[test]
    fn sentinel_and_placeholder_are_distinct() {
        // "no symptoms given" and "service said nothing" must stay
        // distinguishable once stored
        assert_ne!(NO_SYMPTOMS_SENTINEL, EMPTY_REPLY_PLACEHOLDER);
    }
}
