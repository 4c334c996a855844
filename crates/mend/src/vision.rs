//! Multi-pass image analysis.
//!
//! A single broad prompt tends to drop one of the independent facts we
//! need (damage presence, severity, material, furniture type), so the
//! loop runs several narrow, instruction-scoped passes over the same
//! image and feeds every prior finding forward. The cost is N remote
//! calls and a prompt that grows with each pass.

use std::sync::Arc;

use crate::providers::base::{CompletionProvider, CompletionRequest};
use crate::providers::utils::image_to_data_uri;

pub const DEFAULT_ITERATIONS: usize = 4;

/// Marker recorded for a pass whose remote call failed. Later passes see
/// it in their prior-findings context; the loop never aborts early.
pub const FAILURE_MARKER: &str = "[no analysis produced for this pass]";

const FACTUAL_DIRECTIVE: &str = "Keep your description factual, short and strictly about \
this piece of furniture. Only describe, don't guess.";

/// One instruction per pass, each scoped to a distinct sub-task.
const STEP_INSTRUCTIONS: [&str; 4] = [
    "Identify any visible damage on the item: state what kind of damage you see and where.",
    "Confirm or correct the damage found so far and describe its severity, and describe the \
     material the item is made of (for example plastic, metal, wood or other).",
    "Describe the structure of the item: what type of furniture or household item this is \
     (chair, sofa, table etc.) and which parts are affected.",
    "Synthesize the findings so far into a short factual summary of the item, its material \
     and the damage observed.",
];

const VISION_TEMPERATURE: f64 = 0.7;
const VISION_TOP_P: f64 = 0.9;
const VISION_MAX_TOKENS: u32 = 512;

pub struct VisionRefinementLoop {
    provider: Arc<dyn CompletionProvider>,
    model: String,
}

impl VisionRefinementLoop {
    pub fn new(provider: Arc<dyn CompletionProvider>, model: &str) -> Self {
        VisionRefinementLoop {
            provider,
            model: model.to_string(),
        }
    }

    /// Run `iterations` sequential passes over one image and return the
    /// concatenation of every pass's labeled output. Always produces
    /// exactly `iterations` "Iteration k" segments; a failed pass
    /// contributes the failure marker instead of text.
    pub async fn run(&self, image: &[u8], iterations: usize) -> String {
        // Encoded once; the same data URI is attached at every pass.
        let data_uri = image_to_data_uri(image);

        let mut findings: Vec<String> = Vec::with_capacity(iterations);

        for step in 1..=iterations {
            let prompt = self.build_prompt(step, &findings);
            let request = CompletionRequest::chat(
                &self.model,
                vec![crate::models::message::Message::user(prompt)],
                VISION_MAX_TOKENS,
            )
            .with_temperature(VISION_TEMPERATURE)
            .with_top_p(VISION_TOP_P)
            .with_image(data_uri.clone());

            let output = match self.provider.send(request).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(step, "vision pass failed: {}", e);
                    FAILURE_MARKER.to_string()
                }
            };

            findings.push(format!("Iteration {}: {}", step, output));
        }

        findings.join("\n")
    }

    fn build_prompt(&self, step: usize, findings: &[String]) -> String {
        let instruction = STEP_INSTRUCTIONS[(step - 1).min(STEP_INSTRUCTIONS.len() - 1)];

        let mut prompt = format!("{}\n\n{}", FACTUAL_DIRECTIVE, instruction);
        if !findings.is_empty() {
            // Full accumulation, never summarized or truncated.
            prompt.push_str("\n\nFindings from previous passes:\n");
            prompt.push_str(&findings.join("\n"));
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CompletionError;
    use crate::providers::mock::MockProvider;

    fn loop_with(mock: MockProvider) -> VisionRefinementLoop {
        VisionRefinementLoop::new(Arc::new(mock), "test-vision-model")
    }

    #[tokio::test]
    async fn test_labeled_segments() {
        let mock = MockProvider::new(vec![
            Ok("scratch on the left leg".to_string()),
            Ok("wooden frame, minor damage".to_string()),
            Ok("a four-legged dining chair".to_string()),
            Ok("wooden chair with a scratched leg".to_string()),
        ]);
        let vision = loop_with(mock.clone());

        let blob = vision.run(b"jpegbytes", 4).await;
        let lines: Vec<&str> = blob.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Iteration 1: scratch on the left leg");
        assert_eq!(lines[3], "Iteration 4: wooden chair with a scratched leg");
    }

    #[tokio::test]
    async fn test_failed_step_does_not_abort_loop() {
        let mock = MockProvider::new(vec![
            Ok("scratch on the left leg".to_string()),
            Err(CompletionError::Timeout),
            Ok("a four-legged dining chair".to_string()),
            Ok("wooden chair, scratched leg".to_string()),
        ]);
        let vision = loop_with(mock.clone());

        let blob = vision.run(b"jpegbytes", 4).await;
        let lines: Vec<&str> = blob.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], format!("Iteration 2: {}", FAILURE_MARKER));

        // Later passes carry the failure marker in their prior findings.
        let requests = mock.requests();
        assert_eq!(requests.len(), 4);
        let step_three_prompt = &requests[2].messages[0].content;
        assert!(step_three_prompt.contains("Iteration 1: scratch on the left leg"));
        assert!(step_three_prompt.contains(&format!("Iteration 2: {}", FAILURE_MARKER)));
        let step_four_prompt = &requests[3].messages[0].content;
        assert!(step_four_prompt.contains(&format!("Iteration 2: {}", FAILURE_MARKER)));
    }

    #[tokio::test]
    async fn test_image_reattached_identically_each_pass() {
        let mock = MockProvider::new(vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Ok("three".to_string()),
        ]);
        let vision = loop_with(mock.clone());
        vision.run(b"jpegbytes", 3).await;

        let requests = mock.requests();
        let first_uri = requests[0].image.as_ref().unwrap();
        assert!(first_uri.starts_with("data:image/jpeg;base64,"));
        for request in &requests {
            assert_eq!(request.image.as_ref().unwrap(), first_uri);
            assert_eq!(request.temperature, Some(0.7));
            assert_eq!(request.top_p, Some(0.9));
            assert_eq!(request.max_tokens, 512);
        }
    }

    #[tokio::test]
    async fn test_first_pass_has_no_prior_findings() {
        let mock = MockProvider::new(vec![Ok("one".to_string()), Ok("two".to_string())]);
        let vision = loop_with(mock.clone());
        vision.run(b"jpegbytes", 2).await;

        let requests = mock.requests();
        assert!(!requests[0].messages[0]
            .content
            .contains("Findings from previous passes"));
        assert!(requests[1].messages[0]
            .content
            .contains("Findings from previous passes"));
        assert!(requests[1].messages[0].content.contains("Iteration 1: one"));
    }
}
