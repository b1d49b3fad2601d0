//! Grounded answer generation with a deterministic fallback.

use std::sync::Arc;
use std::time::Duration;

use crate::llm::LlmProvider;
use crate::roster::Employee;

use super::profile::employee_line;

pub const NO_MATCH_RESPONSE: &str =
    "Sorry, I couldn't find any employees matching your criteria.";

const ASSISTANT_INSTRUCTION: &str = "You are an HR assistant. Based on the query and employee \
data, provide a natural, professional response listing recommended candidates with their \
skills, experience, and availability. Highlight why they match the query.";

/// How the answer text was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Synthesis {
    /// No candidates; generation was not attempted.
    NoMatch,
    /// Text returned by the model, verbatim.
    Generated(String),
    /// Generation failed or timed out; `text` is built from the candidate list.
    Fallback { text: String, reason: String },
}

impl Synthesis {
    pub fn text(&self) -> &str {
        match self {
            Synthesis::NoMatch => NO_MATCH_RESPONSE,
            Synthesis::Generated(text) => text,
            Synthesis::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Synthesis::NoMatch => NO_MATCH_RESPONSE.to_string(),
            Synthesis::Generated(text) => text,
            Synthesis::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Synthesis::Fallback { .. })
    }
}

/// `Fallback response: Found {n} candidates: {names}` in the given order.
pub fn fallback_response(employees: &[Employee]) -> String {
    let names = employees
        .iter()
        .map(|employee| employee.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Fallback response: Found {} candidates: {}",
        employees.len(),
        names
    )
}

pub fn build_prompt(query: &str, employees: &[Employee]) -> String {
    let employee_data = employees
        .iter()
        .map(employee_line)
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}\n\nQuery: {}\n\nEmployee Data:\n{}\n\nResponse:",
        ASSISTANT_INSTRUCTION, query, employee_data
    )
}

pub struct ResponseSynthesizer {
    provider: Arc<dyn LlmProvider>,
    model_id: String,
    timeout: Duration,
}

impl ResponseSynthesizer {
    pub fn new(provider: Arc<dyn LlmProvider>, model_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
            timeout,
        }
    }

    pub async fn synthesize(&self, query: &str, employees: &[Employee]) -> Synthesis {
        if employees.is_empty() {
            return Synthesis::NoMatch;
        }

        let prompt = build_prompt(query, employees);
        let outcome =
            tokio::time::timeout(self.timeout, self.provider.generate(&prompt, &self.model_id))
                .await;

        let reason = match outcome {
            Ok(Ok(text)) => return Synthesis::Generated(text),
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!("generation timed out after {:?}", self.timeout),
        };

        tracing::warn!(
            "Error generating response with {} ({}): {}",
            self.provider.name(),
            self.model_id,
            reason
        );
        Synthesis::Fallback {
            text: fallback_response(employees),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Employee {
        Employee {
            id: format!("id-{name}"),
            name: name.to_string(),
            skills: vec!["Rust".to_string()],
            experience_years: 2.0,
            projects: vec!["Core".to_string()],
            availability: "Available".to_string(),
        }
    }

    #[test]
    fn fallback_lists_names_in_order() {
        let employees = vec![named("A"), named("B"), named("C")];
        assert_eq!(
            fallback_response(&employees),
            "Fallback response: Found 3 candidates: A, B, C"
        );
    }

    #[test]
    fn prompt_contains_instruction_query_and_records() {
        let prompt = build_prompt("Who knows Rust?", &[named("A"), named("B")]);
        assert!(prompt.starts_with("You are an HR assistant."));
        assert!(prompt.contains("\n\nQuery: Who knows Rust?\n\nEmployee Data:\n"));
        assert!(prompt.contains("- ID: id-A, Name: A, Skills: Rust"));
        assert!(prompt.contains("\n- ID: id-B, Name: B,"));
        assert!(prompt.ends_with("\n\nResponse:"));
    }

    #[test]
    fn synthesis_text_accessors() {
        assert_eq!(Synthesis::NoMatch.text(), NO_MATCH_RESPONSE);
        assert_eq!(Synthesis::Generated("hi".into()).into_text(), "hi");
        let fallback = Synthesis::Fallback {
            text: "f".into(),
            reason: "r".into(),
        };
        assert!(fallback.is_fallback());
        assert_eq!(fallback.text(), "f");
    }
}
