//! Domain prompt templates.
//!
//! Every template has the same shape so providers see a consistent layout:
//! 1. A role line telling the model who it is
//! 2. A labelled slot holding the user's message verbatim
//! 3. A numbered list of what the answer should cover (or a closing line
//!    for the generic template)

use crate::domain::Domain;

/// System instruction for providers whose API accepts a separate system message.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a professional, friendly and knowledgeable AI assistant.";

/// A fixed instructional template for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Opening line establishing the model's role
    pub role: &'static str,

    /// Label placed in front of the user's message ("Problem", "Topic", ...)
    pub label: &'static str,

    /// Points the answer should cover, rendered as a numbered list
    pub requests: &'static [&'static str],

    /// Trailing instruction, used when there is no list
    pub closing: Option<&'static str>,
}

impl PromptTemplate {
    /// The marker that precedes the interpolated message, e.g. `"Problem: "`.
    pub fn slot_marker(&self) -> String {
        format!("{}: ", self.label)
    }

    /// Render the template around `message`.
    pub fn render(&self, message: &str) -> String {
        let mut prompt = String::with_capacity(
            self.role.len() + message.len() + self.requests.len() * 48 + 64,
        );
        prompt.push_str(self.role);
        prompt.push('\n');
        prompt.push_str(&self.slot_marker());
        prompt.push_str(message);
        prompt.push_str("\n\n");

        if !self.requests.is_empty() {
            prompt.push_str("Please provide:");
            for (i, request) in self.requests.iter().enumerate() {
                prompt.push_str(&format!("\n{}. {}", i + 1, request));
            }
        }

        if let Some(closing) = self.closing {
            prompt.push_str(closing);
        }

        prompt
    }
}

const MATH_TEMPLATE: PromptTemplate = PromptTemplate {
    role: "You are a professional mathematics tutor. Give a detailed, accurate solution to the following problem.",
    label: "Problem",
    requests: &[
        "Clear step-by-step working",
        "Explanations of the mathematical concepts involved",
        "Alternative methods of solution where possible",
        "Real-world applications",
    ],
    closing: None,
};

const PROGRAMMING_TEMPLATE: PromptTemplate = PromptTemplate {
    role: "You are a senior software engineer. Give expert advice on the following programming problem.",
    label: "Problem",
    requests: &[
        "A clear code solution",
        "An explanation of the code and relevant best practices",
        "Possible optimizations",
        "Related technical background",
    ],
    closing: None,
};

const WRITING_TEMPLATE: PromptTemplate = PromptTemplate {
    role: "You are a professional writing coach. Help with the following writing request.",
    label: "Request",
    requests: &[
        "Creative and structural suggestions",
        "Concrete writing techniques",
        "Examples or templates",
        "Suggestions for improvement",
    ],
    closing: None,
};

const DIALOGUE_TEMPLATE: PromptTemplate = PromptTemplate {
    role: "You are a thoughtful conversation partner. Hold an in-depth, engaging conversation about the following topic.",
    label: "Topic",
    requests: &[
        "A considered response",
        "Relevant background knowledge",
        "Thought-provoking questions",
        "Practical suggestions",
    ],
    closing: None,
};

const MUN_TEMPLATE: PromptTemplate = PromptTemplate {
    role: "You are an experienced diplomatic adviser and Model United Nations expert. Give a professional analysis of the following issue.",
    label: "Issue",
    requests: &[
        "Analysis from the perspective of international law and diplomacy",
        "The positions and interests of the countries involved",
        "Possible resolutions",
        "Negotiation strategy recommendations",
    ],
    closing: None,
};

const GENERAL_TEMPLATE: PromptTemplate = PromptTemplate {
    role: "Give a professional, detailed answer to the following question.",
    label: "Question",
    requests: &[],
    closing: Some("Make sure the answer is accurate, useful and easy to understand."),
};

/// Template used for a domain.
pub fn template_for(domain: Domain) -> &'static PromptTemplate {
    match domain {
        Domain::Math => &MATH_TEMPLATE,
        Domain::Programming => &PROGRAMMING_TEMPLATE,
        Domain::Writing => &WRITING_TEMPLATE,
        Domain::Dialogue => &DIALOGUE_TEMPLATE,
        Domain::Mun => &MUN_TEMPLATE,
        Domain::General => &GENERAL_TEMPLATE,
    }
}

/// Build the provider prompt for a message and a raw domain tag.
///
/// Unrecognized tags get the generic template. Never fails.
pub fn build_prompt(message: &str, domain_tag: &str) -> String {
    template_for(Domain::from_tag(domain_tag)).render(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_math_prompt_layout() {
        let prompt = build_prompt("2+2", "math");
        assert!(prompt.starts_with(MATH_TEMPLATE.role));
        assert!(prompt.contains("Problem: 2+2\n"));
        assert!(prompt.contains("Please provide:\n1. Clear step-by-step working"));
        assert!(prompt.ends_with("4. Real-world applications"));
    }

    #[test]
    fn test_each_known_domain_has_its_own_role() {
        let roles: std::collections::HashSet<_> = Domain::KNOWN
            .iter()
            .map(|d| template_for(*d).role)
            .collect();
        assert_eq!(roles.len(), Domain::KNOWN.len());
    }

    #[test]
    fn test_unknown_domain_uses_generic_template() {
        let prompt = build_prompt("How do tides work?", "oceanography");
        assert!(prompt.starts_with(GENERAL_TEMPLATE.role));
        assert!(prompt.contains("Question: How do tides work?"));
        assert!(!prompt.contains("Please provide:"));
        assert!(prompt.ends_with("easy to understand."));
    }

    #[test]
    fn test_message_with_braces_is_untouched() {
        let message = "fn main() { println!(\"{}\", 1); }";
        let prompt = build_prompt(message, "programming");
        assert!(prompt.contains(message));
    }

    proptest! {
        #[test]
        fn prop_known_domains_embed_message_and_markers(
            message in ".{1,200}",
            idx in 0usize..5,
        ) {
            let domain = Domain::KNOWN[idx];
            let template = template_for(domain);
            let prompt = build_prompt(&message, domain.as_str());

            prop_assert!(prompt.contains(&message));
            prop_assert!(prompt.contains(template.role));
            let slot = format!("{}{}", template.slot_marker(), message);
            prop_assert!(prompt.contains(&slot));
            prop_assert!(prompt.contains("Please provide:"));
        }

        #[test]
        fn prop_unknown_domains_use_generic_template(
            message in ".{1,200}",
            tag in "[a-z]{1,12}",
        ) {
            prop_assume!(Domain::from_tag(&tag) == Domain::General);
            let prompt = build_prompt(&message, &tag);

            prop_assert!(prompt.starts_with(GENERAL_TEMPLATE.role));
            let slot = format!("Question: {}", message);
            prop_assert!(prompt.contains(&slot));
        }

        #[test]
        fn prop_build_is_pure(message in ".{0,100}", tag in "[a-z]{0,12}") {
            prop_assert_eq!(build_prompt(&message, &tag), build_prompt(&message, &tag));
        }
    }
}
