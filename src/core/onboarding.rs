use crate::domain::model::{OnboardingReply, OnboardingStep};

/// Phrases meaning "tell me how this works" (English and French). Each
/// entry matches the start of a word, so stems like `fonctionn` cover
/// `fonctionne` and `fonctionnement`.
const EXPLAIN_KEYWORDS: &[&str] = &[
    "how", "what", "explain", "learn", "comment", "fonctionn", "utilise", "marche", "explique",
];

/// Phrases meaning "skip ahead and analyse my business".
const START_KEYWORDS: &[&str] = &[
    "start", "jump", "ready", "begin", "commencer", "lancer", "analyse", "prêt",
];

fn contains_any(message: &str, keywords: &[&str]) -> bool {
    let lowered = message.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .any(|word| keywords.iter().any(|k| word.starts_with(k)))
}

pub fn wants_explanation(message: &str) -> bool {
    contains_any(message, EXPLAIN_KEYWORDS)
}

pub fn wants_to_start(message: &str) -> bool {
    contains_any(message, START_KEYWORDS)
}

/// Next step of the scripted introduction. Start keywords win over explain
/// keywords ("how do I start?" moves on).
pub fn next_step(current: OnboardingStep, message: &str) -> OnboardingStep {
    match current {
        OnboardingStep::InitialQuestion | OnboardingStep::ExplainingApp
            if wants_to_start(message) =>
        {
            OnboardingStep::CollectingBusinessType
        }
        OnboardingStep::InitialQuestion if wants_explanation(message) => {
            OnboardingStep::ExplainingApp
        }
        OnboardingStep::InitialQuestion => OnboardingStep::InitialQuestion,
        OnboardingStep::ExplainingApp => OnboardingStep::ExplainingApp,
        OnboardingStep::CollectingBusinessType => OnboardingStep::CollectingLocation,
        OnboardingStep::CollectingLocation => OnboardingStep::FreeForm,
        OnboardingStep::FreeForm => OnboardingStep::FreeForm,
    }
}

pub fn fallback_text(step: OnboardingStep) -> &'static str {
    match step {
        OnboardingStep::InitialQuestion => {
            "Hello! I'm your Cultural AI Assistant. I can explain how this app works, what it is used for, and how cultural intelligence can help your international expansion. What would you like to know?"
        }
        OnboardingStep::ExplainingApp => {
            "This app combines Qloo cultural data with generative AI to give you personalised insights: local preferences, cultural trends and market opportunities in any country. Any other questions about how it works? Say \"start\" when you're ready for your own analysis."
        }
        OnboardingStep::CollectingBusinessType => {
            "Great, let's begin! What type of business do you run (for example a restaurant, an e-commerce shop or a tech startup)?"
        }
        OnboardingStep::CollectingLocation => {
            "Thanks! Which location would you like to explore (country, city or region)?"
        }
        OnboardingStep::FreeForm => {
            "I'm here to help you understand cultural preferences for international business expansion. What would you like to know?"
        }
    }
}

/// Canned reply used when no language model answers.
pub fn fallback_reply(current: OnboardingStep, message: &str) -> OnboardingReply {
    let next_phase = next_step(current, message);
    let text = if next_phase == OnboardingStep::CollectingBusinessType {
        fallback_text(next_phase)
    } else {
        fallback_text(current)
    };

    OnboardingReply {
        response: text.to_string(),
        next_phase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_question_moves_to_explaining() {
        assert_eq!(
            next_step(OnboardingStep::InitialQuestion, "How does this work?"),
            OnboardingStep::ExplainingApp
        );
        assert_eq!(
            next_step(OnboardingStep::InitialQuestion, "Comment ça marche ?"),
            OnboardingStep::ExplainingApp
        );
        assert_eq!(
            next_step(OnboardingStep::InitialQuestion, "hello"),
            OnboardingStep::InitialQuestion
        );
    }

    #[test]
    fn test_start_keyword_wins() {
        assert_eq!(
            next_step(OnboardingStep::InitialQuestion, "How do I START?"),
            OnboardingStep::CollectingBusinessType
        );
        assert_eq!(
            next_step(OnboardingStep::ExplainingApp, "je suis prêt"),
            OnboardingStep::CollectingBusinessType
        );
        assert_eq!(
            next_step(OnboardingStep::ExplainingApp, "what else?"),
            OnboardingStep::ExplainingApp
        );
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        assert_eq!(
            next_step(OnboardingStep::InitialQuestion, "How do you interpret the data?"),
            OnboardingStep::ExplainingApp
        );
        assert_eq!(
            next_step(
                OnboardingStep::InitialQuestion,
                "What a pretty app, how does it work?"
            ),
            OnboardingStep::ExplainingApp
        );
        assert!(wants_explanation("Ça fonctionne comment ?"));
        assert!(wants_to_start("Je suis prête, on commence ?"));
        assert!(!wants_to_start("somewhat restarted"));
    }

    #[test]
    fn test_collection_steps_advance_linearly() {
        assert_eq!(
            next_step(OnboardingStep::CollectingBusinessType, "bakery"),
            OnboardingStep::CollectingLocation
        );
        assert_eq!(
            next_step(OnboardingStep::CollectingLocation, "Lyon"),
            OnboardingStep::FreeForm
        );
        assert_eq!(
            next_step(OnboardingStep::FreeForm, "start over"),
            OnboardingStep::FreeForm
        );
    }

    #[test]
    fn test_fallback_reply_keeps_transition() {
        let reply = fallback_reply(OnboardingStep::InitialQuestion, "explain please");
        assert_eq!(reply.next_phase, OnboardingStep::ExplainingApp);
        assert_eq!(reply.response, fallback_text(OnboardingStep::InitialQuestion));

        let reply = fallback_reply(OnboardingStep::ExplainingApp, "let's start");
        assert_eq!(reply.next_phase, OnboardingStep::CollectingBusinessType);
        assert!(reply.response.contains("type of business"));
    }
}
