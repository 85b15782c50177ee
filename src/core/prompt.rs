use crate::domain::model::{OnboardingStep, QlooInsight};

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "no data".to_string()
    } else {
        items.join(", ")
    }
}

pub fn build_strategic_prompt(
    message: &str,
    insights: &QlooInsight,
    location: &str,
    business_type: &str,
) -> String {
    format!(
        r#"You are an expert cultural intelligence consultant helping businesses expand into new markets.

CULTURAL CONTEXT FOR {upper}:
- Key preferences: {preferences}
- Current trends: {trends}
- Cultural clusters: {clusters}

BUSINESS CONTEXT:
- Business type: {business_type}
- Target market: {location}

USER QUESTION: {message}

Answer in four sections:
1. Cultural analysis: how these preferences, trends and clusters affect this business type.
2. Strategic recommendations: four or five concrete strategies (what, how, why it works here).
3. Implementation roadmap: steps, timelines, resources and metrics.
4. Local insights: business etiquette, do's and don'ts, seasonal events.

Be specific and actionable, and ground every recommendation in the cultural data above."#,
        upper = location.to_uppercase(),
        preferences = list_or_none(&insights.preferences),
        trends = list_or_none(&insights.trends),
        clusters = list_or_none(&insights.cultural_clusters),
        business_type = business_type,
        location = location,
        message = message,
    )
}

fn step_guidance(step: OnboardingStep) -> &'static str {
    match step {
        OnboardingStep::InitialQuestion => {
            "The user just asked their first question. Welcome them, explain what the Cultural AI app can do and invite questions about how it works or its use cases."
        }
        OnboardingStep::ExplainingApp => {
            "The user is asking about the app. Explain how Cultural AI works, its use cases (restaurants, e-commerce, startups) and how cultural intelligence helps. Mention they can say \"start\" when ready for a personalised analysis."
        }
        OnboardingStep::CollectingBusinessType => {
            "Ask the user which type of business they run."
        }
        OnboardingStep::CollectingLocation => {
            "Acknowledge the business type and ask which country, city or region they want to explore."
        }
        OnboardingStep::FreeForm => {
            "Answer helpfully and guide the user towards a better understanding of the app."
        }
    }
}

pub fn build_onboarding_prompt(
    message: &str,
    current: OnboardingStep,
    next: OnboardingStep,
) -> String {
    // 進入收集階段時，依下一步的指引回答
    let guidance = if next == OnboardingStep::CollectingBusinessType {
        step_guidance(next)
    } else {
        step_guidance(current)
    };

    format!(
        r#"You are a Cultural Intelligence Assistant helping businesses expand internationally. Guide users through onboarding in a natural, conversational way.

Current phase: {current}
Next phase: {next}
User message: {message}

Instructions:
- Be warm, professional and encouraging
- Keep answers under 150 words
- Reply in the language the user writes in

{guidance}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategic_prompt_interpolates_context() {
        let insights = QlooInsight {
            preferences: vec!["minimalist design".to_string(), "seasonal items".to_string()],
            trends: vec![],
            cultural_clusters: vec!["tech adopters".to_string()],
        };

        let prompt = build_strategic_prompt("Where should I open?", &insights, "Japan", "cafe");

        assert!(prompt.contains("CULTURAL CONTEXT FOR JAPAN"));
        assert!(prompt.contains("minimalist design, seasonal items"));
        assert!(prompt.contains("Current trends: no data"));
        assert!(prompt.contains("Business type: cafe"));
        assert!(prompt.contains("USER QUESTION: Where should I open?"));
    }

    #[test]
    fn test_onboarding_prompt_names_phases() {
        let prompt = build_onboarding_prompt(
            "what is this?",
            OnboardingStep::InitialQuestion,
            OnboardingStep::ExplainingApp,
        );

        assert!(prompt.contains("Current phase: initial_question"));
        assert!(prompt.contains("Next phase: explaining_app"));
        assert!(prompt.contains("User message: what is this?"));
        assert!(prompt.contains("first question"));

        let prompt = build_onboarding_prompt(
            "ready",
            OnboardingStep::ExplainingApp,
            OnboardingStep::CollectingBusinessType,
        );
        assert!(prompt.contains("which type of business"));
    }
}
