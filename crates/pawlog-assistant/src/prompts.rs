//! Prompts for the pet health assistant.
//!
//! Structured tasks (triage, care plans, digests) ask for fixed uppercase
//! labels so [`crate::parser`] can read the reply line by line.

use pawlog_core::analytics::WeeklyInsights;

use crate::context::AssistantContext;

/// System prompt shared by every task.
pub const SYSTEM_PROMPT: &str = r#"You are a friendly pet health assistant inside a pet health journal app.

You help owners understand their pet's logged meals, activity, mood, digestion, symptoms and medications.
- Base your answers on the pet profile and recent events provided.
- Be concise and practical. Use plain language.
- You are not a veterinarian. For anything that could be serious, tell the owner to contact their vet.
- Never invent events that are not in the journal."#;

/// A free-form owner question.
pub fn question_prompt(context: &AssistantContext, question: &str) -> String {
    format!(
        "{}\nQuestion from the owner:\n\"{}\"\n\nAnswer in a few short paragraphs.",
        context.render(),
        question.trim()
    )
}

/// Symptom triage. The reply is read by [`crate::parser::parse_triage`].
pub fn triage_prompt(context: &AssistantContext, description: &str) -> String {
    format!(
        r#"{}
The owner describes these symptoms:
"{}"

Assess how urgent this is. Reply using exactly these labels, each on its own line:
TITLE: a short title for the assessment
URGENCY: one of LOW, MODERATE, HIGH, EMERGENCY
SUMMARY: two or three sentences
ACTIONS:
- one recommended action per line
WARNING SIGNS:
- one sign that means the owner should see a vet immediately, per line"#,
        context.render(),
        description.trim()
    )
}

/// A care plan toward an owner goal. Read by [`crate::parser::parse_care_plan`].
pub fn care_plan_prompt(context: &AssistantContext, goal: &str) -> String {
    format!(
        r#"{}
The owner wants a care plan for this goal:
"{}"

Reply using exactly these labels, each on its own line:
TITLE: a short plan title
DURATION: how long the plan runs, for example "2 weeks"
SUMMARY: two or three sentences
STEPS:
- one step per line, in order
TIPS:
- one practical tip per line"#,
        context.render(),
        goal.trim()
    )
}

/// Narration of a computed weekly digest. Read by
/// [`crate::parser::parse_digest`].
///
/// The numbers come from the local engine; the assistant only puts them
/// into words.
pub fn digest_prompt(context: &AssistantContext, insights: &WeeklyInsights) -> String {
    let score = &insights.score;
    let current = &insights.current;
    let previous = &insights.previous;

    let mut facts = format!(
        "Health score: {} ({}). Activity {}, nutrition {}, wellness {}, consistency {}.\n",
        score.overall,
        score.label.as_str(),
        score.activity,
        score.nutrition,
        score.wellness,
        score.consistency
    );
    facts.push_str(&format!(
        "This week: {} events, {} meals, {} activity minutes (previous week {}), {} symptoms.\n",
        current.total_events,
        current.meals_count,
        current.activity_minutes,
        previous.activity_minutes,
        current.symptom_events.len()
    ));
    if let Some(mood) = current.average_mood {
        facts.push_str(&format!("Average mood: {:.1}/5.\n", mood));
    }
    facts.push_str(&format!("Logging streak: {} days.\n", insights.logging_streak));

    if insights.patterns.is_empty() {
        facts.push_str("Detected patterns: none\n");
    } else {
        facts.push_str("Detected patterns:\n");
        for pattern in &insights.patterns {
            facts.push_str(&format!(
                "- [{}] {}: {}\n",
                pattern.kind.as_str(),
                pattern.title,
                pattern.description
            ));
        }
    }

    format!(
        r#"{}
Weekly facts computed by the app:
{}
Write a short, warm weekly digest for the owner. Do not change any numbers.
Reply using exactly these labels, each on its own line:
HEADLINE: one sentence
HIGHLIGHTS:
- one positive point per line
CONCERNS:
- one concern per line, or nothing if there are none"#,
        context.render(),
        facts
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PetProfile;
    use chrono::{TimeZone, Utc};
    use pawlog_core::models::{
        DateRange, HealthScore, Pattern, PatternKind, ScoreLabel, WindowAggregate,
    };

    fn context() -> AssistantContext {
        AssistantContext {
            profile: PetProfile {
                name: "Biscuit".into(),
                species: "dog".into(),
                breed: None,
                age_years: Some(4),
                weight_kg: None,
            },
            recent_events: vec!["2026-06-05 08:00 walk: 30 min".into()],
        }
    }

    #[test]
    fn test_question_prompt() {
        let prompt = question_prompt(&context(), "  Is she walking enough? ");
        assert!(prompt.contains("Pet: Biscuit (dog), 4 years old"));
        assert!(prompt.contains("\"Is she walking enough?\""));
        assert!(prompt.contains("walk: 30 min"));
    }

    #[test]
    fn test_structured_prompts_name_their_labels() {
        let triage = triage_prompt(&context(), "vomited twice");
        for label in ["TITLE:", "URGENCY:", "SUMMARY:", "ACTIONS:", "WARNING SIGNS:"] {
            assert!(triage.contains(label), "missing {}", label);
        }

        let plan = care_plan_prompt(&context(), "lose 1 kg");
        for label in ["TITLE:", "DURATION:", "SUMMARY:", "STEPS:", "TIPS:"] {
            assert!(plan.contains(label), "missing {}", label);
        }
    }

    #[test]
    fn test_digest_prompt_carries_engine_numbers() {
        let end = Utc.with_ymd_and_hms(2026, 6, 8, 0, 0, 0).unwrap();
        let range = DateRange::trailing_days(end, 7);
        let mut current = WindowAggregate::empty("p", range);
        current.total_events = 12;
        current.activity_minutes = 240;
        current.average_mood = Some(4.4);

        let insights = WeeklyInsights {
            current,
            previous: WindowAggregate::empty("p", range.preceding()),
            patterns: vec![Pattern {
                kind: PatternKind::Positive,
                title: "Activity Increase".into(),
                description: "Activity increased by 100% compared to last week.".into(),
                recommendation: "Great job keeping Biscuit active!".into(),
            }],
            score: HealthScore {
                overall: 82,
                activity: 90,
                nutrition: 80,
                wellness: 85,
                consistency: 70,
                label: ScoreLabel::Excellent,
            },
            logging_streak: 5,
        };

        let prompt = digest_prompt(&context(), &insights);
        assert!(prompt.contains("Health score: 82 (Excellent)"));
        assert!(prompt.contains("240 activity minutes (previous week 0)"));
        assert!(prompt.contains("Average mood: 4.4/5"));
        assert!(prompt.contains("[positive] Activity Increase"));
        assert!(prompt.contains("HEADLINE:"));
    }
}
