use crate::intake::ValidatedIntake;
use crate::locale::PromptLabels;

/// Renders the intake into the message sent to the agent. Line order and
/// labels are what the agent is instructed against, so keep them stable.
pub fn render_prompt(intake: &ValidatedIntake, labels: &PromptLabels) -> String {
    let mut lines = vec![
        labels.heading.to_string(),
        format!("- {}: {}", labels.gender, intake.gender),
        format!("- {}: {}", labels.age, intake.age),
        format!("- {}: {}", labels.allergies, intake.allergies),
        format!("- {}: {}", labels.diagnosis, intake.diagnosis),
        format!("- {}: {}", labels.prescriptions, intake.prescriptions),
    ];
    if let Some(other) = &intake.other {
        lines.push(format!("- {}: {}", labels.other, other));
    }

    let mut prompt = lines.join("\n");
    prompt.push('\n');
    prompt
}
