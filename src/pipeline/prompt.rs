pub const ADVISORY_SYSTEM_PROMPT: &str = r#"
You are a clinical triage assistant for a malaria symptom checker. You are
NOT a medical doctor and you NEVER diagnose.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Base the advisory ONLY on the symptoms provided.
2. Frame every condition as a possibility, never as a diagnosis.
3. Always direct the patient toward professional medical consultation.
4. Keep the advisory brief and plainly worded.
5. Use EXACTLY the section structure requested, in the order requested.
6. Respond in Markdown.
"#;

/// Build the advisory prompt for one intake. Same symptoms in, same prompt
/// out; the section order is fixed so downstream rendering can rely on it.
pub fn build_advisory_prompt(symptoms: &str) -> String {
    format!(
        r#"A patient has described the following symptoms:

<symptoms>
{symptoms}
</symptoms>

Write a short advisory with exactly these Markdown sections, in this order:

**Likely Conditions:**
A bulleted list of conditions commonly associated with these symptoms.

**Malaria Probability:**
One or two sentences on how plausible malaria is given these symptoms.

**Recommended Specialist:**
The kind of doctor the patient should consult.

**Next Steps:**
What the patient should do now, including any tests worth requesting.

**Disclaimer:**
A bolded reminder that this advisory is not a medical diagnosis and that a
qualified clinician must be consulted.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_symptom_text() {
        let prompt = build_advisory_prompt("fever and chills for three days");
        assert!(prompt.contains("fever and chills for three days"));
        assert!(prompt.contains("<symptoms>"));
        assert!(prompt.contains("</symptoms>"));
    }

    #[test]
    fn prompt_requests_every_section_in_order() {
        let prompt = build_advisory_prompt("headache");
        let sections = [
            "**Likely Conditions:**",
            "**Malaria Probability:**",
            "**Recommended Specialist:**",
            "**Next Steps:**",
            "**Disclaimer:**",
        ];
        let mut last = 0;
        for section in sections {
            let pos = prompt.find(section).unwrap_or_else(|| panic!("missing {section}"));
            assert!(pos > last, "{section} out of order");
            last = pos;
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_advisory_prompt("nausea"), build_advisory_prompt("nausea"));
    }

    #[test]
    fn system_prompt_forbids_diagnosis() {
        assert!(ADVISORY_SYSTEM_PROMPT.contains("NOT a medical doctor"));
        assert!(ADVISORY_SYSTEM_PROMPT.contains("NEVER diagnose"));
        assert!(ADVISORY_SYSTEM_PROMPT.contains("Markdown"));
    }
}
