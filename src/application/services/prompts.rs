pub fn requirement_prompt(document_name: &str, section_number: &str, text: &str) -> String {
    format!(
        r#"You are analyzing the "{document_name}" compliance document.
Below is text from document Section {section_number}:

Section {section_number}: {text}

Identify ONLY enforceable compliance requirements that organizations MUST follow.
A requirement is a mandatory obligation stated with enforcement language such as
"shall", "must", "will", "is required to", "shall not" or "must not".

Do not include:
- titles, names or introductory statements of the document
- section headers, chapter titles or numbering
- definitions or explanatory text without enforcement language
- permissions or discretionary language ("may", "can", "could")
- general principles without a specific mandate

If the text contains no enforceable requirement, return an empty array [].

Output a JSON array where each item has:
- requirement_title: a descriptive title for the requirement
- article_number: "{section_number}"
- priority: "high" for core mandates, "medium" for procedural requirements, "low" for administrative items
- requirement: the concise requirement statement
- requirement_description: a brief description of what the requirement means

Requirements in this section (JSON array, [] if none found):"#
    )
}

pub fn control_prompt(requirement: &str) -> String {
    format!(
        r#"For the following compliance requirement, suggest appropriate controls.

Requirement: {requirement}

Output a JSON array where each item has:
- priority: "high", "medium" or "low"
- control_title: a descriptive title for the control
- control: a detailed description of the control

Suggested controls (JSON array):"#
    )
}
