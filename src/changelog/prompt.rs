//! Prompt text for synthesis and revision

use schemars::schema_for;

use crate::types::{Changelog, PullRequest};

/// Separator placed between rendered pull requests
pub const PR_SEPARATOR: &str = "\n---\n";

/// Fixed system instruction for the revision chat
pub const REVISION_SYSTEM_INSTRUCTION: &str = "You are Aria, an AI assistant specializing in refining changelogs. \
The user will provide a changelog in JSON format and a request to edit it.
Your task is to apply the user's request to the JSON object.
You MUST ONLY respond with the updated JSON object, adhering strictly to the original schema.
Do not include any other text, markdown formatting, or explanations in your response. Just the raw, updated JSON.";

/// Render PRs for the synthesis prompt
pub fn render_pull_requests(pull_requests: &[PullRequest]) -> String {
    pull_requests
        .iter()
        .map(PullRequest::prompt_block)
        .collect::<Vec<_>>()
        .join(PR_SEPARATOR)
}

/// Build the one-shot synthesis prompt for a batch of PRs
pub fn create_synthesis_prompt(pull_requests: &[PullRequest], version: &str) -> String {
    format!(
        "You are an expert technical writer creating release changelogs.
Analyze the following pull requests and generate a concise, human-readable changelog for version {version}.
Rules:
1. Categorize each PR into exactly one of \"features\", \"fixes\", or \"improvements\".
2. Rewrite the PR title and description into a clear, single-sentence summary from a user's perspective. Focus on the value delivered.
3. Exclude PR numbers, authors, and internal jargon.
4. Ignore trivial PRs (e.g., minor doc typos).
5. Return only a JSON object matching the schema, with no surrounding text.

Pull Request Data:
{}",
        render_pull_requests(pull_requests)
    )
}

/// System instruction for a revision session, with the schema spelled out
pub fn create_revision_system_instruction() -> String {
    let schema = serde_json::to_string_pretty(&schema_for!(Changelog)).unwrap_or_default();
    format!("{REVISION_SYSTEM_INSTRUCTION}\n\nThe JSON object must match this schema exactly:\n{schema}")
}

/// Build one revision turn: the literal instruction plus the full current changelog
pub fn create_revision_turn(instruction: &str, current: &Changelog) -> String {
    let json = serde_json::to_string(current).unwrap_or_else(|_| "{}".to_string());
    format!("User request: \"{instruction}\". Current changelog JSON: {json}")
}
