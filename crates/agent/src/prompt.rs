//! Prompt assembly shared by the generating agents.
//!
//! Layout, with empty blocks omitted:
//!
//! ```text
//! [Agent: <name>]
//!
//! --- FIFO Memory (oldest->newest) ---
//! <memory context>
//!
//! --- Extra Context ---
//! <extra context>
//!
//! --- User Input ---
//! <input>
//!
//! Provide a concise, useful response (3-6 sentences).
//!
//! Task: <instruction>
//! ```

use neuroqueue_core::retrieval::RetrievedDocument;

use crate::controller::AgentOutput;

pub const RESPONSE_LENGTH_INSTRUCTION: &str =
    "Provide a concise, useful response (3-6 sentences).";

pub const PLAN_TASK: &str = "Break the user's request into 3 ordered sub-tasks (bullet list).";
pub const ANALYZE_TASK: &str = "Extract 2–3 key insights or facts relevant to the user request.";
pub const SYNTHESIZE_TASK: &str =
    "Write a concise final summary in 4–8 sentences that synthesizes the above.";

/// Characters of each retrieved document quoted into a prompt.
pub const RETRIEVED_EXCERPT_CHARS: usize = 300;

/// Base prompt for `agent_name`; see the module docs for the layout.
pub fn build_prompt(agent_name: &str, memory_context: &str, extra_context: &str, input: &str) -> String {
    let mut prompt = format!("[Agent: {agent_name}]\n");
    if !memory_context.is_empty() {
        prompt.push_str(&format!(
            "\n--- FIFO Memory (oldest->newest) ---\n{memory_context}\n"
        ));
    }
    if !extra_context.is_empty() {
        prompt.push_str(&format!("\n--- Extra Context ---\n{extra_context}\n"));
    }
    prompt.push_str(&format!(
        "\n--- User Input ---\n{input}\n\n{RESPONSE_LENGTH_INSTRUCTION}"
    ));
    prompt
}

/// Append a task instruction to an assembled prompt.
pub fn with_task(prompt: String, instruction: &str) -> String {
    format!("{prompt}\n\nTask: {instruction}")
}

/// Ranked excerpt block for retrieved documents.
pub fn retrieved_block(documents: &[RetrievedDocument]) -> String {
    let mut block = String::from("\n--- Retrieved Documents (RAG) ---\n");
    for (rank, doc) in documents.iter().enumerate() {
        block.push_str(&format!(
            "\n[Doc {}, Score: {:.3}]\n{}\n",
            rank + 1,
            doc.score,
            truncate_chars(&doc.content, RETRIEVED_EXCERPT_CHARS)
        ));
    }
    block
}

/// Prompt asking the generator to reconcile divergent agent outputs.
pub fn consensus_prompt(outputs: &[AgentOutput]) -> String {
    let mut prompt = String::from("Given these agent responses, provide a consensus synthesis:\n\n");
    for out in outputs {
        prompt.push_str(&format!("[{}]: {}\n\n", out.agent, out.output));
    }
    prompt.push_str("Provide a unified, balanced consensus response.");
    prompt
}

/// The first `max` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
