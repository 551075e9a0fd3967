//! Prompt templates for RAG generation

/// Prompt builder for grounded answers
pub struct PromptBuilder;

impl PromptBuilder {
    /// Serialize retrieved documents, most relevant first
    pub fn build_context(documents: &[String]) -> String {
        if documents.is_empty() {
            return "(no documents were found for this question)".to_string();
        }

        documents
            .iter()
            .enumerate()
            .map(|(i, doc)| format!("[{}] {}", i + 1, doc.trim()))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }

    /// Build the system prompt: persona, grounding rules, answer-only directive, then the data
    pub fn build_system_prompt(documents: &[String], domain_instructions: &str) -> String {
        format!(
            r#"{domain_instructions}
You only answer based on the knowledge I provide you. You do not use your internal knowledge and you do not make things up.
If you don't know the answer, just say: I don't know

IMPORTANT: You must provide ONLY the direct answer to the question without showing your reasoning or thought process.
Keep your response concise and to the point. Do not start with phrases like "Based on the information provided" or "According to the data".
--------------------
The data:
{context}
"#,
            domain_instructions = domain_instructions.trim(),
            context = Self::build_context(documents)
        )
    }
}
