use netinsight_vector_store::RankedResult;

/// Concatenate ranked documents, best first, one per line.
#[must_use]
pub fn join_context(results: &[RankedResult]) -> String {
    results
        .iter()
        .map(|r| r.document.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt handed to the answer-generating model.
#[must_use]
pub fn build_prompt(context: &str, question: &str) -> String {
    format!("Context: {context}\n\nQuestion: {question}\n\nAnswer:")
}
