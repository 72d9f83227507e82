//! Prompt construction for the audit step.

use crate::domain::AuditDocument;
use serde_json::Value;

/// Persona and output rules sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are a professional financial auditing assistant. \
You are reviewing structured document data (e.g., invoices, purchase orders, commission sheets, and expense reports). \
Your responsibilities are:\n\
- Detect mathematical errors (e.g., incorrect totals, taxes, or commission percentages).\n\
- Detect missing approvals, misaligned values, or inconsistencies across entries.\n\
- Highlight typos that affect dates or financial correctness.\n\
- Format your audit report cleanly in Markdown (e.g., `## Document Name`, bullet lists, bold totals).\n\
- Do not include emojis, casual tone, or promotional content.\n\
- If a document has no financial relevance, respond with: '**No financial audit is required for the provided documents.**'\n\
You must always remain objective, accurate, and formal in your tone.";

/// Task description placed ahead of the document extracts.
pub const AUDIT_INSTRUCTIONS: &str = "You are a professional financial auditor. \
You are given multiple structured document extracts, such as invoices, purchase orders, expense reports, and commission summaries. \
For each document, do the following:\n\
- Identify the type of document (invoice, PO, report, etc.).\n\
- Recalculate totals, taxes, and commissions based on the line-item data.\n\
- Flag discrepancies if the totals do not match expected calculations.\n\
- Highlight typographical errors (e.g., date or figure formatting mistakes).\n\
- Identify missing approvals, inconsistent entries, or unusual financial behavior.\n\
- If the document does not include any financial, procurement, or expense-related data, state: \
'**No financial audit is required for the provided documents.**'\n\
- Format your response using clear Markdown with headers and bullet points.\n\n\
Do not guess — base your assessment strictly on the data in the documents.\n\n";

/// Flattens one document into the plain-text block the model reads.
pub fn format_document(doc: &AuditDocument) -> String {
    if let Some(data) = &doc.structured_data {
        return format!(
            "FILE: {}\n--- STRUCTURED DATA ---\n{}\n",
            doc.file_name,
            structured_lines(data).join("\n")
        );
    }

    let lines = doc.text_lines.join("\n");
    let fields = doc
        .form_fields
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n");
    let table = doc
        .table_cells
        .iter()
        .map(|cell| format!("Row {} Col {}: {}", cell.row, cell.col, cell.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "FILE: {}\n--- TEXT ---\n{lines}\n\n--- FORM FIELDS ---\n{fields}\n\n--- TABLE CELLS ---\n{table}\n",
        doc.file_name
    )
}

/// Builds the user message for a batch of documents.
pub fn build_prompt(documents: &[AuditDocument]) -> String {
    let formatted: Vec<String> = documents.iter().map(format_document).collect();
    format!("{AUDIT_INSTRUCTIONS}{}\n\nAudit Summary:", formatted.join("\n"))
}

/// One line per record for arrays, one `key: value` line per entry for objects.
fn structured_lines(data: &Value) -> Vec<String> {
    match data {
        Value::Array(rows) => rows.iter().map(render_value).collect(),
        Value::Object(entries) => entries
            .iter()
            .map(|(key, value)| format!("{key}: {}", render_value(value)))
            .collect(),
        Value::Null => Vec::new(),
        other => vec![render_value(other)],
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
