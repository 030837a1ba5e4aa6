// Tabular Extractor: turns the success-search bullet list into records
//
// The grammar is intentionally loose about whitespace and strict about labels.
// Lines that do not match are dropped without error: the model's formatting is
// not reliable and a short table is an acceptable outcome.

use crate::models::SuccessPersonRecord;
use regex::Regex;
use std::sync::OnceLock;

/// One record per line:
///
/// ```text
/// * Nome: <name> | Profissão: <profession> | Sucesso: <success> | Site: <url>
/// ```
///
/// The bullet may be `*`, `-` or `•`, optionally indented. Each match is
/// confined to a single line; a trailing `\r` is tolerated.
const RECORD_PATTERN: &str = r"(?m)^[ \t]*[*•-][ \t]*Nome:[ \t]*(.*?)[ \t]*\|[ \t]*Profissão:[ \t]*(.*?)[ \t]*\|[ \t]*Sucesso:[ \t]*(.*?)[ \t]*\|[ \t]*Site:[ \t]*(.*?)[ \t\r]*$";

/// Column headers used when the table is rendered for people.
pub const COLUMNS: [&str; 4] = ["Nome", "Profissão", "Sucesso", "Site da Informação"];

fn record_regex() -> &'static Regex {
    static RECORD_RE: OnceLock<Regex> = OnceLock::new();
    RECORD_RE.get_or_init(|| Regex::new(RECORD_PATTERN).expect("record pattern is valid"))
}

/// Ordered collection of extracted records. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuccessTable {
    records: Vec<SuccessPersonRecord>,
}

impl SuccessTable {
    pub fn new(records: Vec<SuccessPersonRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SuccessPersonRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SuccessPersonRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<SuccessPersonRecord> {
        self.records
    }

    /// Renders the records back into the bullet grammar `extract` reads.
    pub fn to_bullet_text(&self) -> String {
        self.records
            .iter()
            .map(|r| {
                format!(
                    "* Nome: {} | Profissão: {} | Sucesso: {} | Site: {}\n",
                    r.name, r.profession, r.success, r.source
                )
            })
            .collect()
    }

    /// Markdown pipe table with the four display columns.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("| {} |\n", COLUMNS.join(" | "));
        out.push_str("| --- | --- | --- | --- |\n");
        for r in &self.records {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                escape_cell(&r.name),
                escape_cell(&r.profession),
                escape_cell(&r.success),
                escape_cell(&r.source)
            ));
        }
        out
    }
}

impl<'a> IntoIterator for &'a SuccessTable {
    type Item = &'a SuccessPersonRecord;
    type IntoIter = std::slice::Iter<'a, SuccessPersonRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Extracts every well-formed record line, in order of appearance.
pub fn extract(text: &str) -> SuccessTable {
    let records = record_regex()
        .captures_iter(text)
        .map(|caps| {
            SuccessPersonRecord::new(
                caps[1].trim(),
                caps[2].trim(),
                caps[3].trim(),
                caps[4].trim(),
            )
        })
        .collect();

    SuccessTable::new(records)
}

/// Counts bullet lines that look like an attempted record (they carry a
/// `Nome:` label) but were rejected by the grammar.
pub fn discarded_candidates(text: &str) -> usize {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            trimmed.starts_with(['*', '-', '•']) && trimmed.contains("Nome:")
        })
        .filter(|line| !record_regex().is_match(line))
        .count()
}
