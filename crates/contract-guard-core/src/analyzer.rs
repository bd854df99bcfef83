use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::catalog::{AnalysisContext, Catalog};
use crate::matcher::{evaluate_document, Document, Match};

/// Basic counters over the analyzed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Length in characters.
    pub chars: usize,
    pub bytes: usize,
    pub words: usize,
    pub lines: usize,
}

impl DocumentStats {
    pub fn of(text: &str) -> Self {
        Self {
            chars: text.chars().count(),
            bytes: text.len(),
            words: text.split_whitespace().count(),
            lines: text.lines().count(),
        }
    }
}

/// Matches in catalog order plus document statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub matches: Vec<Match>,
    pub stats: DocumentStats,
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("failed to build keyword automaton from catalog")]
    Automaton(#[from] aho_corasick::BuildError),
}

/// Runs every catalog rule against a document.
///
/// Holds no per-call state, so one analyzer can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct ContractAnalyzer {
    catalog: Arc<Catalog>,
    automaton: AhoCorasick,
    keywords: Vec<String>,
}

impl ContractAnalyzer {
    pub fn new(catalog: Arc<Catalog>) -> Result<Self, AnalyzerError> {
        let keywords: Vec<String> = catalog
            .rules()
            .iter()
            .flat_map(|rule| rule.keywords_any.iter().chain(&rule.keywords_all))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let automaton = AhoCorasick::new(&keywords)?;
        Ok(Self {
            catalog,
            automaton,
            keywords,
        })
    }

    /// Analyzer over the built-in catalog.
    pub fn builtin() -> Result<Self, AnalyzerError> {
        Self::new(Arc::new(Catalog::builtin().clone()))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[instrument(
        name = "analyze_contract",
        skip(self, text),
        fields(input_len = text.len(), sector = %context.sector, role = %context.role)
    )]
    pub fn analyze(&self, text: &str, context: &AnalysisContext) -> Analysis {
        let stats = DocumentStats::of(text);
        let document = Document::new(text);
        let present = self.keywords_present(document.lowered());
        trace!(keywords = present.len(), "keyword scan completed");

        let matches: Vec<Match> = self
            .catalog
            .rules()
            .iter()
            .filter_map(|rule| {
                let found =
                    evaluate_document(rule, &document, context, |kw| present.contains(kw));
                if found.is_some() {
                    trace!(rule = %rule.name, "rule matched");
                }
                found
            })
            .collect();

        debug!(matches = matches.len(), chars = stats.chars, "analysis completed");
        Analysis { matches, stats }
    }

    fn keywords_present(&self, lowered: &str) -> HashSet<&str> {
        self.automaton
            .find_overlapping_iter(lowered)
            .map(|mat| self.keywords[mat.pattern().as_usize()].as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AppliesTo, Role, Rule, Sector, Severity};

    fn rule(name: &str, any: &[&str], all: &[&str]) -> Rule {
        Rule {
            name: name.into(),
            description: format!("{name} description"),
            sector: Sector::Generic,
            applies_to: AppliesTo::Both,
            keywords_any: any.iter().map(|k| k.to_string()).collect(),
            keywords_all: all.iter().map(|k| k.to_string()).collect(),
            severity: Severity::Medium,
            suggestion: "review".into(),
            emit_evidence: true,
        }
    }

    fn analyzer(rules: Vec<Rule>) -> ContractAnalyzer {
        ContractAnalyzer::new(Arc::new(Catalog::new(rules).unwrap())).unwrap()
    }

    #[test]
    fn preserves_catalog_order() {
        let analyzer = analyzer(vec![
            rule("SECOND_IN_TEXT", &["renewal"], &[]),
            rule("FIRST_IN_TEXT", &["penalty"], &[]),
        ]);
        let analysis = analyzer.analyze(
            "A penalty applies, followed by automatic renewal.",
            &AnalysisContext::default(),
        );
        let titles: Vec<_> = analysis.matches.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["SECOND_IN_TEXT", "FIRST_IN_TEXT"]);
    }

    #[test]
    fn overlapping_keywords_are_all_detected() {
        let analyzer = analyzer(vec![
            rule("SHORT", &["renew"], &[]),
            rule("LONG", &["automatic renewal"], &["renewal"]),
        ]);
        let analysis = analyzer.analyze("Automatic Renewal", &AnalysisContext::default());
        assert_eq!(analysis.matches.len(), 2);
    }

    #[test]
    fn agrees_with_single_rule_evaluation() {
        let analyzer = ContractAnalyzer::builtin().unwrap();
        let text = "The Lender may, at its sole discretion, declare the balance immediately due. \
                    A late fee applies and compound interest accrues. Personal data may be \
                    shared with third parties. Disputes go to binding arbitration.";
        let ctx = AnalysisContext::new(Sector::Loans, Role::Requester);
        let expected: Vec<_> = analyzer
            .catalog()
            .rules()
            .iter()
            .filter_map(|rule| crate::matcher::evaluate(rule, text, &ctx))
            .collect();
        assert_eq!(analyzer.analyze(text, &ctx).matches, expected);
    }

    #[test]
    fn empty_text_yields_no_matches() {
        let analyzer = ContractAnalyzer::builtin().unwrap();
        let analysis = analyzer.analyze("", &AnalysisContext::default());
        assert!(analysis.matches.is_empty());
        assert_eq!(analysis.stats, DocumentStats::default());
    }

    #[test]
    fn stats_count_characters_not_bytes() {
        let stats = DocumentStats::of("Cláusula única\nsegunda linha");
        assert_eq!(stats.chars, 28);
        assert_eq!(stats.bytes, 30);
        assert_eq!(stats.words, 4);
        assert_eq!(stats.lines, 2);
    }
}
