use serde::{Deserialize, Serialize};

use crate::catalog::{AnalysisContext, Rule, Sector, Severity};

/// Characters of original text kept before the triggering keyword.
pub const EVIDENCE_BEFORE: usize = 120;
/// Characters of original text kept from the triggering keyword onwards.
pub const EVIDENCE_AFTER: usize = 200;

/// A rule that fired against a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub title: String,
    pub severity: Severity,
    pub explanation: String,
    pub suggestion: String,
    /// Excerpt of the original text around the first keyword found; empty when
    /// the rule does not emit evidence.
    pub evidence: String,
}

/// Lowercased view of a text that can map positions back to the original.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    original: &'a str,
    lowered: String,
    /// Character index in `original` for each byte of `lowered`.
    origins: Vec<usize>,
    char_len: usize,
}

impl<'a> Document<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut lowered = String::with_capacity(original.len());
        let mut origins = Vec::with_capacity(original.len());
        let mut char_len = 0;
        for (idx, ch) in original.chars().enumerate() {
            for lower in ch.to_lowercase() {
                origins.extend(std::iter::repeat(idx).take(lower.len_utf8()));
                lowered.push(lower);
            }
            char_len += 1;
        }
        Self {
            original,
            lowered,
            origins,
            char_len,
        }
    }

    pub fn lowered(&self) -> &str {
        &self.lowered
    }

    /// Length of the original text in characters.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.lowered.contains(keyword)
    }

    /// Character position in the original text of the first occurrence of `keyword`.
    pub fn position(&self, keyword: &str) -> Option<usize> {
        self.lowered
            .find(keyword)
            .and_then(|byte| self.origins.get(byte).copied())
    }

    /// Window of the original text around a character position, clipped to bounds.
    pub fn window(&self, position: usize, before: usize, after: usize) -> &'a str {
        let start = position.saturating_sub(before);
        let end = position.saturating_add(after).min(self.char_len);
        let start_byte = char_to_byte(self.original, start);
        let end_byte = char_to_byte(self.original, end);
        &self.original[start_byte..end_byte.max(start_byte)]
    }
}

fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Evaluate one rule against raw text.
pub fn evaluate(rule: &Rule, text: &str, context: &AnalysisContext) -> Option<Match> {
    let document = Document::new(text);
    evaluate_document(rule, &document, context, |keyword| document.contains(keyword))
}

/// Evaluate one rule against an already normalized document.
///
/// `present` answers whether a lowercase keyword occurs anywhere in the document,
/// which lets the analyzer answer it from a single multi-pattern scan.
pub fn evaluate_document<F>(
    rule: &Rule,
    document: &Document<'_>,
    context: &AnalysisContext,
    present: F,
) -> Option<Match>
where
    F: Fn(&str) -> bool,
{
    if rule.sector != Sector::Generic && rule.sector != context.sector {
        return None;
    }
    if !rule.applies_to.admits(context.role) {
        return None;
    }
    if !rule.keywords_all.iter().all(|keyword| present(keyword.as_str())) {
        return None;
    }
    if !rule.keywords_any.iter().any(|keyword| present(keyword.as_str())) {
        return None;
    }

    let evidence = if rule.emit_evidence {
        rule.keywords_any
            .iter()
            .find_map(|keyword| document.position(keyword))
            .map(|position| {
                document
                    .window(position, EVIDENCE_BEFORE, EVIDENCE_AFTER)
                    .to_string()
            })
            .unwrap_or_default()
    } else {
        String::new()
    };

    Some(Match {
        title: rule.name.clone(),
        severity: rule.severity,
        explanation: rule.description.clone(),
        suggestion: rule.suggestion.clone(),
        evidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AppliesTo, Role};

    fn rule() -> Rule {
        Rule {
            name: "Termination penalty".into(),
            description: "fine on early exit".into(),
            sector: Sector::Loans,
            applies_to: AppliesTo::Requester,
            keywords_any: vec!["penalty".into(), "fine".into()],
            keywords_all: vec!["terminat".into()],
            severity: Severity::High,
            suggestion: "cap it".into(),
            emit_evidence: true,
        }
    }

    fn loans_requester() -> AnalysisContext {
        AnalysisContext::new(Sector::Loans, Role::Requester)
    }

    #[test]
    fn fires_when_every_filter_passes() {
        let text = "Early TERMINATION carries a Penalty of two installments.";
        let found = evaluate(&rule(), text, &loans_requester()).expect("rule should fire");
        assert_eq!(found.title, "Termination penalty");
        assert_eq!(found.severity, Severity::High);
        assert_eq!(found.evidence, text);
    }

    #[test]
    fn sector_mismatch_blocks_match() {
        let text = "termination penalty";
        let ctx = AnalysisContext::new(Sector::Education, Role::Requester);
        assert!(evaluate(&rule(), text, &ctx).is_none());
    }

    #[test]
    fn generic_rules_ignore_context_sector() {
        let mut generic = rule();
        generic.sector = Sector::Generic;
        let ctx = AnalysisContext::new(Sector::HealthPlan, Role::Requester);
        assert!(evaluate(&generic, "termination penalty", &ctx).is_some());
    }

    #[test]
    fn role_filter_requires_exact_role_unless_both() {
        let text = "termination penalty";
        let other = AnalysisContext::new(Sector::Loans, Role::Other);
        assert!(evaluate(&rule(), text, &other).is_none());

        let mut both = rule();
        both.applies_to = AppliesTo::Both;
        assert!(evaluate(&both, text, &other).is_some());
    }

    #[test]
    fn all_of_keywords_are_required() {
        assert!(evaluate(&rule(), "a penalty applies", &loans_requester()).is_none());
    }

    #[test]
    fn any_of_keywords_are_required() {
        assert!(evaluate(&rule(), "termination is free", &loans_requester()).is_none());
    }

    #[test]
    fn evidence_uses_first_declared_keyword_not_first_position() {
        let text = format!("fine {} penalty", "x".repeat(300));
        let found = evaluate(&rule(), &format!("terminate {text}"), &loans_requester()).unwrap();
        assert!(found.evidence.contains("penalty"));
        assert!(!found.evidence.starts_with("terminate"));
    }

    #[test]
    fn evidence_window_is_clipped_to_120_before_and_200_after() {
        let text = format!(
            "{}termination penalty{}",
            "a".repeat(500),
            "b".repeat(500)
        );
        let found = evaluate(&rule(), &text, &loans_requester()).unwrap();
        assert_eq!(found.evidence.chars().count(), EVIDENCE_BEFORE + EVIDENCE_AFTER);
        let keyword_at = found.evidence.find("penalty").unwrap();
        assert_eq!(keyword_at, EVIDENCE_BEFORE);
        assert!(text.contains(&found.evidence));
    }

    #[test]
    fn evidence_is_cut_from_original_text_on_char_boundaries() {
        let text = "Cláusula: em caso de TERMINATION, PENALTY de 10% - ÉTÉ.";
        let found = evaluate(&rule(), text, &loans_requester()).unwrap();
        assert!(text.contains(&found.evidence));
        assert!(found.evidence.contains("PENALTY"));
    }

    #[test]
    fn no_evidence_when_disabled() {
        let mut quiet = rule();
        quiet.emit_evidence = false;
        let found = evaluate(&quiet, "termination penalty", &loans_requester()).unwrap();
        assert!(found.evidence.is_empty());
    }

    #[test]
    fn empty_text_never_matches() {
        assert!(evaluate(&rule(), "", &loans_requester()).is_none());
    }

    #[test]
    fn document_maps_expanding_lowercase_back_to_original() {
        // 'İ' lowercases to two chars ("i̇"), shifting byte offsets.
        let doc = Document::new("İİ penalty");
        assert_eq!(doc.position("penalty"), Some(3));
        assert_eq!(doc.window(3, 1, 7), " penalty");
        assert_eq!(doc.window(3, 2, 4), "İ pena");
    }
}
