use std::{collections::HashSet, fmt, str::FromStr};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod builtin;
pub mod file_repository;

/// Contract domain used to scope sector-specific rules.
///
/// Deserializes through [`FromStr`], so config files and rule packs accept the
/// same spellings and aliases as command-line flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Sector {
    /// Applies to every contract regardless of the requested sector.
    #[default]
    Generic,
    Loans,
    Education,
    HealthPlan,
    /// SaaS and general service agreements.
    Services,
}

impl Sector {
    pub const ALL: [Sector; 5] = [
        Sector::Generic,
        Sector::Loans,
        Sector::Education,
        Sector::HealthPlan,
        Sector::Services,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Sector::Generic => "Generic",
            Sector::Loans => "Loans",
            Sector::Education => "Education",
            Sector::HealthPlan => "Health Plan",
            Sector::Services => "SaaS/Services",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown sector `{0}` (expected generic, loans, education, health_plan or services)")]
pub struct ParseSectorError(pub String);

impl TryFrom<String> for Sector {
    type Error = ParseSectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Sector {
    type Err = ParseSectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' ' | '/'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "generic" | "general" => Ok(Sector::Generic),
            "loans" | "loan" | "credit" => Ok(Sector::Loans),
            "education" | "school" => Ok(Sector::Education),
            "healthplan" | "health" => Ok(Sector::HealthPlan),
            "services" | "service" | "saas" | "saasservices" => Ok(Sector::Services),
            _ => Err(ParseSectorError(s.to_string())),
        }
    }
}

/// Party a rule protects when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliesTo {
    Requester,
    Provider,
    Both,
}

impl AppliesTo {
    /// Whether a rule scoped to `self` should be evaluated for `role`.
    pub fn admits(self, role: Role) -> bool {
        match self {
            AppliesTo::Both => true,
            AppliesTo::Requester => role == Role::Requester,
            AppliesTo::Provider => role == Role::Provider,
        }
    }
}

impl fmt::Display for AppliesTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AppliesTo::Requester => "requester",
            AppliesTo::Provider => "provider",
            AppliesTo::Both => "both",
        })
    }
}

/// Party on whose behalf an analysis runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Role {
    Requester,
    Provider,
    /// Unrestricted: only rules that apply to both parties are considered.
    #[default]
    Other,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Requester => "requester",
            Role::Provider => "provider",
            Role::Other => "other",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role `{0}` (expected requester, provider or other)")]
pub struct ParseRoleError(pub String);

impl TryFrom<String> for Role {
    type Error = ParseRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "requester" | "customer" | "client" | "consumer" => Ok(Role::Requester),
            "provider" | "supplier" | "vendor" => Ok(Role::Provider),
            "other" | "any" | "" => Ok(Role::Other),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Qualitative weight of a risk pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        })
    }
}

/// Sector and role selected by the caller for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisContext {
    #[serde(default)]
    pub sector: Sector,
    #[serde(default)]
    pub role: Role,
}

impl AnalysisContext {
    pub fn new(sector: Sector, role: Role) -> Self {
        Self { sector, role }
    }
}

fn default_emit_evidence() -> bool {
    true
}

/// Declarative description of one contract-risk pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Short title, unique within a catalog.
    pub name: String,
    /// Explanation of the risk shown to the reader.
    pub description: String,
    #[serde(default)]
    pub sector: Sector,
    pub applies_to: AppliesTo,
    /// Lowercase substrings; at least one must occur in the text.
    pub keywords_any: Vec<String>,
    /// Lowercase substrings that must all occur in the text.
    #[serde(default)]
    pub keywords_all: Vec<String>,
    pub severity: Severity,
    pub suggestion: String,
    #[serde(default = "default_emit_evidence")]
    pub emit_evidence: bool,
}

impl Rule {
    /// Validate invariants for rule definitions loaded from any source.
    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if self.name.trim().is_empty() {
            return Err(RuleValidationError::EmptyName);
        }
        if self.keywords_any.is_empty() {
            return Err(RuleValidationError::NoKeywords {
                rule: self.name.clone(),
            });
        }
        for keyword in self.keywords_any.iter().chain(&self.keywords_all) {
            if keyword.trim().is_empty() {
                return Err(RuleValidationError::BlankKeyword {
                    rule: self.name.clone(),
                });
            }
            if keyword.to_lowercase() != *keyword {
                return Err(RuleValidationError::KeywordNotLowercase {
                    rule: self.name.clone(),
                    keyword: keyword.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Errors emitted while validating rule definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleValidationError {
    #[error("rule name must not be blank")]
    EmptyName,
    #[error("rule `{rule}` must declare at least one keyword in keywords_any")]
    NoKeywords { rule: String },
    #[error("rule `{rule}` contains a blank keyword")]
    BlankKeyword { rule: String },
    #[error("rule `{rule}` keyword `{keyword}` must be lowercase")]
    KeywordNotLowercase { rule: String, keyword: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    InvalidRule(#[from] RuleValidationError),
    #[error("duplicate rule name `{0}`")]
    DuplicateName(String),
}

static BUILTIN: Lazy<Catalog> = Lazy::new(|| Catalog {
    rules: builtin::rules(),
});

/// Ordered, immutable collection of rules. Evaluation order is declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    rules: Vec<Rule>,
}

impl Catalog {
    pub fn new(rules: Vec<Rule>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            rule.validate()?;
            if !seen.insert(rule.name.as_str()) {
                return Err(CatalogError::DuplicateName(rule.name.clone()));
            }
        }
        Ok(Self { rules })
    }

    /// The hand-authored catalog shipped with the crate.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// A new catalog with `extra` appended after the current rules.
    pub fn extended(&self, extra: impl IntoIterator<Item = Rule>) -> Result<Self, CatalogError> {
        let mut rules = self.rules.clone();
        rules.extend(extra);
        Self::new(rules)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
