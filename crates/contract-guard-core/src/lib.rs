pub mod analyzer;
pub mod catalog;
pub mod cost;
pub mod matcher;
pub mod report;
pub mod summary;

pub use analyzer::{Analysis, AnalyzerError, ContractAnalyzer, DocumentStats};
pub use catalog::{
    file_repository::{load_catalog, BuiltinRuleRepository, FileRuleRepository, RuleRepository},
    AnalysisContext, AppliesTo, Catalog, CatalogError, ParseRoleError, ParseSectorError, Role,
    Rule, RuleValidationError, Sector, Severity,
};
pub use cost::{annualize, effective_rate, installment, LoanQuote, LoanTerms};
pub use matcher::{evaluate, Match};
pub use report::{render_report, AnalysisReport, OutputFormat};
pub use summary::{summarize, SeverityCounts, Summary};
