use std::{collections::HashSet, path::PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{Catalog, Rule};

/// Abstraction over rule loading so packs can come from files or the built-in catalog.
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Retrieve every rule in declaration order.
    async fn load_rules(&self) -> Result<Vec<Rule>>;
}

/// Serves the catalog compiled into the crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinRuleRepository;

#[async_trait]
impl RuleRepository for BuiltinRuleRepository {
    async fn load_rules(&self) -> Result<Vec<Rule>> {
        Ok(Catalog::builtin().rules().to_vec())
    }
}

/// Loads a rule pack from a JSON5 file (a JSON array of rules; comments allowed).
pub struct FileRuleRepository {
    path: PathBuf,
    cache: OnceCell<Vec<Rule>>,
}

impl FileRuleRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    async fn read_pack(&self) -> Result<Vec<Rule>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read rule pack at {}", self.path.display()))?;
        let rules: Vec<Rule> = json5::from_str(&raw)
            .with_context(|| format!("invalid rule pack structure in {}", self.path.display()))?;

        let mut seen = HashSet::new();
        for rule in &rules {
            rule.validate()
                .with_context(|| format!("invalid rule in {}", self.path.display()))?;
            if !seen.insert(rule.name.clone()) {
                return Err(anyhow::anyhow!("duplicate rule name `{}`", rule.name));
            }
        }
        debug!(path = %self.path.display(), count = rules.len(), "rule pack loaded");
        Ok(rules)
    }
}

#[async_trait]
impl RuleRepository for FileRuleRepository {
    async fn load_rules(&self) -> Result<Vec<Rule>> {
        let rules = self.cache.get_or_try_init(|| self.read_pack()).await?;
        Ok(rules.clone())
    }
}

/// Built-in catalog extended with every rule served by `repository`.
pub async fn load_catalog<R>(repository: &R) -> Result<Catalog>
where
    R: RuleRepository + ?Sized,
{
    let extra = repository.load_rules().await?;
    Catalog::builtin()
        .extended(extra)
        .context("rule pack conflicts with the built-in catalog")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AppliesTo, Sector, Severity};
    use std::{fs, path::Path};

    fn write(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn loads_json5_pack_with_comments() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pack.json5");
        write(
            &path,
            r#"[
  // project specific
  {
    name: "Exclusivity",
    description: "Provider may not serve competitors.",
    sector: "services",
    applies_to: "provider",
    keywords_any: ["exclusivity", "shall not provide services to"],
    severity: "medium",
    suggestion: "Limit exclusivity in time and scope.",
  },
]"#,
        );

        let repo = FileRuleRepository::new(&path);
        let rules = repo.load_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].sector, Sector::Services);
        assert_eq!(rules[0].applies_to, AppliesTo::Provider);
        assert_eq!(rules[0].severity, Severity::Medium);
        assert!(rules[0].emit_evidence);
    }

    #[tokio::test]
    async fn duplicate_names_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pack.json");
        let rule = r#"{"name":"DUP","description":"d","applies_to":"both","keywords_any":["x"],"severity":"low","suggestion":"s"}"#;
        write(&path, &format!("[{rule},{rule}]"));
        let err = FileRuleRepository::new(&path).load_rules().await.unwrap_err();
        assert!(err.to_string().contains("duplicate rule name `DUP`"));
    }

    #[tokio::test]
    async fn invalid_rule_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pack.json");
        write(
            &path,
            r#"[{"name":"Loud","description":"d","applies_to":"both","keywords_any":["PENALTY"],"severity":"low","suggestion":"s"}]"#,
        );
        let err = FileRuleRepository::new(&path).load_rules().await.unwrap_err();
        assert!(format!("{err:#}").contains("must be lowercase"));
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = FileRuleRepository::new("/nonexistent/pack.json")
            .load_rules()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pack.json"));
    }

    #[tokio::test]
    async fn builtin_repository_serves_catalog_in_order() {
        let rules = BuiltinRuleRepository.load_rules().await.unwrap();
        let catalog = Catalog::new(rules).expect("built-in rules form a valid catalog");
        assert_eq!(&catalog, Catalog::builtin());
    }

    #[tokio::test]
    async fn pack_name_clashing_with_builtin_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pack.json");
        write(
            &path,
            r#"[{"name":"Automatic renewal","description":"d","applies_to":"both","keywords_any":["renew"],"severity":"low","suggestion":"s"}]"#,
        );
        let err = load_catalog(&FileRuleRepository::new(&path)).await.unwrap_err();
        assert!(format!("{err:#}").contains("duplicate rule name `Automatic renewal`"));
    }

    #[tokio::test]
    async fn loads_sample_rule_pack_from_repo() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../rules/custom.json5");
        let catalog = load_catalog(&FileRuleRepository::new(path))
            .await
            .expect("sample pack should load");
        assert!(catalog.len() > Catalog::builtin().len());
        assert!(catalog.get("Exclusivity").is_some());
    }
}
