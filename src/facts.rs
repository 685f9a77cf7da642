//! Facts consumed by the live report.
//!
//! Pure data structures emitted by the analysis producers. No behavior.

use serde::{Deserialize, Serialize};

/// Where the current API surface snapshot was taken from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoveredApiDeclarationSource {
    /// Remote URL of the defining repository
    pub repository_url: String,
    /// Branch the snapshot was taken from
    pub branch: String,
    /// Commit the snapshot was taken from
    pub commit_id: String,
}

/// One declaration site of a currently existing API.
///
/// Several records may share an `api_identity`, one per target framework.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoveredApi {
    /// Normalized, stable identity of the member (parameters included)
    pub api_identity: String,
    /// Browsable URL of the declaration
    pub declaration_url: String,
    /// Target framework the declaration was compiled for
    pub target_framework: String,
    /// Overrides and accessors never make an API show up as unused on their own
    #[serde(default)]
    pub exclude_from_unused_report: bool,
}

/// One usage site of an API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoveredReference {
    /// Identity of the referenced API
    pub api_identity: String,
    /// Version of the API package the referencing project consumed
    pub api_version: String,
    /// Repository containing the usage
    pub repository_url: String,
    /// Symbol containing the usage
    pub referencing_symbol: String,
    /// Browsable location; `None` for build-generated source
    #[serde(default)]
    pub reference_url: Option<String>,
    /// Target framework of the referencing project
    pub target_framework: String,
}

/// Any fact accepted by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Fact {
    /// Origin of the current API surface
    #[serde(rename = "api-source")]
    DeclarationSource(DiscoveredApiDeclarationSource),
    /// Declaration of a current API
    Api(DiscoveredApi),
    /// Usage of an API
    Reference(DiscoveredReference),
}

impl From<DiscoveredApiDeclarationSource> for Fact {
    fn from(source: DiscoveredApiDeclarationSource) -> Self {
        Fact::DeclarationSource(source)
    }
}

impl From<DiscoveredApi> for Fact {
    fn from(api: DiscoveredApi) -> Self {
        Fact::Api(api)
    }
}

impl From<DiscoveredReference> for Fact {
    fn from(reference: DiscoveredReference) -> Self {
        Fact::Reference(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_json_uses_kind_tag() {
        let line = r#"{"kind":"reference","api-identity":"Lib.Foo()","api-version":"1.0.0","repository-url":"https://example.com/r","referencing-symbol":"App.Main()","target-framework":"net8.0"}"#;
        let fact: Fact = serde_json::from_str(line).unwrap();

        match fact {
            Fact::Reference(reference) => {
                assert_eq!(reference.api_identity, "Lib.Foo()");
                assert_eq!(reference.reference_url, None);
            }
            other => panic!("unexpected fact: {:?}", other),
        }
    }

    #[test]
    fn test_exclude_flag_defaults_to_false() {
        let line = r#"{"kind":"api","api-identity":"Lib.Foo()","declaration-url":"u","target-framework":"net48"}"#;
        let fact: Fact = serde_json::from_str(line).unwrap();
        assert_eq!(
            fact,
            Fact::Api(DiscoveredApi {
                api_identity: "Lib.Foo()".to_string(),
                declaration_url: "u".to_string(),
                target_framework: "net48".to_string(),
                exclude_from_unused_report: false,
            })
        );
    }

    #[test]
    fn test_declaration_source_tag() {
        let source = DiscoveredApiDeclarationSource {
            repository_url: "https://example.com/lib".to_string(),
            branch: "main".to_string(),
            commit_id: "abc123".to_string(),
        };
        let json = serde_json::to_value(Fact::from(source)).unwrap();
        assert_eq!(json["kind"], "api-source");
        assert_eq!(json["commit-id"], "abc123");
    }
}
