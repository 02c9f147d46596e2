//! Centralised run configuration (C16).
//!
//! Every component takes a [`RunConfig`] (or a narrower slice of it) as a
//! parameter rather than reading `std::env` itself. The whole object is
//! assembled and validated once, at process start, before any side effect
//! runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("GITHUB_REPOSITORY must be in `owner/repo` form, got {0:?}")]
    InvalidRepository(String),
    #[error("LLM_PROVIDER={provider} requires {missing_key} to be set")]
    MissingProviderKey {
        provider: &'static str,
        missing_key: &'static str,
    },
}

/// Which structured-output LLM provider backs C3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
}

impl LlmProvider {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(ConfigError::InvalidValue {
                name: "LLM_PROVIDER",
                value: other.to_string(),
                reason: "expected `openai` or `anthropic`".to_string(),
            }),
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Anthropic => "claude-opus-4-1-20250805",
        }
    }
}

/// Which partial-step-flow variant the Orchestrator applies (§9 Open Questions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialFlowVariant {
    ReviewOnly,
    ReviewPlusTests,
}

impl PartialFlowVariant {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "review_only" => Ok(Self::ReviewOnly),
            "review_plus_tests" => Ok(Self::ReviewPlusTests),
            other => Err(ConfigError::InvalidValue {
                name: "PARTIAL_FLOW_VARIANT",
                value: other.to_string(),
                reason: "expected `review_only` or `review_plus_tests`".to_string(),
            }),
        }
    }
}

/// How `switchToBranch` names the working branch (§9 Open Questions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchNamePolicy {
    /// `agent/YYYYMMDD_HHMM` — avoids filename-length failures. Default.
    Timestamped,
    /// A slugified, length-capped feature request. Opt-in only.
    SlugifiedFeatureRequest,
}

impl BranchNamePolicy {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "timestamped" => Ok(Self::Timestamped),
            "slugified_feature_request" => Ok(Self::SlugifiedFeatureRequest),
            other => Err(ConfigError::InvalidValue {
                name: "BRANCH_NAME_POLICY",
                value: other.to_string(),
                reason: "expected `timestamped` or `slugified_feature_request`".to_string(),
            }),
        }
    }
}

/// The assembled, validated configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub feature_request: String,
    pub hosting_token: String,
    pub owner: String,
    pub repo: String,
    pub llm_provider: LlmProvider,
    pub llm_api_key: String,
    pub llm_model: String,
    pub base_branch: String,
    pub branch_name_policy: BranchNamePolicy,
    pub partial_flow_variant: PartialFlowVariant,
    pub test_repair_budget: u32,
    pub test_command: Option<String>,
    pub allowed_path_prefixes: Vec<String>,
    pub test_root: String,
}

const DEFAULT_TEST_REPAIR_BUDGET: u32 = 3;
const DEFAULT_BASE_BRANCH: &str = "main";
const DEFAULT_TEST_ROOT: &str = "__tests__/unit";

impl RunConfig {
    /// Assemble configuration from environment variables, per §6.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_map(&std::env::vars().collect())
    }

    /// Testable variant of [`RunConfig::from_env`] over an explicit map.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let feature_request = require(vars, "FEATURE_REQUEST")?;
        let hosting_token = require_any(vars, &["GITHUB_TOKEN", "HOSTING_TOKEN"])?;
        let repository = require(vars, "GITHUB_REPOSITORY")?;
        let (owner, repo) = split_owner_repo(&repository)?;

        let llm_provider = match optional(vars, "LLM_PROVIDER") {
            Some(raw) => LlmProvider::parse(&raw)?,
            None => LlmProvider::OpenAi,
        };

        let llm_api_key = match llm_provider {
            LlmProvider::OpenAi => optional(vars, "OPENAI_API_KEY").ok_or(
                ConfigError::MissingProviderKey {
                    provider: "openai",
                    missing_key: "OPENAI_API_KEY",
                },
            )?,
            LlmProvider::Anthropic => optional(vars, "ANTHROPIC_API_KEY").ok_or(
                ConfigError::MissingProviderKey {
                    provider: "anthropic",
                    missing_key: "ANTHROPIC_API_KEY",
                },
            )?,
        };

        let llm_model = optional(vars, "LLM_MODEL").unwrap_or_else(|| llm_provider.default_model().to_string());
        let base_branch = optional(vars, "BASE_BRANCH").unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string());

        let partial_flow_variant = match optional(vars, "PARTIAL_FLOW_VARIANT") {
            Some(raw) => PartialFlowVariant::parse(&raw)?,
            None => PartialFlowVariant::ReviewOnly,
        };

        let test_repair_budget = match optional(vars, "TEST_REPAIR_BUDGET") {
            Some(raw) => raw.parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                name: "TEST_REPAIR_BUDGET",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_TEST_REPAIR_BUDGET,
        };

        let test_command = optional(vars, "TEST_COMMAND");
        let test_root = optional(vars, "TEST_ROOT").unwrap_or_else(|| DEFAULT_TEST_ROOT.to_string());

        let branch_name_policy = match optional(vars, "BRANCH_NAME_POLICY") {
            Some(raw) => BranchNamePolicy::parse(&raw)?,
            None => BranchNamePolicy::Timestamped,
        };

        Ok(Self {
            feature_request,
            hosting_token,
            owner,
            repo,
            llm_provider,
            llm_api_key,
            llm_model,
            base_branch,
            branch_name_policy,
            partial_flow_variant,
            test_repair_budget,
            test_command,
            allowed_path_prefixes: Vec::new(),
            test_root,
        })
    }
}

fn optional(vars: &HashMap<String, String>, name: &str) -> Option<String> {
    vars.get(name).map(|v| v.to_string()).filter(|v| !v.is_empty())
}

fn require(vars: &HashMap<String, String>, name: &'static str) -> Result<String, ConfigError> {
    optional(vars, name).ok_or(ConfigError::MissingVar(name))
}

fn require_any(vars: &HashMap<String, String>, names: &[&'static str]) -> Result<String, ConfigError> {
    for name in names {
        if let Some(v) = optional(vars, name) {
            return Ok(v);
        }
    }
    Err(ConfigError::MissingVar(names[0]))
}

fn split_owner_repo(value: &str) -> Result<(String, String), ConfigError> {
    match value.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ConfigError::InvalidRepository(value.to_string())),
    }
}
