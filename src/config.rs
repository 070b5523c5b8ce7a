use clap::ValueEnum;
use std::collections::BTreeSet;

/// What to do when two operations resolve to the same operation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum DuplicateOperationIdPolicy {
    /// Abort the scan with an error naming the identifier and both operations
    #[default]
    #[value(name = "fail")]
    FailFast,
    /// Keep the first operation and skip the later one
    Permissive,
}

/// How operation identifiers are derived when none is declared explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OperationIdStrategy {
    /// HTTP method plus path, e.g. `getUsersById`
    #[default]
    Derived,
    /// The Java method name
    Method,
    /// Simple class name and method name, e.g. `UserResource_get`
    ClassMethod,
}

/// Options recognized by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub duplicate_operation_id_policy: DuplicateOperationIdPolicy,
    /// Header parameters never documented, compared case-insensitively
    pub ignored_header_parameter_names: BTreeSet<String>,
    /// Render enums without declared constants as plain strings
    pub default_enum_schema_fallback: bool,
    pub operation_id_strategy: OperationIdStrategy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            duplicate_operation_id_policy: DuplicateOperationIdPolicy::FailFast,
            ignored_header_parameter_names: ["Accept", "Content-Type", "Authorization"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_enum_schema_fallback: true,
            operation_id_strategy: OperationIdStrategy::Derived,
        }
    }
}

impl ScanConfig {
    pub fn with_duplicate_policy(mut self, policy: DuplicateOperationIdPolicy) -> Self {
        self.duplicate_operation_id_policy = policy;
        self
    }

    pub fn with_operation_id_strategy(mut self, strategy: OperationIdStrategy) -> Self {
        self.operation_id_strategy = strategy;
        self
    }

    pub fn is_ignored_header(&self, name: &str) -> bool {
        self.ignored_header_parameter_names
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(name))
    }
}
