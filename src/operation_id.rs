//! Operation identifier computation and uniqueness validation.

use crate::annotations::{openapi, openapi_annotation};
use crate::config::{DuplicateOperationIdPolicy, OperationIdStrategy};
use crate::context::{Diagnostic, DiagnosticKind, ScanContext};
use crate::error::{Error, Result};
use crate::extractor::{ResourceOperation, SegmentPart};
use crate::index::simple_name;
use heck::ToUpperCamelCase;
use log::{debug, warn};
use std::collections::BTreeMap;

#[derive(Debug)]
struct Registration {
    owner: String,
    route: String,
}

/// Operation identifiers registered so far, with the operation that owns each one
#[derive(Debug, Default)]
pub struct OperationIdRegistry {
    owners: BTreeMap<String, Registration>,
}

impl OperationIdRegistry {
    /// Description of the operation that registered `id`
    pub fn owner(&self, id: &str) -> Option<&str> {
        self.owners.get(id).map(|r| r.owner.as_str())
    }

    /// `METHOD /path` of the operation that registered `id`
    pub fn route(&self, id: &str) -> Option<&str> {
        self.owners.get(id).map(|r| r.route.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.owners.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    fn register(&mut self, id: String, owner: String, route: String) {
        self.owners.insert(id, Registration { owner, route });
    }

    /// A derived identifier only collides with one registered for the same route; otherwise
    /// the first free numeric suffix is used
    fn disambiguate(&self, id: String, route: &str) -> String {
        let mut candidate = id.clone();
        let mut suffix = 2;
        while self.route(&candidate).is_some_and(|owner| owner != route) {
            candidate = format!("{}{}", id, suffix);
            suffix += 1;
        }
        candidate
    }
}

/// Identifier declared by `@Operation(operationId = ...)`
pub fn explicit_operation_id(operation: &ResourceOperation) -> Option<&str> {
    openapi_annotation(&operation.declaration.annotations, openapi::OPERATION)?.string("operationId")
}

/// Identifier derived from the operation itself
pub fn derive_operation_id(operation: &ResourceOperation, strategy: OperationIdStrategy) -> String {
    match strategy {
        OperationIdStrategy::Derived => {
            let mut id = operation.method.as_str().to_ascii_lowercase();
            for part in operation.path.segments.iter().flat_map(|s| s.parts.iter()) {
                match part {
                    SegmentPart::Literal(text) => id.push_str(&text.to_upper_camel_case()),
                    SegmentPart::Variable { name, .. } => {
                        id.push_str("By");
                        id.push_str(&name.to_upper_camel_case());
                    }
                }
            }
            id
        }
        OperationIdStrategy::Method => operation.declaration.name.clone(),
        OperationIdStrategy::ClassMethod => {
            format!("{}_{}", simple_name(&operation.resource), operation.declaration.name)
        }
    }
}

/// Compute the operation's identifier and register it.
///
/// Returns `Ok(false)` when the identifier is taken and the permissive policy says to skip the
/// operation; fails with [`Error::DuplicateOperationId`] under the fail-fast policy. Under the
/// permissive policy an operation sharing both identifier and route with the first owner is kept
/// so the document assembler can merge it into that owner.
pub fn assign_operation_id(operation: &mut ResourceOperation, context: &mut ScanContext) -> Result<bool> {
    let route = format!("{} {}", operation.method.as_str(), operation.path.render());
    let id = match explicit_operation_id(operation) {
        Some(id) => id.to_string(),
        None => {
            let derived = derive_operation_id(operation, context.config().operation_id_strategy);
            let id = context.operation_ids.disambiguate(derived.clone(), &route);
            if id != derived {
                debug!("Derived operationId {} is taken by another route, using {}", derived, id);
            }
            id
        }
    };

    if let Some(owner) = context.operation_ids.owner(&id) {
        let owner = owner.to_string();
        let same_route = context.operation_ids.route(&id) == Some(route.as_str());
        return match context.config().duplicate_operation_id_policy {
            DuplicateOperationIdPolicy::FailFast => Err(Error::DuplicateOperationId {
                id,
                first: owner,
                second: operation.describe(),
            }),
            DuplicateOperationIdPolicy::Permissive => {
                let outcome = if same_route { "merged into" } else { "skipped, first used by" };
                warn!("{}: operationId {} {} {}", operation.describe(), id, outcome, owner);
                let diagnostic = Diagnostic::new(
                    DiagnosticKind::DuplicateOperation,
                    operation.describe(),
                    format!("duplicate operationId {} ({} {})", id, outcome, owner),
                );
                context.report(diagnostic.clone());
                operation.diagnostics.push(diagnostic);
                if same_route {
                    operation.operation_id = Some(id);
                }
                Ok(same_route)
            }
        };
    }

    debug!("Assigned operationId {} to {}", id, operation.describe());
    context.operation_ids.register(id.clone(), operation.describe(), route);
    operation.operation_id = Some(id);
    Ok(true)
}
