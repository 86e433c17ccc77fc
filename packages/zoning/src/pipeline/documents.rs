//! Policy document tree → zone document ids.

use plansa_client::{Endpoint, PolicyNode};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::traits::PlanningApi;
use crate::types::PolicyDocumentRef;

/// Label fragment of the nodes that group zone policies. Case-sensitive.
pub const ZONE_LABEL: &str = "Zone";

/// Children of every top-level "Zone" node that has children, in tree order.
///
/// Duplicates are kept. A child without a document id is a malformed tree.
pub fn select_zone_documents(nodes: &[PolicyNode]) -> Result<Vec<PolicyDocumentRef>> {
    let mut refs = Vec::new();
    for node in nodes
        .iter()
        .filter(|n| n.label.contains(ZONE_LABEL) && n.has_children)
    {
        for child in &node.children {
            let id = child
                .document_id
                .as_ref()
                .filter(|id| !id.as_str().is_empty())
                .ok_or_else(|| PipelineError::ResponseUnparseable {
                    endpoint: Endpoint::PolicyIndex,
                    detail: format!(
                        "child {:?} of {:?} has no DocTreeID",
                        child.label, node.label
                    ),
                })?;
            refs.push(PolicyDocumentRef::new(id.as_str()));
        }
    }
    Ok(refs)
}

/// Query the policy index and select the zone documents. An empty selection
/// is not an error.
pub async fn list_zone_policy_documents<A: PlanningApi + ?Sized>(
    api: &A,
    valuation_id: &str,
) -> Result<Vec<PolicyDocumentRef>> {
    let nodes = api.policy_index(valuation_id).await?;
    let refs = select_zone_documents(&nodes)?;

    if refs.is_empty() {
        warn!(valuation_id, nodes = nodes.len(), "No zone policies found");
    } else {
        info!(
            valuation_id,
            documents = ?refs.iter().map(|r| r.document_id.as_str()).collect::<Vec<_>>(),
            "Found zone policy documents"
        );
    }
    Ok(refs)
}
