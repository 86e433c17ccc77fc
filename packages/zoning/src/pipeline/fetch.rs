//! Policy content retrieval.

use futures::stream::{self, StreamExt, TryStreamExt};
use plansa_client::Endpoint;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::traits::PlanningApi;
use crate::types::{PolicyContent, PolicyDocumentRef, PolicyResponse};

/// Every content block of one document.
pub async fn fetch_policy<A: PlanningApi + ?Sized>(
    api: &A,
    valuation_id: &str,
    document_id: &str,
) -> Result<PolicyResponse> {
    let blocks = api.policy_content(valuation_id, document_id).await?;
    debug!(valuation_id, document_id, blocks = blocks.len(), "Fetched policy document");
    Ok(PolicyResponse {
        document_id: document_id.to_string(),
        blocks,
    })
}

/// The first block's HTML of one document.
pub async fn fetch_policy_content<A: PlanningApi + ?Sized>(
    api: &A,
    valuation_id: &str,
    document_id: &str,
) -> Result<PolicyContent> {
    let response = fetch_policy(api, valuation_id, document_id).await?;
    canonical_content(&response)
}

/// First block of a response; an empty block list is unparseable.
pub fn canonical_content(response: &PolicyResponse) -> Result<PolicyContent> {
    response
        .content()
        .ok_or_else(|| PipelineError::ResponseUnparseable {
            endpoint: Endpoint::PolicyContent,
            detail: format!("document {} returned no content blocks", response.document_id),
        })
}

/// Fetch documents concurrently, at most `max_concurrent` at a time.
///
/// Responses come back in the order of `refs`. The first failure, in that
/// order, aborts the whole stage.
pub async fn fetch_all<A: PlanningApi + ?Sized>(
    api: &A,
    valuation_id: &str,
    refs: &[PolicyDocumentRef],
    max_concurrent: usize,
) -> Result<Vec<PolicyResponse>> {
    let responses: Vec<PolicyResponse> = stream::iter(refs)
        .map(|r| fetch_policy(api, valuation_id, &r.document_id))
        .buffered(max_concurrent.max(1))
        .try_collect()
        .await?;

    info!(
        valuation_id,
        documents = responses.len(),
        max_concurrent,
        "Fetched zone policy documents"
    );
    Ok(responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPlanningApi;

    const VALUATION: &str = "3512345678";

    #[tokio::test]
    async fn test_first_block_is_canonical() {
        let api = MockPlanningApi::new().with_policy_content(
            VALUATION,
            "2001",
            r#"[{"Content": "<p>first</p>", "Title": "Zone"}, {"Content": "<p>second</p>"}]"#,
        );

        let response = fetch_policy(&api, VALUATION, "2001").await.unwrap();
        assert_eq!(response.blocks.len(), 2);
        assert_eq!(response.blocks[1].content, "<p>second</p>");

        let content = fetch_policy_content(&api, VALUATION, "2001").await.unwrap();
        assert_eq!(content.document_id, "2001");
        assert_eq!(content.html, "<p>first</p>");
    }

    #[tokio::test]
    async fn test_no_blocks_is_unparseable() {
        let api = MockPlanningApi::new().with_policy_content(VALUATION, "2001", "[]");
        let err = fetch_policy_content(&api, VALUATION, "2001").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ResponseUnparseable { endpoint: Endpoint::PolicyContent, .. }
        ));
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_input_order() {
        let mut api = MockPlanningApi::new();
        for id in ["3", "1", "2"] {
            api = api.with_policy_html(VALUATION, id, &format!("<p>doc {id}</p>"));
        }
        let refs: Vec<_> = ["3", "1", "2"].into_iter().map(PolicyDocumentRef::new).collect();

        let responses = fetch_all(&api, VALUATION, &refs, 2).await.unwrap();
        let ids: Vec<_> = responses.iter().map(|r| r.document_id.as_str()).collect();
        assert_eq!(ids, ["3", "1", "2"]);
        assert_eq!(responses[1].blocks[0].content, "<p>doc 1</p>");
    }

    #[tokio::test]
    async fn test_fetch_all_fails_on_missing_document() {
        let api = MockPlanningApi::new().with_policy_html(VALUATION, "1", "<p>ok</p>");
        let refs = vec![PolicyDocumentRef::new("1"), PolicyDocumentRef::new("missing")];
        let err = fetch_all(&api, VALUATION, &refs, 4).await.unwrap_err();
        assert!(matches!(err, PipelineError::ServiceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_fetch_all_with_zero_concurrency_still_runs() {
        let api = MockPlanningApi::new().with_policy_html(VALUATION, "1", "<p>ok</p>");
        let responses = fetch_all(&api, VALUATION, &[PolicyDocumentRef::new("1")], 0)
            .await
            .unwrap();
        assert_eq!(responses.len(), 1);
    }
}
