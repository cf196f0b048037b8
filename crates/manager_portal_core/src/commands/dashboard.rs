//! Dashboard counts, computed from the manager's businesses on every request.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::domain::{ComplaintStatus, ReviewModeration};
use crate::graphql::{self, documents};
use crate::ports::{GraphQlGateway, PortResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub businesses: usize,
    pub products: usize,
    pub job_listings: usize,
    pub reviews: usize,
    pub pending_reviews: usize,
    pub complaints: usize,
    pub unresolved_complaints: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewStatusOnly {
    moderation_status: ReviewModeration,
}

#[derive(Deserialize)]
struct ComplaintStatusOnly {
    status: ComplaintStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BusinessCounts {
    #[serde(default)]
    products: Vec<IgnoredAny>,
    #[serde(default)]
    job_listings: Vec<IgnoredAny>,
    #[serde(default)]
    reviews: Vec<ReviewStatusOnly>,
    #[serde(default)]
    complaints: Vec<ComplaintStatusOnly>,
}

#[derive(Deserialize)]
struct Owner {
    businesses: Vec<BusinessCounts>,
}

pub async fn summary(gateway: &dyn GraphQlGateway, user_id: &str) -> PortResult<DashboardSummary> {
    let owner: Owner = graphql::run(
        gateway,
        &documents::MANAGER_DASHBOARD,
        graphql::where_id(user_id),
        "user",
    )
    .await?;

    let mut summary = DashboardSummary {
        businesses: owner.businesses.len(),
        ..Default::default()
    };
    for business in owner.businesses {
        summary.products += business.products.len();
        summary.job_listings += business.job_listings.len();
        summary.reviews += business.reviews.len();
        summary.pending_reviews += business
            .reviews
            .iter()
            .filter(|r| r.moderation_status == ReviewModeration::Pending)
            .count();
        summary.complaints += business.complaints.len();
        summary.unresolved_complaints += business
            .complaints
            .iter()
            .filter(|c| c.status == ComplaintStatus::Unresolved)
            .count();
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingGateway;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn counts_pending_and_unresolved_across_businesses() {
        let gateway = RecordingGateway::new();
        gateway.respond(
            &documents::MANAGER_DASHBOARD,
            json!({ "user": { "businesses": [
                {
                    "products": [ { "id": "p1" }, { "id": "p2" } ],
                    "jobListings": [],
                    "reviews": [ { "moderationStatus": "2" }, { "moderationStatus": "0" } ],
                    "complaints": [ { "status": "1" } ]
                },
                {
                    "products": [],
                    "jobListings": [ { "id": "j1" } ],
                    "reviews": [ { "moderationStatus": "2" } ],
                    "complaints": [ { "status": "0" } ]
                }
            ] } }),
        );

        let summary = summary(&gateway, "u1").await.unwrap();

        assert_eq!(
            summary,
            DashboardSummary {
                businesses: 2,
                products: 2,
                job_listings: 1,
                reviews: 3,
                pending_reviews: 2,
                complaints: 2,
                unresolved_complaints: 1,
            }
        );
    }
}
