//! crates/manager_portal_core/src/graphql.rs
//!
//! GraphQL documents used by the portal, the response envelope, and the
//! typed helpers that turn an envelope into a `PortResult`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::ports::{GraphQlGateway, PortError, PortResult};

/// A named GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
}

/// The JSON body POSTed to the endpoint.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: &'a Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphQlErrorItem {
    pub message: String,
}

/// A classified response: either a payload or the server's error list.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphQlResponse<T> {
    Data(T),
    Errors(Vec<GraphQlErrorItem>),
}

/// The raw `{data, errors}` envelope as it arrives on the wire.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlErrorItem>>,
}

impl Envelope {
    /// Parses a response body, treating anything that is not an envelope as a
    /// protocol failure.
    pub fn from_slice(body: &[u8]) -> PortResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| PortError::Protocol(format!("malformed GraphQL response: {e}")))
    }

    pub fn classify(self) -> PortResult<GraphQlResponse<Value>> {
        match (self.data, self.errors) {
            (_, Some(errors)) if !errors.is_empty() => Ok(GraphQlResponse::Errors(errors)),
            (Some(data), _) if !data.is_null() => Ok(GraphQlResponse::Data(data)),
            _ => Err(PortError::Protocol(
                "response carried neither data nor errors".to_string(),
            )),
        }
    }

    /// Collapses the envelope into the payload or an `Api` error.
    pub fn into_data(self) -> PortResult<Value> {
        match self.classify()? {
            GraphQlResponse::Data(data) => Ok(data),
            GraphQlResponse::Errors(errors) => Err(PortError::Api(
                errors.into_iter().map(|e| e.message).collect(),
            )),
        }
    }
}

/// Runs an operation and decodes the member `field` of its payload into `T`.
pub async fn run<T: DeserializeOwned>(
    gateway: &dyn GraphQlGateway,
    operation: &Operation,
    variables: Value,
    field: &str,
) -> PortResult<T> {
    let data = send(gateway, operation, variables).await?;
    decode_field(data, operation.name, field)
}

/// Executes an operation with logging and returns its raw payload.
///
/// Every call to the backend goes through here, whether or not the caller
/// decodes the result.
pub async fn send(
    gateway: &dyn GraphQlGateway,
    operation: &Operation,
    variables: Value,
) -> PortResult<Value> {
    debug!(operation = operation.name, "executing GraphQL operation");
    gateway.execute(operation, variables).await.map_err(|e| {
        error!(operation = operation.name, "GraphQL operation failed: {e}");
        e
    })
}

/// Pulls `field` out of a payload object, mapping a `null` to `NotFound`.
pub fn decode_field<T: DeserializeOwned>(
    mut data: Value,
    operation: &str,
    field: &str,
) -> PortResult<T> {
    let member = data.get_mut(field).map(Value::take).unwrap_or(Value::Null);
    if member.is_null() {
        return Err(PortError::NotFound(format!("{operation} returned no {field}")));
    }
    serde_json::from_value(member)
        .map_err(|e| PortError::Protocol(format!("{operation}.{field} has an unexpected shape: {e}")))
}

/// `{ "where": { "id": ... } }`, the selector every single-entity operation uses.
pub fn where_id(id: &str) -> Value {
    serde_json::json!({ "where": { "id": id } })
}

//=========================================================================================
// Documents
//=========================================================================================

pub mod documents {
    use super::Operation;

    pub const AUTHENTICATE_USER: Operation = Operation {
        name: "AuthenticateUser",
        document: r#"
mutation AuthenticateUser($email: String!, $password: String!) {
  authenticateUserWithPassword(email: $email, password: $password) {
    __typename
    ... on UserAuthenticationWithPasswordSuccess {
      item { id email name role }
    }
    ... on UserAuthenticationWithPasswordFailure {
      message
    }
  }
}"#,
    };

    pub const MANAGER_BUSINESS_PROFILES: Operation = Operation {
        name: "ManagerBusinessProfiles",
        document: r#"
query ManagerBusinessProfiles($where: UserWhereUniqueInput!) {
  user(where: $where) {
    businesses {
      id name description industry contactEmail contactPhone website location
      address yearFounded typeOfEntity businessHours revenue employeeCount
      keywords companyLinkedIn companyFacebook companyTwitter technologiesUsed sicCodes
    }
  }
}"#,
    };

    pub const MANAGER_BUSINESS_NAMES: Operation = Operation {
        name: "ManagerBusinessNames",
        document: r#"
query ManagerBusinessNames($where: UserWhereUniqueInput!) {
  user(where: $where) {
    businesses { id name }
  }
}"#,
    };

    pub const UPDATE_BUSINESS: Operation = Operation {
        name: "UpdateBusiness",
        document: r#"
mutation UpdateBusiness($where: BusinessWhereUniqueInput!, $data: BusinessUpdateInput!) {
  updateBusiness(where: $where, data: $data) { id name }
}"#,
    };

    pub const MANAGER_PRODUCTS: Operation = Operation {
        name: "ManagerProducts",
        document: r#"
query ManagerProducts($where: UserWhereUniqueInput!) {
  user(where: $where) {
    businesses {
      products {
        id name description
        images { id file { id filesize width height extension url } }
        reviews { rating }
      }
    }
  }
}"#,
    };

    pub const PRODUCT: Operation = Operation {
        name: "Product",
        document: r#"
query Product($where: ProductWhereUniqueInput!) {
  product(where: $where) {
    id name description
    business { id name }
    images { id file { id url } }
    reviews { id user { name email } rating content moderationStatus isAnonymous createdAt }
    complaints { id user { name email } subject content status isAnonymous createdAt }
  }
}"#,
    };

    pub const CREATE_PRODUCT: Operation = Operation {
        name: "CreateProduct",
        document: r#"
mutation CreateProduct($data: ProductCreateInput!) {
  createProduct(data: $data) { id name }
}"#,
    };

    pub const UPDATE_PRODUCT: Operation = Operation {
        name: "UpdateProduct",
        document: r#"
mutation UpdateProduct($where: ProductWhereUniqueInput!, $data: ProductUpdateInput!) {
  updateProduct(where: $where, data: $data) { id name }
}"#,
    };

    pub const DELETE_PRODUCT: Operation = Operation {
        name: "DeleteProduct",
        document: r#"
mutation DeleteProduct($where: ProductWhereUniqueInput!) {
  deleteProduct(where: $where) { id }
}"#,
    };

    pub const LINK_PRODUCT_IMAGE: Operation = Operation {
        name: "LinkProductImage",
        document: r#"
mutation LinkProductImage($where: ProductWhereUniqueInput!, $data: ProductUpdateInput!) {
  updateProduct(where: $where, data: $data) { id }
}"#,
    };

    pub const DELETE_IMAGE: Operation = Operation {
        name: "DeleteImage",
        document: r#"
mutation DeleteImage($where: ImageWhereUniqueInput!) {
  deleteImage(where: $where) { id }
}"#,
    };

    /// Sent as a GraphQL multipart request; `$file` is bound through the `map` part.
    pub const CREATE_IMAGE: Operation = Operation {
        name: "CreateImage",
        document: r#"
mutation CreateImage($file: Upload!, $productId: ID!) {
  createImage(data: { file: { upload: $file }, product: { connect: { id: $productId } } }) {
    id
    file { id url }
  }
}"#,
    };

    pub const MANAGER_REVIEWS: Operation = Operation {
        name: "ManagerReviews",
        document: r#"
query ManagerReviews($where: UserWhereUniqueInput!) {
  user(where: $where) {
    businesses {
      reviews { id user { id name } isAnonymous rating moderationStatus createdAt }
    }
  }
}"#,
    };

    pub const REVIEW: Operation = Operation {
        name: "Review",
        document: r#"
query Review($where: ReviewWhereUniqueInput!) {
  review(where: $where) {
    id user { name } rating content moderationStatus createdAt isAnonymous
    replies { id content createdAt }
  }
}"#,
    };

    pub const UPDATE_REVIEW: Operation = Operation {
        name: "UpdateReview",
        document: r#"
mutation UpdateReview($where: ReviewWhereUniqueInput!, $data: ReviewUpdateInput!) {
  updateReview(where: $where, data: $data) { id moderationStatus }
}"#,
    };

    pub const UPDATE_PRODUCT_REVIEW: Operation = Operation {
        name: "UpdateProductReview",
        document: r#"
mutation UpdateProductReview($where: ProductReviewWhereUniqueInput!, $data: ProductReviewUpdateInput!) {
  updateProductReview(where: $where, data: $data) { id moderationStatus }
}"#,
    };

    pub const DELETE_REVIEW: Operation = Operation {
        name: "DeleteReview",
        document: r#"
mutation DeleteReview($where: ReviewWhereUniqueInput!) {
  deleteReview(where: $where) { id }
}"#,
    };

    pub const CREATE_REVIEW_REPLY: Operation = Operation {
        name: "CreateReviewReply",
        document: r#"
mutation CreateReviewReply($data: ReviewReplyCreateInput!) {
  createReviewReply(data: $data) { id content createdAt }
}"#,
    };

    pub const MANAGER_COMPLAINTS: Operation = Operation {
        name: "ManagerComplaints",
        document: r#"
query ManagerComplaints($where: UserWhereUniqueInput!) {
  user(where: $where) {
    businesses {
      complaints { id user { id name } isAnonymous status createdAt }
    }
  }
}"#,
    };

    pub const COMPLAINT: Operation = Operation {
        name: "Complaint",
        document: r#"
query Complaint($where: ComplaintWhereUniqueInput!) {
  complaint(where: $where) {
    id user { name } subject content status createdAt isAnonymous
    replies { id content createdAt }
  }
}"#,
    };

    pub const UPDATE_COMPLAINT: Operation = Operation {
        name: "UpdateComplaint",
        document: r#"
mutation UpdateComplaint($where: ComplaintWhereUniqueInput!, $data: ComplaintUpdateInput!) {
  updateComplaint(where: $where, data: $data) { id status }
}"#,
    };

    pub const UPDATE_PRODUCT_COMPLAINT: Operation = Operation {
        name: "UpdateProductComplaint",
        document: r#"
mutation UpdateProductComplaint($where: ProductComplaintWhereUniqueInput!, $data: ProductComplaintUpdateInput!) {
  updateProductComplaint(where: $where, data: $data) { id status }
}"#,
    };

    pub const DELETE_COMPLAINT: Operation = Operation {
        name: "DeleteComplaint",
        document: r#"
mutation DeleteComplaint($where: ComplaintWhereUniqueInput!) {
  deleteComplaint(where: $where) { id }
}"#,
    };

    pub const CREATE_COMPLAINT_REPLY: Operation = Operation {
        name: "CreateComplaintReply",
        document: r#"
mutation CreateComplaintReply($data: ComplaintReplyCreateInput!) {
  createComplaintReply(data: $data) { id content createdAt }
}"#,
    };

    pub const MANAGER_JOB_LISTINGS: Operation = Operation {
        name: "ManagerJobListings",
        document: r#"
query ManagerJobListings($where: UserWhereUniqueInput!) {
  user(where: $where) {
    businesses {
      jobListings { id title description location salary createdAt }
    }
  }
}"#,
    };

    pub const UPDATE_JOB_LISTING: Operation = Operation {
        name: "UpdateJobListing",
        document: r#"
mutation UpdateJobListing($where: JobListingWhereUniqueInput!, $data: JobListingUpdateInput!) {
  updateJobListing(where: $where, data: $data) { id title description location salary }
}"#,
    };

    pub const DELETE_JOB_LISTING: Operation = Operation {
        name: "DeleteJobListing",
        document: r#"
mutation DeleteJobListing($where: JobListingWhereUniqueInput!) {
  deleteJobListing(where: $where) { id }
}"#,
    };

    pub const ACCOUNT: Operation = Operation {
        name: "Account",
        document: r#"
query Account($where: UserWhereUniqueInput!) {
  user(where: $where) { id name email }
}"#,
    };

    pub const UPDATE_USER: Operation = Operation {
        name: "UpdateUser",
        document: r#"
mutation UpdateUser($where: UserWhereUniqueInput!, $data: UserUpdateInput!) {
  updateUser(where: $where, data: $data) { id name email }
}"#,
    };

    pub const UPDATE_USER_PASSWORD: Operation = Operation {
        name: "UpdateUserPassword",
        document: r#"
mutation UpdateUserPassword($id: ID!, $currentPassword: String!, $newPassword: String!) {
  updateUserPassword(id: $id, currentPassword: $currentPassword, newPassword: $newPassword) { id }
}"#,
    };

    pub const MANAGER_DASHBOARD: Operation = Operation {
        name: "ManagerDashboard",
        document: r#"
query ManagerDashboard($where: UserWhereUniqueInput!) {
  user(where: $where) {
    businesses {
      products { id }
      jobListings { id }
      reviews { moderationStatus }
      complaints { status }
    }
  }
}"#,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn data_envelope_yields_payload() {
        let envelope = Envelope::from_slice(br#"{"data":{"review":{"id":"r1"}}}"#).unwrap();
        assert_eq!(envelope.into_data().unwrap(), json!({"review": {"id": "r1"}}));
    }

    #[test]
    fn errors_win_over_partial_data() {
        let body = br#"{"data":{"review":null},"errors":[{"message":"Access denied"},{"message":"again"}]}"#;
        let envelope = Envelope::from_slice(body).unwrap();
        match envelope.into_data() {
            Err(PortError::Api(messages)) => {
                assert_eq!(messages, vec!["Access denied".to_string(), "again".to_string()])
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_a_protocol_error() {
        assert!(matches!(
            Envelope::from_slice(b"<html>bad gateway</html>"),
            Err(PortError::Protocol(_))
        ));
        let empty = Envelope::from_slice(b"{}").unwrap();
        assert!(matches!(empty.into_data(), Err(PortError::Protocol(_))));
    }

    #[test]
    fn null_member_is_not_found() {
        let result: PortResult<Value> = decode_field(json!({"review": null}), "Review", "review");
        assert!(matches!(result, Err(PortError::NotFound(_))));
    }

    #[test]
    fn request_body_has_query_and_variables() {
        let variables = where_id("abc");
        let body = serde_json::to_value(GraphQlRequest {
            query: documents::REVIEW.document,
            variables: &variables,
        })
        .unwrap();
        assert_eq!(body["variables"], json!({"where": {"id": "abc"}}));
        assert!(body["query"].as_str().unwrap().contains("query Review"));
    }

    #[tokio::test]
    #[traced_test]
    async fn mutations_without_a_decoded_result_are_logged() {
        let gateway = crate::testing::RecordingGateway::new();
        gateway.respond(&documents::DELETE_REVIEW, json!({ "deleteReview": { "id": "r1" } }));

        let data = send(&gateway, &documents::DELETE_REVIEW, where_id("r1")).await.unwrap();

        assert_eq!(data, json!({ "deleteReview": { "id": "r1" } }));
        assert!(logs_contain("executing GraphQL operation"));
        assert!(logs_contain("DeleteReview"));
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_operations_are_logged_with_server_messages() {
        let gateway = crate::testing::RecordingGateway::new();
        gateway.respond_once(
            &documents::DELETE_IMAGE,
            Err(PortError::Api(vec!["image is locked".to_string()])),
        );

        let result = send(&gateway, &documents::DELETE_IMAGE, where_id("i1")).await;

        assert!(matches!(result, Err(PortError::Api(_))));
        assert!(logs_contain("GraphQL operation failed"));
        assert!(logs_contain("image is locked"));
    }
}
