//! Job listing commands. Listing and mass delete go through `ListManager`.

use serde_json::{Map, Value};

use crate::domain::JobListing;
use crate::form::{self, FieldSpec, FormSchema, FormState, SubmitOutcome};
use crate::graphql::{documents, Operation};
use crate::ports::{GraphQlGateway, PortResult};
use crate::selection::ListedEntity;

pub static JOB_LISTING_FORM: FormSchema = FormSchema {
    entity: "job listing",
    fields: &[
        FieldSpec::text("title"),
        FieldSpec::text("description"),
        FieldSpec::text("location"),
        FieldSpec::float("salary"),
    ],
};

impl ListedEntity for JobListing {
    const COLLECTION: &'static str = "jobListings";
    const LIST: Operation = documents::MANAGER_JOB_LISTINGS;
    const DELETE: Operation = documents::DELETE_JOB_LISTING;

    fn id(&self) -> &str {
        &self.id
    }
}

pub async fn update_job_listing(
    gateway: &dyn GraphQlGateway,
    listing: &JobListing,
    changes: Map<String, Value>,
) -> PortResult<SubmitOutcome> {
    let mut form = FormState::initialize(&JOB_LISTING_FORM, listing)?;
    form.apply_changes(changes)?;
    form::submit(gateway, &documents::UPDATE_JOB_LISTING, "updateJobListing", &listing.id, &form)
        .await
}
