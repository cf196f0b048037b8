//! Business profile commands.
//!
//! The profile can be edited as a whole or through one of three panels that
//! each own a slice of the fields. Every variant submits touched fields only.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::domain::Business;
use crate::form::{self, FieldSpec, FormSchema, FormState, SubmitOutcome};
use crate::graphql::{self, documents};
use crate::ports::{GraphQlGateway, PortError, PortResult};

pub static BUSINESS_FORM: FormSchema = FormSchema {
    entity: "business",
    fields: &[
        FieldSpec::text("name"),
        FieldSpec::text("description"),
        FieldSpec::text("industry"),
        FieldSpec::text("contactEmail"),
        FieldSpec::text("contactPhone"),
        FieldSpec::text("website"),
        FieldSpec::text("location"),
        FieldSpec::text("address"),
        FieldSpec::integer("yearFounded"),
        FieldSpec::text("typeOfEntity"),
        FieldSpec::text("businessHours"),
        FieldSpec::text("revenue"),
        FieldSpec::integer("employeeCount"),
        FieldSpec::text("keywords"),
        FieldSpec::text("companyLinkedIn"),
        FieldSpec::text("companyFacebook"),
        FieldSpec::text("companyTwitter"),
        FieldSpec::text("technologiesUsed"),
        FieldSpec::text("sicCodes"),
    ],
};

static BASIC_PANEL: FormSchema = FormSchema {
    entity: "business basic information",
    fields: &[
        FieldSpec::text("name"),
        FieldSpec::text("industry"),
        FieldSpec::integer("yearFounded"),
        FieldSpec::text("typeOfEntity"),
        FieldSpec::text("description"),
    ],
};

static CONTACT_PANEL: FormSchema = FormSchema {
    entity: "business contact information",
    fields: &[
        FieldSpec::text("contactEmail"),
        FieldSpec::text("contactPhone"),
        FieldSpec::text("website"),
        FieldSpec::text("location"),
        FieldSpec::text("address"),
    ],
};

static OPERATIONS_PANEL: FormSchema = FormSchema {
    entity: "business operations",
    fields: &[
        FieldSpec::text("businessHours"),
        FieldSpec::text("revenue"),
        FieldSpec::integer("employeeCount"),
        FieldSpec::text("keywords"),
    ],
};

/// One of the independent panels the profile page is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessPanel {
    Basic,
    Contact,
    Operations,
}

impl BusinessPanel {
    pub fn schema(self) -> &'static FormSchema {
        match self {
            Self::Basic => &BASIC_PANEL,
            Self::Contact => &CONTACT_PANEL,
            Self::Operations => &OPERATIONS_PANEL,
        }
    }
}

impl FromStr for BusinessPanel {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "contact" => Ok(Self::Contact),
            "operations" => Ok(Self::Operations),
            other => Err(PortError::Validation(format!("unknown profile panel '{other}'"))),
        }
    }
}

#[derive(Deserialize)]
struct OwnedProfiles {
    businesses: Vec<Business>,
}

/// The manager's primary business: the first one the backend lists.
pub async fn fetch_business(gateway: &dyn GraphQlGateway, user_id: &str) -> PortResult<Business> {
    let owned: OwnedProfiles = graphql::run(
        gateway,
        &documents::MANAGER_BUSINESS_PROFILES,
        graphql::where_id(user_id),
        "user",
    )
    .await?;
    owned
        .businesses
        .into_iter()
        .next()
        .ok_or_else(|| PortError::NotFound(format!("no business is managed by user {user_id}")))
}

pub async fn update_business(
    gateway: &dyn GraphQlGateway,
    business: &Business,
    changes: Map<String, Value>,
) -> PortResult<SubmitOutcome> {
    submit_with(gateway, &BUSINESS_FORM, business, changes).await
}

pub async fn update_business_panel(
    gateway: &dyn GraphQlGateway,
    business: &Business,
    panel: BusinessPanel,
    changes: Map<String, Value>,
) -> PortResult<SubmitOutcome> {
    submit_with(gateway, panel.schema(), business, changes).await
}

async fn submit_with(
    gateway: &dyn GraphQlGateway,
    schema: &'static FormSchema,
    business: &Business,
    changes: Map<String, Value>,
) -> PortResult<SubmitOutcome> {
    let mut form = FormState::initialize(schema, business)?;
    form.apply_changes(changes)?;
    form::submit(gateway, &documents::UPDATE_BUSINESS, "updateBusiness", &business.id, &form).await
}
