//! Sign-in against the backend and the manager's own account settings.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::domain::{Account, SessionUser};
use crate::form::{self, FieldSpec, FormSchema, FormState, SubmitOutcome};
use crate::graphql::{self, documents};
use crate::guard;
use crate::ports::{GraphQlGateway, PortError, PortResult};

pub static ACCOUNT_FORM: FormSchema = FormSchema {
    entity: "account",
    fields: &[FieldSpec::text("name"), FieldSpec::text("email")],
};

#[derive(Deserialize)]
#[serde(tag = "__typename")]
enum AuthenticationResult {
    #[serde(rename = "UserAuthenticationWithPasswordSuccess")]
    Success { item: AuthenticatedItem },
    #[serde(rename = "UserAuthenticationWithPasswordFailure")]
    Failure { message: String },
}

#[derive(Deserialize)]
struct AuthenticatedItem {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Verifies credentials with the backend and admits managers only.
pub async fn authenticate(
    gateway: &dyn GraphQlGateway,
    email: &str,
    password: &str,
) -> PortResult<SessionUser> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(PortError::Validation(
            "email and password are both required".to_string(),
        ));
    }

    let result: AuthenticationResult = graphql::run(
        gateway,
        &documents::AUTHENTICATE_USER,
        json!({ "email": email, "password": password }),
        "authenticateUserWithPassword",
    )
    .await?;

    let item = match result {
        AuthenticationResult::Success { item } => item,
        AuthenticationResult::Failure { message } => {
            warn!(email, "authentication failed: {message}");
            return Err(PortError::Authorization(message));
        }
    };

    let user = SessionUser {
        id: item.id,
        email: item.email.unwrap_or_default(),
        name: item.name.filter(|n| !n.is_empty()).unwrap_or_else(|| "N/A".to_string()),
        role: item.role.filter(|r| !r.is_empty()).unwrap_or_else(|| "guest".to_string()),
    };
    guard::authorize(&user).inspect_err(|_| {
        warn!(user_id = %user.id, role = %user.role, "non-manager sign-in refused");
    })?;
    info!(user_id = %user.id, "manager signed in");
    Ok(user)
}

pub async fn fetch_account(gateway: &dyn GraphQlGateway, user_id: &str) -> PortResult<Account> {
    graphql::run(gateway, &documents::ACCOUNT, graphql::where_id(user_id), "user").await
}

pub async fn update_account(
    gateway: &dyn GraphQlGateway,
    account: &Account,
    changes: Map<String, Value>,
) -> PortResult<SubmitOutcome> {
    let mut form = FormState::initialize(&ACCOUNT_FORM, account)?;
    form.apply_changes(changes)?;
    form::submit(gateway, &documents::UPDATE_USER, "updateUser", &account.id, &form).await
}

pub async fn change_password(
    gateway: &dyn GraphQlGateway,
    user_id: &str,
    current_password: &str,
    new_password: &str,
) -> PortResult<()> {
    if current_password.is_empty() || new_password.is_empty() {
        return Err(PortError::Validation(
            "please enter both current and new password".to_string(),
        ));
    }
    graphql::send(
        gateway,
        &documents::UPDATE_USER_PASSWORD,
        json!({
            "id": user_id,
            "currentPassword": current_password,
            "newPassword": new_password
        }),
    )
    .await?;
    info!(user_id, "password changed");
    Ok(())
}
