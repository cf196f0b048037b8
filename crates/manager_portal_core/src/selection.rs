//! crates/manager_portal_core/src/selection.rs
//!
//! List pages: the manager's entities of one kind, a selection set over them,
//! and the confirmed, sequential mass delete.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::graphql::{self, Operation};
use crate::ports::{GraphQlGateway, PortError, PortResult};

/// An entity listed per business under the signed-in manager.
pub trait ListedEntity: DeserializeOwned + Send {
    /// Field under each `businesses[]` entry holding the entities.
    const COLLECTION: &'static str;
    const LIST: Operation;
    const DELETE: Operation;

    fn id(&self) -> &str;
}

#[derive(Deserialize)]
struct OwnerEnvelope {
    businesses: Vec<serde_json::Map<String, Value>>,
}

/// Fetches every `T` across all of the manager's businesses, in fetch order.
pub async fn fetch_owned<T: ListedEntity>(
    gateway: &dyn GraphQlGateway,
    user_id: &str,
) -> PortResult<Vec<T>> {
    let owner: OwnerEnvelope =
        graphql::run(gateway, &T::LIST, graphql::where_id(user_id), "user").await?;

    let mut items = Vec::new();
    for mut business in owner.businesses {
        match business.remove(T::COLLECTION) {
            None | Some(Value::Null) => continue,
            Some(collection) => {
                let batch: Vec<T> = serde_json::from_value(collection).map_err(|e| {
                    PortError::Protocol(format!("{} has an unexpected shape: {e}", T::COLLECTION))
                })?;
                items.extend(batch);
            }
        }
    }
    Ok(items)
}

/// Succeeds only when `id` is one of the `T`s listed under the manager's businesses.
pub async fn ensure_owned<T: ListedEntity>(
    gateway: &dyn GraphQlGateway,
    user_id: &str,
    id: &str,
) -> PortResult<()> {
    let items: Vec<T> = fetch_owned(gateway, user_id).await?;
    if items.iter().any(|item| item.id() == id) {
        Ok(())
    } else {
        warn!(collection = T::COLLECTION, id, user_id, "id is not among the manager's items");
        Err(PortError::NotFound(format!("{} {id}", T::COLLECTION)))
    }
}

//=========================================================================================
// Selection
//=========================================================================================

/// Selected ids, kept in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn select_all<'a, I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.ids.clear();
        for id in ids {
            if !self.contains(id) {
                self.ids.push(id.to_string());
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

//=========================================================================================
// Mass Delete
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDelete {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MassDeleteReport {
    pub requested: usize,
    pub deleted: Vec<String>,
    pub failed: Vec<FailedDelete>,
    /// Set when the list could not be re-fetched after deleting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MassDeleteOutcome {
    /// Nothing was selected; the action is inert.
    Inert,
    /// The manager declined the confirmation.
    Cancelled,
    Completed(MassDeleteReport),
}

/// A hydrated list page of `T` with its selection.
#[derive(Debug)]
pub struct ListManager<T> {
    user_id: String,
    items: Vec<T>,
    selection: Selection,
}

impl<T: ListedEntity> ListManager<T> {
    pub async fn load(gateway: &dyn GraphQlGateway, user_id: &str) -> PortResult<Self> {
        let items = fetch_owned(gateway, user_id).await?;
        Ok(Self {
            user_id: user_id.to_string(),
            items,
            selection: Selection::new(),
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Toggles an id. Ids that are not on this list are ignored.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.items.iter().any(|item| item.id() == id) {
            warn!(collection = T::COLLECTION, id, "ignoring selection of an unlisted id");
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(self.items.iter().map(ListedEntity::id));
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }

    pub fn can_mass_delete(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Deletes every selected item one at a time, after `confirm` agrees.
    ///
    /// A failing item does not stop the run. The selection is cleared and the
    /// list re-fetched afterwards, whatever the individual outcomes were.
    pub async fn mass_delete<F>(
        &mut self,
        gateway: &dyn GraphQlGateway,
        confirm: F,
    ) -> MassDeleteOutcome
    where
        F: FnOnce(usize) -> bool,
    {
        if self.selection.is_empty() {
            return MassDeleteOutcome::Inert;
        }
        if !confirm(self.selection.len()) {
            info!(collection = T::COLLECTION, "mass delete cancelled");
            return MassDeleteOutcome::Cancelled;
        }

        let mut report = MassDeleteReport {
            requested: self.selection.len(),
            ..Default::default()
        };
        for id in self.selection.ids() {
            match graphql::send(gateway, &T::DELETE, graphql::where_id(id)).await {
                Ok(_) => report.deleted.push(id.clone()),
                Err(e) => {
                    warn!(collection = T::COLLECTION, id = %id, "delete failed: {e}");
                    report.failed.push(FailedDelete {
                        id: id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(
            collection = T::COLLECTION,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "mass delete finished"
        );

        self.selection.clear();
        match fetch_owned(gateway, &self.user_id).await {
            Ok(items) => self.items = items,
            Err(e) => {
                warn!(collection = T::COLLECTION, "re-fetch after mass delete failed: {e}");
                report.refresh_error = Some(e.to_string());
            }
        }
        MassDeleteOutcome::Completed(report)
    }
}

/// Selects `ids` on `list` and mass-deletes them when `confirmed` is set.
///
/// This is the shape every list endpoint needs: hydrate, select, confirm, delete.
pub async fn delete_selected<T: ListedEntity>(
    gateway: &dyn GraphQlGateway,
    user_id: &str,
    ids: &[String],
    confirmed: bool,
) -> PortResult<(MassDeleteOutcome, Vec<T>)> {
    let mut list = ListManager::<T>::load(gateway, user_id).await?;
    for id in ids {
        if !list.selection().contains(id) {
            list.toggle(id);
        }
    }
    let outcome = list.mass_delete(gateway, |_| confirmed).await;
    Ok((outcome, list.into_items()))
}
