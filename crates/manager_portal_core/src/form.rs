//! crates/manager_portal_core/src/form.rs
//!
//! Editable local copies of remote entities.
//!
//! A [`FormState`] is hydrated from a fetched entity, records which fields the
//! manager actually edited, and produces an update payload containing only
//! those fields. Untouched fields are never sent, so several forms covering
//! different slices of the same entity cannot overwrite each other.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::graphql::{self, Operation};
use crate::ports::{GraphQlGateway, PortError, PortResult};

/// How a field's value is coerced before it is transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    /// A reference to another entity, sent as `{ "connect": { "id": ... } }`.
    Relation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Integer }
    }

    pub const fn float(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Float }
    }

    pub const fn relation(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Relation }
    }
}

/// The set of fields one form is allowed to edit.
#[derive(Debug)]
pub struct FormSchema {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing was touched, so nothing was sent.
    Unchanged,
    /// The mutation succeeded; carries the server's echo of the entity.
    Saved(Value),
}

#[derive(Debug, Clone)]
pub struct FormState {
    schema: &'static FormSchema,
    values: Map<String, Value>,
    touched: BTreeSet<&'static str>,
}

impl FormState {
    /// Loads the schema's fields from `entity` into local state. Nothing is touched yet.
    pub fn initialize<E: Serialize>(schema: &'static FormSchema, entity: &E) -> PortResult<Self> {
        let serialized = serde_json::to_value(entity)
            .map_err(|e| PortError::Protocol(format!("{} is not serializable: {e}", schema.entity)))?;
        let Value::Object(mut source) = serialized else {
            return Err(PortError::Protocol(format!(
                "{} did not serialize to an object",
                schema.entity
            )));
        };

        let mut values = Map::new();
        for spec in schema.fields {
            let mut value = source.remove(spec.name).unwrap_or(Value::Null);
            if spec.kind == FieldKind::Relation {
                // Relations are fetched as `{ id, ... }` but edited as a bare id.
                if let Some(id) = value.get("id").cloned() {
                    value = id;
                }
            }
            values.insert(spec.name.to_string(), value);
        }

        Ok(Self {
            schema,
            values,
            touched: BTreeSet::new(),
        })
    }

    pub fn schema(&self) -> &'static FormSchema {
        self.schema
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Merges one field into the state and marks it touched.
    pub fn on_field_change(&mut self, field: &str, value: Value) -> PortResult<()> {
        let spec = self.schema.field(field).ok_or_else(|| {
            PortError::Validation(format!(
                "'{field}' is not an editable {} field",
                self.schema.entity
            ))
        })?;
        self.values.insert(spec.name.to_string(), value);
        self.touched.insert(spec.name);
        Ok(())
    }

    /// Applies a batch of edits, stopping at the first field the form does not own.
    pub fn apply_changes(&mut self, changes: Map<String, Value>) -> PortResult<()> {
        for (field, value) in changes {
            self.on_field_change(&field, value)?;
        }
        Ok(())
    }

    pub fn touched(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.touched.iter().copied()
    }

    pub fn is_dirty(&self) -> bool {
        !self.touched.is_empty()
    }

    /// The update payload: exactly the touched fields, each coerced to its wire type.
    pub fn submission(&self) -> PortResult<Map<String, Value>> {
        let mut data = Map::new();
        for name in &self.touched {
            let spec = self
                .schema
                .field(name)
                .ok_or_else(|| PortError::Validation(format!("unknown field '{name}'")))?;
            let raw = self.values.get(*name).cloned().unwrap_or(Value::Null);
            data.insert(spec.name.to_string(), coerce(spec, raw)?);
        }
        Ok(data)
    }
}

/// Sends the touched fields of `form` through `operation` for the entity `id`.
///
/// An untouched form short-circuits without a network call.
pub async fn submit(
    gateway: &dyn GraphQlGateway,
    operation: &Operation,
    result_field: &str,
    id: &str,
    form: &FormState,
) -> PortResult<SubmitOutcome> {
    let data = form.submission()?;
    if data.is_empty() {
        debug!(entity = form.schema.entity, id, "form untouched, nothing to submit");
        return Ok(SubmitOutcome::Unchanged);
    }

    let fields: Vec<&str> = data.keys().map(String::as_str).collect();
    info!(entity = form.schema.entity, id, ?fields, "submitting form changes");

    let variables = serde_json::json!({ "where": { "id": id }, "data": data });
    let saved = graphql::run(gateway, operation, variables, result_field).await?;
    Ok(SubmitOutcome::Saved(saved))
}

fn coerce(spec: &FieldSpec, value: Value) -> PortResult<Value> {
    match spec.kind {
        FieldKind::Text => match value {
            Value::Null | Value::String(_) => Ok(value),
            other => Err(PortError::Validation(format!(
                "{} must be text, got {other}",
                spec.name
            ))),
        },
        FieldKind::Integer => coerce_integer(spec.name, value),
        FieldKind::Float => coerce_float(spec.name, value),
        FieldKind::Relation => match value {
            Value::String(id) if !id.trim().is_empty() => {
                Ok(serde_json::json!({ "connect": { "id": id.trim() } }))
            }
            _ => Err(PortError::Validation(format!(
                "{} must reference an existing record",
                spec.name
            ))),
        },
    }
}

fn coerce_integer(field: &str, value: Value) -> PortResult<Value> {
    let invalid = || PortError::Validation(format!("{field} must be a whole number"));
    match value {
        Value::Null => Ok(Value::Null),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(Value::Number(n))
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Value::from(f as i64))
                    }
                    _ => Err(invalid()),
                }
            }
        }
        Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn coerce_float(field: &str, value: Value) -> PortResult<Value> {
    let invalid = || PortError::Validation(format!("{field} must be a number"));
    match value {
        Value::Null => Ok(Value::Null),
        Value::Number(n) => Ok(Value::Number(n)),
        Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::documents;
    use crate::testing::RecordingGateway;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    static LISTING_FORM: FormSchema = FormSchema {
        entity: "listing",
        fields: &[
            FieldSpec::text("title"),
            FieldSpec::text("location"),
            FieldSpec::float("salary"),
            FieldSpec::integer("openings"),
            FieldSpec::relation("business"),
        ],
    };

    fn listing() -> Value {
        json!({
            "id": "j1",
            "title": "Barista",
            "location": "Austin",
            "salary": 31000.0,
            "openings": 2,
            "business": { "id": "b1", "name": "Beans" },
            "createdAt": "2024-01-01T00:00:00Z"
        })
    }

    #[test]
    fn initialize_keeps_only_schema_fields() {
        let form = FormState::initialize(&LISTING_FORM, &listing()).unwrap();
        assert_eq!(form.value("title"), Some(&json!("Barista")));
        assert_eq!(form.value("business"), Some(&json!("b1")));
        assert_eq!(form.value("createdAt"), None);
        assert!(!form.is_dirty());
    }

    #[test]
    fn submission_contains_exactly_the_touched_fields() {
        let mut form = FormState::initialize(&LISTING_FORM, &listing()).unwrap();
        form.on_field_change("location", json!("Dallas")).unwrap();
        form.on_field_change("title", json!("Head Barista")).unwrap();

        let data = form.submission().unwrap();
        assert_eq!(
            Value::Object(data),
            json!({ "location": "Dallas", "title": "Head Barista" })
        );
    }

    #[test]
    fn re_editing_a_field_back_to_its_original_value_still_sends_it() {
        let mut form = FormState::initialize(&LISTING_FORM, &listing()).unwrap();
        form.on_field_change("title", json!("Barista")).unwrap();
        assert_eq!(Value::Object(form.submission().unwrap()), json!({ "title": "Barista" }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut form = FormState::initialize(&LISTING_FORM, &listing()).unwrap();
        let err = form.on_field_change("createdAt", json!("now")).unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));
        assert!(!form.is_dirty());
    }

    #[rstest]
    #[case(FieldSpec::integer("n"), json!("1999"), json!(1999))]
    #[case(FieldSpec::integer("n"), json!(" 42 "), json!(42))]
    #[case(FieldSpec::integer("n"), json!(12.0), json!(12))]
    #[case(FieldSpec::integer("n"), json!(""), Value::Null)]
    #[case(FieldSpec::float("n"), json!("52000.50"), json!(52000.5))]
    #[case(FieldSpec::float("n"), json!(7), json!(7))]
    #[case(FieldSpec::relation("n"), json!("b2"), json!({ "connect": { "id": "b2" } }))]
    fn numeric_and_relation_coercion(#[case] spec: FieldSpec, #[case] raw: Value, #[case] expected: Value) {
        assert_eq!(coerce(&spec, raw).unwrap(), expected);
    }

    #[rstest]
    #[case(FieldSpec::integer("yearFounded"), json!("nineteen"))]
    #[case(FieldSpec::integer("yearFounded"), json!(12.5))]
    #[case(FieldSpec::float("salary"), json!("lots"))]
    #[case(FieldSpec::float("salary"), json!(true))]
    #[case(FieldSpec::text("name"), json!(5))]
    #[case(FieldSpec::relation("business"), json!(""))]
    fn coercion_failures_are_validation_errors(#[case] spec: FieldSpec, #[case] raw: Value) {
        assert!(matches!(coerce(&spec, raw), Err(PortError::Validation(_))));
    }

    #[tokio::test]
    async fn untouched_form_submits_nothing() {
        let gateway = RecordingGateway::new();
        let form = FormState::initialize(&LISTING_FORM, &listing()).unwrap();

        let outcome = submit(&gateway, &documents::UPDATE_JOB_LISTING, "updateJobListing", "j1", &form)
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Unchanged);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn invalid_number_fails_before_any_network_call() {
        let gateway = RecordingGateway::new();
        let mut form = FormState::initialize(&LISTING_FORM, &listing()).unwrap();
        form.on_field_change("salary", json!("a lot")).unwrap();

        let err = submit(&gateway, &documents::UPDATE_JOB_LISTING, "updateJobListing", "j1", &form)
            .await
            .unwrap_err();

        assert!(matches!(err, PortError::Validation(_)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn submit_sends_where_and_touched_data() {
        let gateway = RecordingGateway::new();
        gateway.respond(
            &documents::UPDATE_JOB_LISTING,
            json!({ "updateJobListing": { "id": "j1", "salary": 40000 } }),
        );
        let mut form = FormState::initialize(&LISTING_FORM, &listing()).unwrap();
        form.on_field_change("salary", json!("40000")).unwrap();

        let outcome = submit(&gateway, &documents::UPDATE_JOB_LISTING, "updateJobListing", "j1", &form)
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Saved(json!({ "id": "j1", "salary": 40000 })));
        assert_eq!(
            gateway.calls_to(&documents::UPDATE_JOB_LISTING),
            vec![json!({ "where": { "id": "j1" }, "data": { "salary": 40000.0 } })]
        );
    }

    #[tokio::test]
    async fn failed_submit_leaves_form_state_alone() {
        let gateway = RecordingGateway::new();
        gateway.respond_once(
            &documents::UPDATE_JOB_LISTING,
            Err(PortError::Api(vec!["boom".into()])),
        );
        let mut form = FormState::initialize(&LISTING_FORM, &listing()).unwrap();
        form.on_field_change("title", json!("Roaster")).unwrap();

        let result = submit(&gateway, &documents::UPDATE_JOB_LISTING, "updateJobListing", "j1", &form).await;

        assert!(matches!(result, Err(PortError::Api(_))));
        assert_eq!(form.value("title"), Some(&json!("Roaster")));
        assert_eq!(form.touched().collect::<Vec<_>>(), vec!["title"]);
    }
}
