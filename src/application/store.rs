//! In-memory resource store backing the REST routes.
//!
//! Starts from the loaded [`Dataset`]; writes change only the in-memory copy
//! and are lost on restart.

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::filtering::{filter_records, matches_id, scalar_text, sort_records};
use super::relations::{attach_relations, singularize};
use crate::domain::{Dataset, QueryParams};
use crate::shared::ApiError;

pub struct ResourceStore {
    resources: RwLock<Map<String, Value>>,
}

impl ResourceStore {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            resources: RwLock::new(dataset.into_resources()),
        }
    }

    pub async fn resource_names(&self) -> Vec<String> {
        self.resources.read().await.keys().cloned().collect()
    }

    /// `GET /db`: the whole current document, writes included.
    pub async fn snapshot(&self) -> Value {
        Value::Object(self.resources.read().await.clone())
    }

    /// `GET /<resource>`: the whole matched collection (filtered, searched,
    /// sorted, relations attached) or the singular value.
    pub async fn list(&self, resource: &str, query: &QueryParams) -> Result<Value, ApiError> {
        let resources = self.resources.read().await;
        let value = resources
            .get(resource)
            .ok_or_else(|| ApiError::UnknownResource(resource.to_string()))?;

        let Value::Array(records) = value else {
            return Ok(value.clone());
        };

        let mut matched = filter_records(records.clone(), query);
        sort_records(&mut matched, query);
        for record in &mut matched {
            attach_relations(record, resource, query, &resources);
        }

        debug!(resource, total = records.len(), matched = matched.len(), "Listed collection");
        Ok(Value::Array(matched))
    }

    /// `GET /<parent>/<id>/<child>`: children pointing at one parent record.
    pub async fn list_nested(
        &self,
        parent: &str,
        id: &str,
        child: &str,
        query: &QueryParams,
    ) -> Result<Value, ApiError> {
        let resources = self.resources.read().await;
        let parents = collection(&resources, parent)?;
        if !parents.iter().any(|record| matches_id(record.get("id"), id)) {
            return Err(ApiError::not_found(parent, id));
        }

        let children = collection(&resources, child)?;
        let foreign_key = format!("{}Id", singularize(parent));
        let related: Vec<Value> = children
            .iter()
            .filter(|record| matches_id(record.get(&foreign_key), id))
            .cloned()
            .collect();

        let mut matched = filter_records(related, query);
        sort_records(&mut matched, query);
        for record in &mut matched {
            attach_relations(record, child, query, &resources);
        }
        Ok(Value::Array(matched))
    }

    /// `GET /<resource>/<id>`
    pub async fn get(
        &self,
        resource: &str,
        id: &str,
        query: &QueryParams,
    ) -> Result<Value, ApiError> {
        let resources = self.resources.read().await;
        let records = collection(&resources, resource)?;
        let mut record = records
            .iter()
            .find(|record| matches_id(record.get("id"), id))
            .cloned()
            .ok_or_else(|| ApiError::not_found(resource, id))?;

        attach_relations(&mut record, resource, query, &resources);
        Ok(record)
    }

    /// `POST /<resource>`: stores `body`, assigning an id when it has none.
    pub async fn create(&self, resource: &str, body: Value) -> Result<Value, ApiError> {
        let mut fields = into_object(body)?;
        let mut resources = self.resources.write().await;
        let records = collection_mut(&mut resources, resource)?;

        let id = match fields.get("id").filter(|id| !id.is_null()) {
            Some(id) => {
                let id_text = scalar_text(id)
                    .ok_or_else(|| ApiError::InvalidBody("id must be a string or number".into()))?;
                if records.iter().any(|record| matches_id(record.get("id"), &id_text)) {
                    return Err(ApiError::Conflict {
                        resource: resource.to_string(),
                        id: id_text,
                    });
                }
                id.clone()
            }
            None => next_id(records),
        };

        fields.insert("id".to_string(), id);
        let record = Value::Object(fields);
        records.push(record.clone());
        debug!(resource, id = ?record.get("id"), "Created record");
        Ok(record)
    }

    /// `PUT /<resource>/<id>`: replaces the record, keeping its id.
    pub async fn replace(&self, resource: &str, id: &str, body: Value) -> Result<Value, ApiError> {
        let mut fields = into_object(body)?;
        let mut resources = self.resources.write().await;
        let record = find_mut(&mut resources, resource, id)?;

        if let Some(existing_id) = record.get("id").cloned() {
            fields.insert("id".to_string(), existing_id);
        }
        *record = Value::Object(fields);
        Ok(record.clone())
    }

    /// `PATCH /<resource>/<id>`: shallow merge of `body` into the record.
    pub async fn patch(&self, resource: &str, id: &str, body: Value) -> Result<Value, ApiError> {
        let changes = into_object(body)?;
        let mut resources = self.resources.write().await;
        let record = find_mut(&mut resources, resource, id)?;

        if let Value::Object(fields) = record {
            for (key, value) in changes {
                if key != "id" {
                    fields.insert(key, value);
                }
            }
        }
        Ok(record.clone())
    }

    /// `DELETE /<resource>/<id>`
    pub async fn delete(&self, resource: &str, id: &str) -> Result<Value, ApiError> {
        let mut resources = self.resources.write().await;
        let records = collection_mut(&mut resources, resource)?;
        let position = records
            .iter()
            .position(|record| matches_id(record.get("id"), id))
            .ok_or_else(|| ApiError::not_found(resource, id))?;

        records.remove(position);
        debug!(resource, id, "Deleted record");
        Ok(Value::Object(Map::new()))
    }

    /// `PUT|POST|PATCH /<singular>`: replace, or merge when `merge` is set
    /// and both sides are objects.
    pub async fn update_singular(
        &self,
        resource: &str,
        body: Value,
        merge: bool,
    ) -> Result<Value, ApiError> {
        let mut resources = self.resources.write().await;
        let current = resources
            .get_mut(resource)
            .filter(|value| !value.is_array())
            .ok_or_else(|| ApiError::UnknownResource(resource.to_string()))?;

        match body {
            Value::Object(changes) if merge && current.is_object() => {
                if let Value::Object(fields) = current {
                    for (key, value) in changes {
                        fields.insert(key, value);
                    }
                }
            }
            body => *current = body,
        }
        Ok(current.clone())
    }

    pub async fn is_collection(&self, resource: &str) -> Option<bool> {
        self.resources
            .read()
            .await
            .get(resource)
            .map(Value::is_array)
    }
}

fn collection<'r>(
    resources: &'r Map<String, Value>,
    resource: &str,
) -> Result<&'r Vec<Value>, ApiError> {
    match resources.get(resource) {
        Some(Value::Array(records)) => Ok(records),
        _ => Err(ApiError::UnknownResource(resource.to_string())),
    }
}

fn collection_mut<'r>(
    resources: &'r mut Map<String, Value>,
    resource: &str,
) -> Result<&'r mut Vec<Value>, ApiError> {
    match resources.get_mut(resource) {
        Some(Value::Array(records)) => Ok(records),
        _ => Err(ApiError::UnknownResource(resource.to_string())),
    }
}

fn find_mut<'r>(
    resources: &'r mut Map<String, Value>,
    resource: &str,
    id: &str,
) -> Result<&'r mut Value, ApiError> {
    collection_mut(resources, resource)?
        .iter_mut()
        .find(|record| matches_id(record.get("id"), id))
        .ok_or_else(|| ApiError::not_found(resource, id))
}

fn into_object(body: Value) -> Result<Map<String, Value>, ApiError> {
    match body {
        Value::Object(fields) => Ok(fields),
        other => Err(ApiError::InvalidBody(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Numeric collections continue from their largest id; collections keyed
/// by strings, or whose largest id is `i64::MAX`, get a UUID.
fn next_id(records: &[Value]) -> Value {
    let ids: Vec<&Value> = records.iter().filter_map(|record| record.get("id")).collect();
    let max_numeric = ids.iter().filter_map(|id| id.as_i64()).max();

    match max_numeric {
        Some(max) => match max.checked_add(1) {
            Some(next) => Value::from(next),
            None => uuid_id(),
        },
        None if ids.iter().any(|id| id.is_string()) => uuid_id(),
        None => Value::from(1),
    }
}

fn uuid_id() -> Value {
    Value::String(Uuid::new_v4().to_string())
}
