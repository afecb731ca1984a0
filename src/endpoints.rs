//! Request builders and response readers, one per API call site. List
//! endpoints disagree on shape (bare arrays vs. objects keyed by a field), so
//! every reader states the shape it expects.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::api::ApiRequest;
use crate::composer::JournalEntrySubmission;
use crate::error::{DeskError, Result};
use crate::models::{amount_of, AccountOption, AccountTreeNode, Entity, Hunt, JournalRecord, Person};

/// Master account types the tree view can display.
pub const MASTER_TYPE_KEYS: &[(&str, &str)] = &[
    ("ASSET_LONG", "Assets, Long Term"),
    ("ASSET_SHORT", "Assets, Short Term"),
    ("ASSET_OWED", "Assets, Owed"),
    ("EXPENSE_OPERATING", "Expenses, Operating"),
    ("EXPENSE_COGR", "Expenses, COGR"),
    ("EQUITY", "Equity"),
    ("LIABILITY", "Liabilities"),
    ("INCOME", "Income"),
];

fn present(body: Option<Value>) -> Result<Value> {
    body.ok_or_else(|| DeskError::Api("empty response".to_string()))
}

fn bare<T: DeserializeOwned>(body: Option<Value>) -> Result<T> {
    Ok(serde_json::from_value(present(body)?)?)
}

fn keyed<T: DeserializeOwned>(body: Option<Value>, key: &str) -> Result<T> {
    let mut value = present(body)?;
    let inner = value
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| DeskError::Api(format!("response missing \"{key}\"")))?;
    Ok(serde_json::from_value(inner)?)
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

pub fn token(email: &str, password: &str) -> ApiRequest {
    ApiRequest::post("/token").anonymous().form(vec![
        ("username".to_string(), email.to_string()),
        ("password".to_string(), password.to_string()),
    ])
}

pub fn read_token(body: Option<Value>) -> Result<String> {
    keyed(body, "access_token")
}

pub fn password_reset(email: &str) -> ApiRequest {
    ApiRequest::post("/password_reset_request")
        .anonymous()
        .json(json!({ "email": email }))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub fn me() -> ApiRequest {
    ApiRequest::get("/users/me")
}

pub fn read_person(body: Option<Value>) -> Result<Person> {
    bare(body)
}

pub fn users() -> ApiRequest {
    ApiRequest::get("/users")
}

pub fn active_users() -> ApiRequest {
    ApiRequest::get("/users/active")
}

/// `/users`, `/users/active` and `/entities/users/{id}` return bare arrays.
pub fn read_people(body: Option<Value>) -> Result<Vec<Person>> {
    bare(body)
}

pub fn add_user(fields: Value) -> ApiRequest {
    ApiRequest::post("/users").json(fields)
}

pub fn update_user(public_id: &str, fields: Value) -> ApiRequest {
    ApiRequest::put(format!("/users/{public_id}")).json(fields)
}

pub fn reconfirm_user(public_id: &str, fields: Value) -> ApiRequest {
    ApiRequest::put(format!("/users/reconfirm/{public_id}")).json(fields)
}

pub fn delete_user(id: &str) -> ApiRequest {
    ApiRequest::delete(format!("/users/{id}"))
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

pub fn entities() -> ApiRequest {
    ApiRequest::get("/entities")
}

pub fn my_entities() -> ApiRequest {
    ApiRequest::get("/entities/me")
}

pub fn read_entities(body: Option<Value>) -> Result<Vec<Entity>> {
    bare(body)
}

pub fn entity_members(entity_id: &str) -> ApiRequest {
    ApiRequest::get(format!("/entities/users/{entity_id}"))
}

pub fn add_entity(fields: Value) -> ApiRequest {
    ApiRequest::post("/entities").json(fields)
}

pub fn update_entity(entity_id: &str, fields: Value) -> ApiRequest {
    ApiRequest::put(format!("/entities/{entity_id}")).json(fields)
}

pub fn delete_entity(entity_id: &str) -> ApiRequest {
    ApiRequest::delete(format!("/entities/{entity_id}"))
}

pub fn add_member(entity_id: &str, user_id: &str) -> ApiRequest {
    ApiRequest::post(format!("/entities/add-user/{entity_id}/{user_id}"))
}

pub fn remove_member(entity_id: &str, user_id: &str) -> ApiRequest {
    ApiRequest::delete(format!("/entities/remove-user/{entity_id}/{user_id}"))
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub fn account_tree(entity_id: &str, master_type_key: &str) -> ApiRequest {
    ApiRequest::get("/accounts/master")
        .query("entity_id", entity_id)
        .query("master_type_key", master_type_key)
}

pub fn read_tree(body: Option<Value>) -> Result<AccountTreeNode> {
    bare(body)
}

pub fn account_amounts(entity_id: &str) -> ApiRequest {
    ApiRequest::get("/accounts/amounts").query("entity_id", entity_id)
}

/// Object of account id to amount; amounts may arrive as strings.
pub fn read_amounts(body: Option<Value>) -> Result<HashMap<String, f64>> {
    match present(body)? {
        Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.clone(), amount_of(v))).collect()),
        other => Err(DeskError::Api(format!("expected an object of amounts, got {other}"))),
    }
}

pub fn list_of_accounts(entity_id: &str, account_type: Option<&str>) -> ApiRequest {
    let request = ApiRequest::get("/accounts/list_of_accounts").query("entity_id", entity_id);
    match account_type {
        Some(kind) => request.query("account_type", kind),
        None => request,
    }
}

pub fn master_list(entity_id: &str, master_type_key: &str) -> ApiRequest {
    ApiRequest::get("/accounts/master_list")
        .query("entity_id", entity_id)
        .query("master_type_key", master_type_key)
        .query("b_only_childless", "true")
}

/// `{"accounts": [...]}` from both account list endpoints.
pub fn read_accounts(body: Option<Value>) -> Result<Vec<AccountOption>> {
    keyed(body, "accounts")
}

pub fn account_names(entity_id: &str) -> ApiRequest {
    ApiRequest::get("/accounts/list_of_names").query("entity_id", entity_id)
}

/// `{"account_names": [...]}`, returned sorted.
pub fn read_account_names(body: Option<Value>) -> Result<Vec<String>> {
    let mut names: Vec<String> = keyed(body, "account_names")?;
    names.sort();
    Ok(names)
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalFilter {
    pub account_name: Option<String>,
    pub max_rows: Option<u32>,
    /// Inclusive start and stop dates, YYYY-MM-DD.
    pub dates: Option<(String, String)>,
}

pub fn journal(entity_id: &str, filter: &JournalFilter) -> ApiRequest {
    let mut request = ApiRequest::get("/journal/").query("entity_id", entity_id);
    if let Some(name) = &filter.account_name {
        request = request.query("account_name", name.as_str());
    }
    if let Some(max) = filter.max_rows {
        request = request.query("max_rows", max.to_string());
    }
    if let Some((start, stop)) = &filter.dates {
        request = request
            .query("start_date", start.as_str())
            .query("stop_date", stop.as_str());
    }
    request
}

pub fn read_journal(body: Option<Value>) -> Result<Vec<JournalRecord>> {
    keyed(body, "journal_entries")
}

pub fn post_journal(entry: &JournalEntrySubmission) -> Result<ApiRequest> {
    Ok(ApiRequest::post("/journal/").json(serde_json::to_value(entry)?))
}

// ---------------------------------------------------------------------------
// Hunts
// ---------------------------------------------------------------------------

pub fn active_hunts() -> ApiRequest {
    ApiRequest::get("/hunts/active")
}

/// `None` when the response carries no `hunts` key at all.
pub fn read_hunts(body: Option<&Value>) -> Option<Vec<Hunt>> {
    let hunts = body?.get("hunts")?;
    serde_json::from_value(hunts.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Body, Method};

    #[test]
    fn test_token_is_anonymous_form() {
        let req = token("a@b.c", "pw");
        assert_eq!(req.method, Method::Post);
        assert!(!req.authenticated);
        assert_eq!(
            req.body,
            Some(Body::Form(vec![
                ("username".into(), "a@b.c".into()),
                ("password".into(), "pw".into())
            ]))
        );
        assert_eq!(
            read_token(Some(json!({"access_token": "t", "token_type": "bearer"}))).unwrap(),
            "t"
        );
    }

    #[test]
    fn test_bare_array_endpoints() {
        let people = read_people(Some(json!([
            {"id": "u1", "first_name": "A", "last_name": "B", "active": true}
        ])))
        .unwrap();
        assert_eq!(people.len(), 1);
        let entities = read_entities(Some(json!([{"id": "e1", "name": "Acme"}]))).unwrap();
        assert_eq!(entities[0].name, "Acme");
        assert!(read_entities(Some(json!({"entities": []}))).is_err());
    }

    #[test]
    fn test_wrapped_endpoints() {
        let accounts = read_accounts(Some(json!({
            "accounts": [{"account.id": "a1", "account.name": "Rent"}]
        })))
        .unwrap();
        assert_eq!(accounts[0].id, "a1");
        assert!(read_accounts(Some(json!([]))).is_err());

        let names = read_account_names(Some(json!({"account_names": ["Rent", "Cash", "Food"]}))).unwrap();
        assert_eq!(names, vec!["Cash", "Food", "Rent"]);

        let journal = read_journal(Some(json!({"journal_entries": [
            {"date": "2025-01-02", "user": "ada", "vendor": null, "description": "x",
             "debits": [{"account": "Rent", "amount": 5}], "credits": []}
        ]})))
        .unwrap();
        assert_eq!(journal[0].debits[0].amount, 5.0);
    }

    #[test]
    fn test_amounts_accept_strings() {
        let amounts = read_amounts(Some(json!({"a": 1.5, "b": "2.25"}))).unwrap();
        assert_eq!(amounts["a"], 1.5);
        assert_eq!(amounts["b"], 2.25);
        assert!(read_amounts(None).is_err());
    }

    #[test]
    fn test_journal_query_only_has_chosen_filters() {
        let plain = journal("e1", &JournalFilter::default());
        assert_eq!(plain.query, vec![("entity_id".to_string(), "e1".to_string())]);

        let filter = JournalFilter {
            account_name: Some("Rent".into()),
            max_rows: Some(100),
            dates: Some(("2025-01-01".into(), "2025-12-31".into())),
        };
        let keys: Vec<String> = journal("e1", &filter).query.into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["entity_id", "account_name", "max_rows", "start_date", "stop_date"]
        );
    }

    #[test]
    fn test_read_hunts() {
        assert_eq!(read_hunts(None), None);
        assert_eq!(read_hunts(Some(&json!({}))), None);
        let hunts = read_hunts(Some(&json!({"hunts": [{"status": "hunt_open"}]}))).unwrap();
        assert_eq!(hunts[0].status, "hunt_open");
    }

    #[test]
    fn test_member_paths() {
        assert_eq!(add_member("e1", "u1").path, "/entities/add-user/e1/u1");
        assert_eq!(remove_member("e1", "u1").method, Method::Delete);
        assert_eq!(reconfirm_user("p1", json!({})).path, "/users/reconfirm/p1");
    }
}
