use crate::api::Outcome;
use crate::endpoints;
use crate::page::{Page, PageEvent};
use crate::storage::CURRENT_ENTITY_KEY;
use crate::table::{Row, TableData};
use crate::view::{on_success, Activation, Section, Tag, View};

use super::{decoded, entity_columns, person_columns};

const PROFILE: Tag = "profile";
const MY_ENTITIES: Tag = "my-entities";

const USER_TABLE: &str = "user-table";
const ENTITIES_TABLE: &str = "entities-table";

/// The signed-in user's profile and the entities they can switch between.
#[derive(Default)]
pub struct MeView;

impl View for MeView {
    fn markup(&self) -> Page {
        let entities = TableData::new(&["id", "name", "selected"]).actions(&["Select"]);
        Page::new("My Profile")
            .table(USER_TABLE, TableData::with_columns(&person_columns()))
            .heading("entities-heading", "my entities")
            .table(ENTITIES_TABLE, entities)
    }

    fn section(&self) -> Section {
        Section::Settings
    }

    fn activate(&mut self, _page: &mut Page, cx: &mut Activation) {
        cx.request(PROFILE, endpoints::me());
        cx.request(MY_ENTITIES, endpoints::my_entities());
    }

    fn on_response(&mut self, tag: Tag, outcome: Outcome, page: &mut Page, cx: &mut Activation) {
        match tag {
            PROFILE => on_success(outcome, page, |body, page| {
                if let Some(person) = decoded(page, endpoints::read_person(body)) {
                    if let Some(table) = page.table_mut(USER_TABLE) {
                        table.populate(&[person], &person_columns(), |p| p.id.clone());
                    }
                }
            }),
            MY_ENTITIES => {
                let current = cx.current_entity.clone();
                on_success(outcome, page, |body, page| {
                    let Some(entities) = decoded(page, endpoints::read_entities(body)) else {
                        return;
                    };
                    let columns = entity_columns();
                    if let Some(table) = page.table_mut(ENTITIES_TABLE) {
                        table.rows = entities
                            .iter()
                            .map(|e| {
                                let mut cells: Vec<String> =
                                    columns.iter().map(|c| (c.extract)(e)).collect();
                                let selected = current.as_deref() == Some(e.id.as_str());
                                cells.push(if selected { "SELECTED" } else { "" }.to_string());
                                Row::keyed(e.id.clone(), cells)
                            })
                            .collect();
                        table.selected = 0;
                    }
                    tracing::debug!(count = entities.len(), "entities loaded");
                });
            }
            _ => {}
        }
    }

    fn on_event(&mut self, event: PageEvent, _page: &mut Page, cx: &mut Activation) {
        if let PageEvent::RowAction {
            table: ENTITIES_TABLE,
            key,
            action: 0,
        } = event
        {
            if cx.current_entity.as_deref() != Some(key.as_str()) {
                cx.store(CURRENT_ENTITY_KEY, &key);
                cx.reload_with_message("Entity updated");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::storage::PREVIOUS_ACTION_MESSAGE_KEY;
    use crate::view::{Effect, Location};
    use crate::views::testing::{paths, Harness};

    #[test]
    fn test_activate_fetches_profile_and_entities() {
        let mut h = Harness::new(Box::new(MeView), Some("e1"));
        assert_eq!(paths(&h.activate()), vec!["/users/me", "/entities/me"]);
    }

    #[test]
    fn test_entities_mark_current() {
        let mut h = Harness::new(Box::new(MeView), Some("e2"));
        h.activate();
        h.ok(
            MY_ENTITIES,
            json!([{"id": "e1", "name": "Home"}, {"id": "e2", "name": "Farm"}]),
        );
        let table = h.page.table_data(ENTITIES_TABLE).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells[2], "");
        assert_eq!(table.rows[1].cells, vec!["e2", "Farm", "SELECTED"]);
    }

    #[test]
    fn test_profile_row() {
        let mut h = Harness::new(Box::new(MeView), None);
        h.ok(
            PROFILE,
            json!({"id": "abcdef", "first_name": "Ada", "last_name": "King",
                   "email": "ada@x", "level": "ADMIN", "active": false, "confirmed": true}),
        );
        let table = h.page.table_data(USER_TABLE).unwrap();
        assert_eq!(
            table.rows[0].cells,
            vec!["abcd", "Ada", "King", "ada@x", "ADMIN", "Disabled", "true"]
        );
    }

    #[test]
    fn test_select_other_entity_stores_and_reloads() {
        let mut h = Harness::new(Box::new(MeView), Some("e1"));
        let effects = h.event(PageEvent::RowAction {
            table: ENTITIES_TABLE,
            key: "e2".into(),
            action: 0,
        });
        assert_eq!(
            effects,
            vec![
                Effect::Store {
                    key: CURRENT_ENTITY_KEY.into(),
                    value: Some("e2".into())
                },
                Effect::Store {
                    key: PREVIOUS_ACTION_MESSAGE_KEY.into(),
                    value: Some("Entity updated".into())
                },
                Effect::Navigate(Location::Reload),
            ]
        );
    }

    #[test]
    fn test_select_same_entity_does_nothing() {
        let mut h = Harness::new(Box::new(MeView), Some("e1"));
        let effects = h.event(PageEvent::RowAction {
            table: ENTITIES_TABLE,
            key: "e1".into(),
            action: 0,
        });
        assert!(effects.is_empty());
    }

    #[test]
    fn test_failure_goes_to_message() {
        let mut h = Harness::new(Box::new(MeView), None);
        h.respond(PROFILE, Outcome::Failure("error 500, boom".into()));
        assert_eq!(h.page.message, "error 500, boom");
    }
}
