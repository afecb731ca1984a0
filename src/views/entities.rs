use crate::api::Outcome;
use crate::endpoints;
use crate::fmt::{display_value, short_id};
use crate::models::{Entity, Person};
use crate::page::{Form, FormField, Page, PageEvent, SelectOption};
use crate::table::{Column, TableData};
use crate::view::{on_success, Activation, Section, Tag, View};

use super::{decoded, entity_columns};

const LIST: Tag = "entities";
const ACTIVE_USERS: Tag = "active-users";
const MEMBERS: Tag = "members";
const ADD: Tag = "add-entity";
const UPDATE: Tag = "update-entity";
const DELETE: Tag = "delete-entity";
const ADD_MEMBER: Tag = "add-member";
const REMOVE_MEMBER: Tag = "remove-member";
const CONFIRM_DELETE: Tag = "confirm-delete-entity";

const ENTITY_TABLE: &str = "entity-table";
const MEMBERS_TABLE: &str = "users-table";
const EDIT_FORM: &str = "add-edit-form";
const MEMBER_FORM: &str = "add-user-form";
const BTN_ADD: &str = "btn-add";
const BTN_UPDATE: &str = "btn-update";
const BTN_RESET: &str = "btn-reset";
const BTN_ADD_USER: &str = "btn-add-user";

const NO_USER: &str = "-1";

fn member_columns() -> Vec<Column<Person>> {
    vec![
        Column::text("id", |p: &Person| short_id(&p.id)),
        Column::text("name", |p: &Person| p.full_name()),
    ]
}

fn user_options(people: &[Person]) -> Vec<SelectOption> {
    std::iter::once(SelectOption::new(NO_USER, "--select user--"))
        .chain(people.iter().map(|p| SelectOption::new(&p.id, &p.full_name())))
        .collect()
}

/// Admin screen for entities and their membership.
#[derive(Default)]
pub struct EntitiesView {
    entities: Vec<Entity>,
    /// Entity picked with Select; target of update and membership changes.
    selected: Option<String>,
    pending_delete: Option<String>,
}

impl EntitiesView {
    fn select(&mut self, id: String, page: &mut Page, cx: &mut Activation) {
        let name = self
            .entities
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.clone())
            .unwrap_or_default();
        if let Some(form) = page.form_mut(EDIT_FORM) {
            form.set_value("id", &id);
            form.set_value("name", &name);
        }
        page.set_button_enabled(BTN_UPDATE, true);
        page.set_button_enabled(BTN_ADD, false);
        page.set_button_enabled(BTN_ADD_USER, true);
        cx.request(MEMBERS, endpoints::entity_members(&id));
        self.selected = Some(id);
    }

    fn reset(&mut self, page: &mut Page) {
        if let Some(form) = page.form_mut(EDIT_FORM) {
            form.reset();
        }
        page.set_button_enabled(BTN_ADD, true);
        page.set_button_enabled(BTN_UPDATE, false);
    }

    fn save(&mut self, button: &str, page: &mut Page, cx: &mut Activation) {
        let Some(fields) = page.form_data(EDIT_FORM).map(Form::to_json) else {
            return;
        };
        match (button, self.selected.as_deref()) {
            (BTN_ADD, _) => cx.request(ADD, endpoints::add_entity(fields)),
            (BTN_UPDATE, Some(id)) => cx.request(UPDATE, endpoints::update_entity(id, fields)),
            _ => {}
        }
    }

    fn add_member(&mut self, page: &mut Page, cx: &mut Activation) {
        let user = page
            .form_data(MEMBER_FORM)
            .map(|f| f.value("user_id"))
            .unwrap_or_default();
        match self.selected.as_deref() {
            Some(entity) if !user.is_empty() && user != NO_USER => {
                cx.request(ADD_MEMBER, endpoints::add_member(entity, &user));
            }
            Some(_) => page.set_message("Select a user to add."),
            None => {}
        }
    }
}

impl View for EntitiesView {
    fn markup(&self) -> Page {
        Page::new("entities")
            .table(
                ENTITY_TABLE,
                TableData::with_columns(&entity_columns()).actions(&["Select", "Del"]),
            )
            .heading("edit-heading", "add/edit entity")
            .form(
                EDIT_FORM,
                Form::new(vec![
                    FormField::text("id", "Entity ID", "").disabled(),
                    FormField::text("name", "Name", ""),
                ]),
            )
            .button(BTN_ADD, "Add", true)
            .button(BTN_UPDATE, "Update", false)
            .button(BTN_RESET, "Reset", true)
            .heading("members-heading", "Current Users")
            .table(
                MEMBERS_TABLE,
                TableData::with_columns(&member_columns()).actions(&["Remove"]),
            )
            .heading("add-user-heading", "Add Users to Entity")
            .form(
                MEMBER_FORM,
                Form::new(vec![FormField::selector("user_id", "User", user_options(&[]))]),
            )
            .button(BTN_ADD_USER, "Add", false)
    }

    fn section(&self) -> Section {
        Section::Settings
    }

    fn activate(&mut self, _page: &mut Page, cx: &mut Activation) {
        cx.request(LIST, endpoints::entities());
    }

    fn on_response(&mut self, tag: Tag, outcome: Outcome, page: &mut Page, cx: &mut Activation) {
        match tag {
            LIST => on_success(outcome, page, |body, page| {
                if let Some(entities) = decoded(page, endpoints::read_entities(body)) {
                    if let Some(table) = page.table_mut(ENTITY_TABLE) {
                        table.populate(&entities, &entity_columns(), |e| e.id.clone());
                    }
                    self.entities = entities;
                    cx.request(ACTIVE_USERS, endpoints::active_users());
                }
            }),
            ACTIVE_USERS => on_success(outcome, page, |body, page| {
                if let Some(people) = decoded(page, endpoints::read_people(body)) {
                    if let Some(form) = page.form_mut(MEMBER_FORM) {
                        form.set_options("user_id", user_options(&people));
                    }
                }
            }),
            MEMBERS => on_success(outcome, page, |body, page| {
                if let Some(people) = decoded(page, endpoints::read_people(body)) {
                    if let Some(table) = page.table_mut(MEMBERS_TABLE) {
                        table.populate(&people, &member_columns(), |p| p.id.clone());
                    }
                }
            }),
            ADD => on_success(outcome, page, |body, _| {
                let name = body
                    .as_ref()
                    .and_then(|b| b.get("name"))
                    .map(display_value)
                    .unwrap_or_default();
                cx.reload_with_message(&format!("{name} successfully added."));
            }),
            UPDATE => on_success(outcome, page, |body, _| {
                let message = body
                    .as_ref()
                    .and_then(|b| b.get("message"))
                    .map(display_value)
                    .unwrap_or_default();
                cx.reload_with_message(&message);
            }),
            DELETE => on_success(outcome, page, |_, _| {
                cx.reload_with_message("Successful delete of entity");
            }),
            ADD_MEMBER => on_success(outcome, page, |_, _| {
                cx.reload_with_message("User added to Entity");
            }),
            REMOVE_MEMBER => on_success(outcome, page, |_, _| {
                cx.reload_with_message("Successful removal of user from entity");
            }),
            _ => {}
        }
    }

    fn on_event(&mut self, event: PageEvent, page: &mut Page, cx: &mut Activation) {
        match event {
            PageEvent::RowAction { table: ENTITY_TABLE, key, action: 0 } => self.select(key, page, cx),
            PageEvent::RowAction { table: ENTITY_TABLE, key, action: 1 } => {
                self.pending_delete = Some(key);
                cx.confirm("You are about to delete an entity. Are you sure?", CONFIRM_DELETE);
            }
            PageEvent::RowAction { table: MEMBERS_TABLE, key, .. } => {
                if let Some(entity) = &self.selected {
                    cx.request(REMOVE_MEMBER, endpoints::remove_member(entity, &key));
                }
            }
            PageEvent::Confirmed(CONFIRM_DELETE) => {
                if let Some(id) = self.pending_delete.take() {
                    cx.request(DELETE, endpoints::delete_entity(&id));
                }
            }
            PageEvent::Click(BTN_RESET) => self.reset(page),
            PageEvent::Click(BTN_ADD_USER) | PageEvent::Submit(MEMBER_FORM) => self.add_member(page, cx),
            PageEvent::Click(button) => self.save(button, page, cx),
            PageEvent::Submit(EDIT_FORM) => {
                let button = if page.button_enabled(BTN_ADD) { BTN_ADD } else { BTN_UPDATE };
                self.save(button, page, cx);
            }
            _ => {}
        }
    }
}
