use serde_json::Value;

use crate::api::Outcome;
use crate::endpoints;
use crate::fmt::display_value;
use crate::models::Person;
use crate::page::{Form, FormField, Page, PageEvent, SelectOption};
use crate::table::TableData;
use crate::view::{on_success, Activation, Section, Tag, View};

use super::{decoded, person_columns};

const LIST: Tag = "users";
const ADD: Tag = "add-user";
const UPDATE: Tag = "update-user";
const RECONFIRM: Tag = "reconfirm-user";
const DELETE: Tag = "delete-user";
const CONFIRM_DELETE: Tag = "confirm-delete-user";

const USER_TABLE: &str = "user-table";
const EDIT_FORM: &str = "add-edit-form";
const BTN_ADD: &str = "btn-add";
const BTN_UPDATE: &str = "btn-update";
const BTN_RESET: &str = "btn-reset";
const BTN_RECONFIRM: &str = "btn-reconfirm";

fn options(pairs: &[(&str, &str)]) -> Vec<SelectOption> {
    pairs.iter().map(|(v, l)| SelectOption::new(v, l)).collect()
}

fn edit_form() -> Form {
    Form::new(vec![
        FormField::text("id", "User ID", "").disabled(),
        FormField::text("first_name", "First Name", ""),
        FormField::text("last_name", "Last Name", ""),
        FormField::text("email", "Email address", ""),
        FormField::selector(
            "level",
            "Membership Level",
            options(&[("", "Select one"), ("USER", "User"), ("ADMIN", "Administrator")]),
        ),
        FormField::selector(
            "active",
            "Membership Status",
            options(&[("", "Select one"), ("true", "Active"), ("false", "Inactive")]),
        ),
        FormField::selector(
            "confirmed",
            "Email Confirmed",
            options(&[("", "Select one"), ("true", "True"), ("false", "False")]),
        ),
    ])
}

/// Admin listing of every user, with an add/edit form.
#[derive(Default)]
pub struct UsersView {
    people: Vec<Person>,
    /// Public id of the user loaded into the form by Edit.
    editing: Option<String>,
    pending_delete: Option<String>,
}

impl UsersView {
    fn load_into_form(&mut self, id: &str, page: &mut Page) {
        let Some(person) = self.people.iter().find(|p| p.id == id) else {
            return;
        };
        self.editing = Some(person.public_id().to_string());
        if let Some(form) = page.form_mut(EDIT_FORM) {
            form.set_value("id", &person.id);
            form.set_value("first_name", &person.first_name);
            form.set_value("last_name", &person.last_name);
            form.set_value("email", &person.email);
            form.set_value("level", &person.level);
            form.set_value("active", if person.active { "true" } else { "false" });
            form.set_value("confirmed", &display_value(&person.confirmed));
        }
        page.set_button_enabled(BTN_UPDATE, true);
        page.set_button_enabled(BTN_ADD, false);
        page.focus_element(EDIT_FORM);
    }

    fn reset(&mut self, page: &mut Page) {
        self.editing = None;
        if let Some(form) = page.form_mut(EDIT_FORM) {
            form.reset();
        }
        page.set_button_enabled(BTN_ADD, true);
        page.set_button_enabled(BTN_UPDATE, false);
    }

    fn submit(&mut self, button: &str, page: &mut Page, cx: &mut Activation) {
        let Some(fields) = page.form_data(EDIT_FORM).map(Form::to_json) else {
            return;
        };
        match (button, self.editing.as_deref()) {
            (BTN_ADD, _) => cx.request(ADD, endpoints::add_user(fields)),
            (BTN_UPDATE, Some(public_id)) => cx.request(UPDATE, endpoints::update_user(public_id, fields)),
            (BTN_RECONFIRM, Some(public_id)) => {
                cx.request(RECONFIRM, endpoints::reconfirm_user(public_id, fields))
            }
            (BTN_RECONFIRM, None) => page.set_message("Edit a user before resending confirmation."),
            _ => {}
        }
    }
}

fn message_of(body: &Option<Value>, key: &str) -> String {
    body.as_ref()
        .and_then(|b| b.get(key))
        .map(display_value)
        .unwrap_or_default()
}

impl View for UsersView {
    fn markup(&self) -> Page {
        Page::new("users")
            .table(
                USER_TABLE,
                TableData::with_columns(&person_columns()).actions(&["Edit", "Del"]),
            )
            .heading("edit-heading", "add/edit user")
            .form(EDIT_FORM, edit_form())
            .button(BTN_ADD, "Add", true)
            .button(BTN_UPDATE, "Update", false)
            .button(BTN_RESET, "Reset", true)
            .button(BTN_RECONFIRM, "Resend Confirmation", true)
    }

    fn section(&self) -> Section {
        Section::Settings
    }

    fn activate(&mut self, _page: &mut Page, cx: &mut Activation) {
        cx.request(LIST, endpoints::users());
    }

    fn on_response(&mut self, tag: Tag, outcome: Outcome, page: &mut Page, cx: &mut Activation) {
        match tag {
            LIST => on_success(outcome, page, |body, page| {
                if let Some(people) = decoded(page, endpoints::read_people(body)) {
                    if let Some(table) = page.table_mut(USER_TABLE) {
                        table.populate(&people, &person_columns(), |p| p.id.clone());
                    }
                    self.people = people;
                }
            }),
            ADD => on_success(outcome, page, |body, _| {
                let first = message_of(&body, "first_name");
                cx.reload_with_message(&format!("{first} successfully added."));
            }),
            UPDATE | RECONFIRM => on_success(outcome, page, |body, _| {
                cx.reload_with_message(&message_of(&body, "message"));
            }),
            DELETE => on_success(outcome, page, |_, _| {
                cx.reload_with_message("Successful delete of user");
            }),
            _ => {}
        }
    }

    fn on_event(&mut self, event: PageEvent, page: &mut Page, cx: &mut Activation) {
        match event {
            PageEvent::RowAction { table: USER_TABLE, key, action: 0 } => self.load_into_form(&key, page),
            PageEvent::RowAction { table: USER_TABLE, key, action: 1 } => {
                self.pending_delete = Some(key);
                cx.confirm("You are about to delete a member. Are you sure?", CONFIRM_DELETE);
            }
            PageEvent::Confirmed(CONFIRM_DELETE) => {
                if let Some(id) = self.pending_delete.take() {
                    cx.request(DELETE, endpoints::delete_user(&id));
                }
            }
            PageEvent::Click(BTN_RESET) => self.reset(page),
            PageEvent::Click(button) => self.submit(button, page, cx),
            PageEvent::Submit(EDIT_FORM) => {
                let button = if page.button_enabled(BTN_ADD) { BTN_ADD } else { BTN_UPDATE };
                self.submit(button, page, cx);
            }
            _ => {}
        }
    }
}
