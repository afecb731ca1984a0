pub mod entities;
pub mod hunt;
pub mod journal;
pub mod journal_view;
pub mod login;
pub mod logout;
pub mod me;
pub mod tree;
pub mod users;

use crate::error::Result;
use crate::fmt::{display_value, short_id};
use crate::models::{Entity, Person};
use crate::page::Page;
use crate::table::Column;

/// Unwrap a decoded response, or put the decode error in the message area.
pub(crate) fn decoded<T>(page: &mut Page, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "unexpected response shape");
            page.set_message(&e.to_string());
            None
        }
    }
}

pub(crate) fn person_columns() -> Vec<Column<Person>> {
    vec![
        Column::text("id", |p: &Person| short_id(&p.id)),
        Column::text("first", |p: &Person| p.first_name.clone()),
        Column::text("last", |p: &Person| p.last_name.clone()),
        Column::text("email", |p: &Person| p.email.clone()),
        Column::text("level", |p: &Person| p.level.clone()),
        Column::text("status", |p: &Person| p.status().to_string()),
        Column::text("confirmed", |p: &Person| display_value(&p.confirmed)),
    ]
}

pub(crate) fn entity_columns() -> Vec<Column<Entity>> {
    vec![
        Column::text("id", |e: &Entity| short_id(&e.id)),
        Column::text("name", |e: &Entity| e.name.clone()),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    use serde_json::Value;

    use crate::api::{ApiRequest, Outcome};
    use crate::page::{Page, PageEvent};
    use crate::session::Session;
    use crate::view::{Activation, Effect, Tag, View};

    /// Drives one view without an app: mounts it, then feeds it responses and
    /// events, collecting whatever effects it asks for.
    pub struct Harness {
        pub view: Box<dyn View>,
        pub page: Page,
        pub session: Session,
    }

    impl Harness {
        pub fn new(view: Box<dyn View>, entity: Option<&str>) -> Self {
            let page = view.markup();
            Self {
                view,
                page,
                session: Session {
                    token: "tok".to_string(),
                    current_entity: entity.map(str::to_string),
                },
            }
        }

        fn cx(&self) -> Activation {
            Activation::new(Some(&self.session))
        }

        pub fn activate(&mut self) -> Vec<Effect> {
            let mut cx = self.cx();
            self.view.activate(&mut self.page, &mut cx);
            cx.into_effects()
        }

        pub fn respond(&mut self, tag: Tag, outcome: Outcome) -> Vec<Effect> {
            let mut cx = self.cx();
            self.view.on_response(tag, outcome, &mut self.page, &mut cx);
            cx.into_effects()
        }

        pub fn ok(&mut self, tag: Tag, body: Value) -> Vec<Effect> {
            self.respond(tag, Outcome::Success(Some(body)))
        }

        pub fn event(&mut self, event: PageEvent) -> Vec<Effect> {
            let mut cx = self.cx();
            self.view.on_event(event, &mut self.page, &mut cx);
            cx.into_effects()
        }
    }

    pub fn requests(effects: &[Effect]) -> Vec<(Tag, ApiRequest)> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Request { tag, request } => Some((*tag, request.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn paths(effects: &[Effect]) -> Vec<String> {
        requests(effects).into_iter().map(|(_, r)| r.path).collect()
    }
}
