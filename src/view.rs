use serde_json::Value;

use crate::api::{ApiRequest, Host, Outcome};
use crate::page::{Page, PageEvent};
use crate::session::Session;
use crate::storage::PREVIOUS_ACTION_MESSAGE_KEY;

/// Names a request or confirmation so its completion finds its handler.
pub type Tag = &'static str;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A hash route such as `#tree`, or `/` for home.
    Fragment(String),
    Login,
    /// Re-run the current route from scratch.
    Reload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Request { tag: Tag, request: ApiRequest },
    Alert(String),
    Confirm { prompt: String, tag: Tag },
    Store { key: String, value: Option<String> },
    Navigate(Location),
}

/// Which top-level menu a view belongs to; picks the aside links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Settings,
    Accounts,
    Journal,
    Hunt,
    None,
}

/// Everything one activation of a view may read or ask for. Built fresh for
/// every navigation and every callback, so nothing leaks between views.
#[derive(Debug, Clone, Default)]
pub struct Activation {
    pub token: String,
    pub current_entity: Option<String>,
    pub level: Option<String>,
    effects: Vec<Effect>,
}

impl Activation {
    pub fn new(session: Option<&Session>) -> Self {
        match session {
            Some(s) => Self {
                token: s.token.clone(),
                current_entity: s.current_entity.clone(),
                level: s.level(),
                effects: Vec::new(),
            },
            None => Self::default(),
        }
    }

    pub fn request(&mut self, tag: Tag, request: ApiRequest) {
        self.effects.push(Effect::Request { tag, request });
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.effects.push(Effect::Alert(message.into()));
    }

    pub fn confirm(&mut self, prompt: impl Into<String>, tag: Tag) {
        self.effects.push(Effect::Confirm {
            prompt: prompt.into(),
            tag,
        });
    }

    pub fn store(&mut self, key: &str, value: &str) {
        self.effects.push(Effect::Store {
            key: key.to_string(),
            value: Some(value.to_string()),
        });
    }

    pub fn remove(&mut self, key: &str) {
        self.effects.push(Effect::Store {
            key: key.to_string(),
            value: None,
        });
    }

    pub fn navigate(&mut self, location: Location) {
        self.effects.push(Effect::Navigate(location));
    }

    /// Leave a one-shot status line for the next page load, then reload.
    pub fn reload_with_message(&mut self, message: &str) {
        self.store(PREVIOUS_ACTION_MESSAGE_KEY, message);
        self.navigate(Location::Reload);
    }

    /// The selected entity, or a note in the message area when there is none.
    pub fn require_entity(&self, page: &mut Page) -> Option<String> {
        if self.current_entity.is_none() {
            page.set_message("No entity selected. Pick one under settings > me.");
        }
        self.current_entity.clone()
    }

    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}

impl Host for Activation {
    fn alert(&mut self, message: &str) {
        Activation::alert(self, message);
    }

    fn redirect_to_login(&mut self) {
        self.navigate(Location::Login);
    }
}

/// A screen: its markup plus the behavior wired up after it is mounted.
pub trait View {
    /// The document mounted into the main container.
    fn markup(&self) -> Page;

    fn section(&self) -> Section;

    /// Runs once, right after mounting.
    fn activate(&mut self, page: &mut Page, cx: &mut Activation);

    /// A request issued under `tag` completed for this activation.
    fn on_response(&mut self, _tag: Tag, _outcome: Outcome, _page: &mut Page, _cx: &mut Activation) {}

    fn on_event(&mut self, _event: PageEvent, _page: &mut Page, _cx: &mut Activation) {}
}

/// Route the common outcome shapes: a body to `ok`, failure text to the
/// message area, and nothing for the rest.
pub fn on_success(outcome: Outcome, page: &mut Page, ok: impl FnOnce(Option<Value>, &mut Page)) {
    match outcome {
        Outcome::Success(body) => ok(body, page),
        Outcome::Failure(message) => page.set_message(&message),
        Outcome::Nothing => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_with_message_stores_then_reloads() {
        let mut cx = Activation::default();
        cx.reload_with_message("Entity updated");
        assert_eq!(
            cx.into_effects(),
            vec![
                Effect::Store {
                    key: PREVIOUS_ACTION_MESSAGE_KEY.to_string(),
                    value: Some("Entity updated".to_string())
                },
                Effect::Navigate(Location::Reload),
            ]
        );
    }

    #[test]
    fn test_host_redirect_becomes_navigation() {
        let mut cx = Activation::default();
        Host::alert(&mut cx, "Error 401");
        cx.redirect_to_login();
        assert_eq!(
            cx.into_effects(),
            vec![
                Effect::Alert("Error 401".to_string()),
                Effect::Navigate(Location::Login)
            ]
        );
    }

    #[test]
    fn test_require_entity_writes_message() {
        let cx = Activation::default();
        let mut page = Page::new("tree");
        assert_eq!(cx.require_entity(&mut page), None);
        assert!(page.message.starts_with("No entity selected"));
    }

    #[test]
    fn test_on_success_routes_failure_to_message() {
        let mut page = Page::new("x");
        on_success(Outcome::Failure("error 404, gone".into()), &mut page, |_, _| {
            panic!("success handler must not run")
        });
        assert_eq!(page.message, "error 404, gone");
    }
}
