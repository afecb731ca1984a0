//! The application shell: owns the mounted page and the active view, applies
//! the effects views ask for, and routes request completions back to the view
//! that issued them. No terminal code lives here, so the whole navigation
//! cycle can be driven from tests.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiRequest, HttpResponse, Outcome, TransportError};
use crate::nav::{self, Group, Link};
use crate::page::{Page, PageEvent};
use crate::router::{self, NavState, Navigator, Target, ViewKind};
use crate::session::Session;
use crate::storage::{Storage, PREVIOUS_ACTION_MESSAGE_KEY};
use crate::view::{Activation, Effect, Location, Section, Tag, View};

/// How requests are carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// One worker thread per request; the UI keeps drawing meanwhile.
    Threaded,
    /// Run on the caller's thread; the completion still waits for `pump`.
    Inline,
}

/// Who receives a completion.
#[derive(Clone, Copy)]
enum Pending {
    View(Tag),
    /// A branch route waiting for the payload that picks its view.
    Branch(fn(Option<&Value>) -> ViewKind),
}

struct Completion {
    generation: u64,
    pending: Pending,
    authenticated: bool,
    result: Result<HttpResponse, TransportError>,
}

pub struct App {
    page: Page,
    aside: Vec<Group>,
    view: Box<dyn View>,
    section: Section,
    fragment: String,
    session: Option<Session>,
    navigator: Navigator,
    storage: Storage,
    client: Arc<ApiClient>,
    dispatch: Dispatch,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    alerts: VecDeque<String>,
    confirm: Option<(String, Tag)>,
    address: Option<String>,
    running: bool,
}

impl App {
    pub fn new(storage: Storage, client: ApiClient, dispatch: Dispatch) -> Self {
        let (tx, rx) = mpsc::channel();
        let view = ViewKind::Login.build();
        Self {
            page: Page::default(),
            aside: Vec::new(),
            section: view.section(),
            view,
            fragment: "/".to_string(),
            session: None,
            navigator: Navigator::default(),
            storage,
            client: Arc::new(client),
            dispatch,
            tx,
            rx,
            alerts: VecDeque::new(),
            confirm: None,
            address: None,
            running: true,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn aside(&self) -> &[Group] {
        &self.aside
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn alert(&self) -> Option<&str> {
        self.alerts.front().map(String::as_str)
    }

    pub fn confirm_prompt(&self) -> Option<&str> {
        self.confirm.as_ref().map(|(prompt, _)| prompt.as_str())
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.navigator.state(), NavState::Transitioning { .. })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Section links first, then the aside, in function-key order.
    pub fn links(&self) -> Vec<Link> {
        nav::SECTIONS
            .iter()
            .copied()
            .chain(nav::flat_links(&self.aside))
            .collect()
    }

    pub fn navigate(&mut self, location: Location) {
        match location {
            Location::Fragment(fragment) => {
                self.fragment = normalize_fragment(&fragment);
                self.route();
            }
            Location::Reload => self.route(),
            Location::Login => {
                let generation = self.navigator.begin();
                self.session = None;
                self.mount(ViewKind::Login, generation);
            }
        }
    }

    fn route(&mut self) {
        let generation = self.navigator.begin();
        self.session = Session::load(&self.storage);
        if self.session.is_none() {
            info!("no token stored, showing login");
            self.mount(ViewKind::Login, generation);
            return;
        }
        let route = router::resolve(&self.fragment);
        debug!(fragment = %self.fragment, pattern = route.pattern, generation, "routing");
        match route.target {
            Target::View(kind) => self.mount(kind, generation),
            Target::Branch { request, choose } => {
                self.page = Page::new("loading");
                self.dispatch(generation, Pending::Branch(choose), request());
            }
        }
    }

    fn mount(&mut self, kind: ViewKind, generation: u64) {
        self.view = kind.build();
        self.section = self.view.section();
        self.page = self.view.markup();
        let level = self.session.as_ref().and_then(Session::level);
        self.aside = nav::aside(self.section, level.as_deref());

        match self.storage.remove(PREVIOUS_ACTION_MESSAGE_KEY) {
            Ok(Some(message)) => self.page.set_message(&message),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not clear reload message"),
        }

        let mut cx = Activation::new(self.session.as_ref());
        self.view.activate(&mut self.page, &mut cx);
        self.navigator.settle(generation);
        self.apply(cx.into_effects(), generation);
    }

    /// Apply effects in the order the view produced them. Requests carry the
    /// generation of the activation that asked, even after a navigation.
    fn apply(&mut self, effects: Vec<Effect>, generation: u64) {
        for effect in effects {
            match effect {
                Effect::Request { tag, request } => {
                    self.dispatch(generation, Pending::View(tag), request)
                }
                Effect::Alert(message) => self.alerts.push_back(message),
                Effect::Confirm { prompt, tag } => self.confirm = Some((prompt, tag)),
                Effect::Store { key, value } => {
                    let result = match value {
                        Some(value) => self.storage.set(&key, &value),
                        None => self.storage.remove(&key).map(|_| ()),
                    };
                    if let Err(e) = result {
                        warn!(key = %key, error = %e, "storage write failed");
                    }
                }
                Effect::Navigate(location) => self.navigate(location),
            }
        }
    }

    fn dispatch(&mut self, generation: u64, pending: Pending, request: ApiRequest) {
        let token = self.session.as_ref().map(|s| s.token.clone());
        debug!(method = request.method.as_str(), path = %request.path, generation, "dispatch");
        let authenticated = request.authenticated;
        match self.dispatch {
            Dispatch::Threaded => {
                let client = Arc::clone(&self.client);
                let tx = self.tx.clone();
                thread::spawn(move || {
                    let result = client.execute(token.as_deref(), &request);
                    let _ = tx.send(Completion {
                        generation,
                        pending,
                        authenticated,
                        result,
                    });
                });
            }
            Dispatch::Inline => {
                let result = self.client.execute(token.as_deref(), &request);
                let _ = self.tx.send(Completion {
                    generation,
                    pending,
                    authenticated,
                    result,
                });
            }
        }
    }

    /// Deliver every completion that has arrived. Returns how many were
    /// delivered, counting stale ones that were dropped.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.complete(completion);
            delivered += 1;
        }
        delivered
    }

    fn complete(&mut self, completion: Completion) {
        let Completion {
            generation,
            pending,
            authenticated,
            result,
        } = completion;
        if !self.navigator.is_current(generation) {
            debug!(generation, current = self.navigator.generation(), "dropping stale completion");
            return;
        }
        let mut cx = Activation::new(self.session.as_ref());
        let outcome = ApiClient::interpret(result, authenticated, &mut cx);
        match pending {
            Pending::View(tag) => {
                self.view.on_response(tag, outcome, &mut self.page, &mut cx);
                self.apply(cx.into_effects(), generation);
            }
            Pending::Branch(choose) => {
                let effects = cx.into_effects();
                if !effects.is_empty() {
                    self.apply(effects, generation);
                    return;
                }
                let payload = match outcome {
                    Outcome::Success(body) => body,
                    _ => None,
                };
                self.mount(choose(payload.as_ref()), generation);
            }
        }
    }

    fn deliver(&mut self, event: PageEvent) {
        let generation = self.navigator.generation();
        let mut cx = Activation::new(self.session.as_ref());
        self.view.on_event(event, &mut self.page, &mut cx);
        self.apply(cx.into_effects(), generation);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if !self.alerts.is_empty() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.alerts.pop_front();
            }
            return;
        }

        if let Some((_, tag)) = &self.confirm {
            let tag = *tag;
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.confirm = None;
                    self.deliver(PageEvent::Confirmed(tag));
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.confirm = None,
                _ => {}
            }
            return;
        }

        if let Some(address) = self.address.as_mut() {
            match key.code {
                KeyCode::Char(c) => address.push(c),
                KeyCode::Backspace => {
                    address.pop();
                }
                KeyCode::Esc => self.address = None,
                KeyCode::Enter => {
                    let target = self.address.take().unwrap_or_default();
                    self.navigate(Location::Fragment(target));
                }
                _ => {}
            }
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => self.running = false,
                KeyCode::Char('r') => self.navigate(Location::Reload),
                KeyCode::Char('l') => self.address = Some(self.fragment.clone()),
                _ => {}
            }
            return;
        }

        if let KeyCode::F(n) = key.code {
            let link = self.links().get(usize::from(n).saturating_sub(1)).copied();
            if let Some(link) = link {
                self.navigate(Location::Fragment(link.fragment.to_string()));
            }
            return;
        }

        match self.page.handle_key(key) {
            PageEvent::None | PageEvent::Changed => {}
            event => self.deliver(event),
        }
    }
}

/// `""`, `"/"` and `"#"` all mean home; anything else gets a leading `#`.
fn normalize_fragment(fragment: &str) -> String {
    let fragment = fragment.trim();
    match fragment {
        "" | "/" | "#" => "/".to_string(),
        f if f.starts_with('#') => f.to_string(),
        f => format!("#{f}"),
    }
}
