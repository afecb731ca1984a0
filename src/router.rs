use serde_json::Value;

use crate::api::ApiRequest;
use crate::composer::Variant;
use crate::endpoints;
use crate::view::View;
use crate::views::{
    entities::EntitiesView, hunt::HuntStage, hunt::HuntView, journal::ComposerView,
    journal_view::JournalView, login::LoginView, logout::LogoutView, me::MeView, tree::TreeView,
    users::UsersView,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Me,
    Logout,
    Users,
    Entities,
    Tree,
    JournalNew,
    JournalSimple,
    JournalView,
    HuntPre,
    HuntLive,
    HuntNone,
    Login,
}

impl ViewKind {
    pub fn build(self) -> Box<dyn View> {
        match self {
            ViewKind::Me => Box::new(MeView::default()),
            ViewKind::Logout => Box::new(LogoutView),
            ViewKind::Users => Box::new(UsersView::default()),
            ViewKind::Entities => Box::new(EntitiesView::default()),
            ViewKind::Tree => Box::new(TreeView::default()),
            ViewKind::JournalNew => Box::new(ComposerView::new(Variant::Full)),
            ViewKind::JournalSimple => Box::new(ComposerView::new(Variant::Simple)),
            ViewKind::JournalView => Box::new(JournalView::default()),
            ViewKind::HuntPre => Box::new(HuntView::new(HuntStage::Pre)),
            ViewKind::HuntLive => Box::new(HuntView::new(HuntStage::Live)),
            ViewKind::HuntNone => Box::new(HuntView::new(HuntStage::None)),
            ViewKind::Login => Box::new(LoginView::default()),
        }
    }
}

/// What a route resolves to: a view, or a fetch whose payload picks one.
#[derive(Clone, Copy)]
pub enum Target {
    View(ViewKind),
    Branch {
        request: fn() -> ApiRequest,
        choose: fn(Option<&Value>) -> ViewKind,
    },
}

pub struct Route {
    pub pattern: &'static str,
    pub target: Target,
}

/// The first entry doubles as the fallback for unknown fragments.
pub const ROUTES: &[Route] = &[
    Route { pattern: "/", target: Target::View(ViewKind::Me) },
    Route { pattern: "#nav_settings", target: Target::View(ViewKind::Me) },
    Route { pattern: "#me", target: Target::View(ViewKind::Me) },
    Route { pattern: "#logout", target: Target::View(ViewKind::Logout) },
    Route { pattern: "#users", target: Target::View(ViewKind::Users) },
    Route { pattern: "#entities", target: Target::View(ViewKind::Entities) },
    Route { pattern: "#tree", target: Target::View(ViewKind::Tree) },
    Route { pattern: "#nav_accounts", target: Target::View(ViewKind::Tree) },
    Route { pattern: "#nav_journal_new", target: Target::View(ViewKind::JournalNew) },
    Route { pattern: "#nav_journal_simple", target: Target::View(ViewKind::JournalSimple) },
    Route { pattern: "#nav_journal", target: Target::View(ViewKind::JournalView) },
    Route {
        pattern: "#nav_hunt",
        target: Target::Branch {
            request: endpoints::active_hunts,
            choose: choose_hunt_view,
        },
    },
];

/// Exact match on the fragment, else the first route.
pub fn resolve(fragment: &str) -> &'static Route {
    ROUTES
        .iter()
        .find(|route| route.pattern == fragment)
        .unwrap_or(&ROUTES[0])
}

/// Exactly one active hunt picks a view by its status; anything else,
/// including a failed fetch, lands on the no-hunt view.
pub fn choose_hunt_view(payload: Option<&Value>) -> ViewKind {
    match endpoints::read_hunts(payload).as_deref() {
        Some([hunt]) => match hunt.status.as_str() {
            "signup_open" | "signup_closed" | "draw_complete" => ViewKind::HuntPre,
            "hunt_open" => ViewKind::HuntLive,
            _ => ViewKind::HuntNone,
        },
        _ => ViewKind::HuntNone,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Transitioning { generation: u64 },
}

/// Numbers navigations so late completions from an abandoned view can be
/// recognized and dropped.
#[derive(Debug)]
pub struct Navigator {
    generation: u64,
    state: NavState,
}

impl Default for Navigator {
    fn default() -> Self {
        Self {
            generation: 0,
            state: NavState::Idle,
        }
    }
}

impl Navigator {
    /// Start a navigation; every earlier generation becomes stale.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = NavState::Transitioning {
            generation: self.generation,
        };
        self.generation
    }

    /// The view for `generation` is mounted and active.
    pub fn settle(&mut self, generation: u64) {
        if generation == self.generation {
            self.state = NavState::Idle;
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> NavState {
        self.state
    }
}
