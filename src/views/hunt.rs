use crate::api::Outcome;
use crate::endpoints;
use crate::page::Page;
use crate::view::{on_success, Activation, Section, Tag, View};

const HUNTS: Tag = "active-hunts";
const STATUS: &str = "hunt-status";

/// Which hunt page the branch route picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuntStage {
    /// Sign-up or draw phase.
    Pre,
    Live,
    None,
}

pub struct HuntView {
    stage: HuntStage,
}

impl HuntView {
    pub fn new(stage: HuntStage) -> Self {
        Self { stage }
    }
}

impl View for HuntView {
    fn markup(&self) -> Page {
        let (title, text) = match self.stage {
            HuntStage::Pre => ("hunt sign-up", "Hunt status: loading"),
            HuntStage::Live => ("hunt in progress", "Hunt status: loading"),
            HuntStage::None => ("hunt", "There is no active hunt."),
        };
        Page::new(title).text(STATUS, text)
    }

    fn section(&self) -> Section {
        Section::Hunt
    }

    fn activate(&mut self, _page: &mut Page, cx: &mut Activation) {
        if self.stage != HuntStage::None {
            cx.request(HUNTS, endpoints::active_hunts());
        }
    }

    fn on_response(&mut self, tag: Tag, outcome: Outcome, page: &mut Page, _cx: &mut Activation) {
        if tag != HUNTS {
            return;
        }
        on_success(outcome, page, |body, page| {
            let status = endpoints::read_hunts(body.as_ref())
                .and_then(|hunts| hunts.into_iter().next())
                .map(|hunt| hunt.status.replace('_', " "))
                .unwrap_or_else(|| "unknown".to_string());
            page.set_text(STATUS, &format!("Hunt status: {status}"));
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::views::testing::{paths, Harness};

    #[test]
    fn test_live_shows_status() {
        let mut h = Harness::new(Box::new(HuntView::new(HuntStage::Live)), None);
        assert_eq!(paths(&h.activate()), vec!["/hunts/active"]);
        h.ok(HUNTS, json!({"hunts": [{"status": "hunt_open"}]}));
        assert_eq!(h.page.text_of(STATUS), Some("Hunt status: hunt open"));
    }

    #[test]
    fn test_no_hunt_is_static() {
        let mut h = Harness::new(Box::new(HuntView::new(HuntStage::None)), None);
        assert!(h.activate().is_empty());
        assert_eq!(h.page.text_of(STATUS), Some("There is no active hunt."));
    }
}
