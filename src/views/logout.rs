use crate::page::Page;
use crate::storage::TOKEN_KEY;
use crate::view::{Activation, Location, Section, View};

pub struct LogoutView;

impl View for LogoutView {
    fn markup(&self) -> Page {
        Page::new("Logout")
    }

    fn section(&self) -> Section {
        Section::Settings
    }

    fn activate(&mut self, _page: &mut Page, cx: &mut Activation) {
        cx.remove(TOKEN_KEY);
        tracing::info!("token removed");
        cx.navigate(Location::Login);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Effect;
    use crate::views::testing::Harness;

    #[test]
    fn test_logout_drops_token_and_goes_to_login() {
        let mut h = Harness::new(Box::new(LogoutView), Some("e1"));
        assert_eq!(
            h.activate(),
            vec![
                Effect::Store {
                    key: TOKEN_KEY.into(),
                    value: None
                },
                Effect::Navigate(Location::Login)
            ]
        );
    }
}
