use zeroize::Zeroize;

use crate::api::Outcome;
use crate::endpoints;
use crate::page::{Form, FormField, Page, PageEvent};
use crate::storage::TOKEN_KEY;
use crate::view::{on_success, Activation, Location, Section, Tag, View};

use super::decoded;

const TOKEN: Tag = "token";
const RESET: Tag = "password-reset";

const LOGIN_FORM: &str = "form-login";
const BTN_SUBMIT: &str = "btn-login-submit";
const BTN_CLEAR: &str = "inp-login-reset";
const BTN_PASSWORD_RESET: &str = "btn-passwordreset";

/// Email and password in, bearer token out.
#[derive(Default)]
pub struct LoginView;

impl LoginView {
    fn login(page: &mut Page, cx: &mut Activation) {
        let Some(form) = page.form_mut(LOGIN_FORM) else {
            return;
        };
        let email = form.value("email");
        let mut password = form.value("password");
        if let Some(field) = form.field_mut("password") {
            field.value.zeroize();
        }
        if email.trim().is_empty() || password.is_empty() {
            password.zeroize();
            page.set_message("Enter an email address and password.");
            return;
        }
        cx.request(TOKEN, endpoints::token(email.trim(), &password));
        password.zeroize();
    }

    fn request_reset(page: &mut Page, cx: &mut Activation) {
        let email = page
            .form_data(LOGIN_FORM)
            .map(|f| f.value("email"))
            .unwrap_or_default();
        if email.trim().is_empty() {
            page.set_message("Enter the email address associated with your account first.");
            return;
        }
        cx.request(RESET, endpoints::password_reset(email.trim()));
    }
}

impl View for LoginView {
    fn markup(&self) -> Page {
        Page::new("log in")
            .form(
                LOGIN_FORM,
                Form::new(vec![
                    FormField::text("email", "Email", ""),
                    FormField::secret("password", "Password"),
                ]),
            )
            .button(BTN_SUBMIT, "Log in", true)
            .button(BTN_CLEAR, "Clear", true)
            .button(BTN_PASSWORD_RESET, "Forgot password", true)
    }

    fn section(&self) -> Section {
        Section::None
    }

    fn activate(&mut self, _page: &mut Page, _cx: &mut Activation) {}

    fn on_response(&mut self, tag: Tag, outcome: Outcome, page: &mut Page, cx: &mut Activation) {
        match tag {
            TOKEN => on_success(outcome, page, |body, page| {
                if let Some(token) = decoded(page, endpoints::read_token(body)) {
                    tracing::info!("logged in");
                    cx.store(TOKEN_KEY, &token);
                    cx.navigate(Location::Fragment("/".to_string()));
                }
            }),
            RESET => on_success(outcome, page, |_, page| {
                page.set_message("If that address has an account, a reset link is on its way.");
            }),
            _ => {}
        }
    }

    fn on_event(&mut self, event: PageEvent, page: &mut Page, cx: &mut Activation) {
        match event {
            PageEvent::Click(BTN_SUBMIT) | PageEvent::Submit(LOGIN_FORM) => Self::login(page, cx),
            PageEvent::Click(BTN_PASSWORD_RESET) => Self::request_reset(page, cx),
            PageEvent::Click(BTN_CLEAR) => {
                if let Some(form) = page.form_mut(LOGIN_FORM) {
                    form.reset();
                }
                page.set_message("");
            }
            _ => {}
        }
    }
}
