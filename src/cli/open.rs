use tracing::info;

use super::Console;
use crate::app::{App, Dispatch};
use crate::error::Result;
use crate::tui;
use crate::view::Location;

pub fn run(fragment: Option<String>) -> Result<()> {
    let Console { storage, client, .. } = Console::open()?;
    let mut app = App::new(storage, client, Dispatch::Threaded);
    let fragment = fragment.unwrap_or_else(|| "/".to_string());
    info!(fragment = %fragment, "starting terminal UI");
    app.navigate(Location::Fragment(fragment));
    tui::run(&mut app)
}
