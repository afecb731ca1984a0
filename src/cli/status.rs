use super::Console;
use crate::endpoints;
use crate::error::Result;
use crate::session::Session;
use crate::settings::{config_dir, log_path};

pub fn run() -> Result<()> {
    let console = Console::open()?;

    println!("Server:     {}", console.settings.base_uri);
    println!("Config dir: {}", config_dir().display());
    println!("Log file:   {}", log_path().display());

    let Some(session) = Session::load(&console.storage) else {
        println!();
        println!("Not logged in. Run `ledgerdesk login --email <EMAIL>` to start.");
        return Ok(());
    };

    println!("Level:      {}", session.level().as_deref().unwrap_or("(unknown)"));
    println!("Entity:     {}", session.current_entity.as_deref().unwrap_or("(none)"));

    let profile = console
        .fetch(Some(&session.token), &endpoints::me())
        .and_then(endpoints::read_person);
    match profile {
        Ok(person) => println!("User:       {} <{}>", person.full_name(), person.email),
        Err(e) => println!("User:       unavailable ({e})"),
    }
    Ok(())
}
