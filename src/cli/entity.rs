use colored::Colorize;
use comfy_table::{Cell, Table};

use super::Console;
use crate::endpoints;
use crate::error::{DeskError, Result};
use crate::models::Entity;
use crate::storage::CURRENT_ENTITY_KEY;

/// An exact id, or a prefix that matches exactly one entity.
pub fn pick<'a>(entities: &'a [Entity], id: &str) -> Result<&'a Entity> {
    if let Some(exact) = entities.iter().find(|e| e.id == id) {
        return Ok(exact);
    }
    let matches: Vec<&Entity> = entities.iter().filter(|e| e.id.starts_with(id)).collect();
    match matches.as_slice() {
        [one] => Ok(one),
        [] => Err(DeskError::Other(format!("No entity of yours matches \"{id}\"."))),
        _ => Err(DeskError::Other(format!(
            "\"{id}\" matches {} entities; use more characters.",
            matches.len()
        ))),
    }
}

pub fn entity_table(entities: &[Entity], current: Option<&str>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", ""]);
    for entity in entities {
        let mark = if current == Some(entity.id.as_str()) {
            "SELECTED".green().bold().to_string()
        } else {
            String::new()
        };
        table.add_row(vec![Cell::new(&entity.id), Cell::new(&entity.name), Cell::new(mark)]);
    }
    table
}

pub fn run(id: Option<&str>) -> Result<()> {
    let mut console = Console::open()?;
    let session = console.session()?;
    let body = console.fetch(Some(&session.token), &endpoints::my_entities())?;
    let entities = endpoints::read_entities(body)?;

    let Some(id) = id else {
        if entities.is_empty() {
            println!("You are not a member of any entity.");
        } else {
            println!("Entities\n{}", entity_table(&entities, session.current_entity.as_deref()));
        }
        return Ok(());
    };

    let entity = pick(&entities, id)?;
    if session.current_entity.as_deref() == Some(entity.id.as_str()) {
        println!("{} is already the current entity.", entity.name);
        return Ok(());
    }
    console.storage.set(CURRENT_ENTITY_KEY, &entity.id)?;
    tracing::info!(entity = %entity.id, "current entity changed");
    println!("Entity updated: {}", entity.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities() -> Vec<Entity> {
        vec![
            Entity { id: "a1b2c3".into(), name: "Acme".into() },
            Entity { id: "a1ff00".into(), name: "Apex".into() },
            Entity { id: "9e9e9e".into(), name: "Nine".into() },
        ]
    }

    #[test]
    fn test_pick_exact_and_prefix() {
        let list = entities();
        assert_eq!(pick(&list, "9e9e9e").unwrap().name, "Nine");
        assert_eq!(pick(&list, "a1b").unwrap().name, "Acme");
    }

    #[test]
    fn test_pick_ambiguous_or_missing() {
        let list = entities();
        assert!(pick(&list, "a1").unwrap_err().to_string().contains("matches 2 entities"));
        assert!(pick(&list, "zz").is_err());
    }

    #[test]
    fn test_entity_table_lists_every_entity() {
        let rendered = entity_table(&entities(), Some("a1ff00")).to_string();
        assert!(rendered.contains("Acme"));
        assert!(rendered.contains("Nine"));
        assert!(rendered.contains("SELECTED"));
    }
}
