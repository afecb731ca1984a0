use crate::view::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub text: &'static str,
    pub fragment: &'static str,
}

const fn link(text: &'static str, fragment: &'static str) -> Link {
    Link { text, fragment }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub heading: &'static str,
    pub links: Vec<Link>,
}

/// Top-level menu, always shown above the aside.
pub const SECTIONS: &[Link] = &[
    link("settings", "#nav_settings"),
    link("accounts", "#nav_accounts"),
    link("journal", "#nav_journal"),
    link("hunt", "#nav_hunt"),
];

const SETTINGS: &[(&str, &[Link])] = &[
    ("users", &[link("me", "#me"), link("log out", "#logout")]),
    ("admins", &[link("users", "#users"), link("entities", "#entities")]),
];

const ACCOUNTS: &[(&str, &[Link])] = &[
    (
        "assets",
        &[link("long-term", "#tree"), link("short-term", "#tree"), link("owed", "#tree")],
    ),
    ("expenses", &[link("operating", "#tree"), link("COGR", "#tree")]),
    ("liabilities", &[link("liabilities", "#tree")]),
    ("equity", &[link("equity", "#tree")]),
    ("income", &[link("income", "#tree")]),
    ("dividends", &[link("dividends", "#tree")]),
];

const JOURNAL: &[(&str, &[Link])] = &[(
    "journal",
    &[
        link("new entry", "#nav_journal_new"),
        link("simple expense entry", "#nav_journal_simple"),
        link("view journal", "#nav_journal"),
    ],
)];

fn groups(table: &[(&'static str, &[Link])]) -> Vec<Group> {
    table
        .iter()
        .map(|&(heading, links)| Group {
            heading,
            links: links.to_vec(),
        })
        .collect()
}

/// Settings groups visible to a level. A level that names a group sees it
/// and every group before it; an unrecognized level sees them all.
fn settings_for(level: Option<&str>) -> Vec<Group> {
    let rank = level
        .map(str::to_lowercase)
        .and_then(|level| {
            SETTINGS
                .iter()
                .position(|(heading, _)| heading.trim_end_matches('s') == level.trim_end_matches('s'))
        })
        .unwrap_or(SETTINGS.len() - 1);
    groups(&SETTINGS[..=rank])
}

pub fn aside(section: Section, level: Option<&str>) -> Vec<Group> {
    match section {
        Section::Settings => settings_for(level),
        Section::Accounts => groups(ACCOUNTS),
        Section::Journal => groups(JOURNAL),
        Section::Hunt | Section::None => Vec::new(),
    }
}

/// Aside links in F-key order.
pub fn flat_links(groups: &[Group]) -> Vec<Link> {
    groups.iter().flat_map(|g| g.links.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headings(groups: &[Group]) -> Vec<&str> {
        groups.iter().map(|g| g.heading).collect()
    }

    #[test]
    fn test_user_level_sees_only_user_links() {
        let groups = aside(Section::Settings, Some("USER"));
        assert_eq!(headings(&groups), vec!["users"]);
        let fragments: Vec<&str> = flat_links(&groups).iter().map(|l| l.fragment).collect();
        assert_eq!(fragments, vec!["#me", "#logout"]);
    }

    #[test]
    fn test_admin_and_unknown_levels_see_everything() {
        for level in [Some("ADMIN"), Some("superuser"), None] {
            assert_eq!(headings(&aside(Section::Settings, level)), vec!["users", "admins"]);
        }
    }

    #[test]
    fn test_accounts_links_all_go_to_tree() {
        let links = flat_links(&aside(Section::Accounts, None));
        assert_eq!(links.len(), 9);
        assert!(links.iter().all(|l| l.fragment == "#tree"));
    }

    #[test]
    fn test_journal_links() {
        let links = flat_links(&aside(Section::Journal, None));
        assert_eq!(links[1].fragment, "#nav_journal_simple");
        assert!(aside(Section::Hunt, None).is_empty());
    }
}
