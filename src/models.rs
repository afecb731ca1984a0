use serde::{Deserialize, Deserializer};

/// Server identifiers are UUID strings, but some endpoints hand back integers.
pub fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(amount_of(&value))
}

/// Numeric value of a JSON amount; strings are parsed, anything else is 0.
pub fn amount_of(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Person {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub confirmed: serde_json::Value,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn status(&self) -> &'static str {
        if self.active {
            "Active"
        } else {
            "Disabled"
        }
    }

    /// Identifier the update endpoints expect.
    pub fn public_id(&self) -> &str {
        self.public_id.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Entity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One selectable account in a ledger row dropdown.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AccountOption {
    #[serde(rename = "account.id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(rename = "account.name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AccountTreeNode {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub children: Vec<AccountTreeNode>,
}

impl AccountTreeNode {
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(AccountTreeNode::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LedgerLine {
    #[serde(default)]
    pub account: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JournalRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub debits: Vec<LedgerLine>,
    #[serde(default)]
    pub credits: Vec<LedgerLine>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Hunt {
    #[serde(default)]
    pub status: String,
}
