//! One-or-many name lists as they appear in `from` / `with` / `to`.
//!
//! Example: `from: input`  =>  Names(vec!["input"])
//!          `from: [expanded1, expanded3]`  =>  Names(vec!["expanded1", "expanded3"])

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "NamesSpec", into = "Vec<String>")]
pub struct Names(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum NamesSpec {
    One(String),
    Many(Vec<String>),
}

impl From<NamesSpec> for Names {
    fn from(spec: NamesSpec) -> Self {
        match spec {
            NamesSpec::One(name) => Names(vec![name]),
            NamesSpec::Many(names) => Names(names),
        }
    }
}

impl From<Names> for Vec<String> {
    fn from(names: Names) -> Self {
        names.0
    }
}

impl Names {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|n| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
