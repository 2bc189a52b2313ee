use serde::{Deserialize, Serialize};

use super::{
    common::{new_id, require_non_negative, require_text, Identifiable, Record},
    lenient,
};
use crate::errors::Result;

/// A named monthly spending budget, matched to expenses by category name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(rename = "nombre", default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Zero means no budget has been defined yet.
    #[serde(rename = "presupuesto", default, deserialize_with = "lenient::amount")]
    pub budget: f64,
}

impl Envelope {
    pub fn new(name: impl Into<String>, budget: f64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            budget,
        }
    }
}

impl Identifiable for Envelope {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Envelope {
    const KIND: &'static str = "Envelope";

    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_non_negative("budget", self.budget)
    }

    fn describe(&self) -> String {
        format!("{} budget {:.2}", self.name, self.budget)
    }
}
