use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Provider,
}

impl Role {
    pub fn name(&self) -> String {
        match self {
            Self::Customer => "customer".into(),
            Self::Provider => "provider".into(),
        }
    }

    pub fn counterpart(&self) -> Role {
        match self {
            Self::Customer => Self::Provider,
            Self::Provider => Self::Customer,
        }
    }
}
