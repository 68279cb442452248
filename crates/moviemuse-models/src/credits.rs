use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

impl Credits {
    /// Cast in billing order, capped at `limit` entries
    pub fn top_billed(&self, limit: usize) -> Vec<&CastMember> {
        let mut cast: Vec<&CastMember> = self.cast.iter().collect();
        cast.sort_by_key(|c| c.order);
        cast.truncate(limit);
        cast
    }

    pub fn director(&self) -> Option<&CrewMember> {
        self.crew.iter().find(|c| c.job == "Director")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
    pub profile_path: Option<String>,
}
