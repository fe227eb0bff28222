use serde::{Deserialize, Serialize};

/// Identifier of a synchronizable entity (one tenant company / contract).
pub type EntityId = i64;

/// An entity eligible for synchronization, as reported by the pending lister.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_name_and_id() {
        let entity = Entity::new(7, "Acme");
        assert_eq!(entity.to_string(), "Acme (ID: 7)");
    }

    #[test]
    fn deserializes_from_json() {
        let entity: Entity = serde_json::from_str(r#"{"id":42,"name":"Globex"}"#).unwrap();
        assert_eq!(entity, Entity::new(42, "Globex"));
    }
}
