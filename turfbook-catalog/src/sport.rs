use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A sport definition: immutable identity, mutable display and business
/// attributes. Sports are seeded at startup and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sport {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub accent_color: String,
    pub dark_background: String,
    pub description: String,
    pub starting_price: i64,
    pub available_turfs: u32,
    /// Default booking duration in minutes.
    pub default_duration: u32,
    pub is_active: bool,
}

/// Partial update applied by the admin sport-configuration view. The id
/// is not updatable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SportUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub accent_color: Option<String>,
    pub dark_background: Option<String>,
    pub description: Option<String>,
    pub starting_price: Option<i64>,
    pub available_turfs: Option<u32>,
    pub default_duration: Option<u32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum SportError {
    #[error("Sport not found: {0}")]
    NotFound(String),
}

/// Registry of sport definitions, seeded from the fixed catalogue.
pub struct SportRegistry {
    sports: HashMap<String, Sport>,
}

impl SportRegistry {
    pub fn new() -> Self {
        let mut sports = HashMap::new();
        for sport in seed_sports() {
            sports.insert(sport.id.clone(), sport);
        }
        Self { sports }
    }

    pub fn get(&self, sport_id: &str) -> Option<&Sport> {
        self.sports.get(sport_id)
    }

    pub fn contains(&self, sport_id: &str) -> bool {
        self.sports.contains_key(sport_id)
    }

    /// All sports, ordered by id for a stable listing.
    pub fn list(&self) -> Vec<&Sport> {
        let mut sports: Vec<&Sport> = self.sports.values().collect();
        sports.sort_by(|a, b| a.id.cmp(&b.id));
        sports
    }

    /// Apply a partial update in place.
    pub fn update(&mut self, sport_id: &str, update: SportUpdate) -> Result<&Sport, SportError> {
        let sport = self
            .sports
            .get_mut(sport_id)
            .ok_or_else(|| SportError::NotFound(sport_id.to_string()))?;

        if let Some(name) = update.name {
            sport.name = name;
        }
        if let Some(icon) = update.icon {
            sport.icon = icon;
        }
        if let Some(accent_color) = update.accent_color {
            sport.accent_color = accent_color;
        }
        if let Some(dark_background) = update.dark_background {
            sport.dark_background = dark_background;
        }
        if let Some(description) = update.description {
            sport.description = description;
        }
        if let Some(starting_price) = update.starting_price {
            sport.starting_price = starting_price;
        }
        if let Some(available_turfs) = update.available_turfs {
            sport.available_turfs = available_turfs;
        }
        if let Some(default_duration) = update.default_duration {
            sport.default_duration = default_duration;
        }
        if let Some(is_active) = update.is_active {
            sport.is_active = is_active;
        }

        Ok(sport)
    }
}

impl Default for SportRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_sports() -> Vec<Sport> {
    vec![
        Sport {
            id: "football".to_string(),
            name: "Football".to_string(),
            icon: "⚽".to_string(),
            accent_color: "#00E676".to_string(),
            dark_background: "linear-gradient(135deg, #0a4d2e 0%, #0d1f17 100%)".to_string(),
            description: "Book premium football turfs".to_string(),
            starting_price: 1200,
            available_turfs: 3,
            default_duration: 60,
            is_active: true,
        },
        Sport {
            id: "cricket".to_string(),
            name: "Cricket".to_string(),
            icon: "🏏".to_string(),
            accent_color: "#1565C0".to_string(),
            dark_background: "linear-gradient(135deg, #0d3b66 0%, #0a1929 100%)".to_string(),
            description: "Book premium cricket pitches".to_string(),
            starting_price: 1500,
            available_turfs: 2,
            default_duration: 90,
            is_active: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_seeded() {
        let registry = SportRegistry::new();
        assert!(registry.contains("football"));
        assert!(registry.contains("cricket"));
        assert_eq!(registry.list().len(), 2);
    }

    #[test]
    fn test_update_in_place() {
        let mut registry = SportRegistry::new();
        let updated = registry
            .update(
                "football",
                SportUpdate {
                    starting_price: Some(1400),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.starting_price, 1400);
        assert!(!updated.is_active);
        // Identity and untouched fields survive
        assert_eq!(updated.id, "football");
        assert_eq!(registry.get("football").unwrap().name, "Football");
    }

    #[test]
    fn test_update_unknown_sport_fails() {
        let mut registry = SportRegistry::new();
        let result = registry.update("hockey", SportUpdate::default());
        assert!(matches!(result, Err(SportError::NotFound(_))));
    }
}
