use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::sport::SportRegistry;

/// A physical venue. Belongs to exactly one sport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turf {
    pub id: String,
    pub name: String,
    pub sport_id: String,
    /// Format descriptor, e.g. "5v5" or "Box Cricket".
    pub turf_type: String,
    pub location: String,
    pub price_per_hour: i64,
    pub image: String,
    pub amenities: Vec<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTurf {
    pub name: String,
    pub sport_id: String,
    pub turf_type: String,
    pub location: String,
    pub price_per_hour: i64,
    pub image: String,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurfUpdate {
    pub name: Option<String>,
    pub turf_type: Option<String>,
    pub location: Option<String>,
    pub price_per_hour: Option<i64>,
    pub image: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum TurfError {
    #[error("Turf not found: {0}")]
    NotFound(String),

    #[error("Unknown sport: {0}")]
    UnknownSport(String),
}

/// Owner of all turf records. Other components only read from it.
pub struct TurfCatalog {
    turfs: Vec<Turf>,
}

impl TurfCatalog {
    pub fn new() -> Self {
        Self { turfs: Vec::new() }
    }

    pub fn with_seed_data() -> Self {
        Self { turfs: seed_turfs() }
    }

    pub fn get(&self, turf_id: &str) -> Option<&Turf> {
        self.turfs.iter().find(|t| t.id == turf_id)
    }

    pub fn list(&self) -> &[Turf] {
        &self.turfs
    }

    pub fn list_for_sport(&self, sport_id: &str) -> Vec<&Turf> {
        self.turfs.iter().filter(|t| t.sport_id == sport_id).collect()
    }

    /// Active turfs of a sport, the input to slot generation.
    pub fn active_for_sport(&self, sport_id: &str) -> Vec<Turf> {
        self.turfs
            .iter()
            .filter(|t| t.sport_id == sport_id && t.is_active)
            .cloned()
            .collect()
    }

    /// Create a turf. The id is derived from the creation timestamp.
    /// The sport must be registered; an inactive sport is accepted but
    /// logged, matching the admin flow.
    pub fn create(&mut self, new: NewTurf, sports: &SportRegistry) -> Result<&Turf, TurfError> {
        let sport = sports
            .get(&new.sport_id)
            .ok_or_else(|| TurfError::UnknownSport(new.sport_id.clone()))?;
        if !sport.is_active {
            tracing::warn!(sport_id = %new.sport_id, "Creating turf for inactive sport");
        }

        let turf = Turf {
            id: format!("turf-{}", Utc::now().timestamp_millis()),
            name: new.name,
            sport_id: new.sport_id,
            turf_type: new.turf_type,
            location: new.location,
            price_per_hour: new.price_per_hour,
            image: new.image,
            amenities: new.amenities,
            is_active: true,
        };
        self.turfs.push(turf);
        Ok(self.turfs.last().expect("turf just pushed"))
    }

    pub fn update(&mut self, turf_id: &str, update: TurfUpdate) -> Result<&Turf, TurfError> {
        let turf = self
            .turfs
            .iter_mut()
            .find(|t| t.id == turf_id)
            .ok_or_else(|| TurfError::NotFound(turf_id.to_string()))?;

        if let Some(name) = update.name {
            turf.name = name;
        }
        if let Some(turf_type) = update.turf_type {
            turf.turf_type = turf_type;
        }
        if let Some(location) = update.location {
            turf.location = location;
        }
        if let Some(price_per_hour) = update.price_per_hour {
            turf.price_per_hour = price_per_hour;
        }
        if let Some(image) = update.image {
            turf.image = image;
        }
        if let Some(amenities) = update.amenities {
            turf.amenities = amenities;
        }
        if let Some(is_active) = update.is_active {
            turf.is_active = is_active;
        }

        Ok(turf)
    }

    pub fn remove(&mut self, turf_id: &str) -> Result<Turf, TurfError> {
        let pos = self
            .turfs
            .iter()
            .position(|t| t.id == turf_id)
            .ok_or_else(|| TurfError::NotFound(turf_id.to_string()))?;
        Ok(self.turfs.remove(pos))
    }
}

impl Default for TurfCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn seed_turfs() -> Vec<Turf> {
    vec![
        Turf {
            id: "turf-1".to_string(),
            name: "Green Arena 5v5".to_string(),
            sport_id: "football".to_string(),
            turf_type: "5v5".to_string(),
            location: "HSR Layout, Bangalore".to_string(),
            price_per_hour: 1200,
            image: "https://images.unsplash.com/photo-1574629810360-7efbbe195018?w=800&q=80"
                .to_string(),
            amenities: vec![
                "Floodlights".to_string(),
                "Changing Room".to_string(),
                "Parking".to_string(),
                "Water".to_string(),
            ],
            is_active: true,
        },
        Turf {
            id: "turf-2".to_string(),
            name: "Elite Football 7v7".to_string(),
            sport_id: "football".to_string(),
            turf_type: "7v7".to_string(),
            location: "Indiranagar, Bangalore".to_string(),
            price_per_hour: 1800,
            image: "https://images.unsplash.com/photo-1556056504-5c7696c4c28d?w=800&q=80"
                .to_string(),
            amenities: vec![
                "Floodlights".to_string(),
                "Changing Room".to_string(),
                "Parking".to_string(),
                "Cafeteria".to_string(),
            ],
            is_active: true,
        },
        Turf {
            id: "turf-3".to_string(),
            name: "Stadium View 7v7".to_string(),
            sport_id: "football".to_string(),
            turf_type: "7v7".to_string(),
            location: "Koramangala, Bangalore".to_string(),
            price_per_hour: 2000,
            image: "https://images.unsplash.com/photo-1624880357913-a8539238245b?w=800&q=80"
                .to_string(),
            amenities: vec![
                "Floodlights".to_string(),
                "Changing Room".to_string(),
                "Parking".to_string(),
                "Water".to_string(),
                "Seating".to_string(),
            ],
            is_active: true,
        },
        Turf {
            id: "turf-4".to_string(),
            name: "Cricket Box Arena".to_string(),
            sport_id: "cricket".to_string(),
            turf_type: "Box Cricket".to_string(),
            location: "Whitefield, Bangalore".to_string(),
            price_per_hour: 1500,
            image: "https://images.unsplash.com/photo-1531415074968-036ba1b575da?w=800&q=80"
                .to_string(),
            amenities: vec![
                "Nets".to_string(),
                "Changing Room".to_string(),
                "Equipment".to_string(),
                "Parking".to_string(),
            ],
            is_active: true,
        },
        Turf {
            id: "turf-5".to_string(),
            name: "Premium Cricket Pitch".to_string(),
            sport_id: "cricket".to_string(),
            turf_type: "Full Pitch".to_string(),
            location: "Jayanagar, Bangalore".to_string(),
            price_per_hour: 2500,
            image: "https://images.unsplash.com/photo-1540747913346-19e32dc3e97e?w=800&q=80"
                .to_string(),
            amenities: vec![
                "Floodlights".to_string(),
                "Changing Room".to_string(),
                "Equipment".to_string(),
                "Seating".to_string(),
                "Scoreboard".to_string(),
            ],
            is_active: true,
        },
    ]
}
