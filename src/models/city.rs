use super::{require_non_blank, ModelError, MuseumVisit};

/// A location hosting museum visits.
///
/// Cities are shared between tours: a tour references a city by id, and a
/// city carries no back-reference to any tour. The city↔visit link *is*
/// bidirectional: `visits` mirrors each visit's `city` field, and the
/// paired methods below keep the two in step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub id: String,
    pub name: String,
    visits: Vec<String>,
}

impl City {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        let name = name.into();
        require_non_blank(&id, ModelError::EmptyId { entity: "city" })?;
        require_non_blank(&name, ModelError::EmptyName { entity: "city" })?;
        Ok(Self {
            id,
            name,
            visits: Vec::new(),
        })
    }

    /// Ids of the museum visits hosted by this city, in insertion order.
    pub fn visits(&self) -> &[String] {
        &self.visits
    }

    /// Attach a visit to this city, setting its back-reference.
    ///
    /// Returns `false` without mutating either side if the visit is
    /// already attached here, or if it is attached to a different city
    /// (detach it there first).
    pub fn add_visit(&mut self, visit: &mut MuseumVisit) -> bool {
        if self.visits.iter().any(|id| *id == visit.id) {
            return false;
        }
        match visit.city() {
            Some(city_id) if city_id != self.id => return false,
            _ => {}
        }
        self.visits.push(visit.id.clone());
        visit.set_city(Some(self.id.clone()));
        true
    }

    /// Detach a visit, clearing its back-reference if it points here.
    /// Returns `false` if the visit was not attached.
    pub fn remove_visit(&mut self, visit: &mut MuseumVisit) -> bool {
        let Some(pos) = self.visits.iter().position(|id| *id == visit.id) else {
            return false;
        };
        self.visits.remove(pos);
        if visit.city() == Some(self.id.as_str()) {
            visit.set_city(None);
        }
        true
    }

    pub fn contains_visit(&self, visit_id: &str) -> bool {
        self.visits.iter().any(|id| id == visit_id)
    }
}
