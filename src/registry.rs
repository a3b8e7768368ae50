//! Lookup from a carousel's page identifier to its live controller.
//!
//! The registry holds weak references only; the page owns the carousels.
//! Unknown identifiers are silent no-ops for every UI action.

use crate::carousel::{Carousel, Direction, SharedCarousel};
use crate::Result;
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
pub struct CarouselRegistry {
    entries: HashMap<String, Weak<RefCell<Carousel>>>,
    order: Vec<String>,
}

impl CarouselRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the carousel's own id. An id already taken keeps its
    /// first carousel.
    pub fn register(&mut self, carousel: &SharedCarousel) -> bool {
        let id = carousel.borrow().id().to_string();
        if self.entries.contains_key(&id) {
            warn!("Carousel id '{}' already registered", id);
            return false;
        }
        self.entries.insert(id.clone(), Rc::downgrade(carousel));
        self.order.push(id);
        true
    }

    pub fn get(&self, id: &str) -> Option<SharedCarousel> {
        let found = self.entries.get(id).and_then(Weak::upgrade);
        if found.is_none() {
            debug!("No carousel registered as '{}'", id);
        }
        found
    }

    /// Registered ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether a carousel handled the request.
    pub fn advance(&self, id: &str, direction: Direction) -> bool {
        self.with(id, |c| c.advance(direction)).is_some()
    }

    /// `Ok(false)` for an unknown id; an out-of-range slide number is an error.
    pub fn jump_to(&self, id: &str, slide_number: usize) -> Result<bool> {
        match self.with(id, |c| c.jump_to(slide_number)) {
            Some(res) => res.map(|()| true),
            None => Ok(false),
        }
    }

    pub fn hover_enter(&self, id: &str) -> bool {
        self.with(id, Carousel::hover_enter).is_some()
    }

    pub fn hover_leave(&self, id: &str) -> bool {
        self.with(id, Carousel::hover_leave).is_some()
    }

    fn with<R>(&self, id: &str, f: impl FnOnce(&mut Carousel) -> R) -> Option<R> {
        let carousel = self.get(id)?;
        let mut guard = match carousel.try_borrow_mut() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Carousel '{}' busy; ignoring request", id);
                return None;
            }
        };
        Some(f(&mut *guard))
    }
}
