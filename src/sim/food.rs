//! Falling food entities
//!
//! An arena keyed by stable ids. The render surface maps ids to whatever
//! visual it created for them; nothing visual is stored here.

use glam::Vec2;
use rand::Rng;

use super::rect::Rect;
use crate::tuning::PlayArea;

/// One falling food item
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub id: u32,
    /// Top-left corner; x is fixed at spawn
    pub pos: Vec2,
    /// Fall speed per reference frame, before the difficulty multiplier
    pub speed: f32,
}

impl Food {
    pub fn rect(&self, size: f32) -> Rect {
        Rect::from_min_size(self.pos, Vec2::splat(size))
    }
}

/// Live food in spawn order
#[derive(Debug, Clone)]
pub struct FoodStore {
    foods: Vec<Food>,
    next_id: u32,
}

impl Default for FoodStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodStore {
    pub fn new() -> Self {
        Self {
            foods: Vec::new(),
            next_id: 1,
        }
    }

    /// Create one food at a random x along the top of the area
    ///
    /// Speed is sampled in `[base_speed, base_speed + spread)`.
    pub fn spawn<R: Rng>(&mut self, rng: &mut R, area: &PlayArea, base_speed: f32, spread: f32) -> &Food {
        let id = self.next_id;
        self.next_id += 1;

        let x = rng.random::<f32>() * area.spawn_width;
        let speed = base_speed + rng.random::<f32>() * spread;
        self.foods.push(Food {
            id,
            pos: Vec2::new(x, area.spawn_y),
            speed,
        });
        // Just pushed
        &self.foods[self.foods.len() - 1]
    }

    /// Move every food down by `speed * speed_multiplier`
    pub fn advance(&mut self, speed_multiplier: f32) {
        for food in &mut self.foods {
            food.pos.y += food.speed * speed_multiplier;
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Food {
        self.foods.remove(index)
    }

    pub fn all(&self) -> &[Food] {
        &self.foods
    }

    pub fn get(&self, id: u32) -> Option<&Food> {
        self.foods.iter().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn clear(&mut self) {
        self.foods.clear();
    }

    /// Insert a food at a given position (scripted scenarios and tests)
    pub fn insert(&mut self, pos: Vec2, speed: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.foods.push(Food { id, pos, speed });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let area = PlayArea::default();
        let mut store = FoodStore::new();
        for _ in 0..500 {
            let food = store.spawn(&mut rng, &area, 1.6, 2.0).clone();
            assert!(food.pos.x >= 0.0 && food.pos.x < area.spawn_width);
            assert_eq!(food.pos.y, area.spawn_y);
            assert!(food.speed >= 1.6 && food.speed < 3.6);
        }
        assert_eq!(store.len(), 500);
    }

    #[test]
    fn test_ids_are_stable_across_removal() {
        let mut rng = Pcg32::seed_from_u64(1);
        let area = PlayArea::default();
        let mut store = FoodStore::new();
        let a = store.spawn(&mut rng, &area, 1.0, 2.0).id;
        let b = store.spawn(&mut rng, &area, 1.0, 2.0).id;
        let removed = store.remove_at(0);
        assert_eq!(removed.id, a);
        let c = store.spawn(&mut rng, &area, 1.0, 2.0).id;
        assert_ne!(c, a);
        assert!(store.get(b).is_some());
        assert!(store.get(a).is_none());
    }

    #[test]
    fn test_advance_scales_by_multiplier() {
        let mut store = FoodStore::new();
        let id = store.insert(Vec2::new(10.0, 80.0), 2.0);
        store.advance(1.5);
        assert_eq!(store.get(id).unwrap().pos, Vec2::new(10.0, 83.0));
        store.advance(1.0);
        assert_eq!(store.get(id).unwrap().pos.y, 85.0);
    }
}
