use crate::errors::ServiceError;
use crate::models::VoucherPosition;

/// Label grid dimensions of a page format.
///
/// Wire coordinates are 1-based; the flattened index is 0-based:
/// `index = (x-1) + width*(y-1) + width*height*(page-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelGrid {
    pub width: u32,
    pub height: u32,
}

impl LabelGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Checks that an explicit position lies inside the declared grid:
    /// `1 <= x <= width`, `1 <= y <= height`, `page >= 1`.
    pub fn validate(&self, position: &VoucherPosition) -> Result<(), ServiceError> {
        if position.label_x < 1
            || position.label_x > self.width
            || position.label_y < 1
            || position.label_y > self.height
            || position.page < 1
        {
            return Err(ServiceError::PageFormat(format!(
                "position ({}, {}) on page {} is outside the {}x{} label grid",
                position.label_x, position.label_y, position.page, self.width, self.height
            )));
        }
        Ok(())
    }

    pub fn flatten(&self, position: &VoucherPosition) -> usize {
        let w = self.width as usize;
        let h = self.height as usize;
        (position.label_x as usize - 1)
            + w * (position.label_y as usize - 1)
            + w * h * (position.page as usize - 1)
    }

    pub fn unflatten(&self, index: usize) -> VoucherPosition {
        let w = self.width as usize;
        let h = self.height as usize;
        VoucherPosition {
            label_x: (index % w) as u32 + 1,
            label_y: ((index / w) % h) as u32 + 1,
            page: (index / (w * h)) as u32 + 1,
        }
    }
}

/// Transient per-checkout map from flattened grid coordinate to cart item
/// index. Built only when at least one item lacks explicit position data.
#[derive(Debug)]
pub struct PositionMap {
    grid: LabelGrid,
    slots: Vec<Option<usize>>,
}

impl PositionMap {
    pub fn new(grid: LabelGrid) -> Self {
        Self {
            grid,
            slots: Vec::new(),
        }
    }

    pub fn grid(&self) -> LabelGrid {
        self.grid
    }

    /// First free slot, scanning linearly from index 0; when every slot is
    /// occupied the map grows by one. The scan always starts at 0 — this is
    /// the wire-compatible placement policy, even though it can move
    /// displaced items onto earlier pages for large carts.
    fn first_free(&self) -> usize {
        self.slots
            .iter()
            .position(Option::is_none)
            .unwrap_or(self.slots.len())
    }

    fn put(&mut self, index: usize, item: usize) -> Option<usize> {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index].replace(item)
    }

    /// Seats an item at its explicit position. If the slot is already
    /// occupied, the previously seated item is displaced to the first free
    /// slot; the arriving item always keeps its requested position.
    pub fn seat_at(&mut self, position: &VoucherPosition, item: usize) {
        let index = self.grid.flatten(position);
        if let Some(displaced) = self.put(index, item) {
            let free = self.first_free();
            self.put(free, displaced);
        }
    }

    /// Seats an item lacking explicit position data into the first free slot.
    pub fn seat_first_free(&mut self, item: usize) {
        let free = self.first_free();
        self.put(free, item);
    }

    /// Occupied entries as `(flattened index, cart item index)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|item| (index, item)))
    }
}
