//! Stacked item mover
//!
//! Items live in ordered slots (top = last element). While running, a fixed
//! interval ticker moves the top item of the source slot to the next
//! destination slot in round-robin order. The move is an eased tween; the
//! item joins the destination order only when the tween completes.
//!
//! Slot order is the source of truth. Item positions are a projection of it,
//! rebuilt per slot by `relayout`.

use glam::Vec2;

use super::easing::Easing;
use super::ticker::IntervalTicker;
use super::tween::{TransitionTask, TweenScheduler};
use crate::consts::{CARD_COUNT, CARD_STACK_STEP, CARD_VISIBLE_DEPTH};

/// Identifier of an item; items are numbered 0..item_count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u32);

/// Mover lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoverState {
    Idle,
    Running,
}

/// Mover tuning
#[derive(Debug, Clone)]
pub struct MoverConfig {
    pub item_count: usize,
    /// Slot centres, relative to the board origin
    pub slot_positions: Vec<Vec2>,
    pub source_slot: usize,
    /// Seconds between moves
    pub interval: f32,
    /// Seconds per move animation
    pub move_duration: f32,
    pub easing: Easing,
    /// Only this many top items get a visible offset; older ones share the base
    pub visible_depth: usize,
    /// Offset between consecutive visible items
    pub stack_step: Vec2,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            item_count: CARD_COUNT,
            slot_positions: grid_positions(3, 2, Vec2::new(220.0, 260.0)),
            source_slot: 0,
            interval: 1.0,
            move_duration: 2.0,
            easing: Easing::EaseOutCubic,
            visible_depth: CARD_VISIBLE_DEPTH,
            stack_step: Vec2::new(0.0, -CARD_STACK_STEP),
        }
    }
}

/// Slot centres for a `columns` x `rows` grid centred on the origin
pub fn grid_positions(columns: usize, rows: usize, spacing: Vec2) -> Vec<Vec2> {
    let mut positions = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        let y = (row as f32 - (rows as f32 - 1.0) / 2.0) * spacing.y;
        for col in 0..columns {
            let x = (col as f32 - (columns as f32 - 1.0) / 2.0) * spacing.x;
            positions.push(Vec2::new(x, y));
        }
    }
    positions
}

/// An ordered pile of items
#[derive(Debug, Clone)]
pub struct StackSlot {
    pub base: Vec2,
    items: Vec<ItemId>,
    /// Moves heading here that have not landed yet
    incoming: usize,
}

impl StackSlot {
    fn new(base: Vec2) -> Self {
        Self {
            base,
            items: Vec::new(),
            incoming: 0,
        }
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn top(&self) -> Option<ItemId> {
        self.items.last().copied()
    }
}

/// A move in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transfer {
    item: ItemId,
    target: usize,
}

/// Moves items between stacked slots on a fixed interval
pub struct StackedItemMover {
    config: MoverConfig,
    slots: Vec<StackSlot>,
    /// Visual position per item, indexed by `ItemId`
    positions: Vec<Vec2>,
    ticker: IntervalTicker,
    transfers: TweenScheduler<Vec2, Transfer>,
    /// Reused buffer for completed transfers
    completed: Vec<Transfer>,
    /// Index into the destination list for round-robin selection
    next_target: usize,
    moved_count: u32,
}

impl StackedItemMover {
    /// # Panics
    ///
    /// Panics if `config.source_slot` is not an index into `config.slot_positions`.
    pub fn new(config: MoverConfig) -> Self {
        assert!(
            config.source_slot < config.slot_positions.len(),
            "source slot {} out of range",
            config.source_slot
        );
        let slots = config
            .slot_positions
            .iter()
            .map(|&base| StackSlot::new(base))
            .collect();
        let mut mover = Self {
            ticker: IntervalTicker::new(config.interval),
            positions: vec![Vec2::ZERO; config.item_count],
            slots,
            transfers: TweenScheduler::new(),
            completed: Vec::new(),
            next_target: 0,
            moved_count: 0,
            config,
        };
        mover.restore_initial();
        mover
    }

    pub fn state(&self) -> MoverState {
        if self.ticker.is_running() {
            MoverState::Running
        } else {
            MoverState::Idle
        }
    }

    pub fn moved_count(&self) -> u32 {
        self.moved_count
    }

    /// Host-facing counter label
    pub fn counter_label(&self) -> String {
        format!("Cards Moved: {}", self.moved_count)
    }

    pub fn slots(&self) -> &[StackSlot] {
        &self.slots
    }

    pub fn in_flight_count(&self) -> usize {
        self.transfers.len()
    }

    /// Current visual position of an item, `None` for ids outside `0..item_count`
    pub fn position(&self, item: ItemId) -> Option<Vec2> {
        self.positions.get(item.0 as usize).copied()
    }

    /// Begin periodic moves. A second start while running is a no-op.
    pub fn start(&mut self) {
        if self.ticker.start() {
            log::info!("Stack mover started ({} items in source)", self.slots[self.config.source_slot].len());
        }
    }

    /// Stop, cancel every in-flight move and restore the initial arrangement
    pub fn reset(&mut self) {
        self.ticker.stop();
        let cancelled = self.transfers.cancel_all();
        if !cancelled.is_empty() {
            log::debug!("Cancelled {} in-flight moves on reset", cancelled.len());
        }
        self.restore_initial();
        log::info!("Stack mover reset");
    }

    /// Advance by `dt` seconds: fire due moves, then step running tweens
    pub fn update(&mut self, dt: f32) {
        let fires = self.ticker.advance(dt);
        for _ in 0..fires {
            self.move_one();
        }

        let mut done = std::mem::take(&mut self.completed);
        self.transfers.advance(dt, &mut done);
        for transfer in done.drain(..) {
            self.land(transfer);
        }
        self.completed = done;

        for task in self.transfers.iter() {
            self.positions[task.payload().item.0 as usize] = task.value();
        }
    }

    /// Take the source's top item and start moving it to the next destination.
    /// Returns false when the source is empty.
    pub fn move_one(&mut self) -> bool {
        let source = self.config.source_slot;
        let Some(item) = self.slots[source].items.pop() else {
            return false;
        };
        // Items below the removed one shift up into the visible window
        self.relayout(source);
        let target = self.next_destination();

        // Land on top of whatever is already there or heading there
        let landing_index = self.slots[target].len() + self.slots[target].incoming;
        let end = self.slot_position(target, landing_index, landing_index + 1);
        self.slots[target].incoming += 1;

        let start = self.positions[item.0 as usize];
        self.transfers.start(TransitionTask::new(
            start,
            end,
            self.config.move_duration,
            self.config.easing,
            Transfer { item, target },
        ));
        true
    }

    /// Every item in draw order: slots bottom-to-top, then items in flight
    pub fn draw_list(&self) -> Vec<(ItemId, Vec2)> {
        let mut list: Vec<(ItemId, Vec2)> = self
            .slots
            .iter()
            .flat_map(|slot| slot.items.iter().map(|&id| (id, self.positions[id.0 as usize])))
            .collect();
        list.extend(
            self.transfers
                .iter()
                .map(|task| (task.payload().item, task.value())),
        );
        list
    }

    fn next_destination(&mut self) -> usize {
        let destinations = self.slots.len() - 1;
        if destinations == 0 {
            return self.config.source_slot;
        }
        let k = self.next_target % destinations;
        self.next_target = (self.next_target + 1) % destinations;
        // Skip over the source slot
        if k >= self.config.source_slot { k + 1 } else { k }
    }

    fn land(&mut self, transfer: Transfer) {
        let slot = &mut self.slots[transfer.target];
        slot.incoming = slot.incoming.saturating_sub(1);
        slot.items.push(transfer.item);
        self.relayout(transfer.target);
        self.moved_count += 1;
        log::debug!(
            "Item {} landed in slot {} (moved {})",
            transfer.item.0,
            transfer.target,
            self.moved_count
        );
    }

    /// Recompute visible stacking offsets for one slot
    fn relayout(&mut self, slot_index: usize) {
        let len = self.slots[slot_index].len();
        for index in 0..len {
            let id = self.slots[slot_index].items[index];
            self.positions[id.0 as usize] = self.slot_position(slot_index, index, len);
        }
    }

    /// Position of the item at `index` in a slot holding `len` items
    fn slot_position(&self, slot_index: usize, index: usize, len: usize) -> Vec2 {
        let hidden = len.saturating_sub(self.config.visible_depth);
        let depth = index.saturating_sub(hidden);
        self.slots[slot_index].base + self.config.stack_step * depth as f32
    }

    fn restore_initial(&mut self) {
        for slot in &mut self.slots {
            slot.items.clear();
            slot.incoming = 0;
        }
        let source = self.config.source_slot;
        self.slots[source]
            .items
            .extend((0..self.config.item_count as u32).map(ItemId));
        for index in 0..self.slots.len() {
            self.relayout(index);
        }
        self.next_target = 0;
        self.moved_count = 0;
    }
}

impl Default for StackedItemMover {
    fn default() -> Self {
        Self::new(MoverConfig::default())
    }
}
