//! Entity registry
//!
//! `World` owns every entity of a session: live ones (updated, drawn, and
//! visible to queries, in registration order) and disabled ones (parked by a
//! pool for reuse). It also owns the event bus, the tick counter, the input
//! history and the session RNG.
//!
//! Behaviors are taken out of their slot while they run and put back
//! afterwards, so a behavior can freely mutate the world, including deleting
//! itself. Notifications addressed to a behavior that is currently running are
//! queued and delivered as soon as it is put back.

use std::collections::HashMap;
use std::fmt;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::settings::Settings;

use super::behavior::{Added, Behavior, Kind, Removed};
use super::clock::Clock;
use super::events::{AddReason, Channel, EventBus, GameEvent, RemoveReason, SubscriptionToken};
use super::input::{InputSource, InputState};
use super::object::GameObject;
use super::rect::Rect;
use super::render::Renderer;

/// Stable handle to an entity; never reused within a `World`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

enum BehaviorCell {
    /// Plain object without logic
    Inert,
    Ready(Box<dyn Behavior>),
    /// Taken out and running
    Busy,
}

enum Taken {
    Ready(Box<dyn Behavior>),
    Busy,
    Inert,
    Gone,
}

struct Slot {
    object: GameObject,
    kind: Kind,
    cell: BehaviorCell,
    enabled: bool,
}

#[derive(Clone)]
enum Notice {
    Game(GameEvent),
    Added(Added, AddReason),
    Removed(Removed, RemoveReason),
}

impl Notice {
    fn dispatch(self, behavior: &mut dyn Behavior, me: EntityId, world: &mut World) {
        match self {
            Notice::Game(event) => behavior.on_game_event(me, event, world),
            Notice::Added(added, reason) => behavior.on_instance_added(me, added, reason, world),
            Notice::Removed(removed, reason) => {
                behavior.on_instance_removed(me, &removed, reason, world)
            }
        }
    }
}

pub struct World {
    slots: HashMap<EntityId, Slot>,
    live: Vec<EntityId>,
    disabled: Vec<EntityId>,
    next_id: u64,
    ticks: u64,
    ended: bool,
    bus: EventBus,
    pending: Vec<(EntityId, Notice)>,
    input: InputState,
    clock: Clock,
    rng: Pcg32,
    arena: Rect,
    debug: bool,
}

impl Default for World {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("ticks", &self.ticks)
            .field("ended", &self.ended)
            .field("live", &self.live.len())
            .field("disabled", &self.disabled.len())
            .field("arena", &self.arena)
            .finish()
    }
}

impl World {
    pub fn new(clock: Clock, arena: Rect, seed: u64) -> Self {
        Self {
            slots: HashMap::new(),
            live: Vec::new(),
            disabled: Vec::new(),
            next_id: 0,
            ticks: 0,
            ended: false,
            bus: EventBus::new(),
            pending: Vec::new(),
            input: InputState::default(),
            clock,
            rng: Pcg32::seed_from_u64(seed),
            arena,
            debug: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut world = Self::new(settings.clock(), settings.arena_rect(), settings.seed);
        world.debug = settings.debug;
        world
    }

    // === Session state ===

    /// Ticks counted since the last reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Mark the session as over; there is no way back
    pub fn end(&mut self) {
        if !self.ended {
            log::info!("Game ended at tick {}", self.ticks);
        }
        self.ended = true;
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Playable area
    pub fn arena(&self) -> Rect {
        self.arena
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Drop every entity and subscription and restart the tick counter
    pub fn clear_state(&mut self) {
        self.slots.clear();
        self.live.clear();
        self.disabled.clear();
        self.bus.clear();
        self.pending.clear();
        self.input = InputState::default();
        self.ticks = 0;
    }

    // === Instance lifecycle ===

    /// Register an entity with logic; returns its id
    pub fn add_instance<B: Behavior>(&mut self, object: GameObject, behavior: B, reason: AddReason) -> EntityId {
        self.insert(object, Kind::of::<B>(), BehaviorCell::Ready(Box::new(behavior)), reason)
    }

    /// Register an already boxed behavior
    pub fn add_boxed(&mut self, object: GameObject, behavior: Box<dyn Behavior>, reason: AddReason) -> EntityId {
        let kind = (*behavior).kind();
        self.insert(object, kind, BehaviorCell::Ready(behavior), reason)
    }

    /// Register a plain object without logic
    pub fn add_object(&mut self, object: GameObject, reason: AddReason) -> EntityId {
        self.insert(object, Kind::of::<GameObject>(), BehaviorCell::Inert, reason)
    }

    fn insert(&mut self, object: GameObject, kind: Kind, cell: BehaviorCell, reason: AddReason) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let channels: &'static [Channel] = match &cell {
            BehaviorCell::Ready(behavior) => behavior.channels(),
            _ => &[],
        };

        self.slots.insert(
            id,
            Slot {
                object,
                kind,
                cell,
                enabled: true,
            },
        );
        self.live.push(id);
        log::debug!("Added {} {} ({:?})", kind.name(), id, reason);

        self.broadcast(Channel::InstanceAdded, Notice::Added(Added { id, kind }, reason));

        // Subscribed only now, so the entity does not hear about its own arrival
        if self.is_live(id) {
            for &channel in channels {
                self.bus.subscribe(id, channel);
            }
        }
        id
    }

    /// Remove a live entity for good
    ///
    /// Returns false, and fires nothing, when `id` is not live.
    pub fn delete_instance(&mut self, id: EntityId, reason: RemoveReason) -> bool {
        if !self.is_live(id) {
            return false;
        }
        self.live.retain(|&l| l != id);
        let Some(slot) = self.slots.remove(&id) else {
            return false;
        };
        self.bus.unsubscribe_entity(id);
        self.pending.retain(|(listener, _)| *listener != id);
        log::debug!("Removed {} {} ({:?})", slot.kind.name(), id, reason);

        let removed = Removed {
            id,
            kind: slot.kind,
            object: slot.object,
        };
        self.broadcast(Channel::InstanceRemoved, Notice::Removed(removed, reason));
        true
    }

    /// Park a live entity; it keeps its state but stops updating and drawing
    ///
    /// The entity loses all its subscriptions either way. The added event
    /// fires only if the entity actually moved.
    pub fn disable_instance(&mut self, id: EntityId, reason: AddReason) -> bool {
        let moved = match self.slots.get_mut(&id) {
            Some(slot) if slot.enabled => {
                slot.enabled = false;
                true
            }
            _ => false,
        };
        if moved {
            self.live.retain(|&l| l != id);
            self.disabled.push(id);
        }
        self.bus.unsubscribe_entity(id);
        self.pending.retain(|(listener, _)| *listener != id);
        if moved {
            log::debug!("Disabled {} ({:?})", id, reason);
            self.announce_added(id, reason);
        }
        moved
    }

    /// Bring a parked entity back to the end of the live set
    ///
    /// Subscriptions are dropped here too and not restored; an enabled entity
    /// that wants events subscribes again itself.
    pub fn enable_instance(&mut self, id: EntityId, reason: AddReason) -> bool {
        let moved = match self.slots.get_mut(&id) {
            Some(slot) if !slot.enabled => {
                slot.enabled = true;
                true
            }
            _ => false,
        };
        if moved {
            self.disabled.retain(|&d| d != id);
            self.live.push(id);
        }
        self.bus.unsubscribe_entity(id);
        self.pending.retain(|(listener, _)| *listener != id);
        if moved {
            log::debug!("Enabled {} ({:?})", id, reason);
            self.announce_added(id, reason);
        }
        moved
    }

    fn announce_added(&mut self, id: EntityId, reason: AddReason) {
        if let Some(kind) = self.kind_of(id) {
            self.broadcast(Channel::InstanceAdded, Notice::Added(Added { id, kind }, reason));
        }
    }

    // === Subscriptions ===

    pub fn subscribe(&mut self, id: EntityId, channel: Channel) -> Option<SubscriptionToken> {
        self.slots.contains_key(&id).then(|| self.bus.subscribe(id, channel))
    }

    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        self.bus.unsubscribe(token)
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Fire a general event to every subscriber
    pub fn emit(&mut self, event: GameEvent) {
        self.broadcast(Channel::General, Notice::Game(event));
    }

    fn broadcast(&mut self, channel: Channel, notice: Notice) {
        for listener in self.bus.subscribers(channel) {
            // Listeners dropped earlier in this round are skipped
            if self.bus.is_subscribed(listener, channel) {
                self.deliver(listener, notice.clone());
            }
        }
    }

    fn deliver(&mut self, listener: EntityId, notice: Notice) {
        match self.take_behavior(listener) {
            Taken::Ready(mut behavior) => {
                notice.dispatch(&mut *behavior, listener, self);
                self.restore(listener, behavior);
            }
            Taken::Busy => self.pending.push((listener, notice)),
            Taken::Inert => {}
            Taken::Gone => log::trace!("Dropped event for missing listener {}", listener),
        }
    }

    fn take_behavior(&mut self, id: EntityId) -> Taken {
        let Some(slot) = self.slots.get_mut(&id) else {
            return Taken::Gone;
        };
        match std::mem::replace(&mut slot.cell, BehaviorCell::Busy) {
            BehaviorCell::Ready(behavior) => Taken::Ready(behavior),
            BehaviorCell::Busy => Taken::Busy,
            BehaviorCell::Inert => {
                slot.cell = BehaviorCell::Inert;
                Taken::Inert
            }
        }
    }

    /// Put a behavior back and deliver what queued up while it ran
    fn restore(&mut self, id: EntityId, behavior: Box<dyn Behavior>) {
        match self.slots.get_mut(&id) {
            Some(slot) => slot.cell = BehaviorCell::Ready(behavior),
            None => {
                // Deleted while running; the behavior goes with it
                self.pending.retain(|(listener, _)| *listener != id);
                return;
            }
        }
        while let Some(index) = self.pending.iter().position(|(listener, _)| *listener == id) {
            let (_, notice) = self.pending.remove(index);
            self.deliver(id, notice);
        }
    }

    // === Access ===

    pub fn is_live(&self, id: EntityId) -> bool {
        self.slots.get(&id).is_some_and(|s| s.enabled)
    }

    pub fn is_disabled(&self, id: EntityId) -> bool {
        self.slots.get(&id).is_some_and(|s| !s.enabled)
    }

    /// Live or disabled
    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Live entities in registration order
    pub fn live(&self) -> &[EntityId] {
        &self.live
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn disabled_count(&self) -> usize {
        self.disabled.len()
    }

    pub fn kind_of(&self, id: EntityId) -> Option<Kind> {
        self.slots.get(&id).map(|s| s.kind)
    }

    pub fn object(&self, id: EntityId) -> Option<&GameObject> {
        self.slots.get(&id).map(|s| &s.object)
    }

    pub fn object_mut(&mut self, id: EntityId) -> Option<&mut GameObject> {
        self.slots.get_mut(&id).map(|s| &mut s.object)
    }

    /// Borrow an entity's behavior; `None` while it is running
    pub fn behavior<B: Behavior>(&self, id: EntityId) -> Option<&B> {
        match &self.slots.get(&id)?.cell {
            BehaviorCell::Ready(behavior) => (**behavior).as_any().downcast_ref::<B>(),
            _ => None,
        }
    }

    pub fn behavior_mut<B: Behavior>(&mut self, id: EntityId) -> Option<&mut B> {
        match &mut self.slots.get_mut(&id)?.cell {
            BehaviorCell::Ready(behavior) => (**behavior).as_any_mut().downcast_mut::<B>(),
            _ => None,
        }
    }

    /// Run `f` with an entity's behavior and the world at the same time
    ///
    /// Returns `None` if the entity is gone, is of another type, or its
    /// behavior is already running further up the call stack.
    pub fn with_behavior<B, R>(&mut self, id: EntityId, f: impl FnOnce(&mut B, &mut World) -> R) -> Option<R>
    where
        B: Behavior,
    {
        if !self.slots.get(&id)?.kind.is::<B>() {
            return None;
        }
        let mut behavior = match self.take_behavior(id) {
            Taken::Ready(behavior) => behavior,
            Taken::Busy => {
                log::warn!("Skipped re-entrant access to {}", id);
                return None;
            }
            Taken::Inert | Taken::Gone => return None,
        };
        let result = (*behavior).as_any_mut().downcast_mut::<B>().map(|b| f(b, self));
        self.restore(id, behavior);
        result
    }

    // === Typed queries ===

    fn live_of(&self, kind: Kind) -> impl Iterator<Item = EntityId> + '_ {
        self.live
            .iter()
            .copied()
            .filter(move |id| self.slots.get(id).is_some_and(|s| s.kind == kind))
    }

    pub fn instance_exists<B: Behavior>(&self) -> bool {
        self.live_of(Kind::of::<B>()).next().is_some()
    }

    /// First live instance of `B`, in registration order
    pub fn find_instance<B: Behavior>(&self) -> Option<EntityId> {
        self.live_of(Kind::of::<B>()).next()
    }

    pub fn find_instance_except<B: Behavior>(&self, me: EntityId) -> Option<EntityId> {
        self.live_of(Kind::of::<B>()).find(|&id| id != me)
    }

    /// First live instance of `B` whose object and behavior satisfy `pred`
    ///
    /// Instances whose behavior is currently running are skipped.
    pub fn find_instance_where<B: Behavior>(&self, pred: impl Fn(&GameObject, &B) -> bool) -> Option<EntityId> {
        self.live_of(Kind::of::<B>())
            .find(|&id| self.matches(id, &pred))
    }

    pub fn find_instances<B: Behavior>(&self) -> Vec<EntityId> {
        self.live_of(Kind::of::<B>()).collect()
    }

    pub fn find_instances_except<B: Behavior>(&self, me: EntityId) -> Vec<EntityId> {
        self.live_of(Kind::of::<B>()).filter(|&id| id != me).collect()
    }

    pub fn find_instances_where<B: Behavior>(&self, pred: impl Fn(&GameObject, &B) -> bool) -> Vec<EntityId> {
        self.live_of(Kind::of::<B>())
            .filter(|&id| self.matches(id, &pred))
            .collect()
    }

    fn matches<B: Behavior>(&self, id: EntityId, pred: &impl Fn(&GameObject, &B) -> bool) -> bool {
        match (self.object(id), self.behavior::<B>(id)) {
            (Some(object), Some(behavior)) => pred(object, behavior),
            _ => false,
        }
    }

    // === Collision queries ===

    fn colliding(&self, me: EntityId, kind: Option<Kind>) -> impl Iterator<Item = EntityId> + '_ {
        let own = self.object(me);
        self.live.iter().copied().filter(move |&other| {
            let (Some(own), Some(slot)) = (own, self.slots.get(&other)) else {
                return false;
            };
            other != me && kind.is_none_or(|k| slot.kind == k) && own.collides_with(&slot.object)
        })
    }

    /// Whether `me` touches any other live entity
    pub fn collides(&self, me: EntityId) -> bool {
        self.colliding(me, None).next().is_some()
    }

    pub fn collides_with<B: Behavior>(&self, me: EntityId) -> bool {
        self.colliding(me, Some(Kind::of::<B>())).next().is_some()
    }

    /// Every live entity `me` touches, in registration order
    pub fn collisions(&self, me: EntityId) -> Vec<EntityId> {
        self.colliding(me, None).collect()
    }

    pub fn collisions_of<B: Behavior>(&self, me: EntityId) -> Vec<EntityId> {
        self.colliding(me, Some(Kind::of::<B>())).collect()
    }

    // === Tick ===

    /// Run one full tick
    ///
    /// Entities are updated from a snapshot of the live set taken after the
    /// input poll. Anything added during the pass starts updating next tick;
    /// anything removed or disabled before its turn is skipped.
    pub fn tick(&mut self, input: &mut dyn InputSource, renderer: &mut dyn Renderer) {
        self.emit(GameEvent::TickStarted);

        self.input.update(input, self.ticks);

        let snapshot = self.live.clone();
        for id in snapshot {
            if self.is_live(id) {
                self.update_entity(id);
            }
        }
        self.emit(GameEvent::TickProcessed);

        self.render(renderer);
        self.emit(GameEvent::TickRendered);

        self.ticks += 1;
        self.emit(GameEvent::TickCounted);

        if self.debug {
            log::trace!(
                "Tick {}: {} live, {} disabled",
                self.ticks,
                self.live.len(),
                self.disabled.len()
            );
        }
    }

    fn update_entity(&mut self, id: EntityId) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.object.advance();
        }
        if let Taken::Ready(mut behavior) = self.take_behavior(id) {
            behavior.update(id, self);
            self.restore(id, behavior);
        }
    }

    /// Draw every visible live entity, in registration order
    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.clear();
        for id in &self.live {
            let Some(slot) = self.slots.get(id) else {
                continue;
            };
            if let Some(display) = &slot.object.display {
                display.draw(slot.object.pos, renderer);
            }
        }
        renderer.present();
    }
}
