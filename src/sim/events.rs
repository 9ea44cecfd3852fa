//! Event bus
//!
//! Three independent channels: general tick lifecycle, instance added and
//! instance removed. Entities subscribe per channel and get a token back.
//! Delivery happens in subscription order and is driven by the `World`,
//! which owns the listeners' behaviors.

use super::world::EntityId;

/// General lifecycle notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEvent {
    /// Before any entity is updated
    TickStarted,
    /// After every entity was updated, before rendering
    TickProcessed,
    /// After the frame was presented
    TickRendered,
    /// After the tick counter moved
    TickCounted,
    /// The stage script has nothing left to do
    StageFinished,
}

/// Why an instance entered (or re-entered) the live set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddReason {
    #[default]
    None,
    /// Child of another instance
    Related,
    /// A projectile
    Shoot,
}

/// Why an instance left the live set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RemoveReason {
    #[default]
    None,
    /// Side effect of something else
    Dropped,
    /// Ran its course
    Died,
    /// Destroyed by another instance
    Killed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    General,
    InstanceAdded,
    InstanceRemoved,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::General, Channel::InstanceAdded, Channel::InstanceRemoved];

    fn index(self) -> usize {
        match self {
            Channel::General => 0,
            Channel::InstanceAdded => 1,
            Channel::InstanceRemoved => 2,
        }
    }
}

/// Handle for one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken {
    channel: Channel,
    serial: u64,
}

impl SubscriptionToken {
    pub fn channel(&self) -> Channel {
        self.channel
    }
}

#[derive(Debug, Clone, Copy)]
struct Subscription {
    serial: u64,
    entity: EntityId,
}

/// Subscriber lists for the three channels
#[derive(Debug, Default)]
pub struct EventBus {
    lists: [Vec<Subscription>; 3],
    next_serial: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entity` to the channel's subscriber list
    pub fn subscribe(&mut self, entity: EntityId, channel: Channel) -> SubscriptionToken {
        let serial = self.next_serial;
        self.next_serial += 1;
        self.lists[channel.index()].push(Subscription { serial, entity });
        SubscriptionToken { channel, serial }
    }

    /// Drop one subscription; false if it was already gone
    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        let list = &mut self.lists[token.channel.index()];
        let before = list.len();
        list.retain(|s| s.serial != token.serial);
        list.len() != before
    }

    /// Drop every subscription `entity` holds, on all channels
    pub fn unsubscribe_entity(&mut self, entity: EntityId) -> usize {
        let mut removed = 0;
        for list in &mut self.lists {
            let before = list.len();
            list.retain(|s| s.entity != entity);
            removed += before - list.len();
        }
        removed
    }

    pub fn is_subscribed(&self, entity: EntityId, channel: Channel) -> bool {
        self.lists[channel.index()].iter().any(|s| s.entity == entity)
    }

    /// Snapshot of the listeners, in subscription order
    pub fn subscribers(&self, channel: Channel) -> Vec<EntityId> {
        self.lists[channel.index()].iter().map(|s| s.entity).collect()
    }

    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.lists[channel.index()].len()
    }

    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_order_is_kept() {
        let mut bus = EventBus::new();
        let (a, b, c) = (EntityId::from_raw(1), EntityId::from_raw(2), EntityId::from_raw(3));
        bus.subscribe(b, Channel::General);
        bus.subscribe(a, Channel::General);
        bus.subscribe(c, Channel::InstanceAdded);
        assert_eq!(bus.subscribers(Channel::General), vec![b, a]);
        assert_eq!(bus.subscribers(Channel::InstanceAdded), vec![c]);
        assert!(bus.subscribers(Channel::InstanceRemoved).is_empty());
    }

    #[test]
    fn test_unsubscribe_by_token() {
        let mut bus = EventBus::new();
        let a = EntityId::from_raw(1);
        let first = bus.subscribe(a, Channel::General);
        let second = bus.subscribe(a, Channel::General);
        assert!(bus.unsubscribe(first));
        assert!(!bus.unsubscribe(first));
        assert_eq!(bus.subscriber_count(Channel::General), 1);
        assert!(bus.unsubscribe(second));
        assert!(!bus.is_subscribed(a, Channel::General));
    }

    #[test]
    fn test_unsubscribe_entity_clears_all_channels() {
        let mut bus = EventBus::new();
        let a = EntityId::from_raw(1);
        let b = EntityId::from_raw(2);
        for channel in Channel::ALL {
            bus.subscribe(a, channel);
        }
        bus.subscribe(b, Channel::InstanceRemoved);
        assert_eq!(bus.unsubscribe_entity(a), 3);
        assert_eq!(bus.unsubscribe_entity(a), 0);
        assert_eq!(bus.subscribers(Channel::InstanceRemoved), vec![b]);
    }
}
