//! Engine core
//!
//! Everything needed to run a tick-based arcade game, with no game content:
//! - Geometry (`vec`, `rect`) and colliders
//! - The `World` registry with its event bus
//! - Scripted sequences and entity pooling
//! - Clock, input and rendering seams
//!
//! A tick is fully deterministic given the settings seed and the input script.

pub mod behavior;
pub mod clock;
pub mod collider;
pub mod events;
pub mod input;
pub mod object;
pub mod pool;
pub mod rect;
pub mod render;
pub mod sequence;
pub mod tick;
pub mod vec;
pub mod world;

pub use behavior::{Added, Behavior, Kind, Removed};
pub use clock::Clock;
pub use collider::{Collider, Placed};
pub use events::{AddReason, Channel, EventBus, GameEvent, RemoveReason, SubscriptionToken};
pub use input::{GameButton, GameInput, InputSource, InputState, NoInput, ScriptedInput};
pub use object::GameObject;
pub use pool::Pool;
pub use rect::Rect;
pub use render::{Backend, Display, NullRenderer, Renderer, Sprite, TextGrid};
pub use sequence::{Prefab, Sequence, SequenceStep, Spawnable, StepAction};
pub use tick::{run, run_for};
pub use vec::{Vec2, Vec2Ext};
pub use world::{EntityId, World};
