use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use tracing::trace;

use crate::simulation::history::{AgentMonthRecord, MonthRecord};
use crate::simulation::modes::TransportMode;

pub trait EventTrait: Debug + Any {
    /// Short name of the event kind, e.g. for log messages.
    fn type_(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn month(&self) -> u32;
}

type OnEventFn = dyn Fn(&dyn EventTrait) + 'static;

/// Dispatches published events to the callbacks registered for their concrete type.
#[derive(Default)]
pub struct EventsManager {
    callbacks: HashMap<TypeId, Vec<Box<OnEventFn>>>,
}

impl Debug for EventsManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let registered: usize = self.callbacks.values().map(Vec::len).sum();
        write!(f, "EventsManager {{ callbacks: {registered} }}")
    }
}

impl EventsManager {
    pub fn new() -> Self {
        EventsManager {
            callbacks: HashMap::new(),
        }
    }

    pub fn publish_event(&self, event: &dyn EventTrait) {
        trace!("publishing {} of month {}", event.type_(), event.month());
        if let Some(callbacks) = self.callbacks.get(&event.as_any().type_id()) {
            for callback in callbacks {
                callback(event);
            }
        }
    }

    /// Registers `f` for events of type `E`. Callbacks run in registration order.
    pub fn on<E, F>(&mut self, f: F)
    where
        E: EventTrait,
        F: Fn(&E) + 'static,
    {
        self.callbacks
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Box::new(move |event: &dyn EventTrait| {
                if let Some(e) = event.as_any().downcast_ref::<E>() {
                    f(e);
                }
            }));
    }
}

/// Published once per agent and month, after the decision was applied.
#[derive(Debug, Clone)]
pub struct ModeDecisionEvent {
    pub month: u32,
    pub previous_mode: TransportMode,
    pub record: AgentMonthRecord,
}

impl ModeDecisionEvent {
    pub const TYPE: &'static str = "modedecision";

    pub fn switched(&self) -> bool {
        self.previous_mode != self.record.mode
    }
}

impl EventTrait for ModeDecisionEvent {
    fn type_(&self) -> &'static str {
        Self::TYPE
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn month(&self) -> u32 {
        self.month
    }
}

/// Published once per month, after the month record was appended to the history.
#[derive(Debug, Clone)]
pub struct MonthCompletedEvent {
    pub record: MonthRecord,
}

impl MonthCompletedEvent {
    pub const TYPE: &'static str = "monthcompleted";
}

impl EventTrait for MonthCompletedEvent {
    fn type_(&self) -> &'static str {
        Self::TYPE
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn month(&self) -> u32 {
        self.record.month
    }
}
