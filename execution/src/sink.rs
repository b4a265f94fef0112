use crashline_types::RoundEvent;

/// Receives events from the round state machine in emission order.
pub trait EventSink {
    fn emit(&mut self, event: RoundEvent);
}

/// Records every event. Used by tests and offline simulation.
impl EventSink for Vec<RoundEvent> {
    fn emit(&mut self, event: RoundEvent) {
        self.push(event);
    }
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: RoundEvent) {}
}
