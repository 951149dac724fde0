//! Synthetic clicks using macOS CGEvent

use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

use super::actuator::{ActuationError, PointerActuator};

/// Posts a left down/up pair at the current cursor position
pub struct CoreGraphicsActuator;

impl CoreGraphicsActuator {
    pub fn new() -> Self {
        Self
    }
}

fn event_source() -> Result<CGEventSource, ActuationError> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState).map_err(|_| ActuationError::EventSource)
}

impl PointerActuator for CoreGraphicsActuator {
    fn emit_click(&mut self) -> Result<(), ActuationError> {
        // A bare event carries the live cursor location.
        let position = CGEvent::new(event_source()?)
            .map_err(|_| ActuationError::EventCreation)?
            .location();

        for kind in [CGEventType::LeftMouseDown, CGEventType::LeftMouseUp] {
            let event = CGEvent::new_mouse_event(event_source()?, kind, position, CGMouseButton::Left)
                .map_err(|_| ActuationError::EventCreation)?;
            event.post(CGEventTapLocation::HID);
        }

        Ok(())
    }
}
