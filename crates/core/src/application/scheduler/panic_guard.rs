// Panic payload extraction for isolated publish tasks
use std::any::Any;

/// Render a panic payload as text
///
/// `panic!` payloads are `&str` or `String`; anything else is opaque.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
