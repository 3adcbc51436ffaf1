pub mod inputs;
pub mod results;
pub mod sensitivity;
pub mod threshold;

use super::components::Component;

/// Trait for full screen views
pub trait Screen: Component {
    /// Get the screen title
    fn title(&self) -> &str;
}
