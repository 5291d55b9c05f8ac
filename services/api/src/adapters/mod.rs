pub mod assistant;
pub mod events;
pub mod pages;

pub use assistant::SimulatedAssistant;
pub use events::BroadcastObserver;
pub use pages::RandomPageCounter;
