// Application Layer - Use Cases and Business Logic

pub mod posts;
pub mod publish;
pub mod recovery;
pub mod scheduler;
pub mod state_machine;

// Re-exports
pub use posts::{PostService, ScheduleRequest};
pub use publish::{ContainerPublisher, PollSettings};
pub use recovery::RecoveryService;
pub use scheduler::{shutdown_channel, CycleOutcome, Scheduler, ShutdownSender, ShutdownToken};
pub use state_machine::{PublishStateMachine, Transition};
