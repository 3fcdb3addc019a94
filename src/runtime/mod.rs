pub mod logging;
pub mod subscriber;
pub mod supervisor;
pub mod worker_registry;

pub use logging::{init_logging, LogLevel};
pub use subscriber::{build_worker_specs, WorkerSpec, RESUBSCRIBE_BACKOFF};
pub use supervisor::{run_supervisor, RuntimeError, SupervisorReport, SHUTDOWN_GRACE_PERIOD};
pub use worker_registry::{
    apply_worker_event, sleep_with_stop, WorkerEvent, WorkerHealth, WorkerState,
};
