pub mod controller;
pub mod error;
pub mod events;
pub mod fields;
pub mod payloads;

pub use controller::{DialogController, EventSource, Transition, UNCONDITIONAL_HASH};
pub use error::DialogError;
pub use events::{
    PoppitOutput, SlashCommand, SubmittedView, SubmittingUser, ViewState, ViewSubmission,
};
pub use fields::{FieldValue, FormValues};
pub use payloads::{
    pr_list_command, pr_posted_message, PrModalPrivateMetadata, NOTIFICATION_TTL_SECS,
    PR_COMMAND, PR_LIST_TASK_TYPE,
};
