mod command_input;
mod confirm;
mod input;
mod key_result;
mod mutation;
mod prompt;
mod toast;

pub use command_input::{CommandEvent, CommandInput};
pub use confirm::{Confirm, ConfirmEvent};
pub use key_result::KeyResult;
pub use mutation::Mutation;
pub use prompt::{Prompt, PromptEvent};
pub use toast::{Toast, ToastLevel, Toasts};
