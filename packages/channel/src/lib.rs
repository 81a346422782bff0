pub mod channel;
pub mod debounce;
pub mod protocol;
pub mod worker;

#[cfg(test)]
mod tests_channel;

pub use channel::{
    ChannelConfig, ChannelError, ConversionChannel, LintUpdate, DEFAULT_DEBOUNCE_MS,
    MAX_DEBOUNCE_MS, MIN_DEBOUNCE_MS,
};
pub use debounce::DebouncedTask;
pub use protocol::{WorkerRequest, WorkerResponse, WriteOrigin};
pub use worker::{handle_request, spawn_worker};
