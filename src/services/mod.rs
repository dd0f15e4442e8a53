pub mod clock;
pub mod contracts;
pub mod fields;
pub mod model_client;
pub mod prompt;
