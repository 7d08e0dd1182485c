pub mod progress_handlers;
