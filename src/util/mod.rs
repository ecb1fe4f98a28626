
/// Helper functions for writing JSON via serde
pub mod json_io;
/// Helper functions for generating the progress spinners
pub mod progress_bar;
