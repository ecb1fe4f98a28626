/*!
# CLI module
Command line interface functionality that is specific to Framewalk.
*/

/// Version strings, help text, and shared file checks
pub mod core;
/// The command line settings and their validation
pub mod settings;
