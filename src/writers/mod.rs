/*!
# Writers module
Contains the logic for writing the output report.
*/
/// Generates the tab-delimited downstream variant report
pub mod report;
