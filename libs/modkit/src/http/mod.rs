pub mod client;
pub mod deadline;
