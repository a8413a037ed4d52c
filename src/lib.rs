pub mod catalog;
pub mod completion;
pub mod config;
pub mod decision;
pub mod docs;
pub mod fontawesome;
pub mod mapping;
pub mod pipeline;
pub mod resolver;
pub mod spreet;
pub mod tracing;
