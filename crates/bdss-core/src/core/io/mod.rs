//! Reading and writing of persisted workflow descriptions.

pub mod workflow_file;
