pub mod agent;
pub mod history;
pub mod stdio;
pub mod tooling;
