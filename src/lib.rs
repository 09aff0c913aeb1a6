// Chess harness: agents, fixed-depth searchers, and a match driver
pub mod agent;
pub mod board;
pub mod engine;
pub mod eval;
pub mod game;
pub mod search;
pub mod tablebase;
