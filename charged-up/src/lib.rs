pub mod auto;
pub mod subsystems;
