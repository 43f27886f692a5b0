pub mod clob;
pub mod execution_observer;
pub mod positions;
pub mod wire;
