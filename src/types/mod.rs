pub mod ensemble_matrix;
pub mod location;
pub mod run_time;
pub mod variable;
