mod sequential_impulse;

pub use sequential_impulse::{SequentialImpulseSolver, SolverConfig};
