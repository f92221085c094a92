pub mod selectors;
pub mod simulation;

pub use selectors::{max_sharpe_portfolio, min_volatility_portfolio, SelectedPortfolio};
pub use simulation::{
    run_frontier_simulation, simulate_efficient_frontier, FrontierInput, FrontierOutput,
    FrontierSimulation, SimulationRecord,
};
