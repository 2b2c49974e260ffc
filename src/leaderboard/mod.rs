pub use handlers::get_leaderboard;
pub use models::{LeaderboardEntry, UserTotals};
pub use repository::{
    InMemoryUserTotalsRepository, PostgresUserTotalsRepository, UserTotalsRepository,
};

mod handlers;
pub mod models;
pub mod repository;
