//! Persistence adapters for the domain's repository ports.

mod memory_daily_log_repository;
mod memory_user_repository;

pub use self::memory_daily_log_repository::MemoryDailyLogRepository;
pub use self::memory_user_repository::MemoryUserRepository;
