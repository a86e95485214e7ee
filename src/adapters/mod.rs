pub mod memory_transaction_repository;

pub use memory_transaction_repository::InMemoryTransactionRepository;
