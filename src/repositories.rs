pub mod expense_repository;
pub mod json_file_repository;
pub mod postgres_expense_repository;
pub mod seed_source;
