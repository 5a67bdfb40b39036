pub mod expense_service;
