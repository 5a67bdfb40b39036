pub mod expense_handlers;
