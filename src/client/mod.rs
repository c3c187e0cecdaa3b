//! Outbound calls to the auth and data backends.

mod auth;
mod http;
mod resources;

pub use auth::{
    AuthEndpoints, AuthError, AuthResponse, AuthService, LoginRequest, RegisterRequest,
};
pub use http::{ApiClient, ApiError, ApiResponse, RequestOptions};
pub use resources::{BudgetService, Budgets, ExpenseService, Expenses, Resource, ResourceClient};
