pub mod session;
pub use session::SessionKeys;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, AuthSession, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{NewUser, UserError, UserService, UserSummary};
pub use user_service_impl::SeaOrmUserService;

pub mod book_service;
pub mod book_service_impl;
pub use book_service::{BookError, BookService};
pub use book_service_impl::SeaOrmBookService;
