pub use super::accounts::Entity as Accounts;
pub use super::books::Entity as Books;
