pub mod company;
pub mod employee;

pub use company::Entity as Company;
pub use employee::Entity as Employee;
