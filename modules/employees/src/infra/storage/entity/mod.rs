pub mod department;
pub mod note;
pub mod person;
