pub mod repository;

pub use repository::KitRepository;
