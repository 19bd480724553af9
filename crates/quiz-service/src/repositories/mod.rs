//! Database repositories for Quiz Service.

pub mod quizzes;
pub mod submissions;

pub use quizzes::QuizzesRepository;
pub use submissions::SubmissionsRepository;
