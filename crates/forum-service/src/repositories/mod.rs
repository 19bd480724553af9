//! Database repositories for Forum Service.

pub mod comments;
pub mod posts;
pub mod votes;

pub use comments::CommentsRepository;
pub use posts::PostsRepository;
pub use votes::{VoteTarget, VotesRepository};
