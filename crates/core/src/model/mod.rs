mod ids;
mod patch;
mod question;
mod topic;

pub use ids::TopicPosition;
pub use patch::{QuestionPatch, TopicPatch};
pub use question::Question;
pub use topic::{Topic, TopicError, TopicProgress};
