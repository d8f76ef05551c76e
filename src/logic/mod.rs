//! Judgement logic: per-object state, the play session and score processing.

pub mod object_state;
pub mod playback;
pub mod score;
pub mod session;

pub use object_state::{ObjectPhase, ObjectStates};
pub use score::{FinalScore, ScoreBoard, ScoreProcessor, ScoreRank, ScoreSnapshot};
pub use session::PlaySession;
