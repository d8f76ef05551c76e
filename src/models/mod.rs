pub mod beatmap;
pub mod engine;
pub mod hit_object;
pub mod hit_result;
pub mod judgement;
pub mod replay;
pub mod settings;
pub mod stats;
