pub mod encoder;
pub mod predicate;

pub use encoder::{encode_events, OutputRecord};
pub use predicate::{
    predicate_from_config, AcceptAll, ActivityPredicate, InterestPredicate, VipPredicate,
};
