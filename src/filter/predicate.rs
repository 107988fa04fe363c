use crate::cdc::Event;
use crate::config::types::PredicateConfig;
use std::collections::HashSet;

/// Decides whether an event is forwarded downstream.
pub trait InterestPredicate: Send + Sync {
    fn is_interesting(&self, event: &Event) -> bool;

    /// Short name used in logs
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> InterestPredicate for F
where
    F: Fn(&Event) -> bool + Send + Sync,
{
    fn is_interesting(&self, event: &Event) -> bool {
        self(event)
    }
}

/// Events associated with a VIP user.
#[derive(Debug, Default, Clone, Copy)]
pub struct VipPredicate;

impl InterestPredicate for VipPredicate {
    fn is_interesting(&self, event: &Event) -> bool {
        event.vip
    }

    fn name(&self) -> &str {
        "vip"
    }
}

/// Events whose activity label is one of a fixed set.
#[derive(Debug, Clone)]
pub struct ActivityPredicate {
    activities: HashSet<String>,
}

impl ActivityPredicate {
    pub fn new<I, S>(activities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            activities: activities.into_iter().map(Into::into).collect(),
        }
    }
}

impl InterestPredicate for ActivityPredicate {
    fn is_interesting(&self, event: &Event) -> bool {
        self.activities.contains(&event.activity)
    }

    fn name(&self) -> &str {
        "activity"
    }
}

/// Forwards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl InterestPredicate for AcceptAll {
    fn is_interesting(&self, _event: &Event) -> bool {
        true
    }

    fn name(&self) -> &str {
        "all"
    }
}

/// Build the predicate selected in config.
pub fn predicate_from_config(config: &PredicateConfig) -> Box<dyn InterestPredicate> {
    match config {
        PredicateConfig::Vip => Box::new(VipPredicate),
        PredicateConfig::Activity { activities } => {
            Box::new(ActivityPredicate::new(activities.iter().cloned()))
        }
        PredicateConfig::All => Box::new(AcceptAll),
    }
}
