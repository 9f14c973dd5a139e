use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

/// Shell-side timer. The core's only use is debouncing: each restart
/// supersedes the pending one by generation, not by shell cancellation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelayOperation {
    pub millis: u64,
}

impl Operation for DelayOperation {
    type Output = ();
}

pub struct Delay<Ev> {
    context: CapabilityContext<DelayOperation, Ev>,
}

impl<Ev> std::fmt::Debug for Delay<Ev> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delay").finish_non_exhaustive()
    }
}

impl<Ev> Clone for Delay<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Delay<Ev> {
    type Operation = DelayOperation;
    type MappedSelf<MappedEv> = Delay<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Delay::new(self.context.map_event(f))
    }
}

impl<Ev> Delay<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<DelayOperation, Ev>) -> Self {
        Self { context }
    }

    /// Fires `event` after `millis` of shell time.
    pub fn start<F>(&self, millis: u64, event: F)
    where
        F: FnOnce() -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.request_from_shell(DelayOperation { millis }).await;
            context.update_app(event());
        });
    }
}
