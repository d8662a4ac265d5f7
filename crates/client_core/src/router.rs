use crate::probe::ConnectivityStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    Loading,
    Unauthenticated,
    Authenticated,
}

impl ScreenState {
    pub fn derive(startup_complete: bool, identity_present: bool) -> Self {
        if !startup_complete {
            ScreenState::Loading
        } else if identity_present {
            ScreenState::Authenticated
        } else {
            ScreenState::Unauthenticated
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScreenState::Loading => "loading",
            ScreenState::Unauthenticated => "unauthenticated",
            ScreenState::Authenticated => "authenticated",
        }
    }
}

/// Tracks the startup barrier. Holds no identity or record data; the screen
/// is derived on demand from what the session reports.
#[derive(Debug, Default)]
pub struct ViewRouter {
    started: bool,
    connectivity: Option<ConnectivityStatus>,
    session_resolved: bool,
}

impl ViewRouter {
    /// Marks startup as begun. Returns `false` if it already was.
    pub fn begin_startup(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    pub fn record_connectivity(&mut self, status: ConnectivityStatus) {
        if self.connectivity.is_none() {
            self.connectivity = Some(status);
        }
    }

    pub fn record_session_resolved(&mut self) {
        self.session_resolved = true;
    }

    pub fn connectivity(&self) -> Option<&ConnectivityStatus> {
        self.connectivity.as_ref()
    }

    pub fn is_startup_complete(&self) -> bool {
        self.connectivity.is_some() && self.session_resolved
    }

    pub fn screen(&self, identity_present: bool) -> ScreenState {
        ScreenState::derive(self.is_startup_complete(), identity_present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectivityError;

    #[test]
    fn stays_loading_until_both_startup_results_arrive() {
        let mut router = ViewRouter::default();
        assert_eq!(router.screen(true), ScreenState::Loading);

        router.record_connectivity(ConnectivityStatus::unreachable(
            ConnectivityError::Unreachable("refused".into()),
        ));
        assert_eq!(router.screen(false), ScreenState::Loading);

        router.record_session_resolved();
        assert_eq!(router.screen(false), ScreenState::Unauthenticated);
        assert_eq!(router.screen(true), ScreenState::Authenticated);
    }

    #[test]
    fn session_first_then_probe_also_waits() {
        let mut router = ViewRouter::default();
        router.record_session_resolved();
        assert_eq!(router.screen(true), ScreenState::Loading);
        router.record_connectivity(ConnectivityStatus::reachable());
        assert_eq!(router.screen(true), ScreenState::Authenticated);
    }

    #[test]
    fn first_probe_result_is_kept() {
        let mut router = ViewRouter::default();
        router.record_connectivity(ConnectivityStatus::reachable());
        router.record_connectivity(ConnectivityStatus::unreachable(ConnectivityError::Timeout(
            std::time::Duration::from_secs(1),
        )));
        assert!(router.connectivity().map(|s| s.reachable).unwrap_or(false));
    }

    #[test]
    fn begin_startup_only_once() {
        let mut router = ViewRouter::default();
        assert!(router.begin_startup());
        assert!(!router.begin_startup());
    }
}
