use crate::classifier::GestureVerdict;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Interaction phase of the paged scroll view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationPhase {
    /// No interaction in flight
    Idle,
    /// The user's finger is dragging the view
    UserDragging,
    /// A programmatic or flung scroll animation has not arrived yet
    Settling,
}

impl NavigationPhase {
    /// True while the view is moving for any reason
    pub fn is_interacting(&self) -> bool {
        !matches!(self, NavigationPhase::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub current_page: usize,
    pub phase: NavigationPhase,
}

/// What the scroll view should do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationIntent {
    ScrollToPage(usize),
}

/// Outcome of feeding one input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: NavigationState,
    pub to: NavigationState,
    pub intent: Option<NavigationIntent>,
}

impl Transition {
    fn unchanged(state: NavigationState) -> Self {
        Self {
            from: state,
            to: state,
            intent: None,
        }
    }

    pub fn page_changed(&self) -> bool {
        self.from.current_page != self.to.current_page
    }

    pub fn phase_changed(&self) -> bool {
        self.from.phase != self.to.phase
    }

    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.intent.is_none()
    }
}

/// Saturating page navigation driven by gesture verdicts and scroll events.
///
/// `current_page` never leaves `[0, page_count - 1]`; out-of-range requests
/// are clamped rather than rejected.
#[derive(Debug, Clone)]
pub struct PageNavigator {
    page_count: usize,
    fling_velocity_threshold: f64,
    state: NavigationState,
}

impl PageNavigator {
    pub fn new(page_count: usize, initial_page: usize) -> Self {
        let page_count = page_count.max(1);
        Self {
            page_count,
            fling_velocity_threshold: 0.0,
            state: NavigationState {
                current_page: initial_page.min(page_count - 1),
                phase: NavigationPhase::Idle,
            },
        }
    }

    pub fn with_fling_threshold(mut self, threshold: f64) -> Self {
        self.fling_velocity_threshold = threshold.abs();
        self
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    pub fn phase(&self) -> NavigationPhase {
        self.state.phase
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    fn last_page(&self) -> usize {
        self.page_count - 1
    }

    /// Apply a classifier verdict. Rejected while the user is dragging.
    pub fn apply_verdict(&mut self, verdict: GestureVerdict) -> Transition {
        let target = match verdict {
            GestureVerdict::None => return Transition::unchanged(self.state),
            GestureVerdict::Left => self.state.current_page.saturating_sub(1),
            GestureVerdict::Right => (self.state.current_page + 1).min(self.last_page()),
        };

        if self.state.phase == NavigationPhase::UserDragging {
            debug!("Ignoring {:?} gesture while the user is dragging", verdict);
            return Transition::unchanged(self.state);
        }

        self.move_to(target)
    }

    /// Programmatic navigation, e.g. from a page indicator
    pub fn request_page(&mut self, page: usize) -> Transition {
        if self.state.phase == NavigationPhase::UserDragging {
            debug!("Ignoring page request {} while the user is dragging", page);
            return Transition::unchanged(self.state);
        }

        let target = page.min(self.last_page());
        self.move_to(target)
    }

    fn move_to(&mut self, target: usize) -> Transition {
        let from = self.state;
        if target == from.current_page {
            // Clamped at an edge: keep whatever phase we are in
            return Transition::unchanged(from);
        }

        self.state = NavigationState {
            current_page: target,
            phase: NavigationPhase::Settling,
        };

        Transition {
            from,
            to: self.state,
            intent: Some(NavigationIntent::ScrollToPage(target)),
        }
    }

    /// The user put a finger on the view. Grabbing an animating view is allowed.
    pub fn begin_drag(&mut self) -> Transition {
        let from = self.state;
        self.state.phase = NavigationPhase::UserDragging;
        Transition {
            from,
            to: self.state,
            intent: None,
        }
    }

    /// The user lifted the finger. `offset` is the observed scroll position in pages.
    pub fn end_drag(&mut self, velocity: f64, offset: f64) -> Transition {
        let from = self.state;
        if from.phase != NavigationPhase::UserDragging {
            debug!("Drag end without a drag in progress ({:?})", from.phase);
            return Transition::unchanged(from);
        }

        if velocity.is_finite() && velocity.abs() > self.fling_velocity_threshold {
            self.state.phase = NavigationPhase::Settling;
        } else {
            self.enter_idle(offset);
        }

        Transition {
            from,
            to: self.state,
            intent: None,
        }
    }

    /// The scroll animation or deceleration came to rest at `offset`.
    pub fn finish_settling(&mut self, offset: f64) -> Transition {
        let from = self.state;
        if from.phase != NavigationPhase::Settling {
            return Transition::unchanged(from);
        }

        self.enter_idle(offset);
        Transition {
            from,
            to: self.state,
            intent: None,
        }
    }

    /// The observed scroll position wins over the last commanded target.
    fn enter_idle(&mut self, offset: f64) {
        self.state.phase = NavigationPhase::Idle;
        if let Some(page) = self.page_at_offset(offset) {
            if page != self.state.current_page {
                debug!(
                    "Reconciled page {} -> {} from scroll offset {:.3}",
                    self.state.current_page, page, offset
                );
            }
            self.state.current_page = page;
        }
    }

    fn page_at_offset(&self, offset: f64) -> Option<usize> {
        if !offset.is_finite() {
            return None;
        }
        let page = offset.round().max(0.0) as usize;
        Some(page.min(self.last_page()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GestureVerdict::{Left, None as NoGesture, Right};

    #[test]
    fn test_two_right_gestures_then_settle() {
        let mut nav = PageNavigator::new(3, 0);

        let first = nav.apply_verdict(Right);
        assert_eq!(first.intent, Some(NavigationIntent::ScrollToPage(1)));
        assert_eq!(nav.phase(), NavigationPhase::Settling);

        let second = nav.apply_verdict(Right);
        assert_eq!(second.intent, Some(NavigationIntent::ScrollToPage(2)));
        assert_eq!(nav.current_page(), 2);
        assert_eq!(nav.phase(), NavigationPhase::Settling);

        nav.finish_settling(2.0);
        assert_eq!(
            nav.state(),
            NavigationState {
                current_page: 2,
                phase: NavigationPhase::Idle,
            }
        );
    }

    #[test]
    fn test_gestures_rejected_while_dragging() {
        let mut nav = PageNavigator::new(3, 1);
        nav.begin_drag();

        for verdict in [Left, Right, Left, Left, Right, NoGesture] {
            let transition = nav.apply_verdict(verdict);
            assert!(transition.is_noop());
        }
        assert_eq!(nav.current_page(), 1);
        assert_eq!(nav.phase(), NavigationPhase::UserDragging);
    }

    #[test]
    fn test_clamped_at_first_page() {
        let mut nav = PageNavigator::new(3, 0);
        let transition = nav.apply_verdict(Left);

        assert!(transition.is_noop());
        assert_eq!(nav.current_page(), 0);
        assert_eq!(nav.phase(), NavigationPhase::Idle);
    }

    #[test]
    fn test_clamped_at_last_page_keeps_settling() {
        let mut nav = PageNavigator::new(2, 0);
        nav.apply_verdict(Right);
        assert_eq!(nav.phase(), NavigationPhase::Settling);

        let transition = nav.apply_verdict(Right);
        assert!(transition.is_noop());
        assert_eq!(nav.current_page(), 1);
        assert_eq!(nav.phase(), NavigationPhase::Settling);
    }

    #[test]
    fn test_none_never_transitions() {
        let mut nav = PageNavigator::new(3, 1);
        assert!(nav.apply_verdict(NoGesture).is_noop());
        nav.apply_verdict(Left);
        assert!(nav.apply_verdict(NoGesture).is_noop());
        assert_eq!(nav.phase(), NavigationPhase::Settling);
    }

    #[test]
    fn test_drag_release_without_velocity_reconciles_offset() {
        let mut nav = PageNavigator::new(4, 0);
        nav.begin_drag();
        let transition = nav.end_drag(0.0, 2.4);

        assert!(transition.page_changed());
        assert_eq!(
            nav.state(),
            NavigationState {
                current_page: 2,
                phase: NavigationPhase::Idle,
            }
        );
    }

    #[test]
    fn test_fling_settles_then_reconciles() {
        let mut nav = PageNavigator::new(4, 1).with_fling_threshold(0.5);
        nav.begin_drag();

        // Below the threshold counts as a plain release
        nav.end_drag(0.2, 1.0);
        assert_eq!(nav.phase(), NavigationPhase::Idle);

        nav.begin_drag();
        nav.end_drag(-3.0, 0.7);
        assert_eq!(nav.phase(), NavigationPhase::Settling);
        assert_eq!(nav.current_page(), 1);

        nav.finish_settling(0.0);
        assert_eq!(nav.current_page(), 0);
        assert_eq!(nav.phase(), NavigationPhase::Idle);
    }

    #[test]
    fn test_interrupted_animation_uses_observed_offset() {
        let mut nav = PageNavigator::new(5, 0);
        nav.apply_verdict(Right);
        nav.apply_verdict(Right);
        assert_eq!(nav.current_page(), 2);

        // User grabs the view mid-animation and lets go near page 1
        nav.begin_drag();
        nav.end_drag(0.0, 1.2);
        assert_eq!(nav.current_page(), 1);
    }

    #[test]
    fn test_offsets_are_clamped() {
        let mut nav = PageNavigator::new(3, 1);
        nav.begin_drag();
        nav.end_drag(0.0, 17.0);
        assert_eq!(nav.current_page(), 2);

        nav.begin_drag();
        nav.end_drag(0.0, -4.0);
        assert_eq!(nav.current_page(), 0);

        nav.begin_drag();
        nav.end_drag(0.0, f64::NAN);
        assert_eq!(nav.current_page(), 0);
        assert_eq!(nav.phase(), NavigationPhase::Idle);
    }

    #[test]
    fn test_request_page_clamps() {
        let mut nav = PageNavigator::new(3, 0);
        let transition = nav.request_page(42);

        assert_eq!(transition.intent, Some(NavigationIntent::ScrollToPage(2)));
        assert_eq!(nav.current_page(), 2);
        assert!(nav.request_page(2).is_noop());
    }

    #[test]
    fn test_settle_event_outside_settling_is_ignored() {
        let mut nav = PageNavigator::new(3, 1);
        assert!(nav.finish_settling(0.0).is_noop());
        assert!(nav.end_drag(1.0, 0.0).is_noop());
        assert_eq!(nav.current_page(), 1);
    }

    #[test]
    fn test_page_always_in_bounds() {
        let mut nav = PageNavigator::new(3, 0);
        let script = [Right, Right, Right, Right, Left, Right, Left, Left, Left, Left];
        for verdict in script {
            nav.apply_verdict(verdict);
            assert!(nav.current_page() < 3);
        }
        assert_eq!(nav.current_page(), 0);
    }
}
