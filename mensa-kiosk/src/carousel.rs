use log::{debug, warn};
use mensa_model::{Banner, BannerID};
use std::collections::HashSet;
use std::time::Duration;

/// Default period between automatic slide advances
pub const AUTO_ADVANCE_PERIOD: Duration = Duration::from_millis(4000);
/// Default pointer travel (post-damping, px) required to commit a slide change
pub const RELEASE_THRESHOLD_PX: f32 = 60.0;
/// Default drag limit as a fraction of the slide width
pub const DRAG_LIMIT_FRACTION: f32 = 0.5;
/// Default resistance applied to raw pointer deltas while dragging
pub const DRAG_DAMPING: f32 = 0.5;
/// Default slide transition animation time
pub const TRANSITION_DURATION: Duration = Duration::from_millis(300);

/// Tunable carousel behavior.
///
/// These are presentation knobs, not invariants; construct with
/// [`CarouselTuning::default`] and override per deployment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarouselTuning {
    pub auto_advance_period: Duration,
    pub release_threshold_px: f32,
    pub drag_limit_fraction: f32,
    pub drag_damping: f32,
    pub transition_duration: Duration,
}

impl Default for CarouselTuning {
    fn default() -> Self {
        Self {
            auto_advance_period: AUTO_ADVANCE_PERIOD,
            release_threshold_px: RELEASE_THRESHOLD_PX,
            drag_limit_fraction: DRAG_LIMIT_FRACTION,
            drag_damping: DRAG_DAMPING,
            transition_duration: TRANSITION_DURATION,
        }
    }
}

/// Direction of a committed slide change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Next,
    Previous,
}

/// Exclusive carousel phase.
///
/// Exactly one phase is active at a time; `Transitioning` doubles as the
/// guard against overlapping slide changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarouselPhase {
    /// At rest on the current slide, auto-advance timer armed (when N>1)
    Idle,
    /// Pointer held down, offset follows the pointer
    Dragging { start_x: f32, offset: f32 },
    /// Slide change committed, animation running
    Transitioning {
        from: usize,
        direction: SlideDirection,
    },
}

/// Input events consumed by the carousel
#[derive(Debug, Clone, PartialEq)]
pub enum CarouselEvent {
    /// The auto-advance timer fired
    AutoAdvanceElapsed,
    /// Pointer went down at the given x position (px)
    PointerPressed { x: f32 },
    /// Pointer moved to the given x position while held
    PointerMoved { x: f32 },
    /// Pointer released
    PointerReleased,
    /// The slide-change animation completed
    TransitionFinished,
    /// A banner's image/video failed to load
    MediaFailed(BannerID),
    /// The viewport was resized; slide width in px
    Resized { slide_width: f32 },
}

/// Timer effects for the surrounding event loop to execute.
///
/// The carousel never reads the clock; scheduling is delegated to whoever
/// drives it (the signage runner, a UI shell, tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselEffect {
    ScheduleAutoAdvance(Duration),
    CancelAutoAdvance,
}

/// State for the banner carousel.
///
/// Cyclic index over the banner rotation with drag gestures and an
/// auto-advance timer. All state is instance state; construct one per view.
#[derive(Debug, Clone)]
pub struct CarouselState {
    banners: Vec<Banner>,
    current: usize,
    phase: CarouselPhase,
    slide_width: f32,
    tuning: CarouselTuning,
    failed_media: HashSet<BannerID>,
}

impl CarouselState {
    pub fn new(banners: Vec<Banner>, slide_width: f32) -> Self {
        Self::with_tuning(banners, slide_width, CarouselTuning::default())
    }

    pub fn with_tuning(
        banners: Vec<Banner>,
        slide_width: f32,
        tuning: CarouselTuning,
    ) -> Self {
        Self {
            banners,
            current: 0,
            phase: CarouselPhase::Idle,
            slide_width: slide_width.max(1.0),
            tuning,
            failed_media: HashSet::new(),
        }
    }

    /// Effect that arms the auto-advance timer for a freshly constructed
    /// carousel. `None` for empty or single-banner rotations, which render
    /// statically.
    pub fn start(&self) -> Option<CarouselEffect> {
        self.is_interactive().then_some(CarouselEffect::ScheduleAutoAdvance(
            self.tuning.auto_advance_period,
        ))
    }

    /// Feed one event through the state machine.
    ///
    /// Events that do not apply to the current phase (a stale timer firing
    /// mid-drag, a pointer press during a transition) are ignored rather than
    /// queued.
    pub fn update(&mut self, event: CarouselEvent) -> Option<CarouselEffect> {
        match event {
            CarouselEvent::Resized { slide_width } => {
                self.slide_width = slide_width.max(1.0);
                let limit = self.drag_limit();
                // Keep an in-flight drag inside the new bounds
                if let CarouselPhase::Dragging { offset, .. } = &mut self.phase {
                    *offset = (*offset).clamp(-limit, limit);
                }
                None
            }
            CarouselEvent::MediaFailed(id) => {
                warn!("banner {id} media failed to load, rendering placeholder");
                self.failed_media.insert(id);
                None
            }
            // Single-banner and empty rotations are static: no drag, no timer
            _ if !self.is_interactive() => None,
            CarouselEvent::AutoAdvanceElapsed => match self.phase {
                CarouselPhase::Idle => {
                    self.begin_transition(SlideDirection::Next);
                    None
                }
                CarouselPhase::Dragging { .. }
                | CarouselPhase::Transitioning { .. } => None,
            },
            CarouselEvent::PointerPressed { x } => match self.phase {
                CarouselPhase::Idle => {
                    self.phase = CarouselPhase::Dragging {
                        start_x: x,
                        offset: 0.0,
                    };
                    Some(CarouselEffect::CancelAutoAdvance)
                }
                CarouselPhase::Dragging { .. }
                | CarouselPhase::Transitioning { .. } => None,
            },
            CarouselEvent::PointerMoved { x } => {
                let limit = self.drag_limit();
                let damping = self.tuning.drag_damping;
                match &mut self.phase {
                    CarouselPhase::Dragging { start_x, offset } => {
                        *offset = ((x - *start_x) * damping).clamp(-limit, limit);
                        None
                    }
                    CarouselPhase::Idle | CarouselPhase::Transitioning { .. } => {
                        None
                    }
                }
            }
            CarouselEvent::PointerReleased => match self.phase {
                CarouselPhase::Dragging { offset, .. } => {
                    if offset.abs() > self.tuning.release_threshold_px {
                        // Dragging left pulls the next slide in, and vice versa
                        let direction = if offset < 0.0 {
                            SlideDirection::Next
                        } else {
                            SlideDirection::Previous
                        };
                        self.begin_transition(direction);
                        None
                    } else {
                        debug!(
                            "drag released below threshold ({offset:.1}px), snapping back"
                        );
                        self.phase = CarouselPhase::Idle;
                        Some(CarouselEffect::ScheduleAutoAdvance(
                            self.tuning.auto_advance_period,
                        ))
                    }
                }
                CarouselPhase::Idle | CarouselPhase::Transitioning { .. } => None,
            },
            CarouselEvent::TransitionFinished => match self.phase {
                CarouselPhase::Transitioning { .. } => {
                    self.phase = CarouselPhase::Idle;
                    Some(CarouselEffect::ScheduleAutoAdvance(
                        self.tuning.auto_advance_period,
                    ))
                }
                CarouselPhase::Idle | CarouselPhase::Dragging { .. } => None,
            },
        }
    }

    /// Advance the cyclic index by one. No-op for N<=1.
    pub fn advance(&mut self) {
        let count = self.banners.len();
        if count > 1 {
            self.current = (self.current + 1) % count;
        }
    }

    /// Retreat the cyclic index by one. No-op for N<=1.
    pub fn retreat(&mut self) {
        let count = self.banners.len();
        if count > 1 {
            self.current = (self.current + count - 1) % count;
        }
    }

    /// Replace the banner rotation.
    ///
    /// Abandons any in-flight drag or transition and clamps the index back
    /// into range, so the `[0, N)` invariant holds across refreshes. Returns
    /// the timer effect matching the new rotation size.
    pub fn set_banners(&mut self, banners: Vec<Banner>) -> Option<CarouselEffect> {
        self.banners = banners;
        if self.current >= self.banners.len() {
            self.current = 0;
        }
        self.phase = CarouselPhase::Idle;
        let banners = &self.banners;
        self.failed_media
            .retain(|id| banners.iter().any(|banner| banner.id == *id));
        if self.is_interactive() {
            Some(CarouselEffect::ScheduleAutoAdvance(
                self.tuning.auto_advance_period,
            ))
        } else {
            Some(CarouselEffect::CancelAutoAdvance)
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_banner(&self) -> Option<&Banner> {
        self.banners.get(self.current)
    }

    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    pub fn banner_count(&self) -> usize {
        self.banners.len()
    }

    /// Current drag offset in px; 0 outside of a drag.
    pub fn drag_offset(&self) -> f32 {
        match self.phase {
            CarouselPhase::Dragging { offset, .. } => offset,
            CarouselPhase::Idle | CarouselPhase::Transitioning { .. } => 0.0,
        }
    }

    pub fn phase(&self) -> CarouselPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, CarouselPhase::Dragging { .. })
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, CarouselPhase::Transitioning { .. })
    }

    /// Rotations with more than one banner accept gestures and auto-advance.
    pub fn is_interactive(&self) -> bool {
        self.banners.len() > 1
    }

    /// Whether the given banner's media previously failed to load and should
    /// render as the "content unavailable" placeholder.
    pub fn is_media_failed(&self, id: &BannerID) -> bool {
        self.failed_media.contains(id)
    }

    pub fn tuning(&self) -> &CarouselTuning {
        &self.tuning
    }

    fn drag_limit(&self) -> f32 {
        self.slide_width * self.tuning.drag_limit_fraction
    }

    fn begin_transition(&mut self, direction: SlideDirection) {
        let from = self.current;
        match direction {
            SlideDirection::Next => self.advance(),
            SlideDirection::Previous => self.retreat(),
        }
        debug!(
            "slide transition {from} -> {} ({direction:?})",
            self.current
        );
        self.phase = CarouselPhase::Transitioning { from, direction };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mensa_model::{BannerID, BannerKind};

    fn banners(count: usize) -> Vec<Banner> {
        (0..count)
            .map(|i| {
                Banner::new(
                    BannerID::new(),
                    BannerKind::Image,
                    format!("banner-{i}.png"),
                    "image/png",
                    i as u32,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_advance_wraps_modulo_n() {
        for n in 2..6 {
            let mut carousel = CarouselState::new(banners(n), 400.0);
            for step in 1..(2 * n + 1) {
                carousel.advance();
                assert_eq!(carousel.current_index(), step % n);
            }
        }
    }

    #[test]
    fn test_retreat_wraps_modulo_n() {
        for n in 2..6 {
            let mut carousel = CarouselState::new(banners(n), 400.0);
            carousel.retreat();
            assert_eq!(carousel.current_index(), n - 1);
            carousel.retreat();
            assert_eq!(carousel.current_index(), n - 2);
        }
    }

    #[test]
    fn test_single_banner_is_static() {
        let mut carousel = CarouselState::new(banners(1), 400.0);
        assert!(carousel.start().is_none());

        carousel.advance();
        carousel.retreat();
        assert_eq!(carousel.current_index(), 0);

        assert_eq!(carousel.update(CarouselEvent::AutoAdvanceElapsed), None);
        assert_eq!(
            carousel.update(CarouselEvent::PointerPressed { x: 10.0 }),
            None
        );
        assert_eq!(
            carousel.update(CarouselEvent::PointerMoved { x: 500.0 }),
            None
        );
        assert_eq!(carousel.update(CarouselEvent::PointerReleased), None);
        assert_eq!(carousel.current_index(), 0);
        assert_eq!(carousel.phase(), CarouselPhase::Idle);
    }

    #[test]
    fn test_timer_fire_locks_out_second_transition() {
        let mut carousel = CarouselState::new(banners(3), 400.0);
        carousel.update(CarouselEvent::AutoAdvanceElapsed);
        assert_eq!(carousel.current_index(), 1);
        assert!(carousel.is_transitioning());

        // Guard: a second fire mid-transition must not advance again
        carousel.update(CarouselEvent::AutoAdvanceElapsed);
        assert_eq!(carousel.current_index(), 1);

        carousel.update(CarouselEvent::TransitionFinished);
        assert_eq!(carousel.phase(), CarouselPhase::Idle);
    }

    #[test]
    fn test_drag_offset_clamped_to_half_slide_width() {
        for width in [200.0_f32, 400.0, 1080.0] {
            let mut carousel = CarouselState::new(banners(3), width);
            carousel.update(CarouselEvent::PointerPressed { x: 0.0 });
            carousel.update(CarouselEvent::PointerMoved { x: -10_000.0 });
            assert_eq!(carousel.drag_offset(), -width * 0.5);
            carousel.update(CarouselEvent::PointerMoved { x: 10_000.0 });
            assert_eq!(carousel.drag_offset(), width * 0.5);
        }
    }

    #[test]
    fn test_pointer_press_cancels_auto_advance() {
        let mut carousel = CarouselState::new(banners(2), 400.0);
        assert_eq!(
            carousel.update(CarouselEvent::PointerPressed { x: 100.0 }),
            Some(CarouselEffect::CancelAutoAdvance)
        );
        assert!(carousel.is_dragging());
    }

    #[test]
    fn test_press_during_transition_is_rejected() {
        let mut carousel = CarouselState::new(banners(3), 400.0);
        carousel.update(CarouselEvent::AutoAdvanceElapsed);
        assert!(carousel.is_transitioning());
        assert_eq!(
            carousel.update(CarouselEvent::PointerPressed { x: 100.0 }),
            None
        );
        assert!(carousel.is_transitioning());
    }

    #[test]
    fn test_media_failure_does_not_disturb_state() {
        let mut carousel = CarouselState::new(banners(3), 400.0);
        let failed = carousel.banners()[2].id;
        carousel.update(CarouselEvent::AutoAdvanceElapsed);
        carousel.update(CarouselEvent::MediaFailed(failed));
        assert!(carousel.is_media_failed(&failed));
        assert!(carousel.is_transitioning());
        assert_eq!(carousel.current_index(), 1);
    }
}
