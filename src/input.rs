//! Pointer input tracking.
//!
//! Converts raw pointer and touch coordinates into drag vectors relative to
//! the position and frame captured at gesture start.

/// A point in client coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A mouse, pen or touch event as delivered by the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerEvent {
    /// Mouse client coordinates
    pub client: Point,
    /// Active touch points, first one wins
    pub touches: Vec<Point>,
    default_prevented: bool,
}

impl PointerEvent {
    /// Mouse event at the given client position.
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            client: Point::new(x, y),
            ..Default::default()
        }
    }

    /// Touch event with the given active touch points.
    pub fn touch(touches: Vec<Point>) -> Self {
        Self {
            touches,
            ..Default::default()
        }
    }

    /// Position of the event: first active touch, else mouse coordinates.
    #[inline]
    pub fn position(&self) -> Point {
        self.touches.first().copied().unwrap_or(self.client)
    }

    /// Ask the host to suppress its default action (scroll, selection).
    #[inline]
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a mapper asked to suppress the default action.
    #[inline]
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A wheel or trackpad scroll event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelEvent {
    /// Horizontal scroll delta
    pub delta_x: f64,
    /// Vertical scroll delta
    pub delta_y: f64,
    default_prevented: bool,
}

impl WheelEvent {
    /// Create a new wheel event.
    pub fn new(delta_x: f64, delta_y: f64) -> Self {
        Self {
            delta_x,
            delta_y,
            default_prevented: false,
        }
    }

    /// Ask the host to suppress page scrolling.
    #[inline]
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a mapper asked to suppress page scrolling.
    #[inline]
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Inner box of the host container in client coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerBox {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Inner width
    pub width: f64,
    /// Inner height
    pub height: f64,
}

impl ContainerBox {
    /// Create a new container box.
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Center of the box in client coordinates.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Pointer state of the gesture in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    /// Position at gesture start, `None` when no gesture is tracked
    pub start_x: Option<f64>,
    /// Position at gesture start, `None` when no gesture is tracked
    pub start_y: Option<f64>,
    /// Latest sample
    pub current_x: Option<f64>,
    /// Latest sample
    pub current_y: Option<f64>,
    /// Previous sample
    pub old_x: Option<f64>,
    /// Previous sample
    pub old_y: Option<f64>,
    /// Displacement since gesture start
    pub d_x: f64,
    /// Displacement since gesture start
    pub d_y: f64,
    /// Displacement since the previous sample
    pub dd_x: f64,
    /// Displacement since the previous sample
    pub dd_y: f64,
    /// `d_x` over container width
    pub nd_x: f64,
    /// `d_y` over container height
    pub nd_y: f64,
    /// `dd_x` over container width
    pub ndd_x: f64,
    /// `dd_y` over container height
    pub ndd_y: f64,
    /// Frame in effect when the gesture started
    pub click_frame: usize,
    /// Lane in effect when the gesture started
    pub click_lane: usize,
}

impl InputState {
    /// Whether a gesture start has been captured.
    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.start_x.is_some() && self.start_y.is_some()
    }

    /// Record a new pointer sample.
    ///
    /// The first sample of a gesture seeds the start and previous positions
    /// and snapshots `frame`/`lane`, so all deltas are relative to the state
    /// at gesture start.
    pub fn update(&mut self, event: &PointerEvent, frame: usize, lane: usize, container: &ContainerBox) {
        let pos = event.position();

        self.old_x = self.current_x;
        self.old_y = self.current_y;
        self.current_x = Some(pos.x);
        self.current_y = Some(pos.y);

        let old_x = *self.old_x.get_or_insert(pos.x);
        let old_y = *self.old_y.get_or_insert(pos.y);
        if !self.is_tracking() {
            self.start_x = Some(pos.x);
            self.start_y = Some(pos.y);
            self.click_frame = frame;
            self.click_lane = lane;
        }
        let start_x = self.start_x.unwrap_or(pos.x);
        let start_y = self.start_y.unwrap_or(pos.y);

        self.d_x = pos.x - start_x;
        self.d_y = pos.y - start_y;
        self.dd_x = pos.x - old_x;
        self.dd_y = pos.y - old_y;
        self.nd_x = normalize(self.d_x, container.width);
        self.nd_y = normalize(self.d_y, container.height);
        self.ndd_x = normalize(self.dd_x, container.width);
        self.ndd_y = normalize(self.dd_y, container.height);
    }

    /// Forget the current gesture so the next sample starts a new one.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Record a pointer sample into `input`. See [`InputState::update`].
pub fn update_input(event: &PointerEvent, input: &mut InputState, frame: usize, lane: usize, container: &ContainerBox) {
    input.update(event, frame, lane, container);
}

/// Clear `input` at the end of a gesture. See [`InputState::reset`].
pub fn reset_input(input: &mut InputState) {
    input.reset();
}

/// Divide by a container extent; a collapsed container yields no movement.
#[inline]
fn normalize(delta: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        delta / extent
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: ContainerBox = ContainerBox::new(0.0, 0.0, 200.0, 100.0);

    #[test]
    fn test_first_sample_seeds_gesture() {
        let mut input = InputState::default();
        input.update(&PointerEvent::mouse(50.0, 20.0), 5, 2, &CONTAINER);

        assert!(input.is_tracking());
        assert_eq!(input.start_x, Some(50.0));
        assert_eq!(input.old_x, Some(50.0));
        assert_eq!((input.d_x, input.dd_x, input.ndd_y), (0.0, 0.0, 0.0));
        assert_eq!((input.click_frame, input.click_lane), (5, 2));
    }

    #[test]
    fn test_deltas_and_normalization() {
        let mut input = InputState::default();
        input.update(&PointerEvent::mouse(50.0, 20.0), 0, 0, &CONTAINER);
        input.update(&PointerEvent::mouse(70.0, 30.0), 1, 0, &CONTAINER);
        input.update(&PointerEvent::mouse(100.0, 70.0), 2, 0, &CONTAINER);

        assert_eq!((input.d_x, input.d_y), (50.0, 50.0));
        assert_eq!((input.dd_x, input.dd_y), (30.0, 40.0));
        assert_eq!((input.nd_x, input.nd_y), (0.25, 0.5));
        assert_eq!((input.ndd_x, input.ndd_y), (0.15, 0.4));
        // Gesture start snapshot stays fixed
        assert_eq!(input.click_frame, 0);
    }

    #[test]
    fn test_touch_preferred_over_mouse() {
        let mut event = PointerEvent::touch(vec![Point::new(10.0, 11.0), Point::new(90.0, 91.0)]);
        event.client = Point::new(500.0, 500.0);
        assert_eq!(event.position(), Point::new(10.0, 11.0));
    }

    #[test]
    fn test_reset_starts_new_gesture() {
        let mut input = InputState::default();
        input.update(&PointerEvent::mouse(0.0, 0.0), 3, 0, &CONTAINER);
        input.update(&PointerEvent::mouse(40.0, 0.0), 3, 0, &CONTAINER);
        input.reset();

        assert!(!input.is_tracking());
        assert_eq!(input.current_x, None);
        assert_eq!(input.nd_x, 0.0);

        input.update(&PointerEvent::mouse(40.0, 0.0), 7, 1, &CONTAINER);
        assert_eq!(input.d_x, 0.0);
        assert_eq!((input.click_frame, input.click_lane), (7, 1));
    }

    #[test]
    fn test_collapsed_container() {
        let mut input = InputState::default();
        let empty = ContainerBox::default();
        input.update(&PointerEvent::mouse(0.0, 0.0), 0, 0, &empty);
        input.update(&PointerEvent::mouse(10.0, 10.0), 0, 0, &empty);
        assert_eq!(input.d_x, 10.0);
        assert_eq!((input.nd_x, input.ndd_y), (0.0, 0.0));
    }

    #[test]
    fn test_prevent_default() {
        let mut event = PointerEvent::mouse(0.0, 0.0);
        assert!(!event.is_default_prevented());
        event.prevent_default();
        assert!(event.is_default_prevented());
    }
}
