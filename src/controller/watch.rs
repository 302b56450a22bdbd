#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// The activation event handed to the watched toggle. A secondary activation
/// must suppress the browser's context menu, recorded in `default_prevented`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub button: PointerButton,
    default_prevented: bool,
}

impl PointerEvent {
    pub fn primary() -> Self {
        Self {
            button: PointerButton::Primary,
            default_prevented: false,
        }
    }

    pub fn context_menu() -> Self {
        Self {
            button: PointerButton::Secondary,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchState {
    pub view_count: u32,
    pub watched: bool,
}

/// Next view count and watched flag for a click, or `None` when the click
/// changes nothing (a decrement at zero).
///
/// `watched` is kept equal to `view_count > 0` on every transition.
pub fn next_watch_state(current: WatchState, button: PointerButton) -> Option<WatchState> {
    match button {
        PointerButton::Primary => {
            let view_count = current.view_count.saturating_add(1);
            Some(WatchState {
                view_count,
                watched: true,
            })
        }
        PointerButton::Secondary if current.view_count == 0 => None,
        PointerButton::Secondary => {
            let view_count = current.view_count - 1;
            Some(WatchState {
                view_count,
                watched: view_count > 0,
            })
        }
    }
}
