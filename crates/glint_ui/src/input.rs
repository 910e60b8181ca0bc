//! Input handling for UI.
//!
//! Widgets read input through [`InputBackend`] only. [`InputState`] is the
//! frame-based reference implementation a platform layer feeds with events.

use glint_core::Point;
use std::cell::{Cell, RefCell};

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button (scroll wheel click).
    Middle,
}

/// Keyboard key or mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A mouse button.
    Mouse(MouseButton),
    /// Escape key.
    Escape,
    /// Enter/Return key.
    Enter,
    /// Tab key.
    Tab,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Space bar.
    Space,
    /// Letter A.
    A,
    /// Letter B.
    B,
    /// Letter C.
    C,
    /// Letter D.
    D,
    /// Letter E.
    E,
    /// Letter F.
    F,
    /// Letter G.
    G,
    /// Letter H.
    H,
    /// Letter I.
    I,
    /// Letter J.
    J,
    /// Letter K.
    K,
    /// Letter L.
    L,
    /// Letter M.
    M,
    /// Letter N.
    N,
    /// Letter O.
    O,
    /// Letter P.
    P,
    /// Letter Q.
    Q,
    /// Letter R.
    R,
    /// Letter S.
    S,
    /// Letter T.
    T,
    /// Letter U.
    U,
    /// Letter V.
    V,
    /// Letter W.
    W,
    /// Letter X.
    X,
    /// Letter Y.
    Y,
    /// Letter Z.
    Z,
    /// Digit 0 on the main row.
    Num0,
    /// Digit 1 on the main row.
    Num1,
    /// Digit 2 on the main row.
    Num2,
    /// Digit 3 on the main row.
    Num3,
    /// Digit 4 on the main row.
    Num4,
    /// Digit 5 on the main row.
    Num5,
    /// Digit 6 on the main row.
    Num6,
    /// Digit 7 on the main row.
    Num7,
    /// Digit 8 on the main row.
    Num8,
    /// Digit 9 on the main row.
    Num9,
}

impl Key {
    /// Primary (left) mouse button.
    pub const PRIMARY: Self = Self::Mouse(MouseButton::Left);
}

/// Modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// Either shift key.
    Shift,
    /// Either control key.
    Ctrl,
    /// Either alt/option key.
    Alt,
    /// Super/Command key.
    Super,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Control key is held.
    pub ctrl: bool,
    /// Alt key is held.
    pub alt: bool,
    /// Super/Command key is held.
    pub super_key: bool,
}

impl Modifiers {
    /// Returns true if `modifier` is held.
    #[must_use]
    pub const fn get(self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Shift => self.shift,
            Modifier::Ctrl => self.ctrl,
            Modifier::Alt => self.alt,
            Modifier::Super => self.super_key,
        }
    }
}

/// Mouse cursor shape requested by widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorShape {
    /// Default pointer.
    #[default]
    Arrow,
    /// Pointing hand, over clickable widgets.
    Hand,
    /// I-beam, over editable text.
    Text,
    /// Left-right resize arrows.
    ResizeHorizontal,
    /// Up-down resize arrows.
    ResizeVertical,
    /// Four-way move arrows.
    Move,
}

/// Input capabilities the core requires from the platform.
///
/// Queries take `&self` because the canvas hands widgets a shared reference;
/// implementations use interior mutability for the two setters.
pub trait InputBackend {
    /// Cursor position in canvas pixels.
    fn cursor_pos(&self) -> Point;

    /// Returns true while `key` is held.
    fn key(&self, key: Key) -> bool;

    /// Returns true on the frame `key` went down, and on repeat ticks while it
    /// stays down if `allow_repeat` is set.
    fn key_pulse(&self, key: Key, allow_repeat: bool) -> bool;

    /// Returns true while `modifier` is held.
    fn modifier(&self, modifier: Modifier) -> bool;

    /// Text typed this frame.
    fn input_characters(&self) -> &str;

    /// Current clipboard text.
    fn clipboard(&self) -> Option<String>;

    /// Replaces the clipboard text.
    fn set_clipboard(&self, text: &str);

    /// Requests a cursor shape for the next frame.
    fn set_cursor(&self, shape: CursorShape);
}

#[derive(Debug, Clone, Copy)]
struct HeldKey {
    key: Key,
    held: f32,
    next_repeat: f32,
}

/// Input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current mouse position.
    pub mouse: Point,
    /// Mouse position last frame.
    pub prev_mouse: Point,
    /// Mouse buttons pressed this frame.
    buttons_pressed: u8,
    /// Mouse buttons released this frame.
    buttons_released: u8,
    /// Mouse buttons currently held.
    buttons_down: u8,
    /// Mouse scroll delta.
    pub scroll_delta: Point,
    /// Modifier keys state.
    pub modifiers: Modifiers,
    /// Keys pressed this frame.
    keys_pressed: Vec<Key>,
    /// Keys released this frame.
    keys_released: Vec<Key>,
    /// Keys currently held, with their hold time.
    keys_down: Vec<HeldKey>,
    /// Keys whose repeat fired this frame.
    keys_repeated: Vec<Key>,
    /// Text input this frame.
    pub text_input: String,
    /// Seconds since creation.
    time: f32,
    /// Time of last click (for double-click detection).
    last_click_time: Option<f32>,
    /// Position of last click.
    last_click_pos: Point,
    /// Double-click detected this frame.
    double_clicked: bool,
    clipboard: RefCell<Option<String>>,
    cursor: Cell<CursorShape>,
}

impl InputState {
    /// Double-click time threshold (seconds).
    const DOUBLE_CLICK_TIME: f32 = 0.3;
    /// Double-click position threshold (pixels).
    const DOUBLE_CLICK_DISTANCE: f32 = 5.0;
    /// Hold time before a key starts repeating (seconds).
    pub const REPEAT_DELAY: f32 = 0.4;
    /// Interval between repeats (seconds).
    pub const REPEAT_INTERVAL: f32 = 0.05;

    /// Creates a new empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a new frame `dt` seconds after the previous one, clearing
    /// per-frame state and advancing key repeat.
    pub fn begin_frame(&mut self, dt: f32) {
        self.time += dt;
        self.prev_mouse = self.mouse;
        self.buttons_pressed = 0;
        self.buttons_released = 0;
        self.scroll_delta = Point::ZERO;
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.keys_repeated.clear();
        self.text_input.clear();
        self.double_clicked = false;

        for held in &mut self.keys_down {
            held.held += dt;
            if held.held >= held.next_repeat {
                self.keys_repeated.push(held.key);
                while held.next_repeat <= held.held {
                    held.next_repeat += Self::REPEAT_INTERVAL;
                }
            }
        }
    }

    /// Updates mouse position.
    pub fn set_mouse_pos(&mut self, x: f32, y: f32) {
        self.mouse = Point::new(x, y);
    }

    /// Records a mouse button press.
    pub fn mouse_button_down(&mut self, button: MouseButton) {
        let mask = Self::button_mask(button);
        self.buttons_pressed |= mask;
        self.buttons_down |= mask;

        if button == MouseButton::Left {
            if let Some(last) = self.last_click_time {
                let delta = self.mouse - self.last_click_pos;
                let distance = delta.x.hypot(delta.y);
                if self.time - last < Self::DOUBLE_CLICK_TIME
                    && distance < Self::DOUBLE_CLICK_DISTANCE
                {
                    self.double_clicked = true;
                }
            }
            self.last_click_time = Some(self.time);
            self.last_click_pos = self.mouse;
        }
    }

    /// Records a mouse button release.
    pub fn mouse_button_up(&mut self, button: MouseButton) {
        let mask = Self::button_mask(button);
        self.buttons_released |= mask;
        self.buttons_down &= !mask;
    }

    /// Records scroll input.
    pub fn scroll(&mut self, dx: f32, dy: f32) {
        self.scroll_delta = self.scroll_delta + Point::new(dx, dy);
    }

    /// Records a key press. Mouse keys are routed to the button state.
    pub fn key_down(&mut self, key: Key) {
        if let Key::Mouse(button) = key {
            self.mouse_button_down(button);
        } else if !self.key_held(key) {
            self.keys_pressed.push(key);
            self.keys_down.push(HeldKey {
                key,
                held: 0.0,
                next_repeat: Self::REPEAT_DELAY,
            });
        }
    }

    /// Records a key release.
    pub fn key_up(&mut self, key: Key) {
        if let Key::Mouse(button) = key {
            self.mouse_button_up(button);
        } else {
            self.keys_released.push(key);
            self.keys_down.retain(|held| held.key != key);
        }
    }

    /// Records text input.
    pub fn text(&mut self, text: &str) {
        self.text_input.push_str(text);
    }

    /// Returns true if the mouse button was clicked this frame.
    #[must_use]
    pub fn mouse_clicked(&self, button: MouseButton) -> bool {
        (self.buttons_pressed & Self::button_mask(button)) != 0
    }

    /// Returns true if the mouse button was released this frame.
    #[must_use]
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        (self.buttons_released & Self::button_mask(button)) != 0
    }

    /// Returns true if the mouse button is currently held.
    #[must_use]
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        (self.buttons_down & Self::button_mask(button)) != 0
    }

    /// Returns true if a double-click occurred this frame.
    #[must_use]
    pub fn double_clicked(&self) -> bool {
        self.double_clicked
    }

    /// Returns true if the key was pressed this frame.
    #[must_use]
    pub fn key_pressed(&self, key: Key) -> bool {
        match key {
            Key::Mouse(button) => self.mouse_clicked(button),
            _ => self.keys_pressed.contains(&key),
        }
    }

    /// Returns true if the key was released this frame.
    #[must_use]
    pub fn key_released(&self, key: Key) -> bool {
        match key {
            Key::Mouse(button) => self.mouse_released(button),
            _ => self.keys_released.contains(&key),
        }
    }

    /// Returns true if the key is currently held.
    #[must_use]
    pub fn key_held(&self, key: Key) -> bool {
        match key {
            Key::Mouse(button) => self.mouse_down(button),
            _ => self.keys_down.iter().any(|held| held.key == key),
        }
    }

    /// Returns the mouse movement delta.
    #[must_use]
    pub fn mouse_delta(&self) -> Point {
        self.mouse - self.prev_mouse
    }

    /// Cursor shape most recently requested by a widget.
    #[must_use]
    pub fn requested_cursor(&self) -> CursorShape {
        self.cursor.get()
    }

    /// Returns the bit mask for a button.
    const fn button_mask(button: MouseButton) -> u8 {
        match button {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 4,
        }
    }
}

impl InputBackend for InputState {
    fn cursor_pos(&self) -> Point {
        self.mouse
    }

    fn key(&self, key: Key) -> bool {
        self.key_held(key)
    }

    fn key_pulse(&self, key: Key, allow_repeat: bool) -> bool {
        self.key_pressed(key) || (allow_repeat && self.keys_repeated.contains(&key))
    }

    fn modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.get(modifier)
    }

    fn input_characters(&self) -> &str {
        &self.text_input
    }

    fn clipboard(&self) -> Option<String> {
        self.clipboard.borrow().clone()
    }

    fn set_clipboard(&self, text: &str) {
        *self.clipboard.borrow_mut() = Some(text.to_owned());
    }

    fn set_cursor(&self, shape: CursorShape) {
        self.cursor.set(shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_click() {
        let mut input = InputState::new();

        input.mouse_button_down(MouseButton::Left);
        assert!(input.mouse_clicked(MouseButton::Left));
        assert!(input.key(Key::PRIMARY));

        input.begin_frame(0.016);
        assert!(!input.mouse_clicked(MouseButton::Left));
        assert!(input.mouse_down(MouseButton::Left));

        input.mouse_button_up(MouseButton::Left);
        assert!(input.mouse_released(MouseButton::Left));
        assert!(!input.key(Key::PRIMARY));
    }

    #[test]
    fn test_double_click() {
        let mut input = InputState::new();

        input.mouse_button_down(MouseButton::Left);
        assert!(!input.double_clicked());
        input.begin_frame(0.1);
        input.mouse_button_down(MouseButton::Left);

        assert!(input.double_clicked());
    }

    #[test]
    fn test_slow_clicks_are_not_double() {
        let mut input = InputState::new();

        input.mouse_button_down(MouseButton::Left);
        input.begin_frame(0.5);
        input.mouse_button_down(MouseButton::Left);

        assert!(!input.double_clicked());
    }

    #[test]
    fn test_key_pulse_repeat() {
        let mut input = InputState::new();
        input.key_down(Key::Backspace);
        assert!(input.key_pulse(Key::Backspace, false));

        input.begin_frame(0.1);
        assert!(!input.key_pulse(Key::Backspace, true));
        assert!(input.key(Key::Backspace));

        input.begin_frame(0.5);
        assert!(input.key_pulse(Key::Backspace, true));
        assert!(!input.key_pulse(Key::Backspace, false));

        input.begin_frame(0.01);
        assert!(!input.key_pulse(Key::Backspace, true));

        input.key_up(Key::Backspace);
        assert!(input.key_released(Key::Backspace));
        input.begin_frame(1.0);
        assert!(!input.key_pulse(Key::Backspace, true));
    }

    #[test]
    fn test_clipboard_and_cursor() {
        let input = InputState::new();
        assert_eq!(input.clipboard(), None);
        input.set_clipboard("copied");
        assert_eq!(input.clipboard().as_deref(), Some("copied"));

        input.set_cursor(CursorShape::Hand);
        assert_eq!(input.requested_cursor(), CursorShape::Hand);
    }

    #[test]
    fn test_modifiers() {
        let mut input = InputState::new();
        input.modifiers.ctrl = true;
        assert!(input.modifier(Modifier::Ctrl));
        assert!(!input.modifier(Modifier::Shift));
    }
}
