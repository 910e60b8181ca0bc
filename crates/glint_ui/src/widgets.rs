//! Basic widgets built on the canvas protocol.
//!
//! Each widget takes a local uid, opens at most a handful of regions and
//! returns. None of them hold references past the call.

use crate::fade::Fade;
use crate::canvas::{Canvas, CanvasExt};
use crate::command::TextureId;
use crate::error::UiResult;
use crate::fonts::measure_text;
use crate::input::{CursorShape, Key};
use crate::primitive::{ButtonState, Primitive};
use glint_core::{Bounds, Color, Point, Size, Uid};
use std::borrow::Cow;

/// Interaction result of a button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonResponse {
    /// The primary button went down over the button this frame.
    pub clicked: bool,
    /// The cursor is over the button.
    pub hovered: bool,
}

/// Single line of text in the default font and color.
pub fn text(canvas: &mut dyn Canvas, uid: Uid, text: impl Into<Cow<'static, str>>) -> Uid {
    canvas.add_primitive(uid, Primitive::text(text))
}

/// Single line of text in `color`.
pub fn label_colored(
    canvas: &mut dyn Canvas,
    uid: Uid,
    text: impl Into<Cow<'static, str>>,
    color: Color,
) -> Uid {
    canvas.add_primitive(
        uid,
        Primitive::Text {
            text: text.into(),
            font: None,
            color: Some(color),
        },
    )
}

/// Image of `size` showing the whole of `texture`.
pub fn image(canvas: &mut dyn Canvas, uid: Uid, texture: TextureId, size: Size) -> Uid {
    canvas.add_primitive(uid, Primitive::image(Bounds::from_size(size), texture))
}

/// Filled rectangle of `size`.
pub fn rectangle(canvas: &mut dyn Canvas, uid: Uid, size: Size, color: Color) -> Uid {
    canvas.add_primitive(uid, Primitive::filled(Bounds::from_size(size), color))
}

/// Empty region of `size`, for manual spacing inside layouts.
///
/// # Errors
///
/// Fails if the region's bounds record cannot be stored.
pub fn spacer(canvas: &mut dyn Canvas, uid: Uid, size: Size) -> UiResult<Uid> {
    let handle = canvas.push_region(uid, Some(Bounds::from_size(size)));
    canvas.pop_region(None)?;
    Ok(handle.uid)
}

/// Framed text button.
///
/// Hit testing uses the button's screen bounds from the previous frame, so a
/// button never reports a click on the frame it first appears.
///
/// # Errors
///
/// Fails on a retained state collision at the button's uid.
pub fn button_label(
    canvas: &mut dyn Canvas,
    uid: Uid,
    label: impl Into<Cow<'static, str>>,
) -> UiResult<ButtonResponse> {
    let label = label.into();
    let style = canvas.style();
    let padding = style.padding;
    let content = measure_text(canvas.fonts(), style, style.default_font, &label);

    let handle = canvas.push_region(uid, Some(Bounds::from_size(content.pad(padding))));
    let hovered = canvas
        .screen_bounds(handle.uid)
        .is_some_and(|bounds| canvas.hovered(bounds));
    let clicked = hovered && canvas.input().key_pulse(Key::PRIMARY, false);
    let held = hovered && canvas.input().key(Key::PRIMARY);
    if hovered {
        canvas.input().set_cursor(CursorShape::Hand);
    }

    let dt = canvas.delta_time();
    let highlight = canvas
        .storage::<Fade>(handle.uid.mix_tag("highlight"))?
        .drive(if hovered { 1.0 } else { 0.0 }, dt);
    let state = if held {
        ButtonState::Pressed
    } else if hovered {
        ButtonState::Hovered
    } else {
        ButtonState::Normal
    };

    canvas.add_primitive(
        Uid::tag("frame"),
        Primitive::Button {
            content,
            state,
            highlight,
        },
    );
    canvas.push_region(
        Uid::tag("label"),
        Some(Bounds::from_pos_size(Point::new(padding.x, padding.y), content)),
    );
    canvas.add_primitive(Uid::tag("text"), Primitive::text(label));
    canvas.pop_region(None)?;
    canvas.pop_region(None)?;

    Ok(ButtonResponse { clicked, hovered })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RootCanvas;
    use crate::fonts::MonospaceFonts;
    use crate::input::{InputState, MouseButton};
    use crate::primitive::Op;
    use crate::style::Style;
    use glint_core::StateManager;

    #[test]
    fn test_button_region_is_content_plus_padding() {
        let mut ops = Vec::new();
        let mut state = StateManager::new();
        let style = Style::default();
        let input = InputState::new();
        let fonts = MonospaceFonts::new();
        let mut canvas = RootCanvas::new(
            &mut ops,
            &mut state,
            &style,
            &input,
            &fonts,
            Size::new(200.0, 100.0),
            0.016,
        );
        let response = button_label(&mut canvas, Uid::tag("exit"), "Exit").unwrap();
        assert_eq!(response, ButtonResponse::default());
        canvas.finish().unwrap();

        match &ops[0] {
            Op::PushRegion { bounds, .. } => assert_eq!(*bounds, Bounds::new(0.0, 0.0, 42.0, 26.0)),
            other => panic!("unexpected op {other:?}"),
        }
        match &ops[2] {
            Op::PushRegion { bounds, .. } => assert_eq!(*bounds, Bounds::new(5.0, 5.0, 37.0, 21.0)),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn test_button_click_uses_previous_screen_bounds() {
        let mut ops = Vec::new();
        let mut state = StateManager::new();
        let style = Style::default();
        let mut input = InputState::new();
        let fonts = MonospaceFonts::new();

        let uid = Uid::ROOT.mix(Uid::tag("ok"));
        *state
            .ensure::<crate::canvas::ScreenBounds>(uid.mix_tag(crate::canvas::SCREEN_BOUNDS))
            .unwrap() = crate::canvas::ScreenBounds(Bounds::new(0.0, 0.0, 42.0, 26.0));
        input.set_mouse_pos(10.0, 10.0);
        input.mouse_button_down(MouseButton::Left);

        let mut canvas = RootCanvas::new(
            &mut ops,
            &mut state,
            &style,
            &input,
            &fonts,
            Size::new(200.0, 100.0),
            0.016,
        );
        let response = button_label(&mut canvas, Uid::tag("ok"), "OK").unwrap();
        canvas.finish().unwrap();
        assert!(response.hovered);
        assert!(response.clicked);
        assert_eq!(input.requested_cursor(), CursorShape::Hand);
        assert!(matches!(
            ops[1],
            Op::Primitive(Primitive::Button {
                state: ButtonState::Pressed,
                ..
            })
        ));
    }

    #[test]
    fn test_spacer_and_rectangle() {
        let mut ops = Vec::new();
        let mut state = StateManager::new();
        let style = Style::default();
        let input = InputState::new();
        let fonts = MonospaceFonts::new();
        let mut canvas = RootCanvas::new(
            &mut ops,
            &mut state,
            &style,
            &input,
            &fonts,
            Size::new(200.0, 100.0),
            0.016,
        );
        let gap = spacer(&mut canvas, Uid::tag("gap"), Size::new(4.0, 4.0)).unwrap();
        assert_eq!(canvas.last_bounds(gap), Some(Bounds::new(0.0, 0.0, 4.0, 4.0)));
        rectangle(&mut canvas, Uid::tag("box"), Size::new(3.0, 3.0), Color::BLACK);
        assert_eq!(canvas.op_count(), 3);
    }
}
