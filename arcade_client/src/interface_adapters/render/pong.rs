use crate::domain::geometry::Rect;
use crate::domain::pong::Side;
use crate::domain::ports::{Canvas, Color, RenderError};
use crate::use_cases::PongSession;

pub fn draw(session: &PongSession, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
    let state = session.state();
    let tuning = session.tuning();
    canvas.clear(tuning.field_width, tuning.field_height)?;

    // Centre net.
    let mid = tuning.field_width / 2.0;
    let mut y = 0.0;
    while y < tuning.field_height {
        canvas.fill_rect(Rect::new(mid - 1.0, y, 2.0, 10.0), Color::Gray)?;
        y += 20.0;
    }

    for side in [Side::Left, Side::Right] {
        let x = match side {
            Side::Left => 0.0,
            Side::Right => tuning.field_width - tuning.paddle_width,
        };
        let color = if side == session.side() && !session.is_demo() {
            Color::Cyan
        } else {
            Color::White
        };
        canvas.fill_rect(
            Rect::new(x, state.paddle_y(side), tuning.paddle_width, tuning.paddle_height),
            color,
        )?;
    }

    canvas.fill_circle(state.ball_x, state.ball_y, tuning.ball_radius, Color::Yellow)?;

    let quarter = tuning.field_width / 4.0;
    canvas.text(quarter, 10.0, &state.player1_score.to_string(), Color::White)?;
    canvas.text(quarter * 3.0, 10.0, &state.player2_score.to_string(), Color::White)?;
    canvas.text(10.0, tuning.field_height - 30.0, &state.player1_name, Color::Gray)?;
    let right_name_x = tuning.field_width - 10.0 - state.player2_name.len() as f32 * 10.0;
    canvas.text(
        right_name_x.max(mid),
        tuning.field_height - 30.0,
        &state.player2_name,
        Color::Gray,
    )?;

    if let Some(winner) = session.winner_name() {
        let banner = format!("{winner} WINS!");
        canvas.text(
            mid - banner.len() as f32 * 5.0,
            tuning.field_height / 2.0 - 40.0,
            &banner,
            Color::Green,
        )?;
    } else if !state.game_active {
        canvas.text(
            mid - 100.0,
            tuning.field_height / 2.0 - 40.0,
            "Press Enter to start",
            Color::White,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tuning::pong::PongTuning;
    use crate::interface_adapters::render::TerminalCanvas;
    use std::time::Duration;

    #[test]
    fn when_pong_is_drawn_then_ball_and_paddles_land_on_the_grid() {
        let session = PongSession::new(
            "Ada".to_string(),
            PongTuning::default(),
            Duration::from_millis(1000),
        );
        // 80 columns over an 800 wide field, 25 rows over 500 tall.
        let mut canvas = TerminalCanvas::new(Vec::new(), 80, 26);

        draw(&session, &mut canvas).expect("draw");

        // Ball sits at the field centre.
        assert_eq!(canvas.glyph(40, 12), Some('●'));
        // Paddles hug both edges around the middle.
        assert_eq!(canvas.glyph(0, 12), Some('█'));
        assert_eq!(canvas.glyph(79, 12), Some('█'));
    }
}
