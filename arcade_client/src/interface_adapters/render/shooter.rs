use crate::domain::geometry::Rect;
use crate::domain::ports::{Canvas, Color, RenderError};
use crate::domain::shooter::boss::BOSS_NAME;
use crate::domain::shooter::world::{Screen, ShooterWorld};
use crate::use_cases::ShooterSession;

pub fn draw(session: &ShooterSession, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
    let world = session.world();
    let tuning = &world.tuning;
    canvas.clear(tuning.field_width, tuning.field_height)?;

    for star in &world.stars {
        canvas.fill_rect(Rect::new(star.x, star.y, star.size, star.size), Color::Gray)?;
    }

    match world.screen {
        Screen::Title => draw_title(world, canvas),
        Screen::Playing => draw_playing(world, canvas),
        Screen::GameOver => draw_game_over(world, canvas),
    }
}

fn draw_title(world: &ShooterWorld, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
    let mid_x = world.tuning.field_width / 2.0;
    let mid_y = world.tuning.field_height / 2.0;
    canvas.text(mid_x - 70.0, mid_y - 60.0, "SPACE SHOOTER", Color::Cyan)?;
    canvas.text(mid_x - 120.0, mid_y, "ENTER  single player", Color::White)?;
    canvas.text(mid_x - 120.0, mid_y + 30.0, "M      multiplayer", Color::White)?;
    canvas.text(mid_x - 120.0, mid_y + 60.0, "ESC    quit", Color::Gray)
}

fn draw_game_over(world: &ShooterWorld, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
    let mid_x = world.tuning.field_width / 2.0;
    let mid_y = world.tuning.field_height / 2.0;
    canvas.text(mid_x - 50.0, mid_y - 30.0, "GAME OVER", Color::Red)?;
    canvas.text(
        mid_x - 70.0,
        mid_y + 10.0,
        &format!("SCORE {}", world.score),
        Color::White,
    )
}

fn draw_playing(world: &ShooterWorld, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
    for power_up in world.power_ups.iter().filter(|item| item.alive) {
        canvas.fill_rect(power_up.rect(), Color::Green)?;
    }
    for enemy in world.enemies.iter().filter(|enemy| enemy.body.alive) {
        let color = if enemy.hit { Color::White } else { Color::Magenta };
        canvas.fill_rect(enemy.body.rect(), color)?;
    }
    if let Some(boss) = world.boss.as_ref().filter(|boss| boss.body.alive) {
        let color = if boss.hit { Color::White } else { Color::Red };
        canvas.fill_rect(boss.body.rect(), color)?;
        draw_boss_bar(world, boss.body.health_fraction(), boss.phase.number(), canvas)?;
    }
    for bullet in world.bullets.iter().filter(|bullet| bullet.alive) {
        canvas.fill_rect(bullet.rect(), Color::Yellow)?;
    }
    for bullet in world.boss_bullets.iter().filter(|bullet| bullet.alive) {
        canvas.fill_circle(
            bullet.x + bullet.size / 2.0,
            bullet.y + bullet.size / 2.0,
            bullet.size / 2.0,
            Color::Orange,
        )?;
    }
    for teammate in &world.remote_players {
        let color = if teammate.alive { Color::Blue } else { Color::Gray };
        canvas.fill_rect(teammate.rect(), color)?;
        canvas.text(teammate.x, teammate.y - 20.0, &teammate.name, Color::White)?;
    }
    if world.player.body.alive {
        let color = if world.player.burning {
            Color::Orange
        } else {
            Color::Cyan
        };
        canvas.fill_rect(world.player.body.rect(), color)?;
    }
    for explosion in world.explosions.iter().filter(|explosion| explosion.alive) {
        let radius = 8.0 + explosion.frames.frame as f32 * 3.0;
        canvas.fill_circle(explosion.x, explosion.y, radius, Color::Orange)?;
    }
    Ok(())
}

fn draw_boss_bar(
    world: &ShooterWorld,
    fraction: f32,
    phase: u8,
    canvas: &mut dyn Canvas,
) -> Result<(), RenderError> {
    let width = world.tuning.field_width / 2.0;
    let left = world.tuning.field_width / 4.0;
    let bar = Rect::new(left, 10.0, width, 12.0);
    canvas.stroke_rect(bar, Color::White)?;
    canvas.fill_rect(Rect::new(left, 10.0, width * fraction, 12.0), Color::Red)?;
    canvas.text(
        left,
        30.0,
        &format!("{BOSS_NAME} PHASE {phase}"),
        Color::White,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tuning::shooter::ShooterTuning;
    use crate::interface_adapters::render::TerminalCanvas;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn session() -> ShooterSession {
        ShooterSession::with_rng(
            "Ada".to_string(),
            None,
            ShooterTuning::default(),
            StdRng::seed_from_u64(3),
        )
    }

    #[test]
    fn when_title_screen_is_drawn_then_menu_text_appears() {
        let session = session();
        let mut canvas = TerminalCanvas::new(Vec::new(), 80, 25);
        draw(&session, &mut canvas).expect("draw");

        let (cell_w, cell_h) = canvas.world_per_cell();
        let world = session.world();
        let column = ((world.tuning.field_width / 2.0 - 70.0) / cell_w) as u16;
        let row = ((world.tuning.field_height / 2.0 - 60.0) / cell_h) as u16;
        assert_eq!(canvas.glyph(column, row), Some('S'));
    }
}
