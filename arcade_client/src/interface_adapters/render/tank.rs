use crate::domain::geometry::Rect;
use crate::domain::ports::{Canvas, Color, RenderError};
use crate::domain::tank::{PLAYER, TankArena};
use crate::use_cases::TankSession;
use crate::use_cases::tank_session::{TankSnapshot, TankView};

const DEFAULT_TANK_SIZE: f32 = 15.0;
const LEADERBOARD_WIDTH: f32 = 200.0;

pub fn draw(session: &TankSession, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
    let tuning = session.tuning();
    canvas.clear(tuning.arena_width, tuning.arena_height)?;

    if let Some(arena) = session.practice() {
        draw_practice(arena, canvas)?;
    } else if let Some(snapshot) = session.snapshot() {
        draw_snapshot(session, snapshot, canvas)?;
    } else {
        canvas.text(
            tuning.arena_width / 2.0 - 150.0,
            tuning.arena_height / 2.0,
            "Press Enter to join a battle",
            Color::White,
        )?;
    }

    if let Some(seconds) = session.respawn_countdown() {
        let text = format!("RESPAWNING IN {}...", seconds.ceil() as u32);
        canvas.text(
            tuning.arena_width / 2.0 - 90.0,
            tuning.arena_height / 2.0 - 40.0,
            &text,
            Color::Red,
        )?;
    }
    if let Some(banner) = session.banner() {
        canvas.text(tuning.arena_width / 2.0 - 60.0, 40.0, banner, Color::Yellow)?;
    }
    Ok(())
}

fn draw_practice(arena: &TankArena, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
    for obstacle in &arena.obstacles {
        canvas.fill_rect(*obstacle, Color::Gray)?;
    }
    for (index, tank) in arena.tanks.iter().enumerate() {
        if !tank.is_alive() {
            continue;
        }
        let color = if index == PLAYER { Color::Cyan } else { Color::Red };
        canvas.fill_rect(tank.hull(), color)?;
        draw_barrel(canvas, tank.body.x, tank.body.y, tank.angle, tank.stats().size)?;
    }
    for shell in arena.shells.iter().filter(|shell| shell.alive) {
        canvas.fill_circle(shell.x, shell.y, arena.tuning.bullet_radius, Color::Yellow)?;
    }
    for blast in arena.blasts.iter().filter(|blast| blast.alive) {
        let radius = 10.0 + 30.0 * (blast.age / arena.tuning.explosion_seconds).min(1.0);
        canvas.fill_circle(blast.x, blast.y, radius, Color::Orange)?;
    }
    Ok(())
}

fn draw_snapshot(
    session: &TankSession,
    snapshot: &TankSnapshot,
    canvas: &mut dyn Canvas,
) -> Result<(), RenderError> {
    for obstacle in &snapshot.obstacles {
        canvas.fill_rect(*obstacle, Color::Gray)?;
    }
    for powerup in &snapshot.powerups {
        let color = match powerup.kind.as_str() {
            "health" => Color::Green,
            "speed" => Color::Cyan,
            _ => Color::Magenta,
        };
        canvas.fill_rect(Rect::new(powerup.x - 8.0, powerup.y - 8.0, 16.0, 16.0), color)?;
    }
    for flag in &snapshot.flags {
        canvas.stroke_rect(
            Rect::new(flag.x - 10.0, flag.y - 10.0, 20.0, 20.0),
            team_color(Some(&flag.team)),
        )?;
    }
    for tank in snapshot.tanks.values().filter(|tank| tank.alive) {
        draw_remote_tank(session, tank, canvas)?;
    }
    for bullet in &snapshot.bullets {
        canvas.fill_circle(bullet.x, bullet.y, 3.0, Color::Yellow)?;
    }
    draw_leaderboard(session, canvas)
}

fn draw_remote_tank(
    session: &TankSession,
    tank: &TankView,
    canvas: &mut dyn Canvas,
) -> Result<(), RenderError> {
    let size = tank
        .class
        .map_or(DEFAULT_TANK_SIZE, |class| class.stats().size);
    let own = session.tank_id() == Some(tank.id.as_str());
    let color = if own {
        Color::Cyan
    } else {
        team_color(tank.team.as_deref())
    };
    canvas.fill_rect(
        Rect::new(tank.x - size, tank.y - size, size * 2.0, size * 2.0),
        color,
    )?;
    draw_barrel(canvas, tank.x, tank.y, tank.angle, size)?;
    canvas.text(tank.x - size, tank.y - size - 20.0, &tank.name, Color::White)
}

fn draw_barrel(
    canvas: &mut dyn Canvas,
    x: f32,
    y: f32,
    angle: f32,
    size: f32,
) -> Result<(), RenderError> {
    let reach = size * 1.6;
    canvas.fill_circle(
        x + angle.cos() * reach,
        y + angle.sin() * reach,
        2.0,
        Color::White,
    )
}

fn draw_leaderboard(session: &TankSession, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
    let (width, _) = canvas.size();
    let left = width - LEADERBOARD_WIDTH;
    let mut y = 10.0;
    if let Some(info) = session.team_info() {
        let scores: Vec<String> = info
            .team_scores
            .iter()
            .map(|(team, score)| format!("{} {score}", team.to_ascii_uppercase()))
            .collect();
        canvas.text(left, y, &scores.join("  "), Color::White)?;
        y += 25.0;
    }
    for (rank, entry) in session.leaderboard().iter().enumerate() {
        let line = format!("{}. {} {}/{}", rank + 1, entry.name, entry.kills, entry.deaths);
        canvas.text(left, y, &line, team_color(entry.team.as_deref()))?;
        y += 25.0;
    }
    Ok(())
}

fn team_color(team: Option<&str>) -> Color {
    match team {
        Some("red") => Color::Red,
        Some("blue") => Color::Blue,
        _ => Color::Green,
    }
}
