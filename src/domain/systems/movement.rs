use crate::domain::entity::Entity;

/// Integrates a living player's held directions and faces the aim angle.
pub fn step_player(e: &mut Entity, dt: f32) {
    if !e.is_alive() {
        return;
    }
    let Some(player) = e.as_player() else {
        return;
    };

    // direction (+y = down, diagonals normalized to axis speed)
    let dir = player.input.direction();
    let aim = player.input.aim;

    e.move_normalized(dir, dt);
    e.angle = aim;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PlayerInput;
    use crate::domain::ids::EntityId;
    use crate::domain::items::PlayerClass;
    use crate::domain::tuning::PlayerTuning;
    use glam::Vec2;

    fn player() -> Entity {
        Entity::new_player(
            EntityId(1),
            Vec2::ZERO,
            PlayerClass::Blade,
            "mover",
            &PlayerTuning::default(),
            100,
        )
    }

    #[test]
    fn diagonal_speed_matches_axis_speed() {
        let mut e = player();
        if let Some(p) = e.as_player_mut() {
            p.apply_input(&PlayerInput {
                seq: 1,
                up: true,
                right: true,
                aim: 0.5,
                ..PlayerInput::default()
            });
        }
        step_player(&mut e, 0.5);

        assert!((e.pos.length() - 110.0).abs() < 1e-3);
        assert!(e.pos.x > 0.0 && e.pos.y < 0.0);
        assert_eq!(e.angle, 0.5);
    }

    #[test]
    fn dead_players_do_not_move() {
        let mut e = player();
        if let Some(p) = e.as_player_mut() {
            p.input.down = true;
        }
        e.set_health(0.0);
        step_player(&mut e, 1.0);
        assert_eq!(e.pos, Vec2::ZERO);
    }
}
