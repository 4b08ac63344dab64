/// The step function: advances the maze by one tick.
///
/// Processing order (agents in registration order, player first):
///   1. Player: intent from held keys → move → item pickup
///   2. Player position broadcast → proximity / capture per adversary
///   3. Each adversary: waypoint travel or junction decision → fear timer
///   4. Game over → phase change + end message
///
/// Every agent moves once per tick, even when the game ends partway
/// through it. Nothing runs once `game_over` is set.

use crate::domain::ai;
use crate::domain::entity::{Agent, Intent, PressedKeys};
use crate::domain::rules;
use super::event::GameEvent;
use super::world::{Maze, Phase};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(maze: &mut Maze, keys: PressedKeys) -> Vec<GameEvent> {
    if maze.phase != Phase::Playing || maze.game_over { return vec![]; }

    maze.tick += 1;

    if maze.message_timer > 0 {
        maze.message_timer -= 1;
        if maze.message_timer == 0 { maze.message.clear(); }
    }

    for idx in 0..maze.agents.len() {
        if matches!(maze.agents[idx], Agent::Player(_)) {
            resolve_player(maze, idx, keys);
        } else {
            resolve_adversary(maze, idx);
        }
    }

    if maze.game_over {
        resolve_game_over(maze);
    }

    maze.take_events()
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(maze: &mut Maze, idx: usize, keys: PressedKeys) {
    let intent = rules::intent_from_keys(keys);

    let (pickup, pos) = {
        let Maze { grid, agents, .. } = &mut *maze;
        let Agent::Player(player) = &mut agents[idx] else { return };
        let pickup = match intent {
            Some(Intent::Move(dir)) => rules::move_player(grid, player, dir).pickup,
            Some(Intent::Quit) | None => None,
        };
        (pickup, player.pos)
    };

    if intent == Some(Intent::Quit) {
        maze.declare_quit();
    }
    if let Some(cell) = pickup {
        maze.consume_at(cell);
    }
    maze.report_player_position(pos);
}

// ══════════════════════════════════════════════════════════════
// Adversaries
// ══════════════════════════════════════════════════════════════

fn resolve_adversary(maze: &mut Maze, idx: usize) {
    let warn = maze.warn_ticks;
    let recovered = {
        let Maze { grid, agents, rng, .. } = &mut *maze;
        let Some(adv) = agents[idx].as_adversary_mut() else { return };
        ai::step_adversary(grid, adv, rng);
        adv.tick_fear(warn).then_some(adv.index)
    };

    if let Some(index) = recovered {
        tracing::debug!(adversary = index, tick = maze.tick, "fear wore off");
        maze.emit(GameEvent::AdversaryRecovered { index });
    }
}

// ══════════════════════════════════════════════════════════════
// End of game
// ══════════════════════════════════════════════════════════════

fn resolve_game_over(maze: &mut Maze) {
    maze.phase = Phase::Over;
    if maze.quit {
        maze.set_message("Bye!", 0);
    } else if maze.winner {
        tracing::info!(tick = maze.tick, "player wins");
        maze.set_message("You Win!", 0);
    } else {
        tracing::info!(tick = maze.tick, food_left = maze.food_remaining, "player loses");
        maze.set_message("You Lose!", 0);
    }
}
