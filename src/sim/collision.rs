//! Collision detection between an agent and a pipe pair
//!
//! The overlap test is shape-accurate: the bird's silhouette mask is checked
//! against each segment's rectangle at the segment's offset from the sprite.
//! Out-of-bounds termination (ground line, field top) is a separate check in
//! the tick engine, not part of this detector.

use crate::consts::{PIPE_SEGMENT_HEIGHT, PIPE_WIDTH};

use super::mask::bird_mask;
use super::obstacle::Pipe;
use super::state::Agent;

/// True if the agent's sprite mask overlaps either pipe segment.
///
/// Offsets follow the mask convention: each segment rectangle's top-left is
/// taken relative to the agent's sprite top-left, with the agent's y rounded
/// to the nearest pixel row.
pub fn collides(agent: &Agent, pipe: &Pipe) -> bool {
    let mask = bird_mask();
    let dx = (pipe.x - agent.pos.x).round() as i32;
    let top_dy = (pipe.top - agent.pos.y.round()) as i32;
    let bottom_dy = (pipe.gap_bottom - agent.pos.y.round()) as i32;
    let segment_h = PIPE_SEGMENT_HEIGHT as u32;
    mask.overlaps_rect(dx, top_dy, PIPE_WIDTH, segment_h)
        || mask.overlaps_rect(dx, bottom_dy, PIPE_WIDTH, segment_h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BIRD_HEIGHT, BIRD_WIDTH, PIPE_GAP};
    use crate::sim::state::Agent;

    fn pipe_at(x: f32, gap_top: f32) -> Pipe {
        Pipe {
            x,
            gap_top,
            gap_bottom: gap_top + PIPE_GAP,
            top: gap_top - PIPE_SEGMENT_HEIGHT,
            passed: false,
        }
    }

    fn agent_at(x: f32, y: f32) -> Agent {
        let mut agent = Agent::new();
        agent.pos.x = x;
        agent.pos.y = y;
        agent
    }

    #[test]
    fn test_agent_centered_in_gap_is_clear() {
        // Gap spans 300..500; a 48-tall sprite at y=376 sits well inside
        let pipe = pipe_at(230.0, 300.0);
        let agent = agent_at(230.0, 376.0);
        assert!(!collides(&agent, &pipe));
    }

    #[test]
    fn test_agent_into_bottom_segment() {
        let pipe = pipe_at(230.0, 300.0);
        // Sprite rows reach y=500+; the bottom segment starts at 500
        let agent = agent_at(230.0, 480.0);
        assert!(collides(&agent, &pipe));
    }

    #[test]
    fn test_agent_into_top_segment() {
        let pipe = pipe_at(230.0, 300.0);
        let agent = agent_at(230.0, 280.0);
        assert!(collides(&agent, &pipe));
    }

    #[test]
    fn test_exact_touch_is_not_a_hit() {
        let pipe = pipe_at(230.0, 300.0);
        // Bottom edge exactly on the bottom segment's top edge
        let agent = agent_at(230.0, pipe.gap_bottom - BIRD_HEIGHT as f32);
        assert!(!collides(&agent, &pipe));
        // One pixel lower overlaps
        let agent = agent_at(230.0, pipe.gap_bottom - BIRD_HEIGHT as f32 + 1.0);
        assert!(collides(&agent, &pipe));
    }

    #[test]
    fn test_horizontally_clear_of_pipe() {
        let pipe = pipe_at(230.0 + BIRD_WIDTH as f32, 300.0);
        // Pipe's leading edge exactly at the sprite's right edge
        let agent = agent_at(230.0, 480.0);
        assert!(!collides(&agent, &pipe));
        // One pixel of horizontal overlap, but the overlapping column is the
        // sprite's outermost one, which is hollow above and below center
        let pipe = pipe_at(230.0 + BIRD_WIDTH as f32 - 1.0, 300.0);
        let agent = agent_at(230.0, 476.0);
        assert!(collides(&agent, &pipe));
    }

    #[test]
    fn test_rounded_corner_clears_where_box_would_hit() {
        // The sprite's top-right corner is hollow: a bottom segment whose top
        // edge only reaches the sprite's last few rows on its outermost
        // columns does not collide, though bounding boxes would.
        let pipe = pipe_at(230.0 + BIRD_WIDTH as f32 - 2.0, 300.0);
        let agent = agent_at(230.0, pipe.gap_bottom - BIRD_HEIGHT as f32 + 2.0);
        assert!(!collides(&agent, &pipe));
    }
}
