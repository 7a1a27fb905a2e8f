//! Behavior tree: sequence/selector/parallel/decorator/action nodes as
//! tagged variants dispatched through one function, per the composition
//! root's preference for plain data over a node trait hierarchy.

use mmo_ecs::prelude::{AiMemory, BehaviorTreeId, EntityId, PerceptionSnapshot, SkillId, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Data-driven: a `Node` tree is authored as config and loaded into a
/// `TreeRegistry` at startup rather than hardcoded per NPC type.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Predicate {
    Always,
    HasEnemy,
    NoEnemy,
    HealthBelow(f32),
    BeyondLeash(f32),
    AtPatrolEnd,
}

fn eval_predicate(pred: Predicate, ctx: &DecisionContext) -> bool {
    match pred {
        Predicate::Always => true,
        Predicate::HasEnemy => ctx.perception.highest_threat_target.is_some() || !ctx.perception.enemies.is_empty(),
        Predicate::NoEnemy => ctx.perception.enemies.is_empty() && ctx.perception.highest_threat_target.is_none(),
        Predicate::HealthBelow(pct) => ctx.perception.hp_pct < pct,
        Predicate::BeyondLeash(leash_range) => ctx.perception.distance_to_spawn > leash_range,
        Predicate::AtPatrolEnd => ctx.memory.patrol_index + 1 >= ctx.patrol_points.len().max(1),
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ActionKind {
    MoveTo(Vec3),
    AttackTarget,
    UseSkill(SkillId),
    Flee { distance: f32 },
    Patrol,
    Idle,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Node {
    Sequence(Vec<Node>),
    Selector(Vec<Node>),
    Parallel(Vec<Node>, usize),
    Decorator(Predicate, Box<Node>),
    Action(ActionKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeStatus {
    Success,
    Failure,
    Running,
}

/// The concrete effect a leaf action resolves to; the caller (an AI tick
/// system with access to `World`) translates this into the same command
/// path a player command would take (move, auto-attack, cast).
#[derive(Clone, Debug)]
pub enum AiCommand {
    MoveTo(Vec3),
    AttackTarget(EntityId),
    UseSkill(SkillId, EntityId),
    FleeTo(Vec3),
    Patrol(Vec3),
    None,
}

pub struct DecisionContext<'a> {
    pub self_id: EntityId,
    pub perception: &'a PerceptionSnapshot,
    pub memory: &'a mut AiMemory,
    pub spawn_position: Vec3,
    pub patrol_points: &'a [Vec3],
}

/// Evaluates `node`, returning its status and, for a leaf that fired, the
/// translated command. Composite nodes short-circuit per standard behavior
/// tree semantics (sequence fails fast, selector succeeds fast); `Parallel`
/// succeeds once `required_successes` children succeed in this pass.
pub fn tick_node(node: &Node, ctx: &mut DecisionContext) -> (NodeStatus, AiCommand) {
    match node {
        Node::Sequence(children) => {
            for child in children {
                let (status, command) = tick_node(child, ctx);
                if status != NodeStatus::Success {
                    return (status, command);
                }
            }
            (NodeStatus::Success, AiCommand::None)
        }
        Node::Selector(children) => {
            for child in children {
                let (status, command) = tick_node(child, ctx);
                if status != NodeStatus::Failure {
                    return (status, command);
                }
            }
            (NodeStatus::Failure, AiCommand::None)
        }
        Node::Parallel(children, required) => {
            let mut successes = 0;
            let mut last_command = AiCommand::None;
            for child in children {
                let (status, command) = tick_node(child, ctx);
                if status == NodeStatus::Success {
                    successes += 1;
                    last_command = command;
                }
            }
            if successes >= *required {
                (NodeStatus::Success, last_command)
            } else {
                (NodeStatus::Failure, AiCommand::None)
            }
        }
        Node::Decorator(pred, child) => {
            if eval_predicate(*pred, ctx) {
                tick_node(child, ctx)
            } else {
                (NodeStatus::Failure, AiCommand::None)
            }
        }
        Node::Action(action) => resolve_action(action, ctx),
    }
}

fn resolve_action(action: &ActionKind, ctx: &mut DecisionContext) -> (NodeStatus, AiCommand) {
    match action {
        ActionKind::MoveTo(point) => (NodeStatus::Success, AiCommand::MoveTo(*point)),
        ActionKind::AttackTarget => match ctx.perception.highest_threat_target {
            Some(target) => (NodeStatus::Success, AiCommand::AttackTarget(target)),
            None => (NodeStatus::Failure, AiCommand::None),
        },
        ActionKind::UseSkill(skill_id) => match ctx.perception.highest_threat_target {
            Some(target) => (NodeStatus::Success, AiCommand::UseSkill(*skill_id, target)),
            None => (NodeStatus::Failure, AiCommand::None),
        },
        ActionKind::Flee { distance } => {
            let threat_pos = ctx
                .perception
                .highest_threat_target
                .and_then(|t| ctx.memory.last_known_positions.get(&t))
                .copied()
                .unwrap_or(ctx.spawn_position);
            let dx = ctx.spawn_position.x - threat_pos.x;
            let dy = ctx.spawn_position.y - threat_pos.y;
            let len = (dx * dx + dy * dy).sqrt().max(f32::EPSILON);
            let flee_point = Vec3::new(threat_pos.x + dx / len * distance, threat_pos.y + dy / len * distance, 0.0);
            (NodeStatus::Running, AiCommand::FleeTo(flee_point))
        }
        ActionKind::Patrol => {
            if ctx.patrol_points.is_empty() {
                return (NodeStatus::Failure, AiCommand::None);
            }
            if ctx.memory.patrol_forward {
                if ctx.memory.patrol_index + 1 >= ctx.patrol_points.len() {
                    ctx.memory.patrol_forward = false;
                } else {
                    ctx.memory.patrol_index += 1;
                }
            } else if ctx.memory.patrol_index == 0 {
                ctx.memory.patrol_forward = true;
            } else {
                ctx.memory.patrol_index -= 1;
            }
            (NodeStatus::Running, AiCommand::Patrol(ctx.patrol_points[ctx.memory.patrol_index]))
        }
        ActionKind::Idle => (NodeStatus::Success, AiCommand::None),
    }
}

/// Owns every compiled tree, keyed by the opaque id stored on `Ai` — kept
/// out of `mmo-ecs` so that crate stays free of behavior-tree concerns.
#[derive(Default)]
pub struct TreeRegistry {
    trees: HashMap<BehaviorTreeId, Node>,
}

impl TreeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: BehaviorTreeId, root: Node) {
        self.trees.insert(id, root);
    }

    pub fn get(&self, id: BehaviorTreeId) -> Option<&Node> {
        self.trees.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmo_ecs::prelude::EntityId;

    fn ctx<'a>(perception: &'a PerceptionSnapshot, memory: &'a mut AiMemory, patrol: &'a [Vec3]) -> DecisionContext<'a> {
        DecisionContext {
            self_id: EntityId::new(1, 0),
            perception,
            memory,
            spawn_position: Vec3::ZERO,
            patrol_points: patrol,
        }
    }

    #[test]
    fn selector_falls_through_to_patrol_when_no_enemy() {
        let tree = Node::Selector(vec![
            Node::Decorator(Predicate::HasEnemy, Box::new(Node::Action(ActionKind::AttackTarget))),
            Node::Action(ActionKind::Patrol),
        ]);
        let perception = PerceptionSnapshot::default();
        let mut memory = AiMemory::default();
        let patrol = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)];
        let mut context = ctx(&perception, &mut memory, &patrol);
        let (status, command) = tick_node(&tree, &mut context);
        assert_eq!(status, NodeStatus::Running);
        assert!(matches!(command, AiCommand::Patrol(_)));
    }

    #[test]
    fn selector_attacks_when_enemy_present() {
        let target = EntityId::new(9, 0);
        let tree = Node::Selector(vec![
            Node::Decorator(Predicate::HasEnemy, Box::new(Node::Action(ActionKind::AttackTarget))),
            Node::Action(ActionKind::Patrol),
        ]);
        let mut perception = PerceptionSnapshot::default();
        perception.highest_threat_target = Some(target);
        let mut memory = AiMemory::default();
        let patrol = vec![];
        let mut context = ctx(&perception, &mut memory, &patrol);
        let (status, command) = tick_node(&tree, &mut context);
        assert_eq!(status, NodeStatus::Success);
        assert!(matches!(command, AiCommand::AttackTarget(t) if t == target));
    }

    #[test]
    fn sequence_fails_fast_on_first_failure() {
        let tree = Node::Sequence(vec![
            Node::Decorator(Predicate::HealthBelow(0.2), Box::new(Node::Action(ActionKind::Flee { distance: 20.0 }))),
            Node::Action(ActionKind::AttackTarget),
        ]);
        let mut perception = PerceptionSnapshot::default();
        perception.hp_pct = 0.9;
        let mut memory = AiMemory::default();
        let patrol = vec![];
        let mut context = ctx(&perception, &mut memory, &patrol);
        let (status, _) = tick_node(&tree, &mut context);
        assert_eq!(status, NodeStatus::Failure);
    }

    #[test]
    fn patrol_pingpongs_at_array_ends() {
        let patrol = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)];
        let perception = PerceptionSnapshot::default();
        let mut memory = AiMemory::default();
        {
            let mut context = ctx(&perception, &mut memory, &patrol);
            tick_node(&Node::Action(ActionKind::Patrol), &mut context);
        }
        assert_eq!(memory.patrol_index, 1);
        assert!(!memory.patrol_forward);
        {
            let mut context = ctx(&perception, &mut memory, &patrol);
            tick_node(&Node::Action(ActionKind::Patrol), &mut context);
        }
        assert_eq!(memory.patrol_index, 0);
    }
}
