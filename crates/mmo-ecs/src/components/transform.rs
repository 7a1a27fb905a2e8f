use crate::storage::Component;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_sq(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(self, other: Vec3) -> f32 {
        self.distance_sq(other).sqrt()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub facing: f32,
    pub zone_id: u32,
}

impl Component for Transform {
    const NAME: &'static str = "Transform";
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct MovementFlags: u8 {
        const FLY   = 0b0001;
        const SWIM  = 0b0010;
        const CLIMB = 0b0100;
        const GHOST = 0b1000;
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Movement {
    pub velocity: Vec3,
    pub speed_cap: f32,
    pub flags: MovementFlags,
}

impl Component for Movement {
    const NAME: &'static str = "Movement";
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Dodge {
    pub active: bool,
    pub direction: Vec3,
    pub end_tick: u64,
}

impl Component for Dodge {
    const NAME: &'static str = "Dodge";
}
