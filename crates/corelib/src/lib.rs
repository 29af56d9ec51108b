//! Core types: math re-exports, orbit Camera, editor state, picking rays.

pub use glam::{Mat4, Vec2, Vec3, Vec4, vec2, vec3};

pub mod camera;
pub mod editor;
pub mod ray;
